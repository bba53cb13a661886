use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{account, sea_orm_active_enums::Role};

/// Projection of an account with the credential fields stripped. Every
/// account value leaving the service boundary (token claims, sign-in and
/// password-change responses) goes through this type.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SafeAccount {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub role: Role,
    pub last_login_at: Option<DateTimeWithTimeZone>,
}

impl From<account::Model> for SafeAccount {
    fn from(account: account::Model) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            phone: account.phone,
            role: account.role,
            last_login_at: account.last_login_at,
        }
    }
}

/// Minimal projection used by the password-change flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub id: Uuid,
    pub password_hash: String,
    pub password_salt: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignUpStep {
    GenerateActivationCode,
    CheckActivationCode,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    #[serde(default)]
    pub password: Option<String>,
    pub step: SignUpStep,
    #[serde(default)]
    pub activation_code: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
pub enum SignUpResponse {
    /// Phase one acknowledgement; no account exists yet.
    ActivationCodeSent { status: String },
    /// Phase two result. `user` is the full account record, hash and salt
    /// included; only the token claims are redacted. Downstream consumers
    /// rely on the raw fields, so this stays as-is.
    Created {
        token: String,
        user: account::Model,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SignInResponse {
    pub token: String,
    pub user: SafeAccount,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PasswordChangeRequest {
    pub account_id: Uuid,
    pub old_password: String,
    pub new_password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PasswordChangeResponse {
    pub user: SafeAccount,
    pub status: String,
}
