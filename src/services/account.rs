use std::future::Future;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use uuid::Uuid;

use crate::entities::{account, sea_orm_active_enums::Role};
use crate::types::{
    accounts::{
        AccountCredentials, PasswordChangeResponse, SafeAccount, SignInResponse, SignUpRequest,
        SignUpResponse, SignUpStep,
    },
    AccountError, StoreError,
};

/// Persistence seam. The uniqueness of the normalized email is enforced by
/// the store itself; `create` surfaces a violation as
/// [`StoreError::DuplicateKey`] instead of racing a prior lookup.
pub trait CredentialStore {
    fn create(
        &self,
        params: CreateAccountParams,
    ) -> impl Future<Output = Result<account::Model, StoreError>>;
    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<account::Model>, StoreError>>;
    fn find_credentials_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<AccountCredentials>, StoreError>>;
    fn update_last_login(
        &self,
        id: Uuid,
        logged_in_at: DateTimeWithTimeZone,
    ) -> impl Future<Output = Result<account::Model, StoreError>>;
    fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> impl Future<Output = Result<account::Model, StoreError>>;
}

#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: Role,
}

pub trait PasswordHasher {
    fn generate_salt(&self) -> String;
    fn hash(
        &self,
        password: String,
        salt: String,
    ) -> impl Future<Output = Result<String, AccountError>>;
    fn verify(
        &self,
        stored_hash: String,
        candidate: String,
        salt: String,
    ) -> impl Future<Output = bool>;
}

pub trait TokenIssuer {
    fn issue(&self, user: &SafeAccount) -> Result<String, AccountError>;
}

/// Owns the ephemeral (email, code, expiry) records; the service never
/// persists activation state itself.
pub trait ActivationMailer {
    fn generate_code(&self, email: &str) -> impl Future<Output = Result<String, AccountError>>;
    fn send_activation_email(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), AccountError>>;
    fn verify_code(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<bool, AccountError>>;
    fn add_to_mailing_list(
        &self,
        account: &account::Model,
    ) -> impl Future<Output = Result<(), AccountError>>;
}

/// Account lifecycle operations: two-phase sign-up, sign-in and password
/// change. Stateless; every suspension point is a call into one of the four
/// injected collaborators.
#[derive(Clone)]
pub struct AccountService<S, H, T, M> {
    store: S,
    hasher: H,
    tokens: T,
    mailer: M,
}

fn is_valid_email(email: &str) -> bool {
    lettre::Address::from_str(email).is_ok()
}

impl<S, H, T, M> AccountService<S, H, T, M>
where
    S: CredentialStore,
    H: PasswordHasher,
    T: TokenIssuer,
    M: ActivationMailer,
{
    pub fn new(store: S, hasher: H, tokens: T, mailer: M) -> Self {
        Self {
            store,
            hasher,
            tokens,
            mailer,
        }
    }

    #[tracing::instrument(name = "Signing up an account", skip(self, req), fields(email = %req.email, step = ?req.step))]
    pub async fn sign_up(&self, req: SignUpRequest) -> Result<SignUpResponse, AccountError> {
        if req.email.is_empty() {
            return Err(AccountError::Validation("Email is required".to_string()));
        }
        if req.first_name.is_empty() {
            return Err(AccountError::Validation("Firstname is required".to_string()));
        }
        if req.last_name.is_empty() {
            // Historical message, kept verbatim; callers branch on the code.
            return Err(AccountError::Validation("Firstname is required".to_string()));
        }
        if req.phone.is_empty() {
            return Err(AccountError::Validation("Phone is required".to_string()));
        }
        if !is_valid_email(&req.email) {
            return Err(AccountError::Validation("Wrong email format".to_string()));
        }

        let email = req.email.to_lowercase();

        match req.step {
            SignUpStep::GenerateActivationCode => {
                let code = self.mailer.generate_code(&email).await?;
                self.mailer.send_activation_email(&email, &code).await?;
                Ok(SignUpResponse::ActivationCodeSent {
                    status: "ok".to_string(),
                })
            }
            SignUpStep::CheckActivationCode => {
                let password = match req.password.as_deref() {
                    Some(password) if !password.is_empty() => password.to_string(),
                    _ => {
                        return Err(AccountError::Validation("Password is required".to_string()))
                    }
                };

                let code = req.activation_code.unwrap_or_default();
                if !self.mailer.verify_code(&email, &code).await? {
                    return Err(AccountError::Forbidden("Wrong activation code".to_string()));
                }

                let salt = self.hasher.generate_salt();
                let password_hash = self.hasher.hash(password, salt.clone()).await?;

                let role = match req.role.as_deref() {
                    Some("USER_PUBLISHER") => Role::Publisher,
                    _ => Role::Viewer,
                };

                let account = self
                    .store
                    .create(CreateAccountParams {
                        email: email.clone(),
                        first_name: req.first_name,
                        last_name: req.last_name,
                        phone: req.phone,
                        password_hash,
                        password_salt: salt,
                        role,
                    })
                    .await
                    .map_err(|e| match e {
                        StoreError::DuplicateKey => {
                            AccountError::Conflict(format!("User '{}' already exists", email))
                        }
                        e => e.into(),
                    })?;

                tracing::event!(target: "backend", tracing::Level::INFO, "Account created: {}", account.email);

                // Best-effort; a mailing-list failure never unwinds the
                // freshly created account.
                if let Err(e) = self.mailer.add_to_mailing_list(&account).await {
                    tracing::event!(target: "backend", tracing::Level::WARN, "Could not add {} to the mailing list: {}", account.email, e);
                }

                let token = self.tokens.issue(&SafeAccount::from(account.clone()))?;
                Ok(SignUpResponse::Created {
                    token,
                    user: account,
                })
            }
        }
    }

    #[tracing::instrument(name = "Signing an account in", skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, AccountError> {
        if email.is_empty() || password.is_empty() {
            return Err(AccountError::Validation(
                "Email and password required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(AccountError::Validation("Wrong email format".to_string()));
        }

        let email = email.to_lowercase();

        let account = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                AccountError::AccountNotFound(
                    "Email is not associated with MFA account.".to_string(),
                )
            })?;

        tracing::event!(target: "backend", tracing::Level::DEBUG, "Login attempt: {}", account.email);

        let verified = self
            .hasher
            .verify(
                account.password_hash.clone(),
                password.to_string(),
                account.password_salt.clone(),
            )
            .await;
        if !verified {
            return Err(AccountError::Forbidden(
                "Password used is incorrect.".to_string(),
            ));
        }

        let account = self
            .store
            .update_last_login(account.id, Utc::now().into())
            .await?;

        let user = SafeAccount::from(account);
        let token = self.tokens.issue(&user)?;
        Ok(SignInResponse { token, user })
    }

    #[tracing::instrument(name = "Changing an account password", skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        account_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<PasswordChangeResponse, AccountError> {
        let credentials = self
            .store
            .find_credentials_by_id(account_id)
            .await?
            .ok_or_else(|| AccountError::Unauthorized("Wrong password".to_string()))?;

        let verified = self
            .hasher
            .verify(
                credentials.password_hash,
                old_password.to_string(),
                credentials.password_salt.clone(),
            )
            .await;
        if !verified {
            return Err(AccountError::Unauthorized("Wrong password".to_string()));
        }

        // The stored salt is reused; rotating it would change the stored-data
        // semantics relied on by existing rows.
        let password_hash = self
            .hasher
            .hash(new_password.to_string(), credentials.password_salt)
            .await?;
        let account = self
            .store
            .update_password_hash(account_id, password_hash)
            .await?;

        Ok(PasswordChangeResponse {
            user: account.into(),
            status: "ok".to_string(),
        })
    }
}
