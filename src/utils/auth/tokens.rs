use pasetors::{claims::Claims, keys::SymmetricKey, local, version4::V4};

use crate::services::account::TokenIssuer;
use crate::settings::SecretSettings;
use crate::types::{accounts::SafeAccount, AccountError};

/// Issues v4.local paseto tokens over a redacted account. The service treats
/// the result as an opaque credential; claims carry the serialized
/// [`SafeAccount`] and an expiry.
#[derive(Clone)]
pub struct PasetoTokenIssuer {
    secret: SecretSettings,
}

impl PasetoTokenIssuer {
    pub fn new(secret: SecretSettings) -> Self {
        Self { secret }
    }
}

impl TokenIssuer for PasetoTokenIssuer {
    #[tracing::instrument(name = "Issuing bearer token", skip(self, user), fields(account_id = %user.id))]
    fn issue(&self, user: &SafeAccount) -> Result<String, AccountError> {
        let expiration = chrono::Local::now() + chrono::Duration::minutes(self.secret.token_expiration);

        let mut claims = Claims::new().map_err(token_error)?;
        claims
            .expiration(&expiration.to_rfc3339())
            .map_err(token_error)?;
        claims
            .add_additional("user", serde_json::json!(user))
            .map_err(token_error)?;

        let sk = SymmetricKey::<V4>::from(self.secret.secret_key.as_bytes()).map_err(token_error)?;
        local::encrypt(
            &sk,
            &claims,
            None,
            Some(self.secret.hmac_secret.as_bytes()),
        )
        .map_err(token_error)
    }
}

fn token_error(e: pasetors::errors::Error) -> AccountError {
    AccountError::Internal(format!("Could not issue token: {}", e))
}
