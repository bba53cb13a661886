use actix_web::rt::task;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher as _,
};

use crate::services::account::PasswordHasher;
use crate::types::AccountError;

/// Argon2id hasher. Hashes are stored as PHC strings; the salt column keeps
/// the generating salt so password changes can reuse it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn generate_salt(&self) -> String {
        SaltString::generate(&mut OsRng).to_string()
    }

    async fn hash(&self, password: String, salt: String) -> Result<String, AccountError> {
        task::spawn_blocking(move || {
            let salt = SaltString::from_b64(&salt)
                .map_err(|e| AccountError::Internal(format!("Invalid password salt: {}", e)))?;
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AccountError::Internal(format!("Unable to hash password: {}", e)))
        })
        .await
        .map_err(|e| AccountError::Internal(e.to_string()))?
    }

    async fn verify(&self, stored_hash: String, candidate: String, _salt: String) -> bool {
        // The PHC string already carries the salt.
        task::spawn_blocking(move || {
            let Ok(parsed) = PasswordHash::new(&stored_hash) else {
                return false;
            };
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn verify_accepts_the_hashed_password() {
        let hashed_password = "$argon2id$v=19$m=19456,t=2,p=1$r07vWFCaKrbNPrSgUrG/+Q$/2lBaeRWeox6ROMu6qAwOYmttdGXA3o4Uw2YHC/fvfY";

        let res = Argon2Hasher
            .verify(
                hashed_password.to_string(),
                "password".to_string(),
                "r07vWFCaKrbNPrSgUrG/+Q".to_string(),
            )
            .await;

        assert!(res);
    }

    #[actix_web::test]
    async fn verify_rejects_an_incorrect_password() {
        let hashed_password = "$argon2id$v=19$m=19456,t=2,p=1$r07vWFCaKrbNPrSgUrG/+Q$/2lBaeRWeox6ROMu6qAwOYmttdGXA3o4Uw2YHC/fvfY";

        let res = Argon2Hasher
            .verify(
                hashed_password.to_string(),
                "passworda".to_string(),
                "r07vWFCaKrbNPrSgUrG/+Q".to_string(),
            )
            .await;

        assert!(!res);
    }

    #[actix_web::test]
    async fn hashing_with_the_same_salt_is_deterministic() {
        let hasher = Argon2Hasher;
        let salt = hasher.generate_salt();

        let first = hasher
            .hash("pw123".to_string(), salt.clone())
            .await
            .unwrap();
        let second = hasher.hash("pw123".to_string(), salt).await.unwrap();

        assert_eq!(first, second);
    }
}
