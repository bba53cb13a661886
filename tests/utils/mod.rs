use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::{
    dev::{Service, ServiceResponse},
    test,
    web::Data,
    App,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DbConn, DbErr, Set};
use uuid::Uuid;

use mfa_accounts_backend::{
    db_adapters::account_adapter::AccountAdapter,
    entities::{account, sea_orm_active_enums::Role},
    routes,
    services::account::{AccountService, ActivationMailer},
    settings::SecretSettings,
    types::AccountError,
    utils::auth::{password::Argon2Hasher, tokens::PasetoTokenIssuer},
};

pub const TEST_PASSWORD: &str = "password";
pub const TEST_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$r07vWFCaKrbNPrSgUrG/+Q$/2lBaeRWeox6ROMu6qAwOYmttdGXA3o4Uw2YHC/fvfY";
pub const TEST_PASSWORD_SALT: &str = "r07vWFCaKrbNPrSgUrG/+Q";
pub const TEST_ACTIVATION_CODE: &str = "000000";

/// In-memory stand-in for the SMTP/Redis mailer. Codes are fixed to
/// [`TEST_ACTIVATION_CODE`] so tests can drive the two-phase sign-up.
#[derive(Clone, Default)]
pub struct TestMailer {
    pub codes: Arc<Mutex<HashMap<String, String>>>,
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    pub mailing_list: Arc<Mutex<Vec<String>>>,
}

impl ActivationMailer for TestMailer {
    async fn generate_code(&self, email: &str) -> Result<String, AccountError> {
        let code = TEST_ACTIVATION_CODE.to_string();
        self.codes
            .lock()
            .unwrap()
            .insert(email.to_string(), code.clone());
        Ok(code)
    }

    async fn send_activation_email(&self, email: &str, code: &str) -> Result<(), AccountError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<bool, AccountError> {
        Ok(self.codes.lock().unwrap().get(email).map(String::as_str) == Some(code))
    }

    async fn add_to_mailing_list(&self, account: &account::Model) -> Result<(), AccountError> {
        self.mailing_list.lock().unwrap().push(account.email.clone());
        Ok(())
    }
}

pub struct Connections<S> {
    pub app: S,
    pub db: DbConn,
    pub mailer: TestMailer,
}

async fn init_db() -> Result<DbConn, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

fn test_secret() -> SecretSettings {
    SecretSettings {
        secret_key: "0123456789abcdef0123456789abcdef".to_string(),
        hmac_secret: "integration-test-hmac-secret".to_string(),
        token_expiration: 30,
        activation_code_expiration_seconds: 1800,
    }
}

pub async fn init_app() -> Result<
    Connections<impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>>,
    DbErr,
> {
    let db = init_db().await?;
    let mailer = TestMailer::default();
    let service = AccountService::new(
        AccountAdapter::new(db.clone()),
        Argon2Hasher,
        PasetoTokenIssuer::new(test_secret()),
        mailer.clone(),
    );
    let app = test::init_service(
        App::new()
            .service(routes::health_check)
            .configure(routes::account_routes::<
                AccountAdapter,
                Argon2Hasher,
                PasetoTokenIssuer,
                TestMailer,
            >)
            .app_data(Data::new(service)),
    )
    .await;
    Ok(Connections { app, db, mailer })
}

pub mod factory {
    use chrono::Utc;

    use super::*;

    pub fn account() -> account::ActiveModel {
        let now = Utc::now();
        account::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(format!("{}@test.com", Uuid::now_v7())),
            first_name: Set("Lynn".to_string()),
            last_name: Set("Rivera".to_string()),
            phone: Set("555-1234".to_string()),
            password_hash: Set(TEST_PASSWORD_HASH.to_string()),
            password_salt: Set(TEST_PASSWORD_SALT.to_string()),
            role: Set(Role::Viewer),
            last_login_at: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    pub trait AccountFactory {
        fn email(self, email: &str) -> account::ActiveModel;
        fn role(self, role: Role) -> account::ActiveModel;
    }

    impl AccountFactory for account::ActiveModel {
        fn email(mut self, email: &str) -> account::ActiveModel {
            self.email = Set(email.to_string());
            self
        }

        fn role(mut self, role: Role) -> account::ActiveModel {
            self.role = Set(role);
            self
        }
    }
}
