use argon2::password_hash::rand_core::{OsRng, RngCore};
use deadpool_redis::{
    redis::{AsyncCommands, SetExpiry, SetOptions},
    Pool,
};
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::{
        authentication::{Credentials, Mechanism},
        PoolConfig,
    },
    Message, SmtpTransport, Transport,
};

use crate::entities::account;
use crate::services::account::ActivationMailer;
use crate::settings::{EmailSettings, Settings};
use crate::types::AccountError;

const ACTIVATION_CODE_KEY_PREFIX: &str = "activation_code_for_";
const MAILING_LIST_KEY: &str = "mailing_list";

/// SMTP + Redis mailer: activation codes live in Redis under a per-email key
/// with an expiry, the mailing list is a Redis set, and the actual SMTP
/// delivery happens on a detached task.
#[derive(Clone)]
pub struct SmtpActivationMailer {
    redis_pool: Pool,
    settings: Settings,
}

impl SmtpActivationMailer {
    pub fn new(redis_pool: Pool, settings: Settings) -> Self {
        Self {
            redis_pool,
            settings,
        }
    }

    fn code_key(email: &str) -> String {
        format!("{}{}", ACTIVATION_CODE_KEY_PREFIX, email)
    }
}

impl ActivationMailer for SmtpActivationMailer {
    async fn generate_code(&self, email: &str) -> Result<String, AccountError> {
        let code = format!("{:06}", OsRng.next_u32() % 1_000_000);

        let mut redis_con = self.redis_pool.get().await.map_err(redis_error)?;
        redis_con
            .set_options::<String, String, ()>(
                Self::code_key(email),
                code.clone(),
                SetOptions::default().with_expiration(SetExpiry::EX(
                    self.settings.secret.activation_code_expiration_seconds,
                )),
            )
            .await
            .map_err(redis_error)?;

        Ok(code)
    }

    async fn verify_code(&self, email: &str, code: &str) -> Result<bool, AccountError> {
        let mut redis_con = self.redis_pool.get().await.map_err(redis_error)?;
        let stored: Option<String> = redis_con
            .get(Self::code_key(email))
            .await
            .map_err(redis_error)?;

        match stored {
            Some(expected) if expected == code => {
                // One-shot: a code never activates twice.
                if let Err(e) = redis_con.del::<String, i64>(Self::code_key(email)).await {
                    tracing::event!(target: "redis", tracing::Level::WARN, "Error deleting used activation code: {:#?}", e);
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    #[tracing::instrument(name = "Sending activation e-mail", skip(self, code))]
    async fn send_activation_email(&self, email: &str, code: &str) -> Result<(), AccountError> {
        let title = "MFA - Activate your account";

        let template = crate::ENV
            .get_template("activation_email.html")
            .map_err(|e| AccountError::Internal(format!("Missing email template: {}", e)))?;
        let html_text = template
            .render(minijinja::context! {
                title => title,
                activation_code => code,
                expiration_minutes =>
                    self.settings.secret.activation_code_expiration_seconds / 60,
            })
            .map_err(|e| AccountError::Internal(format!("Could not render email: {}", e)))?;
        let text = format!(
            r#"
        Your activation code is {}.
        Enter it on the sign-up page to finish creating your account.
        "#,
            code
        );

        let message = Message::builder()
            .from(
                self.settings
                    .email
                    .sender
                    .parse()
                    .map_err(|e| AccountError::Internal(format!("Bad sender address: {}", e)))?,
            )
            .to(email
                .parse()
                .map_err(|e| AccountError::Internal(format!("Bad recipient address: {}", e)))?)
            .subject(title)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_text),
                    ),
            )
            .map_err(|e| AccountError::Internal(format!("Could not build email: {}", e)))?;

        actix_web::rt::spawn(deliver(message, self.settings.email.clone()));
        Ok(())
    }

    async fn add_to_mailing_list(&self, account: &account::Model) -> Result<(), AccountError> {
        let mut redis_con = self.redis_pool.get().await.map_err(redis_error)?;
        redis_con
            .sadd::<&str, String, i64>(MAILING_LIST_KEY, account.email.clone())
            .await
            .map_err(redis_error)?;
        Ok(())
    }
}

async fn deliver(message: Message, settings: EmailSettings) {
    let credentials = Credentials::new(settings.host_user, settings.host_user_password);
    let sender = match SmtpTransport::starttls_relay(&settings.host) {
        Ok(relay) => relay
            .credentials(credentials)
            .authentication(vec![Mechanism::Plain])
            .pool_config(PoolConfig::new().max_size(20))
            .build(),
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Could not reach SMTP relay: {:#?}", e);
            return;
        }
    };

    match sender.send(&message) {
        Ok(_) => {
            tracing::event!(target: "backend", tracing::Level::INFO, "Activation email sent.")
        }
        Err(e) => {
            tracing::event!(target: "backend", tracing::Level::ERROR, "Could not send email: {:#?}", e)
        }
    }
}

fn redis_error<E: std::fmt::Display>(e: E) -> AccountError {
    AccountError::Internal(format!("Redis error: {}", e))
}
