use std::env;

use serde::Deserialize;

#[derive(Deserialize, Clone, Default)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub debug: bool,
    pub redis: RedisSettings,
    pub secret: SecretSettings,
    pub email: EmailSettings,
}

impl Settings {
    pub fn base_settings() -> Self {
        Self {
            application: ApplicationSettings {
                port: 5000,
                ..Default::default()
            },
            secret: SecretSettings {
                token_expiration: 30,
                activation_code_expiration_seconds: 1800,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[derive(Deserialize, Clone, Default)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
    pub base_url: String,
    pub protocol: String,
}

#[derive(Deserialize, Clone, Default, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct RedisSettings {
    pub url: String,
}

#[derive(Deserialize, Clone, Default)]
pub struct SecretSettings {
    pub secret_key: String,
    pub hmac_secret: String,
    /// Bearer token lifetime, in minutes.
    pub token_expiration: i64,
    pub activation_code_expiration_seconds: u64,
}

#[derive(Deserialize, Clone, Default)]
pub struct EmailSettings {
    pub host: String,
    pub host_user: String,
    pub host_user_password: String,
    pub sender: String,
}

pub enum Environment {
    Testing,
    Development,
    Production,
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "testing" => Ok(Self::Testing),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(format!("{} is not a supported environment.", other)),
        }
    }
}

pub fn get_settings() -> Result<Settings, String> {
    match Environment::try_from(env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "production".into()))
    {
        Ok(env) => match env {
            Environment::Testing => get_development_settings(),
            Environment::Development => get_development_settings(),
            Environment::Production => get_production_settings(),
        },
        Err(e) => Err(format!("Failed to parse APP_ENVIRONMENT: {}", e)),
    }
}

fn get_development_settings() -> Result<Settings, String> {
    let b = Settings::base_settings();
    merge_env(Settings {
        application: ApplicationSettings {
            protocol: "http".to_string(),
            host: "127.0.0.1".to_string(),
            base_url: "http://127.0.0.1".to_string(),
            ..b.application
        },
        debug: true,
        ..b
    })
}

fn get_production_settings() -> Result<Settings, String> {
    let b = Settings::base_settings();
    merge_env(Settings {
        application: ApplicationSettings {
            protocol: "https".to_string(),
            host: "0.0.0.0".to_string(),
            base_url: "".to_string(),
            ..b.application
        },
        debug: false,
        ..b
    })
}

fn merge_env(s: Settings) -> Result<Settings, String> {
    Ok(Settings {
        database: DatabaseSettings {
            url: get_env_var("DATABASE_URL")?,
        },
        debug: match env::var("APP_DEBUG") {
            Ok(debug) => &debug == "true",
            Err(_) => s.debug,
        },
        redis: RedisSettings {
            url: get_env_var("REDIS_URL")?,
        },
        secret: SecretSettings {
            secret_key: get_env_var("APP_SECRET__SECRET_KEY")?,
            hmac_secret: get_env_var("APP_SECRET__HMAC_SECRET")?,
            ..s.secret
        },
        email: EmailSettings {
            host: get_env_var("APP_EMAIL__HOST")?,
            host_user: get_env_var("APP_EMAIL__HOST_USER")?,
            host_user_password: get_env_var("APP_EMAIL__HOST_USER_PASSWORD")?,
            sender: get_env_var("APP_EMAIL__SENDER")?,
        },
        ..s
    })
}

fn get_env_var(key: &str) -> Result<String, String> {
    env::var(key).map_err(|e| format!("{}: {}", key, e))
}
