use actix_web::{dev::Server, web::Data, App, HttpServer};
use sea_orm::{Database, DatabaseConnection};

use crate::db_adapters::account_adapter::AccountAdapter;
use crate::services::account::AccountService;
use crate::settings::Settings;
use crate::utils::{
    auth::{password::Argon2Hasher, tokens::PasetoTokenIssuer},
    emails::SmtpActivationMailer,
};

pub type LiveAccountService =
    AccountService<AccountAdapter, Argon2Hasher, PasetoTokenIssuer, SmtpActivationMailer>;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        let db = get_database_connection(&settings).await;
        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );

        let listener = std::net::TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, db, settings)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn get_database_connection(settings: &Settings) -> DatabaseConnection {
    Database::connect(&settings.database.url)
        .await
        .expect("Failed to open DB connection.")
}

fn run(
    listener: std::net::TcpListener,
    db: DatabaseConnection,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let cfg = deadpool_redis::Config::from_url(settings.redis.url.clone());
    let redis_pool = cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("Cannot create deadpool redis.");

    let service: LiveAccountService = AccountService::new(
        AccountAdapter::new(db),
        Argon2Hasher,
        PasetoTokenIssuer::new(settings.secret.clone()),
        SmtpActivationMailer::new(redis_pool, settings),
    );

    let server = HttpServer::new(move || {
        App::new()
            .service(crate::routes::health_check)
            .configure(crate::routes::account_routes::<
                AccountAdapter,
                Argon2Hasher,
                PasetoTokenIssuer,
                SmtpActivationMailer,
            >)
            .app_data(Data::new(service.clone()))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
