use mfa_accounts_backend::{settings, startup, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let settings = settings::get_settings().expect("Failed to read settings.");

    let _guard = telemetry::init_subscriber(settings.debug);

    let application = startup::Application::build(settings).await?;

    tracing::event!(target: "backend", tracing::Level::INFO, "Listening on port {}.", application.port());

    application.run_until_stopped().await?;
    Ok(())
}
