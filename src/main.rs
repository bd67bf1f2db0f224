use actix_web::{App, HttpServer, middleware, web};

use meeting_feedback::config::AppConfig;
use meeting_feedback::db::MySqlConnector;
use meeting_feedback::handlers::{self, AppState};
use meeting_feedback::secrets::ConfiguredSecretStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let secrets = ConfiguredSecretStore::from_backend(&config.secret_backend)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    if config.notification_topic.is_none() {
        log::warn!("SNS_TOPIC_ARN not set; POST /reunioes will fail until it is configured");
    }

    let bind_addr = config.bind_addr.clone();
    log::info!(
        "Starting server at http://{bind_addr} (secret {}, region {})",
        config.secret_id,
        config.region
    );

    let state = web::Data::new(AppState::new(config, secrets, MySqlConnector::default()));

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(handlers::configure::<ConfiguredSecretStore, MySqlConnector>)
    })
    .bind(bind_addr)?
    .run()
    .await
}
