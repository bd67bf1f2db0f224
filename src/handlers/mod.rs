pub mod meeting_handlers;
pub mod rating_handlers;

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::config::AppConfig;
use crate::db::Connector;
use crate::errors::AppError;
use crate::secrets::SecretStore;

/// Everything a flow needs. Nothing in here is per-request state.
pub struct AppState<S, C> {
    pub config: AppConfig,
    pub secrets: S,
    pub connector: C,
}

impl<S: SecretStore, C: Connector> AppState<S, C> {
    pub fn new(config: AppConfig, secrets: S, connector: C) -> Self {
        AppState {
            config,
            secrets,
            connector,
        }
    }

    /// Resolve credentials and open this invocation's only connection.
    pub async fn open_connection(&self) -> Result<C::Conn, AppError> {
        let creds = self
            .secrets
            .fetch(&self.config.secret_id, &self.config.region)
            .await?;
        log::debug!("Connecting to {}:{}/{}", creds.host, creds.port, creds.database);
        self.connector.connect(&creds).await
    }
}

/// Body of a successful write.
#[derive(Serialize, Debug)]
pub struct SuccessBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SuccessBody {
    pub fn new() -> Self {
        SuccessBody {
            status: "success",
            message: None,
        }
    }

    pub fn with_message(message: &'static str) -> Self {
        SuccessBody {
            status: "success",
            message: Some(message),
        }
    }
}

impl Default for SuccessBody {
    fn default() -> Self {
        Self::new()
    }
}

/// GET /health - liveness only, never touches storage.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Configure all routes for a given secret store and connector.
pub fn configure<S, C>(cfg: &mut web::ServiceConfig)
where
    S: SecretStore + 'static,
    C: Connector + 'static,
{
    cfg.route("/health", web::get().to(health));
    cfg.service(
        web::resource("/reunioes")
            .route(web::get().to(meeting_handlers::list::<S, C>))
            .route(web::post().to(meeting_handlers::create::<S, C>)),
    );
    cfg.route("/avaliacoes", web::post().to(rating_handlers::create::<S, C>));
}
