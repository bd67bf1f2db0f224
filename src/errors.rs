use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;

/// Error taxonomy shared by every flow.
///
/// Internal variants keep their source for the log line; the response body
/// only carries the stable message from `public_message`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0} is not set")]
    Configuration(&'static str),
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Schema init error: {0}")]
    SchemaInit(#[source] sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

/// JSON envelope for every non-success response.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl AppError {
    pub fn validation(detail: impl std::fmt::Display) -> Self {
        AppError::Validation(format!("Dados inválidos: {detail}"))
    }

    pub fn meeting_not_found() -> Self {
        AppError::NotFound("Reunião não encontrada".to_string())
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Configuration(_) => "Configuração do serviço incompleta".to_string(),
            AppError::CredentialUnavailable(_) => {
                "Credenciais do banco de dados indisponíveis".to_string()
            }
            AppError::Connection(_) => "Falha ao conectar ao banco de dados".to_string(),
            AppError::SchemaInit(_) => "Falha ao preparar as tabelas".to_string(),
            AppError::Validation(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Storage(_) => "Falha ao acessar o banco de dados".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }
        HttpResponse::build(status).json(ErrorBody {
            status: "error",
            message: self.public_message(),
        })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Storage(e)
    }
}
