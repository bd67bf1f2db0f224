use crate::errors::AppError;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_EXTENSION_ENDPOINT: &str = "http://localhost:2773";

/// Where database credentials come from.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretBackend {
    /// AWS Parameters and Secrets extension on the local host.
    Extension { endpoint: String, token: Option<String> },
    /// A secret document handed over through `DB_SECRET_JSON`.
    Env { document: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_id: String,
    pub region: String,
    /// Only Create Meeting requires this; the topic is declared but no
    /// notification is published.
    pub notification_topic: Option<String>,
    pub secret_backend: SecretBackend,
    pub bind_addr: String,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup, so tests don't have
    /// to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_id = get("DB_SECRET_ARN").ok_or(AppError::Configuration("DB_SECRET_ARN"))?;
        let region = get("AWS_REGION").ok_or(AppError::Configuration("AWS_REGION"))?;

        let secret_backend = match get("SECRET_BACKEND").as_deref() {
            None | Some("extension") => SecretBackend::Extension {
                endpoint: get("SECRETS_EXTENSION_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_EXTENSION_ENDPOINT.to_string()),
                token: get("AWS_SESSION_TOKEN"),
            },
            Some("env") => SecretBackend::Env {
                document: get("DB_SECRET_JSON").ok_or(AppError::Configuration("DB_SECRET_JSON"))?,
            },
            Some(other) => {
                log::error!("Unknown SECRET_BACKEND '{other}', expected 'extension' or 'env'");
                return Err(AppError::Configuration("SECRET_BACKEND"));
            }
        };

        Ok(AppConfig {
            secret_id,
            region,
            notification_topic: get("SNS_TOPIC_ARN"),
            secret_backend,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }

    /// The notification topic, failing the invocation when it is absent.
    pub fn require_notification_topic(&self) -> Result<&str, AppError> {
        self.notification_topic
            .as_deref()
            .ok_or(AppError::Configuration("SNS_TOPIC_ARN"))
    }
}
