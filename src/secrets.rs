//! Database credential resolution.
//!
//! Credentials are fetched on every invocation, never cached. The secret
//! document is the JSON layout used by AWS Secrets Manager for RDS secrets:
//! `host`, `dbname`, `username`, `password` and an optional `port`.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::config::SecretBackend;
use crate::errors::AppError;

pub const DEFAULT_PORT: u16 = 3306;

const EXTENSION_TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize, Clone, PartialEq)]
pub struct DbCredentials {
    pub host: String,
    #[serde(rename = "dbname")]
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredentials")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Secrets Manager stores `port` as a number, hand-written secrets often
/// as a string. Accept both; null falls back to the default.
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(DEFAULT_PORT),
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|p| u16::try_from(p).ok())
            .ok_or_else(|| D::Error::custom(format!("invalid port {n}"))),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<u16>()
            .map_err(|_| D::Error::custom(format!("invalid port '{s}'"))),
        other => Err(D::Error::custom(format!("invalid port {other}"))),
    }
}

impl DbCredentials {
    /// Decode a secret document into credentials.
    pub fn from_secret_string(secret: &str) -> Result<Self, AppError> {
        serde_json::from_str(secret)
            .map_err(|e| AppError::CredentialUnavailable(format!("malformed secret: {e}")))
    }
}

/// Source of database credentials.
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    async fn fetch(&self, secret_id: &str, region: &str) -> Result<DbCredentials, AppError>;
}

/// Reads secrets through the AWS Parameters and Secrets extension, which
/// serves Secrets Manager over plain HTTP on localhost.
pub struct ExtensionSecretStore {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ExtensionResponse {
    #[serde(rename = "SecretString")]
    secret_string: Option<String>,
}

impl ExtensionSecretStore {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AppError::CredentialUnavailable(format!("http client: {e}")))?;
        Ok(ExtensionSecretStore {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }
}

impl SecretStore for ExtensionSecretStore {
    async fn fetch(&self, secret_id: &str, region: &str) -> Result<DbCredentials, AppError> {
        log::debug!("Fetching secret {secret_id} ({region}) from {}", self.endpoint);

        let mut request = self
            .client
            .get(format!("{}/secretsmanager/get", self.endpoint))
            .query(&[("secretId", secret_id)]);
        if let Some(token) = &self.token {
            request = request.header(EXTENSION_TOKEN_HEADER, token);
        }

        let resp = request.send().await.map_err(|e| {
            AppError::CredentialUnavailable(format!("secret store unreachable: {e}"))
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::CredentialUnavailable(format!(
                "secret store returned {status}: {body}"
            )));
        }

        let payload: ExtensionResponse = resp
            .json()
            .await
            .map_err(|e| AppError::CredentialUnavailable(format!("unreadable response: {e}")))?;

        let secret = payload.secret_string.ok_or_else(|| {
            AppError::CredentialUnavailable("secret has no SecretString".to_string())
        })?;
        DbCredentials::from_secret_string(&secret)
    }
}

/// Serves one fixed secret document, for local runs and tests.
pub struct EnvSecretStore {
    document: String,
}

impl EnvSecretStore {
    pub fn new(document: impl Into<String>) -> Self {
        EnvSecretStore {
            document: document.into(),
        }
    }
}

impl SecretStore for EnvSecretStore {
    async fn fetch(&self, secret_id: &str, region: &str) -> Result<DbCredentials, AppError> {
        log::debug!("Using local secret document for {secret_id} ({region})");
        DbCredentials::from_secret_string(&self.document)
    }
}

/// Backend chosen at startup from configuration.
pub enum ConfiguredSecretStore {
    Extension(ExtensionSecretStore),
    Env(EnvSecretStore),
}

impl ConfiguredSecretStore {
    pub fn from_backend(backend: &SecretBackend) -> Result<Self, AppError> {
        Ok(match backend {
            SecretBackend::Extension { endpoint, token } => ConfiguredSecretStore::Extension(
                ExtensionSecretStore::new(endpoint, token.clone())?,
            ),
            SecretBackend::Env { document } => {
                ConfiguredSecretStore::Env(EnvSecretStore::new(document.clone()))
            }
        })
    }
}

impl SecretStore for ConfiguredSecretStore {
    async fn fetch(&self, secret_id: &str, region: &str) -> Result<DbCredentials, AppError> {
        match self {
            ConfiguredSecretStore::Extension(store) => store.fetch(secret_id, region).await,
            ConfiguredSecretStore::Env(store) => store.fetch(secret_id, region).await,
        }
    }
}
