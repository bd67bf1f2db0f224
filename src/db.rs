//! Per-invocation storage access.
//!
//! Every request opens exactly one connection, uses it for all of its
//! statements and closes it before responding. There is no pool.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};

use crate::errors::AppError;
use crate::models::meeting::{self, Meeting, NewMeeting};
use crate::models::rating::{self, NewRating};
use crate::secrets::DbCredentials;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub const CREATE_MEETINGS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS reunioes (
    id INT AUTO_INCREMENT PRIMARY KEY,
    nome VARCHAR(255) NOT NULL,
    data_hora DATETIME NOT NULL,
    participantes TEXT,
    data_hora_cadastro DATETIME DEFAULT CURRENT_TIMESTAMP
) ENGINE=InnoDB";

pub const CREATE_RATINGS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS avaliacoes (
    id INT AUTO_INCREMENT PRIMARY KEY,
    reuniao_id INT NOT NULL,
    nota INT NOT NULL CHECK (nota BETWEEN 1 AND 5),
    descricao TEXT,
    email VARCHAR(255) NOT NULL,
    data_hora_cadastro DATETIME DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (reuniao_id) REFERENCES reunioes(id)
) ENGINE=InnoDB";

/// Opens storage connections from resolved credentials.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Conn: StoreConnection;

    async fn connect(&self, creds: &DbCredentials) -> Result<Self::Conn, AppError>;
}

/// The statements a flow can run on an open connection.
#[allow(async_fn_in_trait)]
pub trait StoreConnection {
    /// Create both tables if missing. Safe to call on every request.
    async fn ensure_schema(&mut self) -> Result<(), AppError>;

    async fn list_meetings(&mut self) -> Result<Vec<Meeting>, AppError>;

    async fn insert_meeting(&mut self, meeting: &NewMeeting) -> Result<i64, AppError>;

    async fn meeting_exists(&mut self, meeting_id: i64) -> Result<bool, AppError>;

    /// Insert a rating. A missing meeting surfaces as `AppError::NotFound`.
    async fn insert_rating(&mut self, rating: &NewRating) -> Result<i64, AppError>;

    /// Release the connection. Failures are logged, never surfaced.
    async fn close(self);
}

/// Run `body` on `conn`, then close `conn` whatever the outcome.
pub async fn with_connection<C, T, F>(mut conn: C, body: F) -> Result<T, AppError>
where
    C: StoreConnection,
    F: AsyncFnOnce(&mut C) -> Result<T, AppError>,
{
    let outcome = body(&mut conn).await;
    conn.close().await;
    outcome
}

/// Connects to MySQL with a bounded connection-establishment time.
#[derive(Debug, Clone)]
pub struct MySqlConnector {
    pub timeout: Duration,
}

impl Default for MySqlConnector {
    fn default() -> Self {
        MySqlConnector {
            timeout: CONNECT_TIMEOUT,
        }
    }
}

impl Connector for MySqlConnector {
    type Conn = MySqlConnection;

    async fn connect(&self, creds: &DbCredentials) -> Result<MySqlConnection, AppError> {
        use sqlx::Connection;

        let options = MySqlConnectOptions::new()
            .host(&creds.host)
            .port(creds.port)
            .username(&creds.username)
            .password(&creds.password)
            .database(&creds.database);

        match tokio::time::timeout(self.timeout, MySqlConnection::connect_with(&options)).await {
            Ok(Ok(conn)) => Ok(conn),
            Ok(Err(e)) => Err(AppError::Connection(e.to_string())),
            Err(_) => Err(AppError::Connection(format!(
                "timed out after {}s connecting to {}:{}",
                self.timeout.as_secs(),
                creds.host,
                creds.port
            ))),
        }
    }
}

impl StoreConnection for MySqlConnection {
    async fn ensure_schema(&mut self) -> Result<(), AppError> {
        for ddl in [CREATE_MEETINGS_TABLE, CREATE_RATINGS_TABLE] {
            sqlx::query(ddl)
                .execute(&mut *self)
                .await
                .map_err(AppError::SchemaInit)?;
        }
        log::debug!("Schema ready (reunioes, avaliacoes)");
        Ok(())
    }

    async fn list_meetings(&mut self) -> Result<Vec<Meeting>, AppError> {
        Ok(meeting::find_all(self).await?)
    }

    async fn insert_meeting(&mut self, new_meeting: &NewMeeting) -> Result<i64, AppError> {
        Ok(meeting::create(self, new_meeting).await?)
    }

    async fn meeting_exists(&mut self, meeting_id: i64) -> Result<bool, AppError> {
        Ok(meeting::exists(self, meeting_id).await?)
    }

    async fn insert_rating(&mut self, new_rating: &NewRating) -> Result<i64, AppError> {
        rating::create(self, new_rating).await.map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_foreign_key_violation()) {
                AppError::meeting_not_found()
            } else {
                AppError::Storage(e)
            }
        })
    }

    async fn close(self) {
        if let Err(e) = sqlx::Connection::close(self).await {
            log::warn!("Error while closing database connection: {e}");
        }
    }
}
