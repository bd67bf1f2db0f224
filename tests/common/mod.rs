//! Shared test infrastructure for flow and API tests.
//!
//! # In-memory storage
//! - `MockDb` - tables plus connection accounting (opened, closed, leaked)
//! - `MockConnector` - hands out `MockConnection`s bound to one `MockDb`
//! - `Fail` - inject a failure at a given stage
//!
//! # State builders
//! - `state_with(db)` - valid credentials, all config present
//! - `state_with_secret(db, doc)` - custom secret document
//! - `state_without_topic(db)` - `SNS_TOPIC_ARN` unset

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;

use meeting_feedback::config::AppConfig;
use meeting_feedback::db::{Connector, StoreConnection};
use meeting_feedback::errors::AppError;
use meeting_feedback::handlers::AppState;
use meeting_feedback::models::meeting::{Meeting, NewMeeting};
use meeting_feedback::models::rating::NewRating;
use meeting_feedback::secrets::{DbCredentials, EnvSecretStore};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const SECRET_DOC: &str =
    r#"{"host":"db.test","dbname":"agenda","username":"app","password":"pw"}"#;
pub const TEST_EMAIL: &str = "a@b.com";

pub type TestState = AppState<EnvSecretStore, MockConnector>;

// ============================================================================
// MOCK STORAGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fail {
    Connect,
    Schema,
    Query,
    /// The meeting disappears between the existence check and the insert.
    MeetingDeletedBeforeInsert,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub meetings: Vec<Meeting>,
    pub ratings: Vec<NewRating>,
    pub tables_created: usize,
    pub schema_calls: usize,
    pub opened: usize,
    pub closed: usize,
    pub leaked: usize,
    pub last_credentials: Option<DbCredentials>,
    pub fail: Option<Fail>,
}

#[derive(Debug, Default)]
pub struct MockDb {
    state: Mutex<MockState>,
}

impl MockDb {
    pub fn new() -> Arc<Self> {
        Arc::new(MockDb::default())
    }

    pub fn failing(fail: Fail) -> Arc<Self> {
        let db = MockDb::new();
        db.lock().fail = Some(fail);
        db
    }

    pub fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    /// Seed a meeting directly, bypassing the flows.
    pub fn seed_meeting(&self, name: &str) -> i64 {
        let mut st = self.lock();
        let id = st.meetings.len() as i64 + 1;
        st.meetings.push(Meeting {
            id,
            name: name.to_string(),
            scheduled_at: date_time("2025-01-15 09:00:00"),
            participants: Some("ana, bruno".to_string()),
        });
        id
    }

    /// Every opened connection was closed exactly once and none leaked.
    pub fn assert_balanced(&self, expected_opened: usize) {
        let st = self.lock();
        assert_eq!(st.opened, expected_opened, "connections opened");
        assert_eq!(st.closed, expected_opened, "connections closed");
        assert_eq!(st.leaked, 0, "connections dropped without close");
    }
}

pub struct MockConnector {
    pub db: Arc<MockDb>,
}

impl Connector for MockConnector {
    type Conn = MockConnection;

    async fn connect(&self, creds: &DbCredentials) -> Result<MockConnection, AppError> {
        let mut st = self.db.lock();
        st.last_credentials = Some(creds.clone());
        if st.fail == Some(Fail::Connect) {
            return Err(AppError::Connection("connection refused".to_string()));
        }
        st.opened += 1;
        Ok(MockConnection {
            db: Arc::clone(&self.db),
            closed: false,
        })
    }
}

pub struct MockConnection {
    db: Arc<MockDb>,
    closed: bool,
}

impl MockConnection {
    fn check_query(&self) -> Result<(), AppError> {
        let st = self.db.lock();
        assert!(!self.closed, "query on a closed connection");
        if st.tables_created == 0 {
            return Err(AppError::Storage(sqlx::Error::Protocol(
                "table 'reunioes' doesn't exist".to_string(),
            )));
        }
        if st.fail == Some(Fail::Query) {
            return Err(AppError::Storage(sqlx::Error::Protocol(
                "lost connection during query".to_string(),
            )));
        }
        Ok(())
    }
}

impl StoreConnection for MockConnection {
    async fn ensure_schema(&mut self) -> Result<(), AppError> {
        let mut st = self.db.lock();
        st.schema_calls += 1;
        if st.fail == Some(Fail::Schema) {
            return Err(AppError::SchemaInit(sqlx::Error::Protocol(
                "CREATE command denied".to_string(),
            )));
        }
        // CREATE TABLE IF NOT EXISTS: both tables exist after the first call.
        if st.tables_created == 0 {
            st.tables_created = 2;
        }
        Ok(())
    }

    async fn list_meetings(&mut self) -> Result<Vec<Meeting>, AppError> {
        self.check_query()?;
        Ok(self.db.lock().meetings.clone())
    }

    async fn insert_meeting(&mut self, meeting: &NewMeeting) -> Result<i64, AppError> {
        self.check_query()?;
        let mut st = self.db.lock();
        let id = st.meetings.last().map_or(1, |m| m.id + 1);
        st.meetings.push(Meeting {
            id,
            name: meeting.name.clone(),
            scheduled_at: meeting.scheduled_at,
            participants: Some(meeting.participants.clone()),
        });
        Ok(id)
    }

    async fn meeting_exists(&mut self, meeting_id: i64) -> Result<bool, AppError> {
        self.check_query()?;
        Ok(self.db.lock().meetings.iter().any(|m| m.id == meeting_id))
    }

    async fn insert_rating(&mut self, rating: &NewRating) -> Result<i64, AppError> {
        self.check_query()?;
        let mut st = self.db.lock();
        if st.fail == Some(Fail::MeetingDeletedBeforeInsert) {
            st.meetings.retain(|m| m.id != rating.meeting_id);
        }
        // Foreign key on reuniao_id.
        if !st.meetings.iter().any(|m| m.id == rating.meeting_id) {
            return Err(AppError::meeting_not_found());
        }
        assert!((1..=5).contains(&rating.score), "CHECK constraint on nota");
        st.ratings.push(rating.clone());
        Ok(st.ratings.len() as i64)
    }

    async fn close(mut self) {
        assert!(!self.closed, "connection closed twice");
        self.closed = true;
        self.db.lock().closed += 1;
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        if !self.closed {
            if let Ok(mut st) = self.db.state.lock() {
                st.leaked += 1;
            }
        }
    }
}

// ============================================================================
// STATE BUILDERS
// ============================================================================

pub fn test_config(with_topic: bool) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "DB_SECRET_ARN" => Some("arn:aws:secretsmanager:sa-east-1:000000000000:secret:db".into()),
        "AWS_REGION" => Some("sa-east-1".into()),
        "SNS_TOPIC_ARN" if with_topic => Some("arn:aws:sns:sa-east-1:000000000000:reunioes".into()),
        "SECRET_BACKEND" => Some("env".into()),
        "DB_SECRET_JSON" => Some(SECRET_DOC.into()),
        _ => None,
    })
    .expect("test config")
}

pub fn state_with(db: &Arc<MockDb>) -> TestState {
    state_with_secret(db, SECRET_DOC)
}

pub fn state_with_secret(db: &Arc<MockDb>, secret_doc: &str) -> TestState {
    AppState::new(
        test_config(true),
        EnvSecretStore::new(secret_doc),
        MockConnector { db: Arc::clone(db) },
    )
}

pub fn state_without_topic(db: &Arc<MockDb>) -> TestState {
    AppState::new(
        test_config(false),
        EnvSecretStore::new(SECRET_DOC),
        MockConnector { db: Arc::clone(db) },
    )
}

pub fn date_time(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").expect("valid date-time")
}

/// Build an actix test service over the given state.
#[allow(unused_macros)]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state))
                .configure(
                    meeting_feedback::handlers::configure::<
                        meeting_feedback::secrets::EnvSecretStore,
                        common::MockConnector,
                    >,
                ),
        )
        .await
    };
}
