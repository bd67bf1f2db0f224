use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Wire and storage format for meeting date-times.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored meeting, as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meeting {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "data_hora", serialize_with = "serialize_date_time")]
    pub scheduled_at: NaiveDateTime,
    #[serde(rename = "participantes")]
    pub participants: Option<String>,
}

/// Validated input for a meeting insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeeting {
    pub name: String,
    pub scheduled_at: NaiveDateTime,
    /// Participant list as free text; structured input is kept as its JSON text.
    pub participants: String,
}

fn serialize_date_time<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(DATE_TIME_FORMAT))
}
