use chrono::NaiveDateTime;
use sqlx::MySqlConnection;

use super::types::*;

/// All meetings in insertion order.
pub async fn find_all(conn: &mut MySqlConnection) -> Result<Vec<Meeting>, sqlx::Error> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i32,
        nome: String,
        data_hora: NaiveDateTime,
        participantes: Option<String>,
    }

    let rows = sqlx::query_as::<_, Row>(
        "SELECT id, nome, data_hora, participantes FROM reunioes ORDER BY id",
    )
    .fetch_all(conn)
    .await?;

    let meetings = rows
        .into_iter()
        .map(|row| Meeting {
            id: i64::from(row.id),
            name: row.nome,
            scheduled_at: row.data_hora,
            participants: row.participantes,
        })
        .collect();

    Ok(meetings)
}

/// Insert one meeting and return its id.
pub async fn create(conn: &mut MySqlConnection, meeting: &NewMeeting) -> Result<i64, sqlx::Error> {
    let sql = "INSERT INTO reunioes (nome, data_hora, participantes) VALUES (?, ?, ?)";
    let result = sqlx::query(sql)
        .bind(&meeting.name)
        .bind(meeting.scheduled_at)
        .bind(&meeting.participants)
        .execute(conn)
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn exists(conn: &mut MySqlConnection, meeting_id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as("SELECT id FROM reunioes WHERE id = ?")
        .bind(meeting_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}
