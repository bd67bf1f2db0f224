use sqlx::MySqlConnection;

use super::types::*;

/// Insert one rating and return its id.
///
/// The foreign key on `reuniao_id` rejects ratings for meetings that no
/// longer exist; callers inspect the database error to tell that apart.
pub async fn create(conn: &mut MySqlConnection, rating: &NewRating) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO avaliacoes (reuniao_id, nota, descricao, email) VALUES (?, ?, ?, ?)",
    )
    .bind(rating.meeting_id)
    .bind(rating.score)
    .bind(&rating.description)
    .bind(&rating.email)
    .execute(conn)
    .await?;
    Ok(result.last_insert_id() as i64)
}
