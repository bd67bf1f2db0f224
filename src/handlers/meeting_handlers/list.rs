use actix_web::{HttpResponse, web};

use crate::db::{self, Connector, StoreConnection};
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::models::meeting::Meeting;
use crate::secrets::SecretStore;

/// Fetch every meeting on a fresh connection.
///
/// Rows are only returned when every step succeeded; there is no partial
/// result on error.
pub async fn list_meetings<S, C>(state: &AppState<S, C>) -> Result<Vec<Meeting>, AppError>
where
    S: SecretStore,
    C: Connector,
{
    let conn = state.open_connection().await?;
    db::with_connection(conn, async |conn| {
        conn.ensure_schema().await?;
        conn.list_meetings().await
    })
    .await
}

/// GET /reunioes - list all meetings as a JSON array.
pub async fn list<S, C>(state: web::Data<AppState<S, C>>) -> Result<HttpResponse, AppError>
where
    S: SecretStore + 'static,
    C: Connector + 'static,
{
    let meetings = list_meetings(state.get_ref()).await?;
    log::info!("Listed {} meetings", meetings.len());
    Ok(HttpResponse::Ok().json(meetings))
}
