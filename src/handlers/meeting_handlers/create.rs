use actix_web::{HttpResponse, web};

use crate::db::{self, Connector, StoreConnection};
use crate::errors::AppError;
use crate::handlers::{AppState, SuccessBody};
use crate::models::meeting::NewMeeting;
use crate::secrets::SecretStore;
use crate::validate;

/// Max length of `reunioes.nome`.
const NAME_MAX_LEN: usize = 255;

/// Turn a raw request body into a meeting insert.
///
/// Expects `nome`, `data_hora` and `lista_participante`. Runs before any
/// connection is opened. Blank names and unparseable dates are rejected
/// here with 400 instead of being handed to MySQL, same as ratings.
pub fn parse_meeting_request(body: &[u8]) -> Result<NewMeeting, AppError> {
    let body = validate::parse_object(body).map_err(AppError::validation)?;

    let name = validate::require_string(&body, "nome").map_err(AppError::validation)?;
    if let Some(err) = validate::validate_required(&name, "nome", NAME_MAX_LEN) {
        return Err(AppError::validation(err));
    }

    let raw_date = validate::require_string(&body, "data_hora").map_err(AppError::validation)?;
    let scheduled_at = validate::parse_date_time(&raw_date).map_err(AppError::validation)?;

    let participants = match body.get("lista_participante") {
        None | Some(serde_json::Value::Null) => {
            return Err(AppError::validation("campo 'lista_participante' é obrigatório"));
        }
        Some(value) => validate::participants_text(value),
    };

    Ok(NewMeeting {
        name: name.trim().to_string(),
        scheduled_at,
        participants,
    })
}

/// Validate, then insert one meeting on a fresh connection.
pub async fn create_meeting<S, C>(state: &AppState<S, C>, body: &[u8]) -> Result<i64, AppError>
where
    S: SecretStore,
    C: Connector,
{
    let topic = state.config.require_notification_topic()?;
    let meeting = parse_meeting_request(body)?;

    let conn = state.open_connection().await?;
    let meeting_id = db::with_connection(conn, async |conn| {
        conn.ensure_schema().await?;
        conn.insert_meeting(&meeting).await
    })
    .await?;

    log::debug!("Meeting {meeting_id} created; notification topic {topic} left untouched");
    Ok(meeting_id)
}

/// POST /reunioes - create a meeting.
pub async fn create<S, C>(
    state: web::Data<AppState<S, C>>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError>
where
    S: SecretStore + 'static,
    C: Connector + 'static,
{
    let meeting_id = create_meeting(state.get_ref(), &body).await?;
    log::info!("Created meeting {meeting_id}");
    Ok(HttpResponse::Created().json(SuccessBody::new()))
}
