use actix_web::{HttpResponse, web};

use crate::db::{self, Connector, StoreConnection};
use crate::errors::AppError;
use crate::handlers::{AppState, SuccessBody};
use crate::models::rating::NewRating;
use crate::secrets::SecretStore;
use crate::validate;

pub const RATING_CREATED_MESSAGE: &str = "Avaliação registrada com sucesso";

/// Max length of `avaliacoes.email`.
const EMAIL_MAX_LEN: usize = 255;

/// Parse and range-check a rating body. No connection is opened until this
/// has passed.
pub fn parse_rating_request(body: &[u8]) -> Result<NewRating, AppError> {
    let body = validate::parse_object(body).map_err(AppError::validation)?;

    let meeting_id = validate::coerce_int(&body, "reuniao_id").map_err(AppError::validation)?;
    let score = validate::coerce_int(&body, "nota").map_err(AppError::validation)?;
    let description = validate::optional_string(&body, "descricao").map_err(AppError::validation)?;
    let email = validate::require_string(&body, "email").map_err(AppError::validation)?;

    if let Some(err) = validate::validate_required(&email, "email", EMAIL_MAX_LEN) {
        return Err(AppError::validation(err));
    }
    if let Some(err) = validate::validate_score(score) {
        return Err(AppError::validation(err));
    }

    Ok(NewRating {
        meeting_id,
        score,
        description,
        email: email.trim().to_string(),
    })
}

/// Validate, check the meeting exists, then insert the rating.
///
/// The existence check and the insert are separate statements; a meeting
/// removed in between is caught by the foreign key and reported the same
/// way as a failed check.
pub async fn create_rating<S, C>(state: &AppState<S, C>, body: &[u8]) -> Result<i64, AppError>
where
    S: SecretStore,
    C: Connector,
{
    let rating = parse_rating_request(body)?;

    let conn = state.open_connection().await?;
    db::with_connection(conn, async |conn| {
        conn.ensure_schema().await?;
        if !conn.meeting_exists(rating.meeting_id).await? {
            return Err(AppError::meeting_not_found());
        }
        conn.insert_rating(&rating).await
    })
    .await
}

/// POST /avaliacoes - rate a meeting.
pub async fn create<S, C>(
    state: web::Data<AppState<S, C>>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError>
where
    S: SecretStore + 'static,
    C: Connector + 'static,
{
    let rating_id = create_rating(state.get_ref(), &body).await?;
    log::info!("Created rating {rating_id}");
    Ok(HttpResponse::Created().json(SuccessBody::with_message(RATING_CREATED_MESSAGE)))
}
