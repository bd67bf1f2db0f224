pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// Validated input for a rating insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRating {
    pub meeting_id: i64,
    /// Always within `MIN_SCORE..=MAX_SCORE`.
    pub score: i64,
    pub description: String,
    pub email: String,
}
