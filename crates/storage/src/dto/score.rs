use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Upper bound on score-batch size, keeping the ingestion transaction short.
pub const MAX_BATCH_SIZE: usize = 500;

/// One row of an uploaded score batch. Scores arrive as strings (file-upload
/// semantics) so a malformed value fails that row, not the whole request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoreBatchEntry {
    pub participation_id: i64,
    pub score: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScoreBatchRequest {
    #[validate(length(min = 1, max = 500, message = "Batch must contain 1 to 500 entries"))]
    pub entries: Vec<ScoreBatchEntry>,
}

/// Per-batch outcome counts plus one message per failed row. A failed row
/// never aborts the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScoreBatchOutcome {
    pub success: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Single-score upsert; a null score clears the stored value and its rank.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateScoreRequest {
    pub score: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClearScoresOutcome {
    pub deleted: u64,
}
