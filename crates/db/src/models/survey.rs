//! Survey and survey response models.

use conjunto_core::survey::{Answers, Question};
use conjunto_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `surveys` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Survey {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_anonymous: bool,
    pub questions: Json<Vec<Question>>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a survey. Surveys start as `draft`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSurvey {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub is_anonymous: Option<bool>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// DTO for updating a draft survey. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSurvey {
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub is_anonymous: Option<bool>,
    pub questions: Option<Vec<Question>>,
}

/// A row from the `survey_responses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SurveyResponse {
    pub id: DbId,
    pub survey_id: DbId,
    pub user_id: DbId,
    pub answers: Json<Answers>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Filters accepted by the survey list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyFilter {
    pub status: Option<String>,
}
