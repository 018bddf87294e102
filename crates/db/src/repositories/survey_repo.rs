//! Repository for the `surveys` and `survey_responses` tables.

use conjunto_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use conjunto_core::survey::{Answers, STATUS_DRAFT};
use conjunto_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::survey::{CreateSurvey, Survey, SurveyFilter, SurveyResponse, UpdateSurvey};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, status, starts_at, ends_at, is_anonymous, \
                       questions, created_by, created_at, updated_at";

const RESPONSE_COLUMNS: &str = "id, survey_id, user_id, answers, created_at, updated_at";

/// Provides CRUD, publishing and response operations for surveys.
pub struct SurveyRepo;

impl SurveyRepo {
    /// Insert a new survey in `draft` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSurvey,
        created_by: DbId,
    ) -> Result<Survey, sqlx::Error> {
        let query = format!(
            "INSERT INTO surveys (title, description, starts_at, ends_at, is_anonymous,
                                  questions, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, FALSE), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_anonymous)
            .bind(Json(&input.questions))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM surveys WHERE id = $1");
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List surveys, most recent window first.
    ///
    /// With `published_only`, drafts are left out whatever the filter says.
    pub async fn list(
        pool: &PgPool,
        filter: &SurveyFilter,
        published_only: bool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Survey>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM surveys
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND (NOT $2 OR status <> 'draft')
             ORDER BY starts_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(&filter.status)
            .bind(published_only)
            .bind(clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT))
            .bind(clamp_offset(offset))
            .fetch_all(pool)
            .await
    }

    /// Update a survey that is still a draft.
    ///
    /// Returns `None` if the survey is missing or already published.
    pub async fn update_draft(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSurvey,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                ends_at = COALESCE($5, ends_at),
                is_anonymous = COALESCE($6, is_anonymous),
                questions = COALESCE($7, questions)
             WHERE id = $1 AND status = $8
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_anonymous)
            .bind(input.questions.as_ref().map(Json))
            .bind(STATUS_DRAFT)
            .fetch_optional(pool)
            .await
    }

    /// Move a survey from `from` to `to`.
    ///
    /// Returns `None` if the survey is no longer in status `from`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Survey>, sqlx::Error> {
        let query = format!(
            "UPDATE surveys SET status = $3 WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Survey>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a user's answers. A second response by the same user violates
    /// `uq_survey_responses_survey_user`.
    pub async fn add_response(
        pool: &PgPool,
        survey_id: DbId,
        user_id: DbId,
        answers: &Answers,
    ) -> Result<SurveyResponse, sqlx::Error> {
        let query = format!(
            "INSERT INTO survey_responses (survey_id, user_id, answers)
             VALUES ($1, $2, $3)
             RETURNING {RESPONSE_COLUMNS}"
        );
        sqlx::query_as::<_, SurveyResponse>(&query)
            .bind(survey_id)
            .bind(user_id)
            .bind(Json(answers))
            .fetch_one(pool)
            .await
    }

    /// Answer sets of every response to a survey, oldest first.
    pub async fn list_answers(pool: &PgPool, survey_id: DbId) -> Result<Vec<Answers>, sqlx::Error> {
        let rows: Vec<Json<Answers>> = sqlx::query_scalar(
            "SELECT answers FROM survey_responses WHERE survey_id = $1 ORDER BY id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|Json(answers)| answers).collect())
    }

    pub async fn response_count(pool: &PgPool, survey_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses WHERE survey_id = $1")
            .bind(survey_id)
            .fetch_one(pool)
            .await
    }

    /// Whether the user already answered the survey.
    pub async fn has_responded(
        pool: &PgPool,
        survey_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM survey_responses WHERE survey_id = $1 AND user_id = $2)",
        )
        .bind(survey_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
