//! Admin-only bulk operations.

use axum::extract::State;
use axum::Json;
use conjunto_core::bulk::{bulk_entities, table_for_entity, validate_ids};
use conjunto_core::types::DbId;
use conjunto_db::repositories::BulkRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/bulk-delete`.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub entity: String,
    pub ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub entity: String,
    pub deleted: u64,
}

/// POST /api/v1/admin/bulk-delete
///
/// Missing ids are skipped; the response reports how many rows went.
pub async fn bulk_delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<BulkDeleteResponse>>> {
    let table = table_for_entity(&input.entity).ok_or_else(|| {
        AppError::invalid(format!(
            "Unknown entity '{}'. Must be one of: {}",
            input.entity,
            bulk_entities().collect::<Vec<_>>().join(", ")
        ))
    })?;
    validate_ids(&input.ids).map_err(AppError::invalid)?;

    if table == "users" && input.ids.contains(&admin.user_id) {
        return Err(AppError::conflict("You cannot delete your own account"));
    }

    let deleted = BulkRepo::delete_many(&state.pool, table, &input.ids).await?;
    tracing::info!(
        entity = %input.entity,
        requested = input.ids.len(),
        deleted,
        admin_id = admin.user_id,
        "Bulk delete",
    );

    Ok(Json(DataResponse {
        data: BulkDeleteResponse {
            entity: input.entity,
            deleted,
        },
    }))
}
