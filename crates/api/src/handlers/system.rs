//! System configuration reads.

use axum::extract::State;
use axum::Json;
use muralis_core::error::CoreError;
use muralis_db::models::system_config::SystemConfig;
use muralis_db::repositories::SystemConfigRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

const PRIVACY_AGREEMENT_KEY: &str = "privacy_agreement";

/// GET /api/v1/system/privacy-agreement
///
/// Public: the agreement text is shown before registration, so no auth.
pub async fn privacy_agreement(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SystemConfig>>> {
    let config = SystemConfigRepo::get(&state.pool, PRIVACY_AGREEMENT_KEY)
        .await?
        .ok_or_else(|| CoreError::not_found("System config", PRIVACY_AGREEMENT_KEY))?;
    Ok(Json(DataResponse { data: config }))
}
