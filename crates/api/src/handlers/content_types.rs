//! Handlers for the `/content-types` resource.
//!
//! The catalog is static, so none of these touch the database.

use axum::extract::{Path, Query};
use axum::Json;
use onramp_core::blocks::catalog::{self, BlockDescriptor, BlockGroup};
use onramp_core::blocks::schema::validate_new_block;
use onramp_core::error::CoreError;
use onramp_db::models::content_block::ValidateContentBlock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;

/// Query parameters for listing content types.
#[derive(Debug, Deserialize)]
pub struct ListContentTypesParams {
    pub group: Option<String>,
}

/// GET /api/v1/content-types?group=form
///
/// List the block catalog, optionally restricted to one UI group.
pub async fn list_content_types(
    _user: AuthUser,
    Query(params): Query<ListContentTypesParams>,
) -> AppResult<Json<DataResponse<Vec<&'static BlockDescriptor>>>> {
    let data = match params.group.as_deref() {
        None => catalog::all().iter().collect(),
        Some(name) => {
            let group = BlockGroup::from_name(name).ok_or_else(|| {
                AppError::BadRequest(format!("Unknown content type group '{name}'"))
            })?;
            catalog::by_group(group)
        }
    };
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/content-types/{name}
pub async fn get_content_type(
    _user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<&'static BlockDescriptor>>> {
    let data = catalog::lookup(&name)?;
    Ok(Json(DataResponse { data }))
}

/// Default configuration of one content type.
#[derive(Debug, Serialize)]
pub struct DefaultConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    pub default_config: &'static Value,
}

/// GET /api/v1/content-types/{name}/config
pub async fn get_content_type_config(
    _user: AuthUser,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<DefaultConfig>>> {
    let descriptor = catalog::lookup(&name)?;
    Ok(Json(DataResponse {
        data: DefaultConfig {
            name: descriptor.kind.as_str(),
            display_name: descriptor.display_name,
            default_config: &descriptor.default_config,
        },
    }))
}

/// Result of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    pub content_type: Option<String>,
}

/// POST /api/v1/content-types/validate
///
/// Run the creation-time checks on a block without persisting it. Problems
/// are reported in the body with a 200, not as an error response.
pub async fn validate_content(
    _user: AuthUser,
    Json(input): Json<ValidateContentBlock>,
) -> AppResult<Json<ValidationOutcome>> {
    let result = validate_new_block(
        input.block_type.as_deref(),
        &input.config,
        &input.content,
        None,
    );
    let errors = match result {
        Ok(_) => Vec::new(),
        Err(CoreError::Schema(errors)) => errors.iter().map(ToString::to_string).collect(),
        Err(other) => vec![other.to_string()],
    };
    Ok(Json(ValidationOutcome {
        valid: errors.is_empty(),
        errors,
        content_type: input.block_type,
    }))
}
