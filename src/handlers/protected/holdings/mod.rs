// handlers/protected/holdings - CRUD over the caller's holdings
mod collection;
mod record;

pub use collection::{create, list};
pub use record::{delete, show, update};

use axum::{extract::rejection::JsonRejection, Json};
use uuid::Uuid;

use crate::database::models::{HoldingDraft, HoldingInput};
use crate::error::ApiError;

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request("invalid holding id"))
}

fn parse_draft(payload: Result<Json<HoldingInput>, JsonRejection>) -> Result<HoldingDraft, ApiError> {
    let Json(input) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    input
        .validate()
        .map_err(|field_errors| ApiError::validation_error("Invalid holding", Some(field_errors)))
}

fn not_found() -> ApiError {
    ApiError::not_found("Holding not found")
}
