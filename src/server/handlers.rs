//! Generic HTTP handlers for record CRUD operations

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;
use uuid::Uuid;

use crate::core::controller::ResourceController;
use crate::core::error::CrudError;
use crate::core::projection::{Representation, representation_from_value};
use crate::core::record::Record;

/// Parse a path identity; anything but a UUID is a client error
pub fn parse_id<R: Record>(raw: &str) -> Result<Uuid, CrudError> {
    Uuid::parse_str(raw).map_err(|e| CrudError::Decoding {
        record_type: R::record_type().to_string(),
        message: format!("invalid id '{}': {}", raw, e),
    })
}

/// Turn a JSON body (or its rejection) into a representation
pub fn decode_body<R: Record>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Representation, CrudError> {
    let Json(value) = payload.map_err(|rejection| CrudError::Decoding {
        record_type: R::record_type().to_string(),
        message: rejection.body_text(),
    })?;
    representation_from_value::<R>(value)
}

/// List all records
pub async fn list_records<R: Record>(
    State(controller): State<ResourceController<R>>,
) -> Result<Json<Vec<Representation>>, CrudError> {
    Ok(Json(controller.list().await?))
}

/// Create a new record
pub async fn create_record<R: Record>(
    State(controller): State<ResourceController<R>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, CrudError> {
    let input = decode_body::<R>(payload)?;
    let created = controller.create(&input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a specific record by ID
pub async fn get_record<R: Record>(
    State(controller): State<ResourceController<R>>,
    Path(id): Path<String>,
) -> Result<Json<Representation>, CrudError> {
    let id = parse_id::<R>(&id)?;
    Ok(Json(controller.retrieve(id).await?))
}

/// Update a record; fields absent from the body keep their values
pub async fn update_record<R: Record>(
    State(controller): State<ResourceController<R>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Representation>, CrudError> {
    let id = parse_id::<R>(&id)?;
    let input = decode_body::<R>(payload)?;
    Ok(Json(controller.update(id, &input).await?))
}

/// Delete a record
pub async fn delete_record<R: Record>(
    State(controller): State<ResourceController<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, CrudError> {
    let id = parse_id::<R>(&id)?;
    controller.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
