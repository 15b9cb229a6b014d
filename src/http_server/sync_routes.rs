//! Reconciliation HTTP routes
//!
//! - `POST /save` — upsert hostel documents into the mirror
//! - `GET /restore` — replay the mirror into the ledger
//! - `GET /reset-store` — clear the mirror (no ledger counterpart)
//! - `DELETE /hostel/{name}`
//! - `DELETE /room/{hostel}/{room_id}`
//! - `DELETE /student/{wallet}`
//! - `DELETE /admin/{wallet}`

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::model::Hostel;
use crate::reconcile::{RestoreReport, SyncEngine};

use super::errors::ApiError;

// ==================
// Shared State
// ==================

/// State shared across reconciliation handlers.
pub struct SyncState {
    pub engine: SyncEngine,
}

impl SyncState {
    pub fn new(engine: SyncEngine) -> Self {
        Self { engine }
    }
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
    pub hostels: usize,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<RestoreReport>,
}

// ==================
// Routes
// ==================

/// Create the reconciliation routes.
pub fn sync_routes(state: Arc<SyncState>) -> Router {
    Router::new()
        .route("/save", post(save_handler))
        .route("/restore", get(restore_handler))
        .route("/reset-store", get(reset_store_handler))
        .route("/hostel/{name}", delete(delete_hostel_handler))
        .route("/room/{hostel}/{room_id}", delete(delete_room_handler))
        .route("/student/{wallet}", delete(delete_student_handler))
        .route("/admin/{wallet}", delete(delete_admin_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn save_handler(
    State(state): State<Arc<SyncState>>,
    Json(body): Json<Value>,
) -> Result<Json<SaveResponse>, ApiError> {
    if !body.is_array() {
        return Err(ApiError::invalid_input("expected an array of hostels"));
    }
    let hostels: Vec<Hostel> = serde_json::from_value(body)
        .map_err(|e| ApiError::invalid_input(format!("malformed hostel document: {}", e)))?;

    let count = state.engine.save(hostels).await?;
    Ok(Json(SaveResponse {
        message: "Snapshot saved".to_string(),
        hostels: count,
    }))
}

async fn restore_handler(
    State(state): State<Arc<SyncState>>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let report = state.engine.restore().await?;
    if report.is_empty_run() {
        return Ok(Json(RestoreResponse {
            message: "No data to restore".to_string(),
            report: None,
        }));
    }
    let message = if report.is_clean() {
        "Snapshot restored to ledger".to_string()
    } else {
        format!(
            "Snapshot restored to ledger with {} item failure(s)",
            report.failures.len()
        )
    };
    Ok(Json(RestoreResponse {
        message,
        report: Some(report),
    }))
}

async fn reset_store_handler(
    State(state): State<Arc<SyncState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.engine.reset_store().await?;
    Ok(Json(MessageResponse {
        message: "Snapshot store cleared".to_string(),
    }))
}

async fn delete_hostel_handler(
    State(state): State<Arc<SyncState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.engine.delete_hostel(&name).await?;
    Ok(Json(MessageResponse {
        message: format!("Hostel {} deleted", name),
    }))
}

async fn delete_room_handler(
    State(state): State<Arc<SyncState>>,
    Path((hostel, room_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room_id: u64 = room_id
        .trim()
        .parse()
        .map_err(|_| ApiError::invalid_input(format!("room id {:?} is not an integer", room_id)))?;

    state.engine.delete_room(&hostel, room_id).await?;
    Ok(Json(MessageResponse {
        message: format!("Room {} in {} deleted", room_id, hostel),
    }))
}

async fn delete_student_handler(
    State(state): State<Arc<SyncState>>,
    Path(wallet): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.engine.delete_student(&wallet).await?;
    Ok(Json(MessageResponse {
        message: format!("Student {} deleted", wallet),
    }))
}

async fn delete_admin_handler(
    State(state): State<Arc<SyncState>>,
    Path(wallet): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.engine.delete_admin(&wallet).await?;
    Ok(Json(MessageResponse {
        message: format!("Admin {} deleted", wallet),
    }))
}
