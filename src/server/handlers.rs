//! Route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::document;
use crate::lesson::request::{EptRequest, SessionForm, SuggestRequest};
use crate::lesson::store::{SessionId, StoredSession};
use crate::lesson::{EptStructure, Suggestions};
use crate::server::AppState;
use crate::server::error::ApiError;

const MISSING_FIELDS: &str = "Faltan datos requeridos (Tema, Nivel, Grado o Área).";
const NO_SESSION: &str = "No hay sesión generada";

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.static_dir.join("index.html");
    tokio::fs::read_to_string(&path).await.map(Html).map_err(|e| {
        warn!(path = %path.display(), error = %e, "index.html not readable");
        ApiError::Internal("Error: No se encuentra el archivo index.html.".to_string())
    })
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "minedu-sessions",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn suggest(
    State(state): State<AppState>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::BadRequest(MISSING_FIELDS.to_string()))?;
    let fields = request
        .validate()
        .ok_or_else(|| ApiError::BadRequest(MISSING_FIELDS.to_string()))?;

    match state.generator.suggest(&fields).await {
        Suggestions::Generated(value) => Ok(Json(json!({ "sugerencias": value }))),
        Suggestions::Fallback(list) => Ok(Json(json!({ "sugerencias": list }))),
        Suggestions::Unusable => Err(ApiError::Internal(
            "No se pudieron generar sugerencias.".to_string(),
        )),
    }
}

pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<SessionForm>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(form) = payload.map_err(bad_body)?;

    let session = state
        .generator
        .generate_session(&form)
        .await
        .map_err(ApiError::from_session_error)?;

    let id = state.store.insert(form, session.clone());
    info!(session_id = %id, "Session ready for download");

    Ok(Json(json!({ "sesion": session, "session_id": id })))
}

pub async fn generate_ept_structure(
    State(state): State<AppState>,
    payload: Result<Json<EptRequest>, JsonRejection>,
) -> Result<Json<EptStructure>, ApiError> {
    let Json(request) = payload.map_err(bad_body)?;
    if request.has_blank_especialidad() {
        return Err(ApiError::BadRequest(
            "La especialidad es obligatoria para EPT.".to_string(),
        ));
    }

    state
        .generator
        .generate_ept_structure(&request)
        .await
        .map(Json)
        .map_err(ApiError::from_ept_error)
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub session_id: Option<String>,
}

pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let stored = find_session(&state, query.session_id.as_deref())?;

    let bytes = document::render(&stored.form, &stored.session).map_err(|e| {
        ApiError::Internal(format!("Error al crear el documento Word: {}", e))
    })?;
    let filename = document::filename(&stored.form);
    info!(filename = %filename, size = bytes.len(), "Serving session document");

    Ok((
        [
            (header::CONTENT_TYPE, document::CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// The requested session, or the latest one when no id is given.
fn find_session(
    state: &AppState,
    session_id: Option<&str>,
) -> Result<Arc<StoredSession>, ApiError> {
    let not_found = || ApiError::BadRequest(NO_SESSION.to_string());

    match session_id.filter(|id| !id.trim().is_empty()) {
        Some(raw) => {
            let id: SessionId = raw.parse().map_err(|_| {
                warn!(session_id = %raw, "Malformed session id");
                not_found()
            })?;
            state.store.get(&id).ok_or_else(not_found)
        }
        None => state
            .store
            .latest()
            .map(|(_, stored)| stored)
            .ok_or_else(not_found),
    }
}
