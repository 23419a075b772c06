// src/error.rs
//! Application error kinds and their HTTP surface.
//!
//! A missing preference file is not an error (the store falls back to the
//! documented default) and assistant failures are absorbed by the fallback
//! chain; every variant here aborts the current request.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum StylistError {
    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog {path} is invalid: {detail}")]
    CatalogInvalid { path: PathBuf, detail: String },

    #[error("preference file {path} is malformed: {detail}")]
    PreferenceLoad { path: PathBuf, detail: String },

    #[error("failed to persist preferences to {path}: {source}")]
    PreferenceSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown item id: {0}")]
    UnknownItem(String),
}

impl IntoResponse for StylistError {
    fn into_response(self) -> Response {
        let status = match &self {
            StylistError::UnknownItem(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": "error",
        }));

        (status, body).into_response()
    }
}
