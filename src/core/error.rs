// Centralized error handling for the info service

use crate::models::admin::ErrorResponse;
use crate::models::info_hash::{InfoHash, InfoHashError};
use crate::stores::session_registry::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a torrent info query
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InfoError {
    #[error("Invalid info_hash '{input}': {source}")]
    InvalidInfoHash {
        input: String,
        #[source]
        source: InfoHashError,
    },

    #[error("Torrent not found: {info_hash}")]
    TorrentNotFound { info_hash: InfoHash },

    #[error("Cancelled while waiting for metadata of {info_hash}")]
    Cancelled { info_hash: InfoHash },

    #[error("Deadline exceeded after {waited:?} waiting for metadata of {info_hash}")]
    DeadlineExceeded { info_hash: InfoHash, waited: Duration },
}

impl InfoError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            InfoError::InvalidInfoHash { .. } => StatusCode::BAD_REQUEST,
            InfoError::TorrentNotFound { .. } => StatusCode::NOT_FOUND,
            InfoError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InfoError::DeadlineExceeded { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for InfoError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid info_hash: {0}")]
    InvalidInfoHash(#[from] InfoHashError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<RegistryError> for AdminError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::AlreadyRegistered(_)
            | RegistryError::MetadataAlreadyPublished(_)
            | RegistryError::MetadataPending(_) => AdminError::Conflict(err.to_string()),
            RegistryError::EmptyName
            | RegistryError::NoFiles
            | RegistryError::FileIndexOutOfRange { .. }
            | RegistryError::CompletedExceedsLength { .. } => {
                AdminError::InvalidParameter(err.to_string())
            }
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            AdminError::InvalidInfoHash(_) => StatusCode::BAD_REQUEST,
            AdminError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Conflict(_) => StatusCode::CONFLICT,
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        };

        (status, message).into_response()
    }
}
