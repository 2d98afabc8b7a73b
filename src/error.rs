// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use http::StatusCode;
use thiserror::Error;

use crate::params::MAX_FIREHOSE_COUNT;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),
    #[error("Stream URL must be absolute: {0}")]
    RelativeUrl(String),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("TLS error: {0}")]
    TlsError(#[from] rustls::Error),
    #[error("Stream line exceeded {limit} bytes without a newline")]
    LineTooLong { limit: usize },
    #[error("Failed to decode stream message: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("Streaming endpoint returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Invalid parameters: {0}")]
    InvalidParameters(#[from] ParameterError),
}

/// Rejections raised before a request is sent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("At least one of 'follow', 'track' or 'locations' needs to be non empty")]
    EmptyFilter,
    #[error("count must be between -{max} and +{max}, got {count}", max = MAX_FIREHOSE_COUNT)]
    CountOutOfRange { count: i32 },
    #[error("Bounding box coordinates out of range: {0}")]
    InvalidBoundingBox(String),
}
