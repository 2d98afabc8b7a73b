// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    env::{self, VarError},
    time::Duration,
};

use dotenvy::dotenv;
use http::Uri;

use crate::error::ClientError;

pub const DEFAULT_STREAM_URL: &str = "https://stream.twitter.com";
pub const DEFAULT_API_VERSION: &str = "1.1";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8192;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

const STREAM_URL_ENV_VAR: &str = "TWITTER_STREAM_URL";
const API_VERSION_ENV_VAR: &str = "TWITTER_API_VERSION";
const BEARER_TOKEN_ENV_VAR: &str = "TWITTER_BEARER_TOKEN";

/// Where and how [`StreamingClient`](crate::StreamingClient) connects.
#[derive(Clone, Debug)]
pub struct StreamingConfig {
    pub stream_url: String,
    pub api_version: String,
    /// Sent verbatim as `Authorization: Bearer <token>`. Nothing is signed.
    pub bearer_token: Option<String>,
    pub connect_timeout: Duration,
    /// Messages buffered between the reader task and the consumer.
    pub channel_capacity: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            bearer_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl StreamingConfig {
    /// Read `TWITTER_STREAM_URL`, `TWITTER_API_VERSION` and `TWITTER_BEARER_TOKEN`,
    /// loading a `.env` file first if there is one. Unset variables keep their
    /// defaults; a variable that is not valid unicode is an error.
    pub fn from_env() -> Result<Self, ClientError> {
        if let Err(e) = dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }

        let mut config = Self::default();
        if let Some(url) = optional_var(STREAM_URL_ENV_VAR)? {
            config.stream_url = url;
        }
        if let Some(version) = optional_var(API_VERSION_ENV_VAR)? {
            config.api_version = version;
        }
        config.bearer_token = optional_var(BEARER_TOKEN_ENV_VAR)?;

        config.stream_uri()?;
        Ok(config)
    }

    pub fn with_stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = url.into();
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validated form of `stream_url`.
    pub fn stream_uri(&self) -> Result<Uri, ClientError> {
        let uri = self.stream_url.parse::<Uri>()?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ClientError::RelativeUrl(self.stream_url.clone()));
        }
        Ok(uri)
    }

    /// `{stream_url}/{api_version}/statuses`
    pub fn status_url(&self) -> String {
        format!(
            "{}/{}/statuses",
            self.stream_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

fn optional_var(name: &str) -> Result<Option<String>, ClientError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
