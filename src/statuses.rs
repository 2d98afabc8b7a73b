// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::future::Future;

use tracing::info;

use crate::{
    client::{StreamRequest, StreamingClient},
    config::StreamingConfig,
    error::ClientError,
    params::{FilterParameters, FirehoseParameters, SampleParameters},
    stream::TwitterStream,
};

/// Open the public statuses streams: `filter`, `sample` and `firehose`.
///
/// `filter` and `firehose` check their parameters when called and only then
/// hand back the future that connects, so an invalid request fails
/// synchronously without opening a connection.
pub struct TwitterStatusClient {
    streaming: StreamingClient,
    status_url: String,
}

impl TwitterStatusClient {
    pub fn new(streaming: StreamingClient) -> Self {
        let status_url = streaming.config().status_url();
        Self {
            streaming,
            status_url,
        }
    }

    pub fn with_config(config: StreamingConfig) -> Self {
        Self::new(StreamingClient::new(config))
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(StreamingClient::from_env()?))
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    /// Stream public tweets matching any of the followed users, tracked
    /// keywords or locations.
    ///
    /// At least one of `follow`, `track` and `locations` must be non-empty;
    /// otherwise this returns `Err` immediately.
    ///
    /// ```rust,ignore
    /// use futures::StreamExt;
    /// use twitter_stream_client::{FilterParameters, TwitterStatusClient};
    ///
    /// let client = TwitterStatusClient::from_env()?;
    /// let mut stream = client
    ///     .filter_statuses(FilterParameters::default().track(["rust"]))?
    ///     .await?;
    ///
    /// while let Some(message) = stream.next().await {
    ///     println!("{:?}", message?);
    /// }
    /// ```
    pub fn filter_statuses(
        &self,
        params: FilterParameters,
    ) -> Result<impl Future<Output = Result<TwitterStream, ClientError>> + '_, ClientError> {
        params.validate()?;

        info!(
            "Filtering statuses: {} follows, {} tracks, {} locations",
            params.follow.len(),
            params.track.len(),
            params.locations.len()
        );
        let request = StreamRequest::post(self.endpoint("filter"), params.to_params());
        Ok(self.streaming.stream(request))
    }

    /// Stream a small random sample of all public statuses.
    pub async fn sample_statuses(
        &self,
        params: SampleParameters,
    ) -> Result<TwitterStream, ClientError> {
        let request = StreamRequest::get(self.endpoint("sample"), params.to_params());
        self.streaming.stream(request).await
    }

    /// Stream all public statuses. Requires elevated access on the platform side.
    ///
    /// `count` backfills up to 150000 messages; outside that range this
    /// returns `Err` immediately.
    pub fn firehose_statuses(
        &self,
        params: FirehoseParameters,
    ) -> Result<impl Future<Output = Result<TwitterStream, ClientError>> + '_, ClientError> {
        params.validate()?;

        let request = StreamRequest::get(self.endpoint("firehose"), params.to_params());
        Ok(self.streaming.stream(request))
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}.json", self.status_url, name)
    }
}
