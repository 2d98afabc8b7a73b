// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Rust Twitter Stream Client
//!
//! Rust client for the Twitter statuses streaming API: the `filter`,
//! `sample` and `firehose` endpoints. Each call validates its parameters,
//! opens a long-lived HTTP connection and hands back a [`TwitterStream`] of
//! decoded messages.
//!
//! Requests are not signed. A bearer token, if configured, is sent as is.
//! A dropped connection ends the stream; reconnecting is up to the caller.
//!
//! ## Tracking Keywords
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use twitter_stream_client::{FilterParameters, StreamingMessage, TwitterStatusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TwitterStatusClient::from_env()?;
//!     let params = FilterParameters::default()
//!         .track(["rustlang", "tokio"])
//!         .stall_warnings(true);
//!
//!     let mut stream = client.filter_statuses(params)?.await?;
//!     while let Some(message) = stream.next().await {
//!         if let StreamingMessage::Tweet(tweet) = message? {
//!             println!("{}", tweet["text"]);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Backfilling the Firehose
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use twitter_stream_client::{FirehoseParameters, TwitterStatusClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TwitterStatusClient::from_env()?;
//!     let mut stream = client
//!         .firehose_statuses(FirehoseParameters::default().count(-1000))?
//!         .await?;
//!
//!     let first = stream.next().await;
//!     stream.close();
//!     Ok(())
//! }
//! ```
//!

mod client;
mod config;
mod error;
mod message;
mod params;
mod statuses;
mod stream;
mod tls;

pub use crate::client::{StreamRequest, StreamingClient, MAX_LINE_LENGTH};
pub use crate::config::StreamingConfig;
pub use crate::error::{ClientError, ParameterError};
pub use crate::message::{DisconnectMessage, LimitNotice, StallWarning, StreamingMessage};
pub use crate::params::{
    BoundingBox, FilterLevel, FilterParameters, FirehoseParameters, SampleParameters, WireParams,
    MAX_FIREHOSE_COUNT,
};
pub use crate::statuses::TwitterStatusClient;
pub use crate::stream::TwitterStream;
