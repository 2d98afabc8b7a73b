// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::trace;

use crate::{error::ClientError, message::StreamingMessage};

/// A live statuses stream.
///
/// Yields messages in the order the server sent them. A transport or decode
/// failure is yielded once as an `Err`, after which the stream ends. Dropping
/// the stream closes the connection.
pub struct TwitterStream {
    messages: ReceiverStream<Result<StreamingMessage, ClientError>>,
    reader: JoinHandle<()>,
}

impl TwitterStream {
    pub(crate) fn new(
        messages: ReceiverStream<Result<StreamingMessage, ClientError>>,
        reader: JoinHandle<()>,
    ) -> Self {
        Self { messages, reader }
    }

    /// Stop reading and drop the connection. Messages already buffered are still yielded.
    pub fn close(&mut self) {
        trace!("Closing stream");
        self.reader.abort();
        self.messages.close();
    }
}

impl Stream for TwitterStream {
    type Item = Result<StreamingMessage, ClientError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.messages).poll_next(cx)
    }
}

impl Drop for TwitterStream {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
