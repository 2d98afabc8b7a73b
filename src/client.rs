// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use futures::StreamExt;
use http::Method;
use once_cell::sync::OnceCell;
use reqwest::{Client, RequestBuilder, Response};
use tokio::sync::mpsc::Sender;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info, trace};

use crate::{
    config::StreamingConfig,
    error::ClientError,
    message::StreamingMessage,
    params::WireParams,
    stream::TwitterStream,
};

/// One request against a streaming endpoint.
///
/// `GET` requests carry their parameters in the query string, `POST` requests
/// carry them form-encoded in the body.
#[derive(Clone, Debug)]
pub struct StreamRequest {
    pub method: Method,
    pub url: String,
    pub params: WireParams,
}

impl StreamRequest {
    pub fn get(url: impl Into<String>, params: WireParams) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            params,
        }
    }

    pub fn post(url: impl Into<String>, params: WireParams) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            params,
        }
    }
}

/// Opens long-lived HTTP connections and turns their bodies into [`TwitterStream`]s.
pub struct StreamingClient {
    config: StreamingConfig,
    http: OnceCell<Client>,
}

impl StreamingClient {
    pub fn new(config: StreamingConfig) -> Self {
        Self {
            config,
            http: OnceCell::new(),
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(StreamingConfig::from_env()?))
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// The reqwest docs encourage reusing (and cloning) one client.
    pub fn get_http_client(&self) -> Result<Client, ClientError> {
        self.http
            .get_or_try_init(|| http_client(&self.config))
            .cloned()
    }

    /// Connect to the endpoint and start delivering messages.
    ///
    /// The returned future resolves once the server has answered with a
    /// successful status. Any earlier failure, including a non-2xx status, is
    /// returned as the `Err` of this call.
    ///
    /// # Concurrency
    ///
    /// This method spawns a background task that reads the response body, so
    /// it must be called from within a tokio runtime. The task applies
    /// backpressure: it does not read further while the channel is full.
    pub async fn stream(&self, request: StreamRequest) -> Result<TwitterStream, ClientError> {
        let client = self.get_http_client()?;

        info!("Opening stream:\n\t{} {}", request.method, request.url);
        let response = build_request(&client, &request)
            .insert_bearer_token_if_provided(&self.config)
            .send()
            .await?;
        let response = check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(self.config.channel_capacity.max(1));
        let url = request.url;
        let reader = tokio::spawn(async move {
            if let Err(e) = read_messages(response, &tx).await {
                error!("Stream {} failed: {e}", url);
                let _ = tx.send(Err(e)).await;
            }
            trace!("Stream {} ended", url);
        });

        Ok(TwitterStream::new(ReceiverStream::new(rx), reader))
    }
}

fn http_client(config: &StreamingConfig) -> Result<Client, ClientError> {
    config.stream_uri()?;

    let tls = crate::tls::config()?;

    Ok(Client::builder()
        .use_preconfigured_tls(tls.clone())
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!("twitter-stream-client/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

fn build_request(client: &Client, request: &StreamRequest) -> RequestBuilder {
    let builder = client.request(request.method.clone(), &request.url);
    if request.method == Method::POST {
        builder.form(&request.params)
    } else {
        builder.query(&request.params)
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status { status, body })
}

/// Forward every complete message of the body. Returns when the body ends or
/// the receiving side goes away.
async fn read_messages(
    response: Response,
    tx: &Sender<Result<StreamingMessage, ClientError>>,
) -> Result<(), ClientError> {
    let mut body = response.bytes_stream();
    let mut lines = LineBuffer::default();
    let mut messages: u64 = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        lines.extend(&chunk);

        while let Some(line) = lines.next_line()? {
            if line.iter().all(u8::is_ascii_whitespace) {
                trace!("Received keep-alive");
                continue;
            }

            let message = StreamingMessage::from_slice(&line)?;
            messages += 1;
            if messages % 1000 == 0 {
                trace!("Messages received: {}", messages);
            }

            if tx.send(Ok(message)).await.is_err() {
                return Ok(());
            }
        }
    }

    if let Some(line) = lines.remainder() {
        let message = StreamingMessage::from_slice(&line)?;
        let _ = tx.send(Ok(message)).await;
    }

    Ok(())
}

trait StreamingRequestExt {
    fn insert_bearer_token_if_provided(self, config: &StreamingConfig) -> Self;
}

impl StreamingRequestExt for RequestBuilder {
    fn insert_bearer_token_if_provided(self, config: &StreamingConfig) -> Self {
        match &config.bearer_token {
            Some(token) => self.bearer_auth(token),
            None => self,
        }
    }
}

/// Longest line accepted before a newline shows up.
pub const MAX_LINE_LENGTH: usize = 1 << 20;

/// Splits a byte stream into `\r\n` or `\n` terminated lines. A trailing
/// partial line stays buffered until the rest of it arrives. Lines stay raw
/// bytes so invalid UTF-8 reaches the JSON decoder untouched.
#[derive(Default)]
struct LineBuffer {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a newline.
    scanned: usize,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    fn next_line(&mut self) -> Result<Option<Vec<u8>>, ClientError> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            if self.buffer.len() > MAX_LINE_LENGTH {
                return Err(ClientError::LineTooLong {
                    limit: MAX_LINE_LENGTH,
                });
            }
            return Ok(None);
        };

        let newline = self.scanned + offset;
        self.scanned = 0;
        if newline > MAX_LINE_LENGTH {
            return Err(ClientError::LineTooLong {
                limit: MAX_LINE_LENGTH,
            });
        }

        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.truncate(trimmed_len(&line));
        Ok(Some(line))
    }

    /// Whatever is left once the body has ended without a final newline.
    fn remainder(&mut self) -> Option<Vec<u8>> {
        let mut rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        rest.truncate(trimmed_len(&rest));
        (!rest.iter().all(u8::is_ascii_whitespace)).then_some(rest)
    }
}

/// Length without the trailing `\n` and `\r`.
fn trimmed_len(line: &[u8]) -> usize {
    line.iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |last| last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Option<Vec<u8>> {
        Some(text.as_bytes().to_vec())
    }

    #[test]
    fn line_split_across_chunks() {
        let mut lines = LineBuffer::default();
        lines.extend(b"{\"id_str\":");
        assert_eq!(lines.next_line().unwrap(), None);

        lines.extend(b"\"1\"}\r\n{\"limit\"");
        assert_eq!(lines.next_line().unwrap(), line("{\"id_str\":\"1\"}"));
        assert_eq!(lines.next_line().unwrap(), None);

        lines.extend(b":{\"track\":3}}\n{\"id_str\":\"2\"}");
        assert_eq!(lines.next_line().unwrap(), line("{\"limit\":{\"track\":3}}"));
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.remainder(), line("{\"id_str\":\"2\"}"));
        assert_eq!(lines.remainder(), None);
    }

    #[test]
    fn keep_alives_are_blank_lines() {
        let mut lines = LineBuffer::default();
        lines.extend(b"\r\n\r\n");
        assert_eq!(lines.next_line().unwrap(), Some(Vec::new()));
        assert_eq!(lines.next_line().unwrap(), Some(Vec::new()));
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.remainder(), None);
    }

    #[test]
    fn one_byte_chunks_reassemble() {
        let mut lines = LineBuffer::default();
        let mut seen = Vec::new();
        for byte in b"{\"a\":1}\r\n{\"b\":2}\r\n" {
            lines.extend(&[*byte]);
            while let Some(line) = lines.next_line().unwrap() {
                seen.push(line);
            }
        }
        assert_eq!(seen, vec![b"{\"a\":1}".to_vec(), b"{\"b\":2}".to_vec()]);
    }

    #[test]
    fn invalid_utf8_is_kept_for_the_decoder() {
        let mut lines = LineBuffer::default();
        lines.extend(b"{\"id_str\":\"1\",\"text\":\"\xff\xfe\"}\r\n");
        let raw = lines.next_line().unwrap().unwrap();
        assert_eq!(raw, b"{\"id_str\":\"1\",\"text\":\"\xff\xfe\"}".to_vec());
        assert!(matches!(
            StreamingMessage::from_slice(&raw),
            Err(ClientError::DecodeError(_))
        ));
    }

    #[test]
    fn unterminated_line_over_the_limit_is_rejected() {
        let mut lines = LineBuffer::default();
        lines.extend(&vec![b'x'; MAX_LINE_LENGTH]);
        assert_eq!(lines.next_line().unwrap(), None);

        lines.extend(b"x");
        assert!(matches!(
            lines.next_line(),
            Err(ClientError::LineTooLong { limit: MAX_LINE_LENGTH })
        ));
    }

    #[test]
    fn bearer_token_is_only_sent_when_configured() {
        let client = Client::new();
        let request = StreamRequest::get("http://localhost/sample.json", WireParams::new());

        let anonymous = build_request(&client, &request)
            .insert_bearer_token_if_provided(&StreamingConfig::default())
            .build()
            .unwrap();
        assert!(anonymous.headers().get("authorization").is_none());

        let config = StreamingConfig::default().with_bearer_token("abc");
        let authorized = build_request(&client, &request)
            .insert_bearer_token_if_provided(&config)
            .build()
            .unwrap();
        assert_eq!(authorized.headers()["authorization"], "Bearer abc");
    }

    #[test]
    fn get_params_go_in_the_query_string() {
        let client = Client::new();
        let request = StreamRequest::get(
            "http://localhost/1.1/statuses/sample.json",
            vec![("language", "en,fr".to_string())],
        );
        let built = build_request(&client, &request).build().unwrap();
        assert_eq!(built.method(), &Method::GET);
        assert_eq!(built.url().query(), Some("language=en%2Cfr"));
        assert!(built.body().is_none());
    }
}
