// HTTP transport for the generation service
//
// Request:  POST <endpoint>, JSON body holding the prompt string
// Response: chunked text of the JSON object being generated
//
// Chunks are decoded with `PartialJsonDecoder`, so every increment handed to
// the session is a cumulative snapshot of the object so far.

use super::partial_json::PartialJsonDecoder;
use super::{GenerationService, IncrementStream, TransportError};
use crate::config::ServiceConfig;
use crate::session::Prompt;
use anyhow::{Context, Result};
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

/// Maximum number of body characters kept in a status error
const ERROR_BODY_LIMIT: usize = 500;

/// Generation service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpGenerationService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpGenerationService {
    /// Build the client from config (headers, timeouts, credentials)
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name '{}'", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header '{}'", name))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn request(&self, prompt: &Prompt) -> reqwest::RequestBuilder {
        let request = self.client.post(&self.endpoint).json(prompt.as_str());
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// Progress of one HTTP stream
enum HttpState {
    Pending(reqwest::RequestBuilder),
    Body {
        chunks: BoxStream<'static, reqwest::Result<Bytes>>,
        decoder: PartialJsonDecoder,
    },
    Done,
}

/// Send the request and hand back the body stream on success
async fn open(
    request: reqwest::RequestBuilder,
) -> Result<BoxStream<'static, reqwest::Result<Bytes>>, TransportError> {
    let response = request
        .send()
        .await
        .map_err(|e| TransportError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.trim().chars().take(ERROR_BODY_LIMIT).collect();
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }

    tracing::debug!("Generation stream opened (HTTP {})", status.as_u16());
    Ok(response.bytes_stream().boxed())
}

impl GenerationService for HttpGenerationService {
    fn stream(&self, prompt: Prompt) -> IncrementStream {
        let request = self.request(&prompt);

        let increments = stream::unfold(HttpState::Pending(request), |mut state| async move {
            loop {
                match state {
                    HttpState::Pending(request) => match open(request).await {
                        Ok(chunks) => {
                            state = HttpState::Body {
                                chunks,
                                decoder: PartialJsonDecoder::new(),
                            };
                        }
                        Err(e) => return Some((Err(e), HttpState::Done)),
                    },
                    HttpState::Body {
                        mut chunks,
                        mut decoder,
                    } => match chunks.next().await {
                        Some(Ok(chunk)) => {
                            let value = decoder.push(&chunk);
                            let next = HttpState::Body { chunks, decoder };
                            match value {
                                Some(value) => return Some((Ok(value), next)),
                                None => state = next,
                            }
                        }
                        Some(Err(e)) => {
                            return Some((Err(TransportError::Body(e.to_string())), HttpState::Done))
                        }
                        None => {
                            tracing::debug!(
                                "Generation stream closed after {} bytes",
                                decoder.text().len()
                            );
                            return None;
                        }
                    },
                    HttpState::Done => return None,
                }
            }
        });

        Box::pin(increments)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(headers: BTreeMap<String, String>) -> ServiceConfig {
        ServiceConfig {
            endpoint: "http://127.0.0.1:9/api/codegen".to_string(),
            headers,
            connect_timeout_secs: 1,
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn test_rejects_invalid_header_name() {
        let mut headers = BTreeMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        assert!(HttpGenerationService::new(&config(headers)).is_err());
    }

    #[test]
    fn test_describe_is_endpoint() {
        let service = HttpGenerationService::new(&config(BTreeMap::new())).unwrap();
        assert_eq!(service.describe(), "http://127.0.0.1:9/api/codegen");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_single_request_error() {
        let service = HttpGenerationService::new(&config(BTreeMap::new())).unwrap();
        let mut stream = service.stream(Prompt::new("hello").unwrap());

        match stream.next().await {
            Some(Err(TransportError::Request(_))) => {}
            other => panic!("expected request error, got {:?}", other),
        }
        assert!(stream.next().await.is_none());
    }
}
