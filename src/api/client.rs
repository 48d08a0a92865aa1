use super::error::TransportError;
use super::Transport;
use crate::config::Config;
use crate::request::GenerateRequest;
use anyhow::Result;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::pin::Pin;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP transport for the `/generate` endpoint.
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    api_url: String,
}

impl GenerationClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub async fn create_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<ByteStream, TransportError> {
        tracing::debug!(
            url = %self.api_url,
            topic = request.topic_description(),
            samples = request.samples().len(),
            use_sample_style = request.use_sample_style(),
            "opening generation stream"
        );

        let response = self
            .http
            .post(&self.api_url)
            .header("accept", "text/event-stream")
            .multipart(build_form(request))
            .send()
            .await
            .map_err(|source| map_request_error(source, &self.api_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body);
            tracing::warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or("<none>"),
                "generation request rejected"
            );
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                message: message.or_else(|| fallback_rejection_message(status)),
            });
        }

        let request_url_for_stream = self.api_url.clone();
        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|source| map_request_error(source, &request_url_for_stream))
        });
        Ok(Box::pin(stream))
    }
}

impl Transport for GenerationClient {
    fn open<'a>(
        &'a self,
        request: &'a GenerateRequest,
    ) -> BoxFuture<'a, Result<ByteStream, TransportError>> {
        Box::pin(self.create_stream(request))
    }
}

fn build_form(request: &GenerateRequest) -> Form {
    let mut form = Form::new();
    for (name, value) in request.form_fields() {
        form = form.text(name, value);
    }
    for sample in request.samples() {
        let part = Part::bytes(sample.bytes.clone()).file_name(sample.file_name.clone());
        form = form.part("files", part);
    }
    form
}

fn map_request_error(source: reqwest::Error, url: &str) -> TransportError {
    TransportError::Http {
        url: url.to_string(),
        source,
    }
}

/// Pulls the `{"error": "..."}` message the service attaches to rejections.
fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body.trim())
        .ok()
        .map(|parsed| parsed.error.trim().to_string())
        .filter(|message| !message.is_empty())
}

fn fallback_rejection_message(status: StatusCode) -> Option<String> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            Some("Too many requests. Please wait a while and try again.".to_string())
        }
        _ => None,
    }
}
