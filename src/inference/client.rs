//! HTTP client for the gateway's process-frame endpoint.

use std::time::Duration;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use super::types::ProcessFrameResponse;
use crate::GatewayConfig;

/// Failure classes of a single gateway call. Each call is an independent
/// attempt; the next cadence tick retries with no carried-over state.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("gateway returned {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },

    /// Connection failure or request timeout
    #[error("gateway unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response with a body that doesn't parse
    #[error("malformed gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),
}

pub struct GatewayClient {
    client: reqwest::Client,
    endpoint: String,
    lecture_id: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self, InferenceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            lecture_id: config.lecture_id.clone(),
        })
    }

    /// Forward exactly one JPEG frame as a multipart request with the
    /// lecture id and an ISO-8601 capture timestamp.
    pub async fn process_frame(
        &self,
        jpeg: Bytes,
        captured_at: OffsetDateTime,
    ) -> Result<ProcessFrameResponse, InferenceError> {
        let timestamp = captured_at.format(&Rfc3339)?;

        let image = Part::stream(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")?;
        let form = Form::new()
            .part("image", image)
            .text("lectureId", self.lecture_id.clone())
            .text("timestamp", timestamp);

        debug!("POST {}", self.endpoint);
        let resp = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status { status, detail });
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
