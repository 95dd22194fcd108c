// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use baseline_client_core::{ApiError, ThingsPage};
use baseline_common_secret::SecretString;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Response};
use tracing::{debug, instrument, warn};

use super::RemoteApi;

/// [`RemoteApi`] over HTTP.
///
/// No request timeout is applied and nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpApi {
	base_url: String,
	http_client: Client,
}

impl HttpApi {
	pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
		let http_client = baseline_common_http::builder()
			.build()
			.map_err(|e| ApiError::Transport(e.to_string()))?;
		Ok(Self::with_client(base_url, http_client))
	}

	pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
		let base_url = base_url.into().trim_end_matches('/').to_string();
		Self {
			base_url,
			http_client,
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}
}

#[async_trait]
impl RemoteApi for HttpApi {
	#[instrument(skip_all, fields(base_url = %self.base_url))]
	async fn authenticate(&self, credential: &SecretString) -> Result<String, ApiError> {
		let encoded = STANDARD.encode(credential.expose().as_bytes());

		let response = self
			.http_client
			.get(self.url("/v1/authenticate"))
			.header(AUTHORIZATION, encoded)
			.header(CACHE_CONTROL, "no-store")
			.header(PRAGMA, "no-cache")
			.send()
			.await
			.map_err(transport)?;

		let response = ensure_success(response).await?;
		let token = response
			.text()
			.await
			.map_err(|e| ApiError::InvalidBody(e.to_string()))?;

		debug!("authenticate succeeded");
		Ok(token.trim().to_string())
	}

	#[instrument(skip_all, fields(base_url = %self.base_url))]
	async fn list_things(&self, token: &SecretString) -> Result<ThingsPage, ApiError> {
		let response = self
			.http_client
			.get(self.url("/v1/things"))
			.header(AUTHORIZATION, token.expose().as_str())
			.send()
			.await
			.map_err(transport)?;

		let response = ensure_success(response).await?;
		let page: ThingsPage = response
			.json()
			.await
			.map_err(|e| ApiError::InvalidBody(e.to_string()))?;

		debug!(count = page.things.len(), "things fetched");
		Ok(page)
	}
}

fn transport(error: reqwest::Error) -> ApiError {
	warn!(error = %error, "request failed before a response arrived");
	ApiError::Transport(error.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	debug!(status = status.as_u16(), "API returned an error status");
	Err(ApiError::Status {
		status: status.as_u16(),
		message: response.text().await.unwrap_or_default(),
	})
}
