// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use baseline_client_core::{decode_token, encode_unsigned_token, ApiError, ThingsPage};
use baseline_common_secret::SecretString;
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{debug, info};

use super::RemoteApi;

pub const DEMO_SUBJECT: &str = "baseline";
pub const DEMO_SCOPE: &str = "web";
pub const DEMO_TOKEN_LIFETIME_DAYS: i64 = 7;

const DEMO_THINGS: &str = include_str!("demo_things.json");

/// Offline [`RemoteApi`] backed by a bundled collection.
///
/// Any credential authenticates and yields an unsigned seven-day token. The
/// things endpoint still answers 401 to a missing or expired token.
#[derive(Debug, Clone, Default)]
pub struct DemoApi {
	_private: (),
}

impl DemoApi {
	pub fn new() -> Self {
		info!("demo mode: using bundled data");
		Self::default()
	}
}

#[async_trait]
impl RemoteApi for DemoApi {
	async fn authenticate(&self, credential: &SecretString) -> Result<String, ApiError> {
		if credential.is_empty() {
			return Err(ApiError::status(400));
		}

		let now = Utc::now();
		let expires = now + Duration::days(DEMO_TOKEN_LIFETIME_DAYS);
		let token = encode_unsigned_token(&json!({
			"sub": DEMO_SUBJECT,
			"scope": DEMO_SCOPE,
			"iat": now.timestamp(),
			"exp": expires.timestamp(),
		}));

		debug!(expires_at = %expires, "demo token issued");
		Ok(token)
	}

	async fn list_things(&self, token: &SecretString) -> Result<ThingsPage, ApiError> {
		match decode_token(token.expose()) {
			Some(session) if session.is_valid() => {}
			_ => return Err(ApiError::status(401)),
		}

		serde_json::from_str(DEMO_THINGS).map_err(|e| ApiError::InvalidBody(e.to_string()))
	}

	fn is_demo(&self) -> bool {
		true
	}
}
