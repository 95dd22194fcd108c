// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The remote API seam.
//!
//! [`RemoteApi`] covers the two endpoints the client talks to. [`HttpApi`]
//! speaks the real wire contract, [`DemoApi`] serves a bundled collection
//! without a network, and [`ScriptedApi`] replays queued responses in tests.

mod demo;
mod http;
mod scripted;

use async_trait::async_trait;
use baseline_client_core::{ApiError, ThingsPage};
use baseline_common_secret::SecretString;

pub use demo::{DemoApi, DEMO_SCOPE, DEMO_SUBJECT, DEMO_TOKEN_LIFETIME_DAYS};
pub use http::HttpApi;
pub use scripted::{ApiCall, Scripted, ScriptedApi};

/// Remote API used by the authentication flow and the things repository.
#[async_trait]
pub trait RemoteApi: Send + Sync + std::fmt::Debug {
	/// `GET /v1/authenticate`. Returns the raw token on success.
	async fn authenticate(&self, credential: &SecretString) -> Result<String, ApiError>;

	/// `GET /v1/things`, authorized with the raw session token.
	async fn list_things(&self, token: &SecretString) -> Result<ThingsPage, ApiError>;

	/// Whether responses come from bundled data rather than a live API.
	fn is_demo(&self) -> bool {
		false
	}
}
