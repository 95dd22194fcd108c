// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use baseline_client_core::{ApiError, ThingsPage};
use baseline_common_secret::SecretString;
use tokio::sync::Mutex;

use super::RemoteApi;

/// A request seen by [`ScriptedApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
	Authenticate { credential: String },
	ListThings { token: String },
}

/// One queued response and how long to wait before returning it.
#[derive(Debug, Clone)]
pub struct Scripted<T> {
	pub result: Result<T, ApiError>,
	pub delay: Duration,
}

impl<T> Scripted<T> {
	pub fn ok(value: T) -> Self {
		Self {
			result: Ok(value),
			delay: Duration::ZERO,
		}
	}

	pub fn err(error: ApiError) -> Self {
		Self {
			result: Err(error),
			delay: Duration::ZERO,
		}
	}

	pub fn after(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}
}

/// In-memory [`RemoteApi`] replaying queued responses in order.
///
/// Useful for testing. An exhausted queue answers with a transport error.
#[derive(Debug, Default)]
pub struct ScriptedApi {
	authenticate: Mutex<VecDeque<Scripted<String>>>,
	things: Mutex<VecDeque<Scripted<ThingsPage>>>,
	calls: Mutex<Vec<ApiCall>>,
}

impl ScriptedApi {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn push_authenticate(&self, response: Scripted<String>) {
		self.authenticate.lock().await.push_back(response);
	}

	pub async fn push_things(&self, response: Scripted<ThingsPage>) {
		self.things.lock().await.push_back(response);
	}

	/// Every request received so far, oldest first.
	pub async fn calls(&self) -> Vec<ApiCall> {
		self.calls.lock().await.clone()
	}

	pub async fn call_count(&self) -> usize {
		self.calls.lock().await.len()
	}
}

async fn replay<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Result<T, ApiError> {
	let next = queue.lock().await.pop_front();
	let Some(scripted) = next else {
		return Err(ApiError::Transport("no scripted response".to_string()));
	};

	if !scripted.delay.is_zero() {
		tokio::time::sleep(scripted.delay).await;
	}
	scripted.result
}

#[async_trait]
impl RemoteApi for ScriptedApi {
	async fn authenticate(&self, credential: &SecretString) -> Result<String, ApiError> {
		self.calls.lock().await.push(ApiCall::Authenticate {
			credential: credential.expose().clone(),
		});
		replay(&self.authenticate).await
	}

	async fn list_things(&self, token: &SecretString) -> Result<ThingsPage, ApiError> {
		self.calls.lock().await.push(ApiCall::ListThings {
			token: token.expose().clone(),
		});
		replay(&self.things).await
	}
}
