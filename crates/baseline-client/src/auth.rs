// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential submission.
//!
//! A login attempt always takes at least the configured minimum latency,
//! whether it succeeds or fails, so response timing does not reveal how far
//! the server got.

use std::sync::Arc;
use std::time::Duration;

use baseline_client_core::{decode_token, ErrorDetails, Session};
use baseline_common_secret::SecretString;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::api::RemoteApi;
use crate::error_bus::ErrorBus;
use crate::session::SessionStore;

pub const DEFAULT_MIN_LATENCY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
	Idle,
	Submitting,
	Success,
	Failed,
}

/// Transient record of one submission.
#[derive(Debug)]
pub struct AuthenticationAttempt {
	pub credential: SecretString,
	pub submitted_at: Instant,
}

impl AuthenticationAttempt {
	pub fn new(credential: SecretString) -> Self {
		Self {
			credential,
			submitted_at: Instant::now(),
		}
	}

	/// Earliest instant the outcome may be reported.
	pub fn release_at(&self, min_latency: Duration) -> Instant {
		self.submitted_at + min_latency
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
	/// Refused locally; nothing was sent and nothing was published.
	Rejected(ErrorDetails),
	/// Another submission is in flight.
	Busy,
	/// The attempt failed; the details were also published on the bus.
	Failed(ErrorDetails),
	Success(Session),
}

#[derive(Debug)]
pub struct AuthenticationFlow {
	api: Arc<dyn RemoteApi>,
	sessions: Arc<SessionStore>,
	errors: Arc<ErrorBus>,
	min_latency: Duration,
	state: watch::Sender<AuthState>,
}

impl AuthenticationFlow {
	pub fn new(api: Arc<dyn RemoteApi>, sessions: Arc<SessionStore>, errors: Arc<ErrorBus>) -> Self {
		let (state, _) = watch::channel(AuthState::Idle);
		Self {
			api,
			sessions,
			errors,
			min_latency: DEFAULT_MIN_LATENCY,
			state,
		}
	}

	pub fn with_min_latency(mut self, min_latency: Duration) -> Self {
		self.min_latency = min_latency;
		self
	}

	pub fn min_latency(&self) -> Duration {
		self.min_latency
	}

	pub fn state(&self) -> AuthState {
		*self.state.borrow()
	}

	pub fn subscribe(&self) -> watch::Receiver<AuthState> {
		self.state.subscribe()
	}

	#[instrument(skip_all)]
	pub async fn submit(&self, credential: SecretString) -> LoginOutcome {
		if credential.is_empty() {
			debug!("empty credential rejected locally");
			return LoginOutcome::Rejected(ErrorDetails::empty_credential());
		}

		let claimed = self.state.send_if_modified(|state| {
			if *state == AuthState::Submitting {
				false
			} else {
				*state = AuthState::Submitting;
				true
			}
		});
		if !claimed {
			debug!("submission already in flight");
			return LoginOutcome::Busy;
		}
		let _claim = SubmitClaim { state: &self.state };

		let attempt = AuthenticationAttempt::new(credential);
		let result = self.api.authenticate(&attempt.credential).await;
		tokio::time::sleep_until(attempt.release_at(self.min_latency)).await;

		let raw = match result {
			Ok(raw) => raw,
			Err(e) => {
				warn!(error = %e, "authentication failed");
				return self.fail(ErrorDetails::login_failure(&e));
			}
		};

		let Some(session) = decode_token(&raw).filter(Session::is_valid) else {
			warn!("authentication returned an unusable token");
			return self.fail(ErrorDetails::invalid_session());
		};

		if !self.sessions.promote(&raw).await {
			return self.fail(ErrorDetails::invalid_session());
		}

		info!(
			expires_at = %session.expires_at(),
			elapsed_ms = attempt.submitted_at.elapsed().as_millis() as u64,
			"login succeeded"
		);
		self.state.send_replace(AuthState::Success);
		LoginOutcome::Success(session)
	}

	/// Return from Failed to Idle once the error has been acknowledged.
	pub fn reset(&self) {
		self.state.send_if_modified(|state| {
			if *state == AuthState::Failed {
				*state = AuthState::Idle;
				true
			} else {
				false
			}
		});
	}

	fn fail(&self, details: ErrorDetails) -> LoginOutcome {
		self.state.send_replace(AuthState::Failed);
		self.errors.publish(details.clone());
		LoginOutcome::Failed(details)
	}
}

/// Returns a dropped submission to Idle so the flow can be used again.
struct SubmitClaim<'a> {
	state: &'a watch::Sender<AuthState>,
}

impl Drop for SubmitClaim<'_> {
	fn drop(&mut self) {
		self.state.send_if_modified(|state| {
			if *state == AuthState::Submitting {
				debug!("submission abandoned");
				*state = AuthState::Idle;
				true
			} else {
				false
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{ApiCall, Scripted, ScriptedApi};
	use baseline_client_core::{encode_unsigned_token, ApiError, ErrorKind};
	use baseline_client_storage::MemoryTokenStore;
	use chrono::Utc;
	use serde_json::json;

	struct Harness {
		api: Arc<ScriptedApi>,
		sessions: Arc<SessionStore>,
		errors: Arc<ErrorBus>,
		flow: Arc<AuthenticationFlow>,
	}

	fn harness() -> Harness {
		let api = Arc::new(ScriptedApi::new());
		let sessions = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
		let errors = Arc::new(ErrorBus::new());
		let flow = Arc::new(AuthenticationFlow::new(
			api.clone(),
			sessions.clone(),
			errors.clone(),
		));
		Harness {
			api,
			sessions,
			errors,
			flow,
		}
	}

	fn fresh_token() -> String {
		encode_unsigned_token(&json!({ "exp": (Utc::now() + chrono::Duration::days(7)).timestamp() }))
	}

	#[tokio::test(start_paused = true)]
	async fn success_waits_for_the_floor() {
		let h = harness();
		h.api.push_authenticate(Scripted::ok(fresh_token())).await;

		let started = Instant::now();
		let outcome = h.flow.submit(SecretString::from("hunter2")).await;

		assert!(started.elapsed() >= DEFAULT_MIN_LATENCY);
		assert!(matches!(outcome, LoginOutcome::Success(_)));
		assert_eq!(h.flow.state(), AuthState::Success);
		assert!(h.sessions.is_authenticated());
		assert!(h.errors.pending().is_none());
		assert_eq!(
			h.api.calls().await,
			vec![ApiCall::Authenticate {
				credential: "hunter2".to_string()
			}]
		);
	}

	#[tokio::test(start_paused = true)]
	async fn stays_submitting_until_the_floor() {
		let h = harness();
		h.api.push_authenticate(Scripted::ok(fresh_token())).await;
		let mut state = h.flow.subscribe();

		let flow = h.flow.clone();
		let pending = tokio::spawn(async move { flow.submit(SecretString::from("pw")).await });
		state
			.wait_for(|s| *s == AuthState::Submitting)
			.await
			.unwrap();

		tokio::time::advance(Duration::from_millis(1499)).await;
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
		assert_eq!(h.flow.state(), AuthState::Submitting);
		assert!(!h.sessions.is_authenticated());

		assert!(matches!(pending.await.unwrap(), LoginOutcome::Success(_)));
		assert_eq!(h.flow.state(), AuthState::Success);
	}

	#[tokio::test(start_paused = true)]
	async fn abandoned_submit_does_not_block_the_next() {
		let h = harness();
		h.api
			.push_authenticate(Scripted::ok(fresh_token()).after(Duration::from_secs(10)))
			.await;
		h.api.push_authenticate(Scripted::ok(fresh_token())).await;

		let abandoned =
			tokio::time::timeout(Duration::from_millis(100), h.flow.submit(SecretString::from("pw")))
				.await;
		assert!(abandoned.is_err());
		assert_eq!(h.flow.state(), AuthState::Idle);

		let outcome = h.flow.submit(SecretString::from("pw")).await;
		assert!(matches!(outcome, LoginOutcome::Success(_)));
		assert_eq!(h.api.call_count().await, 2);
	}

	#[tokio::test(start_paused = true)]
	async fn slow_server_is_not_padded_further() {
		let h = harness();
		h.api
			.push_authenticate(Scripted::ok(fresh_token()).after(Duration::from_secs(3)))
			.await;

		let started = Instant::now();
		h.flow.submit(SecretString::from("pw")).await;

		let elapsed = started.elapsed();
		assert!(elapsed >= Duration::from_secs(3));
		assert!(elapsed < Duration::from_secs(3) + DEFAULT_MIN_LATENCY);
	}

	#[tokio::test(start_paused = true)]
	async fn failure_also_waits_and_publishes() {
		let h = harness();
		h.api
			.push_authenticate(Scripted::err(ApiError::status(401)))
			.await;

		let started = Instant::now();
		let outcome = h.flow.submit(SecretString::from("wrong")).await;

		assert!(started.elapsed() >= DEFAULT_MIN_LATENCY);
		let LoginOutcome::Failed(details) = outcome else {
			panic!("expected failure, got {outcome:?}");
		};
		assert_eq!(details.body, "Invalid password. Please try again.");
		assert!(!details.forces_logout);
		assert_eq!(h.errors.pending(), Some(details));
		assert_eq!(h.flow.state(), AuthState::Failed);
		assert!(!h.sessions.is_authenticated());
	}

	#[tokio::test(start_paused = true)]
	async fn transport_failure_is_generic() {
		let h = harness();
		h.api
			.push_authenticate(Scripted::err(ApiError::Transport("refused".into())))
			.await;

		let outcome = h.flow.submit(SecretString::from("pw")).await;
		let LoginOutcome::Failed(details) = outcome else {
			panic!("expected failure");
		};
		assert_eq!(details.kind, ErrorKind::Transport);
		assert_eq!(details.body, "Unexpected error.");
	}

	#[tokio::test(start_paused = true)]
	async fn expired_or_garbage_token_is_an_invalid_session() {
		let expired = encode_unsigned_token(&json!({ "exp": 1 }));
		for raw in [expired, "not.a-token".to_string()] {
			let h = harness();
			h.api.push_authenticate(Scripted::ok(raw)).await;

			let outcome = h.flow.submit(SecretString::from("pw")).await;
			let LoginOutcome::Failed(details) = outcome else {
				panic!("expected failure");
			};
			assert_eq!(details.kind, ErrorKind::MalformedSession);
			assert_eq!(details.body, "Invalid session. Please login again.");
			assert!(!h.sessions.is_authenticated());
		}
	}

	#[tokio::test]
	async fn empty_credential_never_reaches_the_api() {
		let h = harness();

		let outcome = h.flow.submit(SecretString::from("")).await;
		let LoginOutcome::Rejected(details) = outcome else {
			panic!("expected local rejection");
		};
		assert_eq!(details.kind, ErrorKind::LocalValidation);
		assert_eq!(h.api.call_count().await, 0);
		assert!(h.errors.pending().is_none());
		assert_eq!(h.flow.state(), AuthState::Idle);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_submit_is_busy() {
		let h = harness();
		h.api.push_authenticate(Scripted::ok(fresh_token())).await;
		let mut state = h.flow.subscribe();

		let flow = h.flow.clone();
		let first = tokio::spawn(async move { flow.submit(SecretString::from("pw")).await });

		state
			.wait_for(|s| *s == AuthState::Submitting)
			.await
			.unwrap();
		assert_eq!(
			h.flow.submit(SecretString::from("pw")).await,
			LoginOutcome::Busy
		);

		assert!(matches!(first.await.unwrap(), LoginOutcome::Success(_)));
		assert_eq!(h.api.call_count().await, 1);
	}

	#[tokio::test(start_paused = true)]
	async fn reset_returns_failed_to_idle() {
		let h = harness();
		h.api
			.push_authenticate(Scripted::err(ApiError::status(500)))
			.await;
		h.flow.submit(SecretString::from("pw")).await;
		assert_eq!(h.flow.state(), AuthState::Failed);

		h.flow.reset();
		assert_eq!(h.flow.state(), AuthState::Idle);
	}

	#[tokio::test(start_paused = true)]
	async fn custom_floor_is_honoured() {
		let api = Arc::new(ScriptedApi::new());
		api.push_authenticate(Scripted::ok(fresh_token())).await;
		let flow = AuthenticationFlow::new(
			api,
			Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new()))),
			Arc::new(ErrorBus::new()),
		)
		.with_min_latency(Duration::from_millis(200));

		let started = Instant::now();
		flow.submit(SecretString::from("pw")).await;
		let elapsed = started.elapsed();
		assert!(elapsed >= Duration::from_millis(200));
		assert!(elapsed < DEFAULT_MIN_LATENCY);
	}
}
