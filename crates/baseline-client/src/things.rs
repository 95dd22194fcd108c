// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remote collection fetch and client-side filtering.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use baseline_client_core::{filter_things, ErrorDetails, ThingRecord};
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::RemoteApi;
use crate::error_bus::ErrorBus;
use crate::session::SessionStore;

#[derive(Debug, Default)]
struct Listing {
	/// Sequence number of the last applied request.
	applied: u64,
	things: Vec<ThingRecord>,
}

/// Fetches the remote collection and keeps the last applied result.
///
/// Requests are never cancelled. Each carries a sequence number and a
/// response older than the last applied one is dropped. After
/// [`dispose`](Self::dispose) nothing is written and nothing is published.
#[derive(Debug)]
pub struct ThingsRepository {
	api: Arc<dyn RemoteApi>,
	sessions: Arc<SessionStore>,
	errors: Arc<ErrorBus>,
	listing: RwLock<Listing>,
	next_seq: AtomicU64,
	disposed: AtomicBool,
	shutdown: Notify,
}

impl ThingsRepository {
	pub fn new(api: Arc<dyn RemoteApi>, sessions: Arc<SessionStore>, errors: Arc<ErrorBus>) -> Self {
		Self {
			api,
			sessions,
			errors,
			listing: RwLock::new(Listing::default()),
			next_seq: AtomicU64::new(0),
			disposed: AtomicBool::new(false),
			shutdown: Notify::new(),
		}
	}

	/// Fetch the collection and apply `filter`.
	///
	/// Returns the collection as it stands once this request is settled: the
	/// new result on success, the previous one on failure or staleness.
	#[instrument(skip_all, fields(filter = filter.unwrap_or("")))]
	pub async fn list(&self, filter: Option<&str>) -> Vec<ThingRecord> {
		let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

		if self.is_disposed() {
			debug!(seq, "repository disposed, not fetching");
			return self.snapshot().await;
		}

		let Some(token) = self.sessions.raw_token().await else {
			warn!(seq, "no session, reporting expired session");
			self.errors.publish(ErrorDetails::session_expired());
			return self.snapshot().await;
		};

		let result = self.api.list_things(&token).await;

		if self.is_disposed() {
			debug!(seq, "discarding response after dispose");
			return self.snapshot().await;
		}

		let mut listing = self.listing.write().await;
		if seq < listing.applied {
			debug!(seq, applied = listing.applied, "discarding stale response");
			return listing.things.clone();
		}
		listing.applied = seq;

		match result {
			Ok(page) => {
				let total = page.things.len();
				listing.things = filter_things(page.things, filter);
				debug!(seq, total, shown = listing.things.len(), "things applied");
			}
			Err(e) => {
				warn!(seq, error = %e, "failed to load things");
				self.errors.publish(ErrorDetails::load_failure(&e));
			}
		}

		listing.things.clone()
	}

	pub async fn snapshot(&self) -> Vec<ThingRecord> {
		self.listing.read().await.things.clone()
	}

	/// Empty the collection and mark every request issued so far as stale.
	async fn forget(&self) {
		let mut listing = self.listing.write().await;
		listing.applied = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
		listing.things.clear();
		debug!(applied = listing.applied, "session ended, things cleared");
	}

	pub fn dispose(&self) {
		if !self.disposed.swap(true, Ordering::SeqCst) {
			debug!("things repository disposed");
			self.shutdown.notify_one();
		}
	}

	pub fn is_disposed(&self) -> bool {
		self.disposed.load(Ordering::SeqCst)
	}

	/// Reload on every unauthenticated to authenticated transition until
	/// disposed. Loads at once if already authenticated. Signing out empties
	/// the collection.
	pub fn watch_session(self: &Arc<Self>) -> JoinHandle<()> {
		let repo = Arc::clone(self);
		let mut authenticated = self.sessions.subscribe();

		tokio::spawn(async move {
			let mut was_authenticated = *authenticated.borrow_and_update();
			if was_authenticated {
				repo.list(None).await;
			}

			loop {
				if repo.is_disposed() {
					break;
				}

				tokio::select! {
					changed = authenticated.changed() => {
						if changed.is_err() {
							break;
						}
					}
					_ = repo.shutdown.notified() => break,
				}

				let now_authenticated = *authenticated.borrow_and_update();
				if now_authenticated && !was_authenticated {
					info!("session started, loading things");
					repo.list(None).await;
				} else if !now_authenticated && was_authenticated && !repo.is_disposed() {
					repo.forget().await;
				}
				was_authenticated = now_authenticated;
			}

			debug!("session watcher stopped");
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::api::{ApiCall, Scripted, ScriptedApi};
	use baseline_client_core::{encode_unsigned_token, ApiError, ThingsPage};
	use baseline_client_storage::MemoryTokenStore;
	use chrono::Utc;
	use serde_json::json;
	use std::time::Duration;

	struct Harness {
		api: Arc<ScriptedApi>,
		sessions: Arc<SessionStore>,
		errors: Arc<ErrorBus>,
		repo: Arc<ThingsRepository>,
		token: String,
	}

	async fn harness(signed_in: bool) -> Harness {
		let api = Arc::new(ScriptedApi::new());
		let sessions = Arc::new(SessionStore::new(Arc::new(MemoryTokenStore::new())));
		let token = encode_unsigned_token(&json!({ "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp() }));
		if signed_in {
			assert!(sessions.promote(&token).await);
		}
		let errors = Arc::new(ErrorBus::new());
		let repo = Arc::new(ThingsRepository::new(
			api.clone(),
			sessions.clone(),
			errors.clone(),
		));
		Harness {
			api,
			sessions,
			errors,
			repo,
			token,
		}
	}

	fn page(names: &[&str]) -> ThingsPage {
		ThingsPage {
			things: names.iter().map(|n| ThingRecord::new(*n)).collect(),
		}
	}

	fn names(things: &[ThingRecord]) -> Vec<&str> {
		things.iter().map(|t| t.name.as_str()).collect()
	}

	#[tokio::test]
	async fn list_sends_raw_token_and_filters_locally() {
		let h = harness(true).await;
		h.api.push_things(Scripted::ok(page(&["ABC-1", "xyz", "abc-2"]))).await;

		let result = h.repo.list(Some("abc")).await;
		assert_eq!(names(&result), vec!["ABC-1", "abc-2"]);
		assert_eq!(
			h.api.calls().await,
			vec![ApiCall::ListThings { token: h.token.clone() }]
		);
	}

	#[tokio::test]
	async fn empty_filter_returns_everything() {
		let h = harness(true).await;
		h.api.push_things(Scripted::ok(page(&["a", "b"]))).await;
		assert_eq!(h.repo.list(Some("")).await.len(), 2);
	}

	#[tokio::test]
	async fn server_error_keeps_previous_collection() {
		let h = harness(true).await;
		h.api.push_things(Scripted::ok(page(&["a", "b"]))).await;
		h.api.push_things(Scripted::err(ApiError::status(500))).await;

		h.repo.list(None).await;
		let after = h.repo.list(Some("a")).await;

		assert_eq!(names(&after), vec!["a", "b"]);
		let error = h.errors.pending().unwrap();
		assert_eq!(error.title, "Unable To Load Data!");
		assert!(!error.forces_logout);
	}

	#[tokio::test]
	async fn forbidden_forces_logout_on_acknowledge() {
		let h = harness(true).await;
		h.api.push_things(Scripted::err(ApiError::status(403))).await;

		h.repo.list(None).await;
		assert!(h.errors.pending().unwrap().forces_logout);
		assert!(h.sessions.is_authenticated());

		h.errors.acknowledge(&h.sessions).await;
		assert!(!h.sessions.is_authenticated());
	}

	#[tokio::test]
	async fn missing_session_is_reported_without_a_request() {
		let h = harness(false).await;

		h.repo.list(None).await;
		assert_eq!(h.api.call_count().await, 0);
		assert!(h.errors.pending().unwrap().forces_logout);
	}

	#[tokio::test(start_paused = true)]
	async fn stale_response_is_discarded() {
		let h = harness(true).await;
		h.api
			.push_things(Scripted::ok(page(&["old"])).after(Duration::from_secs(2)))
			.await;
		h.api
			.push_things(Scripted::ok(page(&["new"])).after(Duration::from_millis(10)))
			.await;

		let (first, second) = tokio::join!(h.repo.list(None), h.repo.list(None));

		assert_eq!(names(&second), vec!["new"]);
		assert_eq!(names(&first), vec!["new"]);
		assert_eq!(names(&h.repo.snapshot().await), vec!["new"]);
	}

	#[tokio::test(start_paused = true)]
	async fn disposed_repository_ignores_late_responses() {
		let h = harness(true).await;
		h.api
			.push_things(Scripted::err(ApiError::status(401)).after(Duration::from_secs(1)))
			.await;

		let repo = h.repo.clone();
		let pending = tokio::spawn(async move { repo.list(None).await });
		tokio::task::yield_now().await;
		h.repo.dispose();

		assert!(pending.await.unwrap().is_empty());
		assert!(h.errors.pending().is_none());
	}

	#[tokio::test]
	async fn watcher_loads_on_sign_in_and_clears_on_sign_out() {
		let h = harness(false).await;
		h.api.push_things(Scripted::ok(page(&["a"]))).await;
		let watcher = h.repo.watch_session();

		assert!(h.sessions.promote(&h.token).await);
		for _ in 0..100 {
			if !h.repo.snapshot().await.is_empty() {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert_eq!(names(&h.repo.snapshot().await), vec!["a"]);

		h.sessions.clear().await;
		for _ in 0..100 {
			if h.repo.snapshot().await.is_empty() {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert!(h.repo.snapshot().await.is_empty());

		h.repo.dispose();
		watcher.await.unwrap();
	}

	#[tokio::test(start_paused = true)]
	async fn response_in_flight_at_sign_out_is_dropped() {
		let h = harness(false).await;
		h.api.push_things(Scripted::ok(page(&["a"]))).await;
		h.api
			.push_things(Scripted::ok(page(&["late"])).after(Duration::from_secs(2)))
			.await;
		let watcher = h.repo.watch_session();

		assert!(h.sessions.promote(&h.token).await);
		for _ in 0..100 {
			if !h.repo.snapshot().await.is_empty() {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert_eq!(names(&h.repo.snapshot().await), vec!["a"]);

		let repo = h.repo.clone();
		let pending = tokio::spawn(async move { repo.list(Some("")).await });
		for _ in 0..100 {
			if h.api.call_count().await == 2 {
				break;
			}
			tokio::task::yield_now().await;
		}
		assert_eq!(h.api.call_count().await, 2);

		h.sessions.clear().await;
		for _ in 0..100 {
			if h.repo.snapshot().await.is_empty() {
				break;
			}
			tokio::task::yield_now().await;
		}

		assert!(pending.await.unwrap().is_empty());
		assert!(h.repo.snapshot().await.is_empty());
		assert!(!h.sessions.is_authenticated());

		h.repo.dispose();
		watcher.await.unwrap();
	}

	#[tokio::test]
	async fn watcher_loads_immediately_when_already_signed_in() {
		let h = harness(true).await;
		h.api.push_things(Scripted::ok(page(&["a", "b"]))).await;

		let watcher = h.repo.watch_session();
		for _ in 0..100 {
			if h.api.call_count().await == 1 {
				break;
			}
			tokio::task::yield_now().await;
		}
		h.repo.dispose();
		watcher.await.unwrap();

		assert_eq!(h.api.call_count().await, 1);
	}
}
