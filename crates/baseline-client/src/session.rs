// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide session state.
//!
//! [`SessionStore`] is the only writer of the current [`Session`] and of its
//! persisted mirror. Validity is checked when a token is decoded, not
//! continuously: a session that expires while the process runs stays
//! authenticated until the API rejects it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use baseline_client_core::{decode_token, Session};
use baseline_client_storage::TokenStore;
use baseline_common_secret::SecretString;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
pub struct SessionStore {
	storage: Arc<dyn TokenStore>,
	current: RwLock<Option<Session>>,
	authenticated: watch::Sender<bool>,
	initialized: AtomicBool,
}

impl SessionStore {
	pub fn new(storage: Arc<dyn TokenStore>) -> Self {
		let (authenticated, _) = watch::channel(false);
		Self {
			storage,
			current: RwLock::new(None),
			authenticated,
			initialized: AtomicBool::new(false),
		}
	}

	/// Restore the session persisted by an earlier run.
	///
	/// Authenticated iff a persisted token decodes and is valid now. Only the
	/// first call reads storage; later calls report the current state.
	#[instrument(skip_all)]
	pub async fn initialize_from_storage(&self) -> bool {
		if self.initialized.swap(true, Ordering::SeqCst) {
			return self.is_authenticated();
		}

		let raw = match self.storage.load().await {
			Ok(Some(raw)) => raw,
			Ok(None) => {
				debug!("no persisted session");
				return false;
			}
			Err(e) => {
				warn!(error = %e, "failed to read persisted session, starting unauthenticated");
				return false;
			}
		};

		match decode_token(raw.expose()) {
			Some(session) if session.is_valid() => {
				info!(expires_at = %session.expires_at(), "restored persisted session");
				self.set(Some(session)).await;
				true
			}
			Some(session) => {
				debug!(expires_at = %session.expires_at(), "persisted session has expired");
				false
			}
			None => {
				debug!("persisted session token is malformed");
				false
			}
		}
	}

	/// Adopt a freshly issued raw token.
	///
	/// Returns false, leaving state untouched, if the token does not decode or
	/// has already expired.
	#[instrument(skip_all)]
	pub async fn promote(&self, raw: &str) -> bool {
		let session = match decode_token(raw) {
			Some(session) if session.is_valid() => session,
			Some(_) => {
				debug!("refusing to promote an expired token");
				return false;
			}
			None => {
				debug!("refusing to promote a malformed token");
				return false;
			}
		};

		if let Err(e) = self.storage.save(session.raw_token()).await {
			warn!(error = %e, "failed to persist session, continuing with in-memory session");
		}

		info!(expires_at = %session.expires_at(), "session established");
		self.set(Some(session)).await;
		true
	}

	/// End the session and drop every persisted value. Idempotent.
	#[instrument(skip_all)]
	pub async fn clear(&self) {
		if let Err(e) = self.storage.clear().await {
			warn!(error = %e, "failed to clear persisted client state");
		}

		if self.current.read().await.is_some() {
			info!("session cleared");
		}
		self.set(None).await;
	}

	pub fn is_authenticated(&self) -> bool {
		*self.authenticated.borrow()
	}

	pub async fn session(&self) -> Option<Session> {
		self.current.read().await.clone()
	}

	pub async fn raw_token(&self) -> Option<SecretString> {
		self.current
			.read()
			.await
			.as_ref()
			.map(|s| s.raw_token().clone())
	}

	/// Observe authenticated transitions. Only actual changes are signalled.
	pub fn subscribe(&self) -> watch::Receiver<bool> {
		self.authenticated.subscribe()
	}

	async fn set(&self, session: Option<Session>) {
		let authenticated = session.is_some();
		*self.current.write().await = session;
		self.authenticated.send_if_modified(|current| {
			let changed = *current != authenticated;
			*current = authenticated;
			changed
		});
	}
}
