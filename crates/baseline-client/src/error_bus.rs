// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use baseline_client_core::ErrorDetails;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::session::SessionStore;

/// Single-slot channel from failing components to the presentation layer.
///
/// Publishing overwrites an unacknowledged error.
#[derive(Debug)]
pub struct ErrorBus {
	slot: watch::Sender<Option<ErrorDetails>>,
}

impl ErrorBus {
	pub fn new() -> Self {
		let (slot, _) = watch::channel(None);
		Self { slot }
	}

	pub fn publish(&self, details: ErrorDetails) {
		debug!(kind = ?details.kind, title = %details.title, forces_logout = details.forces_logout, "error published");
		if let Some(replaced) = self.slot.send_replace(Some(details)) {
			debug!(kind = ?replaced.kind, "unacknowledged error replaced");
		}
	}

	pub fn pending(&self) -> Option<ErrorDetails> {
		self.slot.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<Option<ErrorDetails>> {
		self.slot.subscribe()
	}

	/// Dismiss the pending error, ending the session first if it demands so.
	///
	/// Returns the acknowledged error. An error published while the session
	/// was being cleared stays pending.
	pub async fn acknowledge(&self, sessions: &SessionStore) -> Option<ErrorDetails> {
		let acknowledged = self.pending()?;

		if acknowledged.forces_logout {
			info!(kind = ?acknowledged.kind, "acknowledged error ends the session");
			sessions.clear().await;
		}

		self.slot.send_if_modified(|slot| {
			if slot.as_ref() == Some(&acknowledged) {
				*slot = None;
				true
			} else {
				false
			}
		});

		Some(acknowledged)
	}
}

impl Default for ErrorBus {
	fn default() -> Self {
		Self::new()
	}
}
