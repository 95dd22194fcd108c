// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application shell wiring the components together.

use std::sync::Arc;
use std::time::Duration;

use baseline_client_core::ErrorDetails;
use baseline_client_storage::TokenStore;
use tracing::{debug, info};

use crate::api::RemoteApi;
use crate::auth::{AuthenticationFlow, DEFAULT_MIN_LATENCY};
use crate::error_bus::ErrorBus;
use crate::routes::{RouteError, RouteGuard, Settled, View};
use crate::session::SessionStore;
use crate::things::ThingsRepository;

/// Navigation control shown next to the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
	Login,
	Logout,
}

/// Builder for constructing an [`App`].
pub struct AppBuilder {
	api: Arc<dyn RemoteApi>,
	storage: Arc<dyn TokenStore>,
	min_latency: Duration,
	guard: RouteGuard,
}

impl AppBuilder {
	/// Minimum duration of a login attempt.
	pub fn min_latency(mut self, min_latency: Duration) -> Self {
		self.min_latency = min_latency;
		self
	}

	pub fn routes(mut self, guard: RouteGuard) -> Self {
		self.guard = guard;
		self
	}

	pub fn build(self) -> App {
		let sessions = Arc::new(SessionStore::new(self.storage));
		let errors = Arc::new(ErrorBus::new());
		let login = AuthenticationFlow::new(self.api.clone(), sessions.clone(), errors.clone())
			.with_min_latency(self.min_latency);
		let things = Arc::new(ThingsRepository::new(
			self.api.clone(),
			sessions.clone(),
			errors.clone(),
		));

		App {
			api: self.api,
			sessions,
			errors,
			guard: self.guard,
			login,
			things,
		}
	}
}

/// Owns the session, the error bus and the components that use them.
#[derive(Debug)]
pub struct App {
	api: Arc<dyn RemoteApi>,
	sessions: Arc<SessionStore>,
	errors: Arc<ErrorBus>,
	guard: RouteGuard,
	login: AuthenticationFlow,
	things: Arc<ThingsRepository>,
}

impl App {
	pub fn builder(api: Arc<dyn RemoteApi>, storage: Arc<dyn TokenStore>) -> AppBuilder {
		AppBuilder {
			api,
			storage,
			min_latency: DEFAULT_MIN_LATENCY,
			guard: RouteGuard::standard(),
		}
	}

	/// Restore any persisted session. Returns whether the app starts signed in.
	pub async fn start(&self) -> bool {
		let authenticated = self.sessions.initialize_from_storage().await;
		info!(authenticated, demo = self.api.is_demo(), "client started");
		authenticated
	}

	pub fn sessions(&self) -> &Arc<SessionStore> {
		&self.sessions
	}

	pub fn errors(&self) -> &Arc<ErrorBus> {
		&self.errors
	}

	pub fn login(&self) -> &AuthenticationFlow {
		&self.login
	}

	pub fn things(&self) -> &Arc<ThingsRepository> {
		&self.things
	}

	pub fn guard(&self) -> &RouteGuard {
		&self.guard
	}

	pub fn is_demo(&self) -> bool {
		self.api.is_demo()
	}

	/// Control for the navigation bar while `view` is shown. The login link is
	/// hidden on the login view itself.
	pub fn nav_action(&self, view: View) -> Option<NavAction> {
		if self.sessions.is_authenticated() {
			Some(NavAction::Logout)
		} else if view == View::Login {
			None
		} else {
			Some(NavAction::Login)
		}
	}

	/// Resolve a path against the current session state.
	pub fn navigate(&self, path: &str) -> Result<Settled, RouteError> {
		self.guard.settle(path, self.sessions.is_authenticated())
	}

	/// Dismiss the pending error. A forced logout clears the session, and a
	/// failed login becomes idle again.
	pub async fn acknowledge_error(&self) -> Option<ErrorDetails> {
		let acknowledged = self.errors.acknowledge(&self.sessions).await;
		self.login.reset();
		acknowledged
	}

	pub async fn logout(&self) {
		debug!("logout requested");
		self.sessions.clear().await;
	}

	/// Stop background work; late responses are discarded.
	pub fn shutdown(&self) {
		self.things.dispose();
	}
}
