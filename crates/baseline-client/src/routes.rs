// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation guard.
//!
//! Every route carries an [`Access`] capability. Resolving a path against the
//! authenticated flag either renders a [`View`] or redirects to a landing
//! path. Resolution never touches the session.

use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Where unauthenticated users land.
pub const PUBLIC_LANDING: &str = "/";
/// Where authenticated users land.
pub const AUTHENTICATED_LANDING: &str = "/dashboard";

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
	/// Reachable only with a session; otherwise redirect to [`PUBLIC_LANDING`].
	RequiresAuthentication,
	/// Reachable only without a session; otherwise redirect to [`AUTHENTICATED_LANDING`].
	RequiresNoAuthentication,
	Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
	Welcome,
	Login,
	Dashboard,
	NotFound,
}

impl fmt::Display for View {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Welcome => "welcome",
			Self::Login => "login",
			Self::Dashboard => "dashboard",
			Self::NotFound => "not-found",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
	pub path: &'static str,
	pub view: View,
	pub access: Access,
}

impl Route {
	pub const fn new(path: &'static str, view: View, access: Access) -> Self {
		Self { path, view, access }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
	Render(View),
	Redirect { to: &'static str },
}

/// Outcome of following redirects to a rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
	pub view: View,
	/// Path that rendered `view`.
	pub path: String,
	/// Redirect targets followed on the way, in order.
	pub redirects: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
	#[error("redirect loop starting at {path}")]
	RedirectLoop { path: String },
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
	routes: Vec<Route>,
}

impl RouteGuard {
	pub fn new(routes: Vec<Route>) -> Self {
		Self { routes }
	}

	/// `/` Welcome, `/login` Login, `/dashboard` Dashboard.
	pub fn standard() -> Self {
		Self::new(vec![
			Route::new(PUBLIC_LANDING, View::Welcome, Access::RequiresNoAuthentication),
			Route::new("/login", View::Login, Access::RequiresNoAuthentication),
			Route::new(AUTHENTICATED_LANDING, View::Dashboard, Access::RequiresAuthentication),
		])
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	pub fn find(&self, path: &str) -> Option<&Route> {
		let path = normalize(path);
		self.routes.iter().find(|route| route.path == path)
	}

	/// Decide a single navigation step.
	pub fn resolve(&self, path: &str, authenticated: bool) -> Navigation {
		let Some(route) = self.find(path) else {
			return Navigation::Render(View::NotFound);
		};

		match (route.access, authenticated) {
			(Access::RequiresAuthentication, false) => Navigation::Redirect {
				to: PUBLIC_LANDING,
			},
			(Access::RequiresNoAuthentication, true) => Navigation::Redirect {
				to: AUTHENTICATED_LANDING,
			},
			_ => Navigation::Render(route.view),
		}
	}

	/// Follow redirects until a view renders.
	pub fn settle(&self, path: &str, authenticated: bool) -> Result<Settled, RouteError> {
		let mut current = normalize(path).to_string();
		let mut redirects = Vec::new();

		loop {
			match self.resolve(&current, authenticated) {
				Navigation::Render(view) => {
					debug!(path = %path, settled = %current, view = %view, "navigation settled");
					return Ok(Settled {
						view,
						path: current,
						redirects,
					});
				}
				Navigation::Redirect { to } => {
					if redirects.len() >= MAX_REDIRECTS {
						return Err(RouteError::RedirectLoop {
							path: path.to_string(),
						});
					}
					debug!(from = %current, to = %to, "redirecting");
					redirects.push(to);
					current = to.to_string();
				}
			}
		}
	}
}

impl Default for RouteGuard {
	fn default() -> Self {
		Self::standard()
	}
}

/// A trailing slash is ignored except on the root.
fn normalize(path: &str) -> &str {
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() && path.starts_with('/') {
		"/"
	} else {
		trimmed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn protected_route_redirects_home_when_signed_out() {
		let guard = RouteGuard::standard();
		assert_eq!(
			guard.resolve("/dashboard", false),
			Navigation::Redirect { to: "/" }
		);
		assert_eq!(
			guard.resolve("/dashboard", true),
			Navigation::Render(View::Dashboard)
		);
	}

	#[test]
	fn guest_routes_redirect_to_dashboard_when_signed_in() {
		let guard = RouteGuard::standard();
		for path in ["/", "/login"] {
			assert_eq!(
				guard.resolve(path, true),
				Navigation::Redirect { to: "/dashboard" }
			);
		}
		assert_eq!(guard.resolve("/", false), Navigation::Render(View::Welcome));
		assert_eq!(guard.resolve("/login", false), Navigation::Render(View::Login));
	}

	#[test]
	fn unmatched_paths_are_not_found() {
		let guard = RouteGuard::standard();
		for path in ["/settings", "/dashboard/extra", "login", "", "/LOGIN"] {
			assert_eq!(guard.resolve(path, true), Navigation::Render(View::NotFound));
			assert_eq!(guard.resolve(path, false), Navigation::Render(View::NotFound));
		}
	}

	#[test]
	fn trailing_slash_is_ignored() {
		let guard = RouteGuard::standard();
		assert_eq!(guard.resolve("/login/", false), Navigation::Render(View::Login));
		assert_eq!(guard.resolve("//", false), Navigation::Render(View::Welcome));
	}

	#[test]
	fn settle_records_redirect_chain() {
		let guard = RouteGuard::standard();

		let settled = guard.settle("/dashboard", false).unwrap();
		assert_eq!(settled.view, View::Welcome);
		assert_eq!(settled.path, "/");
		assert_eq!(settled.redirects, vec!["/"]);

		let settled = guard.settle("/login", true).unwrap();
		assert_eq!(settled.view, View::Dashboard);
		assert_eq!(settled.redirects, vec!["/dashboard"]);

		let settled = guard.settle("/nope", true).unwrap();
		assert_eq!(settled.view, View::NotFound);
		assert!(settled.redirects.is_empty());
	}

	#[test]
	fn settle_detects_loops_in_custom_tables() {
		let guard = RouteGuard::new(vec![
			Route::new("/", View::Welcome, Access::RequiresAuthentication),
			Route::new("/dashboard", View::Dashboard, Access::RequiresAuthentication),
		]);
		assert_eq!(
			guard.settle("/dashboard", false),
			Err(RouteError::RedirectLoop {
				path: "/dashboard".to_string()
			})
		);
	}

	fn path_strategy() -> impl Strategy<Value = String> {
		prop_oneof![
			Just("/".to_string()),
			Just("/login".to_string()),
			Just("/dashboard".to_string()),
			Just("/dashboard/".to_string()),
			"/[a-z]{0,10}/?",
			".{0,16}",
		]
	}

	proptest! {
		#[test]
		fn standard_table_always_settles(path in path_strategy(), authenticated in any::<bool>()) {
			let guard = RouteGuard::standard();
			let settled = guard.settle(&path, authenticated).unwrap();
			prop_assert!(settled.redirects.len() <= 1);

			match settled.view {
				View::Dashboard => prop_assert!(authenticated),
				View::Welcome | View::Login => prop_assert!(!authenticated),
				View::NotFound => {}
			}
		}

		#[test]
		fn protected_routes_never_redirect_to_themselves(authenticated in any::<bool>()) {
			let guard = RouteGuard::standard();
			for route in guard.routes() {
				if let Navigation::Redirect { to } = guard.resolve(route.path, authenticated) {
					prop_assert_ne!(to, route.path);
				}
			}
		}
	}
}
