// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Baseline client components.
//!
//! - [`SessionStore`]: current session and its persisted mirror
//! - [`RouteGuard`]: which view a path renders for the session state
//! - [`AuthenticationFlow`]: credential submission with a latency floor
//! - [`ThingsRepository`]: remote collection fetch and filter
//! - [`ErrorBus`]: single pending error for the presentation layer
//! - [`App`]: the shell owning all of the above

pub mod api;
pub mod app;
pub mod auth;
pub mod error_bus;
pub mod routes;
pub mod session;
pub mod things;

pub use api::{DemoApi, HttpApi, RemoteApi, ScriptedApi};
pub use app::{App, AppBuilder, NavAction};
pub use auth::{AuthState, AuthenticationAttempt, AuthenticationFlow, LoginOutcome, DEFAULT_MIN_LATENCY};
pub use error_bus::ErrorBus;
pub use routes::{Access, Navigation, Route, RouteError, RouteGuard, Settled, View};
pub use session::SessionStore;
pub use things::ThingsRepository;
