// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;
use std::path::PathBuf;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub api: Option<ApiLayer>,
	#[serde(default)]
	pub session: Option<SessionLayer>,
	#[serde(default)]
	pub auth: Option<AuthLayer>,
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiLayer {
	#[serde(default)]
	pub base_url: Option<String>,
	#[serde(default)]
	pub demo: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionLayer {
	#[serde(default)]
	pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthLayer {
	#[serde(default)]
	pub min_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

impl ConfigLayer {
	/// Merge `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.api, other.api, ApiLayer::merge);
		merge_option(&mut self.session, other.session, SessionLayer::merge);
		merge_option(&mut self.auth, other.auth, AuthLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
	}

	pub(crate) fn api_mut(&mut self) -> &mut ApiLayer {
		self.api.get_or_insert_with(ApiLayer::default)
	}

	pub(crate) fn session_mut(&mut self) -> &mut SessionLayer {
		self.session.get_or_insert_with(SessionLayer::default)
	}

	pub(crate) fn auth_mut(&mut self) -> &mut AuthLayer {
		self.auth.get_or_insert_with(AuthLayer::default)
	}

	pub(crate) fn logging_mut(&mut self) -> &mut LoggingLayer {
		self.logging.get_or_insert_with(LoggingLayer::default)
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

impl ApiLayer {
	fn merge(&mut self, other: ApiLayer) {
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
		if other.demo.is_some() {
			self.demo = other.demo;
		}
	}
}

impl SessionLayer {
	fn merge(&mut self, other: SessionLayer) {
		if other.state_file.is_some() {
			self.state_file = other.state_file;
		}
	}
}

impl AuthLayer {
	fn merge(&mut self, other: AuthLayer) {
		if other.min_latency_ms.is_some() {
			self.min_latency_ms = other.min_latency_ms;
		}
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}
