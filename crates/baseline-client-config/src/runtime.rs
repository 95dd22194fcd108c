// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_MIN_LATENCY_MS: u64 = 1500;

/// The final, validated configuration for the Baseline client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
	pub api: ApiConfig,
	pub session: SessionConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,

	/// Resolved XDG paths (not serialized)
	#[serde(skip)]
	pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
	pub base_url: String,
	/// Serve everything from the bundled demo API instead of the network.
	pub demo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
	pub state_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
	/// Minimum wall-clock time a login attempt takes, success or failure.
	pub min_latency_ms: u64,
}

impl AuthConfig {
	pub fn min_latency(&self) -> Duration {
		Duration::from_millis(self.min_latency_ms)
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

impl LogLevel {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Error => "error",
			Self::Warn => "warn",
			Self::Info => "info",
			Self::Debug => "debug",
			Self::Trace => "trace",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

impl ClientConfig {
	/// Build runtime config from a merged layer, applying defaults.
	pub fn from_layer(layer: ConfigLayer, paths: PathsConfig) -> Result<Self, ConfigError> {
		let api = layer.api.unwrap_or_default();
		let session = layer.session.unwrap_or_default();
		let auth = layer.auth.unwrap_or_default();
		let logging = layer.logging.unwrap_or_default();

		Ok(Self {
			api: ApiConfig {
				base_url: api
					.base_url
					.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
				demo: api.demo.unwrap_or(false),
			},
			session: SessionConfig {
				state_file: session
					.state_file
					.unwrap_or_else(|| paths.default_state_file()),
			},
			auth: AuthConfig {
				min_latency_ms: auth.min_latency_ms.unwrap_or(DEFAULT_MIN_LATENCY_MS),
			},
			logging: LoggingConfig {
				level: parse_log_level(logging.level.as_deref()),
				format: parse_log_format(logging.format.as_deref()),
			},
			paths,
		})
	}
}

fn parse_log_level(s: Option<&str>) -> LogLevel {
	match s {
		Some("error") => LogLevel::Error,
		Some("warn") => LogLevel::Warn,
		Some("info") => LogLevel::Info,
		Some("debug") => LogLevel::Debug,
		Some("trace") => LogLevel::Trace,
		None => LogLevel::default(),
		Some(other) => {
			warn!(level = %other, "unknown log level, using default");
			LogLevel::default()
		}
	}
}

fn parse_log_format(s: Option<&str>) -> LogFormat {
	match s {
		Some("json") => LogFormat::Json,
		Some("compact") => LogFormat::Compact,
		Some("pretty") => LogFormat::Pretty,
		None => LogFormat::default(),
		Some(other) => {
			warn!(format = %other, "unknown log format, using default");
			LogFormat::default()
		}
	}
}
