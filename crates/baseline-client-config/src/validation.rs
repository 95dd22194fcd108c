// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use tracing::warn;
use url::Url;

use crate::runtime::{ClientConfig, DEFAULT_MIN_LATENCY_MS};
use crate::ConfigError;

/// Upper bound for the login latency floor. The lower bound is the default.
const MAX_MIN_LATENCY_MS: u64 = 60_000;

/// Validate the configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
	validate_api(config)?;
	validate_session(config)?;
	validate_auth(config)?;

	Ok(())
}

fn validate_api(config: &ClientConfig) -> Result<(), ConfigError> {
	if config.api.demo {
		// The bundled demo API never touches the network.
		return Ok(());
	}

	let url = Url::parse(&config.api.base_url)
		.map_err(|e| ConfigError::invalid_value("api.base_url", e.to_string()))?;

	match url.scheme() {
		"http" | "https" => {}
		other => {
			return Err(ConfigError::invalid_value(
				"api.base_url",
				format!("unsupported scheme '{other}', expected http or https"),
			));
		}
	}

	if url.scheme() == "http" && url.host_str().is_some_and(|h| h != "localhost" && h != "127.0.0.1") {
		warn!(base_url = %config.api.base_url, "API base URL is not using TLS");
	}

	Ok(())
}

fn validate_session(config: &ClientConfig) -> Result<(), ConfigError> {
	if config.session.state_file.as_os_str().is_empty() {
		return Err(ConfigError::invalid_value(
			"session.state_file",
			"state_file cannot be empty",
		));
	}
	Ok(())
}

fn validate_auth(config: &ClientConfig) -> Result<(), ConfigError> {
	if config.auth.min_latency_ms < DEFAULT_MIN_LATENCY_MS {
		return Err(ConfigError::invalid_value(
			"auth.min_latency_ms",
			format!("must be at least {DEFAULT_MIN_LATENCY_MS}"),
		));
	}
	if config.auth.min_latency_ms > MAX_MIN_LATENCY_MS {
		return Err(ConfigError::invalid_value(
			"auth.min_latency_ms",
			format!("must be at most {MAX_MIN_LATENCY_MS}"),
		));
	}
	Ok(())
}
