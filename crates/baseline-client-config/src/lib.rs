// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the Baseline client.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. User config (`$XDG_CONFIG_HOME/baseline/config.toml`)
//! 3. File given with `--config`
//! 4. Environment variables (`BASELINE_*`)
//! 5. CLI arguments

mod error;
pub mod layer;
pub mod paths;
mod registry;
pub mod runtime;
pub mod sources;
mod validation;

pub use error::ConfigError;
pub use paths::{resolve_xdg_paths, PathsConfig};
pub use registry::ConfigRegistry;
pub use runtime::{
	ApiConfig, AuthConfig, ClientConfig, LogFormat, LogLevel, LoggingConfig, SessionConfig,
	DEFAULT_BASE_URL, DEFAULT_MIN_LATENCY_MS,
};
pub use sources::{CliOverrides, CliSource, ConfigSource, DefaultsSource, EnvSource, FileSource, Precedence};
pub use validation::validate_config;

/// Load configuration from the standard sources plus CLI overrides.
pub fn load_config_with_cli(cli: CliOverrides) -> Result<ClientConfig, ConfigError> {
	let paths = resolve_xdg_paths()?;
	let mut registry = ConfigRegistry::new();

	registry.register(Box::new(DefaultsSource));
	registry.register(Box::new(FileSource::user(&paths)));
	if let Some(ref path) = cli.config_file {
		registry.register(Box::new(FileSource::explicit(path.clone())));
	}
	registry.register(Box::new(EnvSource::process()));
	registry.register(Box::new(CliSource::new(cli)));

	registry.load(paths)
}
