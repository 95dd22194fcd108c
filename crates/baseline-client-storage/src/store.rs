// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use baseline_common_secret::SecretString;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::StorageError;

/// Slot holding the raw session token.
pub const SESSION_KEY: &str = "session";

/// On-disk state: a flat string map, like browser local storage.
pub type PersistedState = BTreeMap<String, String>;

/// Durable home of the session token.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
	/// Read the persisted raw token, if any.
	async fn load(&self) -> Result<Option<SecretString>, StorageError>;

	/// Persist the raw token, replacing any previous one.
	async fn save(&self, token: &SecretString) -> Result<(), StorageError>;

	/// Remove the token and every other persisted value. Idempotent.
	async fn clear(&self) -> Result<(), StorageError>;
}

/// JSON state file store.
///
/// Writes go through a temp file and a rename; the file is restricted to the
/// owner (0600) on Unix.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
	path: PathBuf,
}

impl FileTokenStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Read the whole state file. A missing file is an empty state.
	pub async fn read_state(&self) -> Result<PersistedState, StorageError> {
		if !fs::try_exists(&self.path).await? {
			return Ok(PersistedState::new());
		}

		let contents = fs::read_to_string(&self.path).await?;
		Ok(serde_json::from_str(&contents)?)
	}

	async fn write_state(&self, state: &PersistedState) -> Result<(), StorageError> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}

		let contents = serde_json::to_string_pretty(state)?;

		let temp_path = self.path.with_extension("tmp");
		let mut file = fs::File::create(&temp_path).await?;
		file.write_all(contents.as_bytes()).await?;
		file.sync_all().await?;
		drop(file);

		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			let perms = std::fs::Permissions::from_mode(0o600);
			if let Err(e) = std::fs::set_permissions(&temp_path, perms) {
				warn!(path = ?temp_path, error = %e, "Failed to set file permissions to 0600");
			}
		}

		fs::rename(&temp_path, &self.path).await?;

		debug!(path = ?self.path, "Client state written");
		Ok(())
	}
}

#[async_trait]
impl TokenStore for FileTokenStore {
	async fn load(&self) -> Result<Option<SecretString>, StorageError> {
		let state = self.read_state().await?;
		Ok(state.get(SESSION_KEY).cloned().map(SecretString::new))
	}

	async fn save(&self, token: &SecretString) -> Result<(), StorageError> {
		let mut state = match self.read_state().await {
			Ok(state) => state,
			Err(StorageError::Corrupt(e)) => {
				warn!(path = ?self.path, error = %e, "Replacing unreadable client state");
				PersistedState::new()
			}
			Err(e) => return Err(e),
		};
		state.insert(SESSION_KEY.to_string(), token.expose().clone());
		self.write_state(&state).await
	}

	async fn clear(&self) -> Result<(), StorageError> {
		match fs::remove_file(&self.path).await {
			Ok(()) => {
				debug!(path = ?self.path, "Client state removed");
				Ok(())
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}

/// In-memory store for tests and demo runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
	state: tokio::sync::RwLock<PersistedState>,
}

impl MemoryTokenStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store pre-seeded with a raw token, as if persisted by an earlier run.
	pub fn with_token(token: impl Into<String>) -> Self {
		let mut state = PersistedState::new();
		state.insert(SESSION_KEY.to_string(), token.into());
		Self {
			state: tokio::sync::RwLock::new(state),
		}
	}

	/// Seed an unrelated key, to observe that [`TokenStore::clear`] drops it.
	pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
		self.state.write().await.insert(key.into(), value.into());
	}

	pub async fn len(&self) -> usize {
		self.state.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.state.read().await.is_empty()
	}
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
	async fn load(&self) -> Result<Option<SecretString>, StorageError> {
		let state = self.state.read().await;
		Ok(state.get(SESSION_KEY).cloned().map(SecretString::new))
	}

	async fn save(&self, token: &SecretString) -> Result<(), StorageError> {
		let mut state = self.state.write().await;
		state.insert(SESSION_KEY.to_string(), token.expose().clone());
		Ok(())
	}

	async fn clear(&self) -> Result<(), StorageError> {
		self.state.write().await.clear();
		Ok(())
	}
}
