// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable client state for the Baseline client.
//!
//! The client persists exactly one value, the raw session token, under the
//! [`SESSION_KEY`] slot. Clearing wipes every persisted value, not just the
//! token, the way a browser client clears its local storage on logout.
//!
//! - [`TokenStore`]: storage backend trait
//! - [`FileTokenStore`]: JSON state file with owner-only permissions
//! - [`MemoryTokenStore`]: in-memory store for tests and demo runs

mod error;
mod store;

pub use error::StorageError;
pub use store::{FileTokenStore, MemoryTokenStore, PersistedState, TokenStore, SESSION_KEY};
