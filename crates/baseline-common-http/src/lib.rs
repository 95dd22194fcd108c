// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client for the Baseline client crates.
//!
//! Every request leaves with the same User-Agent. No request timeout is set:
//! remote calls run until the transport gives up on its own.

mod client;

pub use client::{builder, user_agent};
