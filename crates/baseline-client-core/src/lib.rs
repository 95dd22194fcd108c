// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types shared by the Baseline client.
//!
//! - [`token`]: decodes raw session tokens into [`Session`] values
//! - [`error`]: the uniform [`ErrorDetails`] payload and the [`ApiError`]s
//!   it is built from
//! - [`things`]: remote collection records and the client-side filter

pub mod error;
pub mod things;
pub mod token;

pub use error::{ApiError, ErrorDetails, ErrorKind, DEFAULT_CLOSE_LABEL};
pub use things::{filter_things, ThingRecord, ThingsPage};
pub use token::{decode_token, encode_unsigned_token, Session};
