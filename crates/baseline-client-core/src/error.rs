// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Failure types.
//!
//! Remote calls fail with an [`ApiError`]. Components never hand those to the
//! presentation layer directly; they convert them into [`ErrorDetails`], the
//! one shape every user-visible failure takes.

use serde::Serialize;
use thiserror::Error;

/// Label shown on the acknowledgment control when none is given.
pub const DEFAULT_CLOSE_LABEL: &str = "Close";

const LOGIN_TITLE: &str = "Unable To Login!";
const LOAD_TITLE: &str = "Unable To Load Data!";
const SERVER_ERROR_BODY: &str = "Unexpected server error.";
const UNKNOWN_ERROR_BODY: &str = "Unexpected error.";

/// Errors returned by a remote API implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
	/// No response was received.
	#[error("request failed: {0}")]
	Transport(String),

	/// The API answered with a non-success status.
	#[error("server returned status {status}: {message}")]
	Status { status: u16, message: String },

	/// The response arrived but its body could not be read or parsed.
	#[error("invalid response body: {0}")]
	InvalidBody(String),
}

impl ApiError {
	pub fn status(status: u16) -> Self {
		Self::Status {
			status,
			message: String::new(),
		}
	}

	/// HTTP status carried by the error, if a response was received.
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Transport(_) => ErrorKind::Transport,
			Self::Status { status, .. } => ErrorKind::from_status(*status),
			Self::InvalidBody(_) => ErrorKind::Unknown,
		}
	}
}

/// Classification of every failure the client can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
	/// Rejected before reaching the network (empty credential).
	LocalValidation,
	/// No response received.
	Transport,
	/// 401 or 403.
	Authorization,
	/// 500.
	Server,
	/// Token failed to decode or was already expired on receipt.
	MalformedSession,
	/// Any other status or an unreadable body.
	Unknown,
}

impl ErrorKind {
	pub fn from_status(status: u16) -> Self {
		match status {
			401 | 403 => Self::Authorization,
			500 => Self::Server,
			_ => Self::Unknown,
		}
	}
}

/// The uniform failure payload handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetails {
	pub kind: ErrorKind,
	pub title: String,
	pub body: String,
	/// Acknowledging this error ends the session.
	pub forces_logout: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub close_label: Option<String>,
}

impl ErrorDetails {
	pub fn new(kind: ErrorKind, title: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			kind,
			title: title.into(),
			body: body.into(),
			forces_logout: false,
			close_label: None,
		}
	}

	pub fn forcing_logout(mut self) -> Self {
		self.forces_logout = true;
		self
	}

	pub fn with_close_label(mut self, label: impl Into<String>) -> Self {
		self.close_label = Some(label.into());
		self
	}

	pub fn close_label(&self) -> &str {
		self.close_label.as_deref().unwrap_or(DEFAULT_CLOSE_LABEL)
	}

	/// Login attempted with an empty password.
	pub fn empty_credential() -> Self {
		Self::new(
			ErrorKind::LocalValidation,
			LOGIN_TITLE,
			"Please enter a password.",
		)
	}

	/// The authenticate call failed.
	pub fn login_failure(error: &ApiError) -> Self {
		let body = match error.status_code() {
			Some(401) => "Invalid password. Please try again.",
			Some(500) => SERVER_ERROR_BODY,
			_ => UNKNOWN_ERROR_BODY,
		};
		Self::new(error.kind(), LOGIN_TITLE, body)
	}

	/// The authenticate call succeeded but the token is unusable.
	pub fn invalid_session() -> Self {
		Self::new(
			ErrorKind::MalformedSession,
			LOGIN_TITLE,
			"Invalid session. Please login again.",
		)
	}

	/// The things call failed. 401 and 403 end the session once acknowledged.
	pub fn load_failure(error: &ApiError) -> Self {
		match error.status_code() {
			Some(401 | 403) => Self::session_expired(),
			Some(500) => Self::new(ErrorKind::Server, LOAD_TITLE, SERVER_ERROR_BODY),
			_ => Self::new(error.kind(), LOAD_TITLE, UNKNOWN_ERROR_BODY),
		}
	}

	/// Data was requested without a usable session.
	pub fn session_expired() -> Self {
		Self::new(
			ErrorKind::Authorization,
			LOAD_TITLE,
			"Your session has expired. Please login again.",
		)
		.forcing_logout()
	}
}
