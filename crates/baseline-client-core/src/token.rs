// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session token decoding.
//!
//! A raw token is three dot-separated segments; the middle one is URL-safe
//! base64 JSON carrying an `exp` claim in seconds since the Unix epoch.
//! Signatures are never checked here. The API re-validates the token on every
//! request, so the client only needs well-formedness and expiry.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use baseline_common_secret::SecretString;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::trace;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Client-held view of an authenticated session.
///
/// Only [`decode_token`] produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	raw_token: SecretString,
	expires_at: DateTime<Utc>,
}

impl Session {
	/// The token exactly as the API issued it.
	pub fn raw_token(&self) -> &SecretString {
		&self.raw_token
	}

	pub fn expires_at(&self) -> DateTime<Utc> {
		self.expires_at
	}

	/// True while the current instant is before the expiry claim.
	pub fn is_valid(&self) -> bool {
		self.is_valid_at(Utc::now())
	}

	pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
		now < self.expires_at
	}
}

/// Decode a raw token into a [`Session`].
///
/// Returns `None` for anything malformed: a segment count other than three,
/// a payload that is not URL-safe base64, not UTF-8 JSON, not an object, or
/// an object without a numeric `exp`.
pub fn decode_token(raw: &str) -> Option<Session> {
	let claims = decode_claims(raw)?;
	let expires_at = claims.get("exp").and_then(expiry_from_claim)?;

	Some(Session {
		raw_token: SecretString::new(raw.to_string()),
		expires_at,
	})
}

fn decode_claims(raw: &str) -> Option<Map<String, Value>> {
	let segments: Vec<&str> = raw.split('.').collect();
	if segments.len() != 3 {
		trace!(segments = segments.len(), "token rejected: wrong segment count");
		return None;
	}

	let bytes = match PAYLOAD_ENGINE.decode(segments[1]) {
		Ok(bytes) => bytes,
		Err(e) => {
			trace!(error = %e, "token rejected: payload is not base64url");
			return None;
		}
	};

	match serde_json::from_slice::<Value>(&bytes) {
		Ok(Value::Object(claims)) => Some(claims),
		Ok(_) => {
			trace!("token rejected: payload is not a JSON object");
			None
		}
		Err(e) => {
			trace!(error = %e, "token rejected: payload is not JSON");
			None
		}
	}
}

fn expiry_from_claim(exp: &Value) -> Option<DateTime<Utc>> {
	if let Some(secs) = exp.as_i64() {
		return DateTime::from_timestamp(secs, 0);
	}

	let secs = exp.as_f64().filter(|s| s.is_finite())?;
	let millis = (secs * 1000.0).round();
	if millis.abs() > i64::MAX as f64 {
		return None;
	}
	DateTime::from_timestamp_millis(millis as i64)
}

/// Build an unsigned (`alg: none`) token around the given claims.
///
/// Used by the demo API, which has no signing key, and by tests.
pub fn encode_unsigned_token(claims: &Value) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
	let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
	format!("{header}.{payload}.")
}
