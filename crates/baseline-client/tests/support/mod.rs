// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#![allow(dead_code)]

use baseline_client_core::{encode_unsigned_token, ThingRecord, ThingsPage};
use chrono::{Duration, Utc};
use serde_json::json;

/// Unsigned token expiring `delta` from now.
pub fn token_expiring_in(delta: Duration) -> String {
	encode_unsigned_token(&json!({
		"sub": "baseline",
		"scope": "web",
		"exp": (Utc::now() + delta).timestamp(),
	}))
}

pub fn fresh_token() -> String {
	token_expiring_in(Duration::days(7))
}

pub fn sample_page() -> ThingsPage {
	ThingsPage {
		things: vec![
			ThingRecord::new("device-001").with_attribute("name", "Kitchen Sensor"),
			ThingRecord::new("device-002").with_attribute("name", "Garage Door"),
			ThingRecord::new("ABC-gateway"),
		],
	}
}

pub fn names(things: &[ThingRecord]) -> Vec<&str> {
	things.iter().map(|t| t.name.as_str()).collect()
}
