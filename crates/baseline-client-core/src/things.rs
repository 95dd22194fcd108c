// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Remote collection records and the client-side filter.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of a successful `GET /v1/things`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThingsPage {
	#[serde(default, deserialize_with = "null_as_default")]
	pub things: Vec<ThingRecord>,
}

/// One entry of the remote collection. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingRecord {
	pub name: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub attributes: BTreeMap<String, Value>,
	#[serde(
		rename = "createdAt",
		default,
		deserialize_with = "lenient_timestamp",
		skip_serializing_if = "Option::is_none"
	)]
	pub created_at: Option<DateTime<Utc>>,
}

impl ThingRecord {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: BTreeMap::new(),
			created_at: None,
		}
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	/// The `name` attribute when it is a string.
	pub fn display_attribute(&self) -> Option<&str> {
		self.attributes.get("name").and_then(Value::as_str)
	}

	/// Name to show: the `name` attribute, falling back to the key.
	pub fn display_name(&self) -> &str {
		self.display_attribute().unwrap_or(&self.name)
	}

	/// Creation time from the record, or from a `createdAt` attribute.
	pub fn created(&self) -> Option<DateTime<Utc>> {
		self.created_at.or_else(|| {
			self.attributes
				.get("createdAt")
				.and_then(Value::as_str)
				.and_then(parse_timestamp)
		})
	}

	/// Whether the display name or the key contains `needle`.
	///
	/// `needle` must already be lowercase.
	fn matches_lowercase(&self, needle: &str) -> bool {
		self.display_attribute()
			.is_some_and(|display| display.to_lowercase().contains(needle))
			|| self.name.to_lowercase().contains(needle)
	}
}

/// Apply the case-insensitive substring filter. An absent or empty filter
/// keeps every record. Order is preserved.
pub fn filter_things(things: Vec<ThingRecord>, filter: Option<&str>) -> Vec<ThingRecord> {
	let needle = match filter {
		Some(f) if !f.is_empty() => f.to_lowercase(),
		_ => return things,
	};

	things
		.into_iter()
		.filter(|thing| thing.matches_lowercase(&needle))
		.collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339, then a naive datetime taken as UTC, then a bare date at midnight
/// UTC. Anything else is `None`.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
		return Some(dt.with_timezone(&Utc));
	}
	if let Ok(naive) = raw.parse::<NaiveDateTime>() {
		return Some(naive.and_utc());
	}
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|naive| naive.and_utc())
}

/// A timestamp that cannot be read drops the time, never the record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<Value>::deserialize(deserializer)?;
	Ok(value.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}
