// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Terminal rendering of views and errors.

use std::fmt::Write;

use baseline_client::{NavAction, View};
use baseline_client_core::{ErrorDetails, ThingRecord};
use chrono::{DateTime, Local, Utc};
use serde_json::Value;

pub const BRAND: &str = "Baseline Manager";

const WELCOME_DEMO_NOTICE: &str =
	"You are using Demo Mode. Proceed to the login page and use any password to continue.";
const LOGIN_DEMO_NOTICE: &str = "You are using Demo Mode. Any password below will be accepted.";
const DASHBOARD_DEMO_NOTICE: &str = "You are using Demo Mode. The data displayed below is read from bundled files. You can logout to reset the session.";
const NO_THINGS: &str = "No Things Found";

pub fn nav_bar(action: Option<NavAction>) -> String {
	match action {
		Some(NavAction::Login) => format!("{BRAND}  [Login: baseline login]"),
		Some(NavAction::Logout) => format!("{BRAND}  [Logout: baseline logout]"),
		None => BRAND.to_string(),
	}
}

pub fn welcome(demo: bool) -> String {
	let mut out = String::new();
	if demo {
		let _ = writeln!(out, "{WELCOME_DEMO_NOTICE}\n");
	}
	out.push_str("AWS IoT Baseline\nAn implementation starter kit.\n");
	out
}

pub fn login_prompt(demo: bool) -> String {
	let mut out = String::new();
	if demo {
		let _ = writeln!(out, "{LOGIN_DEMO_NOTICE}");
	}
	out.push_str("Password: ");
	out
}

pub fn not_found() -> String {
	"Sorry, page not found!\n".to_string()
}

/// Summary for views that need no data.
pub fn view_hint(view: View) -> String {
	match view {
		View::Login => "Run `baseline login` to sign in.\n".to_string(),
		View::Dashboard => "Run `baseline things` to list things.\n".to_string(),
		View::Welcome => welcome(false),
		View::NotFound => not_found(),
	}
}

pub fn dashboard(things: &[ThingRecord], filter: Option<&str>, demo: bool) -> String {
	let mut out = String::new();
	if demo {
		let _ = writeln!(out, "{DASHBOARD_DEMO_NOTICE}\n");
	}

	let _ = writeln!(out, "Search: {}", filter.filter(|f| !f.is_empty()).unwrap_or("All Things"));

	if things.is_empty() {
		let _ = writeln!(out, "{NO_THINGS}");
		return out;
	}

	for thing in things {
		out.push('\n');
		out.push_str(&thing_entry(thing));
	}
	out
}

fn thing_entry(thing: &ThingRecord) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "{}", thing.display_name());
	if let Some(created) = thing.created() {
		let _ = writeln!(out, "  Created: {}", local_time(created));
	}

	if thing.attributes.is_empty() {
		return out;
	}

	let width = thing
		.attributes
		.keys()
		.map(|k| k.chars().count())
		.max()
		.unwrap_or(0)
		.max("Attribute".len());
	let _ = writeln!(out, "  {:<width$}  Value", "Attribute");
	for (key, value) in &thing.attributes {
		let _ = writeln!(out, "  {key:<width$}  {}", attribute_value(value));
	}
	out
}

fn attribute_value(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		Value::Null => String::new(),
		other => other.to_string(),
	}
}

fn local_time(at: DateTime<Utc>) -> String {
	at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn error(details: &ErrorDetails) -> String {
	format!(
		"{}\n{}\n[{}]\n",
		details.title,
		details.body,
		details.close_label()
	)
}
