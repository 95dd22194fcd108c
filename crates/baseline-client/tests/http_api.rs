// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

mod support;

use baseline_client::{HttpApi, RemoteApi};
use baseline_client_core::ApiError;
use baseline_common_secret::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn authenticate_sends_base64_credential_without_caching() {
	let server = MockServer::start().await;
	let token = support::fresh_token();

	Mock::given(method("GET"))
		.and(path("/v1/authenticate"))
		.and(header("Authorization", "aHVudGVyMg=="))
		.and(header("Cache-Control", "no-store"))
		.respond_with(ResponseTemplate::new(200).set_body_string(format!("{token}\n")))
		.expect(1)
		.mount(&server)
		.await;

	let api = HttpApi::new(format!("{}/", server.uri())).unwrap();
	let raw = api
		.authenticate(&SecretString::from("hunter2"))
		.await
		.unwrap();

	assert_eq!(raw, token);
}

#[tokio::test]
async fn authenticate_reports_status() {
	let server = MockServer::start().await;

	for status in [401u16, 500, 418] {
		server.reset().await;
		Mock::given(method("GET"))
			.and(path("/v1/authenticate"))
			.respond_with(ResponseTemplate::new(status).set_body_string("nope"))
			.mount(&server)
			.await;

		let api = HttpApi::new(server.uri()).unwrap();
		let err = api
			.authenticate(&SecretString::from("pw"))
			.await
			.unwrap_err();
		assert_eq!(
			err,
			ApiError::Status {
				status,
				message: "nope".to_string()
			}
		);
	}
}

#[tokio::test]
async fn list_things_sends_raw_token() {
	let server = MockServer::start().await;
	let token = support::fresh_token();

	Mock::given(method("GET"))
		.and(path("/v1/things"))
		.and(header("Authorization", token.as_str()))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"things": [
				{ "name": "a", "attributes": { "name": "Alpha" }, "createdAt": "2021-01-01T00:00:00Z" },
				{ "name": "b", "attributes": null }
			]
		})))
		.expect(1)
		.mount(&server)
		.await;

	let api = HttpApi::new(server.uri()).unwrap();
	let page = api.list_things(&SecretString::new(token)).await.unwrap();

	assert_eq!(support::names(&page.things), vec!["a", "b"]);
	assert_eq!(page.things[0].display_name(), "Alpha");
	assert!(page.things[0].created_at.is_some());
}

#[tokio::test]
async fn list_things_missing_collection_is_empty() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/things"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
		.mount(&server)
		.await;

	let api = HttpApi::new(server.uri()).unwrap();
	let page = api.list_things(&SecretString::from("t")).await.unwrap();
	assert!(page.things.is_empty());
}

#[tokio::test]
async fn list_things_undecodable_body_is_invalid() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/v1/things"))
		.respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
		.mount(&server)
		.await;

	let api = HttpApi::new(server.uri()).unwrap();
	let err = api
		.list_things(&SecretString::from("t"))
		.await
		.unwrap_err();
	assert!(matches!(err, ApiError::InvalidBody(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
	let api = HttpApi::new("http://127.0.0.1:1").unwrap();
	let err = api
		.authenticate(&SecretString::from("pw"))
		.await
		.unwrap_err();
	assert!(matches!(err, ApiError::Transport(_)));
}
