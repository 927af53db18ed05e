#![allow(dead_code)]

use std::collections::HashMap;

use barangay_portal::{config::Config, server::Server, setup::setup};
use reqwest::{Client, Response};
use serde_json::{Value, json};

pub const ADMIN_EMAIL: &str = "admin@barangay.gov.ph";
pub const ADMIN_PASSWORD: &str = "admin123";

// Helper function to spawn a seeded test server on a random port
pub async fn spawn_server() -> String {
    let overrides = HashMap::from([
        ("server.host".to_owned(), "127.0.0.1".to_owned()),
        // Use a random OS port
        ("server.port".to_owned(), "0".to_owned()),
        ("auth.jwt_secret".to_owned(), "integration-secret".to_owned()),
        ("auth.password_iterations".to_owned(), "1".to_owned()),
        ("seed.enabled".to_owned(), "true".to_owned()),
    ]);
    let config = Config::load_with_sources(Some(overrides)).unwrap();

    let state = setup(&config).await.unwrap();
    let server = Server::new(state, &config.server).await.unwrap();

    let port = server.port().unwrap();
    tokio::spawn(async move {
        server.run().await.expect("failed to run server");
    });

    format!("http://{}:{}", config.server.host, port)
}

pub fn client() -> Client {
    Client::new()
}

/// Reads the JSON envelope of a response together with its status.
pub async fn body(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.unwrap();
    (status, body)
}

pub async fn login(addr: &str, email: &str, password: &str) -> String {
    let response = client()
        .post(format!("{addr}/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    let (status, body) = body(response).await;
    assert_eq!(status, 200, "login failed: {body}");
    body["token"].as_str().unwrap().to_owned()
}

pub async fn admin_token(addr: &str) -> String {
    login(addr, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

/// Registers a resident and returns the user id with a fresh token.
pub async fn register_resident(addr: &str, email: &str) -> (u64, String) {
    let response = client()
        .post(format!("{addr}/api/auth/register"))
        .json(&json!({
            "firstName": "Juan",
            "lastName": "Dela Cruz",
            "email": email,
            "password": "secret123",
        }))
        .send()
        .await
        .unwrap();
    let (status, body) = body(response).await;
    assert_eq!(status, 201, "registration failed: {body}");
    let id = body["user"]["id"].as_u64().unwrap();
    (id, login(addr, email, "secret123").await)
}
