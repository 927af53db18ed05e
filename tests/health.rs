mod common;

use reqwest::Client;

#[tokio::test]
async fn test_health_check_works() {
    let addr = common::spawn_server().await;

    let response = Client::new()
        .get(format!("{addr}/health"))
        .send()
        .await
        .unwrap();

    // Verify the response
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "healthy");
}

#[tokio::test]
async fn test_api_test_endpoint() {
    let addr = common::spawn_server().await;

    let response = Client::new()
        .get(format!("{addr}/api/test"))
        .send()
        .await
        .unwrap();
    let (status, body) = common::body(response).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is working!");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let addr = common::spawn_server().await;

    let response = Client::new()
        .get(format!("{addr}/api/nowhere"))
        .send()
        .await
        .unwrap();
    let (status, body) = common::body(response).await;

    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_cors_preflight_for_frontend_origin() {
    let addr = common::spawn_server().await;

    let response = Client::new()
        .request(reqwest::Method::OPTIONS, format!("{addr}/api/test"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
}
