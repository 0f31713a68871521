mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn valid_credentials_issue_token() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/token/create"))
        .json(&json!({ "username": common::USERNAME, "password": common::PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert!(data["accessToken"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert!(data["expiry"].is_string());
    assert_eq!(data["response"]["userId"], 1);
    assert_eq!(data["response"]["username"], common::USERNAME);
    assert_eq!(data["response"]["fullName"], "Administrator");
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_refused_with_200() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/token/create"))
        .json(&json!({ "username": common::USERNAME, "password": "nope" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["data"]["responseMessage"],
        "Please enter Valid Username and Password."
    );
    assert!(body["data"].get("accessToken").is_none());
    Ok(())
}

#[tokio::test]
async fn invalid_body_is_bad_request() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    for payload in [json!({ "username": "admin" }), json!({ "username": "", "password": "x" })] {
        let res = server.client.post(server.url("/api/token/create")).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await?;
        assert_eq!(body["message"], "Token failed to generate");
    }

    let res = server
        .client
        .post(server.url("/api/token/create"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn bad_bearer_token_is_unauthorized() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server
        .client
        .get(server.url("/api/employees"))
        .bearer_auth("not-a-token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server.client.get(server.url("/api/employees")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
