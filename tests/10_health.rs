mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn root_describes_service() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let res = server.client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["data"]["name"], "EMS API");
    Ok(())
}

#[tokio::test]
async fn health_is_ok_on_memory_store() -> Result<()> {
    let server = common::TestServer::spawn().await?;

    let body: Value = server.client.get(server.url("/health")).send().await?.json().await?;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "memory");
    Ok(())
}
