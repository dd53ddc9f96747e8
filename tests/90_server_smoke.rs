mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn shared_secret_scenario() -> Result<()> {
    let server = common::start_server().await?;
    let client = reqwest::Client::new();
    let url = format!("{}/api/holdings", server.base_url);

    let res = client.get(&url).header("x-shared-secret", common::SHARED_SECRET).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(&url).header("x-shared-secret", "wrong").send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["error"].is_string(), "missing error string: {}", body);

    Ok(())
}
