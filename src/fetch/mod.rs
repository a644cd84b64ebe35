mod basic;

pub use basic::BasicClient;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Request, Response};

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Issues a GET and returns the raw response for the caller to inspect.
pub async fn get<C: HttpClient>(
    client: &C,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Response> {
    let mut req = Request::new(Method::GET, url.parse()?);
    *req.timeout_mut() = timeout;

    Ok(client.execute(req).await?)
}

/// POSTs a JSON body and returns the response bytes.
///
/// # Errors
///
/// Fails on transport errors, on timeout, and on any non-success status
/// (the status and response body are included in the error).
pub async fn post_json<C: HttpClient>(
    client: &C,
    url: &str,
    body: &serde_json::Value,
    timeout: Option<Duration>,
) -> Result<bytes::Bytes> {
    let mut req = Request::new(Method::POST, url.parse()?);
    req.headers_mut()
        .insert(CONTENT_TYPE, "application/json".parse()?);
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());
    *req.timeout_mut() = timeout;

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("upstream returned status {status}: {body}");
    }

    Ok(resp.bytes().await?)
}
