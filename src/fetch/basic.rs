use super::HttpClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

/// Plain [`HttpClient`] over a shared connection pool.
///
/// Carries the browser request profile the EMMA portal expects on every
/// request; the backend rejects requests without a matching Origin/Referer.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .default_headers(emma_headers())
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self(client)
    }
}

impl Default for BasicClient {
    fn default() -> Self {
        Self::new()
    }
}

fn emma_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    let entries = [
        ("Accept", "*/*"),
        ("Accept-Language", "en-US,en;q=0.6"),
        ("Connection", "keep-alive"),
        ("Origin", "https://emma.mav.hu"),
        ("Referer", "https://emma.mav.hu/"),
        ("Sec-Fetch-Dest", "empty"),
        ("Sec-Fetch-Mode", "cors"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-GPC", "1"),
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
        ),
        (
            "sec-ch-ua",
            "\"Not)A;Brand\";v=\"8\", \"Chromium\";v=\"138\", \"Brave\";v=\"138\"",
        ),
        ("sec-ch-ua-mobile", "?0"),
        ("sec-ch-ua-platform", "\"Windows\""),
    ];
    for (name, value) in entries {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }
    headers
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
