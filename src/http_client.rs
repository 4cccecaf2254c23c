use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;

pub async fn fetch_text(http: &Client, url: &str) -> Result<String> {
    let response = http
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?;

    if !response.status().is_success() {
        bail!("Request failed ({}) for {url}", response.status());
    }

    response
        .text()
        .await
        .with_context(|| format!("Failed to read text body for {url}"))
}

pub async fn post_json<T: Serialize + ?Sized>(
    http: &Client,
    url: &str,
    body: &T,
    api_key: Option<&str>,
) -> Result<()> {
    let mut request = http.post(url).json(body);
    if let Some(api_key) = api_key {
        request = request.header("x-api-key", api_key);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Request failed for {url}"))?;

    if !response.status().is_success() {
        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        bail!("Request failed ({status}) for {url}: {}", detail.trim());
    }
    Ok(())
}
