use reqwest::Client;

use crate::Failure;

/// Requests a page and returns its HTML.
/// Any non-2xx status is a failure carrying the status line.
pub(crate) async fn request_page_html(client: &Client, url: &str) -> Result<String, Failure> {
    let req = client
        .get(url)
        .build()
        .map_err(|e| Failure::Request(e.to_string()))?;

    let res = client
        .execute(req)
        .await
        .map_err(|e| Failure::Transport(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        return Err(Failure::Status(status.to_string()));
    }

    // Timeouts while streaming the body still count as transport errors.
    res.text().await.map_err(|e| {
        if e.is_timeout() {
            Failure::Transport(e.to_string())
        } else {
            Failure::Document(e.to_string())
        }
    })
}
