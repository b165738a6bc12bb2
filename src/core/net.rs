use reqwest::Response;

use crate::core::AlertError;

/// Read a successful response body as text.
///
/// Non-2xx statuses become [`AlertError::Status`] carrying the final URL.
pub(crate) async fn get_text(resp: Response, endpoint: &str) -> Result<String, AlertError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(AlertError::Status {
            status: status.as_u16(),
            url: resp.url().to_string(),
        });
    }

    let text = resp.text().await?;
    tracing::trace!(endpoint, bytes = text.len(), "response body read");
    Ok(text)
}
