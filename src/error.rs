use thiserror::Error;

/// Failures surfaced at the request boundary. The extraction core never fails.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("URL is required")]
    MissingUrl,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Failed to scrape website: {0:#}")]
    Harvest(anyhow::Error),
}

impl ScrapeError {
    /// Short label for the `error` field of a JSON error body.
    pub fn label(&self) -> &'static str {
        match self {
            ScrapeError::MissingUrl => "URL is required",
            ScrapeError::InvalidUrl(_) => "Invalid URL",
            ScrapeError::MalformedBody(_) => "Invalid request body",
            ScrapeError::Harvest(_) => "Scraping failed",
        }
    }

    /// User-facing explanation for the `message` field.
    pub fn user_message(&self) -> String {
        match self {
            ScrapeError::MissingUrl => "Please provide a valid URL to scrape".to_string(),
            ScrapeError::InvalidUrl(_) => {
                "Please provide a valid URL (including https://)".to_string()
            }
            ScrapeError::MalformedBody(_) => "Request body must be a JSON object".to_string(),
            ScrapeError::Harvest(_) => self.to_string(),
        }
    }
}

/// Reject blank or unparsable URLs before anything is fetched.
pub fn validate_url(raw: Option<&str>) -> Result<url::Url, ScrapeError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(ScrapeError::MissingUrl)?;
    url::Url::parse(raw).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))
}
