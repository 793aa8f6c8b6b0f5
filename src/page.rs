use anyhow::{Context, Result, anyhow};
use url::Url;

/// The page an orchestration context is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    url: Url,
    host: String,
}

impl PageContext {
    /// Parse a page URL; it must have a host
    pub fn parse(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("Invalid page URL: {}", url))?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        let hostname = url
            .host_str()
            .ok_or_else(|| anyhow!("Page URL has no host: {}", url))?
            .to_lowercase();

        // Site preferences are keyed like `location.host`: the port is part of the key
        let host = match url.port() {
            Some(port) => format!("{}:{}", hostname, port),
            None => hostname,
        };

        Ok(Self { url, host })
    }

    /// Key used for site preferences
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
