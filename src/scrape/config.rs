use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for product page scraping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Hosts product URLs may come from; a URL matches when its host
    /// contains one of these. Empty allows any host.
    pub allowed_domains: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            allowed_domains: vec!["d8austin.com".to_string()],
        }
    }
}

impl ScraperConfig {
    /// Accept product URLs from any host
    pub fn any_domain() -> Self {
        Self {
            allowed_domains: Vec::new(),
        }
    }

    pub fn allows(&self, url: &Url) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        self.allowed_domains
            .iter()
            .any(|domain| host.contains(domain.as_str()))
    }
}
