//! Coarse IP → (country, network) lookup via ip-api.com.
//!
//! Best-effort only: timeouts, network failures and "fail" statuses (private
//! ranges, localhost) all come back as empty metadata, never as an error —
//! a view is still worth recording when the lookup is down.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "http://ip-api.com";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub network: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    isp: Option<String>,
}

#[derive(Clone)]
pub struct GeoLookup {
    client: Client,
    base_url: String,
}

impl GeoLookup {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    /// Lookup against a non-default endpoint. Used by tests.
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(LOOKUP_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn lookup(&self, ip: &str) -> GeoInfo {
        let url = format!("{}/json/{ip}?fields=status,country,isp", self.base_url);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("Could not fetch location info for IP {ip}: {e}");
                return GeoInfo::default();
            }
        };
        match response.json::<IpApiResponse>().await {
            Ok(body) if body.status == "success" => GeoInfo {
                country: body.country,
                network: body.isp,
            },
            Ok(body) => {
                debug!("Location lookup for IP {ip} returned status '{}'", body.status);
                GeoInfo::default()
            }
            Err(e) => {
                debug!("Could not parse location info for IP {ip}: {e}");
                GeoInfo::default()
            }
        }
    }
}

impl Default for GeoLookup {
    fn default() -> Self {
        Self::new()
    }
}
