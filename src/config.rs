//! Client configuration
//!
//! Region and API key can be supplied directly or read from the environment:
//!
//! - `CLOUD_CONFORMITY_REGION` - deployment region, e.g. `us-west-2`
//! - `CLOUD_CONFORMITY_API_KEY` - API key sent as `Authorization: ApiKey <key>`
//! - `CLOUD_CONFORMITY_BASE_URL` - optional full base URL overriding the region host

use crate::conformity_api::types::ConformityError;
use std::fmt;

pub const REGION_ENV: &str = "CLOUD_CONFORMITY_REGION";
pub const API_KEY_ENV: &str = "CLOUD_CONFORMITY_API_KEY";
pub const BASE_URL_ENV: &str = "CLOUD_CONFORMITY_BASE_URL";

/// Platform domain the regional API hosts live under
pub const API_DOMAIN: &str = "cloudconformity.com";

/// Derive the regional API base URL, e.g. `https://us-west-2-api.cloudconformity.com/v1/`
pub fn region_base_url(region: &str) -> String {
    format!("https://{}-api.{}/v1/", region, API_DOMAIN)
}

/// Settings needed to build a [`ConformityClient`](crate::ConformityClient)
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub region: String,
    pub api_key: String,
    /// Overrides the URL derived from `region` when set
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(region: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConformityError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConformityError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let region = read(REGION_ENV)
            .ok_or_else(|| ConformityError::Config(format!("{} is not set", REGION_ENV)))?;
        let api_key = read(API_KEY_ENV)
            .ok_or_else(|| ConformityError::Config(format!("{} is not set", API_KEY_ENV)))?;
        let base_url = read(BASE_URL_ENV);

        if let Some(url) = &base_url {
            tracing::debug!("Using API base URL override: {}", url);
        }

        Ok(Self {
            region,
            api_key,
            base_url,
        })
    }

    /// Base URL the client will target
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| region_base_url(&self.region))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
