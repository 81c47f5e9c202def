//! Cloud Conformity SDK
//!
//! A Rust library for the Cloud Conformity security and compliance REST API.
//!
//! This SDK provides:
//! - Typed async methods for accounts, template scanning, users,
//!   communication settings, profiles and checks
//! - JSON:API request document builders, including the profile/rule-settings
//!   document with `included` rule resources
//! - An explicit error taxonomy separating remote rejections, missing
//!   responses and request setup failures
//! - A pluggable [`Transport`] so requests can be recorded or redirected
//!
//! # Example
//!
//! ```no_run
//! use conformity_sdk::{ClientConfig, ConformityClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Region and API key from CLOUD_CONFORMITY_REGION / CLOUD_CONFORMITY_API_KEY
//! let config = ClientConfig::from_env()?;
//! let client = ConformityClient::from_config(&config);
//!
//! // Scan a CloudFormation template and report failing checks
//! let template = std::fs::read_to_string("stack.yaml")?;
//! let report = client.scan_template_partitioned(template, None, None, None).await?;
//! for finding in &report.failure {
//!     println!("{}", finding["attributes"]["rule-title"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conformity_api;

// Re-export commonly used types and functions
pub use config::{region_base_url, ClientConfig};
pub use conformity_api::{
    client::ConformityClient,
    resources::{
        AccessListEntry, Profile, RuleSetting, TemplateScanReport, MODE_FILL_GAPS,
        MODE_OVERWRITE, MODE_REPLACE,
    },
    transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport, TransportError},
    types::{ApiError, ConformityError},
};
