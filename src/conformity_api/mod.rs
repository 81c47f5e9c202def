//! Cloud Conformity API integration module
//!
//! ## Request Flow
//!
//! 1. A typed client method shapes its inputs into a JSON:API request document
//! 2. The client wraps it in an [`ApiRequest`] carrying the `ApiKey` authorization
//! 3. The [`Transport`] performs the call (reqwest by default)
//! 4. Non-2xx answers, missing answers and setup failures become [`ApiError`]s
//! 5. The method unwraps the response document to the value it promises
pub mod client;
pub mod documents;
pub mod resources;
pub mod transport;
pub mod types;

pub use client::ConformityClient;
pub use resources::*;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport, TransportError};
pub use types::{ApiError, ConformityError};
