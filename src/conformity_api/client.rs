use crate::config::{region_base_url, ClientConfig};
use crate::conformity_api::documents;
use crate::conformity_api::resources::{AccessListEntry, Profile, TemplateScanReport};
use crate::conformity_api::transport::{ApiRequest, HttpMethod, ReqwestTransport, Transport};
use crate::conformity_api::types::{ApiError, ConformityError};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// HTTP client for the Cloud Conformity API
///
/// Every method maps onto exactly one API call (two for the composed helpers
/// [`scan_template_partitioned`](Self::scan_template_partitioned) and
/// [`get_current_user_email`](Self::get_current_user_email), which post-process
/// a single call locally). The client holds no mutable state and is cheap to
/// clone.
#[derive(Clone)]
pub struct ConformityClient {
    /// Base URL all paths are resolved against, e.g. `https://us-west-2-api.cloudconformity.com/v1/`
    base_url: String,
    /// API key sent as `Authorization: ApiKey <key>`
    api_key: String,
    /// Transport used to perform requests
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ConformityClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformityClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ConformityClient {
    /// Create a client for a regional Cloud Conformity deployment
    ///
    /// # Arguments
    ///
    /// * `region` - Deployment region, e.g. `us-west-2`
    /// * `api_key` - Cloud Conformity API key
    ///
    /// Neither value is validated; a bad region or key surfaces as an error
    /// from the first call.
    ///
    /// # Example
    ///
    /// ```
    /// use conformity_sdk::ConformityClient;
    ///
    /// let client = ConformityClient::new("us-west-2", "my-api-key");
    /// assert_eq!(client.base_url(), "https://us-west-2-api.cloudconformity.com/v1/");
    /// ```
    pub fn new(region: impl Into<String>, api_key: impl Into<String>) -> Self {
        let region: String = region.into();
        Self::with_base_url(region_base_url(&region), api_key)
    }

    /// Create a client against an explicit base URL
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        tracing::debug!("Creating ConformityClient with base URL: {}", base_url);

        Self {
            base_url,
            api_key: api_key.into(),
            transport: Arc::new(ReqwestTransport::new()),
        }
    }

    /// Create a client from a [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_base_url(config.base_url(), config.api_key.clone())
    }

    /// Replace the transport used to perform requests
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Get the base URL for this client
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the outbound descriptor for a call, without sending it
    ///
    /// Carries the JSON:API content type and the API key authorization header.
    pub fn build_request(&self, method: HttpMethod, path: impl Into<String>) -> ApiRequest {
        ApiRequest::new(self.base_url.clone(), &self.api_key, method, path)
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Register a cloud account with Cloud Conformity
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the account
    /// * `environment` - Environment label, e.g. `production`
    /// * `role_arn` - ARN of the cross-account role Conformity assumes
    /// * `external_id` - Organisation external id the role trusts
    /// * `cost_package` - Enable the cost package
    /// * `has_real_time_monitoring` - Enable real-time monitoring
    ///
    /// # Returns
    ///
    /// The id of the created account.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use conformity_sdk::ConformityClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ConformityClient::new("us-west-2", "my-api-key");
    /// let external_id = client.get_organisation_external_id().await?;
    /// let account_id = client
    ///     .create_account(
    ///         "Production",
    ///         "prod",
    ///         "arn:aws:iam::123456789012:role/CloudConformity",
    ///         external_id,
    ///         false,
    ///         true,
    ///     )
    ///     .await?;
    /// println!("Created account {}", account_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_account(
        &self,
        name: impl Into<String>,
        environment: impl Into<String>,
        role_arn: impl Into<String>,
        external_id: impl Into<String>,
        cost_package: bool,
        has_real_time_monitoring: bool,
    ) -> Result<String, ConformityError> {
        let name = name.into();
        tracing::info!("Creating account: name={}", name);

        let document = documents::create_account_document(
            name,
            environment.into(),
            role_arn.into(),
            external_id.into(),
            cost_package,
            has_real_time_monitoring,
        );
        let response = self
            .send_document(HttpMethod::Post, "accounts", &document)
            .await?;

        let account_id = string_at(&response, "/data/id")?;
        tracing::info!("Account created: id={}", account_id);
        Ok(account_id)
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> Result<Vec<Value>, ConformityError> {
        let response = self.send(HttpMethod::Get, "accounts").await?;
        Ok(take_list(response)?)
    }

    /// Get details of an account
    pub async fn get_account(&self, account_id: &str) -> Result<Value, ConformityError> {
        let response = self
            .send(HttpMethod::Get, format!("accounts/{}", segment(account_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Get the access settings (role ARN, external id) of an account
    pub async fn get_account_access(&self, account_id: &str) -> Result<Value, ConformityError> {
        let response = self
            .send(HttpMethod::Get, format!("accounts/{}/access", segment(account_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Trigger a Conformity Bot scan of an account
    pub async fn scan_account(&self, account_id: &str) -> Result<Value, ConformityError> {
        tracing::info!("Requesting scan of account {}", account_id);
        let response = self
            .send(HttpMethod::Post, format!("accounts/{}/scan", segment(account_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Change the cost package and real-time monitoring subscription of an account
    pub async fn update_account_subscription(
        &self,
        account_id: &str,
        cost_package: bool,
        has_real_time_monitoring: bool,
    ) -> Result<Value, ConformityError> {
        let document = documents::subscription_document(cost_package, has_real_time_monitoring);
        let response = self
            .send_document(
                HttpMethod::Patch,
                format!("accounts/{}/subscription", segment(account_id)),
                &document,
            )
            .await?;
        Ok(take_data(response)?)
    }

    /// Update name, environment, code and tags of an account
    pub async fn update_account(
        &self,
        account_id: &str,
        name: impl Into<String>,
        environment: impl Into<String>,
        code: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Value, ConformityError> {
        let document =
            documents::update_account_document(name.into(), environment.into(), code.into(), tags);
        let response = self
            .send_document(
                HttpMethod::Patch,
                format!("accounts/{}", segment(account_id)),
                &document,
            )
            .await?;
        Ok(take_data(response)?)
    }

    /// Get an account's setting for one rule
    ///
    /// With `notes` set, the note history of the setting is requested as well
    /// (`?notes=true`).
    pub async fn get_rule_setting(
        &self,
        account_id: &str,
        rule_id: &str,
        notes: bool,
    ) -> Result<Value, ConformityError> {
        let mut request = self.build_request(
            HttpMethod::Get,
            format!(
                "accounts/{}/settings/rules/{}",
                segment(account_id),
                segment(rule_id)
            ),
        );
        if notes {
            request = request.with_query("notes", "true");
        }
        let response = self.execute(request).await?;
        Ok(take_data(response)?)
    }

    /// Remove an account from Cloud Conformity
    pub async fn delete_account(&self, account_id: &str) -> Result<(), ConformityError> {
        tracing::info!("Deleting account {}", account_id);
        self.send(HttpMethod::Delete, format!("accounts/{}", segment(account_id)))
            .await?;
        Ok(())
    }

    /// Get the organisation's external id, used in cross-account role trust policies
    pub async fn get_organisation_external_id(&self) -> Result<String, ConformityError> {
        let response = self.send(HttpMethod::Get, "organisation/external-id").await?;
        Ok(string_at(&response, "/data/id")?)
    }

    // -----------------------------------------------------------------------
    // Template scanner
    // -----------------------------------------------------------------------

    /// Scan an infrastructure-as-code template
    ///
    /// # Arguments
    ///
    /// * `contents` - Template body
    /// * `template_type` - Template type; `cloudformation-template` when `None`
    /// * `profile_id` - Scan against this profile's rule settings
    /// * `account_id` - Scan against this account's rule settings
    ///
    /// # Returns
    ///
    /// The finding resources, one per evaluated rule and resource.
    pub async fn scan_template(
        &self,
        contents: impl Into<String>,
        template_type: Option<String>,
        profile_id: Option<String>,
        account_id: Option<String>,
    ) -> Result<Vec<Value>, ConformityError> {
        let document = documents::template_scan_document(
            contents.into(),
            template_type,
            profile_id,
            account_id,
        );
        tracing::debug!(
            "Scanning {} ({} bytes)",
            document.data.attributes.template_type,
            document.data.attributes.contents.len()
        );

        let response = self
            .send_document(HttpMethod::Post, "template-scanner/scan", &document)
            .await?;
        let findings = take_list(response)?;
        tracing::debug!("Template scan returned {} findings", findings.len());
        Ok(findings)
    }

    /// Scan a template and split the findings into passing and failing ones
    pub async fn scan_template_partitioned(
        &self,
        contents: impl Into<String>,
        template_type: Option<String>,
        profile_id: Option<String>,
        account_id: Option<String>,
    ) -> Result<TemplateScanReport, ConformityError> {
        let findings = self
            .scan_template(contents, template_type, profile_id, account_id)
            .await?;
        Ok(TemplateScanReport::partition(findings))
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Get the user the API key belongs to
    pub async fn get_current_user(&self) -> Result<Value, ConformityError> {
        let response = self.send(HttpMethod::Get, "/users/whoami").await?;
        Ok(take_data(response)?)
    }

    /// Get the email address of the user the API key belongs to
    pub async fn get_current_user_email(&self) -> Result<String, ConformityError> {
        let user = self.get_current_user().await?;
        Ok(string_at(&user, "/attributes/email")?)
    }

    /// Get details of a user
    pub async fn get_user(&self, user_id: &str) -> Result<Value, ConformityError> {
        let response = self
            .send(HttpMethod::Get, format!("/users/{}", segment(user_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Change a user's role and, optionally, their per-account access levels
    pub async fn update_user_access(
        &self,
        user_id: &str,
        role: impl Into<String>,
        access_list: Option<Vec<AccessListEntry>>,
    ) -> Result<Value, ConformityError> {
        let document = documents::user_access_document(role.into(), access_list);
        let response = self
            .send_document(HttpMethod::Patch, format!("/users/{}", segment(user_id)), &document)
            .await?;
        Ok(take_data(response)?)
    }

    /// Revoke a user's access to the organisation
    pub async fn revoke_user(&self, user_id: &str) -> Result<(), ConformityError> {
        tracing::info!("Revoking user {}", user_id);
        self.send(HttpMethod::Delete, format!("/users/{}", segment(user_id)))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Communication settings
    // -----------------------------------------------------------------------

    /// Create a communication (notification) setting
    ///
    /// Without `account_id` the setting applies organisation-wide and the
    /// account relationship is sent as `null`.
    pub async fn create_communication_setting(
        &self,
        channel: impl Into<String>,
        enabled: bool,
        manual: Option<bool>,
        filter: Option<Value>,
        configuration: Option<Value>,
        account_id: Option<String>,
    ) -> Result<Value, ConformityError> {
        let channel = channel.into();
        tracing::info!(
            "Creating {} communication setting (account: {:?})",
            channel,
            account_id
        );

        let document = documents::create_communication_document(
            channel,
            enabled,
            manual,
            filter,
            configuration,
            account_id,
        );
        let response = self
            .send_document(HttpMethod::Post, "/settings/communication", &document)
            .await?;
        Ok(take_data(response)?)
    }

    /// List all communication settings
    pub async fn list_communication_settings(&self) -> Result<Vec<Value>, ConformityError> {
        let response = self.send(HttpMethod::Get, "/settings/communication").await?;
        Ok(take_list(response)?)
    }

    /// Get one communication setting
    pub async fn get_communication_setting(
        &self,
        setting_id: &str,
    ) -> Result<Value, ConformityError> {
        let response = self
            .send(HttpMethod::Get, format!("/settings/{}", segment(setting_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Update a service-style communication setting (channel credentials)
    pub async fn update_communication_setting(
        &self,
        setting_id: &str,
        channel: impl Into<String>,
        enabled: bool,
        service_name: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Result<Value, ConformityError> {
        let document = documents::update_communication_document(
            channel.into(),
            enabled,
            service_name.into(),
            service_key.into(),
        );
        let response = self
            .send_document(
                HttpMethod::Patch,
                format!("/settings/communication/{}", segment(setting_id)),
                &document,
            )
            .await?;
        Ok(take_data(response)?)
    }

    /// Delete a communication setting
    pub async fn delete_communication_setting(
        &self,
        setting_id: &str,
    ) -> Result<(), ConformityError> {
        self.send(HttpMethod::Delete, format!("/settings/{}", segment(setting_id)))
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    /// List all profiles
    pub async fn list_profiles(&self) -> Result<Vec<Value>, ConformityError> {
        let response = self.send(HttpMethod::Get, "profiles").await?;
        Ok(take_list(response)?)
    }

    /// Get a profile together with its rule settings
    pub async fn get_profile(&self, profile_id: &str) -> Result<Value, ConformityError> {
        let response = self
            .send(HttpMethod::Get, format!("profiles/{}", segment(profile_id)))
            .await?;
        Ok(take_data(response)?)
    }

    /// Save a profile and its rule settings
    ///
    /// Each rule setting is sent twice: as a `{type: "rules", id}` reference
    /// under `data.relationships.ruleSettings`, and as a full rule resource in
    /// `included`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use conformity_sdk::{ConformityClient, Profile, RuleSetting};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ConformityClient::new("us-west-2", "my-api-key");
    /// let profile = Profile {
    ///     name: "Baseline".to_string(),
    ///     description: "Minimum guardrails".to_string(),
    ///     rule_settings: vec![RuleSetting {
    ///         id: "S3-001".to_string(),
    ///         enabled: true,
    ///         exceptions: json!([]),
    ///         risk_level: "HIGH".to_string(),
    ///         extra_settings: None,
    ///     }],
    /// };
    /// let saved = client.save_profile(&profile).await?;
    /// println!("Saved profile {}", saved["id"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_profile(&self, profile: &Profile) -> Result<Value, ConformityError> {
        tracing::info!(
            "Saving profile '{}' with {} rule settings",
            profile.name,
            profile.rule_settings.len()
        );

        let document = documents::profile_document(profile);
        let response = self
            .send_document(HttpMethod::Post, "profiles", &document)
            .await?;
        Ok(take_data(response)?)
    }

    /// Delete a profile
    pub async fn delete_profile(&self, profile_id: &str) -> Result<(), ConformityError> {
        tracing::info!("Deleting profile {}", profile_id);
        self.send(HttpMethod::Delete, format!("profiles/{}", segment(profile_id)))
            .await?;
        Ok(())
    }

    /// Apply a profile's rule settings to accounts
    ///
    /// # Arguments
    ///
    /// * `profile_id` - Profile to apply
    /// * `account_ids` - Target accounts
    /// * `mode` - One of [`MODE_FILL_GAPS`](crate::MODE_FILL_GAPS),
    ///   [`MODE_OVERWRITE`](crate::MODE_OVERWRITE) or
    ///   [`MODE_REPLACE`](crate::MODE_REPLACE). Not validated locally.
    /// * `notes` - Note recorded against the changed settings
    ///
    /// # Returns
    ///
    /// The whole response document. The API answers this call with `meta`
    /// rather than `data`.
    pub async fn apply_profile(
        &self,
        profile_id: &str,
        account_ids: Vec<String>,
        mode: impl Into<String>,
        notes: impl Into<String>,
    ) -> Result<Value, ConformityError> {
        let document = documents::apply_profile_document(account_ids, mode.into(), notes.into());
        tracing::info!(
            "Applying profile {} to {} accounts (mode: {})",
            profile_id,
            document.meta.account_ids.len(),
            document.meta.mode
        );

        self.send_document(
            HttpMethod::Post,
            format!("profiles/{}", segment(profile_id)),
            &document,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Checks
    // -----------------------------------------------------------------------

    /// List all checks (rule results per resource)
    pub async fn list_checks(&self) -> Result<Vec<Value>, ConformityError> {
        let response = self.send(HttpMethod::Get, "checks").await?;
        Ok(take_list(response)?)
    }

    // -----------------------------------------------------------------------
    // Request execution
    // -----------------------------------------------------------------------

    async fn send(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
    ) -> Result<Value, ConformityError> {
        self.execute(self.build_request(method, path)).await
    }

    async fn send_document<B: Serialize>(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
        document: &B,
    ) -> Result<Value, ConformityError> {
        let body = serde_json::to_value(document).map_err(|e| {
            tracing::error!("Failed to serialize request body: {}", e);
            ApiError::Setup(format!("Failed to serialize request body: {}", e))
        })?;
        self.execute(self.build_request(method, path).with_body(body))
            .await
    }

    /// Send a request and return the response document of a 2xx answer
    async fn execute(&self, request: ApiRequest) -> Result<Value, ConformityError> {
        tracing::debug!("Sending {} request to: {}", request.method, request.joined_url());

        let response = match self.transport.send(request.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    "{} {} failed before a response arrived: {}",
                    request.method,
                    request.path,
                    e
                );
                return Err(ApiError::from_transport(e, request).into());
            }
        };

        tracing::debug!("Received response with status: {}", response.status);

        if !response.is_success() {
            tracing::error!(
                "{} {} failed: HTTP {} - {}",
                request.method,
                request.path,
                response.status,
                response.body
            );
            return Err(ApiError::Remote {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        Ok(response.body)
    }
}

/// Percent-encode an id as a single path segment
///
/// Only RFC 3986 unreserved bytes pass through, so `/`, `?` and `#` inside an
/// id stay part of the segment.
fn segment(id: &str) -> String {
    let mut encoded = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Unwrap the `data` member of a response document
fn take_data(mut document: Value) -> Result<Value, ApiError> {
    match document.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(ApiError::Parse(
            "Response document has no data member".to_string(),
        )),
    }
}

/// Unwrap the `data` member of a list response
fn take_list(document: Value) -> Result<Vec<Value>, ApiError> {
    match take_data(document)? {
        Value::Array(items) => Ok(items),
        other => Err(ApiError::Parse(format!(
            "Expected data to be an array, got: {}",
            other
        ))),
    }
}

/// Read a string at a JSON pointer
fn string_at(value: &Value, pointer: &str) -> Result<String, ApiError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Parse(format!("Response has no string at {}", pointer)))
}
