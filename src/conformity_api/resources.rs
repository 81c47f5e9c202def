use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Finding status the template scanner reports for a passing check
pub const FINDING_SUCCESS: &str = "SUCCESS";

/// Apply-profile mode: only set rules that have no configuration yet
pub const MODE_FILL_GAPS: &str = "fill-gaps";
/// Apply-profile mode: overwrite configured rules with the profile's values
pub const MODE_OVERWRITE: &str = "overwrite";
/// Apply-profile mode: replace the account's rule settings wholesale
pub const MODE_REPLACE: &str = "replace";

/// Conformity profile with its rule settings
///
/// Deserializes from the same camelCase shape the platform exports, so a
/// profile saved to disk can be fed back to
/// [`ConformityClient::save_profile`](crate::ConformityClient::save_profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rule_settings: Vec<RuleSetting>,
}

/// Configuration of one rule within a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetting {
    pub id: String,
    pub enabled: bool,
    #[serde(default = "empty_exceptions")]
    pub exceptions: Value,
    pub risk_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_settings: Option<Value>,
}

fn empty_exceptions() -> Value {
    Value::Array(Vec::new())
}

/// Account-level access granted to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntry {
    /// Conformity account id
    pub account: String,
    /// Access level, e.g. `NONE`, `READONLY` or `FULL`
    pub level: String,
}

/// Template scan findings split by outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateScanReport {
    pub success: Vec<Value>,
    pub failure: Vec<Value>,
}

impl TemplateScanReport {
    /// Split findings on `attributes.status`. Anything other than
    /// `"SUCCESS"`, including a missing status, counts as a failure.
    pub fn partition(findings: Vec<Value>) -> Self {
        let (success, failure): (Vec<Value>, Vec<Value>) = findings
            .into_iter()
            .partition(|finding| finding_status(finding) == Some(FINDING_SUCCESS));
        Self { success, failure }
    }

    pub fn is_clean(&self) -> bool {
        self.failure.is_empty()
    }
}

/// `attributes.status` of a finding resource
pub fn finding_status(finding: &Value) -> Option<&str> {
    finding
        .get("attributes")
        .and_then(|attributes| attributes.get("status"))
        .and_then(Value::as_str)
}
