//! JSON:API request documents
//!
//! Typed shapes for every request body the client sends. Optional inputs are
//! `Option` fields skipped during serialization, so a field the caller did not
//! supply never reaches the wire as `null`.

use crate::conformity_api::resources::{AccessListEntry, Profile, RuleSetting};
use serde::Serialize;
use serde_json::Value;

pub const ACCOUNT_TYPE: &str = "account";
pub const ACCOUNTS_TYPE: &str = "accounts";
pub const SETTINGS_TYPE: &str = "settings";
pub const PROFILES_TYPE: &str = "profiles";
pub const RULES_TYPE: &str = "rules";
pub const COMMUNICATION_SETTING: &str = "communication";
pub const DEFAULT_TEMPLATE_TYPE: &str = "cloudformation-template";

/// Top-level request document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDocument<D> {
    pub data: D,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<ResourceObject<RuleAttributes>>,
}

impl<D> RequestDocument<D> {
    pub fn new(data: D) -> Self {
        Self {
            data,
            included: Vec::new(),
        }
    }
}

/// A JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceObject<A, R = ()> {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub attributes: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<R>,
}

impl<A, R> ResourceObject<A, R> {
    /// Resource object with attributes only (no `type`)
    pub fn untyped(attributes: A) -> Self {
        Self {
            resource_type: None,
            id: None,
            attributes,
            relationships: None,
        }
    }

    pub fn typed(resource_type: &str, attributes: A) -> Self {
        Self {
            resource_type: Some(resource_type.to_string()),
            ..Self::untyped(attributes)
        }
    }
}

/// `{ "data": ... }` wrapper used inside `relationships`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship<T> {
    pub data: T,
}

/// Resource linkage by type and id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountAttributes {
    pub name: String,
    pub environment: String,
    pub access: AccountAccess,
    pub cost_package: bool,
    pub has_real_time_monitoring: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountAccess {
    pub keys: AccessKeys,
}

/// Cross-account IAM role the platform assumes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeys {
    pub role_arn: String,
    pub external_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAttributes {
    pub cost_package: bool,
    pub has_real_time_monitoring: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountUpdateAttributes {
    pub name: String,
    pub environment: String,
    pub code: String,
    pub tags: Vec<String>,
}

pub type CreateAccountDocument = RequestDocument<ResourceObject<AccountAttributes>>;
pub type SubscriptionDocument = RequestDocument<ResourceObject<SubscriptionAttributes>>;
pub type UpdateAccountDocument = RequestDocument<ResourceObject<AccountUpdateAttributes>>;

pub fn create_account_document(
    name: String,
    environment: String,
    role_arn: String,
    external_id: String,
    cost_package: bool,
    has_real_time_monitoring: bool,
) -> CreateAccountDocument {
    RequestDocument::new(ResourceObject::typed(
        ACCOUNT_TYPE,
        AccountAttributes {
            name,
            environment,
            access: AccountAccess {
                keys: AccessKeys {
                    role_arn,
                    external_id,
                },
            },
            cost_package,
            has_real_time_monitoring,
        },
    ))
}

pub fn subscription_document(
    cost_package: bool,
    has_real_time_monitoring: bool,
) -> SubscriptionDocument {
    RequestDocument::new(ResourceObject::untyped(SubscriptionAttributes {
        cost_package,
        has_real_time_monitoring,
    }))
}

pub fn update_account_document(
    name: String,
    environment: String,
    code: String,
    tags: Vec<String>,
) -> UpdateAccountDocument {
    RequestDocument::new(ResourceObject::untyped(AccountUpdateAttributes {
        name,
        environment,
        code,
        tags,
    }))
}

// ---------------------------------------------------------------------------
// Template scanner
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateScanAttributes {
    #[serde(rename = "type")]
    pub template_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub contents: String,
}

pub type TemplateScanDocument = RequestDocument<ResourceObject<TemplateScanAttributes>>;

pub fn template_scan_document(
    contents: String,
    template_type: Option<String>,
    profile_id: Option<String>,
    account_id: Option<String>,
) -> TemplateScanDocument {
    RequestDocument::new(ResourceObject::untyped(TemplateScanAttributes {
        template_type: template_type.unwrap_or_else(|| DEFAULT_TEMPLATE_TYPE.to_string()),
        profile_id,
        account_id,
        contents,
    }))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Role/access change. The API takes these directly under `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccessUpdate {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListEntry>>,
}

pub type UserAccessDocument = RequestDocument<UserAccessUpdate>;

pub fn user_access_document(
    role: String,
    access_list: Option<Vec<AccessListEntry>>,
) -> UserAccessDocument {
    RequestDocument::new(UserAccessUpdate { role, access_list })
}

// ---------------------------------------------------------------------------
// Communication settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunicationAttributes<C> {
    #[serde(rename = "type")]
    pub setting_type: String,
    pub channel: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<C>,
}

/// Account a communication setting is scoped to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountReference {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub account_id: String,
}

/// `account.data` is serialized as `null` when the setting is not scoped
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingRelationships {
    pub account: Relationship<Option<AccountReference>>,
}

/// Credentials block for service-style channels (PagerDuty and friends)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfiguration {
    pub service_name: String,
    pub service_key: String,
}

pub type CreateCommunicationDocument =
    RequestDocument<ResourceObject<CommunicationAttributes<Value>, SettingRelationships>>;
pub type UpdateCommunicationDocument =
    RequestDocument<ResourceObject<CommunicationAttributes<ServiceConfiguration>>>;

pub fn create_communication_document(
    channel: String,
    enabled: bool,
    manual: Option<bool>,
    filter: Option<Value>,
    configuration: Option<Value>,
    account_id: Option<String>,
) -> CreateCommunicationDocument {
    let account = account_id.map(|account_id| AccountReference {
        resource_type: ACCOUNTS_TYPE.to_string(),
        account_id,
    });

    RequestDocument::new(ResourceObject {
        relationships: Some(SettingRelationships {
            account: Relationship { data: account },
        }),
        ..ResourceObject::typed(
            SETTINGS_TYPE,
            CommunicationAttributes {
                setting_type: COMMUNICATION_SETTING.to_string(),
                channel,
                enabled,
                manual,
                filter,
                configuration,
            },
        )
    })
}

pub fn update_communication_document(
    channel: String,
    enabled: bool,
    service_name: String,
    service_key: String,
) -> UpdateCommunicationDocument {
    RequestDocument::new(ResourceObject::typed(
        SETTINGS_TYPE,
        CommunicationAttributes {
            setting_type: COMMUNICATION_SETTING.to_string(),
            channel,
            enabled,
            manual: None,
            filter: None,
            configuration: Some(ServiceConfiguration {
                service_name,
                service_key,
            }),
        },
    ))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAttributes {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRelationships {
    pub rule_settings: Relationship<Vec<ResourceIdentifier>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAttributes {
    pub enabled: bool,
    pub exceptions: Value,
    pub risk_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_settings: Option<Value>,
}

pub type ProfileDocument =
    RequestDocument<ResourceObject<ProfileAttributes, ProfileRelationships>>;

impl From<&RuleSetting> for ResourceIdentifier {
    fn from(rule: &RuleSetting) -> Self {
        ResourceIdentifier {
            resource_type: RULES_TYPE.to_string(),
            id: rule.id.clone(),
        }
    }
}

impl From<&RuleSetting> for ResourceObject<RuleAttributes> {
    fn from(rule: &RuleSetting) -> Self {
        ResourceObject {
            id: Some(rule.id.clone()),
            ..ResourceObject::typed(
                RULES_TYPE,
                RuleAttributes {
                    enabled: rule.enabled,
                    exceptions: rule.exceptions.clone(),
                    risk_level: rule.risk_level.clone(),
                    extra_settings: rule.extra_settings.clone(),
                },
            )
        }
    }
}

/// Explode a profile's rule settings into relationship references plus
/// `included` rule resources, both in the caller's order.
pub fn profile_document(profile: &Profile) -> ProfileDocument {
    let references: Vec<ResourceIdentifier> = profile
        .rule_settings
        .iter()
        .map(ResourceIdentifier::from)
        .collect();
    let included: Vec<ResourceObject<RuleAttributes>> = profile
        .rule_settings
        .iter()
        .map(ResourceObject::from)
        .collect();

    RequestDocument {
        data: ResourceObject {
            relationships: Some(ProfileRelationships {
                rule_settings: Relationship { data: references },
            }),
            ..ResourceObject::typed(
                PROFILES_TYPE,
                ProfileAttributes {
                    name: profile.name.clone(),
                    description: profile.description.clone(),
                },
            )
        },
        included,
    }
}

/// Body of the apply-profile call, which carries only `meta`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyProfileDocument {
    pub meta: ApplyProfileMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyProfileMeta {
    pub account_ids: Vec<String>,
    pub types: Vec<String>,
    pub mode: String,
    pub notes: String,
}

pub fn apply_profile_document(
    account_ids: Vec<String>,
    mode: String,
    notes: String,
) -> ApplyProfileDocument {
    ApplyProfileDocument {
        meta: ApplyProfileMeta {
            account_ids,
            types: vec!["rule".to_string()],
            mode,
            notes,
        },
    }
}
