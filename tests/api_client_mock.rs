//! API Client Mock Tests
//!
//! Exercises every ConformityClient operation against a wiremock server,
//! checking verb, path, headers and request body, and how responses and
//! failures come back to the caller.

use conformity_sdk::{
    AccessListEntry, ApiError, ConformityClient, ConformityError, Profile, ReqwestTransport,
    RuleSetting, MODE_OVERWRITE,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{body_json, header, method, path, query_param, query_param_is_missing},
    Mock, MockServer, ResponseTemplate,
};

const API_KEY: &str = "test-api-key";

fn client_for(server: &MockServer) -> ConformityClient {
    ConformityClient::with_base_url(format!("{}/v1/", server.uri()), API_KEY)
}

fn resource(resource_type: &str, id: &str) -> Value {
    json!({"type": resource_type, "id": id, "attributes": {"name": id}})
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn test_create_account_returns_id() {
    let mock_server = MockServer::start().await;

    let expected_request = json!({
        "data": {
            "type": "account",
            "attributes": {
                "name": "Production",
                "environment": "prod",
                "access": {
                    "keys": {
                        "roleArn": "arn:aws:iam::123456789012:role/CloudConformity",
                        "externalId": "ext-001"
                    }
                },
                "costPackage": false,
                "hasRealTimeMonitoring": true
            }
        }
    });

    Mock::given(method("POST"))
        .and(path("/v1/accounts"))
        .and(header("Authorization", "ApiKey test-api-key"))
        .and(header("Content-Type", "application/vnd.api+json"))
        .and(body_json(&expected_request))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": resource("accounts", "acc-123")})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .create_account(
            "Production",
            "prod",
            "arn:aws:iam::123456789012:role/CloudConformity",
            "ext-001",
            false,
            true,
        )
        .await;

    assert_eq!(result.unwrap(), "acc-123");
}

#[tokio::test]
async fn test_create_account_without_id_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let error = client
        .create_account("n", "e", "arn", "ext", false, false)
        .await
        .unwrap_err();

    assert!(matches!(error, ConformityError::Api(ApiError::Parse(_))));
}

#[tokio::test]
async fn test_list_accounts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .and(header("Authorization", "ApiKey test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [resource("accounts", "a1"), resource("accounts", "a2")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let accounts = client_for(&mock_server).list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0]["id"], "a1");
    assert_eq!(accounts[1]["id"], "a2");
}

#[tokio::test]
async fn test_get_account_and_access() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("accounts", "a1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/a1/access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "access", "attributes": {"configuration": {"roleArn": "arn:aws:iam::1:role/x"}}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let account = client.get_account("a1").await.unwrap();
    assert_eq!(account["id"], "a1");

    let access = client.get_account_access("a1").await.unwrap();
    assert_eq!(
        access["attributes"]["configuration"]["roleArn"],
        "arn:aws:iam::1:role/x"
    );
}

#[tokio::test]
async fn test_scan_account_posts_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/accounts/a1/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "accounts", "id": "a1", "attributes": {"bot-status": "QUEUED"}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).scan_account("a1").await.unwrap();
    assert_eq!(result["attributes"]["bot-status"], "QUEUED");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_update_account_subscription() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/accounts/a1/subscription"))
        .and(body_json(json!({
            "data": {"attributes": {"costPackage": true, "hasRealTimeMonitoring": false}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("accounts", "a1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .update_account_subscription("a1", true, false)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/accounts/a1"))
        .and(body_json(json!({
            "data": {
                "attributes": {
                    "name": "Renamed",
                    "environment": "staging",
                    "code": "STG",
                    "tags": ["team:platform", "cost-centre:42"]
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("accounts", "a1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .update_account(
            "a1",
            "Renamed",
            "staging",
            "STG",
            vec!["team:platform".to_string(), "cost-centre:42".to_string()],
        )
        .await;
    assert_eq!(result.unwrap()["id"], "a1");
}

#[tokio::test]
async fn test_get_rule_setting_with_and_without_notes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/a1/settings/rules/S3-001"))
        .and(query_param("notes", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "rules", "id": "S3-001", "attributes": {"notes": [{"note": "tuned"}]}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/accounts/a1/settings/rules/S3-001"))
        .and(query_param_is_missing("notes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "rules", "id": "S3-001", "attributes": {}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let with_notes = client.get_rule_setting("a1", "S3-001", true).await.unwrap();
    assert_eq!(with_notes["attributes"]["notes"][0]["note"], "tuned");

    let plain = client.get_rule_setting("a1", "S3-001", false).await.unwrap();
    assert_eq!(plain["id"], "S3-001");
}

#[tokio::test]
async fn test_delete_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/accounts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"status": "sent"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).delete_account("a1").await.is_ok());
}

#[tokio::test]
async fn test_get_organisation_external_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/organisation/external-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"type": "external-ids", "id": "3ff84b20-0f4e-11ea-9f2c-e5e2d4a1f7e0"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let external_id = client_for(&mock_server)
        .get_organisation_external_id()
        .await
        .unwrap();
    assert_eq!(external_id, "3ff84b20-0f4e-11ea-9f2c-e5e2d4a1f7e0");
}

// ============================================================================
// Template scanner
// ============================================================================

fn findings() -> Value {
    json!({
        "data": [
            {"type": "checks", "id": "c1", "attributes": {"status": "SUCCESS", "rule-title": "S3 encryption"}},
            {"type": "checks", "id": "c2", "attributes": {"status": "FAILURE", "rule-title": "Public bucket"}},
            {"type": "checks", "id": "c3", "attributes": {"status": "SUCCESS", "rule-title": "Versioning"}}
        ]
    })
}

#[tokio::test]
async fn test_scan_template_defaults_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/template-scanner/scan"))
        .and(body_json(json!({
            "data": {"attributes": {"type": "cloudformation-template", "contents": "Resources: {}"}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(findings()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .scan_template("Resources: {}", None, None, None)
        .await
        .unwrap();
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn test_scan_template_with_profile_and_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/template-scanner/scan"))
        .and(body_json(json!({
            "data": {
                "attributes": {
                    "type": "cloudformation-template",
                    "profileId": "profile-1",
                    "accountId": "a1",
                    "contents": "{}"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .scan_template(
            "{}",
            Some("cloudformation-template".to_string()),
            Some("profile-1".to_string()),
            Some("a1".to_string()),
        )
        .await
        .unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_scan_template_partitioned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/template-scanner/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(findings()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = client_for(&mock_server)
        .scan_template_partitioned("{}", None, None, None)
        .await
        .unwrap();

    let success_ids: Vec<&str> = report
        .success
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    let failure_ids: Vec<&str> = report
        .failure
        .iter()
        .map(|f| f["id"].as_str().unwrap())
        .collect();
    assert_eq!(success_ids, vec!["c1", "c3"]);
    assert_eq!(failure_ids, vec!["c2"]);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_current_user_and_email() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/whoami"))
        .and(header("Authorization", "ApiKey test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "type": "users",
                "id": "u1",
                "attributes": {"first-name": "Sam", "email": "sam@example.com", "role": "ADMIN"}
            }
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let user = client.get_current_user().await.unwrap();
    assert_eq!(user["id"], "u1");

    let email = client.get_current_user_email().await.unwrap();
    assert_eq!(email, "sam@example.com");
}

#[tokio::test]
async fn test_get_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("users", "u2")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = client_for(&mock_server).get_user("u2").await.unwrap();
    assert_eq!(user["type"], "users");
}

#[tokio::test]
async fn test_update_user_access_with_access_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/users/u2"))
        .and(body_json(json!({
            "data": {
                "role": "USER",
                "accessList": [
                    {"account": "a1", "level": "FULL"},
                    {"account": "a2", "level": "READONLY"}
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("users", "u2")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let access_list = vec![
        AccessListEntry {
            account: "a1".to_string(),
            level: "FULL".to_string(),
        },
        AccessListEntry {
            account: "a2".to_string(),
            level: "READONLY".to_string(),
        },
    ];
    let result = client_for(&mock_server)
        .update_user_access("u2", "USER", Some(access_list))
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_update_user_access_role_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/users/u2"))
        .and(body_json(json!({"data": {"role": "ADMIN"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("users", "u2")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .update_user_access("u2", "ADMIN", None)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_revoke_user() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/users/u2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).revoke_user("u2").await.is_ok());
}

// ============================================================================
// Communication settings
// ============================================================================

#[tokio::test]
async fn test_create_communication_setting_scoped_to_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/settings/communication"))
        .and(body_json(json!({
            "data": {
                "type": "settings",
                "attributes": {
                    "type": "communication",
                    "channel": "email",
                    "enabled": true,
                    "manual": true,
                    "filter": {"riskLevels": ["HIGH", "EXTREME"]},
                    "configuration": {"users": ["u1"]}
                },
                "relationships": {
                    "account": {"data": {"type": "accounts", "accountId": "a1"}}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [resource("settings", "s1")]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .create_communication_setting(
            "email",
            true,
            Some(true),
            Some(json!({"riskLevels": ["HIGH", "EXTREME"]})),
            Some(json!({"users": ["u1"]})),
            Some("a1".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(result[0]["id"], "s1");
}

#[tokio::test]
async fn test_create_communication_setting_organisation_wide() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/settings/communication"))
        .and(body_json(json!({
            "data": {
                "type": "settings",
                "attributes": {"type": "communication", "channel": "sms", "enabled": false},
                "relationships": {"account": {"data": null}}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("settings", "s2")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .create_communication_setting("sms", false, None, None, None, None)
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_list_and_get_communication_settings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/settings/communication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [resource("settings", "s1"), resource("settings", "s2")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/settings/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("settings", "s1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_eq!(client.list_communication_settings().await.unwrap().len(), 2);
    assert_eq!(client.get_communication_setting("s1").await.unwrap()["id"], "s1");
}

#[tokio::test]
async fn test_update_communication_setting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/settings/communication/s1"))
        .and(body_json(json!({
            "data": {
                "type": "settings",
                "attributes": {
                    "type": "communication",
                    "channel": "pager-duty",
                    "enabled": true,
                    "configuration": {"serviceName": "on-call", "serviceKey": "pd-key"}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("settings", "s1")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .update_communication_setting("s1", "pager-duty", true, "on-call", "pd-key")
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_communication_setting() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/settings/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"status": "deleted"}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server)
        .delete_communication_setting("s1")
        .await
        .is_ok());
}

// ============================================================================
// Profiles and checks
// ============================================================================

#[tokio::test]
async fn test_list_and_get_profiles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [resource("profiles", "p1")]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": resource("profiles", "p1"),
            "included": [{"type": "rules", "id": "S3-001", "attributes": {"enabled": true}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_eq!(client.list_profiles().await.unwrap()[0]["id"], "p1");
    assert_eq!(client.get_profile("p1").await.unwrap()["type"], "profiles");
}

#[tokio::test]
async fn test_save_profile_sends_included_rules() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/profiles"))
        .and(header("Content-Type", "application/vnd.api+json"))
        .and(body_json(json!({
            "data": {
                "type": "profiles",
                "attributes": {"name": "Baseline", "description": "Guardrails"},
                "relationships": {
                    "ruleSettings": {
                        "data": [
                            {"type": "rules", "id": "r1"},
                            {"type": "rules", "id": "r2"}
                        ]
                    }
                }
            },
            "included": [
                {
                    "type": "rules",
                    "id": "r1",
                    "attributes": {"enabled": true, "exceptions": [], "riskLevel": "HIGH"}
                },
                {
                    "type": "rules",
                    "id": "r2",
                    "attributes": {
                        "enabled": false,
                        "exceptions": {"tags": ["ignore"]},
                        "riskLevel": "LOW",
                        "extraSettings": [{"name": "ttl", "value": 30}]
                    }
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": resource("profiles", "p9")})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let profile = Profile {
        name: "Baseline".to_string(),
        description: "Guardrails".to_string(),
        rule_settings: vec![
            RuleSetting {
                id: "r1".to_string(),
                enabled: true,
                exceptions: json!([]),
                risk_level: "HIGH".to_string(),
                extra_settings: None,
            },
            RuleSetting {
                id: "r2".to_string(),
                enabled: false,
                exceptions: json!({"tags": ["ignore"]}),
                risk_level: "LOW".to_string(),
                extra_settings: Some(json!([{"name": "ttl", "value": 30}])),
            },
        ],
    };

    let saved = client_for(&mock_server).save_profile(&profile).await.unwrap();
    assert_eq!(saved["id"], "p9");
}

#[tokio::test]
async fn test_delete_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/profiles/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).delete_profile("p1").await.is_ok());
}

#[tokio::test]
async fn test_apply_profile_returns_whole_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/profiles/p1"))
        .and(body_json(json!({
            "meta": {
                "accountIds": ["a1", "a2"],
                "types": ["rule"],
                "mode": "overwrite",
                "notes": "quarterly rollout"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"status": "sent", "message": "Profile will be applied"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server)
        .apply_profile(
            "p1",
            vec!["a1".to_string(), "a2".to_string()],
            MODE_OVERWRITE,
            "quarterly rollout",
        )
        .await
        .unwrap();
    assert_eq!(result["meta"]["status"], "sent");
}

#[tokio::test]
async fn test_apply_profile_passes_unknown_mode_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/profiles/p1"))
        .and(body_json(json!({
            "meta": {"accountIds": [], "types": ["rule"], "mode": "merge", "notes": ""}
        })))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{"status": 422, "detail": "mode is invalid"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server)
        .apply_profile("p1", vec![], "merge", "")
        .await
        .unwrap_err();
    assert_eq!(error.api().and_then(ApiError::status), Some(422));
}

#[tokio::test]
async fn test_list_checks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [resource("checks", "ccc:a1:S3-001:S3:us-east-1:bucket")],
            "meta": {"total": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let checks = client_for(&mock_server).list_checks().await.unwrap();
    assert_eq!(checks.len(), 1);
}

// ============================================================================
// Failure shapes
// ============================================================================

#[tokio::test]
async fn test_remote_rejection_returns_server_body() {
    let mock_server = MockServer::start().await;

    let error_body = json!({
        "errors": [{"status": 403, "details": "User is not authorised to access this resource"}]
    });

    Mock::given(method("GET"))
        .and(path("/v1/accounts/a1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(&error_body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).get_account("a1").await.unwrap_err();

    match error {
        ConformityError::Api(ApiError::Remote { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, error_body);
        }
        other => panic!("expected remote rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_remote_rejection_with_text_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/checks"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let error = client_for(&mock_server).list_checks().await.unwrap_err();

    assert!(matches!(
        error,
        ConformityError::Api(ApiError::Remote { status: 503, ref body }) if body == "Service Unavailable"
    ));
    assert!(error.to_string().contains("503"));
}

#[tokio::test]
async fn test_unreachable_server_returns_request_descriptor() {
    // Nothing listens on port 1, so the connection is refused
    let direct = reqwest::Client::builder().no_proxy().build().unwrap();
    let client = ConformityClient::with_base_url("http://127.0.0.1:1/v1/", API_KEY)
        .with_transport(ReqwestTransport::with_client(direct));

    let error = client.get_account("a1").await.unwrap_err();

    match error {
        ConformityError::Api(ApiError::NoResponse { request, reason }) => {
            assert_eq!(request.path, "accounts/a1");
            assert_eq!(request.joined_url(), "http://127.0.0.1:1/v1/accounts/a1");
            assert_eq!(request.header("Authorization"), Some("ApiKey test-api-key"));
            assert!(request.body.is_none());
            assert!(!reason.is_empty());
        }
        other => panic!("expected no-response error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_base_url_is_setup_error() {
    let client = ConformityClient::with_base_url("not a url", API_KEY);

    let error = client.list_accounts().await.unwrap_err();

    match error {
        ConformityError::Api(ApiError::Setup(message)) => {
            assert!(message.contains("Invalid request URL"));
        }
        other => panic!("expected setup error, got {:?}", other),
    }
}
