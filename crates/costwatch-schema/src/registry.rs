//! Configuration schema registry
//!
//! Declarative per-provider field rules plus the builder that turns raw
//! form input into the normalized configuration document the backend
//! expects. Everything here is pure: [`validate`] and [`build`] never
//! touch the network, and a validation failure is the signal that no
//! network call may be issued for this input.

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::error::SchemaError;
use crate::provider::ProviderKind;

/// Marker attached to every built configuration document.
pub const CONFIG_NOTE: &str = "Production config collected - backend uses mock data for demo";

/// A named configuration field: wire key plus the label surfaced to the
/// operator when the field is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key in the raw input and the built configuration
    pub key: &'static str,
    /// Operator-facing label
    pub label: &'static str,
}

const fn field(key: &'static str, label: &'static str) -> Field {
    Field { key, label }
}

// AWS
const AWS_ACCESS_KEY: Field = field("access_key_id", "AWS Access Key ID");
const AWS_SECRET_KEY: Field = field("secret_access_key", "AWS Secret Access Key");
const AWS_ACCOUNT_ID: Field = field("account_id", "AWS Account ID");

// Azure
const AZURE_SUBSCRIPTION: Field = field("subscription_id", "Subscription ID");
const AZURE_TENANT: Field = field("tenant_id", "Tenant ID");
const AZURE_CLIENT_ID: Field = field("client_id", "Client ID");
const AZURE_CLIENT_SECRET: Field = field("client_secret", "Client Secret");

// Kubernetes
const K8S_KUBECONFIG: Field = field("kubeconfig_path", "Kubeconfig File Path");
const K8S_ENDPOINT: Field = field("cluster_endpoint", "Cluster API Endpoint");
const K8S_TOKEN: Field = field("service_account_token", "Service Account Token");

// Splunk
const SPLUNK_HOST: Field = field("splunk_host", "Splunk Host");
const SPLUNK_TOKEN: Field = field("auth_token", "Auth Token");
const SPLUNK_USERNAME: Field = field("username", "Username");
const SPLUNK_PASSWORD: Field = field("password", "Password");

// Kibana / Elasticsearch
const ES_HOSTS: Field = field("elasticsearch_hosts", "Elasticsearch Hosts");
const ES_API_KEY: Field = field("api_key", "API Key");
const ES_USERNAME: Field = field("username", "Username");
const ES_PASSWORD: Field = field("password", "Password");

// CSV
const CSV_PATH: Field = field("path", "CSV File Path");

/// An either/or requirement: satisfied when every field of at least one
/// branch is present. Supplying both branches is accepted.
#[derive(Debug, Clone, Copy)]
pub struct EitherRule {
    /// Label reported when neither branch is satisfied
    pub label: &'static str,
    /// First branch
    pub first: &'static [Field],
    /// Second branch
    pub second: &'static [Field],
}

/// The full requirement set for one provider kind.
#[derive(Debug, Clone, Copy)]
pub struct SchemaRule {
    /// Fields required unconditionally
    pub required: &'static [Field],
    /// Optional either/or branch requirement
    pub either: Option<EitherRule>,
}

const NO_RULES: SchemaRule = SchemaRule {
    required: &[],
    either: None,
};

/// Requirement table, one entry per provider kind.
#[must_use]
pub fn rule_for(kind: ProviderKind) -> SchemaRule {
    match kind {
        ProviderKind::AwsCostExplorer => SchemaRule {
            required: &[AWS_ACCESS_KEY, AWS_SECRET_KEY, AWS_ACCOUNT_ID],
            either: None,
        },
        ProviderKind::AzureCostManagement => SchemaRule {
            required: &[
                AZURE_SUBSCRIPTION,
                AZURE_TENANT,
                AZURE_CLIENT_ID,
                AZURE_CLIENT_SECRET,
            ],
            either: None,
        },
        ProviderKind::KubernetesMetrics => SchemaRule {
            required: &[],
            either: Some(EitherRule {
                label: "Kubeconfig Path or Cluster Endpoint + Service Account Token",
                first: &[K8S_KUBECONFIG],
                second: &[K8S_ENDPOINT, K8S_TOKEN],
            }),
        },
        ProviderKind::Splunk => SchemaRule {
            required: &[SPLUNK_HOST],
            either: Some(EitherRule {
                label: "Auth Token or Username/Password",
                first: &[SPLUNK_TOKEN],
                second: &[SPLUNK_USERNAME, SPLUNK_PASSWORD],
            }),
        },
        ProviderKind::Kibana => SchemaRule {
            required: &[ES_HOSTS],
            either: Some(EitherRule {
                label: "API Key or Username/Password",
                first: &[ES_API_KEY],
                second: &[ES_USERNAME, ES_PASSWORD],
            }),
        },
        ProviderKind::Csv => SchemaRule {
            required: &[CSV_PATH],
            either: None,
        },
        ProviderKind::GcpBilling | ProviderKind::DatadogLogs | ProviderKind::SharePoint => NO_RULES,
    }
}

/// Raw form input: a string-keyed snapshot of what the operator typed.
///
/// Blank and whitespace-only values count as absent.
#[derive(Debug, Clone, Default)]
pub struct RawSourceInput {
    fields: HashMap<String, String>,
}

impl RawSourceInput {
    /// Create an empty input.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value (builder-style).
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The trimmed value of a field, or `None` when absent or blank.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether a field is present and non-blank.
    #[inline]
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn branch_satisfied(input: &RawSourceInput, branch: &[Field]) -> bool {
    branch.iter().all(|f| input.has(f.key))
}

/// Split a comma-separated host list, trimming each entry and dropping
/// blanks.
#[must_use]
pub fn split_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check raw input against the requirement table for `kind`.
///
/// # Errors
/// `SchemaError::MissingFields` carrying the unsatisfied labels verbatim.
/// A failure here must prevent any network call for this input.
pub fn validate(kind: ProviderKind, input: &RawSourceInput) -> Result<(), SchemaError> {
    let rule = rule_for(kind);
    let mut missing: Vec<String> = Vec::new();

    for required in rule.required {
        let satisfied = match (kind, *required) {
            // The host list needs at least one non-blank entry, not just
            // a non-blank raw value.
            (ProviderKind::Kibana, f) if f.key == ES_HOSTS.key => input
                .get(f.key)
                .is_some_and(|raw| !split_host_list(raw).is_empty()),
            (_, f) => input.has(f.key),
        };
        if !satisfied {
            missing.push(required.label.to_string());
        }
    }

    if let Some(either) = rule.either {
        if !branch_satisfied(input, either.first) && !branch_satisfied(input, either.second) {
            missing.push(either.label.to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingFields { missing })
    }
}

fn string_or_null(input: &RawSourceInput, key: &str) -> Value {
    input
        .get(key)
        .map_or(Value::Null, |v| Value::String(v.to_string()))
}

fn string_or_default(input: &RawSourceInput, key: &str, default: &str) -> Value {
    Value::String(input.get(key).unwrap_or(default).to_string())
}

/// Build the normalized configuration document for `kind`.
///
/// Pure transformation of the raw input; callers are expected to have
/// run [`validate`] first. Every document carries the [`CONFIG_NOTE`]
/// marker under `demo_note`.
#[must_use]
pub fn build(kind: ProviderKind, input: &RawSourceInput) -> Value {
    match kind {
        ProviderKind::AwsCostExplorer => json!({
            "access_key_id": string_or_null(input, AWS_ACCESS_KEY.key),
            "secret_access_key": string_or_null(input, AWS_SECRET_KEY.key),
            "account_id": string_or_null(input, AWS_ACCOUNT_ID.key),
            "region": string_or_default(input, "region", "us-east-1"),
            "role_arn": string_or_null(input, "role_arn"),
            "external_id": string_or_null(input, "external_id"),
            "demo_note": CONFIG_NOTE,
        }),
        ProviderKind::AzureCostManagement => json!({
            "subscription_id": string_or_null(input, AZURE_SUBSCRIPTION.key),
            "tenant_id": string_or_null(input, AZURE_TENANT.key),
            "client_id": string_or_null(input, AZURE_CLIENT_ID.key),
            "client_secret": string_or_null(input, AZURE_CLIENT_SECRET.key),
            "demo_note": CONFIG_NOTE,
        }),
        ProviderKind::KubernetesMetrics => json!({
            "kubeconfig_path": string_or_null(input, K8S_KUBECONFIG.key),
            "cluster_endpoint": string_or_null(input, K8S_ENDPOINT.key),
            "service_account_token": string_or_null(input, K8S_TOKEN.key),
            "prometheus_endpoint":
                string_or_default(input, "prometheus_endpoint", "http://prometheus:9090"),
            "cost_model_endpoint":
                string_or_default(input, "cost_model_endpoint", "http://cost-model:9003"),
            "namespace": string_or_default(input, "namespace", "default"),
            "demo_note": CONFIG_NOTE,
        }),
        ProviderKind::Splunk => {
            let port = input
                .get("splunk_port")
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8089);
            let mut config = json!({
                "splunk_host": string_or_null(input, SPLUNK_HOST.key),
                "splunk_port": port,
                "scheme": "https",
                "default_index": string_or_default(input, "default_index", "billing"),
                "verify_ssl": true,
                "demo_note": CONFIG_NOTE,
            });
            if let Value::Object(auth) = &mut config {
                if let Some(token) = input.get(SPLUNK_TOKEN.key) {
                    auth.insert("auth_token".to_string(), Value::String(token.to_string()));
                } else {
                    auth.insert(
                        "username".to_string(),
                        string_or_null(input, SPLUNK_USERNAME.key),
                    );
                    auth.insert(
                        "password".to_string(),
                        string_or_null(input, SPLUNK_PASSWORD.key),
                    );
                }
            }
            config
        }
        ProviderKind::Kibana => {
            let hosts = input
                .get(ES_HOSTS.key)
                .map(split_host_list)
                .unwrap_or_default();
            let mut config = json!({
                "elasticsearch_hosts": hosts,
                "kibana_host": string_or_null(input, "kibana_host"),
                "kibana_space": string_or_null(input, "kibana_space"),
                "cost_index_pattern":
                    string_or_default(input, "cost_index_pattern", "billing-*"),
                "verify_ssl": true,
                "demo_note": CONFIG_NOTE,
            });
            if let Value::Object(auth) = &mut config {
                if let Some(key) = input.get(ES_API_KEY.key) {
                    auth.insert("api_key".to_string(), Value::String(key.to_string()));
                } else {
                    auth.insert(
                        "elasticsearch_username".to_string(),
                        string_or_null(input, ES_USERNAME.key),
                    );
                    auth.insert(
                        "elasticsearch_password".to_string(),
                        string_or_null(input, ES_PASSWORD.key),
                    );
                }
            }
            config
        }
        ProviderKind::Csv => json!({
            "path": string_or_null(input, CSV_PATH.key),
            "demo_note": CONFIG_NOTE,
        }),
        ProviderKind::GcpBilling | ProviderKind::DatadogLogs | ProviderKind::SharePoint => json!({
            "mock_type": kind.wire_name(),
            "description": format!("Production-ready {} configuration", kind.display_name()),
            "environment": "production",
            "demo_note": CONFIG_NOTE,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn aws_input() -> RawSourceInput {
        RawSourceInput::new()
            .set("access_key_id", "AKIA1234567890AB")
            .set("secret_access_key", "secret")
            .set("account_id", "123456789012")
    }

    #[test]
    fn aws_full_input_validates() {
        assert!(validate(ProviderKind::AwsCostExplorer, &aws_input()).is_ok());
    }

    #[test]
    fn aws_missing_field_is_reported_by_label() {
        let input = RawSourceInput::new()
            .set("access_key_id", "AKIA1234567890AB")
            .set("account_id", "123456789012");
        let err = validate(ProviderKind::AwsCostExplorer, &input).unwrap_err();
        assert_eq!(err.missing_fields(), ["AWS Secret Access Key"]);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let input = RawSourceInput::new()
            .set("access_key_id", "   ")
            .set("secret_access_key", "")
            .set("account_id", "123456789012");
        let err = validate(ProviderKind::AwsCostExplorer, &input).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            ["AWS Access Key ID", "AWS Secret Access Key"]
        );
    }

    #[test]
    fn splunk_neither_auth_branch_fails() {
        let input = RawSourceInput::new()
            .set("splunk_host", "")
            .set("username", "")
            .set("password", "");
        let err = validate(ProviderKind::Splunk, &input).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            ["Splunk Host", "Auth Token or Username/Password"]
        );
    }

    #[test]
    fn splunk_token_branch_satisfies() {
        let input = RawSourceInput::new()
            .set("splunk_host", "splunk.example.com")
            .set("auth_token", "Splunk abc123");
        assert!(validate(ProviderKind::Splunk, &input).is_ok());
    }

    #[test]
    fn splunk_both_branches_accepted() {
        let input = RawSourceInput::new()
            .set("splunk_host", "splunk.example.com")
            .set("auth_token", "Splunk abc123")
            .set("username", "svc")
            .set("password", "hunter2");
        assert!(validate(ProviderKind::Splunk, &input).is_ok());
    }

    #[test]
    fn kubernetes_neither_branch_fails() {
        let err = validate(ProviderKind::KubernetesMetrics, &RawSourceInput::new()).unwrap_err();
        assert_eq!(
            err.missing_fields(),
            ["Kubeconfig Path or Cluster Endpoint + Service Account Token"]
        );
    }

    #[test]
    fn kubernetes_kubeconfig_alone_satisfies() {
        let input = RawSourceInput::new().set("kubeconfig_path", "~/.kube/config");
        assert!(validate(ProviderKind::KubernetesMetrics, &input).is_ok());
    }

    #[test]
    fn kubernetes_endpoint_requires_token() {
        let input = RawSourceInput::new().set("cluster_endpoint", "https://k8s:6443");
        assert!(validate(ProviderKind::KubernetesMetrics, &input).is_err());

        let input = input.set("service_account_token", "eyJhbGciOiJSUzI1");
        assert!(validate(ProviderKind::KubernetesMetrics, &input).is_ok());
    }

    #[test]
    fn kibana_host_list_of_blanks_fails() {
        let input = RawSourceInput::new()
            .set("elasticsearch_hosts", " , ,")
            .set("api_key", "key");
        let err = validate(ProviderKind::Kibana, &input).unwrap_err();
        assert_eq!(err.missing_fields(), ["Elasticsearch Hosts"]);
    }

    #[test]
    fn generic_kinds_always_validate() {
        for kind in [
            ProviderKind::GcpBilling,
            ProviderKind::DatadogLogs,
            ProviderKind::SharePoint,
        ] {
            assert!(validate(kind, &RawSourceInput::new()).is_ok());
        }
    }

    #[test]
    fn build_splits_and_trims_host_list() {
        let input = RawSourceInput::new()
            .set("elasticsearch_hosts", "https://es1:9200 , https://es2:9200")
            .set("api_key", "key");
        let config = build(ProviderKind::Kibana, &input);
        assert_eq!(
            config["elasticsearch_hosts"],
            json!(["https://es1:9200", "https://es2:9200"])
        );
        assert_eq!(config["api_key"], json!("key"));
        assert_eq!(config["cost_index_pattern"], json!("billing-*"));
    }

    #[test]
    fn build_coerces_splunk_port_with_default() {
        let input = RawSourceInput::new()
            .set("splunk_host", "splunk.example.com")
            .set("username", "svc")
            .set("password", "hunter2");
        let config = build(ProviderKind::Splunk, &input);
        assert_eq!(config["splunk_port"], json!(8089));
        assert_eq!(config["username"], json!("svc"));
        assert!(config.get("auth_token").is_none());

        let input = input.set("splunk_port", "9097");
        let config = build(ProviderKind::Splunk, &input);
        assert_eq!(config["splunk_port"], json!(9097));
    }

    #[test]
    fn build_prefers_token_branch_when_present() {
        let input = RawSourceInput::new()
            .set("splunk_host", "splunk.example.com")
            .set("auth_token", "Splunk abc123")
            .set("username", "svc")
            .set("password", "hunter2");
        let config = build(ProviderKind::Splunk, &input);
        assert_eq!(config["auth_token"], json!("Splunk abc123"));
        assert!(config.get("username").is_none());
    }

    #[test]
    fn every_built_config_carries_the_note() {
        for kind in ProviderKind::ALL {
            let config = build(kind, &RawSourceInput::new());
            assert_eq!(config["demo_note"], json!(CONFIG_NOTE), "kind {kind}");
        }
    }

    #[test]
    fn aws_build_applies_region_default() {
        let config = build(ProviderKind::AwsCostExplorer, &aws_input());
        assert_eq!(config["region"], json!("us-east-1"));
        assert_eq!(config["role_arn"], Value::Null);
    }
}
