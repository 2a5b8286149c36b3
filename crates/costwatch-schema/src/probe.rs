//! Connection-test simulator
//!
//! Emulates an asynchronous provider probe without any network access so
//! operators can sanity-check a configuration before submitting it. The
//! outcome is a deterministic function of the field rules in
//! [`crate::registry`] plus light format checks; only the latency is
//! randomized.
//!
//! A probe is informational: a failure never blocks submission, and
//! running one never mutates any state.

use rand::Rng;
use std::time::Duration;

use crate::provider::ProviderKind;
use crate::registry::{split_host_list, RawSourceInput};

/// Simulated probe latency window.
#[derive(Debug, Clone, Copy)]
pub struct ProbeConfig {
    /// Fixed delay before the outcome is reported
    pub base_delay: Duration,
    /// Upper bound of the random jitter added on top
    pub jitter: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            jitter: Duration::from_secs(1),
        }
    }
}

impl ProbeConfig {
    /// Zero-latency configuration for tests.
    #[inline]
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

/// Why a simulated probe failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    /// A required credential field (or branch) is absent
    #[error("connection failed: {0}")]
    MissingCredentials(String),
    /// A field is present but malformed
    #[error("connection failed: {0}")]
    BadFieldFormat(String),
}

/// Run the simulated connection test for `kind` against raw form input.
///
/// Resolves after the configured latency window. Kinds without a
/// specific scenario always succeed with a generic message derived from
/// the kind's display name.
///
/// # Errors
/// [`ProbeFailure`] describing the first unsatisfied requirement.
pub async fn run_probe(
    kind: ProviderKind,
    input: &RawSourceInput,
    config: ProbeConfig,
) -> Result<String, ProbeFailure> {
    let jitter_ms = config.jitter.as_millis() as u64;
    let jitter = if jitter_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    };
    tokio::time::sleep(config.base_delay + jitter).await;

    probe_outcome(kind, input)
}

/// The deterministic part of the probe, separated from the latency
/// simulation.
fn probe_outcome(kind: ProviderKind, input: &RawSourceInput) -> Result<String, ProbeFailure> {
    match kind {
        ProviderKind::AwsCostExplorer => {
            let access_key = input.get("access_key_id");
            if access_key.is_none()
                || !input.has("secret_access_key")
                || !input.has("account_id")
            {
                return Err(ProbeFailure::MissingCredentials(
                    "missing required AWS credentials".to_string(),
                ));
            }
            if access_key.is_some_and(|k| k.len() < 16) {
                return Err(ProbeFailure::BadFieldFormat(
                    "invalid AWS access key format".to_string(),
                ));
            }
            Ok("AWS connection successful: found 3 services: EC2 ($234.50), S3 ($89.20), RDS ($156.30)"
                .to_string())
        }
        ProviderKind::KubernetesMetrics => {
            let kubeconfig = input.has("kubeconfig_path");
            let endpoint = input.has("cluster_endpoint");
            if !kubeconfig && !endpoint {
                return Err(ProbeFailure::MissingCredentials(
                    "either kubeconfig path or cluster endpoint required".to_string(),
                ));
            }
            if endpoint && !input.has("service_account_token") {
                return Err(ProbeFailure::MissingCredentials(
                    "service account token required for remote clusters".to_string(),
                ));
            }
            Ok("Kubernetes connection successful: found 2 namespaces: production (15 pods), staging (8 pods)"
                .to_string())
        }
        ProviderKind::Splunk => {
            if !input.has("splunk_host") {
                return Err(ProbeFailure::MissingCredentials(
                    "Splunk host required".to_string(),
                ));
            }
            if !input.has("auth_token") && !(input.has("username") && input.has("password")) {
                return Err(ProbeFailure::MissingCredentials(
                    "username/password or auth token required".to_string(),
                ));
            }
            Ok("Splunk connection successful: found billing index with 45,000 events (last 7 days)"
                .to_string())
        }
        ProviderKind::Kibana => {
            if input
                .get("elasticsearch_hosts")
                .map(split_host_list)
                .unwrap_or_default()
                .is_empty()
            {
                return Err(ProbeFailure::MissingCredentials(
                    "Elasticsearch hosts required".to_string(),
                ));
            }
            if !input.has("api_key") && !(input.has("username") && input.has("password")) {
                return Err(ProbeFailure::MissingCredentials(
                    "username/password or API key required".to_string(),
                ));
            }
            Ok("Kibana connection successful: found cost data in 3 indices: billing-2024.*, logs-app-*, metrics-infra-*"
                .to_string())
        }
        ProviderKind::AzureCostManagement
        | ProviderKind::GcpBilling
        | ProviderKind::DatadogLogs
        | ProviderKind::SharePoint
        | ProviderKind::Csv => Ok(format!("{} connection successful", kind.display_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn aws_probe_rejects_short_access_key() {
        let input = RawSourceInput::new()
            .set("access_key_id", "AKIA123")
            .set("secret_access_key", "secret")
            .set("account_id", "123456789012");
        let err = run_probe(ProviderKind::AwsCostExplorer, &input, ProbeConfig::immediate())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ProbeFailure::BadFieldFormat("invalid AWS access key format".to_string())
        );
    }

    #[tokio::test]
    async fn aws_probe_accepts_full_credentials() {
        let input = RawSourceInput::new()
            .set("access_key_id", "AKIA1234567890AB")
            .set("secret_access_key", "secret")
            .set("account_id", "123456789012");
        let detail = run_probe(ProviderKind::AwsCostExplorer, &input, ProbeConfig::immediate())
            .await
            .unwrap();
        assert!(detail.contains("EC2"));
    }

    #[tokio::test]
    async fn kubernetes_probe_requires_token_for_remote_endpoint() {
        let input = RawSourceInput::new().set("cluster_endpoint", "https://k8s:6443");
        let err = run_probe(
            ProviderKind::KubernetesMetrics,
            &input,
            ProbeConfig::immediate(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("service account token"));
    }

    #[tokio::test]
    async fn splunk_probe_requires_one_auth_branch() {
        let input = RawSourceInput::new().set("splunk_host", "splunk.example.com");
        let err = run_probe(ProviderKind::Splunk, &input, ProbeConfig::immediate())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("auth token"));
    }

    #[tokio::test]
    async fn unscripted_kinds_succeed_generically() {
        let detail = run_probe(
            ProviderKind::SharePoint,
            &RawSourceInput::new(),
            ProbeConfig::immediate(),
        )
        .await
        .unwrap();
        assert_eq!(detail, "Sharepoint connection successful");
    }
}
