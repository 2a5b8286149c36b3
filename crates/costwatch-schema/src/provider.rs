//! Provider kinds
//!
//! The closed set of data-source providers the backend understands.
//! Adding a provider means adding a variant here and extending the
//! exhaustive match tables in [`crate::registry`] and [`crate::probe`] -
//! the compiler points at every site that needs a decision.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ParseProviderError;

/// A supported data-source provider.
///
/// The serialized form is the wire identifier the backend stores and
/// echoes back (`AWS_COST_EXPLORER_MOCK`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// AWS Cost Explorer billing data
    #[serde(rename = "AWS_COST_EXPLORER_MOCK")]
    AwsCostExplorer,
    /// Azure Cost Management billing data
    #[serde(rename = "AZURE_COST_MGMT_MOCK")]
    AzureCostManagement,
    /// Kubernetes cluster resource metrics
    #[serde(rename = "KUBERNETES_METRICS_MOCK")]
    KubernetesMetrics,
    /// GCP billing export
    #[serde(rename = "GCP_BILLING_MOCK")]
    GcpBilling,
    /// Datadog logs and metrics
    #[serde(rename = "DATADOG_LOGS_MOCK")]
    DatadogLogs,
    /// Splunk events and logs
    #[serde(rename = "SPLUNK_MOCK")]
    Splunk,
    /// Kibana / Elasticsearch logs and analytics
    #[serde(rename = "KIBANA_MOCK")]
    Kibana,
    /// SharePoint document storage
    #[serde(rename = "SHAREPOINT_MOCK")]
    SharePoint,
    /// Flat CSV billing export
    #[serde(rename = "CSV")]
    Csv,
}

impl ProviderKind {
    /// All provider kinds, in presentation order.
    pub const ALL: [ProviderKind; 9] = [
        ProviderKind::AwsCostExplorer,
        ProviderKind::AzureCostManagement,
        ProviderKind::KubernetesMetrics,
        ProviderKind::GcpBilling,
        ProviderKind::DatadogLogs,
        ProviderKind::Splunk,
        ProviderKind::Kibana,
        ProviderKind::SharePoint,
        ProviderKind::Csv,
    ];

    /// The identifier used on the wire.
    #[inline]
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            ProviderKind::AwsCostExplorer => "AWS_COST_EXPLORER_MOCK",
            ProviderKind::AzureCostManagement => "AZURE_COST_MGMT_MOCK",
            ProviderKind::KubernetesMetrics => "KUBERNETES_METRICS_MOCK",
            ProviderKind::GcpBilling => "GCP_BILLING_MOCK",
            ProviderKind::DatadogLogs => "DATADOG_LOGS_MOCK",
            ProviderKind::Splunk => "SPLUNK_MOCK",
            ProviderKind::Kibana => "KIBANA_MOCK",
            ProviderKind::SharePoint => "SHAREPOINT_MOCK",
            ProviderKind::Csv => "CSV",
        }
    }

    /// Human-readable product label.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::AwsCostExplorer => "AWS Cost Explorer",
            ProviderKind::AzureCostManagement => "Azure Cost Management",
            ProviderKind::KubernetesMetrics => "Kubernetes Cluster",
            ProviderKind::GcpBilling => "GCP Billing Export",
            ProviderKind::DatadogLogs => "Datadog Logs & Metrics",
            ProviderKind::Splunk => "Splunk Events & Logs",
            ProviderKind::Kibana => "Kibana Logs & Analytics",
            ProviderKind::SharePoint => "SharePoint Documents",
            ProviderKind::Csv => "CSV File",
        }
    }

    /// One-line description for selection lists.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProviderKind::AwsCostExplorer => {
                "Connect your AWS Cost Explorer data for real-time cost monitoring"
            }
            ProviderKind::AzureCostManagement => {
                "Connect Azure cost management for spend analysis"
            }
            ProviderKind::KubernetesMetrics => "Monitor Kubernetes resource costs and usage",
            ProviderKind::GcpBilling => "Connect GCP billing data for cost analysis",
            ProviderKind::DatadogLogs => "Monitor Datadog logging and metrics costs",
            ProviderKind::Splunk => "Monitor Splunk event ingestion and search costs",
            ProviderKind::Kibana => "Monitor Kibana indexing and search costs",
            ProviderKind::SharePoint => "Monitor SharePoint storage and document costs",
            ProviderKind::Csv => "Upload custom billing data from CSV files",
        }
    }

    /// Cleaned display name derived from the wire identifier: the
    /// `_MOCK` suffix stripped and the remaining words title-cased
    /// ("AWS_COST_EXPLORER_MOCK" -> "Aws Cost Explorer").
    #[must_use]
    pub fn display_name(&self) -> String {
        self.wire_name()
            .trim_end_matches("_MOCK")
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for ProviderKind {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.wire_name() == s)
            .ok_or_else(|| ParseProviderError(s.to_string()))
    }
}
