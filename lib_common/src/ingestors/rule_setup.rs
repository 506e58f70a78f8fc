//! # Filter Rule Setup
//!
//! One-shot registration of server-side filter rules, the precondition for
//! the streaming session. The upstream contract is a POST with body
//! `{"add":[{"value":"<rule>"},…]}`; the response status and body are logged
//! and nothing else — registration failure is reported to the caller but by
//! policy never aborts the run.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::retrieve::ky_http::ApiClient;

/// One rule in the `add` payload.
#[derive(Debug, Clone, Serialize)]
pub struct RuleValue {
    /// The raw rule expression, e.g. `"chatgpt"` or `"#"`.
    pub value: String,
}

/// The rules-endpoint request body.
#[derive(Debug, Clone, Serialize)]
pub struct RulesPayload {
    /// Rules to register.
    pub add: Vec<RuleValue>,
}

impl RulesPayload {
    /// Builds the payload from plain rule strings.
    pub fn from_rules(rules: &[String]) -> Self {
        Self {
            add: rules
                .iter()
                .map(|rule| RuleValue { value: rule.clone() })
                .collect(),
        }
    }
}

/// Registers `rules` at `rules_url`, logging the outcome.
///
/// A non-2xx response is logged at error and surfaces as `Ok(false)`; only a
/// transport-level failure (after the client's transient retries) becomes an
/// `Err`. The caller decides what to do with either — the shipped binary logs
/// and keeps going, preserving the original permissive behavior.
pub async fn register_rules(
    client: &ApiClient,
    rules_url: &str,
    rules: &[String],
) -> anyhow::Result<bool> {
    for rule in rules {
        log::info!("Adding new rule: {}", rule);
    }
    let payload = RulesPayload::from_rules(rules);

    let response = client
        .request::<Value, RulesPayload>(Method::POST, rules_url, Some(payload))
        .await?;

    if response.success {
        log::info!(
            "Rules registered: HTTP {}, body: {}",
            response.status,
            response
                .data
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<empty>".to_string())
        );
        Ok(true)
    } else {
        log::error!(
            "Rule registration rejected: HTTP {}, body: {}",
            response.status,
            response.error_body.as_deref().unwrap_or("<empty>")
        );
        Ok(false)
    }
}
