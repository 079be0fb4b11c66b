//! Session configuration.
//!
//! `SessionConfig` gathers the tunables a client passes when it constructs a
//! [`NoteListSession`](crate::session::NoteListSession): drag activation
//! thresholds, draft policy, paging, and the server endpoint.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::http_base;

/// Server used when no endpoint has been configured.
pub const DEFAULT_ENDPOINT: &str = "https://note.lyb.pub";

const DEFAULT_ACTIVATION_DELAY_MS: u64 = 250;
const DEFAULT_ACTIVATION_TOLERANCE_PX: f64 = 5.0;
const DEFAULT_PAGE_SIZE: usize = 30;

/// How a present-but-empty draft is read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyDraftPolicy {
    /// An empty draft reads as "no draft" and falls back to server content.
    #[default]
    FallBackToServer,
    /// An empty draft is an intentional edit and reads back as `""`.
    KeepEmpty,
}

/// Hold delay and pointer tolerance a press must satisfy before it becomes a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DragActivationConfig {
    #[serde(default = "default_activation_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_activation_tolerance_px")]
    pub tolerance_px: f64,
}

impl DragActivationConfig {
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for DragActivationConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_ACTIVATION_DELAY_MS,
            tolerance_px: DEFAULT_ACTIVATION_TOLERANCE_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub drag_activation: DragActivationConfig,
    #[serde(default)]
    pub empty_draft_policy: EmptyDraftPolicy,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drag_activation: DragActivationConfig::default(),
            empty_draft_policy: EmptyDraftPolicy::default(),
            page_size: DEFAULT_PAGE_SIZE,
            endpoint: None,
        }
    }
}

impl SessionConfig {
    /// Parse a JSON config document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file, returning defaults when it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidInput("page_size must be positive".to_string()));
        }
        if !self.drag_activation.tolerance_px.is_finite() || self.drag_activation.tolerance_px < 0.0
        {
            return Err(Error::InvalidInput(
                "drag_activation.tolerance_px must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve an API path against the configured endpoint.
    pub fn endpoint_url(&self, path: &str) -> String {
        resolve_endpoint(self.endpoint.as_deref(), path)
    }
}

/// Join `path` onto the configured endpoint.
///
/// Surrounding quotes and whitespace are stripped from the endpoint. A missing
/// or non-http endpoint falls back to [`DEFAULT_ENDPOINT`].
pub fn resolve_endpoint(endpoint: Option<&str>, path: &str) -> String {
    let base = endpoint.and_then(http_base).unwrap_or_else(|| {
        if endpoint.is_some() {
            tracing::warn!("Invalid endpoint {:?}; using {}", endpoint, DEFAULT_ENDPOINT);
        }
        DEFAULT_ENDPOINT.to_string()
    });

    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base
    } else {
        format!("{base}/{path}")
    }
}

const fn default_activation_delay_ms() -> u64 {
    DEFAULT_ACTIVATION_DELAY_MS
}

const fn default_activation_tolerance_px() -> f64 {
    DEFAULT_ACTIVATION_TOLERANCE_PX
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_long_press_constraint() {
        let config = SessionConfig::default();
        assert_eq!(config.drag_activation.delay(), Duration::from_millis(250));
        assert!((config.drag_activation.tolerance_px - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.empty_draft_policy, EmptyDraftPolicy::FallBackToServer);
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = SessionConfig::from_json(r#"{"empty_draft_policy": "keep_empty"}"#).unwrap();
        assert_eq!(config.empty_draft_policy, EmptyDraftPolicy::KeepEmpty);
        assert_eq!(config.page_size, 30);
    }

    #[test]
    fn from_json_rejects_unknown_fields_and_zero_page_size() {
        assert!(SessionConfig::from_json(r#"{"unexpected": 1}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"page_size": 0}"#).is_err());
    }

    #[test]
    fn resolve_endpoint_strips_quotes_and_slashes() {
        assert_eq!(
            resolve_endpoint(Some("\"https://blinko.example.com/\""), "/api/v1/note/list"),
            "https://blinko.example.com/api/v1/note/list"
        );
    }

    #[test]
    fn endpoint_url_uses_configured_server() {
        let config = SessionConfig {
            endpoint: Some("https://blinko.example.com".to_string()),
            ..SessionConfig::default()
        };
        assert_eq!(
            config.endpoint_url("api/v1/note/upsert"),
            "https://blinko.example.com/api/v1/note/upsert"
        );
    }

    #[test]
    fn resolve_endpoint_falls_back_to_default() {
        assert_eq!(
            resolve_endpoint(None, "api/v1/note/list"),
            "https://note.lyb.pub/api/v1/note/list"
        );
        assert_eq!(
            resolve_endpoint(Some("blinko.local"), ""),
            "https://note.lyb.pub"
        );
    }
}
