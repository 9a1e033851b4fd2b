use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{AnomalyType, DetectionConfig, HealthWeights, RuntimeConfig};

use crate::config::validation::{validate_detection, validate_health};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    /// JSON-lines file the audit log is mirrored to and replayed from.
    pub audit_log_path: Option<String>,
    pub classifier_url: Option<String>,
    pub classifier_timeout_seconds: u64,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub recent_alerts_limit: usize,
    pub leak_scan_hour: u32,
    pub leak_scan_minute: u32,
    pub audit_retry_seconds: u64,
    pub detection: DetectionConfig,
    pub health: HealthWeights,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            api_token: None,
            audit_log_path: None,
            classifier_url: None,
            classifier_timeout_seconds: 5,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            recent_alerts_limit: runtime.recent_alerts_limit,
            leak_scan_hour: runtime.leak_scan_hour,
            leak_scan_minute: runtime.leak_scan_minute,
            audit_retry_seconds: runtime.audit_retry_seconds,
            detection: runtime.detection,
            health: runtime.health,
        }
    }
}

impl AppConfig {
    /// Reads `LEDGERGUARD_CONFIG` (default `./config.toml`). A missing file
    /// falls back to defaults.
    pub async fn load() -> Result<Self> {
        let path = env::var("LEDGERGUARD_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &str) -> Result<Self> {
        let file_path = Path::new(path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::parse(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(file_path.parent());
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        self.api_token = blank_to_none(self.api_token.take());
        self.audit_log_path = blank_to_none(self.audit_log_path.take());
        self.classifier_url = blank_to_none(self.classifier_url.take());
        self.detection.disabled_rules.sort_by_key(|kind| kind.as_str());
        self.detection.disabled_rules.dedup();
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(path) = &self.audit_log_path {
            self.audit_log_path = Some(resolve_path(base, path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.leak_scan_hour > 23 || self.leak_scan_minute > 59 {
            return Err(anyhow!("leak_scan_hour or leak_scan_minute out of range"));
        }
        if self.audit_retry_seconds == 0 {
            return Err(anyhow!("audit_retry_seconds must be greater than 0"));
        }
        if let Some(url) = &self.classifier_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("classifier_url must be an http(s) url"));
            }
        }
        validate_detection(&self.detection)?;
        validate_health(&self.health)?;
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            recent_alerts_limit: self.recent_alerts_limit,
            leak_scan_hour: self.leak_scan_hour,
            leak_scan_minute: self.leak_scan_minute,
            audit_retry_seconds: self.audit_retry_seconds,
            detection: self.detection.clone(),
            health: self.health,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("LEDGERGUARD_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("LEDGERGUARD_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("LEDGERGUARD_AUDIT_LOG_PATH") {
            self.audit_log_path = Some(value);
        }
        if let Ok(value) = env::var("LEDGERGUARD_CLASSIFIER_URL") {
            self.classifier_url = Some(value);
        }
        if let Ok(value) = env::var("LEDGERGUARD_CLASSIFIER_TIMEOUT_SECONDS") {
            self.classifier_timeout_seconds = value.parse().unwrap_or(self.classifier_timeout_seconds);
        }
        if let Ok(value) = env::var("LEDGERGUARD_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("LEDGERGUARD_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("LEDGERGUARD_RECENT_ALERTS_LIMIT") {
            self.recent_alerts_limit = value.parse().unwrap_or(self.recent_alerts_limit);
        }
        if let Ok(value) = env::var("LEDGERGUARD_LEAK_SCAN_HOUR") {
            self.leak_scan_hour = value.parse().unwrap_or(self.leak_scan_hour);
        }
        if let Ok(value) = env::var("LEDGERGUARD_LEAK_SCAN_MINUTE") {
            self.leak_scan_minute = value.parse().unwrap_or(self.leak_scan_minute);
        }
        if let Ok(value) = env::var("LEDGERGUARD_AUDIT_RETRY_SECONDS") {
            self.audit_retry_seconds = value.parse().unwrap_or(self.audit_retry_seconds);
        }
        if let Ok(value) = env::var("LEDGERGUARD_DISABLED_RULES") {
            self.detection.disabled_rules = parse_rule_list(&value);
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|item| !item.trim().is_empty())
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_rule_list(value: &str) -> Vec<AnomalyType> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .filter_map(|item| match item.parse::<AnomalyType>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                warn!("ignoring unknown rule '{}' in LEDGERGUARD_DISABLED_RULES", item);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_tables_override_defaults() {
        let config = AppConfig::parse(
            r#"
bind_addr = "0.0.0.0:8080"
api_token = "   "

[detection]
spike_stddev_k = 3.0
disabled_rules = ["ODD_TIME_PATTERN"]

[health]
penalty_high = 20
"#,
        )
        .expect("parse config");
        let mut config = config;
        config.normalize();
        config.validate().expect("valid config");

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert!(config.api_token.is_none());
        assert_eq!(config.detection.spike_stddev_k, 3.0);
        assert_eq!(config.detection.leak_min_count, 5);
        assert!(!config.detection.is_enabled(AnomalyType::OddTimePattern));
        assert_eq!(config.health.penalty_high, 20);
        assert_eq!(config.health.penalty_low, 3);

        let runtime = config.to_runtime_config();
        assert_eq!(runtime.detection.spike_stddev_k, 3.0);
        assert_eq!(runtime.recent_alerts_limit, 5);
    }

    #[test]
    fn validate_rejects_bad_schedule() {
        let config = AppConfig {
            leak_scan_hour: 24,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_audit_path_follows_config_file() {
        let mut config = AppConfig {
            audit_log_path: Some("audit.jsonl".to_string()),
            ..AppConfig::default()
        };
        config.resolve_paths(Some(Path::new("/etc/ledgerguard")));
        assert_eq!(
            config.audit_log_path.as_deref(),
            Some("/etc/ledgerguard/audit.jsonl")
        );
    }

    #[test]
    fn rule_list_skips_unknown_names() {
        let rules = parse_rule_list("SILENT_LEAK, nope ,DUPLICATE_TRANSACTION");
        assert_eq!(
            rules,
            vec![AnomalyType::SilentLeak, AnomalyType::DuplicateTransaction]
        );
    }
}
