use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const DEFAULT_USER_PROMPT: &str = "How do I make a cake?";

#[derive(Debug, Deserialize)]
pub(crate) struct Config {
    pub(crate) endpoint: String,
    pub(crate) request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub(crate) defaults: PromptDefaults,
}

/// Seed texts for the two prompt editors.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PromptDefaults {
    pub(crate) system_prompt: Option<String>,
    pub(crate) user_prompt: Option<String>,
}

impl Config {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        validate_config(&config)?;
        Ok(config)
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS))
    }

    pub(crate) fn system_prompt(&self) -> &str {
        self.defaults
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub(crate) fn user_prompt(&self) -> &str {
        self.defaults
            .user_prompt
            .as_deref()
            .unwrap_or(DEFAULT_USER_PROMPT)
    }
}

fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.endpoint.trim().is_empty() {
        anyhow::bail!("config must set endpoint (host:port)");
    }
    if config.request_timeout_ms == Some(0) {
        anyhow::bail!("request_timeout_ms must be greater than zero");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_requires_endpoint() {
        let input = r#"
request_timeout_ms = 5000
"#;
        let parsed: Result<Config, _> = toml::from_str(input);
        assert!(parsed.is_err());
    }

    #[test]
    fn config_rejects_empty_endpoint() {
        let input = r#"
endpoint = "  "
"#;
        let parsed: Config = toml::from_str(input).unwrap();
        assert!(validate_config(&parsed).is_err());
    }

    #[test]
    fn config_rejects_zero_timeout() {
        let input = r#"
endpoint = "127.0.0.1:9470"
request_timeout_ms = 0
"#;
        let parsed: Config = toml::from_str(input).unwrap();
        assert!(validate_config(&parsed).is_err());
    }

    #[test]
    fn config_applies_prompt_defaults() {
        let input = r#"
endpoint = "127.0.0.1:9470"
"#;
        let parsed: Config = toml::from_str(input).unwrap();
        assert!(validate_config(&parsed).is_ok());
        assert_eq!(parsed.system_prompt(), "You are a helpful assistant.");
        assert_eq!(parsed.user_prompt(), "How do I make a cake?");
        assert_eq!(parsed.request_timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn config_accepts_custom_defaults() {
        let input = r#"
endpoint = "127.0.0.1:9470"
request_timeout_ms = 5000

[defaults]
system_prompt = "You are a strict auditor."
user_prompt = "Summarize this."
"#;
        let parsed: Config = toml::from_str(input).unwrap();
        assert!(validate_config(&parsed).is_ok());
        assert_eq!(parsed.system_prompt(), "You are a strict auditor.");
        assert_eq!(parsed.user_prompt(), "Summarize this.");
        assert_eq!(parsed.request_timeout(), Duration::from_millis(5000));
    }
}
