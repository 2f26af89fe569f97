//! Application configuration for the advisor.
//!
//! User config lives at `~/.advisor/advisor.toml`.
//! CLI flags override config file values, which override defaults.
//! The credential itself is never stored; the file names the env var holding it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AdvisorError, Result};
use crate::types::{AgentKind, GenerationOptions};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "advisor.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".advisor";

// ---------------------------------------------------------------------------
// Config structs (matching advisor.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion service settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Per-kind sampling overrides, keyed by [`AgentKind::as_str`].
    #[serde(default)]
    pub agents: BTreeMap<String, AgentOverride>,
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// OpenAI-compatible API root (`/chat/completions` is appended).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".into()
}
fn default_model() -> String {
    "llama3-8b-8192".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[agents.<kind>]` entry. Unset fields keep the kind's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl AppConfig {
    /// Effective sampling options for `kind`: defaults with overrides applied.
    pub fn options_for(&self, kind: AgentKind) -> Result<GenerationOptions> {
        let mut options = kind.default_options();
        if let Some(o) = self.agents.get(kind.as_str()) {
            if let Some(t) = o.temperature {
                options.temperature = t;
            }
            if let Some(m) = o.max_tokens {
                options.max_tokens = m;
            }
        }
        options
            .validate()
            .map_err(|e| AdvisorError::config(format!("[agents.{kind}]: {e}")))?;
        Ok(options)
    }
}

// ---------------------------------------------------------------------------
// Resolved completion settings (runtime, merged from config + env + flags)
// ---------------------------------------------------------------------------

/// Everything needed to construct a completion client.
#[derive(Clone)]
pub struct CompletionSettings {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CompletionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSettings")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Resolve completion settings, reading the credential from the configured
/// env var. Fails with a config error when the key is missing or blank.
pub fn resolve_completion_settings(config: &CompletionConfig) -> Result<CompletionSettings> {
    let base_url = Url::parse(&config.base_url).map_err(|e| {
        AdvisorError::config(format!("invalid completion base_url '{}': {e}", config.base_url))
    })?;

    if config.model.trim().is_empty() {
        return Err(AdvisorError::config("completion model must not be blank"));
    }
    if config.timeout_secs == 0 {
        return Err(AdvisorError::config("completion timeout_secs must be positive"));
    }

    let var_name = &config.api_key_env;
    let api_key = match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => {
            return Err(AdvisorError::config(format!(
                "completion API key not found. Set the {var_name} environment variable."
            )));
        }
    };

    Ok(CompletionSettings {
        base_url,
        api_key,
        model: config.model.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    })
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.advisor/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| AdvisorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.advisor/advisor.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AdvisorError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| AdvisorError::config(format!("failed to parse {}: {e}", path.display())))?;

    for key in config.agents.keys() {
        let kind: AgentKind = key
            .parse()
            .map_err(|_| AdvisorError::config(format!("unknown agent table [agents.{key}]")))?;
        config.options_for(kind)?;
    }

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| AdvisorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| AdvisorError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| AdvisorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("GROQ_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.completion.timeout_secs, 30);
        assert_eq!(parsed.completion.model, "llama3-8b-8192");
    }

    #[test]
    fn agent_overrides_apply_on_top_of_defaults() {
        let toml_str = r#"
[agents.outreach]
temperature = 0.5

[agents.tag_classification]
max_tokens = 40
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");

        let outreach = config.options_for(AgentKind::Outreach).unwrap();
        assert_eq!(outreach.temperature, 0.5);
        assert_eq!(outreach.max_tokens, 800);

        let tags = config.options_for(AgentKind::TagClassification).unwrap();
        assert_eq!(tags.temperature, 0.4);
        assert_eq!(tags.max_tokens, 40);

        let strategy = config.options_for(AgentKind::Strategy).unwrap();
        assert_eq!(strategy, AgentKind::Strategy.default_options());
    }

    #[test]
    fn load_rejects_unknown_agent_table() {
        let path = std::env::temp_dir().join(format!(
            "advisor_cfg_{}_{}.toml",
            std::process::id(),
            line!()
        ));
        std::fs::write(&path, "[agents.poetry]\ntemperature = 0.1\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("agents.poetry"));
    }

    #[test]
    fn load_rejects_out_of_range_override() {
        let path = std::env::temp_dir().join(format!(
            "advisor_cfg_{}_{}.toml",
            std::process::id(),
            line!()
        ));
        std::fs::write(&path, "[agents.strategy]\nmax_tokens = 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn api_key_resolution() {
        let mut config = CompletionConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.api_key_env = "ADVISOR_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_completion_settings(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn settings_debug_redacts_key() {
        let settings = CompletionSettings {
            base_url: Url::parse("https://api.example.com/v1").unwrap(),
            api_key: "sk-secret".into(),
            model: "m".into(),
            timeout: Duration::from_secs(1),
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let config = CompletionConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        let err = resolve_completion_settings(&config).unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }
}
