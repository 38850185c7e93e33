//! Loader for techtweet configuration with YAML + environment overlays.
//!
//! Precedence, lowest to highest:
//!
//! 1. the built-in defaults ([`DEFAULT_YAML`]), which map the conventional
//!    secret variables (`APP_KEY`, `APP_SECRET`, `ACCESS_TOKEN`,
//!    `ACCESS_SECRET`, `GROQ_API_KEY`, `NEWS_API_KEY`) into place
//! 2. an optional YAML file (`--config`, `./techtweet.yaml`, or
//!    `~/.config/techtweet/techtweet.yaml`)
//! 3. `TECHTWEET__SECTION__KEY` environment variables
//!
//! After merging, `${VAR}` placeholders are expanded recursively. Any that
//! are still unresolved are replaced with an empty string, so an unset secret
//! reaches the clients as a blank credential and is reported there.
use config::{Config, Environment, File, FileFormat};
use regex::Regex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub mod schema;

pub use schema::{
    CounterKind, LlmConfig, LoggingConfig, NewsConfig, PipelineConfig, PromptStyleKind,
    ProviderKind, ScheduleConfig, ServerConfig, TechtweetConfig, TwitterConfig,
};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "TECHTWEET";
const CONFIG_FILE_NAME: &str = "techtweet.yaml";

/// Built-in defaults; secrets are pulled from the environment.
pub const DEFAULT_YAML: &str = r#"
twitter:
  app_key: "${APP_KEY}"
  app_secret: "${APP_SECRET}"
  access_token: "${ACCESS_TOKEN}"
  access_secret: "${ACCESS_SECRET}"
llm:
  provider: groq
  api_key: "${GROQ_API_KEY}"
  model: llama-3.3-70b-versatile
  temperature: 0.7
  max_tokens: 400
news:
  enabled: true
  api_key: "${NEWS_API_KEY}"
  category: technology
  language: en
  page_size: 5
pipeline:
  prompt_style: professional
  cycle_days: 100
  max_post_chars: 280
  attach_images: true
schedule:
  cron: "0 9 * * *"
  run_on_start: true
  total_days: 100
  counter: sequence
server:
  bind: "0.0.0.0:3000"
logging:
  format: text
  emit_stderr: true
  filter: info
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("config source error: {0}")]
    Source(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("could not render configuration: {0}")]
    Render(#[from] serde_yaml::Error),
}

fn placeholder_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}").ok())
        .as_ref()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded =
                        shellexpand::env_with_context_no_errors(&cur, |name| std::env::var(name).ok())
                            .into_owned();
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Replace `${VAR}` placeholders that survived expansion with "".
fn blank_unresolved(v: &mut Value) {
    match v {
        Value::String(s) => {
            if let Some(re) = placeholder_re() {
                if re.is_match(s) {
                    *s = re.replace_all(s, "").into_owned();
                }
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(blank_unresolved),
        Value::Object(obj) => obj.values_mut().for_each(blank_unresolved),
        _ => {}
    }
}

/// First existing file among `./techtweet.yaml` and the user config dir.
pub fn discover_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("techtweet").join(CONFIG_FILE_NAME);
    user.is_file().then_some(user)
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct TechtweetConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    use_env: bool,
}

impl Default for TechtweetConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TechtweetConfigLoader {
    /// Empty loader; `TECHTWEET__` env overrides are applied last at [`load`](Self::load).
    ///
    /// ```
    /// use techtweet_config::TechtweetConfigLoader;
    ///
    /// let config = TechtweetConfigLoader::new()
    ///     .with_yaml_str("schedule:\n  total_days: 30")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.schedule.total_days, 30);
    /// assert_eq!(config.schedule.cron, "0 9 * * *");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            use_env: true,
        }
    }

    /// Layer the built-in [`DEFAULT_YAML`] underneath everything else.
    pub fn with_defaults(self) -> Self {
        self.with_yaml_str(DEFAULT_YAML)
    }

    /// Attach a required YAML file.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::new(&path.as_ref().to_string_lossy(), FileFormat::Yaml).required(true));
        self
    }

    /// Attach a YAML file that may not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::new(&path.as_ref().to_string_lossy(), FileFormat::Yaml).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Skip `TECHTWEET__` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use techtweet_config::{PromptStyleKind, TechtweetConfigLoader};
    ///
    /// let config = TechtweetConfigLoader::new()
    ///     .with_defaults()
    ///     .with_yaml_str(r#"
    /// llm:
    ///   api_key: "${TECHTWEET_DOCTEST_SURELY_UNSET}"
    /// pipeline:
    ///   prompt_style: engaging
    /// "#)
    ///     .without_env()
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.llm.api_key, "");
    /// assert_eq!(config.pipeline.prompt_style, PromptStyleKind::Engaging);
    /// ```
    pub fn load(self) -> Result<TechtweetConfig, ConfigLoadError> {
        let mut builder = self.builder;
        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            );
        }
        let cfg = builder.build()?;

        // Convert to serde_json::Value first
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);
        blank_unresolved(&mut v);

        // Env overrides arrive as strings; config's deserializer coerces them
        // per field, so a numeric-looking secret stays a string.
        let typed: TechtweetConfig = Config::try_from(&v)?.try_deserialize()?;
        typed.validate().map_err(ConfigLoadError::Invalid)?;
        Ok(typed)
    }
}

impl TechtweetConfig {
    /// YAML rendering with secrets redacted.
    pub fn to_redacted_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(&self.redacted())?)
    }
}
