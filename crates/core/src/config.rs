use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::{ProductCatalog, UnitOption};
use crate::domain::user::{ConversationUser, Role};
use crate::normalize::normalize;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub assistant: AssistantConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_token: Option<SecretString>,
    pub default_image: String,
}

#[derive(Clone, Debug)]
pub struct AssistantConfig {
    pub role: Role,
    pub user_id: i64,
    pub raw_material_type: String,
    pub product_types: Vec<String>,
    pub units: Vec<UnitOption>,
}

#[derive(Clone, Debug)]
pub struct ReportsConfig {
    pub output_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub backend_base_url: Option<String>,
    pub backend_api_token: Option<String>,
    pub role: Option<Role>,
    pub user_id: Option<i64>,
    pub reports_output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let catalog = ProductCatalog::default();
        Self {
            backend: BackendConfig {
                base_url: "http://localhost:3000/api".to_string(),
                timeout_secs: 20,
                api_token: None,
                default_image: catalog.default_image,
            },
            assistant: AssistantConfig {
                role: Role::Administrador,
                user_id: 1,
                raw_material_type: catalog.raw_material_type,
                product_types: catalog.product_types,
                units: catalog.units,
            },
            reports: ReportsConfig { output_dir: PathBuf::from("reportes") },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("gestor.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn product_catalog(&self) -> ProductCatalog {
        ProductCatalog {
            product_types: self.assistant.product_types.clone(),
            raw_material_type: self.assistant.raw_material_type.clone(),
            units: self.assistant.units.clone(),
            default_image: self.backend.default_image.clone(),
        }
    }

    pub fn conversation_user(&self) -> ConversationUser {
        ConversationUser::new(self.assistant.user_id, self.assistant.role)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(backend) = patch.backend {
            if let Some(base_url) = backend.base_url {
                self.backend.base_url = base_url;
            }
            if let Some(timeout_secs) = backend.timeout_secs {
                self.backend.timeout_secs = timeout_secs;
            }
            if let Some(api_token) = backend.api_token {
                self.backend.api_token = Some(SecretString::from(api_token));
            }
            if let Some(default_image) = backend.default_image {
                self.backend.default_image = default_image;
            }
        }

        if let Some(assistant) = patch.assistant {
            if let Some(role) = assistant.role {
                self.assistant.role = role;
            }
            if let Some(user_id) = assistant.user_id {
                self.assistant.user_id = user_id;
            }
            if let Some(raw_material_type) = assistant.raw_material_type {
                self.assistant.raw_material_type = raw_material_type;
            }
            if let Some(product_types) = assistant.product_types {
                self.assistant.product_types = product_types;
            }
            if let Some(units) = assistant.units {
                self.assistant.units = units;
            }
        }

        if let Some(reports) = patch.reports {
            if let Some(output_dir) = reports.output_dir {
                self.reports.output_dir = output_dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("GESTOR_BACKEND_BASE_URL") {
            self.backend.base_url = value;
        }
        if let Some(value) = read_env("GESTOR_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse_u64("GESTOR_BACKEND_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("GESTOR_BACKEND_API_TOKEN") {
            self.backend.api_token = Some(SecretString::from(value));
        }
        if let Some(value) = read_env("GESTOR_BACKEND_DEFAULT_IMAGE") {
            self.backend.default_image = value;
        }

        if let Some(value) = read_env("GESTOR_ASSISTANT_ROLE") {
            self.assistant.role = value.parse()?;
        }
        if let Some(value) = read_env("GESTOR_ASSISTANT_USER_ID") {
            self.assistant.user_id = parse_i64("GESTOR_ASSISTANT_USER_ID", &value)?;
        }

        if let Some(value) = read_env("GESTOR_REPORTS_OUTPUT_DIR") {
            self.reports.output_dir = PathBuf::from(value);
        }

        let log_level = read_env("GESTOR_LOGGING_LEVEL").or_else(|| read_env("GESTOR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("GESTOR_LOGGING_FORMAT").or_else(|| read_env("GESTOR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.backend_base_url {
            self.backend.base_url = base_url;
        }
        if let Some(api_token) = overrides.backend_api_token {
            self.backend.api_token = Some(SecretString::from(api_token));
        }
        if let Some(role) = overrides.role {
            self.assistant.role = role;
        }
        if let Some(user_id) = overrides.user_id {
            self.assistant.user_id = user_id;
        }
        if let Some(output_dir) = overrides.reports_output_dir {
            self.reports.output_dir = output_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_backend(&self.backend)?;
        validate_assistant(&self.assistant)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("gestor.toml"), PathBuf::from("config/gestor.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_backend(backend: &BackendConfig) -> Result<(), ConfigError> {
    let base_url = backend.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "backend.base_url must start with http:// or https://".to_string(),
        ));
    }

    if backend.timeout_secs == 0 || backend.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "backend.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(token) = &backend.api_token {
        if token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "backend.api_token must not be blank when set".to_string(),
            ));
        }
    }

    if backend.default_image.trim().is_empty() {
        return Err(ConfigError::Validation(
            "backend.default_image must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_assistant(assistant: &AssistantConfig) -> Result<(), ConfigError> {
    if assistant.product_types.is_empty() {
        return Err(ConfigError::Validation(
            "assistant.product_types must list at least one product type".to_string(),
        ));
    }

    let raw_material = normalize(&assistant.raw_material_type);
    let raw_material_known =
        assistant.product_types.iter().any(|product_type| normalize(product_type) == raw_material);
    if !raw_material_known {
        return Err(ConfigError::Validation(format!(
            "assistant.raw_material_type `{}` must be one of assistant.product_types",
            assistant.raw_material_type
        )));
    }

    if assistant.units.is_empty() {
        return Err(ConfigError::Validation(
            "assistant.units must list at least one unit of measure".to_string(),
        ));
    }

    if assistant.units.iter().any(|unit| unit.value.trim().is_empty() || unit.label.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "assistant.units entries need a non-empty value and label".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    backend: Option<BackendPatch>,
    assistant: Option<AssistantPatch>,
    reports: Option<ReportsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    api_token: Option<String>,
    default_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantPatch {
    role: Option<Role>,
    user_id: Option<i64>,
    raw_material_type: Option<String>,
    product_types: Option<Vec<String>>,
    units: Option<Vec<UnitOption>>,
}

#[derive(Debug, Default, Deserialize)]
struct ReportsPatch {
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
