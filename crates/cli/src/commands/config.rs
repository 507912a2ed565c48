use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gestor_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

use super::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = options.config_path.clone().or_else(detect_config_path);
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", error.to_string(), 2)
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let api_token = config
        .backend
        .api_token
        .as_ref()
        .map(|token| redact_token(token.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());
    let units = config
        .assistant
        .units
        .iter()
        .map(|unit| unit.value.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let fields = [
        field("backend.base_url", config.backend.base_url.clone(), &["GESTOR_BACKEND_BASE_URL"]),
        field(
            "backend.timeout_secs",
            config.backend.timeout_secs.to_string(),
            &["GESTOR_BACKEND_TIMEOUT_SECS"],
        ),
        field("backend.api_token", api_token, &["GESTOR_BACKEND_API_TOKEN"]),
        field(
            "backend.default_image",
            config.backend.default_image.clone(),
            &["GESTOR_BACKEND_DEFAULT_IMAGE"],
        ),
        field("assistant.role", config.assistant.role.as_str().to_string(), &["GESTOR_ASSISTANT_ROLE"]),
        field("assistant.user_id", config.assistant.user_id.to_string(), &["GESTOR_ASSISTANT_USER_ID"]),
        field("assistant.raw_material_type", config.assistant.raw_material_type.clone(), &[]),
        field("assistant.product_types", config.assistant.product_types.join(", "), &[]),
        field("assistant.units", units, &[]),
        field(
            "reports.output_dir",
            config.reports.output_dir.display().to_string(),
            &["GESTOR_REPORTS_OUTPUT_DIR"],
        ),
        field(
            "logging.level",
            config.logging.level.clone(),
            &["GESTOR_LOGGING_LEVEL", "GESTOR_LOG_LEVEL"],
        ),
        field(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            &["GESTOR_LOGGING_FORMAT", "GESTOR_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_keys) in fields {
        lines.push(render_line(key, &value, source(key, env_keys)));
    }

    CommandResult::raw(lines.join("\n"))
}

type Field = (&'static str, String, &'static [&'static str]);

fn field(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Field {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("gestor.toml"), PathBuf::from("config/gestor.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) =
        env_keys.iter().find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()))
    {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short prefix of `prefix-secret` style tokens; hides everything else.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
