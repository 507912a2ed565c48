use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use gestor_cli::commands::{config, intents};
use gestor_core::config::LoadOptions;
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn intents_json_lists_every_command_for_administrators() {
    with_env(&[], || {
        let result = intents::run(LoadOptions::default(), true);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let names = intent_names(&payload);
        assert_eq!(names.len(), 9);
        assert_eq!(names.first().map(String::as_str), Some("ver_comandos"));
        assert_eq!(payload[0]["priority"], 1);
        assert_eq!(payload[0]["example"], "ver comandos");
    });
}

#[test]
fn intents_are_filtered_by_configured_role() {
    with_env(&[("GESTOR_ASSISTANT_ROLE", "vendedor")], || {
        let result = intents::run(LoadOptions::default(), true);
        assert_eq!(result.exit_code, 0);

        let names = intent_names(&parse_payload(&result.output));
        assert_eq!(names, ["ver_comandos", "consultar_inventario", "ventas_hoy", "registrar_gasto"]);
    });
}

#[test]
fn intents_text_output_names_the_role() {
    with_env(&[("GESTOR_ASSISTANT_ROLE", "almacenero")], || {
        let result = intents::run(LoadOptions::default(), false);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.starts_with("commands visible to `almacenero`"));
        assert!(result.output.contains("«producir 2 de pan de leche»"));
        assert!(!result.output.contains("generar_reporte"));
    });
}

#[test]
fn intents_report_config_failure() {
    with_env(&[("GESTOR_ASSISTANT_ROLE", "gerente")], || {
        let result = intents::run(LoadOptions::default(), true);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "intents");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_attributes_sources_and_redacts_token() {
    with_env(
        &[("GESTOR_BACKEND_API_TOKEN", "gst-super-secret"), ("GESTOR_LOG_LEVEL", "debug")],
        || {
            let dir = TempDir::new().expect("temp dir");
            let path = dir.path().join("gestor.toml");
            fs::write(&path, "[backend]\nbase_url = \"https://erp.example.com/api\"\n")
                .expect("write config");

            let result = config::run(LoadOptions {
                config_path: Some(path.clone()),
                require_file: true,
                ..LoadOptions::default()
            });
            assert_eq!(result.exit_code, 0);

            let output = result.output;
            assert!(!output.contains("super-secret"));
            assert!(output.contains(
                "- backend.api_token = gst-*** (source: env (GESTOR_BACKEND_API_TOKEN))"
            ));
            assert!(output.contains(&format!(
                "- backend.base_url = https://erp.example.com/api (source: file ({}))",
                path.display()
            )));
            assert!(output.contains("- backend.timeout_secs = 20 (source: default)"));
            assert!(output.contains("- logging.level = debug (source: env (GESTOR_LOG_LEVEL))"));
            assert!(output.contains("- assistant.role = administrador (source: default)"));
        },
    );
}

#[test]
fn config_reports_missing_required_file() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let result = config::run(LoadOptions {
            config_path: Some(dir.path().join("missing.toml")),
            require_file: true,
            ..LoadOptions::default()
        });
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn intent_names(payload: &Value) -> Vec<String> {
    payload
        .as_array()
        .expect("intents output should be an array")
        .iter()
        .filter_map(|entry| entry["name"].as_str().map(str::to_string))
        .collect()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "GESTOR_BACKEND_BASE_URL",
        "GESTOR_BACKEND_TIMEOUT_SECS",
        "GESTOR_BACKEND_API_TOKEN",
        "GESTOR_BACKEND_DEFAULT_IMAGE",
        "GESTOR_ASSISTANT_ROLE",
        "GESTOR_ASSISTANT_USER_ID",
        "GESTOR_REPORTS_OUTPUT_DIR",
        "GESTOR_LOGGING_LEVEL",
        "GESTOR_LOGGING_FORMAT",
        "GESTOR_LOG_LEVEL",
        "GESTOR_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
