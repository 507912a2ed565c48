use gestor_core::config::{AppConfig, LoadOptions};
use gestor_core::intents::{IntentRegistry, IntentSummary};

use super::CommandResult;

/// Lists the registered commands visible to the configured role.
pub fn run(options: LoadOptions, json: bool) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("intents", "config_validation", error.to_string(), 2)
        }
    };

    let registry = match IntentRegistry::standard() {
        Ok(registry) => registry,
        Err(error) => return CommandResult::failure("intents", "registry", error.to_string(), 1),
    };

    let role = config.assistant.role;
    let visible = registry
        .summaries()
        .into_iter()
        .filter(|summary| summary.roles.contains(&role.as_str()))
        .collect::<Vec<_>>();

    if json {
        return match serde_json::to_string_pretty(&visible) {
            Ok(output) => CommandResult::raw(output),
            Err(error) => {
                CommandResult::failure("intents", "serialization", error.to_string(), 1)
            }
        };
    }

    CommandResult::raw(render_text(role.as_str(), &visible))
}

fn render_text(role: &str, summaries: &[IntentSummary]) -> String {
    let mut lines = vec![format!("commands visible to `{role}` (matching priority order):")];
    for summary in summaries {
        lines.push(format!(
            "{priority:>2}. {name:<22} «{example}»  [{roles}]",
            priority = summary.priority,
            name = summary.name,
            example = summary.example,
            roles = summary.roles.join(", "),
        ));
    }
    lines.join("\n")
}
