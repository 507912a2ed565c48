//! Intent registry. Registry order is the matching priority: the first
//! pattern that matches the raw utterance wins, so more specific commands
//! must be registered before broader ones.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::commands::finance::{ExpensesToday, RegisterExpense, SalesToday};
use crate::commands::help::ShowCommands;
use crate::commands::product::{AddProduct, CheckInventory};
use crate::commands::report::GenerateReport;
use crate::commands::transformation::{RunTransformation, TransformationsToday};
use crate::context::Turn;
use crate::domain::user::Role;
use crate::errors::TurnError;

const EVERYONE: &[Role] = &[Role::Administrador, Role::Vendedor, Role::Almacenero];
const ADMIN: &[Role] = &[Role::Administrador];
const WAREHOUSE: &[Role] = &[Role::Administrador, Role::Almacenero];
const SALES: &[Role] = &[Role::Administrador, Role::Vendedor];

/// Optional trailing punctuation a dictation engine tends to append.
const TAIL: &str = r"\s*[.!?]*\s*$";
const HEAD: &str = r"^\s*[¿¡]?\s*";

#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError>;
}

#[derive(Debug, Error)]
pub enum IntentRegistryError {
    #[error("intent `{name}` has an invalid pattern: {source}")]
    InvalidPattern { name: String, source: regex::Error },
    #[error("intent `{0}` is registered twice")]
    DuplicateName(String),
}

/// Named captures of a matched utterance, owned so handlers can outlive it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntentMatch {
    pub intent: &'static str,
    pub utterance: String,
    groups: HashMap<String, String>,
}

impl IntentMatch {
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str).filter(|value| !value.trim().is_empty())
    }
}

pub struct CommandDescriptor {
    pub name: &'static str,
    pub pattern: Regex,
    pub example: &'static str,
    pub visible_to: &'static [Role],
    handler: Arc<dyn IntentHandler>,
}

impl CommandDescriptor {
    pub fn new<H>(
        name: &'static str,
        pattern: &str,
        example: &'static str,
        visible_to: &'static [Role],
        handler: H,
    ) -> Result<Self, IntentRegistryError>
    where
        H: IntentHandler + 'static,
    {
        let pattern = Regex::new(pattern).map_err(|source| IntentRegistryError::InvalidPattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self { name, pattern, example, visible_to, handler: Arc::new(handler) })
    }

    pub fn handler(&self) -> &dyn IntentHandler {
        self.handler.as_ref()
    }

    pub fn is_visible_to(&self, role: Role) -> bool {
        self.visible_to.contains(&role)
    }

    pub fn captures(&self, utterance: &str) -> Option<IntentMatch> {
        let captures = self.pattern.captures(utterance)?;
        let groups = self
            .pattern
            .capture_names()
            .flatten()
            .filter_map(|group| {
                captures.name(group).map(|value| (group.to_string(), value.as_str().trim().to_string()))
            })
            .collect();

        Some(IntentMatch { intent: self.name, utterance: utterance.to_string(), groups })
    }
}

/// Serializable view used by the help command and `gestor intents`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IntentSummary {
    pub priority: usize,
    pub name: &'static str,
    pub example: &'static str,
    pub roles: Vec<&'static str>,
}

#[derive(Default)]
pub struct IntentRegistry {
    commands: Vec<CommandDescriptor>,
    names: HashSet<&'static str>,
}

impl IntentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The assistant's built-in commands in priority order.
    pub fn standard() -> Result<Self, IntentRegistryError> {
        let mut registry = Self::new();

        registry.register(CommandDescriptor::new(
            "ver_comandos",
            &format!(r"(?i){HEAD}(?:ver\s+(?:los\s+)?comandos|comandos|ayuda|qu[eé]\s+puedo\s+(?:hacer|decir)){TAIL}"),
            "ver comandos",
            EVERYONE,
            ShowCommands,
        )?)?;
        registry.register(CommandDescriptor::new(
            "agregar_producto",
            &format!(r"(?i){HEAD}(?:agregar|crear|registrar|añadir|anadir)\s+(?:el\s+|un\s+)?producto\s+(?P<nombre>.+?){TAIL}"),
            "agregar producto Queso Fresco",
            WAREHOUSE,
            AddProduct,
        )?)?;
        registry.register(CommandDescriptor::new(
            "consultar_inventario",
            &format!(r"(?i){HEAD}(?:(?:consultar|ver|revisar)\s+(?:el\s+)?inventario(?:\s+de)?|stock\s+de|cu[aá]nto\s+hay\s+de)\s+(?P<nombre>.+?){TAIL}"),
            "consultar inventario de azúcar",
            EVERYONE,
            CheckInventory,
        )?)?;
        registry.register(CommandDescriptor::new(
            "generar_reporte",
            &format!(r"(?i){HEAD}(?:generar|crear|descargar)\s+(?:un\s+|el\s+)?reportes?(?:\s+(?:de|del)\s+(?P<modulo>.+?))?{TAIL}"),
            "generar reporte de ventas",
            ADMIN,
            GenerateReport,
        )?)?;
        registry.register(CommandDescriptor::new(
            "transformaciones_hoy",
            &format!(r"(?i){HEAD}(?:ver\s+)?(?:las\s+)?transformaciones\s+(?:de\s+)?hoy{TAIL}"),
            "transformaciones de hoy",
            WAREHOUSE,
            TransformationsToday,
        )?)?;
        registry.register(CommandDescriptor::new(
            "transformacion",
            &format!(r"(?i){HEAD}(?:transformar|producir)\s+(?P<cantidad>\S+)\s+(?:de\s+)?(?P<receta>.+?){TAIL}"),
            "producir 2 de pan de leche",
            WAREHOUSE,
            RunTransformation,
        )?)?;
        registry.register(CommandDescriptor::new(
            "ventas_hoy",
            &format!(r"(?i){HEAD}(?:ver\s+)?(?:las\s+)?ventas\s+(?:de\s+)?hoy{TAIL}"),
            "ventas de hoy",
            SALES,
            SalesToday,
        )?)?;
        registry.register(CommandDescriptor::new(
            "gastos_hoy",
            &format!(r"(?i){HEAD}(?:ver\s+)?(?:los\s+)?gastos\s+(?:de\s+)?hoy{TAIL}"),
            "gastos de hoy",
            ADMIN,
            ExpensesToday,
        )?)?;
        registry.register(CommandDescriptor::new(
            "registrar_gasto",
            &format!(r"(?i){HEAD}(?:registrar|agregar|anotar)\s+(?:un\s+)?gasto\s+(?:de\s+)?\$?(?P<monto>[\w.,]+)\s+(?:en|por|para)\s+(?P<descripcion>.+?){TAIL}"),
            "registrar gasto de 25,50 en gas",
            SALES,
            RegisterExpense,
        )?)?;

        Ok(registry)
    }

    pub fn register(&mut self, command: CommandDescriptor) -> Result<(), IntentRegistryError> {
        if !self.names.insert(command.name) {
            return Err(IntentRegistryError::DuplicateName(command.name.to_string()));
        }
        self.commands.push(command);
        Ok(())
    }

    /// First command, in priority order, whose pattern matches `utterance`.
    pub fn find(&self, utterance: &str) -> Option<(&CommandDescriptor, IntentMatch)> {
        self.commands
            .iter()
            .find_map(|command| command.captures(utterance).map(|matched| (command, matched)))
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn visible_to(&self, role: Role) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter().filter(move |command| command.is_visible_to(role))
    }

    pub fn summaries(&self) -> Vec<IntentSummary> {
        self.commands
            .iter()
            .enumerate()
            .map(|(index, command)| IntentSummary {
                priority: index + 1,
                name: command.name,
                example: command.example,
                roles: command.visible_to.iter().map(Role::as_str).collect(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::user::Role;

    use super::{IntentRegistry, IntentRegistryError};

    fn registry() -> IntentRegistry {
        IntentRegistry::standard().expect("standard registry should compile")
    }

    fn matched(utterance: &str) -> Option<&'static str> {
        registry().find(utterance).map(|(command, _)| command.name)
    }

    #[test]
    fn priority_order_is_stable() {
        let names = registry().commands().iter().map(|command| command.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "ver_comandos",
                "agregar_producto",
                "consultar_inventario",
                "generar_reporte",
                "transformaciones_hoy",
                "transformacion",
                "ventas_hoy",
                "gastos_hoy",
                "registrar_gasto",
            ]
        );
    }

    #[test]
    fn every_example_matches_its_own_intent() {
        let registry = registry();
        for command in registry.commands() {
            let (winner, _) = registry
                .find(command.example)
                .unwrap_or_else(|| panic!("example `{}` matched nothing", command.example));
            assert_eq!(winner.name, command.name, "example `{}`", command.example);
        }
    }

    #[test]
    fn ver_comandos_matches_help_phrases() {
        assert_eq!(matched("Ver comandos"), Some("ver_comandos"));
        assert_eq!(matched("ayuda."), Some("ver_comandos"));
        assert_eq!(matched("¿Qué puedo hacer?"), Some("ver_comandos"));
        assert_eq!(matched("ver comandos de ventas"), None);
    }

    #[test]
    fn agregar_producto_keeps_the_name_as_typed() {
        let registry = registry();
        let (command, matched) =
            registry.find("Agregar producto Queso Fresco.").expect("should match");
        assert_eq!(command.name, "agregar_producto");
        assert_eq!(matched.group("nombre"), Some("Queso Fresco"));

        let (_, matched) = registry.find("añadir un producto Té Verde").expect("should match");
        assert_eq!(matched.group("nombre"), Some("Té Verde"));
    }

    #[test]
    fn consultar_inventario_accepts_several_phrasings() {
        let registry = registry();
        for utterance in ["consultar inventario de Azúcar", "stock de Azúcar", "¿Cuánto hay de Azúcar?"] {
            let (command, matched) = registry.find(utterance).expect("should match");
            assert_eq!(command.name, "consultar_inventario", "{utterance}");
            assert_eq!(matched.group("nombre"), Some("Azúcar"), "{utterance}");
        }
    }

    #[test]
    fn generar_reporte_captures_an_optional_module() {
        let registry = registry();
        let (command, matched) = registry.find("generar reporte").expect("should match");
        assert_eq!(command.name, "generar_reporte");
        assert_eq!(matched.group("modulo"), None);

        let (_, matched) = registry.find("Descargar reportes de ventas").expect("should match");
        assert_eq!(matched.group("modulo"), Some("ventas"));
    }

    #[test]
    fn transformaciones_hoy_wins_over_transformacion() {
        assert_eq!(matched("transformaciones de hoy"), Some("transformaciones_hoy"));
        assert_eq!(matched("ver transformaciones hoy"), Some("transformaciones_hoy"));
    }

    #[test]
    fn transformacion_captures_quantity_and_recipe() {
        let registry = registry();
        let (command, matched) = registry.find("producir 2,5 de Pan de leche").expect("should match");
        assert_eq!(command.name, "transformacion");
        assert_eq!(matched.group("cantidad"), Some("2,5"));
        assert_eq!(matched.group("receta"), Some("Pan de leche"));

        let (_, matched) = registry.find("transformar dos salsa").expect("should match");
        assert_eq!(matched.group("cantidad"), Some("dos"));
        assert_eq!(matched.group("receta"), Some("salsa"));
    }

    #[test]
    fn daily_summaries_match() {
        assert_eq!(matched("ventas de hoy"), Some("ventas_hoy"));
        assert_eq!(matched("Ver las ventas hoy!"), Some("ventas_hoy"));
        assert_eq!(matched("gastos de hoy"), Some("gastos_hoy"));
        assert_eq!(matched("ventas por producto"), None);
    }

    #[test]
    fn registrar_gasto_captures_amount_and_description() {
        let registry = registry();
        let (command, matched) =
            registry.find("Registrar gasto de $25,50 en gas para la cocina").expect("should match");
        assert_eq!(command.name, "registrar_gasto");
        assert_eq!(matched.group("monto"), Some("25,50"));
        assert_eq!(matched.group("descripcion"), Some("gas para la cocina"));
    }

    #[test]
    fn step_answers_do_not_trigger_intents() {
        for answer in ["sí", "Insumo", "kg", "Bebidas", "ventas", "Reporte de ventas", "Stock bajo", "excel"] {
            assert_eq!(matched(answer), None, "{answer} must stay inside the flow");
        }
    }

    #[test]
    fn help_visibility_depends_on_role() {
        let registry = registry();
        let seller = registry.visible_to(Role::Vendedor).map(|command| command.name).collect::<Vec<_>>();
        assert!(seller.contains(&"ventas_hoy"));
        assert!(!seller.contains(&"generar_reporte"));
        assert!(!seller.contains(&"agregar_producto"));

        let admin = registry.visible_to(Role::Administrador).count();
        assert_eq!(admin, registry.len());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        let duplicate = super::CommandDescriptor::new(
            "ventas_hoy",
            "(?i)^ventas$",
            "ventas",
            super::EVERYONE,
            crate::commands::finance::SalesToday,
        )
        .expect("pattern compiles");

        assert!(matches!(
            registry.register(duplicate),
            Err(IntentRegistryError::DuplicateName(name)) if name == "ventas_hoy"
        ));
    }
}
