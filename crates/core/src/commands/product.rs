use async_trait::async_trait;

use crate::context::Turn;
use crate::domain::product::InventoryLookup;
use crate::errors::TurnError;
use crate::flows::product::{confirmation_question, yes_no};
use crate::flows::{Flow, ProductFlow};
use crate::intents::{IntentHandler, IntentMatch};

/// `agregar producto <nombre>`: opens the creation flow at `confirmacion`.
/// Name uniqueness is only checked once every answer is collected.
pub struct AddProduct;

#[async_trait]
impl IntentHandler for AddProduct {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let name = intent
            .group("nombre")
            .ok_or_else(|| TurnError::InvalidInput("¿Cómo se llama el producto?".to_string()))?;

        turn.ctx.set_flow(Some(Flow::Producto(ProductFlow::confirm(name))));
        turn.prompt(confirmation_question(name), yes_no());
        Ok(())
    }
}

/// `consultar inventario de <nombre>`; near matches open `sugerenciaInventario`.
pub struct CheckInventory;

#[async_trait]
impl IntentHandler for CheckInventory {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let name = intent
            .group("nombre")
            .ok_or_else(|| TurnError::InvalidInput("¿Qué producto quieres consultar?".to_string()))?;

        match turn.gateway.lookup_inventory(name).await? {
            InventoryLookup::Found(item) => turn.say(item.describe()),
            InventoryLookup::NotFound { suggestions } if suggestions.is_empty() => {
                turn.say(format!("No encontré «{name}» en el inventario."));
            }
            InventoryLookup::NotFound { suggestions } => {
                turn.ctx.set_flow(Some(Flow::Producto(ProductFlow::inventory_suggestions(
                    name,
                    suggestions.clone(),
                ))));
                turn.prompt(format!("No encontré «{name}». ¿Quisiste decir alguno de estos?"), suggestions);
            }
        }
        Ok(())
    }
}
