use async_trait::async_trait;
use tracing::info;

use crate::context::Turn;
use crate::domain::transformation::{find_recipe, NewTransformation};
use crate::errors::TurnError;
use crate::intents::{IntentHandler, IntentMatch};
use crate::messages::MessageBuilder;
use crate::normalize::word_to_number;

/// `producir <cantidad> de <receta>`
pub struct RunTransformation;

#[async_trait]
impl IntentHandler for RunTransformation {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let spoken_quantity = intent.group("cantidad").unwrap_or_default();
        let quantity = word_to_number(spoken_quantity)
            .filter(|quantity| *quantity > 0.0)
            .ok_or_else(|| {
                TurnError::InvalidInput(format!("No entendí la cantidad «{spoken_quantity}»."))
            })?;
        let recipe_name = intent
            .group("receta")
            .ok_or_else(|| TurnError::InvalidInput("¿Qué receta quieres producir?".to_string()))?;

        let recipes = turn.gateway.list_recipes().await?;
        let Some(recipe) = find_recipe(&recipes, recipe_name) else {
            turn.say(format!("No encontré una receta llamada «{recipe_name}»."));
            return Ok(());
        };

        let payload = NewTransformation {
            rece_trans: recipe.id_rece,
            cant_prod_trans: quantity,
            usu_trans: turn.ctx.user().id,
        };
        let created = turn.gateway.create_transformation(&payload).await?;

        info!(
            event_name = "assistant.transformation.created",
            id_trans = created.id_trans,
            rece_trans = recipe.id_rece,
            "transformation registered"
        );
        turn.say(format!(
            "Transformación registrada: {quantity} de «{}».",
            recipe.nom_rece
        ));
        Ok(())
    }
}

/// `transformaciones de hoy`
pub struct TransformationsToday;

#[async_trait]
impl IntentHandler for TransformationsToday {
    async fn handle(&self, _intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let today = turn.clock.today();
        let transformations = turn.gateway.transformations_on(today).await?;

        if transformations.is_empty() {
            turn.say("Hoy no se registraron transformaciones.");
            return Ok(());
        }

        let message = MessageBuilder::new(format!(
            "Hoy se registraron {} transformaciones.",
            transformations.len()
        ))
        .list(None, transformations.iter().map(|transformation| transformation.describe()))
        .silent()
        .build();
        turn.ctx.emit(message);
        Ok(())
    }
}
