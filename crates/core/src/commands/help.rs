use async_trait::async_trait;

use crate::context::Turn;
use crate::errors::TurnError;
use crate::intents::{IntentHandler, IntentMatch};
use crate::messages::MessageBuilder;

/// Lists the example utterances the caller's role is allowed to use.
pub struct ShowCommands;

#[async_trait]
impl IntentHandler for ShowCommands {
    async fn handle(&self, _intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let role = turn.ctx.user().role;
        let examples =
            turn.registry.visible_to(role).map(|command| command.example).collect::<Vec<_>>();

        let message = MessageBuilder::new("Estos son los comandos que puedes usar.")
            .list(Some("Comandos"), examples)
            .silent()
            .build();
        turn.ctx.emit(message);
        Ok(())
    }
}
