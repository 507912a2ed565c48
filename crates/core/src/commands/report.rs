use async_trait::async_trait;

use crate::context::Turn;
use crate::errors::TurnError;
use crate::flows::report::MODULE_QUESTION;
use crate::flows::{Flow, ReportFlow};
use crate::intents::{IntentHandler, IntentMatch};
use crate::reports::ReportModule;

/// `generar reporte [de <módulo>]`: opens the report flow at `modulo`.
pub struct GenerateReport;

#[async_trait]
impl IntentHandler for GenerateReport {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        turn.ctx.set_flow(Some(Flow::Reporte(ReportFlow::default())));
        turn.prompt(MODULE_QUESTION, ReportModule::labels());

        // "generar reporte de ventas" answers the first question up front.
        if let Some(module) = intent.group("modulo").and_then(ReportModule::find_in) {
            turn.ctx.resubmit(module.label().to_string());
        }
        Ok(())
    }
}
