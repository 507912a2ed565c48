use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::info;

use crate::context::Turn;
use crate::domain::finance::{format_money, NewExpense};
use crate::errors::TurnError;
use crate::intents::{IntentHandler, IntentMatch};
use crate::normalize::parse_amount;

pub struct SalesToday;

#[async_trait]
impl IntentHandler for SalesToday {
    async fn handle(&self, _intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let summary = turn.gateway.sales_summary(turn.clock.today()).await?;
        if summary.cantidad == 0 {
            turn.say("Hoy todavía no hay ventas registradas.");
        } else {
            turn.say(format!(
                "Hoy llevas {} ventas por un total de {}.",
                summary.cantidad,
                format_money(summary.total)
            ));
        }
        Ok(())
    }
}

pub struct ExpensesToday;

#[async_trait]
impl IntentHandler for ExpensesToday {
    async fn handle(&self, _intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let summary = turn.gateway.expenses_summary(turn.clock.today()).await?;
        if summary.cantidad == 0 {
            turn.say("Hoy no se registraron gastos.");
        } else {
            turn.say(format!(
                "Hoy se registraron {} gastos por un total de {}.",
                summary.cantidad,
                format_money(summary.total)
            ));
        }
        Ok(())
    }
}

/// `registrar gasto de <monto> en <descripción>`
pub struct RegisterExpense;

#[async_trait]
impl IntentHandler for RegisterExpense {
    async fn handle(&self, intent: &IntentMatch, turn: &mut Turn<'_>) -> Result<(), TurnError> {
        let spoken_amount = intent.group("monto").unwrap_or_default();
        let monto = parse_amount(spoken_amount)
            .filter(|amount| *amount > Decimal::ZERO)
            .ok_or_else(|| TurnError::InvalidInput(format!("No entendí el monto «{spoken_amount}».")))?;
        let descripcion = intent
            .group("descripcion")
            .ok_or_else(|| TurnError::InvalidInput("¿En qué se gastó?".to_string()))?
            .to_string();

        let payload = NewExpense { monto, descripcion, usu_gas: turn.ctx.user().id };
        let created = turn.gateway.create_expense(&payload).await?;

        info!(event_name = "assistant.expense.created", id_gas = created.id_gas, "expense registered");
        turn.say(format!(
            "Gasto de {} registrado: {}.",
            format_money(created.monto),
            created.descripcion
        ));
        Ok(())
    }
}
