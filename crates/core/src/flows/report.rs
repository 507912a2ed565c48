//! Report-generation dialogue: module, subreport, format, then download.

use tracing::info;

use crate::context::Turn;
use crate::errors::TurnError;
use crate::messages::MessageBuilder;
use crate::reports::{ReportFormat, ReportModule};

use super::states::{Flow, ReportData, ReportFlow, ReportStep};

pub const MODULE_QUESTION: &str = "¿De qué módulo quieres el reporte?";

fn format_options() -> Vec<String> {
    ReportFormat::LABELS.iter().map(|label| label.to_string()).collect()
}

pub async fn handle_report_flow(
    mut flow: ReportFlow,
    input: &str,
    turn: &mut Turn<'_>,
) -> Result<(), TurnError> {
    match flow.step {
        ReportStep::Modulo => {
            let Some(module) = ReportModule::find_in(input) else {
                turn.prompt(
                    "No reconozco ese módulo. Puedo generar reportes de estos:",
                    ReportModule::labels(),
                );
                return Ok(());
            };

            flow.data.modulo = Some(module);
            flow.data.inicio_flujo = Some(turn.clock.now());
            flow.step = ReportStep::Subreporte;
            turn.ctx.set_flow(Some(Flow::Reporte(flow)));
            turn.prompt(
                format!("¿Qué reporte de {} necesitas?", module.key()),
                module.subreport_labels(),
            );
            Ok(())
        }
        ReportStep::Subreporte => {
            let Some(module) = flow.data.modulo else {
                restart(turn);
                return Ok(());
            };
            let Some(endpoint) = module.find_subreport(input) else {
                turn.prompt("Elige uno de los reportes disponibles:", module.subreport_labels());
                return Ok(());
            };

            flow.data.subreporte = Some(endpoint.label.to_string());
            flow.step = ReportStep::Formato;
            turn.ctx.set_flow(Some(Flow::Reporte(flow)));
            turn.prompt("¿En qué formato lo quieres?", format_options());
            Ok(())
        }
        ReportStep::Formato => {
            let Some(format) = ReportFormat::find_in(input) else {
                turn.prompt("Solo puedo generar Excel o PDF. ¿Cuál prefieres?", format_options());
                return Ok(());
            };

            flow.data.formato = Some(format);
            generate(flow.data, turn).await
        }
    }
}

/// Terminal action. The flow is gone before the request is issued, so it
/// ends whether or not the download succeeds.
async fn generate(data: ReportData, turn: &mut Turn<'_>) -> Result<(), TurnError> {
    turn.ctx.set_flow(None);

    let (Some(module), Some(subreport), Some(format)) =
        (data.modulo, data.subreporte.as_deref(), data.formato)
    else {
        restart(turn);
        return Ok(());
    };
    let Some(endpoint) = module.find_subreport(subreport) else {
        turn.say(format!("No tengo configurado el reporte «{subreport}»."));
        return Ok(());
    };

    let request = endpoint.request(format, turn.clock.today());
    let file = turn.gateway.download_report(&request).await?;

    let started = data.inicio_flujo.unwrap_or_else(|| turn.clock.now());
    let elapsed_ms = (turn.clock.now() - started).num_milliseconds().max(0);
    let seconds = elapsed_ms as f64 / 1000.0;

    info!(
        event_name = "assistant.report.generated",
        module = module.key(),
        subreport = endpoint.slug,
        format = format.key(),
        bytes = file.bytes.len(),
        elapsed_ms,
        "report generated"
    );

    turn.ctx.emit(
        MessageBuilder::new(format!("Reporte «{}» generado en {seconds:.1} segundos.", endpoint.label))
            .file(file.file_name.clone(), file.bytes.len())
            .build(),
    );
    turn.ctx.deliver_file(file);
    Ok(())
}

fn restart(turn: &mut Turn<'_>) {
    turn.finish("Se perdió el progreso del reporte. Pídelo de nuevo con «generar reporte».");
}
