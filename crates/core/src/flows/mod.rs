pub mod product;
pub mod report;
pub mod states;

use crate::context::Turn;
use crate::errors::TurnError;
use crate::normalize::{contains_word, normalize};

pub use states::{
    Flow, FlowType, ProductData, ProductFlow, ProductStep, ReportData, ReportFlow, ReportStep,
};

const CANCELLATION: &[&str] = &["cancelar", "detener", "salir"];

/// Universal escape hatch, checked before any step-specific matching.
pub fn is_cancellation(input: &str) -> bool {
    contains_word(&normalize(input), CANCELLATION)
}

/// Routes one utterance to the step handler of `flow`. The handler commits
/// the next state through the context; leaving it untouched keeps the step.
pub async fn handle_flow(flow: Flow, input: &str, turn: &mut Turn<'_>) -> Result<(), TurnError> {
    match flow {
        Flow::Producto(flow) => product::handle_product_flow(flow, input, turn).await,
        Flow::Reporte(flow) => report::handle_report_flow(flow, input, turn).await,
    }
}
