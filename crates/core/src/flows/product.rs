//! Product-creation dialogue and the inventory-suggestion follow-up.

use tracing::info;

use crate::context::Turn;
use crate::domain::product::{Category, InventoryLookup, NewProduct};
use crate::errors::TurnError;
use crate::normalize::{contains_word, normalize, word_to_number};

use super::states::{Flow, ProductFlow, ProductStep};

const AFFIRMATIVE: &[&str] = &["si", "confirmar", "confirmo", "correcto"];
const NEGATIVE: &[&str] = &["no", "cancelar", "salir"];

pub fn yes_no() -> Vec<String> {
    vec!["Sí".to_string(), "No".to_string()]
}

pub fn confirmation_question(name: &str) -> String {
    format!("¿Deseas agregar el producto «{name}»?")
}

pub async fn handle_product_flow(
    flow: ProductFlow,
    input: &str,
    turn: &mut Turn<'_>,
) -> Result<(), TurnError> {
    match flow.step {
        ProductStep::Confirmacion => confirmation(flow, input, turn),
        ProductStep::Tipo => product_type(flow, input, turn).await,
        ProductStep::Categoria => category(flow, input, turn).await,
        ProductStep::Unidad => unit(flow, input, turn).await,
        ProductStep::SugerenciaInventario => inventory_suggestion(flow, input, turn).await,
    }
}

fn confirmation(mut flow: ProductFlow, input: &str, turn: &mut Turn<'_>) -> Result<(), TurnError> {
    let normalized = normalize(input);

    if contains_word(&normalized, NEGATIVE) {
        turn.finish("Listo, no agregaré el producto.");
        return Ok(());
    }

    if !contains_word(&normalized, AFFIRMATIVE) {
        let question = format!("{} Responde sí o no.", confirmation_question(&flow.data.nom_prod));
        turn.prompt(question, yes_no());
        return Ok(());
    }

    flow.step = ProductStep::Tipo;
    turn.ctx.set_flow(Some(Flow::Producto(flow)));
    let types = turn.catalog.product_types.clone();
    turn.prompt("¿Qué tipo de producto es?", types);
    Ok(())
}

async fn product_type(
    mut flow: ProductFlow,
    input: &str,
    turn: &mut Turn<'_>,
) -> Result<(), TurnError> {
    let Some(product_type) = turn.catalog.find_type(input).map(str::to_string) else {
        let types = turn.catalog.product_types.clone();
        turn.prompt("Ese tipo no es válido. Elige uno de estos:", types);
        return Ok(());
    };

    let raw_material = turn.catalog.is_raw_material(&product_type);
    flow.data.tip_prod = Some(product_type.clone());

    if raw_material {
        flow.step = ProductStep::Unidad;
        let question = format!("¿En qué unidad se mide «{}»?", flow.data.nom_prod);
        turn.ctx.set_flow(Some(Flow::Producto(flow)));
        let units = turn.catalog.unit_labels();
        turn.prompt(question, units);
        return Ok(());
    }

    let categories = turn.gateway.list_categories().await?;
    if categories.is_empty() {
        turn.finish(no_categories_message(&product_type));
        return Ok(());
    }

    flow.step = ProductStep::Categoria;
    turn.ctx.set_flow(Some(Flow::Producto(flow)));
    turn.prompt("¿A qué categoría pertenece?", category_names(&categories));
    Ok(())
}

async fn category(mut flow: ProductFlow, input: &str, turn: &mut Turn<'_>) -> Result<(), TurnError> {
    let categories = turn.gateway.list_categories().await?;
    if categories.is_empty() {
        let product_type = flow.data.tip_prod.clone().unwrap_or_default();
        turn.finish(no_categories_message(&product_type));
        return Ok(());
    }

    let Some(selected) = find_category(&categories, input) else {
        turn.prompt("No encontré esa categoría. Elige una de la lista:", category_names(&categories));
        return Ok(());
    };

    flow.data.cate_prod = Some(selected.id_cate);
    flow.step = ProductStep::Unidad;
    let question = format!("¿En qué unidad se mide «{}»?", flow.data.nom_prod);
    turn.ctx.set_flow(Some(Flow::Producto(flow)));
    let units = turn.catalog.unit_labels();
    turn.prompt(question, units);
    Ok(())
}

async fn unit(mut flow: ProductFlow, input: &str, turn: &mut Turn<'_>) -> Result<(), TurnError> {
    let Some(unit) = turn.catalog.find_unit(input).cloned() else {
        let units = turn.catalog.unit_labels();
        turn.prompt("No reconozco esa unidad. Elige una de estas:", units);
        return Ok(());
    };

    let Some(product_type) = flow.data.tip_prod.clone() else {
        turn.finish("Perdí el tipo de producto. Vuelve a empezar con «agregar producto».");
        return Ok(());
    };
    flow.data.und_prod = Some(unit.value.clone());

    // The name may have been taken while the dialogue was open.
    let name = flow.data.nom_prod.clone();
    if turn.gateway.product_name_exists(&name).await? {
        turn.finish(format!("Ya existe un producto llamado «{name}». No lo agregaré de nuevo."));
        return Ok(());
    }

    turn.ctx.set_flow(None);

    let cate_prod =
        if turn.catalog.is_raw_material(&product_type) { None } else { flow.data.cate_prod };
    let payload = NewProduct {
        nom_prod: name,
        cate_prod,
        tip_prod: product_type,
        und_prod: unit.value,
        img_prod: turn.catalog.default_image.clone(),
    };
    let created = turn.gateway.create_product(&payload).await?;

    info!(
        event_name = "assistant.product.created",
        id_prod = created.id_prod,
        tip_prod = %payload.tip_prod,
        "product created from conversation"
    );
    turn.say(format!("Producto «{}» creado correctamente.", created.nom_prod));
    Ok(())
}

async fn inventory_suggestion(
    flow: ProductFlow,
    input: &str,
    turn: &mut Turn<'_>,
) -> Result<(), TurnError> {
    let answer = input.trim().to_lowercase();
    let Some(chosen) =
        flow.data.sugerencias.iter().find(|candidate| candidate.to_lowercase() == answer).cloned()
    else {
        turn.prompt("Elige uno de los productos sugeridos:", flow.data.sugerencias.clone());
        return Ok(());
    };

    turn.ctx.set_flow(None);
    match turn.gateway.lookup_inventory(&chosen).await? {
        InventoryLookup::Found(item) => turn.say(item.describe()),
        InventoryLookup::NotFound { .. } => {
            turn.say(format!("No encontré «{chosen}» en el inventario."));
        }
    }
    Ok(())
}

fn find_category<'a>(categories: &'a [Category], answer: &str) -> Option<&'a Category> {
    if let Some(category) = categories.iter().find(|category| category.matches(answer)) {
        return Some(category);
    }

    // "dos" dictated instead of "2".
    let spoken_id = word_to_number(answer).filter(|value| value.fract() == 0.0)?;
    categories.iter().find(|category| category.id_cate as f64 == spoken_id)
}

fn category_names(categories: &[Category]) -> Vec<String> {
    categories.iter().map(|category| category.nom_cate.clone()).collect()
}

fn no_categories_message(product_type: &str) -> String {
    format!(
        "No hay categorías activas. Registra al menos una antes de agregar productos de tipo {product_type}."
    )
}
