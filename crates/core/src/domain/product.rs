use serde::{Deserialize, Deserializer, Serialize};

use crate::normalize::normalize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id_cate: i64,
    pub nom_cate: String,
    #[serde(default = "active_by_default", deserialize_with = "lenient_flag")]
    pub est_cate: bool,
}

impl Category {
    /// Matches a bare identifier or the normalized category name.
    pub fn matches(&self, answer: &str) -> bool {
        let normalized = normalize(answer);
        if normalized.is_empty() {
            return false;
        }
        normalized == self.id_cate.to_string() || normalized == normalize(&self.nom_cate)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id_prod: i64,
    pub nom_prod: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub nom_prod: String,
    pub cate_prod: Option<i64>,
    pub tip_prod: String,
    pub und_prod: String,
    pub img_prod: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitOption {
    pub value: String,
    pub label: String,
}

impl UnitOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }

    /// Accepts the canonical value, the full label, or the label's first word.
    pub fn matches(&self, answer: &str) -> bool {
        let normalized = normalize(answer);
        if normalized.is_empty() {
            return false;
        }

        let label = normalize(&self.label);
        let first_word = label.split_whitespace().next().unwrap_or_default();
        normalized == normalize(&self.value) || normalized == label || normalized == first_word
    }
}

/// Fixed option sets that come from configuration rather than the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductCatalog {
    pub product_types: Vec<String>,
    pub raw_material_type: String,
    pub units: Vec<UnitOption>,
    pub default_image: String,
}

impl ProductCatalog {
    pub fn find_type(&self, answer: &str) -> Option<&str> {
        let normalized = normalize(answer);
        self.product_types
            .iter()
            .find(|product_type| normalize(product_type) == normalized)
            .map(String::as_str)
    }

    pub fn find_unit(&self, answer: &str) -> Option<&UnitOption> {
        self.units.iter().find(|unit| unit.matches(answer))
    }

    pub fn is_raw_material(&self, product_type: &str) -> bool {
        normalize(product_type) == normalize(&self.raw_material_type)
    }

    pub fn unit_labels(&self) -> Vec<String> {
        self.units.iter().map(|unit| unit.label.clone()).collect()
    }
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            product_types: ["Insumo", "Bebida", "Comida", "Postre", "Otro"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            raw_material_type: "Insumo".to_string(),
            units: vec![
                UnitOption::new("kg", "Kilogramos (kg)"),
                UnitOption::new("g", "Gramos (g)"),
                UnitOption::new("l", "Litros (l)"),
                UnitOption::new("ml", "Mililitros (ml)"),
                UnitOption::new("und", "Unidades (und)"),
            ],
            default_image: "default.png".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id_prod: i64,
    pub nom_prod: String,
    pub stock: f64,
    pub und_prod: String,
}

impl InventoryItem {
    pub fn describe(&self) -> String {
        format!("Hay {} {} de {}.", self.stock, self.und_prod, self.nom_prod)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InventoryLookup {
    Found(InventoryItem),
    NotFound { suggestions: Vec<String> },
}

fn active_by_default() -> bool {
    true
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Number(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Number(value) => value != 0,
        Flag::Text(value) => {
            matches!(normalize(&value).as_str(), "1" | "true" | "activo" | "activa" | "si")
        }
    })
}
