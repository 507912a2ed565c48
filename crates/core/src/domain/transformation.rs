use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id_rece: i64,
    pub nom_rece: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewTransformation {
    pub rece_trans: i64,
    pub cant_prod_trans: f64,
    pub usu_trans: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub id_trans: i64,
    pub rece_trans: i64,
    #[serde(default)]
    pub nom_rece: Option<String>,
    pub cant_prod_trans: f64,
}

impl Transformation {
    pub fn describe(&self) -> String {
        let recipe = self
            .nom_rece
            .clone()
            .unwrap_or_else(|| format!("receta #{}", self.rece_trans));
        format!("{recipe}: {}", self.cant_prod_trans)
    }
}

/// Exact normalized name first, then a single partial match.
pub fn find_recipe<'a>(recipes: &'a [Recipe], spoken_name: &str) -> Option<&'a Recipe> {
    let wanted = normalize(spoken_name);
    if wanted.is_empty() {
        return None;
    }

    if let Some(recipe) = recipes.iter().find(|recipe| normalize(&recipe.nom_rece) == wanted) {
        return Some(recipe);
    }

    let mut partial = recipes.iter().filter(|recipe| normalize(&recipe.nom_rece).contains(&wanted));
    match (partial.next(), partial.next()) {
        (Some(recipe), None) => Some(recipe),
        _ => None,
    }
}
