use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::reports::{ReportFormat, ReportModule};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Producto,
    Reporte,
}

/// The single multi-turn dialogue a session may have open.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Flow {
    Producto(ProductFlow),
    Reporte(ReportFlow),
}

impl Flow {
    pub fn flow_type(&self) -> FlowType {
        match self {
            Self::Producto(_) => FlowType::Producto,
            Self::Reporte(_) => FlowType::Reporte,
        }
    }

    pub fn step_name(&self) -> &'static str {
        match self {
            Self::Producto(flow) => flow.step.as_str(),
            Self::Reporte(flow) => flow.step.as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductStep {
    Confirmacion,
    Tipo,
    Categoria,
    Unidad,
    SugerenciaInventario,
}

impl ProductStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmacion => "confirmacion",
            Self::Tipo => "tipo",
            Self::Categoria => "categoria",
            Self::Unidad => "unidad",
            Self::SugerenciaInventario => "sugerenciaInventario",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProductData {
    pub nom_prod: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cate_prod: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip_prod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub und_prod: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sugerencias: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductFlow {
    pub step: ProductStep,
    pub data: ProductData,
}

impl ProductFlow {
    /// Creation dialogue for `name`, waiting for the user to confirm it.
    pub fn confirm(name: impl Into<String>) -> Self {
        Self {
            step: ProductStep::Confirmacion,
            data: ProductData { nom_prod: name.into(), ..ProductData::default() },
        }
    }

    /// Follow-up to an inventory lookup that only produced near matches.
    pub fn inventory_suggestions(queried: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            step: ProductStep::SugerenciaInventario,
            data: ProductData {
                nom_prod: queried.into(),
                sugerencias: suggestions,
                ..ProductData::default()
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStep {
    Modulo,
    Subreporte,
    Formato,
}

impl ReportStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Modulo => "modulo",
            Self::Subreporte => "subreporte",
            Self::Formato => "formato",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulo: Option<ReportModule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subreporte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formato: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inicio_flujo: Option<DateTime<Local>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportFlow {
    pub step: ReportStep,
    pub data: ReportData,
}

impl Default for ReportFlow {
    fn default() -> Self {
        Self { step: ReportStep::Modulo, data: ReportData::default() }
    }
}
