//! Report catalog: modules, their subreport menus and the export endpoint
//! each `(module, subreport)` pair resolves to.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportModule {
    Ventas,
    Productos,
    Compras,
    Gastos,
    Cierres,
}

impl ReportModule {
    pub const ALL: [ReportModule; 5] = [
        ReportModule::Ventas,
        ReportModule::Productos,
        ReportModule::Compras,
        ReportModule::Gastos,
        ReportModule::Cierres,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Ventas => "ventas",
            Self::Productos => "productos",
            Self::Compras => "compras",
            Self::Gastos => "gastos",
            Self::Cierres => "cierres",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ventas => "Ventas",
            Self::Productos => "Productos",
            Self::Compras => "Compras",
            Self::Gastos => "Gastos",
            Self::Cierres => "Cierres",
        }
    }

    /// First module whose name appears anywhere in the utterance.
    pub fn find_in(answer: &str) -> Option<Self> {
        let normalized = normalize(answer);
        Self::ALL.into_iter().find(|module| normalized.contains(module.key()))
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|module| module.label().to_string()).collect()
    }

    pub fn subreports(&self) -> impl Iterator<Item = &'static ReportEndpoint> + '_ {
        REPORT_ENDPOINTS.iter().filter(move |endpoint| endpoint.module == *self)
    }

    pub fn subreport_labels(&self) -> Vec<String> {
        self.subreports().map(|endpoint| endpoint.label.to_string()).collect()
    }

    /// Exact normalized match against this module's menu.
    pub fn find_subreport(&self, answer: &str) -> Option<&'static ReportEndpoint> {
        let normalized = normalize(answer);
        self.subreports().find(|endpoint| normalize(endpoint.label) == normalized)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Excel,
    Pdf,
}

impl ReportFormat {
    pub const LABELS: [&'static str; 2] = ["Excel", "PDF"];

    pub fn find_in(answer: &str) -> Option<Self> {
        let normalized = normalize(answer);
        if normalized.contains("excel") {
            Some(Self::Excel)
        } else if normalized.contains("pdf") {
            Some(Self::Pdf)
        } else {
            None
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Excel => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
        }
    }
}

/// How the `fecha_inicio`/`fecha_fin` pair is rendered for an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBounds {
    /// `yyyy-MM-dd` for both bounds.
    Plain,
    /// Whole local day with millisecond ISO bounds, so records near midnight
    /// are not lost to timezone truncation on the server.
    FullDay,
}

impl DateBounds {
    pub fn render(&self, day: NaiveDate) -> (String, String) {
        let date = day.format("%Y-%m-%d").to_string();
        match self {
            Self::Plain => (date.clone(), date),
            Self::FullDay => (format!("{date}T00:00:00.000"), format!("{date}T23:59:59.999")),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReportEndpoint {
    pub module: ReportModule,
    pub label: &'static str,
    pub slug: &'static str,
    pub bounds: DateBounds,
}

impl ReportEndpoint {
    pub fn request(&self, format: ReportFormat, day: NaiveDate) -> ReportRequest {
        let (start, end) = self.bounds.render(day);
        let path = format!(
            "/reportes/{module}/{slug}/{format}?fecha_inicio={start}&fecha_fin={end}",
            module = self.module.key(),
            slug = self.slug,
            format = format.key(),
        );
        let file_name = format!(
            "{module}_{slug}_{day}.{extension}",
            module = self.module.key(),
            slug = self.slug,
            day = day.format("%Y-%m-%d"),
            extension = format.extension(),
        );

        ReportRequest {
            module: self.module,
            subreport: self.label.to_string(),
            format,
            path,
            file_name,
        }
    }
}

/// A resolved export call: relative path plus the file name to deliver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    pub module: ReportModule,
    pub subreport: String,
    pub format: ReportFormat,
    pub path: String,
    pub file_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub static REPORT_ENDPOINTS: &[ReportEndpoint] = &[
    ReportEndpoint {
        module: ReportModule::Ventas,
        label: "Reporte de ventas",
        slug: "detalle",
        bounds: DateBounds::FullDay,
    },
    ReportEndpoint {
        module: ReportModule::Ventas,
        label: "Ventas por producto",
        slug: "por-producto",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Ventas,
        label: "Ventas por usuario",
        slug: "por-usuario",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Productos,
        label: "Inventario actual",
        slug: "inventario",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Productos,
        label: "Productos más vendidos",
        slug: "mas-vendidos",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Productos,
        label: "Stock bajo",
        slug: "stock-bajo",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Compras,
        label: "Reporte de compras",
        slug: "detalle",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Compras,
        label: "Compras por proveedor",
        slug: "por-proveedor",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Gastos,
        label: "Reporte de gastos",
        slug: "detalle",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Gastos,
        label: "Gastos por categoría",
        slug: "por-categoria",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Cierres,
        label: "Reporte de cierres",
        slug: "detalle",
        bounds: DateBounds::Plain,
    },
    ReportEndpoint {
        module: ReportModule::Cierres,
        label: "Diferencias de caja",
        slug: "diferencias",
        bounds: DateBounds::Plain,
    },
];
