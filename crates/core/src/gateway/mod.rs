//! Backend Gateway contract: every REST call the assistant makes.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::finance::{Expense, ExpenseSummary, NewExpense, SalesSummary};
use crate::domain::product::{Category, InventoryLookup, NewProduct, Product};
use crate::domain::transformation::{NewTransformation, Recipe, Transformation};
use crate::errors::GatewayError;
use crate::reports::{ReportFile, ReportRequest};

pub use memory::{GatewayCall, GatewayOperation, InMemoryGateway};

#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// `GET /productos/verificar?nombre=`
    async fn product_name_exists(&self, name: &str) -> Result<bool, GatewayError>;

    /// `GET /categorias`, active categories only.
    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError>;

    /// `POST /productos`
    async fn create_product(&self, product: &NewProduct) -> Result<Product, GatewayError>;

    /// `GET /inventario/buscar?nombre=`
    async fn lookup_inventory(&self, name: &str) -> Result<InventoryLookup, GatewayError>;

    /// `GET /recetas`
    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError>;

    /// `POST /transformaciones`
    async fn create_transformation(
        &self,
        transformation: &NewTransformation,
    ) -> Result<Transformation, GatewayError>;

    /// `GET /transformaciones?fecha=`
    async fn transformations_on(&self, day: NaiveDate)
        -> Result<Vec<Transformation>, GatewayError>;

    /// `GET /ventas/resumen?fecha=`
    async fn sales_summary(&self, day: NaiveDate) -> Result<SalesSummary, GatewayError>;

    /// `GET /gastos/resumen?fecha=`
    async fn expenses_summary(&self, day: NaiveDate) -> Result<ExpenseSummary, GatewayError>;

    /// `POST /gastos`
    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, GatewayError>;

    /// One of the `/reportes/...` export endpoints.
    async fn download_report(&self, request: &ReportRequest) -> Result<ReportFile, GatewayError>;
}
