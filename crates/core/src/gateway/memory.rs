use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::domain::finance::{Expense, ExpenseSummary, NewExpense, SalesSummary};
use crate::domain::product::{Category, InventoryItem, InventoryLookup, NewProduct, Product};
use crate::domain::transformation::{NewTransformation, Recipe, Transformation};
use crate::errors::GatewayError;
use crate::normalize::normalize;
use crate::reports::{ReportFile, ReportRequest};

use super::BackendGateway;

const SUGGESTION_THRESHOLD: f64 = 0.75;
const MAX_SUGGESTIONS: usize = 3;

/// One recorded request against the fake backend.
#[derive(Clone, Debug, PartialEq)]
pub enum GatewayCall {
    ProductNameExists(String),
    ListCategories,
    CreateProduct(NewProduct),
    LookupInventory(String),
    ListRecipes,
    CreateTransformation(NewTransformation),
    TransformationsOn(NaiveDate),
    SalesSummary(NaiveDate),
    ExpensesSummary(NaiveDate),
    CreateExpense(NewExpense),
    DownloadReport(ReportRequest),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    ProductNameExists,
    ListCategories,
    CreateProduct,
    LookupInventory,
    ListRecipes,
    CreateTransformation,
    TransformationsOn,
    SalesSummary,
    ExpensesSummary,
    CreateExpense,
    DownloadReport,
}

impl GatewayCall {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            Self::ProductNameExists(_) => GatewayOperation::ProductNameExists,
            Self::ListCategories => GatewayOperation::ListCategories,
            Self::CreateProduct(_) => GatewayOperation::CreateProduct,
            Self::LookupInventory(_) => GatewayOperation::LookupInventory,
            Self::ListRecipes => GatewayOperation::ListRecipes,
            Self::CreateTransformation(_) => GatewayOperation::CreateTransformation,
            Self::TransformationsOn(_) => GatewayOperation::TransformationsOn,
            Self::SalesSummary(_) => GatewayOperation::SalesSummary,
            Self::ExpensesSummary(_) => GatewayOperation::ExpensesSummary,
            Self::CreateExpense(_) => GatewayOperation::CreateExpense,
            Self::DownloadReport(_) => GatewayOperation::DownloadReport,
        }
    }
}

#[derive(Default)]
struct GatewayState {
    products: Vec<Product>,
    categories: Vec<Category>,
    inventory: Vec<InventoryItem>,
    recipes: Vec<Recipe>,
    transformations: Vec<Transformation>,
    sales: HashMap<NaiveDate, SalesSummary>,
    expense_summaries: HashMap<NaiveDate, ExpenseSummary>,
    expenses: Vec<Expense>,
    failures: HashMap<GatewayOperation, GatewayError>,
    calls: Vec<GatewayCall>,
}

impl GatewayState {
    /// Records the call, then returns the injected failure for it, if any.
    fn record(&mut self, call: GatewayCall) -> Result<(), GatewayError> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Deterministic backend used by tests and offline sessions.
#[derive(Default)]
pub struct InMemoryGateway {
    state: RwLock<GatewayState>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.state.get_mut().categories = categories;
        self
    }

    pub fn with_inventory(mut self, items: Vec<InventoryItem>) -> Self {
        self.state.get_mut().inventory = items;
        self
    }

    pub fn with_recipes(mut self, recipes: Vec<Recipe>) -> Self {
        self.state.get_mut().recipes = recipes;
        self
    }

    pub fn with_sales(mut self, day: NaiveDate, summary: SalesSummary) -> Self {
        self.state.get_mut().sales.insert(day, summary);
        self
    }

    pub fn with_expenses(mut self, day: NaiveDate, summary: ExpenseSummary) -> Self {
        self.state.get_mut().expense_summaries.insert(day, summary);
        self
    }

    pub fn with_transformations(mut self, transformations: Vec<Transformation>) -> Self {
        self.state.get_mut().transformations = transformations;
        self
    }

    /// Every later call to `operation` fails with `error`.
    pub fn fail_on(mut self, operation: GatewayOperation, error: GatewayError) -> Self {
        self.state.get_mut().failures.insert(operation, error);
        self
    }

    /// Registers a product out of band, e.g. another user creating the same
    /// name while a conversation is still collecting answers.
    pub async fn insert_product(&self, name: &str) -> Product {
        let mut state = self.state.write().await;
        let product = Product { id_prod: next_id(state.products.len()), nom_prod: name.to_string() };
        state.products.push(product.clone());
        product
    }

    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.read().await.calls.clone()
    }

    pub async fn calls_to(&self, operation: GatewayOperation) -> Vec<GatewayCall> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|call| call.operation() == operation)
            .cloned()
            .collect()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.products.clone()
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.state.read().await.expenses.clone()
    }
}

#[async_trait]
impl BackendGateway for InMemoryGateway {
    async fn product_name_exists(&self, name: &str) -> Result<bool, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::ProductNameExists(name.to_string()))?;
        let wanted = normalize(name);
        Ok(state.products.iter().any(|product| normalize(&product.nom_prod) == wanted))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::ListCategories)?;
        Ok(state.categories.iter().filter(|category| category.est_cate).cloned().collect())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::CreateProduct(product.clone()))?;

        let wanted = normalize(&product.nom_prod);
        if state.products.iter().any(|existing| normalize(&existing.nom_prod) == wanted) {
            return Err(GatewayError::Server {
                status: 409,
                message: format!("El producto «{}» ya existe.", product.nom_prod),
            });
        }

        let created =
            Product { id_prod: next_id(state.products.len()), nom_prod: product.nom_prod.clone() };
        state.products.push(created.clone());
        Ok(created)
    }

    async fn lookup_inventory(&self, name: &str) -> Result<InventoryLookup, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::LookupInventory(name.to_string()))?;

        let wanted = normalize(name);
        if let Some(item) = state.inventory.iter().find(|item| normalize(&item.nom_prod) == wanted) {
            return Ok(InventoryLookup::Found(item.clone()));
        }

        let mut scored = state
            .inventory
            .iter()
            .map(|item| (strsim::jaro_winkler(&wanted, &normalize(&item.nom_prod)), &item.nom_prod))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect::<Vec<_>>();
        scored.sort_by(|left, right| right.0.total_cmp(&left.0));

        let suggestions =
            scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, name)| name.clone()).collect();
        Ok(InventoryLookup::NotFound { suggestions })
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::ListRecipes)?;
        Ok(state.recipes.clone())
    }

    async fn create_transformation(
        &self,
        transformation: &NewTransformation,
    ) -> Result<Transformation, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::CreateTransformation(transformation.clone()))?;

        let recipe = state
            .recipes
            .iter()
            .find(|recipe| recipe.id_rece == transformation.rece_trans)
            .cloned()
            .ok_or_else(|| GatewayError::Server {
                status: 404,
                message: "La receta indicada no existe.".to_string(),
            })?;

        let created = Transformation {
            id_trans: next_id(state.transformations.len()),
            rece_trans: recipe.id_rece,
            nom_rece: Some(recipe.nom_rece),
            cant_prod_trans: transformation.cant_prod_trans,
        };
        state.transformations.push(created.clone());
        Ok(created)
    }

    async fn transformations_on(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<Transformation>, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::TransformationsOn(day))?;
        Ok(state.transformations.clone())
    }

    async fn sales_summary(&self, day: NaiveDate) -> Result<SalesSummary, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::SalesSummary(day))?;
        Ok(state
            .sales
            .get(&day)
            .cloned()
            .unwrap_or(SalesSummary { total: Decimal::ZERO, cantidad: 0 }))
    }

    async fn expenses_summary(&self, day: NaiveDate) -> Result<ExpenseSummary, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::ExpensesSummary(day))?;
        Ok(state
            .expense_summaries
            .get(&day)
            .cloned()
            .unwrap_or(ExpenseSummary { total: Decimal::ZERO, cantidad: 0 }))
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::CreateExpense(expense.clone()))?;

        let created = Expense {
            id_gas: next_id(state.expenses.len()),
            monto: expense.monto,
            descripcion: expense.descripcion.clone(),
        };
        state.expenses.push(created.clone());
        Ok(created)
    }

    async fn download_report(&self, request: &ReportRequest) -> Result<ReportFile, GatewayError> {
        let mut state = self.state.write().await;
        state.record(GatewayCall::DownloadReport(request.clone()))?;
        Ok(ReportFile {
            file_name: request.file_name.clone(),
            content_type: request.format.content_type().to_string(),
            bytes: format!("{} {}", request.module.key(), request.subreport).into_bytes(),
        })
    }
}

fn next_id(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |len| len + 1)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::product::{InventoryItem, InventoryLookup, NewProduct};
    use crate::errors::GatewayError;
    use crate::gateway::BackendGateway;

    use super::{GatewayCall, GatewayOperation, InMemoryGateway};

    fn item(id: i64, name: &str) -> InventoryItem {
        InventoryItem { id_prod: id, nom_prod: name.to_string(), stock: 4.0, und_prod: "kg".to_string() }
    }

    #[tokio::test]
    async fn near_matches_are_offered_for_unknown_inventory_names() {
        let gateway = InMemoryGateway::new().with_inventory(vec![
            item(1, "Azúcar"),
            item(2, "Arroz"),
            item(3, "Harina"),
        ]);

        let found = gateway.lookup_inventory("azucar").await.expect("lookup");
        assert!(matches!(found, InventoryLookup::Found(ref item) if item.id_prod == 1));

        let missing = gateway.lookup_inventory("azucr").await.expect("lookup");
        match missing {
            InventoryLookup::NotFound { suggestions } => {
                assert_eq!(suggestions.first().map(String::as_str), Some("Azúcar"));
                assert!(!suggestions.contains(&"Harina".to_string()));
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn created_products_are_reported_as_existing() {
        let gateway = InMemoryGateway::new();
        assert!(!gateway.product_name_exists("Queso").await.expect("check"));

        gateway
            .create_product(&NewProduct {
                nom_prod: "Queso".to_string(),
                cate_prod: None,
                tip_prod: "Insumo".to_string(),
                und_prod: "kg".to_string(),
                img_prod: "default.png".to_string(),
            })
            .await
            .expect("create");

        assert!(gateway.product_name_exists("queso").await.expect("check"));
        assert_eq!(gateway.calls_to(GatewayOperation::CreateProduct).await.len(), 1);
    }

    #[tokio::test]
    async fn injected_failures_are_still_recorded() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
        let gateway = InMemoryGateway::new()
            .fail_on(GatewayOperation::SalesSummary, GatewayError::Timeout { timeout_secs: 20 });

        let error = gateway.sales_summary(day).await.expect_err("injected failure");
        assert_eq!(error, GatewayError::Timeout { timeout_secs: 20 });
        assert_eq!(gateway.calls().await, vec![GatewayCall::SalesSummary(day)]);
    }
}
