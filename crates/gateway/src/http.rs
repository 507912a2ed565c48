use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gestor_core::config::BackendConfig;
use gestor_core::domain::finance::{Expense, ExpenseSummary, NewExpense, SalesSummary};
use gestor_core::domain::product::{Category, InventoryItem, InventoryLookup, NewProduct, Product};
use gestor_core::domain::transformation::{NewTransformation, Recipe, Transformation};
use gestor_core::errors::GatewayError;
use gestor_core::gateway::BackendGateway;
use gestor_core::reports::{ReportFile, ReportRequest};

pub struct HttpGateway {
    client: Client,
    base_url: String,
    api_token: Option<SecretString>,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    #[serde(default)]
    categorias: Vec<Category>,
}

#[derive(Deserialize)]
struct InventoryResponse {
    #[serde(default)]
    producto: Option<InventoryItem>,
    #[serde(default)]
    sugerencias: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipesResponse {
    Bare(Vec<Recipe>),
    Wrapped { recetas: Vec<Recipe> },
}

#[derive(Deserialize)]
struct TransformationsResponse {
    #[serde(default)]
    transformaciones: Vec<Transformation>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl HttpGateway {
    pub fn new(config: &BackendConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| GatewayError::Transport(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Sends the request and turns transport failures and non-2xx answers
    /// into `GatewayError`s. The backend's `{ message }` is kept verbatim.
    async fn send(
        &self,
        operation: &'static str,
        builder: RequestBuilder,
    ) -> Result<Response, GatewayError> {
        let response = builder.send().await.map_err(|error| {
            let mapped = if error.is_timeout() {
                GatewayError::Timeout { timeout_secs: self.timeout_secs }
            } else {
                GatewayError::Transport(error.to_string())
            };
            warn!(event_name = "gateway.request.failed", operation, error = %mapped, "backend unreachable");
            mapped
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(event_name = "gateway.request.completed", operation, status = status.as_u16());
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|error| error.message)
            .unwrap_or_default();
        warn!(
            event_name = "gateway.request.failed",
            operation,
            status = status.as_u16(),
            message = %message,
            "backend rejected request"
        );
        Err(GatewayError::Server { status: status.as_u16(), message })
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: Response,
    ) -> Result<T, GatewayError> {
        let body = response.bytes().await.map_err(|error| GatewayError::Transport(error.to_string()))?;
        serde_json::from_slice(&body).map_err(|error| {
            warn!(event_name = "gateway.request.failed", operation, error = %error, "undecodable response");
            GatewayError::Decode(error.to_string())
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let response = self.send(operation, self.request(Method::GET, path).query(query)).await?;
        self.decode(operation, response).await
    }

    async fn post_json<B, T>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(operation, self.request(Method::POST, path).json(body)).await?;
        self.decode(operation, response).await
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn product_name_exists(&self, name: &str) -> Result<bool, GatewayError> {
        let response: ExistsResponse = self
            .get_json("product_name_exists", "/productos/verificar", &[("nombre", name)])
            .await?;
        Ok(response.exists)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, GatewayError> {
        let response: CategoriesResponse =
            self.get_json("list_categories", "/categorias", &[]).await?;
        Ok(response.categorias.into_iter().filter(|category| category.est_cate).collect())
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, GatewayError> {
        self.post_json("create_product", "/productos", product).await
    }

    async fn lookup_inventory(&self, name: &str) -> Result<InventoryLookup, GatewayError> {
        let response: InventoryResponse = self
            .get_json("lookup_inventory", "/inventario/buscar", &[("nombre", name)])
            .await?;
        Ok(match response.producto {
            Some(item) => InventoryLookup::Found(item),
            None => InventoryLookup::NotFound { suggestions: response.sugerencias },
        })
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, GatewayError> {
        let response: RecipesResponse = self.get_json("list_recipes", "/recetas", &[]).await?;
        Ok(match response {
            RecipesResponse::Bare(recipes) | RecipesResponse::Wrapped { recetas: recipes } => {
                recipes
            }
        })
    }

    async fn create_transformation(
        &self,
        transformation: &NewTransformation,
    ) -> Result<Transformation, GatewayError> {
        self.post_json("create_transformation", "/transformaciones", transformation).await
    }

    async fn transformations_on(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<Transformation>, GatewayError> {
        let day = day.format("%Y-%m-%d").to_string();
        let response: TransformationsResponse = self
            .get_json("transformations_on", "/transformaciones", &[("fecha", day.as_str())])
            .await?;
        Ok(response.transformaciones)
    }

    async fn sales_summary(&self, day: NaiveDate) -> Result<SalesSummary, GatewayError> {
        let day = day.format("%Y-%m-%d").to_string();
        self.get_json("sales_summary", "/ventas/resumen", &[("fecha", day.as_str())]).await
    }

    async fn expenses_summary(&self, day: NaiveDate) -> Result<ExpenseSummary, GatewayError> {
        let day = day.format("%Y-%m-%d").to_string();
        self.get_json("expenses_summary", "/gastos/resumen", &[("fecha", day.as_str())]).await
    }

    async fn create_expense(&self, expense: &NewExpense) -> Result<Expense, GatewayError> {
        self.post_json("create_expense", "/gastos", expense).await
    }

    async fn download_report(&self, request: &ReportRequest) -> Result<ReportFile, GatewayError> {
        let response = self.send("download_report", self.request(Method::GET, &request.path)).await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| request.format.content_type().to_string());
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_file_name)
            .unwrap_or_else(|| request.file_name.clone());

        let bytes = response
            .bytes()
            .await
            .map_err(|error| GatewayError::Transport(error.to_string()))?
            .to_vec();

        Ok(ReportFile { file_name, content_type, bytes })
    }
}

/// `attachment; filename="ventas.xlsx"` -> `ventas.xlsx`
fn attachment_file_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::attachment_file_name;

    #[test]
    fn file_name_is_read_from_content_disposition() {
        assert_eq!(
            attachment_file_name(r#"attachment; filename="ventas_2026.xlsx""#).as_deref(),
            Some("ventas_2026.xlsx")
        );
        assert_eq!(attachment_file_name("attachment; filename=cierres.pdf").as_deref(), Some("cierres.pdf"));
        assert_eq!(attachment_file_name("inline"), None);
        assert_eq!(attachment_file_name(r#"attachment; filename="""#), None);
    }
}
