use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{json, Value};

use gestor_core::config::BackendConfig;
use gestor_core::domain::product::{InventoryLookup, NewProduct};
use gestor_core::errors::GatewayError;
use gestor_core::gateway::BackendGateway;
use gestor_core::reports::{ReportFormat, ReportModule};
use gestor_gateway::HttpGateway;

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    format!("http://{address}/api")
}

fn config(base_url: String, timeout_secs: u64) -> BackendConfig {
    BackendConfig {
        base_url,
        timeout_secs,
        api_token: Some(SecretString::from("secreto".to_string())),
        default_image: "default.png".to_string(),
    }
}

fn gateway(base_url: String) -> HttpGateway {
    HttpGateway::new(&config(base_url, 5)).expect("client")
}

#[tokio::test]
async fn name_check_sends_query_and_bearer_token() {
    let router = Router::new().route(
        "/api/productos/verificar",
        get(|Query(query): Query<HashMap<String, String>>, headers: HeaderMap| async move {
            let authorized = headers
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                == Some("Bearer secreto");
            let exists = authorized && query.get("nombre").map(String::as_str) == Some("Queso Fresco");
            Json(json!({ "exists": exists }))
        }),
    );
    let gateway = gateway(spawn(router).await);

    assert!(gateway.product_name_exists("Queso Fresco").await.expect("request"));
    assert!(!gateway.product_name_exists("Pan").await.expect("request"));
}

#[tokio::test]
async fn categories_are_filtered_to_active_ones() {
    let router = Router::new().route(
        "/api/categorias",
        get(|| async {
            Json(json!({
                "categorias": [
                    { "id_cate": 1, "nom_cate": "Bebidas", "est_cate": 1 },
                    { "id_cate": 2, "nom_cate": "Antiguas", "est_cate": false },
                    { "id_cate": 3, "nom_cate": "Postres", "est_cate": "activo" }
                ]
            }))
        }),
    );
    let gateway = gateway(spawn(router).await);

    let names = gateway
        .list_categories()
        .await
        .expect("request")
        .into_iter()
        .map(|category| category.nom_cate)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Bebidas", "Postres"]);
}

#[tokio::test]
async fn product_creation_posts_null_category_for_raw_material() {
    let router = Router::new().route(
        "/api/productos",
        post(|Json(body): Json<Value>| async move {
            if body["cate_prod"].is_null() && body["img_prod"] == "default.png" {
                (StatusCode::CREATED, Json(json!({ "id_prod": 41, "nom_prod": body["nom_prod"], "stock": 0 })))
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": "payload inesperado" })))
            }
        }),
    );
    let gateway = gateway(spawn(router).await);

    let created = gateway
        .create_product(&NewProduct {
            nom_prod: "Queso Fresco".to_string(),
            cate_prod: None,
            tip_prod: "Insumo".to_string(),
            und_prod: "kg".to_string(),
            img_prod: "default.png".to_string(),
        })
        .await
        .expect("created");
    assert_eq!(created.id_prod, 41);
    assert_eq!(created.nom_prod, "Queso Fresco");
}

#[tokio::test]
async fn server_errors_keep_the_backend_message() {
    let router = Router::new().route(
        "/api/ventas/resumen",
        get(|| async {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "Caja cerrada" })))
        }),
    );
    let gateway = gateway(spawn(router).await);
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");

    let error = gateway.sales_summary(day).await.expect_err("server error");
    assert_eq!(error, GatewayError::Server { status: 422, message: "Caja cerrada".to_string() });
    assert_eq!(error.user_message(), "Caja cerrada");
}

#[tokio::test]
async fn summaries_decode_numeric_totals() {
    let router = Router::new().route(
        "/api/gastos/resumen",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            let cantidad = if query.get("fecha").map(String::as_str) == Some("2026-10-16") { 3 } else { 0 };
            Json(json!({ "total": 75.25, "cantidad": cantidad }))
        }),
    );
    let gateway = gateway(spawn(router).await);
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");

    let summary = gateway.expenses_summary(day).await.expect("summary");
    assert_eq!(summary.total, Decimal::new(7525, 2));
    assert_eq!(summary.cantidad, 3);
}

#[tokio::test]
async fn inventory_lookup_maps_null_product_to_suggestions() {
    let router = Router::new().route(
        "/api/inventario/buscar",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            match query.get("nombre").map(String::as_str) {
                Some("Azúcar") => Json(json!({
                    "producto": { "id_prod": 1, "nom_prod": "Azúcar", "stock": 4.5, "und_prod": "kg" },
                    "sugerencias": []
                })),
                _ => Json(json!({ "producto": null, "sugerencias": ["Azúcar"] })),
            }
        }),
    );
    let gateway = gateway(spawn(router).await);

    assert!(matches!(
        gateway.lookup_inventory("Azúcar").await.expect("lookup"),
        InventoryLookup::Found(item) if item.stock == 4.5
    ));
    assert_eq!(
        gateway.lookup_inventory("azucr").await.expect("lookup"),
        InventoryLookup::NotFound { suggestions: vec!["Azúcar".to_string()] }
    );
}

#[tokio::test]
async fn recipes_accept_bare_or_wrapped_lists() {
    let bare = Router::new().route(
        "/api/recetas",
        get(|| async { Json(json!([{ "id_rece": 1, "nom_rece": "Pan de leche" }])) }),
    );
    let wrapped = Router::new().route(
        "/api/recetas",
        get(|| async { Json(json!({ "recetas": [{ "id_rece": 2, "nom_rece": "Salsa" }] })) }),
    );

    let first = gateway(spawn(bare).await).list_recipes().await.expect("recipes");
    let second = gateway(spawn(wrapped).await).list_recipes().await.expect("recipes");
    assert_eq!(first[0].id_rece, 1);
    assert_eq!(second[0].nom_rece, "Salsa");
}

#[tokio::test]
async fn report_download_keeps_bytes_and_server_file_name() {
    let router = Router::new().route(
        "/api/reportes/ventas/detalle/excel",
        get(|Query(query): Query<HashMap<String, String>>| async move {
            let body = format!("{}|{}", query["fecha_inicio"], query["fecha_fin"]);
            (
                [
                    (header::CONTENT_TYPE, "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
                    (header::CONTENT_DISPOSITION, "attachment; filename=\"ventas_hoy.xlsx\""),
                ],
                body,
            )
                .into_response()
        }),
    );
    let gateway = gateway(spawn(router).await);
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
    let request = ReportModule::Ventas
        .find_subreport("Reporte de ventas")
        .expect("endpoint")
        .request(ReportFormat::Excel, day);

    let file = gateway.download_report(&request).await.expect("download");
    assert_eq!(file.file_name, "ventas_hoy.xlsx");
    assert_eq!(file.bytes, b"2026-10-16T00:00:00.000|2026-10-16T23:59:59.999".to_vec());
}

#[tokio::test]
async fn report_error_body_is_surfaced() {
    let router = Router::new().route(
        "/api/reportes/cierres/detalle/pdf",
        get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "message": "Sin cierres en el periodo" }))) }),
    );
    let gateway = gateway(spawn(router).await);
    let day = NaiveDate::from_ymd_opt(2026, 10, 16).expect("date");
    let request = ReportModule::Cierres
        .find_subreport("Reporte de cierres")
        .expect("endpoint")
        .request(ReportFormat::Pdf, day);

    let error = gateway.download_report(&request).await.expect_err("missing report");
    assert_eq!(error.user_message(), "Sin cierres en el periodo");
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let router = Router::new().route("/api/categorias", get(|| async { "no es json" }));
    let gateway = gateway(spawn(router).await);

    let error = gateway.list_categories().await.expect_err("decode error");
    assert!(matches!(error, GatewayError::Decode(_)));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let router = Router::new().route(
        "/api/categorias",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "categorias": [] }))
        }),
    );
    let gateway = HttpGateway::new(&config(spawn(router).await, 1)).expect("client");

    let error = gateway.list_categories().await.expect_err("timeout");
    assert_eq!(error, GatewayError::Timeout { timeout_secs: 1 });
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");
    drop(listener);

    let error = gateway(format!("http://{address}/api"))
        .list_recipes()
        .await
        .expect_err("connection refused");
    assert!(matches!(error, GatewayError::Transport(_)));
}
