use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

const XML_CONTENT_TYPE: &str = "application/xml";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_cents: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub price_cents: u32,
}

#[derive(Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<u32>,
}

#[derive(Deserialize)]
pub struct ProductFilter {
    pub category: Option<String>,
}

/// What `/echo` saw of a request.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub length: usize,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename = "products")]
struct ProductsXml<'a> {
    product: &'a [Product],
}

#[derive(Serialize)]
struct OrdersXml<'a> {
    order: &'a [Order],
}

#[derive(Serialize)]
#[serde(rename = "catalog")]
struct CatalogXml<'a> {
    products: ProductsXml<'a>,
    orders: OrdersXml<'a>,
}

#[derive(Serialize)]
struct Catalog<'a> {
    products: &'a [Product],
    orders: &'a [Order],
}

#[derive(Debug, Default)]
pub struct Store {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
}

impl Store {
    /// Two teas and one order for the first of them.
    pub fn seeded() -> Self {
        let sencha = Product {
            id: Uuid::new_v4(),
            name: "Sencha".to_string(),
            category: "green".to_string(),
            price_cents: 450,
        };
        let assam = Product {
            id: Uuid::new_v4(),
            name: "Assam".to_string(),
            category: "black".to_string(),
            price_cents: 390,
        };
        let order = Order {
            id: Uuid::new_v4(),
            product_id: sencha.id,
            quantity: 3,
        };
        Self {
            products: vec![sencha, assam],
            orders: vec![order],
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products.xml", get(list_products_xml))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/catalog", get(catalog))
        .route("/catalog.xml", get(catalog_xml))
        .route("/echo", post(echo).put(echo))
        .route("/echo/query", get(echo_query).delete(echo_query))
        .route("/echo/headers", get(echo_headers))
        .route("/latin1", get(latin1))
        .route("/binary", get(binary))
        .route("/slow", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn xml<E: std::fmt::Display>(document: Result<String, E>) -> Response {
    match document {
        Ok(body) => ([(header::CONTENT_TYPE, XML_CONTENT_TYPE)], body).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn list_products(State(db): State<Db>, Query(filter): Query<ProductFilter>) -> Json<Vec<Product>> {
    let store = db.read().await;
    let products = store
        .products
        .iter()
        .filter(|p| filter.category.as_ref().map_or(true, |c| &p.category == c))
        .cloned()
        .collect();
    Json(products)
}

async fn list_products_xml(State(db): State<Db>) -> Response {
    let store = db.read().await;
    xml(quick_xml::se::to_string(&ProductsXml {
        product: &store.products,
    }))
}

async fn create_product(State(db): State<Db>, Form(input): Form<CreateProduct>) -> (StatusCode, Json<Product>) {
    let product = Product {
        id: Uuid::new_v4(),
        name: input.name,
        category: input.category,
        price_cents: input.price_cents,
    };
    db.write().await.products.push(product.clone());
    (StatusCode::CREATED, Json(product))
}

async fn get_product(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<Product>, StatusCode> {
    let store = db.read().await;
    store
        .products
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Form(input): Form<UpdateProduct>,
) -> Result<Json<Product>, StatusCode> {
    let mut store = db.write().await;
    let product = store
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(category) = input.category {
        product.category = category;
    }
    if let Some(price_cents) = input.price_cents {
        product.price_cents = price_cents;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(State(db): State<Db>, Path(id): Path<Uuid>) -> StatusCode {
    let mut store = db.write().await;
    let before = store.products.len();
    store.products.retain(|p| p.id != id);
    if store.products.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn catalog(State(db): State<Db>) -> Response {
    let store = db.read().await;
    Json(Catalog {
        products: &store.products,
        orders: &store.orders,
    })
    .into_response()
}

async fn catalog_xml(State(db): State<Db>) -> Response {
    let store = db.read().await;
    xml(quick_xml::se::to_string(&CatalogXml {
        products: ProductsXml {
            product: &store.products,
        },
        orders: OrdersXml { order: &store.orders },
    }))
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        length: body.len(),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn echo_query(Query(pairs): Query<Vec<(String, String)>>) -> Json<Vec<(String, String)>> {
    Json(pairs)
}

async fn echo_headers(headers: HeaderMap) -> Json<Vec<(String, String)>> {
    Json(
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
    )
}

/// "café" in ISO-8859-1.
async fn latin1() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=ISO-8859-1")],
        vec![b'c', b'a', b'f', 0xE9],
    )
}

async fn binary() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0xFF_u8, 0x00, 0xFE, 0x80],
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "late"
}
