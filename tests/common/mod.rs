//! Stand-in for the catalog / SQL-agent service, served on an ephemeral port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

#[derive(Debug, Clone, Default)]
pub struct StubCatalog {
    pub suppliers: Arc<Mutex<Vec<Value>>>,
    pub products: Arc<Mutex<Vec<Value>>>,
    pub answer: Arc<Mutex<Option<Value>>>,
    pub questions: Arc<Mutex<Vec<String>>>,
    /// Raw `POST /products` bodies, as received.
    pub product_bodies: Arc<Mutex<Vec<Value>>>,
    pub fail_writes: Arc<AtomicBool>,
    pub fail_reads: Arc<AtomicBool>,
    /// `GET /suppliers` never answers while set.
    pub stall_suppliers: Arc<AtomicBool>,
}

impl StubCatalog {
    pub fn answering(answer: &str) -> Self {
        let stub = Self::default();
        stub.set_answer(json!({ "final_answer": answer }));
        stub
    }

    pub fn set_answer(&self, body: Value) {
        *self.answer.lock().unwrap() = Some(body);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn stall_suppliers(&self, stall: bool) {
        self.stall_suppliers.store(stall, Ordering::SeqCst);
    }

    pub fn supplier_count(&self) -> usize {
        self.suppliers.lock().unwrap().len()
    }

    /// Serve the stub and return its base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/sql-agent", post(sql_agent))
            .route("/suppliers", post(add_supplier).get(list_suppliers))
            .route("/products", post(add_product).get(list_products))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{address}")
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name).and_then(Value::as_str).unwrap_or_default()
}

async fn sql_agent(State(stub): State<StubCatalog>, Json(body): Json<Value>) -> Response {
    let question = field(&body, "question").to_string();
    if question.is_empty() {
        return bad_request("No question provided");
    }
    stub.questions.lock().unwrap().push(question);
    match stub.answer.lock().unwrap().clone() {
        Some(reply) => Json(reply).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "agent crashed").into_response(),
    }
}

fn read_failure(stub: &StubCatalog) -> Option<Response> {
    stub.fail_reads
        .load(Ordering::SeqCst)
        .then(|| (StatusCode::INTERNAL_SERVER_ERROR, "database offline").into_response())
}

async fn list_suppliers(State(stub): State<StubCatalog>) -> Response {
    if stub.stall_suppliers.load(Ordering::SeqCst) {
        std::future::pending::<()>().await;
    }
    if let Some(failure) = read_failure(&stub) {
        return failure;
    }
    let suppliers = stub.suppliers.lock().unwrap().clone();
    Json(suppliers).into_response()
}

async fn add_supplier(State(stub): State<StubCatalog>, Json(body): Json<Value>) -> Response {
    if stub.fail_writes.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "down").into_response();
    }
    let (name, contact, category) = (
        field(&body, "name"),
        field(&body, "contact_info"),
        field(&body, "product_category"),
    );
    if name.is_empty() || contact.is_empty() || category.is_empty() {
        return bad_request("Missing required fields");
    }

    let mut suppliers = stub.suppliers.lock().unwrap();
    let id = suppliers.len() + 1;
    suppliers.push(json!({
        "id": id,
        "name": name,
        "contact_info": contact,
        "product_category": category,
    }));
    Json(json!({ "supplier_id": id })).into_response()
}

async fn list_products(State(stub): State<StubCatalog>) -> Response {
    if let Some(failure) = read_failure(&stub) {
        return failure;
    }
    let products = stub.products.lock().unwrap().clone();
    Json(products).into_response()
}

async fn add_product(State(stub): State<StubCatalog>, Json(body): Json<Value>) -> Response {
    if stub.fail_writes.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "down").into_response();
    }
    stub.product_bodies.lock().unwrap().push(body.clone());
    let price = match &body["price"] {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    let supplier_id = match &body["supplier_id"] {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    };
    let (Some(price), Some(supplier_id)) = (price, supplier_id) else {
        return bad_request("Invalid numeric value");
    };

    let mut products = stub.products.lock().unwrap();
    let id = products.len() + 1;
    products.push(json!({
        "id": id,
        "name": field(&body, "name"),
        "brand": field(&body, "brand"),
        // Decimal columns come back as strings.
        "price": price.to_string(),
        "category": field(&body, "category"),
        "description": field(&body, "description"),
        "supplier_id": supplier_id,
    }));
    Json(json!({ "product_id": id })).into_response()
}
