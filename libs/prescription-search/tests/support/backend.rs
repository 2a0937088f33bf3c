//! Fake PostgREST backend served by axum on a random local port

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use receita_search::Prescription;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A request as seen by the fake backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub pairs: Vec<(String, String)>,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    /// All values of a query parameter, in order.
    pub fn values(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values(key).into_iter().next()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// What the fake backend sends back
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with a JSON array and, when `total` is set, a `Content-Range` header
    Rows { body: Value, total: Option<u64> },
    /// Error status with a raw body
    Error { status: u16, body: String },
    /// 416 with a PGRST103 body and, when `total` is set, `Content-Range: */total`
    RangeNotSatisfiable { total: Option<u64> },
    /// Wait this long, then answer with an empty array
    Slow(Duration),
}

impl Reply {
    pub fn rows(rows: &[Prescription], total: u64) -> Self {
        Reply::Rows {
            body: serde_json::to_value(rows).unwrap(),
            total: Some(total),
        }
    }

    pub fn json(body: Value) -> Self {
        Reply::Rows { body, total: None }
    }
}

type Responder = dyn Fn(&RecordedRequest) -> Reply + Send + Sync;

#[derive(Clone)]
struct FakeState {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct FakeBackend {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            responder: Arc::new(responder),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/rest/v1/prescriptions", get(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            server,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn handle(
    State(state): State<FakeState>,
    Query(pairs): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let request = RecordedRequest { pairs, headers };
    let reply = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);

    match reply {
        Reply::Rows { body, total } => {
            let len = body.as_array().map(|a| a.len()).unwrap_or(0) as u64;
            match total {
                Some(total) => {
                    let range = if len == 0 {
                        format!("*/{total}")
                    } else {
                        format!("0-{}/{total}", len - 1)
                    };
                    (StatusCode::OK, [(header::CONTENT_RANGE, range)], Json(body)).into_response()
                }
                None => (StatusCode::OK, Json(body)).into_response(),
            }
        }
        Reply::Error { status, body } => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Reply::RangeNotSatisfiable { total } => {
            let body = serde_json::json!({
                "code": "PGRST103",
                "message": "Requested range not satisfiable",
                "details": "An offset of 200 was requested, but there are only 12 rows.",
                "hint": null
            });
            let mut response = (StatusCode::RANGE_NOT_SATISFIABLE, Json(body)).into_response();
            if let Some(total) = total {
                response.headers_mut().insert(
                    header::CONTENT_RANGE,
                    format!("*/{total}").parse().unwrap(),
                );
            }
            response
        }
        Reply::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(Value::Array(Vec::new()))).into_response()
        }
    }
}
