use crate::http::{HttpResponse, HttpTransport, HttpUrl, TransportError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

type Scripted = Result<HttpResponse, TransportError>;

/// Scripted transport. Each URL replays its responses in order and then keeps
/// repeating the last one. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: &str, responses: Vec<Scripted>) -> Self {
        assert!(!responses.is_empty(), "a route needs at least one response");
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), responses.into());
        self
    }

    pub fn ok(self, url: &str, body: impl Into<bytes::Bytes>) -> Self {
        self.route(url, vec![Ok(HttpResponse::new(StatusCode::OK, body))])
    }

    pub fn status(self, url: &str, status: StatusCode) -> Self {
        self.route(url, vec![Ok(HttpResponse::new(status, ""))])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &HttpUrl) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url.as_str()) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap(),
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND, "")),
        }
    }
}

pub fn unavailable() -> Scripted {
    Ok(HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, ""))
}

pub fn ok(body: &'static str) -> Scripted {
    Ok(HttpResponse::new(StatusCode::OK, body))
}
