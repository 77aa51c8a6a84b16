#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use curator_client::{
    ClientConfig, HttpResponse, RemoteClient, RetryPolicy, Transport, TransportError,
};

/// One recorded request: `"GET url"` / `"POST url"` / `"UPLOAD url name"`,
/// plus the decoded JSON body for POSTs.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub summary: String,
    pub body: Option<serde_json::Value>,
}

/// Scripted transport: pops one canned outcome per request, in order, and
/// records every request it saw.
pub struct FakeTransport {
    script: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(FakeTransport {
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> RecordedRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    fn next(
        &self,
        summary: String,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { summary, body });
        let mut script = self.script.lock().unwrap();
        assert!(!script.is_empty(), "fake transport script exhausted");
        script.remove(0)
    }
}

/// Keeps the fake inspectable after the client takes ownership of its
/// transport box.
pub struct Shared(pub Arc<FakeTransport>);

impl Transport for Shared {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        self.0.next(format!("GET {url}"), None)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        self.0.next(format!("POST {url}"), Some(body.clone()))
    }

    fn post_multipart(
        &self,
        url: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        self.0.next(
            format!("UPLOAD {url} {file_name}"),
            Some(serde_json::Value::String(
                String::from_utf8_lossy(content).into_owned(),
            )),
        )
    }
}

pub fn ok(body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16, body: &str) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        body: body.to_string(),
    })
}

/// Route the crates' `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn client(fake: Arc<FakeTransport>) -> RemoteClient {
    let mut config = ClientConfig::new("http://store.test", "http://regen.test");
    config.retry = RetryPolicy::immediate();
    RemoteClient::with_transport(&config, Box::new(Shared(fake)))
}
