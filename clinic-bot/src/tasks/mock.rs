use async_trait::async_trait;
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use crate::{
    error::{GatewayError, GatewayResult},
    gateway::{Backend, QueryEndpoint},
};

/// A backend call as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Info,
    Categories,
    Query(QueryEndpoint, String),
    Audio(PathBuf),
}

/// Canned backend answers; endpoints without an answer fail with status 500.
#[derive(Default)]
pub struct MockBackend {
    info: Option<Value>,
    categories: Option<Value>,
    queries: HashMap<&'static str, Value>,
    audio: Option<Value>,
    upload_delay: Duration,
    uploads_in_flight: AtomicUsize,
    peak_uploads: AtomicUsize,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, body: Value) -> Self {
        self.info = Some(body);
        self
    }

    pub fn with_categories(mut self, categories: &[&str]) -> Self {
        self.categories = Some(json!({ "categories": categories }));
        self
    }

    pub fn with_query(mut self, endpoint: QueryEndpoint, body: Value) -> Self {
        self.queries.insert(endpoint.path(), body);
        self
    }

    pub fn with_audio(mut self, body: Value) -> Self {
        self.audio = Some(body);
        self
    }

    /// Make every upload take a while, so overlapping uploads show up in [`Self::peak_uploads`]
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = delay;
        self
    }

    /// Most uploads that were ever running at the same time
    pub fn peak_uploads(&self) -> usize {
        self.peak_uploads.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn answer(body: Option<&Value>) -> GatewayResult<Value> {
        match body {
            Some(value) => match value.get("error").and_then(Value::as_str) {
                Some(message) => Err(GatewayError::Backend(message.to_string())),
                None => Ok(value.clone()),
            },
            None => Err(GatewayError::Status(500)),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_info(&self) -> GatewayResult<Value> {
        self.record(Call::Info);
        Self::answer(self.info.as_ref())
    }

    async fn fetch_categories(&self) -> GatewayResult<Value> {
        self.record(Call::Categories);
        Self::answer(self.categories.as_ref())
    }

    async fn submit_query(&self, endpoint: QueryEndpoint, text: &str) -> GatewayResult<Value> {
        self.record(Call::Query(endpoint, text.to_string()));
        Self::answer(self.queries.get(endpoint.path()))
    }

    async fn submit_audio(&self, path: &Path) -> GatewayResult<Value> {
        self.record(Call::Audio(path.to_path_buf()));
        let running = self.uploads_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_uploads.fetch_max(running, Ordering::SeqCst);

        let uploaded = tokio::fs::read(path).await;
        tokio::time::sleep(self.upload_delay).await;
        self.uploads_in_flight.fetch_sub(1, Ordering::SeqCst);

        match uploaded {
            Ok(bytes) if bytes.starts_with(b"RIFF") => Self::answer(self.audio.as_ref()),
            Ok(_) => Err(GatewayError::Backend("upload is not a WAV file".to_string())),
            Err(e) => Err(GatewayError::Io(e)),
        }
    }
}
