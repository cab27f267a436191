//! Typed access to the clinic backend.
//!
//! Every call builds its own short-lived HTTP client, sends one request and returns either the
//! parsed JSON body or a [`GatewayError`]. A 2xx body of the form `{"error": "..."}` is reported
//! as [`GatewayError::Backend`], so callers never have to look for an error key themselves.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, multipart};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::Path;
use tracing::{debug, error};

use crate::{
    config::Config,
    error::{GatewayError, GatewayResult},
    models::{AnalysisRecord, CategoriesEnvelope, DoctorRecord, FaqAnswer, InfoEnvelope, InfoRecord},
};

const INFO_PATH: &str = "info";
const CATEGORIES_PATH: &str = "categories";
const AUDIO_PATH: &str = "process_audio";

/// Backend endpoints that take a `{"text": ...}` body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEndpoint {
    DoctorsList,
    AnalysisList,
    Certificates,
    Faq,
}

impl QueryEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            QueryEndpoint::DoctorsList => "doctors-list",
            QueryEndpoint::AnalysisList => "analysis-list",
            QueryEndpoint::Certificates => "analysis-list/certificates",
            QueryEndpoint::Faq => "faq",
        }
    }
}

/// Raw backend operations
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /info`
    async fn fetch_info(&self) -> GatewayResult<Value>;

    /// `GET /categories`, authorized with the bearer secret
    async fn fetch_categories(&self) -> GatewayResult<Value>;

    /// `POST /<endpoint>` with `{"text": text}`
    async fn submit_query(&self, endpoint: QueryEndpoint, text: &str) -> GatewayResult<Value>;

    /// `POST /process_audio` with the WAV file as multipart field `file`
    async fn submit_audio(&self, path: &Path) -> GatewayResult<Value>;
}

/// The query sent to `analysis-list` for a search inside a category
pub fn analysis_query(category: &str, term: &str) -> String {
    format!("{category}.{term}")
}

fn decode<T: DeserializeOwned>(value: Value) -> GatewayResult<T> {
    Ok(serde_json::from_value(value)?)
}

/// Domain-typed helpers on top of any [`Backend`]
#[async_trait]
pub trait BackendExt: Backend {
    async fn clinic_info(&self) -> GatewayResult<InfoRecord> {
        let envelope: InfoEnvelope = decode(self.fetch_info().await?)?;
        Ok(envelope.info)
    }

    async fn analysis_categories(&self) -> GatewayResult<Vec<String>> {
        let envelope: CategoriesEnvelope = decode(self.fetch_categories().await?)?;
        Ok(envelope.categories)
    }

    async fn search_doctors(&self, name: &str) -> GatewayResult<Vec<DoctorRecord>> {
        decode(self.submit_query(QueryEndpoint::DoctorsList, name).await?)
    }

    async fn search_analyses(&self, category: &str, term: &str) -> GatewayResult<Vec<AnalysisRecord>> {
        let query = analysis_query(category, term);
        decode(self.submit_query(QueryEndpoint::AnalysisList, &query).await?)
    }

    async fn search_certificates(&self, category: &str) -> GatewayResult<Vec<AnalysisRecord>> {
        decode(self.submit_query(QueryEndpoint::Certificates, category).await?)
    }

    async fn ask_faq(&self, question: &str) -> GatewayResult<String> {
        let answer: FaqAnswer = decode(self.submit_query(QueryEndpoint::Faq, question).await?)?;
        Ok(answer.answer)
    }
}

impl<T: Backend + ?Sized> BackendExt for T {}

/// HTTP implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct BackendGateway {
    base_url: String,
    secret_key: Option<String>,
}

impl BackendGateway {
    pub fn new(base_url: impl Into<String>, secret_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.backend_url.clone(), config.secret_key.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn read_json(response: Response) -> GatewayResult<Value> {
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    let value: Value = serde_json::from_slice(&body)?;

    if let Some(message) = value.get("error") {
        let message = message
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| message.to_string());
        return Err(GatewayError::Backend(message));
    }

    Ok(value)
}

fn log_failure(path: &str) -> impl Fn(&GatewayError) + '_ {
    move |e| error!(endpoint = path, "backend request failed: {}", e)
}

async fn audio_form(path: &Path) -> GatewayResult<multipart::Form> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("voice.wav")
        .to_string();

    let part = multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("audio/wav")?;
    Ok(multipart::Form::new().part("file", part))
}

impl BackendGateway {
    async fn send(&self, path: &str, request: RequestBuilder) -> GatewayResult<Value> {
        let response = request.send().await?;
        debug!(endpoint = path, status = response.status().as_u16(), "backend responded");
        read_json(response).await
    }
}

#[async_trait]
impl Backend for BackendGateway {
    async fn fetch_info(&self) -> GatewayResult<Value> {
        let request = Client::new().get(self.url(INFO_PATH));
        self.send(INFO_PATH, request)
            .await
            .inspect_err(log_failure(INFO_PATH))
    }

    async fn fetch_categories(&self) -> GatewayResult<Value> {
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(GatewayError::MissingSecret)
            .inspect_err(log_failure(CATEGORIES_PATH))?;

        let request = Client::new()
            .get(self.url(CATEGORIES_PATH))
            .bearer_auth(secret);
        self.send(CATEGORIES_PATH, request)
            .await
            .inspect_err(log_failure(CATEGORIES_PATH))
    }

    async fn submit_query(&self, endpoint: QueryEndpoint, text: &str) -> GatewayResult<Value> {
        let path = endpoint.path();
        debug!(endpoint = path, "submitting query");
        let request = Client::new()
            .post(self.url(path))
            .json(&json!({ "text": text }));
        self.send(path, request)
            .await
            .inspect_err(log_failure(path))
    }

    async fn submit_audio(&self, path: &Path) -> GatewayResult<Value> {
        let form = audio_form(path)
            .await
            .inspect_err(log_failure(AUDIO_PATH))?;
        let request = Client::new().post(self.url(AUDIO_PATH)).multipart(form);
        self.send(AUDIO_PATH, request)
            .await
            .inspect_err(log_failure(AUDIO_PATH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, StatusCode, header},
        routing::{get, post},
    };

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    async fn categories(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
        match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            Some("Bearer s3cret") => Ok(Json(json!({ "categories": ["Кровь", "Моча"] }))),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    async fn doctors(Json(body): Json<Value>) -> Json<Value> {
        Json(json!([{
            "specialization": body["text"],
            "academic_degree": "к.м.н.",
            "type_visit": "первичный",
            "price": 1200
        }]))
    }

    async fn upload(headers: HeaderMap, body: Bytes) -> Result<Json<Value>, StatusCode> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let body = String::from_utf8_lossy(&body);

        let ok = content_type.starts_with("multipart/form-data")
            && body.contains("name=\"file\"")
            && body.contains("filename=\"voice_42.wav\"")
            && body.contains("audio/wav")
            && body.contains("RIFF");
        if ok {
            Ok(Json(json!({ "answer": "распознано" })))
        } else {
            Err(StatusCode::BAD_REQUEST)
        }
    }

    fn backend_router() -> Router {
        Router::new()
            .route(
                "/info",
                get(|| async { Json(json!({ "info": { "phone": "123", "addresses": [] } })) }),
            )
            .route("/categories", get(categories))
            .route("/doctors-list", post(doctors))
            .route(
                "/analysis-list",
                post(|| async { Json(json!({ "error": "Ошибка сервера" })) }),
            )
            .route(
                "/faq",
                post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/analysis-list/certificates",
                post(|| async { "definitely not json" }),
            )
            .route("/process_audio", post(upload))
    }

    #[tokio::test]
    async fn test_fetch_info_returns_body() {
        let base = spawn_backend(backend_router()).await;
        let gateway = BackendGateway::new(format!("{base}/"), None);

        let info = gateway.clinic_info().await.unwrap();
        assert_eq!(info.phone.as_deref(), Some("123"));
        assert!(info.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_categories_send_bearer_secret() {
        let base = spawn_backend(backend_router()).await;

        let authorized = BackendGateway::new(base.clone(), Some("s3cret".to_string()));
        assert_eq!(
            authorized.analysis_categories().await.unwrap(),
            vec!["Кровь".to_string(), "Моча".to_string()]
        );

        let wrong = BackendGateway::new(base.clone(), Some("nope".to_string()));
        assert!(matches!(
            wrong.analysis_categories().await,
            Err(GatewayError::Status(401))
        ));

        let missing = BackendGateway::new(base, None);
        assert!(matches!(
            missing.analysis_categories().await,
            Err(GatewayError::MissingSecret)
        ));
    }

    #[tokio::test]
    async fn test_query_posts_text_body() {
        let base = spawn_backend(backend_router()).await;
        let gateway = BackendGateway::new(base, None);

        let doctors = gateway.search_doctors("Кардиолог").await.unwrap();
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].specialization, "Кардиолог");
        assert_eq!(doctors[0].price.to_string(), "1200");
    }

    #[tokio::test]
    async fn test_error_kinds_are_distinguished() {
        let base = spawn_backend(backend_router()).await;
        let gateway = BackendGateway::new(base, None);

        match gateway.search_analyses("Кровь", "ОАК").await {
            Err(GatewayError::Backend(message)) => assert_eq!(message, "Ошибка сервера"),
            other => panic!("expected backend error, got {other:?}"),
        }
        assert!(matches!(
            gateway.ask_faq("как сдать кровь?").await,
            Err(GatewayError::Status(500))
        ));
        assert!(matches!(
            gateway.search_certificates("справки (бассейн)").await,
            Err(GatewayError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let gateway = BackendGateway::new("http://127.0.0.1:1", None);
        assert!(matches!(
            gateway.fetch_info().await,
            Err(GatewayError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_audio_uploads_multipart_file() {
        let base = spawn_backend(backend_router()).await;
        let gateway = BackendGateway::new(base, None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice_42.wav");
        tokio::fs::write(&path, b"RIFF....WAVEfmt ").await.unwrap();

        let value = gateway.submit_audio(&path).await.unwrap();
        assert_eq!(value["answer"], "распознано");

        let missing = gateway.submit_audio(&dir.path().join("absent.wav")).await;
        assert!(matches!(missing, Err(GatewayError::Io(_))));
    }

    #[test]
    fn test_analysis_query_joins_with_dot() {
        assert_eq!(analysis_query("Кровь", "ферритин"), "Кровь.ферритин");
        assert_eq!(QueryEndpoint::Certificates.path(), "analysis-list/certificates");
    }
}
