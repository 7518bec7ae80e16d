#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// Each context builds the full router over a fresh `MemoryStore` and a
/// scripted generator, so these tests need neither Postgres nor network.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Duration;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use studioplan_api::app::{build_router, AppState};
use studioplan_api::config::Config;
use studioplan_shared::auth::session::{issue_token, SessionClaims, DEFAULT_AUDIENCE};
use studioplan_shared::genai::{ConceptGenerator, GenerationError};
use studioplan_shared::store::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-that-is-at-least-32-characters-long";

/// Generator that returns a fixed concept and records what it was asked
pub struct ScriptedGenerator {
    pub reply: Mutex<Result<String, (u16, String)>>,
    pub calls: AtomicUsize,
    pub last_key: Mutex<Option<String>>,
    pub last_prompt: Mutex<Option<String>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Mutex::new(Ok(text.to_string())),
            calls: AtomicUsize::new(0),
            last_key: Mutex::new(None),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.reply.lock().unwrap() = Err((status, message.to_string()));
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConceptGenerator for ScriptedGenerator {
    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_key.lock().unwrap() = Some(api_key.to_string());
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());

        match &*self.reply.lock().unwrap() {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(GenerationError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DATABASE_URL".into(), "postgres://unused/studioplan".into());
    vars.insert("AUTH_JWT_SECRET".into(), TEST_SECRET.into());
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

/// Test context containing the router and its backing fakes
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<ScriptedGenerator>,
    pub user_id: Uuid,
    pub token: String,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config(&[]))
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(ScriptedGenerator::replying(
            "## Script\n**Hook (3 sec):** Stop scrolling.",
        ));
        let state = AppState::new(store.clone(), generator.clone(), config);

        let user_id = Uuid::new_v4();
        let token = token_for(user_id, Duration::hours(1));

        Self {
            app: build_router(state),
            store,
            generator,
            user_id,
            token,
        }
    }

    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Sends an authenticated request as the context's user
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    pub async fn send_as(
        &self,
        token: &str,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/json");
        let request = match body {
            Some(json) => request.body(Body::from(json.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        self.call(request).await
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn token_for(user_id: Uuid, expires_in: Duration) -> String {
    let claims = SessionClaims::new(
        user_id,
        Some(format!("{}@example.com", user_id)),
        DEFAULT_AUDIENCE,
        expires_in,
    );
    issue_token(&claims, TEST_SECRET).unwrap()
}
