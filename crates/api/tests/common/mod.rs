#![allow(dead_code)]

use std::sync::Arc;

use agency_api::auth::jwt::{digest_api_key, Claims, JwtConfig};
use agency_api::config::{AutomationConfig, ServerConfig};
use agency_api::router::build_app_router;
use agency_api::state::AppState;
use agency_api::ws::WsManager;
use agency_core::roles::{Actor, Role, UserStatus};
use agency_core::types::DbId;
use agency_db::models::fiverr_account::NewFiverrAccount;
use agency_db::models::user::NewUser;
use agency_db::{EntityStore, MemoryStore};
use agency_events::EventBus;
use agency_workflow::{Workflow, WorkflowSettings};
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const AUTOMATION_KEY: &str = "test-automation-key";

/// Sign a token for `actor` the way the identity service does, expiring
/// `ttl_secs` from now (negative for an already expired token).
pub fn sign_token(actor: &Actor, config: &JwtConfig, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: actor.user_id,
        role: actor.role,
        exp: now + ttl_secs,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .unwrap()
}

/// Build a test `ServerConfig` with safe defaults. The automation surface
/// acts as `automation_actor`.
pub fn test_config(automation_actor: DbId) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-for-api-tests".to_string(),
        },
        automation: Some(AutomationConfig {
            key_digest: digest_api_key(AUTOMATION_KEY),
            actor_id: automation_actor,
        }),
        idle_project_days: 7,
    }
}

/// The full application over an in-memory store, with one user per role.
pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub admin: Actor,
    pub manager: Actor,
    pub lead: Actor,
    pub designer: Actor,
    pub dev: Actor,
    pub account_id: DbId,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_automation(true).await
    }

    pub async fn with_automation(enabled: bool) -> Self {
        let store = MemoryStore::new();
        let admin = seed_user(&store, "admin", Role::Admin).await;
        let manager = seed_user(&store, "manager", Role::Manager).await;
        let lead = seed_user(&store, "lead", Role::TeamLead).await;
        let designer = seed_user(&store, "designer", Role::Designer).await;
        let dev = seed_user(&store, "dev", Role::Developer).await;

        let account_id = {
            let mut tx = store.begin().await.unwrap();
            let account = tx
                .insert_fiverr_account(&NewFiverrAccount {
                    name: "studio-main".to_string(),
                })
                .await
                .unwrap();
            tx.commit().await.unwrap();
            account.id
        };

        let mut config = test_config(admin.user_id);
        if !enabled {
            config.automation = None;
        }

        let bus = Arc::new(EventBus::new(64));
        let workflow = Workflow::new(
            Arc::new(store.clone()),
            bus,
            WorkflowSettings {
                idle_project_days: config.idle_project_days,
            },
        );
        let state = AppState {
            workflow: Arc::new(workflow),
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
        };

        Self {
            state,
            store,
            admin,
            manager,
            lead,
            designer,
            dev,
            account_id,
        }
    }

    /// Same middleware stack as `main.rs`.
    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.state.config)
    }

    pub fn token(&self, actor: &Actor) -> String {
        sign_token(actor, &self.state.config.jwt, 15 * 60)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        actor: Option<&Actor>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header("authorization", format!("Bearer {}", self.token(actor)));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, actor: &Actor) -> Response<Body> {
        self.send(Method::GET, uri, Some(actor), None).await
    }

    pub async fn post(&self, uri: &str, actor: &Actor, body: serde_json::Value) -> Response<Body> {
        self.send(Method::POST, uri, Some(actor), Some(body)).await
    }

    pub async fn post_empty(&self, uri: &str, actor: &Actor) -> Response<Body> {
        self.send(Method::POST, uri, Some(actor), None).await
    }

    pub async fn put(&self, uri: &str, actor: &Actor, body: serde_json::Value) -> Response<Body> {
        self.send(Method::PUT, uri, Some(actor), Some(body)).await
    }

    /// Call the automation surface with the given `X-API-Key`.
    pub async fn automation(
        &self,
        method: Method,
        uri: &str,
        key: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router().oneshot(request).await.unwrap()
    }

    /// Create a NEW project managed by `self.manager`, returning its id.
    pub async fn create_project(&self) -> DbId {
        let response = self
            .post(
                "/api/v1/projects",
                &self.admin,
                serde_json::json!({
                    "internal_name": "Storefront redesign",
                    "client_name": "Acme",
                    "fiverr_account_id": self.account_id,
                    "fiverr_order_id": null,
                    "priority": "HIGH",
                    "complexity": "MEDIUM",
                    "manager_id": self.manager.user_id,
                    "budget_cents": 150000,
                    "deadline": null,
                    "internal_deadline": null,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }

    /// An IN_PROGRESS project with the team lead and designer assigned.
    pub async fn staffed_project(&self) -> DbId {
        let id = self.create_project().await;
        let response = self
            .put(
                &format!("/api/v1/projects/{id}/team-lead"),
                &self.manager,
                serde_json::json!({ "user_id": self.lead.user_id }),
            )
            .await;
        assert_eq!(response.status(), 200);
        let response = self
            .put(
                &format!("/api/v1/projects/{id}/designer"),
                &self.manager,
                serde_json::json!({ "user_id": self.designer.user_id }),
            )
            .await;
        assert_eq!(response.status(), 200);
        id
    }

    /// A task on `project_id` assigned to `self.dev`, returning its id.
    pub async fn create_task(&self, project_id: DbId) -> DbId {
        let response = self
            .post(
                &format!("/api/v1/projects/{project_id}/tasks"),
                &self.lead,
                serde_json::json!({
                    "title": "Build the landing page",
                    "description": null,
                    "assigned_to_id": self.dev.user_id,
                    "priority": 5,
                    "due_date": null,
                }),
            )
            .await;
        assert_eq!(response.status(), 201);
        body_json(response).await["data"]["id"].as_i64().unwrap()
    }
}

async fn seed_user(store: &MemoryStore, name: &str, role: Role) -> Actor {
    let mut tx = store.begin().await.unwrap();
    let user = tx
        .insert_user(&NewUser {
            email: format!("{name}@agency.test"),
            name: name.to_string(),
            role,
            status: UserStatus::Active,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    Actor::new(user.id, role)
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
