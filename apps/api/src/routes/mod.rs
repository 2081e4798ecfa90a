pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::content::handlers;
use crate::content::records::{Certification, SkillCategory, TechItem, TrainingItem};
use crate::content::Section;
use crate::state::AppState;

/// GET/POST on the collection, PATCH/DELETE on a record, POST to reset.
fn section_routes<R: Section>(router: Router<AppState>, slug: &str) -> Router<AppState> {
    let base = format!("/api/v1/sections/{slug}");
    router
        .route(
            &base,
            get(handlers::handle_get_section::<R>).post(handlers::handle_add::<R>),
        )
        .route(&format!("{base}/reset"), post(handlers::handle_reset::<R>))
        .route(
            &format!("{base}/:id"),
            patch(handlers::handle_update_field::<R>).delete(handlers::handle_delete::<R>),
        )
}

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Edit session
        .route("/api/v1/edit", get(handlers::handle_edit_status))
        .route("/api/v1/edit/toggle", post(handlers::handle_toggle_edit))
        .route("/api/v1/edit/acknowledge", post(handlers::handle_acknowledge))
        .route("/api/v1/edit/notices", get(handlers::handle_drain_notices))
        // Nested skills
        .route(
            "/api/v1/sections/skills/:id/skills",
            post(handlers::handle_add_skill),
        )
        .route(
            "/api/v1/sections/skills/:id/skills/:skill_id",
            patch(handlers::handle_update_skill).delete(handlers::handle_delete_skill),
        );

    let router = section_routes::<SkillCategory>(router, "skills");
    let router = section_routes::<TechItem>(router, "tech-stack");
    let router = section_routes::<Certification>(router, "certifications");
    let router = section_routes::<TrainingItem>(router, "training");

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, SyncBackend};
    use crate::content::catalog::{CERTIFICATIONS_KEY, TRAINING_KEY};
    use crate::content::edit_mode::EditSession;
    use crate::content::storage::MemoryStorage;
    use crate::content::sync::RecordingSync;
    use crate::content::Portfolio;

    const TOKEN: &str = "owner-secret";

    struct TestApp {
        router: Router,
        storage: Arc<MemoryStorage>,
        sync: Arc<RecordingSync>,
    }

    async fn test_app() -> TestApp {
        test_app_with_token(TOKEN).await
    }

    async fn test_app_with_token(owner_token: &str) -> TestApp {
        let storage = Arc::new(MemoryStorage::new());
        let sync = Arc::new(RecordingSync::default());
        let portfolio = Portfolio::load(storage.clone(), sync.clone()).await;
        let state = AppState {
            portfolio: Arc::new(portfolio),
            session: Arc::new(EditSession::new()),
            config: Config {
                database_url: None,
                owner_token: owner_token.to_string(),
                sync: SyncBackend::Disabled,
                port: 0,
                rust_log: "info".to_string(),
            },
        };
        TestApp {
            router: build_router(state),
            storage,
            sync,
        }
    }

    async fn send(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
        owner: bool,
    ) -> (StatusCode, Value) {
        let auth = owner.then(|| format!("Bearer {TOKEN}"));
        send_with_auth(app, method, uri, body, auth.as_deref()).await
    }

    async fn send_with_auth(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authorization: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn enable_edit_mode(app: &TestApp) {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/v1/edit/toggle",
            Some(json!({ "enabled": true })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;
        let (status, body) = send(&app, Method::GET, "/health", None, false).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_visitor_sees_seeded_section_without_affordances() {
        let app = test_app().await;
        let (status, body) =
            send(&app, Method::GET, "/api/v1/sections/certifications", None, false).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["storage_key"], CERTIFICATIONS_KEY);
        assert_eq!(body["records"][0]["id"], "cert_0");
        assert_eq!(body["records"][0]["name"], "AWS Certified Developer");
        assert_eq!(body["affordances"]["can_add"], false);
    }

    #[tokio::test]
    async fn test_toggle_requires_owner_token() {
        let app = test_app().await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/edit/toggle",
            Some(json!({ "enabled": true })),
            false,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_blank_bearer_never_matches_blank_owner_token() {
        let app = test_app_with_token("").await;
        let (status, body) = send_with_auth(
            &app,
            Method::POST,
            "/api/v1/edit/toggle",
            Some(json!({ "enabled": true })),
            Some("Bearer    "),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");

        let (_, status_body) = send(&app, Method::GET, "/api/v1/edit", None, false).await;
        assert_eq!(status_body["is_edit_mode"], false);
    }

    #[tokio::test]
    async fn test_bearer_with_surrounding_whitespace_matches() {
        let app = test_app_with_token("owner-secret\n").await;
        let (status, body) = send_with_auth(
            &app,
            Method::POST,
            "/api/v1/edit/toggle",
            Some(json!({ "enabled": true })),
            Some("Bearer owner-secret "),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_edit_mode"], true);
    }

    #[tokio::test]
    async fn test_mutation_requires_edit_mode() {
        let app = test_app().await;
        let (status, body) =
            send(&app, Method::POST, "/api/v1/sections/tech-stack", None, true).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "EDIT_MODE_DISABLED");
    }

    #[tokio::test]
    async fn test_add_persists_and_marks_unsaved() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/sections/certifications",
            Some(json!({ "name": "CKA", "issuer": "CNCF", "year": "2025" })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["persist"]["status"], "persisted");
        assert_eq!(body["section"]["records"].as_array().unwrap().len(), 5);
        assert_eq!(body["section"]["affordances"]["can_delete"], true);

        let stored = app.storage.get(CERTIFICATIONS_KEY).unwrap();
        assert!(stored.contains("CNCF"));
        assert_eq!(app.sync.calls().len(), 1);

        let (_, status_body) = send(&app, Method::GET, "/api/v1/edit", None, false).await;
        assert_eq!(status_body["has_unsaved_changes"], true);

        let (_, ack) = send(&app, Method::POST, "/api/v1/edit/acknowledge", None, true).await;
        assert_eq!(ack["has_unsaved_changes"], false);
    }

    #[tokio::test]
    async fn test_progress_patch_clamps() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/sections/training/training_1",
            Some(json!({ "field": "progress", "value": 200 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], true);
        assert_eq!(body["section"]["records"][1]["progress"], 100);
        assert_eq!(body["section"]["affordances"]["can_edit_progress"], true);

        let stored: Value = serde_json::from_str(&app.storage.get(TRAINING_KEY).unwrap()).unwrap();
        assert_eq!(stored[1]["progress"], 100);
    }

    #[tokio::test]
    async fn test_overlong_text_returns_notice_and_skips_write() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/sections/tech-stack/tech_0",
            Some(json!({ "field": "name", "value": "x".repeat(120) })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["persist"]["status"], "rejected");
        assert!(body["notice"].as_str().unwrap().contains("Validation error"));
        assert!(app.storage.get("tech_stack").is_none());

        let (_, notices) = send(&app, Method::GET, "/api/v1/edit/notices", None, true).await;
        assert_eq!(notices["notices"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_field_is_bad_request() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/sections/certifications/cert_0",
            Some(json!({ "field": "progress", "value": 3 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_missing_id_is_noop() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::DELETE,
            "/api/v1/sections/tech-stack/tech_nope",
            None,
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], false);
        assert_eq!(body["section"]["records"].as_array().unwrap().len(), 18);
    }

    #[tokio::test]
    async fn test_nested_skill_lifecycle() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/sections/skills/cat_0/skills",
            Some(json!({ "name": "Svelte", "level": 60 })),
            true,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let skill_id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["section"]["records"][0]["skills"][5]["name"], "Svelte");

        let (_, body) = send(
            &app,
            Method::PATCH,
            &format!("/api/v1/sections/skills/cat_0/skills/{skill_id}"),
            Some(json!({ "field": "level", "value": "-20" })),
            true,
        )
        .await;
        assert_eq!(body["section"]["records"][0]["skills"][5]["level"], 0);

        let (_, body) = send(
            &app,
            Method::DELETE,
            &format!("/api/v1/sections/skills/cat_0/skills/{skill_id}"),
            None,
            true,
        )
        .await;
        assert_eq!(body["changed"], true);
        assert_eq!(body["section"]["records"][0]["skills"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let app = test_app().await;
        enable_edit_mode(&app).await;

        send(&app, Method::DELETE, "/api/v1/sections/certifications/cert_0", None, true).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/sections/certifications/reset",
            None,
            true,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["section"]["records"][0]["id"], "cert_0");
        assert_eq!(body["section"]["records"].as_array().unwrap().len(), 4);
    }
}
