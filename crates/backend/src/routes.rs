use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::shared::state::AppState;
use crate::system::auth::middleware::{require_admin, require_auth};
use crate::system::middleware::request_logger::request_logger;
use crate::{handlers, system};

/// Full HTTP surface of the portal
pub fn build_router(state: AppState) -> Router {
    // ========================================
    // PUBLIC
    // ========================================
    let public = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/auth/login", post(system::handlers::auth::login))
        .route("/api/auth/logout", post(system::handlers::auth::logout))
        .route(
            "/api/subscribers",
            post(handlers::a003_subscriber::subscribe),
        );

    // ========================================
    // ANY SESSION
    // ========================================
    let session = Router::new()
        .route("/api/auth/check", get(system::handlers::auth::check))
        .route("/api/links", get(handlers::a001_link::list))
        .route("/api/links/grouped", get(handlers::a001_link::grouped))
        .route("/api/articles", get(handlers::a002_article::list))
        .route(
            "/api/login-history",
            get(system::handlers::auth::own_login_history),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // ========================================
    // ADMIN
    // ========================================
    let admin = Router::new()
        // A001 Links
        .route(
            "/api/admin/links",
            get(handlers::a001_link::list)
                .post(handlers::a001_link::create)
                .put(handlers::a001_link::update)
                .delete(handlers::a001_link::delete),
        )
        .route("/api/admin/links/reorder", put(handlers::a001_link::reorder))
        // Users
        .route(
            "/api/admin/users",
            get(system::handlers::users::list)
                .post(system::handlers::users::create)
                .delete(system::handlers::users::delete),
        )
        .route("/api/admin/users/reset", delete(system::handlers::users::reset))
        .route(
            "/api/admin/users/bulk-import",
            post(handlers::a001_link::bulk_import_users),
        )
        .route(
            "/api/admin/login-history",
            get(system::handlers::users::login_history),
        )
        // A002 Articles
        .route(
            "/api/admin/articles",
            get(handlers::a002_article::list)
                .post(handlers::a002_article::create)
                .put(handlers::a002_article::update)
                .delete(handlers::a002_article::delete),
        )
        // A003 Subscribers
        .route(
            "/api/admin/subscribers",
            get(handlers::a003_subscriber::list)
                .put(handlers::a003_subscriber::update)
                .delete(handlers::a003_subscriber::delete),
        )
        // A004 Notifications
        .route("/api/admin/email/send", post(handlers::a004_notification::send))
        .route(
            "/api/admin/email/history",
            get(handlers::a004_notification::history),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    public
        .merge(session)
        .merge(admin)
        .with_state(state)
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_notification::LogMailer;
    use crate::shared::config::Config;
    use crate::shared::data::db::test_connection;
    use crate::system::auth::jwt::JwtKeys;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        admin_token: String,
        parent_token: String,
    }

    async fn app() -> TestApp {
        let state = AppState::new(
            test_connection().await,
            Config::default(),
            JwtKeys::from_secret("test-secret", 1),
            Arc::new(LogMailer),
        );
        let admin = state
            .users()
            .create_admin("teacher", "pw", "Teacher")
            .await
            .unwrap();
        let parent = state
            .users()
            .create(contracts::system::users::CreateUserDto {
                username: "s1".into(),
                password: "pw".into(),
                full_name: "Parent".into(),
            })
            .await
            .unwrap();

        TestApp {
            admin_token: state.jwt.issue(admin.id, &admin.username, true).unwrap(),
            parent_token: state.jwt.issue(parent.id, &parent.username, false).unwrap(),
            router: build_router(state),
        }
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn upload(token: &str, field: &str, csv: &str) -> Request<Body> {
        const BOUNDARY: &str = "portal-test-boundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"users.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{b}--\r\n",
            b = BOUNDARY,
            field = field,
            csv = csv
        );
        Request::builder()
            .method(Method::POST)
            .uri("/api/admin/users/bulk-import")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn new_link(title: &str) -> Value {
        json!({ "title": title, "description": "d", "url": "https://portal.example", "category": "common" })
    }

    #[tokio::test]
    async fn test_session_required() {
        let app = app().await;
        let (status, body) = send(&app.router, request(Method::GET, "/api/links", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authentication required");

        let (status, _) = send(
            &app.router,
            request(Method::GET, "/api/links", Some("not-a-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &app.router,
            request(Method::GET, "/api/links", Some(&app.parent_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["links"], json!([]));
    }

    #[tokio::test]
    async fn test_admin_routes_reject_parents() {
        let app = app().await;
        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                "/api/admin/links",
                Some(&app.parent_token),
                Some(new_link("x")),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app.router,
            request(Method::GET, "/api/links", Some(&app.parent_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["links"], json!([]));
    }

    #[tokio::test]
    async fn test_admin_creates_and_reorders_links() {
        let app = app().await;
        let mut ids = Vec::new();
        for title in ["a", "b", "c"] {
            let (status, body) = send(
                &app.router,
                request(
                    Method::POST,
                    "/api/admin/links",
                    Some(&app.admin_token),
                    Some(new_link(title)),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
            ids.push(body["link"]["id"].as_i64().unwrap());
        }

        let (status, body) = send(
            &app.router,
            request(
                Method::PUT,
                "/api/admin/links/reorder",
                Some(&app.admin_token),
                Some(json!({ "linkIds": [ids[2], ids[0], ids[1]] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "order updated");

        let (_, body) = send(
            &app.router,
            request(Method::GET, "/api/links", Some(&app.parent_token), None),
        )
        .await;
        let titles: Vec<&str> = body["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["c", "a", "b"]);

        let (status, _) = send(
            &app.router,
            request(
                Method::PUT,
                "/api/admin/links/reorder",
                Some(&app.admin_token),
                Some(json!({ "linkIds": [ids[0], ids[0], ids[1]] })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_check_accepts_it() {
        let app = app().await;
        let response = app
            .router
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "s1", "password": "pw" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("auth-token="));
        assert!(cookie.contains("HttpOnly"));

        let pair = cookie.split(';').next().unwrap().to_string();
        let check = Request::builder()
            .uri("/api/auth/check")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, check).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["fullName"], "Parent");
        assert_eq!(body["user"]["isAdmin"], false);

        let (status, body) = send(
            &app.router,
            request(Method::GET, "/api/login-history", Some(&app.parent_token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_failures() {
        let app = app().await;
        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "s1" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "s1", "password": "wrong" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_subscription() {
        let app = app().await;
        let (status, body) = send(
            &app.router,
            request(
                Method::POST,
                "/api/subscribers",
                None,
                Some(json!({ "studentName": "Taro", "email": "t@example.org", "grade": "grade-1" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], "t@example.org");

        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                "/api/subscribers",
                None,
                Some(json!({ "studentName": "Jiro", "email": "T@example.org", "grade": "grade-2" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_bulk_import_upload() {
        let app = app().await;
        let csv = "ID,氏名,パスワード\ns10,Alice,p10\ns11,Bob\ns12,Carol,p12\n";

        let (status, body) = send(&app.router, upload(&app.admin_token, "csv", csv)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"]["success"], 2);
        assert_eq!(body["results"]["failed"], 1);
        assert_eq!(
            body["results"]["errors"][0],
            "row 2: insufficient columns (3 required)"
        );
        assert_eq!(body["message"], "imported: 2, failed: 1");

        let (_, body) = send(
            &app.router,
            request(Method::GET, "/api/admin/users", Some(&app.admin_token), None),
        )
        .await;
        assert_eq!(body["users"].as_array().unwrap().len(), 4);

        let (status, body) = send(&app.router, upload(&app.admin_token, "file", csv)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "CSV file is required");

        let (status, _) = send(&app.router, upload(&app.parent_token, "csv", csv)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
