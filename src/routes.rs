use axum::{Router, middleware};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState,
    handler::{
        admin::admin_handler, auth::auth_handler, catalog::catalog_handler,
        member::member_handler, public::public_handler,
    },
    middleware::resolve_identity,
    view,
};

pub fn create_router(app_state: AppState) -> Router {
    let uploads = ServeDir::new(app_state.uploads.root());

    Router::new()
        .merge(catalog_handler())
        .merge(public_handler())
        .merge(auth_handler())
        .merge(member_handler(app_state.clone()))
        .merge(admin_handler())
        .nest_service("/uploads", uploads)
        .fallback(|| async { view::not_found() })
        // outermost: every route, gate and fallback sees the resolved identity
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            resolve_identity,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::Config,
        db::DBClient,
        models::{User, UserRole},
        session::{Identity, SESSION_COOKIE},
        uploads::UploadDir,
    };

    // The pool never connects: none of these requests reach the database.
    fn state() -> AppState {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        AppState {
            uploads: UploadDir::new(config.upload_folder.clone()),
            db_client: DBClient::new(pool),
            env: Arc::new(config),
        }
    }

    fn app() -> Router {
        create_router(state())
    }

    /// The admin area with the session already resolved to `role`.
    fn admin_area_as(role: UserRole) -> Router {
        let user = User {
            id: 42,
            name: "Sam Signed-In".into(),
            email: "sam@example.com".into(),
            phone: None,
            password_hash: String::new(),
            role,
            created_at: chrono::Utc::now(),
        };
        admin_handler()
            .layer(axum::Extension(Identity::User(user)))
            .with_state(state())
    }

    fn location(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn login_page_renders_for_anonymous_visitors() {
        let response = app()
            .oneshot(Request::get("/login").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = app()
            .oneshot(Request::get("/no/such/page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn admin_area_sends_anonymous_callers_to_login() {
        let response = app()
            .oneshot(Request::get("/admin/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let to = location(&response);
        assert!(to.starts_with("/login?next="), "{to}");
        assert!(to.contains("admin"));
    }

    #[tokio::test]
    async fn admin_area_turns_members_back_to_dashboard() {
        for path in ["/admin/dashboard", "/admin/certificates", "/admin/feedback"] {
            let response = admin_area_as(UserRole::User)
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert_eq!(location(&response), "/dashboard", "{path}");
            assert!(response.headers().contains_key(header::SET_COOKIE));
        }
    }

    #[tokio::test]
    async fn member_cannot_add_course() {
        // Reaching the handler would need the database and end in a 500.
        let response = admin_area_as(UserRole::User)
            .oneshot(
                Request::post("/admin/courses/add")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "title=Rust&description=Systems&duration=4+weeks&level=beginner&price=10",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    #[tokio::test]
    async fn admin_reaches_admin_forms() {
        let response = admin_area_as(UserRole::Admin)
            .oneshot(Request::get("/admin/courses/add").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn member_routes_require_login() {
        for path in ["/dashboard", "/feedback", "/internships/7/apply"] {
            let response = app()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
            assert!(location(&response).starts_with("/login"), "{path}");
        }
    }

    #[tokio::test]
    async fn anonymous_post_is_redirected_without_next() {
        let response = app()
            .oneshot(
                Request::post("/courses/1/enroll")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn tampered_session_cookie_is_anonymous() {
        let response = app()
            .oneshot(
                Request::get("/login")
                    .header(header::COOKIE, format!("{SESSION_COOKIE}=not-a-token"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_requires_login() {
        let response = app()
            .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(location(&response).starts_with("/login"));
    }
}
