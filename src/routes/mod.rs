use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{auth, blog, panel},
    state::AppState,
    utils::jwt::auth_middleware,
};

async fn health_handler() -> &'static str {
    "ok"
}

pub fn create_routes(state: AppState) -> Router {
    // 1. Rutas Públicas (Todo el mundo)
    let public_routes = Router::new()
        .route("/", get(|| async { Redirect::to("/blog") }))
        .route("/healthz", get(health_handler))
        .route("/blog", get(blog::blog_index_handler))
        .route("/blog/:slug", get(blog::blog_post_handler))
        .route(
            "/login",
            get(auth::login_page_handler).post(auth::login_handler),
        )
        .route(
            "/register",
            get(auth::register_page_handler).post(auth::register_handler),
        );

    // 2. Rutas del Panel: requieren sesión; sin ella, redirección al login
    let panel_routes = Router::new()
        .route("/panel/dashboard", get(panel::dashboard_handler))
        .route(
            "/panel/posts",
            get(panel::posts_page_handler).post(panel::create_post_handler),
        )
        .route("/panel/posts/new", get(panel::new_post_handler))
        .route("/panel/posts/:id/edit", get(panel::edit_post_handler))
        .route("/panel/posts/:id", post(panel::update_post_handler))
        .route("/panel/posts/:id/delete", post(panel::delete_post_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/api/session/events", get(auth::session_events_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Fusionamos todo
    Router::new()
        .merge(public_routes)
        .merge(panel_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::{config::Settings, session::SessionEvents};

    fn test_state() -> AppState {
        // pool perezoso: nadie se conecta hasta la primera query
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bitacora_test")
            .expect("pool");

        AppState {
            pool,
            settings: Arc::new(Settings {
                database_url: "postgres://localhost/bitacora_test".into(),
                jwt_secret: "secreto-de-prueba".into(),
                port: 0,
                max_connections: 1,
            }),
            sessions: SessionEvents::new(8),
        }
    }

    #[tokio::test]
    async fn healthz_responde_ok() {
        let app = create_routes(test_state());
        let request = Request::get("/healthz").body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn el_panel_sin_sesion_redirige_al_login() {
        let app = create_routes(test_state());
        let request = Request::get("/panel/posts")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok()),
            Some("/login")
        );
    }

    #[tokio::test]
    async fn la_raiz_redirige_al_blog() {
        let app = create_routes(test_state());
        let request = Request::get("/").body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}
