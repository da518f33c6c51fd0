use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::{
    models::user::{validate_login, validate_register, Claims, LoginForm, RegisterForm, User},
    models::{field_message, FieldError},
    state::AppState,
    ui::{escape_html, layout},
    utils::jwt::{issue_token, SESSION_COOKIE},
    utils::security::{hash_password, verify_password},
};

fn campo_error(errors: &[FieldError], field: &str) -> String {
    match field_message(errors, field) {
        Some(mensaje) => format!("<span class=\"field-error\">{}</span>", escape_html(mensaje)),
        None => String::new(),
    }
}

fn login_page(form: &LoginForm, errors: &[FieldError], general: Option<&str>) -> Html<String> {
    let mut body = String::from("<h1>Ingresar</h1>");
    if let Some(mensaje) = general {
        body.push_str(&format!(
            "<div class=\"inline-error\">{}</div>",
            escape_html(mensaje)
        ));
    }
    body.push_str(&format!(
        concat!(
            "<form class=\"form-card\" method=\"post\" action=\"/login\">",
            "<div class=\"field\"><label>Email</label>",
            "<input type=\"email\" name=\"email\" value=\"{}\">{}</div>",
            "<div class=\"field\"><label>Contraseña</label>",
            "<input type=\"password\" name=\"password\">{}</div>",
            "<button type=\"submit\" class=\"btn btn-primary\">Ingresar</button>",
            "<p class=\"post-meta\">¿Sin cuenta? <a href=\"/register\">Registrate</a></p>",
            "</form>"
        ),
        escape_html(&form.email),
        campo_error(errors, "email"),
        campo_error(errors, "password"),
    ));
    Html(layout::page("Ingresar", None, &body))
}

fn register_page(form: &RegisterForm, errors: &[FieldError], general: Option<&str>) -> Html<String> {
    let mut body = String::from("<h1>Crear cuenta</h1>");
    if let Some(mensaje) = general {
        body.push_str(&format!(
            "<div class=\"inline-error\">{}</div>",
            escape_html(mensaje)
        ));
    }
    body.push_str(&format!(
        concat!(
            "<form class=\"form-card\" method=\"post\" action=\"/register\">",
            "<div class=\"field\"><label>Nombre de usuario</label>",
            "<input type=\"text\" name=\"username\" value=\"{}\">{}</div>",
            "<div class=\"field\"><label>Email</label>",
            "<input type=\"email\" name=\"email\" value=\"{}\">{}</div>",
            "<div class=\"field\"><label>Contraseña</label>",
            "<input type=\"password\" name=\"password\">{}</div>",
            "<button type=\"submit\" class=\"btn btn-primary\">Crear cuenta</button>",
            "</form>"
        ),
        escape_html(&form.username),
        campo_error(errors, "username"),
        escape_html(&form.email),
        campo_error(errors, "email"),
        campo_error(errors, "password"),
    ));
    Html(layout::page("Crear cuenta", None, &body))
}

// GET /login
pub async fn login_page_handler() -> Html<String> {
    login_page(&LoginForm::default(), &[], None)
}

// GET /register
pub async fn register_page_handler() -> Html<String> {
    register_page(&RegisterForm::default(), &[], None)
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let errores = validate_login(&form);
    if !errores.is_empty() {
        return login_page(&form, &errores, None).into_response();
    }

    // 1. Buscar usuario por email
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
    )
    .bind(form.email.trim())
    .fetch_optional(&state.pool)
    .await
    .unwrap_or(None);

    let user = match user {
        Some(u) => u,
        // mismo mensaje que con contraseña mala: no revelamos qué falló
        None => return login_page(&form, &[], Some("Credenciales inválidas")).into_response(),
    };

    // 2. Verificar contraseña (Argon2)
    if !verify_password(&form.password, &user.password_hash) {
        return login_page(&form, &[], Some("Credenciales inválidas")).into_response();
    }

    // 3. Generar el token y dejarlo en la cookie de sesión
    let token = match issue_token(&state.settings.jwt_secret, user.id, &user.email) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Error generando token: {:?}", e);
            return login_page(&form, &[], Some("Error generando la sesión")).into_response();
        }
    };

    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true),
    );

    (jar, Redirect::to("/panel/posts")).into_response()
}

// POST /register
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let errores = validate_register(&form);
    if !errores.is_empty() {
        return register_page(&form, &errores, None).into_response();
    }

    // 1. Hashear la contraseña (nunca guardarla plana)
    let hashed = match hash_password(&form.password) {
        Ok(h) => h,
        Err(_) => {
            return register_page(&form, &[], Some("Error de seguridad")).into_response();
        }
    };

    // 2. Insertar en Base de Datos
    let result = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, password_hash, created_at
        "#,
    )
    .bind(form.username.trim())
    .bind(form.email.trim())
    .bind(&hashed)
    .fetch_one(&state.pool)
    .await;

    let user = match result {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Error creando usuario: {:?}", e);
            // Probablemente el email o el usuario ya existen
            return register_page(&form, &[], Some("El usuario o email ya existe"))
                .into_response();
        }
    };

    // 3. Sesión directa tras el registro
    let token = match issue_token(&state.settings.jwt_secret, user.id, &user.email) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Error generando token: {:?}", e);
            return Redirect::to("/login").into_response();
        }
    };

    let jar = jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true),
    );

    (jar, Redirect::to("/panel/posts")).into_response()
}

// POST /logout: avisa a las demás pestañas y limpia la cookie
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> Response {
    state.sessions.notify_logout(claims.user_id);

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    (jar, Redirect::to("/login")).into_response()
}

// GET /api/session/events: flujo de avisos de sesión (SSE). Entrega sin
// garantías: un receptor rezagado pierde mensajes y se recupera en su
// próxima verificación de autenticación.
pub async fn session_events_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.sessions.subscribe())
        .filter_map(|evento| evento.ok())
        .map(|evento| {
            let data = serde_json::to_string(&evento).unwrap_or_default();
            Ok::<_, Infallible>(Event::default().event("session").data(data))
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
