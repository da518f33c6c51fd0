use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{models::user::Claims, state::AppState};

// Nombre de la cookie de sesión (HttpOnly, emitida en el login)
pub const SESSION_COOKIE: &str = "token";

// Generar un token firmado con expiración de 24 horas
pub fn issue_token(
    secret: &str,
    user_id: i64,
    email: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let ahora = Utc::now();
    let expiration = ahora
        .checked_add_signed(Duration::hours(24))
        .unwrap_or(ahora)
        .timestamp() as usize;

    let claims = Claims {
        sub: email.to_string(),
        exp: expiration,
        iat: ahora.timestamp() as usize,
        user_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

// Decodificar y verificar firma. Token falso, expirado o manipulado → None.
pub fn decode_token(secret: &str, token: &str) -> Option<Claims> {
    let validation = Validation::default();
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

// El "colaborador de autenticación" de las páginas públicas: devuelve el
// actor actual o None, nunca un error.
pub fn current_actor(secret: &str, jar: &CookieJar) -> Option<Claims> {
    let token = jar.get(SESSION_COOKIE)?;
    decode_token(secret, token.value())
}

// Esta función se ejecuta ANTES de llegar a los handlers del panel.
// El token viene en la cookie de sesión (páginas) o como Bearer (API).
// Sin credenciales válidas redirigimos al login en vez de responder 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    maybe_auth: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| maybe_auth.map(|TypedHeader(auth)| auth.token().to_string()));

    let token = match token {
        Some(t) => t,
        None => return Redirect::to("/login").into_response(),
    };

    match decode_token(&state.settings.jwt_secret, &token) {
        Some(claims) => {
            // Adjuntamos claims para que los handlers sepan quién es el usuario
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emitir_y_decodificar_token() {
        let token = issue_token("secreto", 42, "ana@ejemplo.com").expect("token");
        let claims = decode_token("secreto", &token).expect("claims");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "ana@ejemplo.com");
    }

    #[test]
    fn otro_secreto_rechaza_el_token() {
        let token = issue_token("secreto", 42, "ana@ejemplo.com").expect("token");
        assert!(decode_token("otro-secreto", &token).is_none());
    }
}
