use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::FieldError;

// Lo que guardamos en la base de datos
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip)] // ¡Jamás envíes el hash de la contraseña en el JSON!
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

// Lo que recibimos del formulario de Login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// Lo que recibimos del formulario de Registro
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

// Lo que viaja DENTRO del token firmado (Claims)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (email)
    pub exp: usize,  // Expiración
    pub iat: usize,  // Issued At
    pub user_id: i64,
}

pub fn validate_login(form: &LoginForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "El email es obligatorio"));
    } else if !form.email.contains('@') {
        errors.push(FieldError::new("email", "Email inválido"));
    }

    if form.password.is_empty() {
        errors.push(FieldError::new("password", "La contraseña es obligatoria"));
    }

    errors
}

pub fn validate_register(form: &RegisterForm) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.username.trim().chars().count() < 3 {
        errors.push(FieldError::new(
            "username",
            "El nombre de usuario debe tener al menos 3 caracteres",
        ));
    }

    if form.email.trim().is_empty() {
        errors.push(FieldError::new("email", "El email es obligatorio"));
    } else if !form.email.contains('@') {
        errors.push(FieldError::new("email", "Email inválido"));
    }

    if form.password.chars().count() < 8 {
        errors.push(FieldError::new(
            "password",
            "La contraseña debe tener al menos 8 caracteres",
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_sin_email_es_rechazado() {
        let form = LoginForm {
            email: String::new(),
            password: "12345678".into(),
        };
        let errores = validate_login(&form);
        assert!(errores.iter().any(|e| e.field == "email"));
    }

    #[test]
    fn registro_valido_no_tiene_errores() {
        let form = RegisterForm {
            username: "ana".into(),
            email: "ana@ejemplo.com".into(),
            password: "contraseña-larga".into(),
        };
        assert!(validate_register(&form).is_empty());
    }

    #[test]
    fn registro_con_contrasena_corta_es_rechazado() {
        let form = RegisterForm {
            username: "ana".into(),
            email: "ana@ejemplo.com".into(),
            password: "corta".into(),
        };
        let errores = validate_register(&form);
        assert!(errores.iter().any(|e| e.field == "password"));
    }
}
