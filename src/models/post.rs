use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::{Decode, FromRow, Postgres, Type};
use url::Url;

use crate::models::FieldError;

// Ciclo de vida de un post. Archivar es una transición de estado (el post no
// se borra físicamente); eliminar es una operación aparte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Archived,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [
        PostStatus::Draft,
        PostStatus::Published,
        PostStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostStatus::Draft => "Borrador",
            PostStatus::Published => "Publicado",
            PostStatus::Archived => "Archivado",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            "archived" => Ok(PostStatus::Archived),
            otro => Err(format!("estado desconocido: {otro}")),
        }
    }
}

// En la base de datos el estado vive como TEXT
impl Type<Postgres> for PostStatus {
    fn type_info() -> PgTypeInfo {
        <&str as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <&str as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for PostStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<'r, Postgres>>::decode(value)?;
        s.parse::<PostStatus>().map_err(Into::into)
    }
}

// 1. Estructura que representa una fila completa en la Base de Datos.
// Invariante: published_at se fija la primera vez que el post pasa a
// 'published' y no se limpia en transiciones posteriores.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: i64,
    pub view_count: i64,
}

// 2. Lo que llega del formulario de crear/editar (todo como texto)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub featured_image: String,
    pub status: String,
}

impl PostForm {
    // Para precargar el formulario de edición
    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone().unwrap_or_default(),
            featured_image: post.featured_image.clone().unwrap_or_default(),
            status: post.status.as_str().to_string(),
        }
    }
}

// Datos ya validados, listos para la capa de datos
#[derive(Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
}

// Petición de filtrado/orden/paginación hacia la capa de datos.
// La ausencia de un campo significa "sin filtrar" en esa dimensión.
#[derive(Debug, Clone, Default)]
pub struct PostFilters {
    pub status: Option<PostStatus>,
    pub author_id: Option<i64>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

// Validación del formulario. Cada regla deja su mensaje junto al campo;
// si todo pasa, devolvemos los datos ya normalizados.
pub fn validate_post_form(form: &PostForm) -> Result<PostInput, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = form.title.trim();
    if title.is_empty() {
        errors.push(FieldError::new("title", "El título es obligatorio"));
    } else if title.chars().count() < 3 {
        errors.push(FieldError::new(
            "title",
            "El título debe tener al menos 3 caracteres",
        ));
    } else if title.chars().count() > 200 {
        errors.push(FieldError::new(
            "title",
            "El título no puede superar los 200 caracteres",
        ));
    }

    let content = form.content.trim();
    if content.is_empty() {
        errors.push(FieldError::new("content", "El contenido es obligatorio"));
    } else if content.chars().count() < 10 {
        errors.push(FieldError::new(
            "content",
            "El contenido debe tener al menos 10 caracteres",
        ));
    }

    let excerpt = form.excerpt.trim();
    if excerpt.chars().count() > 500 {
        errors.push(FieldError::new(
            "excerpt",
            "El extracto no puede superar los 500 caracteres",
        ));
    }

    let featured_image = form.featured_image.trim();
    if !featured_image.is_empty() {
        let valida = Url::parse(featured_image)
            .map(|u| u.scheme() == "http" || u.scheme() == "https")
            .unwrap_or(false);
        if !valida {
            errors.push(FieldError::new(
                "featured_image",
                "La imagen destacada debe ser una URL http(s) válida",
            ));
        }
    }

    let status = match form.status.parse::<PostStatus>() {
        Ok(s) => Some(s),
        Err(_) => {
            errors.push(FieldError::new("status", "Estado desconocido"));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(PostInput {
        title: title.to_string(),
        content: content.to_string(),
        excerpt: (!excerpt.is_empty()).then(|| excerpt.to_string()),
        featured_image: (!featured_image.is_empty()).then(|| featured_image.to_string()),
        // status es Some: de lo contrario habría errores arriba
        status: status.unwrap_or(PostStatus::Draft),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_valido() -> PostForm {
        PostForm {
            title: "Mi primer post".into(),
            content: "Contenido con más de diez caracteres".into(),
            excerpt: String::new(),
            featured_image: String::new(),
            status: "draft".into(),
        }
    }

    #[test]
    fn formulario_valido_produce_input_normalizado() {
        let input = validate_post_form(&form_valido()).expect("válido");
        assert_eq!(input.status, PostStatus::Draft);
        assert!(input.excerpt.is_none());
        assert!(input.featured_image.is_none());
    }

    #[test]
    fn titulo_corto_es_rechazado() {
        let mut form = form_valido();
        form.title = "ab".into();
        let errores = validate_post_form(&form).expect_err("inválido");
        assert!(errores.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn contenido_corto_es_rechazado() {
        let mut form = form_valido();
        form.content = "corto".into();
        let errores = validate_post_form(&form).expect_err("inválido");
        assert!(errores.iter().any(|e| e.field == "content"));
    }

    #[test]
    fn imagen_destacada_debe_ser_url_http() {
        let mut form = form_valido();
        form.featured_image = "ftp://archivo".into();
        let errores = validate_post_form(&form).expect_err("inválido");
        assert!(errores.iter().any(|e| e.field == "featured_image"));

        form.featured_image = "https://ejemplo.com/foto.png".into();
        let input = validate_post_form(&form).expect("válido");
        assert_eq!(
            input.featured_image.as_deref(),
            Some("https://ejemplo.com/foto.png")
        );
    }

    #[test]
    fn estado_desconocido_es_rechazado() {
        let mut form = form_valido();
        form.status = "pendiente".into();
        let errores = validate_post_form(&form).expect_err("inválido");
        assert!(errores.iter().any(|e| e.field == "status"));
    }

    #[test]
    fn parseo_de_estados() {
        assert_eq!("published".parse::<PostStatus>(), Ok(PostStatus::Published));
        assert!("otro".parse::<PostStatus>().is_err());
        assert_eq!(PostStatus::Archived.as_str(), "archived");
    }
}
