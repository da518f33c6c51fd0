use sqlx::FromRow;
use thiserror::Error;

use crate::db::DbPool;
use crate::models::post::{Post, PostFilters, PostInput};

// Resultado de un listado. Esta frontera nunca devuelve Err: los fallos de
// base de datos se registran y viajan como dato en `error`, para que la
// página los pinte en línea igual que cualquier otra rama.
#[derive(Debug, Default)]
pub struct PostPage {
    pub posts: Vec<Post>,
    pub total_count: Option<i64>,
    pub error: Option<String>,
}

impl PostPage {
    fn failed(mensaje: &str) -> Self {
        Self {
            posts: Vec::new(),
            total_count: None,
            error: Some(mensaje.to_string()),
        }
    }
}

// Resultado de buscar un post concreto, con el mismo contrato
#[derive(Debug, Default)]
pub struct PostLookup {
    pub post: Option<Post>,
    pub error: Option<String>,
}

// Las mutaciones sí devuelven Result: las consumen los formularios, que
// traducen cada variante a un mensaje en línea.
#[derive(Debug, Error)]
pub enum PostStoreError {
    #[error("el post no existe")]
    NotFound,
    #[error("el post pertenece a otro autor")]
    Forbidden,
    #[error("ya existe un post con un título equivalente")]
    SlugTaken,
    #[error("error de base de datos")]
    Database(#[from] sqlx::Error),
}

// Estadísticas del panel de un autor
#[derive(Debug, Default, FromRow)]
pub struct AuthorStats {
    pub total: i64,
    pub published: i64,
    pub drafts: i64,
    pub archived: i64,
    pub views: i64,
}

// page es 1-based; la capa de datos habla en OFFSET
fn page_offset(page: u32, limit: u32) -> i64 {
    i64::from(page.max(1) - 1) * i64::from(limit)
}

// Listado filtrado/paginado. La lógica booleana dentro del SQL ignora cada
// filtro ausente; ILIKE busca cualquier parte del texto sin distinguir
// mayúsculas. El orden (más reciente primero) es contrato de esta capa.
pub async fn list_posts(pool: &DbPool, filters: &PostFilters) -> PostPage {
    let status = filters.status.map(|s| s.as_str());
    let search = filters.search.as_deref();
    let limit = i64::from(filters.limit.max(1));
    let offset = page_offset(filters.page, filters.limit.max(1));

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM posts
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::bigint IS NULL OR author_id = $2)
          AND ($3::text IS NULL OR (title ILIKE '%' || $3 || '%' OR content ILIKE '%' || $3 || '%'))
        "#,
    )
    .bind(status)
    .bind(filters.author_id)
    .bind(search)
    .fetch_one(pool)
    .await;

    let total = match total {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Error contando posts: {:?}", e);
            return PostPage::failed("Error de base de datos al listar los posts");
        }
    };

    let rows = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, slug, content, excerpt, featured_image, status,
               published_at, created_at, updated_at, author_id, view_count
        FROM posts
        WHERE ($1::text IS NULL OR status = $1)
          AND ($2::bigint IS NULL OR author_id = $2)
          AND ($3::text IS NULL OR (title ILIKE '%' || $3 || '%' OR content ILIKE '%' || $3 || '%'))
        ORDER BY created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(status)
    .bind(filters.author_id)
    .bind(search)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await;

    match rows {
        Ok(posts) => PostPage {
            posts,
            total_count: Some(total),
            error: None,
        },
        Err(e) => {
            tracing::error!("Error listando posts: {:?}", e);
            PostPage::failed("Error de base de datos al listar los posts")
        }
    }
}

// Lectura pública por slug: solo posts publicados
pub async fn get_published_by_slug(pool: &DbPool, slug: &str) -> PostLookup {
    let result = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, slug, content, excerpt, featured_image, status,
               published_at, created_at, updated_at, author_id, view_count
        FROM posts
        WHERE slug = $1 AND status = 'published'
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(post) => PostLookup { post, error: None },
        Err(e) => {
            tracing::error!("Error buscando post {}: {:?}", slug, e);
            PostLookup {
                post: None,
                error: Some("Error de base de datos al buscar el post".to_string()),
            }
        }
    }
}

pub async fn get_post_by_id(pool: &DbPool, id: i64) -> PostLookup {
    let result = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, title, slug, content, excerpt, featured_image, status,
               published_at, created_at, updated_at, author_id, view_count
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(post) => PostLookup { post, error: None },
        Err(e) => {
            tracing::error!("Error buscando post {}: {:?}", id, e);
            PostLookup {
                post: None,
                error: Some("Error de base de datos al buscar el post".to_string()),
            }
        }
    }
}

// Contador de vistas: emitir y olvidar, un fallo aquí no rompe la página
pub async fn increment_view_count(pool: &DbPool, slug: &str) {
    let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE slug = $1")
        .bind(slug)
        .execute(pool)
        .await;

    if let Err(e) = result {
        tracing::warn!("Error incrementando vistas de {}: {:?}", slug, e);
    }
}

// Crear post. published_at se fija solo si nace publicado.
pub async fn create_post(
    pool: &DbPool,
    author_id: i64,
    slug: &str,
    input: &PostInput,
) -> Result<Post, PostStoreError> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (title, slug, content, excerpt, featured_image, status, published_at, author_id)
        VALUES ($1, $2, $3, $4, $5, $6,
                CASE WHEN $6 = 'published' THEN NOW() ELSE NULL END,
                $7)
        RETURNING id, title, slug, content, excerpt, featured_image, status,
                  published_at, created_at, updated_at, author_id, view_count
        "#,
    )
    .bind(&input.title)
    .bind(slug)
    .bind(&input.content)
    .bind(input.excerpt.as_deref())
    .bind(input.featured_image.as_deref())
    .bind(input.status.as_str())
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        // 23505 = violación de UNIQUE (el slug ya existe)
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            PostStoreError::SlugTaken
        }
        _ => PostStoreError::Database(e),
    })
}

// Editar post. Solo el autor dueño puede; verificamos primero para no dar
// falsos "no existe". published_at se conserva si el post ya fue publicado
// alguna vez y se fija en la primera transición a 'published'.
pub async fn update_post(
    pool: &DbPool,
    id: i64,
    author_id: i64,
    input: &PostInput,
) -> Result<Post, PostStoreError> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT author_id FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match owner {
        None => return Err(PostStoreError::NotFound),
        Some(propietario) if propietario != author_id => return Err(PostStoreError::Forbidden),
        Some(_) => {}
    }

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET
            title = $1,
            content = $2,
            excerpt = $3,
            featured_image = $4,
            status = $5,
            published_at = CASE
                WHEN $5 = 'published' AND published_at IS NULL THEN NOW()
                ELSE published_at
            END,
            updated_at = NOW()
        WHERE id = $6
        RETURNING id, title, slug, content, excerpt, featured_image, status,
                  published_at, created_at, updated_at, author_id, view_count
        "#,
    )
    .bind(&input.title)
    .bind(&input.content)
    .bind(input.excerpt.as_deref())
    .bind(input.featured_image.as_deref())
    .bind(input.status.as_str())
    .bind(id)
    .fetch_one(pool)
    .await?;

    Ok(post)
}

// Borrado explícito (distinto de archivar), también solo para el dueño
pub async fn delete_post(pool: &DbPool, id: i64, author_id: i64) -> Result<(), PostStoreError> {
    let owner = sqlx::query_scalar::<_, i64>("SELECT author_id FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match owner {
        None => return Err(PostStoreError::NotFound),
        Some(propietario) if propietario != author_id => return Err(PostStoreError::Forbidden),
        Some(_) => {}
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

// Resumen para el panel del autor
pub async fn author_stats(pool: &DbPool, author_id: i64) -> Result<AuthorStats, sqlx::Error> {
    sqlx::query_as::<_, AuthorStats>(
        r#"
        SELECT COUNT(*) AS total,
               COUNT(*) FILTER (WHERE status = 'published') AS published,
               COUNT(*) FILTER (WHERE status = 'draft') AS drafts,
               COUNT(*) FILTER (WHERE status = 'archived') AS archived,
               COALESCE(SUM(view_count), 0)::bigint AS views
        FROM posts
        WHERE author_id = $1
        "#,
    )
    .bind(author_id)
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_desde_pagina_uno() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(2, 25), 25);
    }

    #[test]
    fn pagina_cero_se_trata_como_la_primera() {
        assert_eq!(page_offset(0, 10), 0);
    }
}
