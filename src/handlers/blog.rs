use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    db,
    models::post::{Post, PostFilters, PostStatus},
    state::AppState,
    ui::{
        escape_html,
        filter::{FilterField, FilterToolbar},
        layout,
        pagination::Pagination,
        query::QueryParamSet,
    },
    utils::jwt::current_actor,
};

// El blog público lista en grilla corta
const BLOG_PAGE_SIZE: u32 = 9;

fn post_card(post: &Post) -> String {
    let fecha = post
        .published_at
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    // el extracto manda; sin extracto, un recorte del contenido
    let resumen = match &post.excerpt {
        Some(excerpt) => excerpt.clone(),
        None => {
            let corto: String = post.content.chars().take(160).collect();
            if post.content.chars().count() > 160 {
                format!("{corto}...")
            } else {
                corto
            }
        }
    };

    format!(
        concat!(
            "<article class=\"post-card\">",
            "<h2><a href=\"/blog/{}\">{}</a></h2>",
            "<p class=\"post-meta\">{} · {} vistas</p>",
            "<p>{}</p>",
            "</article>"
        ),
        escape_html(&post.slug),
        escape_html(&post.title),
        escape_html(&fecha),
        post.view_count,
        escape_html(&resumen)
    )
}

// GET /blog: posts publicados, con búsqueda y paginación
pub async fn blog_index_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    RawQuery(raw): RawQuery,
) -> Html<String> {
    let actor = current_actor(&state.settings.jwt_secret, &jar);
    let params = QueryParamSet::parse(raw.as_deref().unwrap_or(""));

    let filters = PostFilters {
        status: Some(PostStatus::Published),
        author_id: None,
        search: params.get("search").map(str::to_string),
        page: params.page(),
        limit: params.limit(BLOG_PAGE_SIZE),
    };

    let result = db::posts::list_posts(&state.pool, &filters).await;

    let toolbar = FilterToolbar::new(
        "/blog",
        vec![FilterField::search(
            "search",
            "Buscar",
            "Buscar posts por título o contenido...",
        )],
    );

    let mut body = String::from(
        "<h1>Blog</h1><p class=\"subtitle\">Historias y apuntes de nuestros autores</p>",
    );
    body.push_str(&toolbar.render(&params));

    // tres ramas, siempre manejadas: error, vacío, datos
    if let Some(error) = &result.error {
        body.push_str(&format!(
            "<div class=\"inline-error\">{}</div>",
            escape_html(error)
        ));
    } else if result.posts.is_empty() {
        body.push_str("<p class=\"subtitle\">No se encontraron posts publicados.</p>");
    } else {
        body.push_str("<div class=\"post-list\">");
        for post in &result.posts {
            body.push_str(&post_card(post));
        }
        body.push_str("</div>");

        let total = result.total_count.unwrap_or(result.posts.len() as i64);
        let pagination = Pagination::from_count(total, filters.limit, filters.page);
        body.push_str(&pagination.render("/blog", &params));
    }

    Html(layout::page("Blog", actor.as_ref(), &body))
}

// GET /blog/:slug: lectura pública de un post publicado
pub async fn blog_post_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Response {
    let actor = current_actor(&state.settings.jwt_secret, &jar);
    let lookup = db::posts::get_published_by_slug(&state.pool, &slug).await;

    if let Some(error) = &lookup.error {
        let body = format!("<div class=\"inline-error\">{}</div>", escape_html(error));
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(layout::page("Error", actor.as_ref(), &body)),
        )
            .into_response();
    }

    let post = match lookup.post {
        Some(p) => p,
        None => {
            let body = "<h1>Post no encontrado</h1>\
                        <p class=\"subtitle\">El post no existe o ya no está publicado.</p>\
                        <p><a href=\"/blog\">Volver al blog</a></p>";
            return (
                StatusCode::NOT_FOUND,
                Html(layout::page("No encontrado", actor.as_ref(), body)),
            )
                .into_response();
        }
    };

    // contar la visita no puede tumbar la página
    db::posts::increment_view_count(&state.pool, &slug).await;

    let fecha = post
        .published_at
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default();

    let mut body = format!(
        concat!(
            "<article><h1>{}</h1>",
            "<p class=\"post-meta\">{} · {} vistas</p>"
        ),
        escape_html(&post.title),
        escape_html(&fecha),
        post.view_count + 1
    );

    if let Some(imagen) = &post.featured_image {
        body.push_str(&format!(
            "<p><img src=\"{}\" alt=\"\" style=\"max-width:100%\"></p>",
            escape_html(imagen)
        ));
    }

    for parrafo in post.content.split("\n\n").filter(|p| !p.trim().is_empty()) {
        body.push_str(&format!("<p>{}</p>", escape_html(parrafo)));
    }
    body.push_str("</article><p><a href=\"/blog\">← Volver al blog</a></p>");

    Html(layout::page(&post.title, actor.as_ref(), &body)).into_response()
}
