use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};

use crate::{
    db::{self, posts::PostStoreError},
    models::post::{validate_post_form, Post, PostFilters, PostForm, PostStatus},
    models::user::Claims,
    models::{field_message, FieldError},
    state::AppState,
    ui::{
        escape_html,
        filter::{FilterField, FilterToolbar, SelectOption},
        layout,
        pagination::Pagination,
        query::QueryParamSet,
        table::{ellipsis_cell, Align, Column, DataTable},
    },
    utils::text::slug_for_title,
};

const PANEL_PAGE_SIZE: u32 = 10;

fn status_badge(status: PostStatus) -> String {
    format!(
        "<span class=\"badge badge-{}\">{}</span>",
        status.as_str(),
        status.label()
    )
}

fn panel_error(actor: &Claims, status: StatusCode, titulo: &str, mensaje: &str) -> Response {
    let body = format!(
        "<h1>{}</h1><p class=\"subtitle\">{}</p><p><a href=\"/panel/posts\">Volver a mis posts</a></p>",
        escape_html(titulo),
        escape_html(mensaje)
    );
    (status, Html(layout::page(titulo, Some(actor), &body))).into_response()
}

// GET /panel/posts: tabla de posts del autor con filtros y paginación
pub async fn posts_page_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    RawQuery(raw): RawQuery,
) -> Html<String> {
    let params = QueryParamSet::parse(raw.as_deref().unwrap_or(""));

    let status_filter = params
        .get("status")
        .and_then(|s| s.parse::<PostStatus>().ok());

    let filters = PostFilters {
        status: status_filter,
        author_id: Some(claims.user_id),
        search: params.get("search").map(str::to_string),
        page: params.page(),
        limit: params.limit(PANEL_PAGE_SIZE),
    };

    let result = db::posts::list_posts(&state.pool, &filters).await;

    let toolbar = FilterToolbar::new(
        "/panel/posts",
        vec![
            FilterField::search(
                "search",
                "Buscar",
                "Buscar posts por título o contenido...",
            ),
            FilterField::select(
                "status",
                "Estado",
                "Todos los estados",
                vec![
                    SelectOption::new("all", "Todos los estados"),
                    SelectOption::new("published", "Publicados"),
                    SelectOption::new("draft", "Borradores"),
                    SelectOption::new("archived", "Archivados"),
                ],
            ),
        ],
    );

    let columns = vec![
        Column::new("title", "Título").render(|post: &Post, _| {
            format!(
                "<a href=\"/panel/posts/{}/edit\">{}</a>",
                post.id,
                ellipsis_cell(&post.title, 45)
            )
        }),
        Column::new("status", "Estado")
            .align(Align::Center)
            .render(|post: &Post, _| status_badge(post.status)),
        Column::new("published_at", "Publicado").render(|post: &Post, _| match post.published_at {
            Some(fecha) => escape_html(&fecha.format("%d/%m/%Y").to_string()),
            None => "<span class=\"post-meta\">—</span>".to_string(),
        }),
        Column::new("view_count", "Vistas")
            .align(Align::Center)
            .accessor(|post: &Post| post.view_count.to_string()),
        Column::new("actions", "Acciones")
            .align(Align::Right)
            .render(|post: &Post, _| {
                let mut acciones = String::new();
                if post.status == PostStatus::Published {
                    acciones.push_str(&format!(
                        "<a class=\"btn\" href=\"/blog/{}\">Ver</a> ",
                        escape_html(&post.slug)
                    ));
                }
                acciones.push_str(&format!(
                    concat!(
                        "<a class=\"btn\" href=\"/panel/posts/{id}/edit\">Editar</a> ",
                        "<form method=\"post\" action=\"/panel/posts/{id}/delete\" ",
                        "style=\"display:inline\" ",
                        "onsubmit=\"return confirm('¿Eliminar este post?')\">",
                        "<button type=\"submit\" class=\"btn\">Eliminar</button></form>"
                    ),
                    id = post.id
                ));
                acciones
            }),
    ];

    let hay_filtros = params.contains("search") || params.contains("status");
    let empty_message = if hay_filtros {
        "Ningún post coincide con los filtros. Probá ajustar la búsqueda."
    } else {
        "Todavía no creaste ningún post. ¡Empezá con el primero!"
    };

    let total = result.total_count.unwrap_or(result.posts.len() as i64);
    let pagination = Pagination::from_count(total, filters.limit, filters.page);

    let table = DataTable::new(columns)
        .rows(result.posts)
        .error(result.error)
        .empty_message(empty_message)
        .error_message("Error al cargar los posts");

    let mut body = String::from(
        concat!(
            "<div class=\"page-head\"><div><h1>Mis posts</h1>",
            "<p class=\"subtitle\">Administrá todos tus posts</p></div>",
            "<a class=\"btn btn-primary\" href=\"/panel/posts/new\">Nuevo post</a></div>"
        ),
    );
    body.push_str(&toolbar.render(&params));
    body.push_str(&table.render());
    body.push_str(&pagination.render("/panel/posts", &params));

    Html(layout::page("Mis posts", Some(&claims), &body))
}

// GET /panel/dashboard: resumen del autor
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Html<String> {
    let mut body = String::from(
        "<h1>Dashboard</h1><p class=\"subtitle\">Un vistazo rápido a tu actividad</p>",
    );

    match db::posts::author_stats(&state.pool, claims.user_id).await {
        Ok(stats) => {
            let tarjetas = [
                ("Posts", stats.total),
                ("Publicados", stats.published),
                ("Borradores", stats.drafts),
                ("Archivados", stats.archived),
                ("Vistas totales", stats.views),
            ];
            body.push_str("<div class=\"stats\">");
            for (nombre, valor) in tarjetas {
                body.push_str(&format!(
                    "<div class=\"stat-card\"><div class=\"valor\">{}</div><div class=\"nombre\">{}</div></div>",
                    valor, nombre
                ));
            }
            body.push_str("</div>");
        }
        Err(e) => {
            tracing::error!("Error consultando estadísticas: {:?}", e);
            body.push_str(
                "<div class=\"inline-error\">Error al cargar las estadísticas</div>",
            );
        }
    }

    body.push_str("<p><a href=\"/panel/posts\">Ir a mis posts →</a></p>");
    Html(layout::page("Dashboard", Some(&claims), &body))
}

fn campo_error(errors: &[FieldError], field: &str) -> String {
    match field_message(errors, field) {
        Some(mensaje) => format!("<span class=\"field-error\">{}</span>", escape_html(mensaje)),
        None => String::new(),
    }
}

// Formulario de crear/editar. Los errores de validación se pintan al lado
// del campo que los provocó; los generales, arriba del formulario.
fn post_form_page(
    actor: &Claims,
    titulo: &str,
    action: &str,
    submit: &str,
    form: &PostForm,
    errors: &[FieldError],
    general: Option<&str>,
) -> Html<String> {
    let mut body = format!("<h1>{}</h1>", escape_html(titulo));

    if let Some(mensaje) = general {
        body.push_str(&format!(
            "<div class=\"inline-error\">{}</div>",
            escape_html(mensaje)
        ));
    }

    let mut estados = String::new();
    for status in PostStatus::ALL {
        let seleccionado = form.status == status.as_str()
            || (form.status.is_empty() && status == PostStatus::Draft);
        estados.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>",
            status.as_str(),
            if seleccionado { " selected" } else { "" },
            status.label()
        ));
    }

    body.push_str(&format!(
        concat!(
            "<form class=\"form-card\" method=\"post\" action=\"{}\">",
            "<div class=\"field\"><label>Título</label>",
            "<input type=\"text\" name=\"title\" value=\"{}\">{}</div>",
            "<div class=\"field\"><label>Contenido</label>",
            "<textarea name=\"content\">{}</textarea>{}</div>",
            "<div class=\"field\"><label>Extracto (opcional)</label>",
            "<textarea name=\"excerpt\" style=\"min-height:4rem\">{}</textarea>{}</div>",
            "<div class=\"field\"><label>Imagen destacada (URL, opcional)</label>",
            "<input type=\"text\" name=\"featured_image\" value=\"{}\">{}</div>",
            "<div class=\"field\"><label>Estado</label>",
            "<select name=\"status\">{}</select>{}</div>",
            "<div><button type=\"submit\" class=\"btn btn-primary\">{}</button> ",
            "<a class=\"btn\" href=\"/panel/posts\">Cancelar</a></div>",
            "</form>"
        ),
        escape_html(action),
        escape_html(&form.title),
        campo_error(errors, "title"),
        escape_html(&form.content),
        campo_error(errors, "content"),
        escape_html(&form.excerpt),
        campo_error(errors, "excerpt"),
        escape_html(&form.featured_image),
        campo_error(errors, "featured_image"),
        estados,
        campo_error(errors, "status"),
        escape_html(submit),
    ));

    Html(layout::page(titulo, Some(actor), &body))
}

// GET /panel/posts/new
pub async fn new_post_handler(Extension(claims): Extension<Claims>) -> Html<String> {
    post_form_page(
        &claims,
        "Nuevo post",
        "/panel/posts",
        "Crear post",
        &PostForm::default(),
        &[],
        None,
    )
}

// POST /panel/posts
pub async fn create_post_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<PostForm>,
) -> Response {
    let input = match validate_post_form(&form) {
        Ok(input) => input,
        Err(errores) => {
            return post_form_page(
                &claims,
                "Nuevo post",
                "/panel/posts",
                "Crear post",
                &form,
                &errores,
                None,
            )
            .into_response();
        }
    };

    // el slug nace del título
    let slug = slug_for_title(&input.title);

    match db::posts::create_post(&state.pool, claims.user_id, &slug, &input).await {
        Ok(_) => Redirect::to("/panel/posts").into_response(),
        Err(PostStoreError::SlugTaken) => post_form_page(
            &claims,
            "Nuevo post",
            "/panel/posts",
            "Crear post",
            &form,
            &[FieldError::new(
                "title",
                "Ya existe un post con un título equivalente",
            )],
            None,
        )
        .into_response(),
        Err(e) => {
            tracing::error!("Error al crear post: {:?}", e);
            post_form_page(
                &claims,
                "Nuevo post",
                "/panel/posts",
                "Crear post",
                &form,
                &[],
                Some("No se pudo crear el post"),
            )
            .into_response()
        }
    }
}

// GET /panel/posts/:id/edit
pub async fn edit_post_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Response {
    let lookup = db::posts::get_post_by_id(&state.pool, id).await;

    if let Some(error) = &lookup.error {
        return panel_error(&claims, StatusCode::INTERNAL_SERVER_ERROR, "Error", error);
    }

    let post = match lookup.post {
        Some(p) => p,
        None => {
            return panel_error(
                &claims,
                StatusCode::NOT_FOUND,
                "Post no encontrado",
                "El post no existe o fue eliminado.",
            );
        }
    };

    // solo el autor dueño puede editar
    if post.author_id != claims.user_id {
        return panel_error(
            &claims,
            StatusCode::FORBIDDEN,
            "Sin permiso",
            "No puedes editar posts de otros autores.",
        );
    }

    post_form_page(
        &claims,
        "Editar post",
        &format!("/panel/posts/{}", post.id),
        "Guardar cambios",
        &PostForm::from_post(&post),
        &[],
        None,
    )
    .into_response()
}

// POST /panel/posts/:id
pub async fn update_post_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Form(form): Form<PostForm>,
) -> Response {
    let action = format!("/panel/posts/{}", id);

    let input = match validate_post_form(&form) {
        Ok(input) => input,
        Err(errores) => {
            return post_form_page(
                &claims,
                "Editar post",
                &action,
                "Guardar cambios",
                &form,
                &errores,
                None,
            )
            .into_response();
        }
    };

    match db::posts::update_post(&state.pool, id, claims.user_id, &input).await {
        Ok(_) => Redirect::to("/panel/posts").into_response(),
        Err(PostStoreError::NotFound) => panel_error(
            &claims,
            StatusCode::NOT_FOUND,
            "Post no encontrado",
            "El post no existe o fue eliminado.",
        ),
        Err(PostStoreError::Forbidden) => panel_error(
            &claims,
            StatusCode::FORBIDDEN,
            "Sin permiso",
            "No puedes editar posts de otros autores.",
        ),
        Err(e) => {
            tracing::error!("Error actualizando post {}: {:?}", id, e);
            post_form_page(
                &claims,
                "Editar post",
                &action,
                "Guardar cambios",
                &form,
                &[],
                Some("No se pudo guardar el post"),
            )
            .into_response()
        }
    }
}

// POST /panel/posts/:id/delete: borrado explícito, distinto de archivar
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Response {
    match db::posts::delete_post(&state.pool, id, claims.user_id).await {
        Ok(()) => Redirect::to("/panel/posts").into_response(),
        Err(PostStoreError::NotFound) => panel_error(
            &claims,
            StatusCode::NOT_FOUND,
            "Post no encontrado",
            "El post no existe o ya fue eliminado.",
        ),
        Err(PostStoreError::Forbidden) => panel_error(
            &claims,
            StatusCode::FORBIDDEN,
            "Sin permiso",
            "No puedes eliminar posts de otros autores.",
        ),
        Err(e) => {
            tracing::error!("Error eliminando post {}: {:?}", id, e);
            panel_error(
                &claims,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "No se pudo eliminar el post.",
            )
        }
    }
}
