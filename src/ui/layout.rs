use crate::models::user::Claims;
use crate::ui::escape_html;

const STYLES: &str = r#"
:root { color-scheme: light; }
* { box-sizing: border-box; }
body { margin: 0; font-family: system-ui, sans-serif; color: #1f2430; background: #f7f7f8; }
a { color: #2457d6; text-decoration: none; }
a:hover { text-decoration: underline; }
.nav { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: #ffffff; border-bottom: 1px solid #e3e5ea; }
.nav .brand { font-weight: 700; font-size: 1.15rem; color: #1f2430; }
.nav .links { display: flex; align-items: center; gap: 1rem; }
.nav form { display: inline; }
.container { max-width: 960px; margin: 0 auto; padding: 1.5rem; }
.subtitle { color: #5b6372; }
.btn { display: inline-block; padding: 0.45rem 0.9rem; border: 1px solid #c9cdd6; border-radius: 6px; background: #ffffff; cursor: pointer; font-size: 0.9rem; }
.btn-primary { background: #2457d6; border-color: #2457d6; color: #ffffff; }
.toolbar { display: flex; gap: 1rem; align-items: flex-end; padding: 1rem; background: #ffffff; border: 1px solid #e3e5ea; border-radius: 8px; margin: 1rem 0; }
.field { display: flex; flex-direction: column; gap: 0.35rem; }
.field-search { flex: 2; }
.field label { font-size: 0.8rem; color: #5b6372; }
.field input, .field select { padding: 0.45rem 0.6rem; border: 1px solid #c9cdd6; border-radius: 6px; font-size: 0.9rem; }
.table-wrap { overflow-x: auto; border: 1px solid #e3e5ea; border-radius: 8px; background: #ffffff; }
.data-table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
.data-table th, .data-table td { padding: 0.6rem 0.8rem; border-bottom: 1px solid #eceef2; }
.data-table th { background: #f1f2f5; font-weight: 600; }
.data-table tr.striped { background: #fafbfc; }
.text-left { text-align: left; }
.text-center { text-align: center; }
.text-right { text-align: right; }
.table-empty { text-align: center; color: #5b6372; padding: 2.5rem 1rem; }
.table-error { text-align: center; color: #b3261e; padding: 2rem 1rem; }
.skeleton { display: inline-block; width: 100%; height: 0.9rem; border-radius: 4px; background: #e7e9ee; }
.cell-truncated { cursor: help; }
.pager { display: flex; align-items: center; justify-content: space-between; gap: 1rem; margin: 1rem 0; flex-wrap: wrap; }
.pager-info { color: #5b6372; font-size: 0.85rem; }
.pager-controls { display: flex; gap: 0.25rem; }
.pager-btn { padding: 0.3rem 0.6rem; border: 1px solid #c9cdd6; border-radius: 6px; font-size: 0.85rem; }
.pager-btn.current { background: #2457d6; border-color: #2457d6; color: #ffffff; }
.pager-btn.disabled { color: #aab0bc; }
.pager-gap { padding: 0.3rem 0.35rem; color: #5b6372; }
.pager-sizes { font-size: 0.85rem; color: #5b6372; }
.badge { display: inline-block; padding: 0.15rem 0.55rem; border-radius: 999px; font-size: 0.78rem; border: 1px solid transparent; }
.badge-published { background: #e5f3e8; color: #1d7a33; border-color: #bfe3c8; }
.badge-draft { background: #fdf4dc; color: #8a6d1a; border-color: #f0dfae; }
.badge-archived { background: #eef0f3; color: #5b6372; border-color: #d8dce3; }
.inline-error { padding: 0.75rem 1rem; border: 1px solid #f0c2bf; border-radius: 8px; background: #fdeceb; color: #b3261e; margin: 1rem 0; }
.field-error { color: #b3261e; font-size: 0.8rem; }
.form-card { max-width: 640px; background: #ffffff; border: 1px solid #e3e5ea; border-radius: 8px; padding: 1.5rem; display: flex; flex-direction: column; gap: 1rem; }
.form-card textarea { min-height: 12rem; padding: 0.45rem 0.6rem; border: 1px solid #c9cdd6; border-radius: 6px; font-size: 0.9rem; font-family: inherit; }
.post-list { display: flex; flex-direction: column; gap: 1rem; }
.post-card { background: #ffffff; border: 1px solid #e3e5ea; border-radius: 8px; padding: 1.25rem; }
.post-card h2 { margin: 0 0 0.35rem; font-size: 1.15rem; }
.post-meta { color: #5b6372; font-size: 0.82rem; }
.stats { display: flex; gap: 1rem; flex-wrap: wrap; margin: 1rem 0; }
.stat-card { flex: 1; min-width: 9rem; background: #ffffff; border: 1px solid #e3e5ea; border-radius: 8px; padding: 1rem; }
.stat-card .valor { font-size: 1.6rem; font-weight: 700; }
.stat-card .nombre { color: #5b6372; font-size: 0.82rem; }
.page-head { display: flex; align-items: center; justify-content: space-between; gap: 1rem; }
"#;

// Cascarón común de todas las páginas. El actor llega como contexto
// explícito; la navegación cambia según haya sesión o no.
pub fn page(title: &str, actor: Option<&Claims>, body: &str) -> String {
    let nav_links = match actor {
        Some(claims) => format!(
            concat!(
                "<a href=\"/panel/dashboard\">Dashboard</a>",
                "<a href=\"/panel/posts\">Mis posts</a>",
                "<span class=\"post-meta\">{}</span>",
                "<form method=\"post\" action=\"/logout\">",
                "<button type=\"submit\" class=\"btn\">Salir</button></form>"
            ),
            escape_html(&claims.sub)
        ),
        None => concat!(
            "<a href=\"/login\">Ingresar</a>",
            "<a href=\"/register\">Registrarse</a>"
        )
        .to_string(),
    };

    format!(
        concat!(
            "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{} · Bitácora</title><style>{}</style></head><body>",
            "<nav class=\"nav\"><a class=\"brand\" href=\"/blog\">Bitácora</a>",
            "<div class=\"links\">{}</div></nav>",
            "<main class=\"container\">{}</main>",
            "</body></html>"
        ),
        escape_html(title),
        STYLES,
        nav_links,
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims {
            sub: "ana@ejemplo.com".into(),
            exp: 0,
            iat: 0,
            user_id: 1,
        }
    }

    #[test]
    fn con_sesion_se_ve_el_panel_y_el_logout() {
        let html = page("Inicio", Some(&claims()), "<p>hola</p>");
        assert!(html.contains("Mis posts"));
        assert!(html.contains("action=\"/logout\""));
        assert!(!html.contains("/register"));
    }

    #[test]
    fn sin_sesion_se_ofrece_ingresar() {
        let html = page("Inicio", None, "");
        assert!(html.contains("/login"));
        assert!(html.contains("/register"));
        assert!(!html.contains("/logout"));
    }
}
