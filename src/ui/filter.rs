use std::time::{Duration, Instant};

use crate::ui::{escape_html, query::QueryParamSet};

// Quietud por defecto antes de confirmar una búsqueda
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

// Valor centinela de los select que significa "sin filtrar"
pub const SELECT_ALL: &str = "all";

#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

// Descriptor tipado de cada control del toolbar. La composición es una
// lista explícita, no hijos acoplados por contexto implícito.
#[derive(Debug, Clone)]
pub enum FilterField {
    Search {
        param: String,
        label: String,
        placeholder: String,
        debounce_ms: u64,
    },
    Select {
        param: String,
        label: String,
        placeholder: String,
        options: Vec<SelectOption>,
    },
    Date {
        param: String,
        label: String,
    },
    Input {
        param: String,
        label: String,
        placeholder: String,
    },
}

impl FilterField {
    pub fn search(
        param: impl Into<String>,
        label: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        FilterField::Search {
            param: param.into(),
            label: label.into(),
            placeholder: placeholder.into(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }

    pub fn select(
        param: impl Into<String>,
        label: impl Into<String>,
        placeholder: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        FilterField::Select {
            param: param.into(),
            label: label.into(),
            placeholder: placeholder.into(),
            options,
        }
    }

    pub fn date(param: impl Into<String>, label: impl Into<String>) -> Self {
        FilterField::Date {
            param: param.into(),
            label: label.into(),
        }
    }

    pub fn input(
        param: impl Into<String>,
        label: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        FilterField::Input {
            param: param.into(),
            label: label.into(),
            placeholder: placeholder.into(),
        }
    }

    pub fn param(&self) -> &str {
        match self {
            FilterField::Search { param, .. }
            | FilterField::Select { param, .. }
            | FilterField::Date { param, .. }
            | FilterField::Input { param, .. } => param,
        }
    }
}

// Mutaciones del estado de query. Cualquier cambio de filtro devuelve la
// paginación a la primera página; un valor vacío elimina la clave por
// completo, nunca deja una cadena vacía.
pub fn apply_search(params: &mut QueryParamSet, param: &str, value: &str) {
    if value.is_empty() {
        params.remove(param);
    } else {
        params.set(param, value);
    }
    params.remove("page");
}

pub fn apply_select(params: &mut QueryParamSet, param: &str, value: &str) {
    if value.is_empty() || value == SELECT_ALL {
        params.remove(param);
    } else {
        params.set(param, value);
    }
    params.remove("page");
}

pub fn apply_input(params: &mut QueryParamSet, param: &str, value: &str) {
    if value.is_empty() {
        params.remove(param);
    } else {
        params.set(param, value);
    }
    params.remove("page");
}

pub fn apply_date(params: &mut QueryParamSet, param: &str, value: &str) {
    apply_input(params, param, value);
}

// Debounce de la búsqueda: cada tecla REINICIA el plazo (no encola), así
// que hay a lo sumo una confirmación pendiente. Tras `interval` sin teclas
// nuevas, `poll_commit` entrega exactamente un valor.
#[derive(Debug)]
pub struct SearchDebouncer {
    interval: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
}

impl SearchDebouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            deadline: None,
        }
    }

    pub fn with_default_interval() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }

    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(value.into());
        self.deadline = Some(now + self.interval);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn poll_commit(&mut self, now: Instant) -> Option<String> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}

// Toolbar de filtros: un formulario GET contra la ruta actual. Los valores
// se releen del QueryParamSet en cada render, así los controles reflejan
// también los cambios externos (historial del navegador, enlaces).
pub struct FilterToolbar {
    action: String,
    fields: Vec<FilterField>,
}

impl FilterToolbar {
    pub fn new(action: impl Into<String>, fields: Vec<FilterField>) -> Self {
        Self {
            action: action.into(),
            fields,
        }
    }

    pub fn render(&self, params: &QueryParamSet) -> String {
        let mut html = String::new();
        html.push_str(&format!(
            "<form class=\"toolbar\" method=\"get\" action=\"{}\">",
            escape_html(&self.action)
        ));

        // Los parámetros que no pertenecen a ningún control sobreviven al
        // envío como campos ocultos; `page` queda fuera a propósito (todo
        // cambio de filtro vuelve a la primera página).
        for (key, value) in params.iter() {
            if key == "page" || self.fields.iter().any(|f| f.param() == key) {
                continue;
            }
            html.push_str(&format!(
                "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                escape_html(key),
                escape_html(value)
            ));
        }

        for field in &self.fields {
            html.push_str(&self.render_field(field, params));
        }

        html.push_str("<button type=\"submit\" class=\"btn\">Filtrar</button>");
        html.push_str("</form>");
        html
    }

    fn render_field(&self, field: &FilterField, params: &QueryParamSet) -> String {
        match field {
            FilterField::Search {
                param,
                label,
                placeholder,
                debounce_ms,
            } => {
                let current = params.get(param).unwrap_or("");
                format!(
                    concat!(
                        "<div class=\"field field-search\"><label>{}</label>",
                        "<input type=\"search\" name=\"{}\" value=\"{}\" ",
                        "placeholder=\"{}\" data-debounce-ms=\"{}\"></div>"
                    ),
                    escape_html(label),
                    escape_html(param),
                    escape_html(current),
                    escape_html(placeholder),
                    debounce_ms
                )
            }
            FilterField::Select {
                param,
                label,
                placeholder,
                options,
            } => {
                let current = params.get(param).unwrap_or("");
                let mut html = format!(
                    "<div class=\"field\"><label>{}</label><select name=\"{}\">",
                    escape_html(label),
                    escape_html(param)
                );
                if !options.iter().any(|o| o.value == SELECT_ALL) {
                    html.push_str(&format!(
                        "<option value=\"{}\">{}</option>",
                        SELECT_ALL,
                        escape_html(placeholder)
                    ));
                }
                for option in options {
                    let seleccionado = option.value == current
                        || (current.is_empty() && option.value == SELECT_ALL);
                    html.push_str(&format!(
                        "<option value=\"{}\"{}>{}</option>",
                        escape_html(&option.value),
                        if seleccionado { " selected" } else { "" },
                        escape_html(&option.label)
                    ));
                }
                html.push_str("</select></div>");
                html
            }
            FilterField::Date { param, label } => {
                let current = params.get(param).unwrap_or("");
                format!(
                    "<div class=\"field\"><label>{}</label><input type=\"date\" name=\"{}\" value=\"{}\"></div>",
                    escape_html(label),
                    escape_html(param),
                    escape_html(current)
                )
            }
            FilterField::Input {
                param,
                label,
                placeholder,
            } => {
                let current = params.get(param).unwrap_or("");
                format!(
                    "<div class=\"field\"><label>{}</label><input type=\"text\" name=\"{}\" value=\"{}\" placeholder=\"{}\"></div>",
                    escape_html(label),
                    escape_html(param),
                    escape_html(current),
                    escape_html(placeholder)
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn la_busqueda_fija_el_valor_y_reinicia_la_pagina() {
        let mut params = QueryParamSet::parse("page=4&limit=20");
        apply_search(&mut params, "search", "rust");
        assert_eq!(params.get("search"), Some("rust"));
        assert!(!params.contains("page"));
        assert_eq!(params.get("limit"), Some("20"));
    }

    #[test]
    fn limpiar_la_busqueda_elimina_la_clave_por_completo() {
        let mut params = QueryParamSet::new();
        apply_search(&mut params, "search", "rust");
        apply_search(&mut params, "search", "");
        assert!(!params.contains("search"));
    }

    #[test]
    fn el_centinela_all_elimina_el_filtro_del_select() {
        let mut params = QueryParamSet::parse("status=draft&page=2");
        apply_select(&mut params, "status", SELECT_ALL);
        assert!(!params.contains("status"));
        assert!(!params.contains("page"));

        apply_select(&mut params, "status", "published");
        assert_eq!(params.get("status"), Some("published"));
    }

    #[test]
    fn cualquier_filtro_reinicia_la_paginacion() {
        let mut params = QueryParamSet::parse("page=7");
        apply_input(&mut params, "author", "ana");
        assert!(!params.contains("page"));

        let mut params = QueryParamSet::parse("page=7");
        apply_date(&mut params, "from", "2026-01-01");
        assert!(!params.contains("page"));
    }

    #[test]
    fn el_debounce_confirma_una_sola_vez_por_pausa() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(500));

        // ráfaga de teclas: cada una reinicia el plazo
        debouncer.input("r", t0);
        debouncer.input("ru", t0 + Duration::from_millis(100));
        debouncer.input("rus", t0 + Duration::from_millis(200));

        // el plazo corre desde la última tecla (t0+200), no desde la primera
        assert_eq!(debouncer.poll_commit(t0 + Duration::from_millis(600)), None);

        let commit = debouncer.poll_commit(t0 + Duration::from_millis(700));
        assert_eq!(commit.as_deref(), Some("rus"));

        // exactamente una confirmación: ya no queda nada pendiente
        assert_eq!(debouncer.poll_commit(t0 + Duration::from_millis(1500)), None);
        assert!(!debouncer.has_pending());
    }

    #[test]
    fn dos_pausas_producen_dos_confirmaciones() {
        let t0 = Instant::now();
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(500));

        debouncer.input("primera", t0);
        assert_eq!(
            debouncer.poll_commit(t0 + Duration::from_millis(500)).as_deref(),
            Some("primera")
        );

        debouncer.input("segunda", t0 + Duration::from_millis(1000));
        assert_eq!(
            debouncer.poll_commit(t0 + Duration::from_millis(1500)).as_deref(),
            Some("segunda")
        );
    }

    #[test]
    fn el_render_refleja_los_valores_del_query() {
        let toolbar = FilterToolbar::new(
            "/panel/posts",
            vec![
                FilterField::search("search", "Buscar", "Buscar posts..."),
                FilterField::select(
                    "status",
                    "Estado",
                    "Todos los estados",
                    vec![
                        SelectOption::new("all", "Todos los estados"),
                        SelectOption::new("draft", "Borrador"),
                        SelectOption::new("published", "Publicado"),
                    ],
                ),
            ],
        );

        let params = QueryParamSet::parse("search=rust&status=draft&limit=50");
        let html = toolbar.render(&params);

        assert!(html.contains("value=\"rust\""));
        assert!(html.contains("<option value=\"draft\" selected>"));
        // limit no pertenece a ningún control: sobrevive como campo oculto
        assert!(html.contains("type=\"hidden\" name=\"limit\" value=\"50\""));
        assert!(html.contains("data-debounce-ms=\"500\""));
    }

    #[test]
    fn page_no_sobrevive_al_envio_del_formulario() {
        let toolbar = FilterToolbar::new(
            "/blog",
            vec![FilterField::search("search", "Buscar", "...")],
        );
        let params = QueryParamSet::parse("page=3");
        let html = toolbar.render(&params);
        assert!(!html.contains("name=\"page\""));
    }
}
