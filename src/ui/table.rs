use serde::Serialize;
use serde_json::Value;

use crate::ui::escape_html;

// Umbral de truncado de celdas de texto
pub const MAX_CELL_CHARS: usize = 35;
pub const DEFAULT_PENDING_ROWS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn class(&self) -> &'static str {
        match self {
            Align::Left => "text-left",
            Align::Center => "text-center",
            Align::Right => "text-right",
        }
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> String>;
type CellRender<T> = Box<dyn Fn(&T, &str) -> String>;
type RowClass<T> = Box<dyn Fn(&T, usize) -> String>;

// Descriptor declarativo de columna. Se construye fresco en cada render;
// no tiene identidad persistente.
pub struct Column<T> {
    key: String,
    header: String,
    align: Align,
    accessor: Option<Accessor<T>>,
    render: Option<CellRender<T>>,
    header_class: Option<String>,
    cell_class: Option<String>,
}

impl<T> Column<T> {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            align: Align::Left,
            accessor: None,
            render: None,
            header_class: None,
            cell_class: None,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    // Resuelve el valor crudo de la celda; sin accessor se busca la clave
    // directamente sobre la fila
    pub fn accessor(mut self, f: impl Fn(&T) -> String + 'static) -> Self {
        self.accessor = Some(Box::new(f));
        self
    }

    // Render personalizado: recibe la fila y el valor crudo, devuelve HTML.
    // Tiene precedencia sobre la presentación por defecto.
    pub fn render(mut self, f: impl Fn(&T, &str) -> String + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn header_class(mut self, class: impl Into<String>) -> Self {
        self.header_class = Some(class.into());
        self
    }

    pub fn cell_class(mut self, class: impl Into<String>) -> Self {
        self.cell_class = Some(class.into());
        self
    }
}

// Texto truncado con el contenido completo disponible bajo demanda (title).
// Es presentación: la fila de datos nunca se recorta.
pub fn ellipsis_cell(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return escape_html(text);
    }
    let visible: String = text.chars().take(max).collect();
    format!(
        "<span class=\"cell-truncated\" title=\"{}\">{}...</span>",
        escape_html(text),
        escape_html(&visible)
    )
}

// Tabla genérica sobre una colección de filas y un conjunto declarativo de columnas.
// Estados de render mutuamente excluyentes, en este orden de precedencia:
// esqueleto de carga → error → filas → mensaje de vacío.
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    rows: Vec<T>,
    error: Option<String>,
    is_pending: bool,
    pending_rows: usize,
    empty_message: String,
    error_message: String,
    striped: bool,
    row_class: Option<RowClass<T>>,
}

impl<T: Serialize> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            error: None,
            is_pending: false,
            pending_rows: DEFAULT_PENDING_ROWS,
            empty_message: "No se encontraron datos".to_string(),
            error_message: "Error al cargar los datos".to_string(),
            striped: false,
            row_class: None,
        }
    }

    pub fn rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self
    }

    pub fn error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    pub fn pending(mut self, is_pending: bool) -> Self {
        self.is_pending = is_pending;
        self
    }

    pub fn pending_rows(mut self, rows: usize) -> Self {
        self.pending_rows = rows;
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = message.into();
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    pub fn striped(mut self, striped: bool) -> Self {
        self.striped = striped;
        self
    }

    pub fn row_class(mut self, f: impl Fn(&T, usize) -> String + 'static) -> Self {
        self.row_class = Some(Box::new(f));
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<div class=\"table-wrap\"><table class=\"data-table\"><thead><tr>");

        for column in &self.columns {
            html.push_str(&format!(
                "<th class=\"{}{}\">{}</th>",
                column.align.class(),
                column
                    .header_class
                    .as_deref()
                    .map(|c| format!(" {c}"))
                    .unwrap_or_default(),
                escape_html(&column.header)
            ));
        }
        html.push_str("</tr></thead><tbody>");

        if self.is_pending {
            html.push_str(&self.render_skeleton());
        } else if let Some(error) = &self.error {
            html.push_str(&self.render_error(error));
        } else if !self.rows.is_empty() {
            html.push_str(&self.render_rows());
        } else {
            html.push_str(&format!(
                "<tr><td colspan=\"{}\" class=\"table-empty\">{}</td></tr>",
                self.columns.len(),
                escape_html(&self.empty_message)
            ));
        }

        html.push_str("</tbody></table></div>");
        html
    }

    fn render_skeleton(&self) -> String {
        let mut html = String::new();
        for _ in 0..self.pending_rows {
            html.push_str("<tr>");
            for _ in &self.columns {
                html.push_str("<td><span class=\"skeleton\"></span></td>");
            }
            html.push_str("</tr>");
        }
        html
    }

    fn render_error(&self, error: &str) -> String {
        format!(
            concat!(
                "<tr><td colspan=\"{}\" class=\"table-error\">",
                "<strong>{}</strong><div>{}</div></td></tr>"
            ),
            self.columns.len(),
            escape_html(&self.error_message),
            escape_html(error)
        )
    }

    fn render_rows(&self) -> String {
        let mut html = String::new();

        for (index, row) in self.rows.iter().enumerate() {
            // una sola serialización por fila para las búsquedas por clave
            let row_json = serde_json::to_value(row).unwrap_or(Value::Null);

            let mut clases = Vec::new();
            if self.striped && index % 2 == 1 {
                clases.push("striped".to_string());
            }
            if let Some(row_class) = &self.row_class {
                let extra = row_class(row, index);
                if !extra.is_empty() {
                    clases.push(extra);
                }
            }

            if clases.is_empty() {
                html.push_str("<tr>");
            } else {
                html.push_str(&format!("<tr class=\"{}\">", clases.join(" ")));
            }

            for column in &self.columns {
                let (valor, es_texto) = cell_value(row, &row_json, column);

                let contenido = match &column.render {
                    Some(render) => render(row, &valor),
                    None if es_texto => ellipsis_cell(&valor, MAX_CELL_CHARS),
                    None => escape_html(&valor),
                };

                html.push_str(&format!(
                    "<td class=\"{}{}\">{}</td>",
                    column.align.class(),
                    column
                        .cell_class
                        .as_deref()
                        .map(|c| format!(" {c}"))
                        .unwrap_or_default(),
                    contenido
                ));
            }
            html.push_str("</tr>");
        }

        html
    }
}

// El accessor explícito manda; si no lo hay, búsqueda directa por clave en
// la representación JSON de la fila. El bool indica si el valor era texto
// (solo el texto se trunca).
fn cell_value<T>(row: &T, row_json: &Value, column: &Column<T>) -> (String, bool) {
    if let Some(accessor) = &column.accessor {
        return (accessor(row), true);
    }

    match row_json.get(&column.key) {
        Some(Value::String(s)) => (s.clone(), true),
        Some(Value::Null) | None => (String::new(), false),
        Some(otro) => (otro.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Fila {
        nombre: String,
        visitas: i64,
    }

    fn filas() -> Vec<Fila> {
        vec![
            Fila {
                nombre: "Primera".into(),
                visitas: 10,
            },
            Fila {
                nombre: "Segunda".into(),
                visitas: 20,
            },
        ]
    }

    fn columnas() -> Vec<Column<Fila>> {
        vec![
            Column::new("nombre", "Nombre"),
            Column::new("visitas", "Visitas").align(Align::Center),
        ]
    }

    #[test]
    fn filas_y_busqueda_por_clave() {
        let html = DataTable::new(columnas()).rows(filas()).render();
        assert!(html.contains("Primera"));
        assert!(html.contains("20"));
        assert!(html.contains("text-center"));
    }

    #[test]
    fn sin_filas_y_sin_error_muestra_el_mensaje_de_vacio() {
        let html = DataTable::new(columnas())
            .empty_message("Todavía no hay posts")
            .render();
        assert!(html.contains("Todavía no hay posts"));
        assert!(html.contains("table-empty"));
    }

    #[test]
    fn el_error_gana_aunque_haya_filas() {
        let html = DataTable::new(columnas())
            .rows(filas())
            .error(Some("se cayó la base".into()))
            .render();
        assert!(html.contains("se cayó la base"));
        assert!(html.contains("table-error"));
        // la rama de filas no se renderiza nunca junto al error
        assert!(!html.contains("Primera"));
    }

    #[test]
    fn el_esqueleto_tiene_precedencia_sobre_todo() {
        let html = DataTable::new(columnas())
            .rows(filas())
            .error(Some("error".into()))
            .pending(true)
            .pending_rows(3)
            .render();
        assert_eq!(html.matches("skeleton").count(), 3 * 2);
        assert!(!html.contains("table-error"));
        assert!(!html.contains("Primera"));
    }

    #[test]
    fn truncado_exactamente_en_el_umbral() {
        let exacto: String = "a".repeat(35);
        let largo: String = "b".repeat(36);

        let html = DataTable::new(vec![Column::new("nombre", "Nombre")])
            .rows(vec![
                Fila {
                    nombre: exacto.clone(),
                    visitas: 0,
                },
                Fila {
                    nombre: largo.clone(),
                    visitas: 0,
                },
            ])
            .render();

        // 35 caracteres se muestran completos, sin elipsis
        assert!(html.contains(&exacto));
        // 36 caracteres: 35 visibles + "...", texto completo en title
        let visible: String = "b".repeat(35);
        assert!(html.contains(&format!("{}...", visible)));
        assert!(html.contains(&format!("title=\"{}\"", largo)));
        assert!(!html.contains(&format!(">{}<", largo)));
    }

    #[test]
    fn el_accessor_reemplaza_la_busqueda_por_clave() {
        let columns = vec![
            Column::new("visitas", "Visitas").accessor(|f: &Fila| format!("{} visitas", f.visitas))
        ];
        let html = DataTable::new(columns).rows(filas()).render();
        assert!(html.contains("10 visitas"));
    }

    #[test]
    fn el_render_personalizado_gana_sobre_el_valor_crudo() {
        let columns = vec![Column::new("nombre", "Nombre")
            .render(|_f: &Fila, valor| format!("<strong>{}</strong>", valor))];
        let html = DataTable::new(columns).rows(filas()).render();
        assert!(html.contains("<strong>Primera</strong>"));
    }

    #[test]
    fn rayado_alternado_solo_en_filas_impares() {
        let html = DataTable::new(columnas())
            .rows(filas())
            .striped(true)
            .render();
        assert_eq!(html.matches("class=\"striped\"").count(), 1);
    }
}
