use crate::ui::{escape_html, query::QueryParamSet};

pub const DEFAULT_PAGE_SIZES: [u32; 4] = [10, 20, 50, 100];

// Cuántos números de página se muestran antes de recurrir a la elipsis
const MAX_PAGES_VISIBLES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

// Ventana deslizante de números de página. Con pocas páginas se muestran
// todas; con muchas, primera/última siempre visibles y la elipsis marca el
// hueco según estemos cerca del inicio, del final o en el medio.
pub fn page_numbers(current: u32, total: u32) -> Vec<PageItem> {
    let mut pages = Vec::new();

    if total <= MAX_PAGES_VISIBLES {
        for n in 1..=total {
            pages.push(PageItem::Page(n));
        }
        return pages;
    }

    if current <= 3 {
        // cerca del inicio
        for n in 1..=4 {
            pages.push(PageItem::Page(n));
        }
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total));
    } else if current >= total - 2 {
        // cerca del final
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        for n in (total - 3)..=total {
            pages.push(PageItem::Page(n));
        }
    } else {
        // en el medio
        pages.push(PageItem::Page(1));
        pages.push(PageItem::Ellipsis);
        for n in (current - 1)..=(current + 1) {
            pages.push(PageItem::Page(n));
        }
        pages.push(PageItem::Ellipsis);
        pages.push(PageItem::Page(total));
    }

    pages
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: i64,
    pub page_size: u32,
    pub page_size_options: Vec<u32>,
}

impl Pagination {
    pub fn from_count(total_count: i64, page_size: u32, current_page: u32) -> Self {
        let page_size = page_size.max(1);
        let total = total_count.max(0) as u64;
        let total_pages = (total.div_ceil(u64::from(page_size)) as u32).max(1);

        Self {
            current_page: current_page.max(1),
            total_pages,
            total_count: total_count.max(0),
            page_size,
            page_size_options: DEFAULT_PAGE_SIZES.to_vec(),
        }
    }

    pub fn start_item(&self) -> i64 {
        if self.total_count == 0 {
            0
        } else {
            i64::from(self.current_page - 1) * i64::from(self.page_size) + 1
        }
    }

    pub fn end_item(&self) -> i64 {
        (i64::from(self.current_page) * i64::from(self.page_size)).min(self.total_count)
    }

    // Confirmar un cambio de página: o el callback del llamador o el estado
    // de query compartido, nunca ambos. Fuera de rango se ignora.
    pub fn commit_page(
        &self,
        page: u32,
        on_change: Option<&mut dyn FnMut(u32)>,
        params: &mut QueryParamSet,
    ) {
        if page < 1 || page > self.total_pages {
            return;
        }
        match on_change {
            Some(callback) => callback(page),
            None => params.set("page", &page.to_string()),
        }
    }

    // Cambiar el tamaño de página vuelve siempre a la primera, para no
    // quedar parado más allá de la nueva última página
    pub fn commit_page_size(
        &self,
        size: u32,
        on_change: Option<&mut dyn FnMut(u32)>,
        params: &mut QueryParamSet,
    ) {
        match on_change {
            Some(callback) => callback(size),
            None => {
                params.set("limit", &size.to_string());
                params.set("page", "1");
            }
        }
    }

    pub fn render(&self, path: &str, params: &QueryParamSet) -> String {
        // sin resultados no hay nada que paginar
        if self.total_count == 0 {
            return String::new();
        }

        let anterior_ok = self.current_page > 1;
        let siguiente_ok = self.current_page < self.total_pages;

        let mut html = String::from("<nav class=\"pager\">");
        html.push_str(&format!(
            "<span class=\"pager-info\">Mostrando {} a {} de {} resultados</span>",
            self.start_item(),
            self.end_item(),
            self.total_count
        ));

        html.push_str("<div class=\"pager-controls\">");
        html.push_str(&self.nav_link(path, params, 1, "«", anterior_ok));
        html.push_str(&self.nav_link(path, params, self.current_page.saturating_sub(1), "‹", anterior_ok));

        for item in page_numbers(self.current_page, self.total_pages) {
            match item {
                PageItem::Ellipsis => html.push_str("<span class=\"pager-gap\">...</span>"),
                PageItem::Page(n) if n == self.current_page => {
                    html.push_str(&format!("<span class=\"pager-btn current\">{}</span>", n));
                }
                PageItem::Page(n) => {
                    let href = params.with("page", &n.to_string()).href(path);
                    html.push_str(&format!(
                        "<a class=\"pager-btn\" href=\"{}\">{}</a>",
                        escape_html(&href),
                        n
                    ));
                }
            }
        }

        html.push_str(&self.nav_link(path, params, self.current_page + 1, "›", siguiente_ok));
        html.push_str(&self.nav_link(path, params, self.total_pages, "»", siguiente_ok));
        html.push_str("</div>");

        html.push_str("<div class=\"pager-sizes\">Por página:");
        for &size in &self.page_size_options {
            if size == self.page_size {
                html.push_str(&format!(" <span class=\"pager-btn current\">{}</span>", size));
            } else {
                // el cambio de tamaño siempre aterriza en la primera página
                let href = params
                    .with("limit", &size.to_string())
                    .with("page", "1")
                    .href(path);
                html.push_str(&format!(
                    " <a class=\"pager-btn\" href=\"{}\">{}</a>",
                    escape_html(&href),
                    size
                ));
            }
        }
        html.push_str("</div></nav>");
        html
    }

    fn nav_link(
        &self,
        path: &str,
        params: &QueryParamSet,
        page: u32,
        label: &str,
        enabled: bool,
    ) -> String {
        if enabled {
            let href = params.with("page", &page.to_string()).href(path);
            format!(
                "<a class=\"pager-btn\" href=\"{}\">{}</a>",
                escape_html(&href),
                label
            )
        } else {
            format!("<span class=\"pager-btn disabled\">{}</span>", label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeros(items: &[PageItem]) -> Vec<i64> {
        // -1 representa la elipsis para poder comparar de un vistazo
        items
            .iter()
            .map(|i| match i {
                PageItem::Page(n) => i64::from(*n),
                PageItem::Ellipsis => -1,
            })
            .collect()
    }

    #[test]
    fn con_cinco_o_menos_se_muestran_todas() {
        for total in 1..=5 {
            let esperado: Vec<i64> = (1..=i64::from(total)).collect();
            assert_eq!(numeros(&page_numbers(1, total)), esperado);
        }
    }

    #[test]
    fn ventana_cerca_del_inicio() {
        assert_eq!(numeros(&page_numbers(1, 10)), vec![1, 2, 3, 4, -1, 10]);
        assert_eq!(numeros(&page_numbers(3, 10)), vec![1, 2, 3, 4, -1, 10]);
    }

    #[test]
    fn ventana_cerca_del_final() {
        assert_eq!(numeros(&page_numbers(10, 10)), vec![1, -1, 7, 8, 9, 10]);
        assert_eq!(numeros(&page_numbers(8, 10)), vec![1, -1, 7, 8, 9, 10]);
    }

    #[test]
    fn ventana_en_el_medio() {
        assert_eq!(numeros(&page_numbers(5, 10)), vec![1, -1, 4, 5, 6, -1, 10]);
    }

    #[test]
    fn from_count_redondea_hacia_arriba() {
        assert_eq!(Pagination::from_count(42, 10, 1).total_pages, 5);
        assert_eq!(Pagination::from_count(40, 10, 1).total_pages, 4);
        assert_eq!(Pagination::from_count(0, 10, 1).total_pages, 1);
    }

    #[test]
    fn cambiar_el_tamano_reinicia_la_pagina() {
        let pagination = Pagination::from_count(100, 10, 4);
        let mut params = QueryParamSet::parse("page=4&limit=10");
        pagination.commit_page_size(50, None, &mut params);
        assert_eq!(params.get("limit"), Some("50"));
        assert_eq!(params.get("page"), Some("1"));
    }

    #[test]
    fn con_callback_no_se_toca_el_estado_compartido() {
        let pagination = Pagination::from_count(100, 10, 4);
        let mut params = QueryParamSet::parse("page=4");
        let mut recibido = 0;
        let mut callback = |page: u32| recibido = page;
        pagination.commit_page(2, Some(&mut callback), &mut params);
        assert_eq!(recibido, 2);
        assert_eq!(params.get("page"), Some("4"));
    }

    #[test]
    fn paginas_fuera_de_rango_se_ignoran() {
        let pagination = Pagination::from_count(30, 10, 1);
        let mut params = QueryParamSet::new();
        pagination.commit_page(0, None, &mut params);
        pagination.commit_page(99, None, &mut params);
        assert!(!params.contains("page"));
    }

    #[test]
    fn sin_resultados_no_se_renderiza_nada() {
        let pagination = Pagination::from_count(0, 10, 1);
        assert_eq!(pagination.render("/blog", &QueryParamSet::new()), "");
    }

    #[test]
    fn extremos_deshabilitados_en_la_primera_y_ultima_pagina() {
        let params = QueryParamSet::new();

        let primera = Pagination::from_count(100, 10, 1);
        let html = primera.render("/blog", &params);
        assert!(html.contains("<span class=\"pager-btn disabled\">«</span>"));
        assert!(html.contains("<a class=\"pager-btn\" href=\"/blog?page=2\">›</a>"));

        let ultima = Pagination::from_count(100, 10, 10);
        let html = ultima.render("/blog", &params);
        assert!(html.contains("<span class=\"pager-btn disabled\">»</span>"));
        assert!(html.contains("Mostrando 91 a 100 de 100 resultados"));
    }
}
