use url::form_urlencoded;

// Conjunto ordenado de parámetros de query. Es el estado compartido que
// mueve filtros y paginación: los controles lo mutan, las páginas lo leen
// en cada render. La ausencia de una clave significa "sin filtrar".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParamSet {
    entries: Vec<(String, String)>,
}

impl QueryParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(query: &str) -> Self {
        let entries = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    // Reemplaza en su posición para mantener el orden estable; si la clave
    // estaba repetida, las copias extra desaparecen.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter().position(|(k, _)| k == key) {
            Some(pos) => {
                self.entries[pos].1 = value.to_string();
                // conserva solo la primera ocurrencia
                let mut vista = false;
                self.entries.retain(|(k, _)| {
                    if k == key {
                        if vista {
                            return false;
                        }
                        vista = true;
                    }
                    true
                });
            }
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.entries {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    // URL navegable con el estado actual
    pub fn href(&self, path: &str) -> String {
        if self.entries.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.to_query_string())
        }
    }

    // Copias para construir enlaces sin tocar el estado compartido
    pub fn with(&self, key: &str, value: &str) -> Self {
        let mut copia = self.clone();
        copia.set(key, value);
        copia
    }

    pub fn without(&self, key: &str) -> Self {
        let mut copia = self.clone();
        copia.remove(key);
        copia
    }

    // page es 1-based; cualquier valor ilegible cae en la primera página
    pub fn page(&self) -> u32 {
        self.get("page")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn limit(&self, default: u32) -> u32 {
        self.get("limit")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_conserva_el_orden() {
        let params = QueryParamSet::parse("b=2&a=1&c=3");
        let claves: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(claves, vec!["b", "a", "c"]);
    }

    #[test]
    fn set_reemplaza_en_su_posicion() {
        let mut params = QueryParamSet::parse("search=rust&page=3");
        params.set("search", "axum");
        assert_eq!(params.to_query_string(), "search=axum&page=3");
    }

    #[test]
    fn set_agrega_claves_nuevas_al_final() {
        let mut params = QueryParamSet::parse("search=rust");
        params.set("status", "draft");
        assert_eq!(params.to_query_string(), "search=rust&status=draft");
    }

    #[test]
    fn remove_elimina_la_clave_por_completo() {
        let mut params = QueryParamSet::parse("search=rust&page=2");
        params.remove("search");
        assert!(!params.contains("search"));
        assert_eq!(params.to_query_string(), "page=2");
    }

    #[test]
    fn roundtrip_con_caracteres_especiales() {
        let mut params = QueryParamSet::new();
        params.set("search", "café & té");
        let reparseado = QueryParamSet::parse(&params.to_query_string());
        assert_eq!(reparseado.get("search"), Some("café & té"));
    }

    #[test]
    fn page_y_limit_con_valores_por_defecto() {
        let params = QueryParamSet::parse("");
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(10), 10);

        let params = QueryParamSet::parse("page=0&limit=abc");
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(10), 10);

        let params = QueryParamSet::parse("page=4&limit=25");
        assert_eq!(params.page(), 4);
        assert_eq!(params.limit(10), 25);
    }

    #[test]
    fn href_sin_parametros_es_la_ruta_desnuda() {
        let params = QueryParamSet::new();
        assert_eq!(params.href("/blog"), "/blog");
        assert_eq!(params.with("page", "2").href("/blog"), "/blog?page=2");
    }
}
