use uuid::Uuid;

// Slug URL-safe: minúsculas, rachas de no-alfanuméricos colapsadas a un guión
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_hyphen = false;

    for ch in input.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    while slug.starts_with('-') {
        slug.remove(0);
    }

    slug
}

// Un título sin caracteres utilizables igual necesita slug único
pub fn slug_for_title(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        format!("post-{}", Uuid::new_v4().simple())
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basico() {
        assert_eq!(slugify("Hola Mundo"), "hola-mundo");
        assert_eq!(slugify("  Rust & Postgres!  "), "rust-postgres");
        assert_eq!(slugify("Ya-con-guiones"), "ya-con-guiones");
    }

    #[test]
    fn slugify_colapsa_separadores() {
        assert_eq!(slugify("uno --- dos___tres"), "uno-dos-tres");
    }

    #[test]
    fn titulo_sin_ascii_recibe_slug_generado() {
        let slug = slug_for_title("¡¿!?");
        assert!(slug.starts_with("post-"));
        assert!(slug.len() > "post-".len());
    }
}
