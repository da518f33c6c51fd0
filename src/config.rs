use std::env;

// Configuración explícita en vez de leer variables de entorno por todos lados:
// se carga una sola vez en el arranque y viaja dentro del estado compartido.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").expect("DATABASE_URL no está definido en .env");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar en .env");

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            database_url,
            jwt_secret,
            port,
            max_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puerto_por_defecto_cuando_no_hay_variable() {
        env::remove_var("PORT");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
        env::set_var("DATABASE_URL", "postgres://localhost/test");
        env::set_var("JWT_SECRET", "secreto");

        let settings = Settings::from_env();
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.max_connections, 5);
    }
}
