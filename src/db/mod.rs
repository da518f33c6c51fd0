use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::config::Settings;

pub mod posts;

// Definimos un alias para "Pool<Postgres>"
pub type DbPool = Pool<Postgres>;

pub async fn init_db(settings: &Settings) -> DbPool {
    // Creamos el pool de conexiones
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await
        .expect("Error al conectar a la Base de Datos. ¿Está corriendo Postgres?");

    // Esquema al día antes de servir la primera petición
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Error al aplicar las migraciones");

    pool
}
