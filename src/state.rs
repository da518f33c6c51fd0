use std::sync::Arc;

use crate::config::Settings;
use crate::db::DbPool;
use crate::session::SessionEvents;

// Estado compartido de la aplicación. Clonarlo es barato: el pool y el canal
// de sesiones ya son handles internos.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub settings: Arc<Settings>,
    pub sessions: SessionEvents,
}
