use serde::Serialize;
use tokio::sync::broadcast;

// Señal entre sesiones (ej: cerrar sesión en otra pestaña). Entrega sin
// garantías: sin orden, a lo sumo una vez. Un receptor que se pierde el
// aviso se corrige solo en su próxima verificación de autenticación.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LoggedOut { user_id: i64 },
}

#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    // Emitir y olvidar: si nadie escucha, el error se descarta.
    pub fn notify_logout(&self, user_id: i64) {
        let _ = self.tx.send(SessionEvent::LoggedOut { user_id });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn el_suscriptor_recibe_el_aviso_de_logout() {
        let events = SessionEvents::new(8);
        let mut rx = events.subscribe();

        events.notify_logout(7);

        let recibido = rx.recv().await.expect("evento");
        let SessionEvent::LoggedOut { user_id } = recibido;
        assert_eq!(user_id, 7);
    }

    #[test]
    fn emitir_sin_receptores_no_falla() {
        let events = SessionEvents::new(8);
        events.notify_logout(1);
    }
}
