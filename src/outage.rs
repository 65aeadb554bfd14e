use crate::types::{ConnectivityState, OutageRecord, Timestamp};

/// Gerencia início/fim de outages e calcula a duração.
///
/// Mantém no máximo um outage aberto (o instante em que a conexão caiu).
#[derive(Debug, Clone, Default)]
pub struct OutageManager {
    lost_at: Option<Timestamp>,
}

impl OutageManager {
    pub fn new() -> Self {
        Self { lost_at: None }
    }

    pub fn state(&self) -> ConnectivityState {
        if self.lost_at.is_some() {
            ConnectivityState::Down
        } else {
            ConnectivityState::Up
        }
    }

    /// Instante em que o outage aberto começou, se houver.
    pub fn lost_at(&self) -> Option<Timestamp> {
        self.lost_at
    }

    /// Aplica o resultado de um ciclo. Retorna o outage encerrado na transição Down→Up.
    pub fn handle_cycle(&mut self, is_up: bool, timestamp: Timestamp) -> Option<OutageRecord> {
        match (self.lost_at, is_up) {
            (None, false) => {
                self.lost_at = Some(timestamp);
                None
            }
            (Some(lost_at), true) => {
                self.lost_at = None;
                Some(OutageRecord::new(lost_at, timestamp))
            }
            _ => None,
        }
    }
}
