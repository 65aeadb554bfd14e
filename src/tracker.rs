//! tracker.rs — Estado de downtime: outages, acumulado mensal e rollover
//!
//! Todo o estado mutável vive em `DowntimeTracker`; o scheduler só alimenta `on_poll`.

use crate::outage::OutageManager;
use crate::storage::LogSink;
use crate::types::{
    ConnectivityState, MonthLabel, MonthlyAccumulator, TIMESTAMP_FORMAT, Timestamp,
    format_duration, is_last_day_of_month,
};
use chrono::{NaiveTime, TimeDelta};
use std::fmt::Display;
use std::io::{self, Write};
use tracing::{debug, error, info, warn};

/// Quando o resumo mensal é emitido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverPolicy {
    /// No primeiro poll de um mês novo, resumindo o mês que terminou.
    MonthChange,
    /// No último dia do mês, no primeiro poll a partir do horário de corte.
    /// Se o corte for perdido, a virada do mês ainda emite o resumo.
    LastDayCutoff(NaiveTime),
}

/// Tracker de downtime e agregador mensal.
///
/// Cada registro emitido é ecoado em `echo` (stdout por padrão) e depois gravado no sink.
/// Falhas do sink são reportadas e nunca desfazem o estado em memória.
pub struct DowntimeTracker<S, O = io::Stdout> {
    outages: OutageManager,
    accumulator: MonthlyAccumulator,
    last_rollover: Option<MonthLabel>,
    policy: RolloverPolicy,
    sink: S,
    echo: O,
}

impl<S: LogSink> DowntimeTracker<S> {
    pub fn new(sink: S, policy: RolloverPolicy, started_at: Timestamp) -> Self {
        Self::with_echo(sink, policy, started_at, io::stdout())
    }
}

impl<S: LogSink, O: Write> DowntimeTracker<S, O> {
    pub fn with_echo(sink: S, policy: RolloverPolicy, started_at: Timestamp, echo: O) -> Self {
        Self {
            outages: OutageManager::new(),
            accumulator: MonthlyAccumulator::new(MonthLabel::of(started_at.date_naive())),
            last_rollover: None,
            policy,
            sink,
            echo,
        }
    }

    pub fn state(&self) -> ConnectivityState {
        self.outages.state()
    }

    pub fn open_outage(&self) -> Option<Timestamp> {
        self.outages.lost_at()
    }

    pub fn accumulator(&self) -> &MonthlyAccumulator {
        &self.accumulator
    }

    pub fn last_rollover(&self) -> Option<MonthLabel> {
        self.last_rollover
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub fn echo(&self) -> &O {
        &self.echo
    }

    /// Processa o resultado de um poll: transição de estado e depois checagem de rollover.
    pub fn on_poll(&mut self, is_up: bool, now: Timestamp) {
        let previous = self.outages.state();

        if let Some(record) = self.outages.handle_cycle(is_up, now) {
            info!(
                "[ESTADO: CONECTADO] Conexão restabelecida em {}. Downtime: {}",
                now.format(TIMESTAMP_FORMAT),
                format_duration(record.duration)
            );
            if record.duration < TimeDelta::zero() {
                warn!(
                    "[ESTADO: CONECTADO] Duração negativa ({}), relógio ajustado? Ignorada no acumulado.",
                    format_duration(record.duration)
                );
            }
            self.emit(&record);
            self.accumulator.add(record.duration);
        } else if previous == ConnectivityState::Up && self.outages.state() == ConnectivityState::Down
        {
            warn!(
                "[ESTADO: SEM CONEXÃO] Conexão perdida em {}.",
                now.format(TIMESTAMP_FORMAT)
            );
        }

        self.check_rollover(now);
    }

    fn check_rollover(&mut self, now: Timestamp) {
        let current = MonthLabel::of(now.date_naive());

        if current > self.accumulator.month {
            self.close_month(current);
            return;
        }

        if let RolloverPolicy::LastDayCutoff(cutoff) = self.policy {
            if is_last_day_of_month(now.date_naive())
                && now.time() >= cutoff
                && self.last_rollover != Some(current)
            {
                self.close_month(current.next());
            }
        }
    }

    /// Fecha o acumulado atual e abre um novo rotulado com `next`.
    fn close_month(&mut self, next: MonthLabel) {
        let finished = std::mem::replace(&mut self.accumulator, MonthlyAccumulator::new(next));

        if self.last_rollover == Some(finished.month) {
            debug!("[ROLLOVER] Resumo de {} já emitido, ignorando.", finished.month);
            return;
        }

        info!(
            "[ROLLOVER] Fechando {} com downtime total de {}.",
            finished.month,
            format_duration(finished.total_downtime)
        );
        self.emit(&finished.summary());
        self.last_rollover = Some(finished.month);
    }

    fn emit(&mut self, record: &impl Display) {
        let text = record.to_string();

        if let Err(e) = self
            .echo
            .write_all(text.as_bytes())
            .and_then(|_| self.echo.flush())
        {
            warn!("[LOG] Falha ao ecoar registro na saída padrão: {}", e);
        }

        if let Err(e) = self.sink.append(&text) {
            error!("[LOG] Registro não persistido: {}", e);
        }
    }

    /// Relata o estado em memória no encerramento. Nada é persistido.
    pub fn report_shutdown(&self) {
        if let Some(lost_at) = self.open_outage() {
            warn!(
                "[ENCERRAMENTO] Outage aberto desde {} não será registrado.",
                lost_at.format(TIMESTAMP_FORMAT)
            );
        }
        let accumulator = self.accumulator();
        info!(
            "[ENCERRAMENTO] Downtime acumulado em {}: {} (último resumo: {})",
            accumulator.month,
            format_duration(accumulator.total_downtime),
            self.last_rollover()
                .map_or_else(|| "nenhum".to_string(), |m| m.to_string())
        );
    }
}
