use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta};
use std::fmt::{self, Write};

/// Instante com o offset local vigente no momento da leitura. Diferenças entre dois
/// `Timestamp` são tempo real decorrido, mesmo atravessando mudança de horário de verão.
pub type Timestamp = DateTime<FixedOffset>;

/// Formato dos timestamps nos registros do log (`YYYY-MM-DD HH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Estado de conectividade observado pelo tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Up,
    Down,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityState::Up => f.write_str("up"),
            ConnectivityState::Down => f.write_str("down"),
        }
    }
}

/// Outage encerrado: criado na transição Down→Up, emitido e descartado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageRecord {
    pub lost_at: Timestamp,
    pub returned_at: Timestamp,
    pub duration: TimeDelta,
}

impl OutageRecord {
    pub fn new(lost_at: Timestamp, returned_at: Timestamp) -> Self {
        Self {
            lost_at,
            returned_at,
            duration: returned_at - lost_at,
        }
    }
}

impl fmt::Display for OutageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connection lost at: {}", self.lost_at.format(TIMESTAMP_FORMAT))?;
        writeln!(
            f,
            "Connection returned at: {}",
            self.returned_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(f, "Total downtime: {}", format_duration(self.duration))
    }
}

/// Mês de calendário (ano + mês). A ordenação derivada é cronológica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthLabel {
    pub year: i32,
    pub month: u32,
}

impl MonthLabel {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Mês seguinte, virando o ano em dezembro.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_day() {
            Some(day) => write!(f, "{}", day.format("%B %Y")),
            None => write!(f, "{:02}/{}", self.month, self.year),
        }
    }
}

/// Retorna true se `date` é o último dia do seu mês.
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt()
        .is_none_or(|next| next.month() != date.month())
}

/// Downtime acumulado do mês corrente.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyAccumulator {
    pub month: MonthLabel,
    pub total_downtime: TimeDelta,
}

impl MonthlyAccumulator {
    pub fn new(month: MonthLabel) -> Self {
        Self {
            month,
            total_downtime: TimeDelta::zero(),
        }
    }

    /// Soma um outage ao total. Durações negativas (relógio do sistema ajustado para trás)
    /// são ignoradas para manter o total monotônico.
    pub fn add(&mut self, duration: TimeDelta) {
        if duration > TimeDelta::zero() {
            self.total_downtime += duration;
        }
    }

    pub fn summary(&self) -> MonthlySummary {
        MonthlySummary {
            month: self.month,
            total_downtime: self.total_downtime,
        }
    }
}

/// Resumo mensal emitido no rollover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlySummary {
    pub month: MonthLabel,
    pub total_downtime: TimeDelta,
}

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Month: {}", self.month)?;
        writeln!(
            f,
            "Total Downtime This Month: {}",
            format_duration(self.total_downtime)
        )
    }
}

/// Formata uma duração no estilo compacto h/m/s (`0s`, `250ms`, `1.5s`, `2m5s`, `1h0m0s`).
///
/// A parte fracionária dos segundos usa precisão de milissegundos, sem zeros à direita.
pub fn format_duration(duration: TimeDelta) -> String {
    if duration < TimeDelta::zero() {
        return format!("-{}", format_duration(-duration));
    }

    let total_ms = duration.num_milliseconds();
    if total_ms == 0 {
        return "0s".to_string();
    }
    if total_ms < 1_000 {
        return format!("{total_ms}ms");
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{seconds}");
    if millis > 0 {
        let fraction = format!("{millis:03}");
        let _ = write!(out, ".{}", fraction.trim_end_matches('0'));
    }
    out.push('s');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn at_offset(hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> Timestamp {
        FixedOffset::east_opt(hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(TimeDelta::zero()), "0s");
        assert_eq!(format_duration(TimeDelta::milliseconds(250)), "250ms");
        assert_eq!(format_duration(TimeDelta::seconds(3)), "3s");
        assert_eq!(format_duration(TimeDelta::milliseconds(1_500)), "1.5s");
        assert_eq!(format_duration(TimeDelta::milliseconds(3_025)), "3.025s");
        assert_eq!(format_duration(TimeDelta::seconds(125)), "2m5s");
        assert_eq!(format_duration(TimeDelta::hours(1)), "1h0m0s");
        assert_eq!(format_duration(TimeDelta::seconds(26 * 3600 + 61)), "26h1m1s");
        assert_eq!(format_duration(TimeDelta::seconds(-4)), "-4s");
    }

    #[test]
    fn outage_record_layout() {
        let record = OutageRecord::new(at(2024, 3, 5, 10, 0, 0), at(2024, 3, 5, 10, 2, 5));
        assert_eq!(record.duration, TimeDelta::seconds(125));
        assert_eq!(
            record.to_string(),
            "Connection lost at: 2024-03-05 10:00:00\n\
             Connection returned at: 2024-03-05 10:02:05\n\
             Total downtime: 2m5s\n"
        );
    }

    #[test]
    fn outage_across_spring_forward_uses_elapsed_time() {
        // 01:59 EST → 03:01 EDT: dois minutos reais
        let record = OutageRecord::new(
            at_offset(-5, 2024, 3, 10, 1, 59),
            at_offset(-4, 2024, 3, 10, 3, 1),
        );
        assert_eq!(record.duration, TimeDelta::seconds(120));
        assert_eq!(
            record.to_string(),
            "Connection lost at: 2024-03-10 01:59:00\n\
             Connection returned at: 2024-03-10 03:01:00\n\
             Total downtime: 2m0s\n"
        );
    }

    #[test]
    fn outage_across_fall_back_stays_positive() {
        // 01:50 EDT → 01:10 EST: vinte minutos reais
        let record = OutageRecord::new(
            at_offset(-4, 2024, 11, 3, 1, 50),
            at_offset(-5, 2024, 11, 3, 1, 10),
        );
        assert_eq!(record.duration, TimeDelta::minutes(20));
    }

    #[test]
    fn monthly_summary_layout() {
        let mut acc = MonthlyAccumulator::new(MonthLabel { year: 2006, month: 1 });
        acc.add(TimeDelta::seconds(90));
        acc.add(TimeDelta::seconds(30));
        assert_eq!(
            acc.summary().to_string(),
            "Month: January 2006\nTotal Downtime This Month: 2m0s\n"
        );
    }

    #[test]
    fn accumulator_ignores_negative_durations() {
        let mut acc = MonthlyAccumulator::new(MonthLabel { year: 2024, month: 1 });
        acc.add(TimeDelta::seconds(10));
        acc.add(TimeDelta::seconds(-5));
        assert_eq!(acc.total_downtime, TimeDelta::seconds(10));
    }

    #[test]
    fn month_label_order_and_next() {
        let dec = MonthLabel { year: 2023, month: 12 };
        assert_eq!(dec.next(), MonthLabel { year: 2024, month: 1 });
        assert!(dec < dec.next());
        assert!(MonthLabel { year: 2024, month: 2 } > MonthLabel { year: 2023, month: 11 });
    }

    #[test]
    fn last_day_detection() {
        let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert!(is_last_day_of_month(d(2024, 2, 29)));
        assert!(!is_last_day_of_month(d(2023, 2, 28) - TimeDelta::days(1)));
        assert!(is_last_day_of_month(d(2023, 2, 28)));
        assert!(is_last_day_of_month(d(2024, 1, 31)));
        assert!(!is_last_day_of_month(d(2024, 1, 30)));
        assert!(is_last_day_of_month(d(2024, 4, 30)));
        assert!(is_last_day_of_month(d(2024, 12, 31)));
    }
}
