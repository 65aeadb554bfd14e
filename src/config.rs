use crate::tracker::RolloverPolicy;
use anyhow::{Result, bail};
use chrono::NaiveTime;
use config as config_crate;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Configuração operacional do monitor.
///
/// Todas as chaves têm valor padrão; o arquivo `config` é opcional.
/// Os alvos do probe não são configuráveis.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Intervalo entre polls em milissegundos.
    pub poll_interval_ms: u64,
    /// Timeout em segundos para cada tentativa de conexão.
    pub timeout_secs: u64,
    /// Arquivo de log append-only.
    pub log_path: PathBuf,
    /// Horário de corte (`HH:MM:SS`) no último dia do mês. Sem ele, o rollover
    /// acontece na virada do mês.
    #[serde(default)]
    pub rollover_cutoff: Option<NaiveTime>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            timeout_secs: 1,
            log_path: PathBuf::from("connection_log.txt"),
            rollover_cutoff: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    pub fn load_from(name: &str) -> Result<Self> {
        let defaults = Self::default();
        let settings = config_crate::Config::builder()
            .set_default("poll_interval_ms", defaults.poll_interval_ms as i64)?
            .set_default("timeout_secs", defaults.timeout_secs as i64)?
            .set_default("log_path", defaults.log_path.to_string_lossy().to_string())?
            .add_source(config_crate::File::with_name(name).required(false))
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms deve ser maior que zero");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs deve ser maior que zero");
        }
        if self.log_path.as_os_str().is_empty() {
            bail!("log_path não pode ser vazio");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rollover_policy(&self) -> RolloverPolicy {
        match self.rollover_cutoff {
            Some(cutoff) => RolloverPolicy::LastDayCutoff(cutoff),
            None => RolloverPolicy::MonthChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("config");
        let config = Config::load_from(name.to_str().unwrap()).unwrap();

        assert_eq!(config.poll_interval(), Duration::from_millis(100));
        assert_eq!(config.probe_timeout(), Duration::from_secs(1));
        assert_eq!(config.log_path, PathBuf::from("connection_log.txt"));
        assert_eq!(config.rollover_policy(), RolloverPolicy::MonthChange);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "poll_interval_ms = 250\nlog_path = \"/var/log/quedas.txt\"\nrollover_cutoff = \"23:59:59\"\n",
        )
        .unwrap();

        let config = Config::load_from(path.to_str().unwrap()).unwrap();

        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.timeout_secs, 1);
        assert_eq!(config.log_path, PathBuf::from("/var/log/quedas.txt"));
        assert_eq!(
            config.rollover_policy(),
            RolloverPolicy::LastDayCutoff(NaiveTime::from_hms_opt(23, 59, 59).unwrap())
        );
    }

    #[test]
    fn rejects_zero_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "poll_interval_ms = 0\n").unwrap();

        let err = Config::load_from(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn validate_rejects_empty_path() {
        let config = Config {
            log_path: PathBuf::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
