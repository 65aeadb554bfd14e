use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("falha ao abrir {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("falha ao escrever em {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Destino append-only dos registros já formatados.
pub trait LogSink {
    fn append(&mut self, text: &str) -> Result<(), StorageError>;
}

/// Log em arquivo texto. O arquivo é criado se não existir e aberto/fechado a cada escrita.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append(&mut self, text: &str) -> Result<(), StorageError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StorageError::Open {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(text.as_bytes())
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Sink em memória para testes; `fail` simula um destino sem permissão de escrita.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<String>,
    pub fail: bool,
}

#[cfg(test)]
impl LogSink for MemorySink {
    fn append(&mut self, text: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Write {
                path: PathBuf::from("memory"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.entries.push(text.to_string());
        Ok(())
    }
}
