use std::io;

use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Ошибки сохранения и восстановления репозитория условий.
///
/// Все сбои возвращаются синхронно вызывающему коду; ничего не
/// логируется «молча». Декодирование прерывается на первой плохой
/// записи: частично усечённая коллекция хуже, чем жёсткий отказ.
#[derive(Error, Debug)]
pub enum RepoError {
    // ==== System / External ====
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("XML error in {input}: {source}")]
    Xml {
        input: String,
        #[source]
        source: quick_xml::Error,
    },

    // ==== Format selection ====
    #[error("Unsupported repository format: {0}")]
    UnsupportedFormat(String),

    // ==== Structural decode errors ====
    #[error("Malformed header line in {input}: {line:?}")]
    MalformedHeader { input: String, line: String },

    #[error(
        "Inconsistent record in {input}: {reason} \
         (header: siz_nam={siz_nam} siz_add={siz_add} siz_tot={siz_tot})"
    )]
    InconsistentRecord {
        input: String,
        siz_nam: usize,
        siz_add: usize,
        siz_tot: usize,
        reason: String,
    },
}

impl RepoError {
    /// Обёртка ошибки ввода-вывода с путём/идентификатором источника.
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        RepoError::Io {
            path: path.into(),
            source,
        }
    }
}
