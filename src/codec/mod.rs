//! Кодек репозитория: выбор формата и файловая граница save/load.
//!
//! ## Форматы
//!
//! - [`Format::FixedText`] — самоописывающий текст фиксированной
//!   ширины, прямой доступ по смещениям из заголовка;
//! - [`Format::DelimitedText`] — текст с одним символом-разделителем,
//!   нулевые ширины в заголовке;
//! - [`Format::Xml`] — документ `collection` с элементами `<ref/>`.
//!
//! Кодек синхронный и не держит разделяемого состояния: encode и
//! decode выполняются до конца на вызывающем потоке. Параллельные
//! вызовы над разными файлами независимы; запись в один и тот же файл
//! вызывающий код сериализует сам.
//!
//! ## Модули
//!
//! - [`header`] — заголовок текстового формата
//! - [`text`] — кодек фиксированной ширины и разделителя
//! - [`xml`] — XML-кодек

pub mod header;
pub mod text;
pub mod xml;

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{
    error::{RepoError, RepoResult},
    repo::Data,
};

/// Конкретное текстовое представление репозитория.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Документ `collection` с элементами `<ref/>`.
    Xml,
    /// Самоописывающий текст фиксированной ширины.
    FixedText,
    /// Текст с разделителем. Байт не должен совпадать с `.`
    /// (ломает заголовок), переводом строки или hex-цифрой ключа.
    DelimitedText(u8),
}

impl Format {
    /// Разделитель по умолчанию для `.csv` и `delimited-text`.
    pub const DEFAULT_DELIMITER: u8 = b';';

    /// Разбор явного обозначения формата.
    pub fn from_designator(designator: &str) -> RepoResult<Self> {
        match designator {
            "xml" => Ok(Format::Xml),
            "fixed-text" => Ok(Format::FixedText),
            "delimited-text" => Ok(Format::DelimitedText(Self::DEFAULT_DELIMITER)),
            other => Err(RepoError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Выбор формата по суффиксу пути: `.xml`, `.csv`,
    /// `.txt`/`.daf`. Проверяется до любого обращения к файловой
    /// системе.
    pub fn from_path(path: &Path) -> RepoResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xml") => Ok(Format::Xml),
            Some("csv") => Ok(Format::DelimitedText(Self::DEFAULT_DELIMITER)),
            Some("txt") | Some("daf") => Ok(Format::FixedText),
            _ => Err(RepoError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Настройки кодека.
///
/// Включение адресов — флаг времени выполнения: обе стороны кодека
/// ветвятся на нём явно. При выключенных адресах encode пишет пустое
/// поле адреса (XML — опускает атрибут `ref`), decode возвращает
/// пустые адреса независимо от содержимого файла.
#[derive(Debug, Clone, Copy)]
pub struct CodecConfig {
    pub include_addresses: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            include_addresses: true,
        }
    }
}

/// Кодирует коллекцию в указанный формат.
///
/// `output` — идентификатор назначения для сообщений об ошибках.
pub fn encode_records<W: Write>(
    format: Format,
    entries: &Data,
    w: &mut W,
    output: &str,
    config: &CodecConfig,
) -> RepoResult<()> {
    match format {
        Format::Xml => xml::encode_xml(w, entries, config.include_addresses, output),
        Format::FixedText => text::encode_text(w, entries, None, config.include_addresses, output),
        Format::DelimitedText(sep) => {
            text::encode_text(w, entries, Some(sep), config.include_addresses, output)
        }
    }
}

/// Декодирует коллекцию из указанного формата.
///
/// Дедупликации по ключу нет: записи добавляются в порядке входа.
pub fn decode_records<R: BufRead>(
    format: Format,
    r: &mut R,
    input: &str,
    config: &CodecConfig,
) -> RepoResult<Data> {
    match format {
        Format::Xml => xml::decode_xml(r, input, config.include_addresses),
        Format::FixedText | Format::DelimitedText(_) => {
            // оба текстовых режима самоописываются заголовком
            let mut data = text::decode_text(r, input)?;
            if !config.include_addresses {
                for e in &mut data {
                    e.address.clear();
                }
            }
            Ok(data)
        }
    }
}

/// Сохраняет коллекцию в файл; формат выбирается по суффиксу пути.
pub fn save(path: impl AsRef<Path>, data: &Data) -> RepoResult<()> {
    let format = Format::from_path(path.as_ref())?;
    save_as(path, data, format, &CodecConfig::default())
}

/// Сохраняет коллекцию в файл в явно заданном формате.
pub fn save_as(
    path: impl AsRef<Path>,
    data: &Data,
    format: Format,
    config: &CodecConfig,
) -> RepoResult<()> {
    let path = path.as_ref();
    let path_repr = path.display().to_string();

    let file = File::create(path).map_err(|e| RepoError::io(path_repr.as_str(), e))?;
    let mut w = BufWriter::new(file);
    encode_records(format, data, &mut w, &path_repr, config)?;
    w.flush().map_err(|e| RepoError::io(path_repr.as_str(), e))?;

    tracing::info!(
        records = data.len(),
        path = %path_repr,
        format = ?format,
        "repository saved"
    );
    Ok(())
}

/// Восстанавливает коллекцию из файла; формат — по суффиксу пути.
pub fn load(path: impl AsRef<Path>) -> RepoResult<Data> {
    let format = Format::from_path(path.as_ref())?;
    load_as(path, format, &CodecConfig::default())
}

/// Восстанавливает коллекцию из файла в явно заданном формате.
pub fn load_as(
    path: impl AsRef<Path>,
    format: Format,
    config: &CodecConfig,
) -> RepoResult<Data> {
    let path = path.as_ref();
    let path_repr = path.display().to_string();

    let file = File::open(path).map_err(|e| RepoError::io(path_repr.as_str(), e))?;
    let mut r = BufReader::new(file);
    let data = decode_records(format, &mut r, &path_repr, config)?;

    tracing::info!(
        records = data.len(),
        path = %path_repr,
        format = ?format,
        "repository loaded"
    );
    Ok(data)
}
