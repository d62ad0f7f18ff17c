//! Текстовый кодек: фиксированная ширина и режим разделителя.
//!
//! Оба подформата используют общий заголовок [`TextHeader`]. Ключ
//! всегда печатается как ровно 16 шестнадцатеричных цифр верхнего
//! регистра с ведущими нулями, поэтому смещения полей однозначны:
//!
//! ```text
//! 00000000000000F1 name____ address__     # фиксированная ширина
//! 00000000000000F1;name;address;          # разделитель ';'
//! ```
//!
//! В режиме фиксированной ширины ширина записи считается один раз из
//! заголовка и проверяется против фактической длины строки до любого
//! чтения байтов — никакой офсетной арифметики «по месту».

use std::io::{BufRead, Write};

use memchr::memchr;

use super::header::{TextHeader, KEY_WIDTH};
use crate::{
    error::{RepoError, RepoResult},
    repo::{Data, Entry},
};

// Смещения полей при 16-символьном ключе: имя начинается после ключа
// и одного разделяющего байта.
const NAME_OFFSET: usize = KEY_WIDTH + 1;

/// Записывает заголовок и по одной строке на запись.
///
/// `sep == None` — режим фиксированной ширины, иначе режим
/// разделителя с указанным байтом.
pub fn encode_text<W: Write>(
    w: &mut W,
    entries: &[Entry],
    sep: Option<u8>,
    include_addresses: bool,
    output: &str,
) -> RepoResult<()> {
    let header = match sep {
        Some(s) => TextHeader::delimited(s),
        None => TextHeader::fixed(entries, include_addresses),
    };
    let io_err = |e| RepoError::io(output, e);

    writeln!(w, "{}", header.to_line()).map_err(io_err)?;
    for e in entries {
        let address = if include_addresses { e.address.as_str() } else { "" };
        match sep {
            Some(s) => {
                let s = s as char;
                writeln!(w, "{:016X}{s}{}{s}{address}{s}", e.key, e.name).map_err(io_err)?;
            }
            None => writeln!(
                w,
                "{:016X} {:<nam$} {:<add$}",
                e.key,
                e.name,
                address,
                nam = header.siz_nam,
                add = header.siz_add,
            )
            .map_err(io_err)?,
        }
    }
    tracing::debug!(
        records = entries.len(),
        header = %header.to_line(),
        "encoded text repository"
    );
    Ok(())
}

/// Читает заголовок и декодирует все строки записей.
///
/// Пустые строки пропускаются; первая структурно неверная строка
/// прерывает всё декодирование.
pub fn decode_text<R: BufRead>(r: &mut R, input: &str) -> RepoResult<Data> {
    let mut lines = r.lines();
    let header_line = match lines.next() {
        Some(line) => line.map_err(|e| RepoError::io(input, e))?,
        None => {
            return Err(RepoError::MalformedHeader {
                input: input.to_string(),
                line: String::new(),
            })
        }
    };
    let header = TextHeader::parse(&header_line, input)?;
    tracing::debug!(
        sep = %(header.sep as char),
        siz_nam = header.siz_nam,
        siz_add = header.siz_add,
        siz_tot = header.siz_tot,
        "decoding text repository"
    );

    let mut data = Data::new();
    for line in lines {
        let line = line.map_err(|e| RepoError::io(input, e))?;
        if line.is_empty() {
            continue;
        }
        let entry = if header.is_fixed() {
            decode_fixed_line(&line, &header, input)?
        } else {
            decode_delimited_line(&line, &header, input)?
        };
        data.push(entry);
    }
    Ok(data)
}

fn inconsistent(input: &str, header: &TextHeader, reason: impl Into<String>) -> RepoError {
    RepoError::InconsistentRecord {
        input: input.to_string(),
        siz_nam: header.siz_nam,
        siz_add: header.siz_add,
        siz_tot: header.siz_tot,
        reason: reason.into(),
    }
}

/// Поле ключа: 16 hex-цифр. Ведущие пробелы допускаются ради файлов,
/// записанных старым форматером с выравниванием пробелами.
fn parse_key(field: &[u8], header: &TextHeader, input: &str) -> RepoResult<u64> {
    let text = std::str::from_utf8(field)
        .map_err(|_| inconsistent(input, header, "key field is not valid UTF-8"))?;
    u64::from_str_radix(text.trim_start(), 16)
        .map_err(|_| inconsistent(input, header, format!("non-hex key field {text:?}")))
}

fn field_to_str<'a>(bytes: &'a [u8], header: &TextHeader, input: &str) -> RepoResult<&'a str> {
    std::str::from_utf8(bytes)
        .map_err(|_| inconsistent(input, header, "record field is not valid UTF-8"))
}

/// Режим прямого доступа: смещения полей известны из заголовка,
/// длина строки проверяется до нарезки.
fn decode_fixed_line(line: &str, header: &TextHeader, input: &str) -> RepoResult<Entry> {
    let bytes = line.as_bytes();
    // ширины из заголовка не заслуживают доверия: порченый файл может
    // объявить размер, переполняющий офсетную арифметику
    let name_end = NAME_OFFSET.checked_add(header.siz_nam).ok_or_else(|| {
        inconsistent(
            input,
            header,
            format!("declared name width {} overflows the record offset", header.siz_nam),
        )
    })?;
    if bytes.len() < name_end {
        return Err(inconsistent(
            input,
            header,
            format!("record line of {} bytes, need at least {}", bytes.len(), name_end),
        ));
    }

    let key = parse_key(&bytes[..KEY_WIDTH], header, input)?;
    let name = field_to_str(&bytes[NAME_OFFSET..name_end], header, input)?
        .trim_end_matches(' ')
        .to_string();

    // name_end <= bytes.len() после проверки выше, переполнения нет
    let addr_start = name_end + 1;
    let address = if bytes.len() > addr_start {
        let addr_end = bytes.len().min(addr_start.saturating_add(header.siz_add));
        field_to_str(&bytes[addr_start..addr_end], header, input)?
            .trim_end_matches(' ')
            .to_string()
    } else {
        String::new()
    };

    Ok(Entry { key, name, address })
}

/// Режим разделителя: `<key16><sep><name><sep><address><sep>`.
/// Отсутствующий хвостовой разделитель компенсируется обрезкой по
/// концу строки; отсутствующий первый — ошибка структуры.
fn decode_delimited_line(line: &str, header: &TextHeader, input: &str) -> RepoResult<Entry> {
    let bytes = line.as_bytes();
    if bytes.len() < NAME_OFFSET || bytes[KEY_WIDTH] != header.sep {
        return Err(inconsistent(
            input,
            header,
            format!("record line {line:?} lacks separator after the key field"),
        ));
    }

    let key = parse_key(&bytes[..KEY_WIDTH], header, input)?;
    let rest = &bytes[NAME_OFFSET..];
    let name_len = memchr(header.sep, rest).ok_or_else(|| {
        inconsistent(
            input,
            header,
            format!("record line {line:?} lacks separator after the name field"),
        )
    })?;
    let name = field_to_str(&rest[..name_len], header, input)?.to_string();

    let addr_bytes = &rest[name_len + 1..];
    let addr_end = memchr(header.sep, addr_bytes).unwrap_or(addr_bytes.len());
    let address = field_to_str(&addr_bytes[..addr_end], header, input)?.to_string();

    Ok(Entry { key, name, address })
}
