//! XML-кодек репозитория условий.
//!
//! Документ состоит из корневого элемента `collection` с фиксированным
//! описательным комментарием и по одному дочернему `<ref/>` на запись:
//!
//! ```xml
//! <ref key="0x000000000000002A" name="temperature" ref="/calib/temp"/>
//! ```
//!
//! Атрибут `ref` (адрес) пишется только при включённых адресах;
//! отсутствие его при чтении даёт пустой адрес, а не ошибку. Порядок
//! атрибутов не значим. Экранирование значений атрибутов (`&`, `<`,
//! `>`, `"`) выполняет quick-xml.

use std::io::{BufRead, Write};

use quick_xml::{
    escape::{escape, unescape},
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    error::{RepoError, RepoResult},
    repo::{Data, Entry},
};

/// Фиксированный комментарий-шапка сохраняемого документа.
const COLLECTION_COMMENT: &str = "\n\
      ++++++++++++++++++++++++++++++++++++++++++++++++++++++++++\n\
      ++++   Condition references repository snapshot.      ++++\n\
      ++++   One <ref/> element per persisted condition.    ++++\n\
      ++++++++++++++++++++++++++++++++++++++++++++++++++++++++++\n";

pub fn encode_xml<W: Write>(
    w: &mut W,
    entries: &[Entry],
    include_addresses: bool,
    output: &str,
) -> RepoResult<()> {
    let io_err = |e| RepoError::io(output, e);

    writeln!(w, r#"<?xml version="1.0" encoding="UTF-8"?>"#).map_err(io_err)?;
    writeln!(w, "<!--{COLLECTION_COMMENT}-->").map_err(io_err)?;
    writeln!(w, "<collection>").map_err(io_err)?;
    for e in entries {
        write!(
            w,
            "  <ref key=\"0x{:016X}\" name=\"{}\"",
            e.key,
            escape(e.name.as_str())
        )
        .map_err(io_err)?;
        if include_addresses {
            write!(w, " ref=\"{}\"", escape(e.address.as_str())).map_err(io_err)?;
        }
        writeln!(w, "/>").map_err(io_err)?;
    }
    writeln!(w, "</collection>").map_err(io_err)?;
    Ok(())
}

pub fn decode_xml<R: BufRead>(
    r: &mut R,
    input: &str,
    include_addresses: bool,
) -> RepoResult<Data> {
    let mut reader = Reader::from_reader(r);
    let mut buf = Vec::new();
    let mut data = Data::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Err(source) => {
                return Err(RepoError::Xml {
                    input: input.to_string(),
                    source,
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"ref" => {
                data.push(decode_ref_element(&e, input, include_addresses)?);
            }
            Ok(_) => {}
        }
        buf.clear();
    }
    Ok(data)
}

fn inconsistent(input: &str, reason: impl Into<String>) -> RepoError {
    RepoError::InconsistentRecord {
        input: input.to_string(),
        siz_nam: 0,
        siz_add: 0,
        siz_tot: 0,
        reason: reason.into(),
    }
}

fn decode_ref_element(
    elem: &BytesStart<'_>,
    input: &str,
    include_addresses: bool,
) -> RepoResult<Entry> {
    let mut key = None;
    let mut name = None;
    let mut address = None;

    for attr in elem.attributes() {
        let attr = attr.map_err(|e| inconsistent(input, format!("bad ref attribute: {e}")))?;
        let raw = std::str::from_utf8(&attr.value)
            .map_err(|_| inconsistent(input, "ref attribute value is not valid UTF-8"))?;
        let value = unescape(raw)
            .map_err(|e| inconsistent(input, format!("bad attribute escape: {e}")))?
            .into_owned();
        match attr.key.as_ref() {
            b"key" => key = Some(value),
            b"name" => name = Some(value),
            b"ref" => address = Some(value),
            _ => {}
        }
    }

    let key = key.ok_or_else(|| inconsistent(input, "ref element missing 'key' attribute"))?;
    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(&key);
    let key = u64::from_str_radix(digits.trim(), 16)
        .map_err(|_| inconsistent(input, format!("non-hex key attribute {key:?}")))?;

    let name = name.ok_or_else(|| inconsistent(input, "ref element missing 'name' attribute"))?;
    let address = if include_addresses {
        address.unwrap_or_default()
    } else {
        String::new()
    };

    Ok(Entry { key, name, address })
}
