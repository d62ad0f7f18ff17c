//! Заголовок самоописывающего текстового формата.
//!
//! Первая строка файла объявляет разделитель и ширины колонок:
//!
//! ```text
//! dd4hep.<sep>.<siz_nam>.<siz_add>.<siz_tot>
//! ```
//!
//! В режиме фиксированной ширины `<sep>` равен `-`, а `siz_tot != 0`
//! сигнализирует читателю «фиксированный размер записи, прямой доступ
//! по смещениям». В режиме разделителя все три размера равны нулю:
//! «переменный размер записи, резать по разделителю».

use crate::{error::RepoError, repo::Entry};

/// Литеральный тег заголовка. Совместимость по байтам с файлами,
/// записанными исходной реализацией.
pub const HEADER_TAG: &str = "dd4hep";

/// Ширина поля ключа: 16 шестнадцатеричных цифр с ведущими нулями.
pub const KEY_WIDTH: usize = 16;

/// Заполнитель `<sep>` в режиме фиксированной ширины.
pub const NO_SEPARATOR: u8 = b'-';

/// Разобранный заголовок текстового формата.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextHeader {
    pub sep: u8,
    pub siz_nam: usize,
    pub siz_add: usize,
    pub siz_tot: usize,
}

impl TextHeader {
    /// Заголовок режима фиксированной ширины: максимумы длин по всем
    /// записям. `siz_tot = siz_nam + siz_add + 11` — исторический
    /// сигнал режима прямого доступа, не фактическая длина строки.
    pub fn fixed(entries: &[Entry], include_addresses: bool) -> Self {
        let siz_nam = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);
        let siz_add = if include_addresses {
            entries.iter().map(|e| e.address.len()).max().unwrap_or(0)
        } else {
            0
        };
        TextHeader {
            sep: NO_SEPARATOR,
            siz_nam,
            siz_add,
            siz_tot: siz_nam + siz_add + 11,
        }
    }

    /// Заголовок режима разделителя: все ширины нулевые.
    pub fn delimited(sep: u8) -> Self {
        TextHeader {
            sep,
            siz_nam: 0,
            siz_add: 0,
            siz_tot: 0,
        }
    }

    /// `true` — режим прямого доступа с фиксированным размером записи.
    pub fn is_fixed(&self) -> bool {
        self.siz_tot != 0
    }

    /// Строка заголовка без завершающего перевода строки.
    pub fn to_line(&self) -> String {
        format!(
            "{}.{}.{}.{}.{}",
            HEADER_TAG, self.sep as char, self.siz_nam, self.siz_add, self.siz_tot
        )
    }

    /// Разбирает строку заголовка.
    ///
    /// Любое отклонение от схемы `dd4hep.<sep>.<n>.<n>.<n>` — это
    /// [`RepoError::MalformedHeader`] с именем источника.
    pub fn parse(line: &str, input: &str) -> Result<Self, RepoError> {
        let malformed = || RepoError::MalformedHeader {
            input: input.to_string(),
            line: line.to_string(),
        };

        let bytes = line.as_bytes();
        let prefix_len = HEADER_TAG.len() + 1; // "dd4hep."
        if !line.starts_with(HEADER_TAG) || bytes.len() < prefix_len + 2 {
            return Err(malformed());
        }
        if bytes[HEADER_TAG.len()] != b'.' {
            return Err(malformed());
        }

        // <sep> — ровно один байт, за ним точка
        let sep = bytes[prefix_len];
        if bytes[prefix_len + 1] != b'.' {
            return Err(malformed());
        }

        let mut fields = line[prefix_len + 2..].splitn(3, '.');
        let mut next_size = || {
            fields
                .next()
                .and_then(|f| f.trim_end().parse::<usize>().ok())
        };
        let (Some(siz_nam), Some(siz_add), Some(siz_tot)) =
            (next_size(), next_size(), next_size())
        else {
            return Err(malformed());
        };

        Ok(TextHeader {
            sep,
            siz_nam,
            siz_add,
            siz_tot,
        })
    }
}
