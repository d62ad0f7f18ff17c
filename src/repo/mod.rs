//! Модель записей репозитория условий.
//!
//! Одна запись — тройка `{key, name, address}`, пришедшая из внешней
//! подсистемы условий. Кодек не интерпретирует ключ и не навязывает
//! ему битовую структуру: это непрозрачный 64-битный идентификатор.
//!
//! Коллекция [`Data`] живёт ровно один вызов save/load: кодек
//! заимствует её на запись и строит свежую на чтение.

use std::collections::HashMap;

/// Одна сохраняемая запись репозитория.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Непрозрачный 64-битный идентификатор условия.
    pub key: u64,
    /// Человекочитаемое имя.
    pub name: String,
    /// Строка-адрес источника значения. Может быть пустой,
    /// если адреса исключены конфигурацией кодека.
    pub address: String,
}

impl Entry {
    pub fn new(key: u64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Entry {
            key,
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Упорядоченная коллекция записей, уникальных по ключу
/// в пределах одного вызова encode.
pub type Data = Vec<Entry>;

/// Сворачивает несколько источников записей в одну коллекцию
/// с map-семантикой по ключу.
///
/// Порядок следования задаётся первым появлением ключа; более
/// поздняя запись с тем же ключом перезаписывает раннюю на месте
/// («последняя запись побеждает»). Сам кодек дедупликацию не
/// выполняет — это явный шаг на стороне вызывающего кода.
pub fn aggregate<I>(sources: I) -> Data
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = Entry>,
{
    let mut data = Data::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for source in sources {
        for entry in source {
            match index.get(&entry.key) {
                Some(&pos) => data[pos] = entry,
                None => {
                    index.insert(entry.key, data.len());
                    data.push(entry);
                }
            }
        }
    }
    data
}
