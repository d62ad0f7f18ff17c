//! Интеграционные тесты файловой границы save/load.
//!
//! Каждый формат прогоняется через настоящий файл во временной
//! директории: сохранили, восстановили, сравнили коллекции.

use std::fs;

use condrepo::{load, load_as, save, save_as, CodecConfig, Data, Entry, Format, RepoError};
use rstest::rstest;
use tempfile::tempdir;

fn sample_data() -> Data {
    vec![
        Entry::new(0x2A, "temperature", "/calib/temp"),
        Entry::new(0xDEAD_BEEF_0000_0001, "hv_channel_0", "/calib/hv/0"),
        Entry::new(1, "alignment", ""),
    ]
}

#[rstest]
#[case::xml("repo.xml")]
#[case::csv("repo.csv")]
#[case::txt("repo.txt")]
#[case::daf("repo.daf")]
fn save_load_roundtrip_by_suffix(#[case] file_name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(file_name);
    let data = sample_data();

    save(&path, &data).unwrap();
    let restored = load(&path).unwrap();
    assert_eq!(restored, data);
}

#[rstest]
#[case::xml(Format::Xml)]
#[case::fixed(Format::FixedText)]
#[case::semicolon(Format::DelimitedText(b';'))]
#[case::pipe(Format::DelimitedText(b'|'))]
fn save_load_roundtrip_explicit_format(#[case] format: Format) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.dat");
    let config = CodecConfig::default();
    let data = sample_data();

    save_as(&path, &data, format, &config).unwrap();
    let restored = load_as(&path, format, &config).unwrap();
    assert_eq!(restored, data);
}

#[rstest]
#[case::xml("repo.xml")]
#[case::csv("repo.csv")]
#[case::txt("repo.txt")]
fn empty_collection_roundtrip(#[case] file_name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(file_name);

    save(&path, &Data::new()).unwrap();
    assert_eq!(load(&path).unwrap(), Data::new());
}

#[test]
fn fixed_text_header_is_self_describing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.txt");
    // длины имён {3,7,2}, длины адресов {5,1,9}
    let data = vec![
        Entry::new(1, "abc", "12345"),
        Entry::new(2, "abcdefg", "1"),
        Entry::new(3, "ab", "123456789"),
    ];

    save(&path, &data).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(header, "dd4hep.-.7.9.27");
}

#[test]
fn empty_fixed_text_header_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.txt");

    save(&path, &Data::new()).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "dd4hep.-.0.0.11\n");
}

#[test]
fn csv_uses_semicolon_delimiter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.csv");
    let data = vec![Entry::new(0x2A, "foo", "bar")];

    save(&path, &data).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "dd4hep.;.0.0.0\n000000000000002A;foo;bar;\n");
    assert_eq!(load(&path).unwrap(), data);
}

#[test]
fn unknown_suffix_never_touches_filesystem() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.unknown");

    let err = save(&path, &sample_data()).unwrap_err();
    assert!(matches!(err, RepoError::UnsupportedFormat(_)));
    assert!(!path.exists(), "save must not create a file for an unknown format");

    let err = load(&path).unwrap_err();
    assert!(matches!(err, RepoError::UnsupportedFormat(_)));
}

#[test]
fn missing_file_reports_io_error_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.txt");

    match load(&path).unwrap_err() {
        RepoError::Io { path: p, source } => {
            assert!(p.ends_with("absent.txt"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn unwritable_destination_reports_io_error_with_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("no-such-subdir").join("repo.txt");

    match save(&path, &sample_data()).unwrap_err() {
        RepoError::Io { path: p, source } => {
            assert!(p.ends_with("repo.txt"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn hand_corrupted_header_fails_loudly() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.txt");

    fs::write(&path, "dd4hep.-.3.4\n000000000000002A foo bar\n").unwrap();
    let err = load(&path).unwrap_err();
    assert!(matches!(err, RepoError::MalformedHeader { .. }));
}

#[test]
fn truncated_record_aborts_whole_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.txt");

    // первая запись целая, вторая усечена: загрузка падает целиком,
    // а не возвращает молча укороченную коллекцию
    fs::write(
        &path,
        "dd4hep.-.3.3.17\n0000000000000001 foo bar\n0000000000000002 f\n",
    )
    .unwrap();
    let err = load(&path).unwrap_err();
    assert!(matches!(err, RepoError::InconsistentRecord { .. }));
}

#[test]
fn minimal_build_files_interoperate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.xml");
    let minimal = CodecConfig {
        include_addresses: false,
    };
    let data = vec![Entry::new(0x2A, "foo", "/would-be-address")];

    // запись без адресов, чтение полной конфигурацией
    save_as(&path, &data, Format::Xml, &minimal).unwrap();
    let restored = load(&path).unwrap();
    assert_eq!(restored, vec![Entry::new(0x2A, "foo", "")]);
}

#[test]
fn aggregate_then_save_deduplicates_by_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("repo.csv");

    let pool_a = vec![Entry::new(1, "stale", "/old"), Entry::new(2, "b", "/b")];
    let pool_b = vec![Entry::new(1, "fresh", "/new")];
    let data = condrepo::aggregate([pool_a, pool_b]);

    save(&path, &data).unwrap();
    let restored = load(&path).unwrap();
    assert_eq!(
        restored,
        vec![Entry::new(1, "fresh", "/new"), Entry::new(2, "b", "/b")]
    );
}
