use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};

use eln_crate::{
    Config, archive, build_document,
    config::DEFAULT_MAX_METADATA_BYTES,
    entity::{CreatorInfo, DataEntityInfo, RootInfo, SoftwareInfo},
    graph::METADATA_FILE,
    ingest::{self, IngestOptions},
    resolve,
};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

fn sample_document(config: &Config) -> eln_crate::GraphDocument {
    build_document(
        config,
        &RootInfo::new("20240101123456789-42"),
        &CreatorInfo::from_full_name("jdoe", "Jane Doe"),
        &SoftwareInfo::omero(config),
        &DataEntityInfo::new("https://my.omero.de", "<table></table>"),
    )
    .unwrap()
}

fn config_in(dir: &Path) -> Config {
    env_logger::try_init().ok();
    Config {
        output_path: dir.to_path_buf(),
        ..Config::default()
    }
}

fn entry_names(path: &Path) -> Vec<String> {
    let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    archive.file_names().map(str::to_owned).collect()
}

#[test]
fn test_package_folder() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let folder = tmp.path().join("crate");
    archive::write_crate_folder(&folder, &sample_document(&config)).unwrap();

    let eln = archive::package_folder(&folder).unwrap();
    assert_eq!(eln, tmp.path().join("crate.eln"));
    assert!(!tmp.path().join("crate.zip").exists());
    assert_eq!(entry_names(&eln), [METADATA_FILE]);
}

#[test]
fn test_export_and_ingest() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let doc = sample_document(&config);

    let eln = archive::export(&config, "20240101123456789-42", &doc).unwrap();
    assert_eq!(eln.extension().unwrap(), "eln");
    // only the archive is left behind
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);

    assert_eq!(archive::read_document(&eln, config.max_metadata_bytes).unwrap(), doc);

    let draft = ingest::ingest_archive(&eln, &IngestOptions::from_config(&config)).unwrap();
    assert_eq!(draft.parent_perm_id, "20240101123456789-42");
    assert_eq!(draft.creator, "jdoe");
    assert_eq!(draft.entry_type, "ENTRY");
    assert_eq!(draft.document, "<table></table>");
}

#[test]
fn test_export_moves_to_share() {
    let out = tempfile::tempdir().unwrap();
    let share = tempfile::tempdir().unwrap();
    let config = Config {
        eln_share: Some(share.path().to_path_buf()),
        ..config_in(out.path())
    };
    let eln = archive::export(&config, "XYZ123", &sample_document(&config)).unwrap();
    assert_eq!(eln.parent(), Some(share.path()));
    assert!(eln.exists());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_reject_non_eln() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("crate.zip");
    File::create(&path).unwrap();
    let err = archive::read_metadata(&path, DEFAULT_MAX_METADATA_BYTES).unwrap_err();
    assert!(matches!(err, eln_crate::Error::Validation(_)));
}

#[test]
fn test_nested_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("export.ELN");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    zip.start_file("export/attachments/ro-crate-metadata.json", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(b"{}").unwrap();
    zip.start_file("export/ro-crate-metadata.json", SimpleFileOptions::default())
        .unwrap();
    let scenario = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/scenario.json");
    zip.write_all(&std::fs::read(scenario).unwrap()).unwrap();
    zip.finish().unwrap();

    let doc = archive::read_document(&path, DEFAULT_MAX_METADATA_BYTES).unwrap();
    let res = resolve(&doc);
    assert_eq!(res.content.root_id.as_deref(), Some("XYZ123"));
}

#[test]
fn test_missing_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("empty.eln");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"nothing here").unwrap();
    zip.finish().unwrap();

    let err = archive::read_metadata(&path, DEFAULT_MAX_METADATA_BYTES).unwrap_err();
    assert!(matches!(err, eln_crate::Error::Archive(_)));
}

#[test]
fn test_metadata_bytes_are_pretty() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let folder = tmp.path().join("crate");
    let path = archive::write_crate_folder(&folder, &sample_document(&config)).unwrap();
    let mut text = String::new();
    File::open(path).unwrap().read_to_string(&mut text).unwrap();
    assert!(text.contains("\n    \"@graph\": [\n        {\n            \"@id\": \"ro-crate-metadata.json\""));
}

/// A stored archive holding only `ro-crate-metadata.json` with `contents`.
fn stored_eln(path: &Path, contents: &[u8]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    zip.start_file(METADATA_FILE, options).unwrap();
    zip.write_all(contents).unwrap();
    zip.finish().unwrap();
}

#[test]
fn test_metadata_over_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("big.eln");
    stored_eln(&path, &[b' '; 64]);

    assert_eq!(archive::read_metadata(&path, 64).unwrap().len(), 64);
    let err = archive::read_metadata(&path, 63).unwrap_err();
    assert!(matches!(err, eln_crate::Error::Validation(_)), "{err:?}");
}

#[test]
fn test_declared_size_is_not_trusted() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("lying.eln");
    stored_eln(&path, b"{}");

    // claim ~4 GiB uncompressed in the central directory entry
    let mut bytes = std::fs::read(&path).unwrap();
    let central = bytes
        .windows(4)
        .position(|w| w == b"PK\x01\x02")
        .unwrap();
    bytes[central + 24..central + 28].copy_from_slice(&0xFFFF_FFFEu32.to_le_bytes());
    std::fs::write(&path, bytes).unwrap();

    let err = archive::read_metadata(&path, DEFAULT_MAX_METADATA_BYTES).unwrap_err();
    assert!(matches!(err, eln_crate::Error::Validation(_)), "{err:?}");
}

#[test]
fn test_export_twice() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config_in(tmp.path());
    let doc = sample_document(&config);

    let first = archive::export(&config, "XYZ123", &doc).unwrap();
    let second = archive::export(&config, "XYZ123", &doc).unwrap();
    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());
}

#[test]
fn test_ingest_respects_limit() {
    let tmp = tempfile::tempdir().unwrap();
    let config = Config {
        max_metadata_bytes: 16,
        ..config_in(tmp.path())
    };
    let eln = archive::export(&config, "XYZ123", &sample_document(&config)).unwrap();
    let err = ingest::ingest_archive(&eln, &IngestOptions::from_config(&config)).unwrap_err();
    assert!(matches!(err, eln_crate::Error::Validation(_)), "{err:?}");
}
