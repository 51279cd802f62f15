//! `.eln` packaging: a flat zip of the crate folder, renamed from `.zip`.

use std::{
    ffi::OsString,
    fs::File,
    io::{BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use zip::{CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

use crate::{
    config::Config,
    graph::{GraphDocument, METADATA_FILE},
    reader, writer,
};

pub const ELN_EXTENSION: &str = "eln";

/// `<perm_id>-YYYY-mm-dd-HH-MM-SS`
pub fn results_folder_name(perm_id: &str, now: DateTime<Utc>) -> String {
    format!("{perm_id}-{}", now.format("%Y-%m-%d-%H-%M-%S"))
}

/// Append `suffix` to the full path, leaving any existing dots alone.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

/// Write `ro-crate-metadata.json` into `folder`, creating it if needed.
pub fn write_crate_folder(folder: &Path, document: &GraphDocument) -> crate::Result<PathBuf> {
    std::fs::create_dir_all(folder)?;
    let path = folder.join(METADATA_FILE);
    let mut w = BufWriter::new(File::create(&path)?);
    writer::write_to(document, &mut w)?;
    w.flush()?;
    Ok(path)
}

/// Zip every regular file in `folder` (without directory prefix) into
/// `<folder>.zip`, then rename that to `<folder>.eln`.
///
/// A partially written `.zip` is removed on failure.
pub fn package_folder(folder: &Path) -> crate::Result<PathBuf> {
    let zip_path = with_suffix(folder, ".zip");
    if let Err(e) = zip_folder(folder, &zip_path) {
        if let Err(rm) = std::fs::remove_file(&zip_path) {
            log::debug!("could not remove {}: {rm}", zip_path.display());
        }
        return Err(e);
    }

    let eln_path = with_suffix(folder, &format!(".{ELN_EXTENSION}"));
    std::fs::rename(&zip_path, &eln_path)?;
    log::info!("packaged {}", eln_path.display());
    Ok(eln_path)
}

fn zip_folder(folder: &Path, zip_path: &Path) -> crate::Result<()> {
    let mut zip = ZipWriter::new(File::create(zip_path)?);

    let mut entries = std::fs::read_dir(folder)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        if !entry.file_type()?.is_file() {
            log::warn!("not packaging non-file {}", entry.path().display());
            continue;
        }
        let name = entry.file_name().into_string().map_err(|n| {
            crate::Error::general(format!("file name is not valid UTF-8: {n:?}"))
        })?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        let mut f = File::open(entry.path())?;
        std::io::copy(&mut f, &mut zip)?;
    }
    zip.finish()?;
    Ok(())
}

/// Move `file` into directory `dir`, falling back to copy and delete
/// when a rename is not possible (e.g. across file systems).
fn move_into(file: &Path, dir: &Path) -> crate::Result<PathBuf> {
    let name = file
        .file_name()
        .ok_or_else(|| crate::Error::general(format!("no file name in {}", file.display())))?;
    let target = dir.join(name);
    if std::fs::rename(file, &target).is_err() {
        std::fs::copy(file, &target)?;
        std::fs::remove_file(file)?;
    }
    log::info!("moved archive to {}", target.display());
    Ok(target)
}

/// Build the `.eln` for one export under `config.output_path`.
///
/// The working folder is removed afterwards. If `config.eln_share` is set,
/// the archive is moved there. Returns the final archive path.
pub fn export(config: &Config, perm_id: &str, document: &GraphDocument) -> crate::Result<PathBuf> {
    let folder = create_results_folder(
        &config.output_path,
        &results_folder_name(perm_id, Utc::now()),
    )?;

    let packaged = write_crate_folder(&folder, document).and_then(|_| package_folder(&folder));
    if let Err(e) = std::fs::remove_dir_all(&folder) {
        log::warn!("could not remove {}: {e}", folder.display());
    }
    let eln = packaged?;

    match &config.eln_share {
        Some(share) => move_into(&eln, share),
        None => Ok(eln),
    }
}

/// Create `parent/name`, or `parent/name-N` with the smallest free `N` when
/// that folder or its archive already exists.
fn create_results_folder(parent: &Path, name: &str) -> crate::Result<PathBuf> {
    let mut n = 0u32;
    loop {
        let folder = match n {
            0 => parent.join(name),
            _ => parent.join(format!("{name}-{n}")),
        };
        n += 1;
        if with_suffix(&folder, &format!(".{ELN_EXTENSION}")).exists() {
            continue;
        }
        match std::fs::create_dir(&folder) {
            Ok(()) => return Ok(folder),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::debug!("{} already exists", folder.display());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn has_eln_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ELN_EXTENSION))
}

/// Name of the shallowest metadata file in the archive.
fn metadata_entry<R: Read + std::io::Seek>(archive: &ZipArchive<R>) -> Option<String> {
    let nested = format!("/{METADATA_FILE}");
    archive
        .file_names()
        .filter(|n| *n == METADATA_FILE || n.ends_with(&nested))
        .min_by_key(|n| n.matches('/').count())
        .map(str::to_owned)
}

/// Raw bytes of the metadata file in an `.eln` archive.
///
/// Fails with [crate::Error::Validation] if the file is larger than
/// `max_bytes`, whether declared so in the archive or found while reading.
pub fn read_metadata(path: &Path, max_bytes: u64) -> crate::Result<Vec<u8>> {
    if !has_eln_extension(path) {
        return Err(crate::Error::validation(
            "No valid file format (required: *.eln)",
        ));
    }
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let name = metadata_entry(&archive).ok_or(ZipError::FileNotFound)?;
    log::debug!("reading {name} from {}", path.display());

    let too_large =
        || crate::Error::validation(format!("{name} is larger than {max_bytes} bytes"));
    let mut file = archive.by_name(&name)?;
    if file.size() > max_bytes {
        return Err(too_large());
    }
    let mut buf = Vec::new();
    file.by_ref()
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut buf)?;
    if buf.len() as u64 > max_bytes {
        return Err(too_large());
    }
    Ok(buf)
}

pub fn read_document(path: &Path, max_bytes: u64) -> crate::Result<GraphDocument> {
    reader::parse(&read_metadata(path, max_bytes)?)
}
