use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile, TempPath};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};

#[derive(Error, Debug)]
#[error("Failed to write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Creates `.{file_name}.XXXXXX.part` in `dir`. The random part is created exclusively,
/// so it never matches a destination or another writer's temporary file.
fn create_part(destination: &Path, dir: &Path) -> io::Result<(std::fs::File, TempPath)> {
    let file_name = destination.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "destination has no file name",
        )
    })?;

    let mut prefix = OsString::from(".");
    prefix.push(file_name);
    prefix.push(".");
    Builder::new()
        .prefix(&prefix)
        .suffix(".part")
        .tempfile_in(dir)
        .map(NamedTempFile::into_parts)
}

async fn write_part(file: std::fs::File, contents: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(tokio::fs::File::from_std(file));
    writer.write_all(contents).await?;
    writer.flush().await?;

    let file = writer.into_inner();
    file.sync_all().await?;
    Ok(())
}

/// Writes `contents` to `destination`, creating parent directories as needed.
///
/// The bytes go to a temporary sibling first, which is flushed, synced and then
/// renamed over the destination. The temporary file is removed when anything fails,
/// so the destination either holds the complete contents or is left untouched.
pub async fn write_file(destination: &Path, contents: &[u8]) -> Result<(), WriteError> {
    let failed = |source| WriteError {
        path: destination.to_path_buf(),
        source,
    };

    let dir = match destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| WriteError {
                    path: parent.to_path_buf(),
                    source,
                })?;
            parent
        }
        None => Path::new("."),
    };

    let (file, part) = create_part(destination, dir).map_err(failed)?;
    write_part(file, contents).await.map_err(failed)?;
    part.persist(destination).map_err(|e| failed(e.error))
}
