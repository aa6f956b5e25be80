//! All-or-nothing publication of the generated documents.
//!
//! Every document is first written and synced to a sibling `.tmp` file. Only
//! once all temp files exist are they renamed into place, each existing output
//! moved aside to a `.bak` sibling first. A failure removes every temp file,
//! restores the files already replaced, and leaves the previous outputs in
//! place.

use std::fs::{OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::CliError;

/// One document waiting to be published.
#[derive(Debug)]
pub struct StagedFile<'a> {
    pub path: &'a Path,
    pub contents: &'a str,
}

/// An output renamed into place, with the file it replaced.
struct Published<'a> {
    path: &'a Path,
    backup: Option<PathBuf>,
}

/// Write every document or none of them.
pub fn write_all_or_nothing(files: &[StagedFile<'_>]) -> Result<(), CliError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for file in files {
        match stage(file) {
            Ok(tmp_path) => staged.push((tmp_path, file.path)),
            Err(err) => {
                discard(&staged);
                return Err(err);
            }
        }
    }

    let mut published = Vec::with_capacity(staged.len());
    for (index, (tmp_path, path)) in staged.iter().enumerate() {
        match publish(tmp_path, path) {
            Ok(done) => published.push(done),
            Err(source) => {
                discard(&staged[index..]);
                roll_back(&published);
                return Err(CliError::Write {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
    }

    for done in &published {
        if let Some(backup) = &done.backup {
            remove_or_warn(backup);
        }
        sync_parent(done.path).map_err(|source| CliError::Write {
            path: done.path.to_path_buf(),
            source,
        })?;
        tracing::info!(event = "output_written", path = %done.path.display());
    }

    Ok(())
}

fn publish<'a>(tmp_path: &Path, path: &'a Path) -> io::Result<Published<'a>> {
    let backup = if path.is_file() {
        let backup = sibling_path(path, "bak").ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "output path has no file name")
        })?;
        std::fs::rename(path, &backup)?;
        Some(backup)
    } else {
        None
    };

    if let Err(err) = std::fs::rename(tmp_path, path) {
        if let Some(backup) = &backup {
            restore(backup, path);
        }
        return Err(err);
    }
    Ok(Published { path, backup })
}

/// Put back every output replaced before a later rename failed.
fn roll_back(published: &[Published<'_>]) {
    for done in published.iter().rev() {
        match &done.backup {
            Some(backup) => restore(backup, done.path),
            None => remove_or_warn(done.path),
        }
    }
}

fn restore(backup: &Path, path: &Path) {
    if let Err(err) = std::fs::rename(backup, path) {
        tracing::warn!(
            event = "output_restore_failed",
            path = %path.display(),
            backup = %backup.display(),
            error = %err
        );
    }
}

fn stage(file: &StagedFile<'_>) -> Result<PathBuf, CliError> {
    let write_error = |source| CliError::Write {
        path: file.path.to_path_buf(),
        source,
    };

    if let Some(parent) = file.path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(write_error)?;
        }
    }

    let tmp_path = temp_path(file.path)?;
    let result = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)
        .and_then(|mut handle| {
            handle.write_all(file.contents.as_bytes())?;
            handle.sync_all()
        });
    if let Err(source) = result {
        remove_or_warn(&tmp_path);
        return Err(write_error(source));
    }

    tracing::debug!(event = "output_staged", path = %tmp_path.display());
    Ok(tmp_path)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp_path, _) in staged {
        remove_or_warn(tmp_path);
    }
}

fn remove_or_warn(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!(
                event = "temp_cleanup_failed",
                path = %path.display(),
                error = %err
            );
        }
    }
}

fn temp_path(path: &Path) -> Result<PathBuf, CliError> {
    sibling_path(path, "tmp").ok_or_else(|| CliError::InvalidOutput(path.to_path_buf()))
}

fn sibling_path(path: &Path, suffix: &str) -> Option<PathBuf> {
    let file_name = path.file_name()?;
    Some(path.with_file_name(format!("{}.{suffix}", file_name.to_string_lossy())))
}

fn sync_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            OpenOptions::new().read(true).open(parent)?.sync_all()
        }
        _ => Ok(()),
    }
}
