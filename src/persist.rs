use crate::{error::Error, role::ContractRole, source::SourceCode};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// The pair of files written for a role whose sources differ.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpPaths {
    pub origin: PathBuf,
    pub fork: PathBuf,
}

impl DumpPaths {
    pub fn new(dir: &Path, role: ContractRole) -> Self {
        Self {
            origin: dir.join(format!("{role}.origin.txt")),
            fork: dir.join(format!("{role}.fork.txt")),
        }
    }
}

/// Writes both source objects as JSON to `<role>.origin.txt` and `<role>.fork.txt` in `dir`.
///
/// Files are never overwritten: if either one already exists this fails with
/// [`Error::FileExists`] and leaves the directory as it found it. A failed write removes both
/// files so a later run does not mistake them for a previous dump.
#[tracing::instrument(name = "Writing sources", skip_all, fields(role = %role, dir = %dir.display()))]
pub fn write_sources(
    dir: &Path,
    role: ContractRole,
    origin: &SourceCode,
    fork: &SourceCode,
) -> Result<DumpPaths, Error> {
    let paths = DumpPaths::new(dir, role);
    write_pair(&paths, origin, fork, write_json)?;
    tracing::info!(origin = %paths.origin.display(), fork = %paths.fork.display(), "Wrote sources");
    Ok(paths)
}

fn write_pair(
    paths: &DumpPaths,
    origin: &SourceCode,
    fork: &SourceCode,
    write: impl Fn(File, &SourceCode) -> Result<(), Error>,
) -> Result<(), Error> {
    let origin_file = create_exclusive(&paths.origin)?;
    let fork_file = match create_exclusive(&paths.fork) {
        Ok(file) => file,
        Err(err) => {
            drop(origin_file);
            // Only remove what this call created.
            remove_created(&[&paths.origin]);
            return Err(err)
        }
    };

    if let Err(err) = write(origin_file, origin).and_then(|()| write(fork_file, fork)) {
        remove_created(&[&paths.origin, &paths.fork]);
        return Err(err)
    }
    Ok(())
}

/// Best effort: the caller's error is more useful to the operator than a cleanup failure.
fn remove_created(paths: &[&Path]) {
    for path in paths {
        if let Err(err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %err, "Failed to remove partial dump");
        }
    }
}

fn create_exclusive(path: &Path) -> Result<File, Error> {
    OpenOptions::new().write(true).create_new(true).open(path).map_err(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            Error::FileExists { path: path.to_path_buf() }
        } else {
            Error::Io(err)
        }
    })
}

fn write_json(file: File, source_code: &SourceCode) -> Result<(), Error> {
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, source_code)?;
    writer.flush()?;
    Ok(())
}
