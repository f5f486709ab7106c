use crate::{
    role::ContractRole,
    source::{SourceBundle, SourceCode},
};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Match,
    Mismatch,
    MissingInFork,
}

impl FileStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, FileStatus::Match)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileComparison {
    pub path: String,
    pub status: FileStatus,
}

/// Outcome of comparing one role's origin and fork sources. Files are listed in the origin
/// bundle's order; fork-only files are not part of the comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoleComparison {
    pub role: ContractRole,
    pub files: Vec<FileComparison>,
    #[serde(skip)]
    pub origin: SourceCode,
    #[serde(skip)]
    pub fork: SourceCode,
}

impl RoleComparison {
    pub fn new(role: ContractRole, origin: SourceCode, fork: SourceCode) -> Self {
        let files = compare_bundles(origin.sources(), fork.sources());
        Self { role, files, origin, fork }
    }

    /// Number of origin files that differ from, or are absent in, the fork.
    pub fn mismatches(&self) -> usize {
        self.files.iter().filter(|file| !file.status.is_match()).count()
    }

    pub fn is_equal(&self) -> bool {
        self.mismatches() == 0
    }

    /// Paths present only in the fork bundle.
    pub fn fork_only_paths(&self) -> Vec<&str> {
        let origin = self.origin.sources();
        self.fork
            .sources()
            .keys()
            .filter(|path| !origin.contains_key(*path))
            .map(String::as_str)
            .collect()
    }
}

/// Compares every origin file with the fork file of the same path using structural equality of
/// the content records.
pub fn compare_bundles(origin: &SourceBundle, fork: &SourceBundle) -> Vec<FileComparison> {
    origin
        .iter()
        .map(|(path, record)| {
            let status = match fork.get(path) {
                None => FileStatus::MissingInFork,
                Some(other) if other == record => FileStatus::Match,
                Some(_) => FileStatus::Mismatch,
            };
            FileComparison { path: path.clone(), status }
        })
        .collect()
}
