// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use super::{
    store::{parse_or_empty, to_pretty_json, LedgerStore, Revision, Snapshot},
    LedgerEntries, LedgerError,
};
use crate::utils::create_dir_if_dne;

/// Ledgers stored as `<dir>/<name>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn current_revision(&self, path: &Path) -> Result<Revision, LedgerError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Revision::of(&bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Revision::Absent),
            Err(err) => Err(err.into()),
        }
    }
}

impl LedgerStore for FileStore {
    fn load(&self, name: &str) -> Result<Snapshot, LedgerError> {
        let path = self.path(name);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(@yellow, "could not read ledger {}: {err}", path.display());
                }
                return Ok(Snapshot::default());
            }
        };
        Ok(Snapshot {
            entries: parse_or_empty(name, &json),
            revision: Revision::of(json.as_bytes()),
        })
    }

    fn store(
        &self,
        name: &str,
        entries: &LedgerEntries,
        expected: Revision,
    ) -> Result<Revision, LedgerError> {
        let path = self.path(name);
        if self.current_revision(&path)? != expected {
            return Err(LedgerError::Conflict {
                name: name.to_string(),
            });
        }

        create_dir_if_dne(&self.dir)?;
        let json = to_pretty_json(entries)?;
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(json.as_bytes())?;
        file.persist(&path).map_err(|err| err.error)?;
        debug!(@grey, "wrote ledger {}", path.display());
        Ok(Revision::of(json.as_bytes()))
    }
}
