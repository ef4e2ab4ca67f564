// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{self, Result},
    metadata,
};

use super::{IsPersistent, Storage};

pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::in_dir(dirs.data_dir(), file))
    }

    pub(crate) fn in_dir<D: AsRef<Path>, P: AsRef<Path>>(dir: D, file: P) -> Self {
        Self {
            path: dir.as_ref().join(file),
        }
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(
                serde_json::from_reader::<fs::File, T>(fp).map_err(error::Storage::Corrupt)?,
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::Storage::Unavailable(e).into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        let contents = serde_json::to_vec(data)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(error::Storage::Unavailable)?;
        }

        // Readers never observe a half-written file.
        let staging = self.path.with_extension("partial");
        fs::write(&staging, contents).map_err(error::Storage::Unavailable)?;
        fs::rename(&staging, &self.path).map_err(error::Storage::Unavailable)?;
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(error::Storage::Unavailable(e).into()),
        }
    }
}
