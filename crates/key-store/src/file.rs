use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use swap_models::{Account, AccountSecret};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    remove_matching, select_first, DecodeSnafu, EncodeSnafu, IoSnafu, KeyStore, NoDataDirSnafu,
    PersistSnafu, Result, UnsupportedVersionSnafu,
};

const KEY_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    version: u32,
    accounts: Vec<Account>,
}

/// Accounts persisted as JSON at a fixed path.
///
/// Every operation takes an exclusive lock on a sibling `.lock` file, re-reads
/// the key file and, for mutations, atomically replaces it. The file is only
/// readable by its owner on unix.
#[derive(Debug, Clone)]
pub struct JsonFileKeyStore {
    path: PathBuf,
}

impl JsonFileKeyStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(IoSnafu { path: parent })?;
        }
        Ok(Self { path })
    }

    /// `<data dir>/swap-batcher/accounts.json`
    pub fn default_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().context(NoDataDirSnafu)?;
        Ok(data_dir.join("swap-batcher").join("accounts.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locked<T>(&self, mutate: bool, f: impl FnOnce(&mut Vec<Account>) -> T) -> Result<T> {
        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context(IoSnafu { path: &lock_path })?;
        FileExt::lock_exclusive(&lock).context(IoSnafu { path: &lock_path })?;

        let mut accounts = self.read()?;
        let out = f(&mut accounts);
        if mutate {
            self.write(&accounts)?;
        }
        // lock is released when `lock` is dropped
        Ok(out)
    }

    fn read(&self) -> Result<Vec<Account>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path).context(IoSnafu { path: &self.path })?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let file: KeyFile = serde_json::from_str(&raw).context(DecodeSnafu { path: &self.path })?;
        ensure!(
            file.version == KEY_FILE_VERSION,
            UnsupportedVersionSnafu {
                path: &self.path,
                version: file.version
            }
        );
        Ok(file.accounts)
    }

    fn write(&self, accounts: &[Account]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let body = serde_json::to_vec_pretty(&KeyFile {
            version: KEY_FILE_VERSION,
            accounts: accounts.to_vec(),
        })
        .context(EncodeSnafu)?;

        let mut tmp = NamedTempFile::new_in(dir).context(IoSnafu { path: dir })?;
        restrict_permissions(tmp.as_file()).context(IoSnafu { path: tmp.path() })?;
        tmp.write_all(&body).context(IoSnafu { path: tmp.path() })?;
        tmp.as_file().sync_all().context(IoSnafu { path: tmp.path() })?;
        tmp.persist(&self.path).context(PersistSnafu { path: &self.path })?;

        debug!(path = %self.path.display(), count = accounts.len(), "key file written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> std::io::Result<()> {
    Ok(())
}

impl KeyStore for JsonFileKeyStore {
    fn accounts(&self) -> Result<Vec<Account>> {
        self.locked(false, |accounts| accounts.clone())
    }

    fn add(&self, secret: AccountSecret) -> Result<()> {
        self.locked(true, |accounts| accounts.push(Account::new(secret)))
    }

    fn remove(&self, secret: &AccountSecret) -> Result<usize> {
        self.locked(true, |accounts| remove_matching(accounts, secret))
    }

    fn set_selected(&self, secret: &AccountSecret, selected: bool) -> Result<bool> {
        self.locked(true, |accounts| select_first(accounts, secret, selected))
    }
}
