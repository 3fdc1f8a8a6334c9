mod file;
mod memory;

pub use file::*;
pub use memory::*;

use std::path::PathBuf;

use snafu::Snafu;
use swap_models::{Account, AccountSecret};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("Could not parse key file {}: {source}", path.display()))]
    Decode {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[snafu(display("Could not encode key file: {source}"))]
    Encode { source: serde_json::Error },

    #[snafu(display("Could not replace key file {}: {source}", path.display()))]
    Persist {
        source: tempfile::PersistError,
        path: PathBuf,
    },

    #[snafu(display("Key file {} has unsupported version {version}", path.display()))]
    UnsupportedVersion { path: PathBuf, version: u32 },

    #[snafu(display("No data directory on this platform; pass a key file path"))]
    NoDataDir,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Ordered, persisted list of accounts.
///
/// Secrets are compared after normalization, so the same key added with and
/// without a `0x` prefix counts as one secret.
pub trait KeyStore: Send + Sync {
    fn accounts(&self) -> Result<Vec<Account>>;

    /// Appends an unselected account. Duplicates are kept.
    fn add(&self, secret: AccountSecret) -> Result<()>;

    /// Drops every account holding `secret`. Returns how many were removed.
    fn remove(&self, secret: &AccountSecret) -> Result<usize>;

    /// Sets the selection flag on the first account holding `secret`.
    /// Returns false when no account matched.
    fn set_selected(&self, secret: &AccountSecret, selected: bool) -> Result<bool>;
}

pub(crate) fn remove_matching(accounts: &mut Vec<Account>, secret: &AccountSecret) -> usize {
    let before = accounts.len();
    accounts.retain(|account| &account.secret != secret);
    before - accounts.len()
}

pub(crate) fn select_first(accounts: &mut [Account], secret: &AccountSecret, selected: bool) -> bool {
    match accounts.iter_mut().find(|account| &account.secret == secret) {
        Some(account) => {
            account.selected = selected;
            true
        }
        None => false,
    }
}
