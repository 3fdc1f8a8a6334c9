use std::sync::{Mutex, MutexGuard, PoisonError};

use swap_models::{Account, AccountSecret};

use crate::{remove_matching, select_first, KeyStore, Result};

/// Non-persistent store, used for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    accounts: Mutex<Vec<Account>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Account>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyStore for InMemoryKeyStore {
    fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.lock().clone())
    }

    fn add(&self, secret: AccountSecret) -> Result<()> {
        self.lock().push(Account::new(secret));
        Ok(())
    }

    fn remove(&self, secret: &AccountSecret) -> Result<usize> {
        Ok(remove_matching(&mut self.lock(), secret))
    }

    fn set_selected(&self, secret: &AccountSecret, selected: bool) -> Result<bool> {
        Ok(select_first(&mut self.lock(), secret, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(byte: u8) -> AccountSecret {
        AccountSecret::parse(&format!("0x{}", hex_byte(byte).repeat(32))).unwrap()
    }

    fn hex_byte(byte: u8) -> String {
        format!("{byte:02x}")
    }

    #[test]
    fn remove_drops_all_duplicates() {
        let store = InMemoryKeyStore::new();
        store.add(secret(1)).unwrap();
        store.add(secret(2)).unwrap();
        store.add(secret(1)).unwrap();

        assert_eq!(store.remove(&secret(1)).unwrap(), 2);
        let remaining = store.accounts().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].secret, secret(2));
    }

    #[test]
    fn select_flags_only_the_first_duplicate() {
        let store = InMemoryKeyStore::new();
        store.add(secret(1)).unwrap();
        store.add(secret(1)).unwrap();

        assert!(store.set_selected(&secret(1), true).unwrap());
        let accounts = store.accounts().unwrap();
        assert!(accounts[0].selected);
        assert!(!accounts[1].selected);

        assert!(!store.set_selected(&secret(3), true).unwrap());
    }
}
