use std::{fmt, str::FromStr};

use alloy::{hex, primitives::Address, signers::local::PrivateKeySigner};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::Snafu;
use zeroize::Zeroizing;

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum AccountError {
    #[snafu(display("Invalid private key: {reason}"))]
    InvalidSecret { reason: String },
}

/// A private key, held as `0x`-prefixed lowercase hex.
///
/// Parsing accepts the key with or without the `0x` prefix and in any case, so
/// two spellings of the same key compare equal once parsed.
pub struct AccountSecret(SecretString);

impl AccountSecret {
    pub fn parse(raw: &str) -> Result<Self, AccountError> {
        let signer = PrivateKeySigner::from_str(raw.trim()).map_err(|e| {
            AccountError::InvalidSecret {
                reason: e.to_string(),
            }
        })?;
        let bytes = Zeroizing::new(signer.to_bytes().0);
        let normalized = format!("0x{}", hex::encode(bytes.as_slice()));
        Ok(Self(SecretString::from(normalized)))
    }

    pub fn signer(&self) -> Result<PrivateKeySigner, AccountError> {
        PrivateKeySigner::from_str(self.0.expose_secret()).map_err(|e| {
            AccountError::InvalidSecret {
                reason: e.to_string(),
            }
        })
    }

    pub fn address(&self) -> Result<Address, AccountError> {
        Ok(self.signer()?.address())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for AccountSecret {
    fn clone(&self) -> Self {
        Self(SecretString::from(self.expose().to_owned()))
    }
}

impl PartialEq for AccountSecret {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for AccountSecret {}

impl fmt::Debug for AccountSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountSecret([REDACTED])")
    }
}

impl FromStr for AccountSecret {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AccountSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AccountSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Zeroizing::new(String::deserialize(deserializer)?);
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A stored account. Only selected accounts take part in a swap cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub secret: AccountSecret,
    #[serde(default)]
    pub selected: bool,
}

impl Account {
    pub fn new(secret: AccountSecret) -> Self {
        Self {
            secret,
            selected: false,
        }
    }

    pub fn address(&self) -> Result<Address, AccountError> {
        self.secret.address()
    }
}
