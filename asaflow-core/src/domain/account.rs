//! Account domain model: addresses, signing keys and ORE ID credentials

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha512_256};

use super::asset::AssetHolding;
use super::result::{Error, Result};

/// Length of an encoded address (base32 of 32-byte key + 4-byte checksum)
pub const ADDRESS_LEN: usize = 58;

const CHECKSUM_LEN: usize = 4;

/// Testnet dispenser used in remediation messages for unfunded accounts
pub const TESTNET_DISPENSER_URL: &str = "https://bank.testnet.algorand.network/";

/// Remediation message for an account that holds no algos yet
pub fn funding_hint(address: &str) -> String {
    format!(
        "No initial amount found on Account: {}. Add initial fund to the account via {}",
        address, TESTNET_DISPENSER_URL
    )
}

/// Ledger address: an ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    pub fn from_public_key(key: [u8; 32]) -> Self {
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn checksum(key: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(key);
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        out
    }

    /// Encode as the 58-character checksummed base32 string
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(32 + CHECKSUM_LEN);
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(&Self::checksum(&self.0));
        BASE32_NOPAD.encode(&buf)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != ADDRESS_LEN {
            return Err(Error::validation(format!(
                "Address must be {} characters, got {}",
                ADDRESS_LEN,
                s.len()
            )));
        }

        let decoded = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| Error::validation(format!("Invalid address encoding: {}", e)))?;
        if decoded.len() != 32 + CHECKSUM_LEN {
            return Err(Error::validation("Invalid address length after decoding"));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&decoded[..32]);
        if decoded[32..] != Self::checksum(&key) {
            return Err(Error::validation(format!("Address checksum mismatch: {}", s)));
        }

        Ok(Self(key))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.encode())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

/// Signing key in the algosdk layout: base64 of seed (32 bytes) followed by public key (32 bytes)
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Generate a fresh keypair from the OS random source
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::validation(format!("Private key is not valid base64: {}", e)))?;
        if bytes.len() != 64 {
            return Err(Error::validation(format!(
                "Private key must decode to 64 bytes, got {}",
                bytes.len()
            )));
        }

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let key = SigningKey::from_bytes(&seed);
        if key.verifying_key().as_bytes()[..] != bytes[32..] {
            return Err(Error::validation(
                "Private key public half does not match its seed",
            ));
        }
        Ok(Self(key))
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0.to_keypair_bytes())
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(self.0.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.0.sign(message).to_bytes()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, <redacted>)", self.address())
    }
}

/// Account state as returned by `GET /v2/accounts/{addr}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInformation {
    pub address: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub min_balance: u64,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
}

impl AccountInformation {
    /// Holding of `asset_id`, if the account has opted in to it
    pub fn holding(&self, asset_id: u64) -> Option<&AssetHolding> {
        self.assets.iter().find(|h| h.asset_id == asset_id)
    }
}

/// ORE ID login for the custodial signing path
#[derive(Clone, Serialize, Deserialize)]
pub struct OreIdCredentials {
    pub account: String,
    pub password: String,
}

impl fmt::Debug for OreIdCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OreIdCredentials")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An account as supplied by configuration
#[derive(Debug, Clone)]
pub struct Account {
    pub address: Address,
    pub private_key: Option<PrivateKey>,
    pub ore_id: Option<OreIdCredentials>,
}

impl Account {
    /// Watch-only account
    pub fn new(address: Address) -> Self {
        Self {
            address,
            private_key: None,
            ore_id: None,
        }
    }

    /// Account backed by a local signing key
    pub fn from_private_key(key: PrivateKey) -> Self {
        Self {
            address: key.address(),
            private_key: Some(key),
            ore_id: None,
        }
    }

    pub fn with_ore_id(mut self, credentials: OreIdCredentials) -> Self {
        self.ore_id = Some(credentials);
        self
    }

    /// The signing key, or an error naming the account
    pub fn signer(&self) -> Result<&PrivateKey> {
        self.private_key
            .as_ref()
            .ok_or_else(|| Error::MissingSigningKey(self.address.to_string()))
    }
}
