//! Transaction domain model
//!
//! Covers only the three transaction kinds this tool submits (payment, asset
//! transfer, asset creation). Encoding is canonical msgpack: map keys in
//! lexicographic order and zero-valued fields omitted, which is what the
//! ledger hashes to derive the transaction id.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;
use serde_json::Value as JsonValue;
use sha2::{Digest, Sha512_256};

use super::account::{Address, PrivateKey};
use super::asset::AssetParams;
use super::result::{Error, Result};

/// Flat fee applied to every submitted transaction, in microalgos
pub const DEFAULT_FLAT_FEE: u64 = 1000;

/// Number of rounds a transaction stays valid after its first valid round
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1000;

/// Domain separation prefix hashed and signed in front of the encoded transaction
const TX_TAG: &[u8] = b"TX";

/// Suggested parameters as returned by `GET /v2/transactions/params`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    #[serde(default)]
    pub consensus_version: String,
    #[serde(default)]
    pub fee: u64,
    /// Base64 encoded 32-byte genesis hash
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    #[serde(default)]
    pub min_fee: u64,
}

impl SuggestedParams {
    fn genesis_hash_bytes(&self) -> Result<Vec<u8>> {
        let bytes = BASE64
            .decode(&self.genesis_hash)
            .map_err(|e| Error::encoding(format!("Invalid genesis hash: {}", e)))?;
        if bytes.len() != 32 {
            return Err(Error::encoding("Genesis hash must be 32 bytes"));
        }
        Ok(bytes)
    }
}

/// Node status (only the fields the poller needs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
    #[serde(default)]
    pub time_since_last_round: u64,
}

/// Pending transaction record as returned by `GET /v2/transactions/pending/{txid}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransaction {
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub pool_error: String,
    #[serde(default)]
    pub asset_index: Option<u64>,
    #[serde(default)]
    pub txn: Option<JsonValue>,
}

impl PendingTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round.map_or(false, |round| round > 0)
    }
}

/// Confirmation of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub tx_id: String,
    pub confirmed_round: u64,
}

/// Intent to move `amount` units of `asset_id` from `sender` to `receiver`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTransferIntent {
    pub asset_id: u64,
    pub amount: u64,
    pub sender: Address,
    pub receiver: Address,
}

/// What a transaction does
#[derive(Debug, Clone)]
pub enum TransactionKind {
    Payment {
        receiver: Address,
        amount: u64,
    },
    AssetTransfer {
        asset_id: u64,
        receiver: Address,
        amount: u64,
    },
    AssetCreate(AssetParams),
}

/// An unsigned transaction
#[derive(Debug, Clone)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    genesis_hash: Vec<u8>,
    pub kind: TransactionKind,
}

/// A signed transaction ready for submission
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_id: String,
    pub bytes: Vec<u8>,
}

// Wire layout. Field order is the canonical key order.

fn is_zero(v: &u64) -> bool {
    *v == 0
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireAssetParams {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    an: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    au: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    c: Option<ByteBuf>,
    #[serde(skip_serializing_if = "is_zero", default)]
    dc: u64,
    #[serde(skip_serializing_if = "is_false", default)]
    df: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    f: Option<ByteBuf>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    m: Option<ByteBuf>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    r: Option<ByteBuf>,
    #[serde(skip_serializing_if = "is_zero", default)]
    t: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    un: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireTransaction {
    #[serde(skip_serializing_if = "is_zero", default)]
    aamt: u64,
    #[serde(skip_serializing_if = "is_zero", default)]
    amt: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    apar: Option<WireAssetParams>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    arcv: Option<ByteBuf>,
    #[serde(skip_serializing_if = "is_zero", default)]
    fee: u64,
    #[serde(skip_serializing_if = "is_zero", default)]
    fv: u64,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    gen: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    gh: Option<ByteBuf>,
    #[serde(skip_serializing_if = "is_zero", default)]
    lv: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    rcv: Option<ByteBuf>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    snd: Option<ByteBuf>,
    #[serde(rename = "type")]
    tx_type: String,
    #[serde(skip_serializing_if = "is_zero", default)]
    xaid: u64,
}

#[derive(Serialize)]
struct WireSignedTransaction<'a> {
    sig: ByteBuf,
    txn: &'a WireTransaction,
}

fn addr_bytes(address: &Address) -> ByteBuf {
    ByteBuf::from(address.as_bytes().to_vec())
}

impl Transaction {
    fn with_params(params: &SuggestedParams, sender: Address, kind: TransactionKind) -> Result<Self> {
        Ok(Self {
            sender,
            fee: DEFAULT_FLAT_FEE,
            first_valid: params.last_round,
            last_valid: params.last_round + DEFAULT_VALIDITY_WINDOW,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash_bytes()?,
            kind,
        })
    }

    /// Plain algo payment
    pub fn payment(
        params: &SuggestedParams,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> Result<Self> {
        Self::with_params(params, sender, TransactionKind::Payment { receiver, amount })
    }

    /// Asset transfer of `amount` units
    pub fn asset_transfer(
        params: &SuggestedParams,
        sender: Address,
        receiver: Address,
        asset_id: u64,
        amount: u64,
    ) -> Result<Self> {
        Self::with_params(
            params,
            sender,
            TransactionKind::AssetTransfer {
                asset_id,
                receiver,
                amount,
            },
        )
    }

    /// Opt-in: a zero-amount asset transfer to oneself
    pub fn asset_opt_in(params: &SuggestedParams, account: Address, asset_id: u64) -> Result<Self> {
        Self::asset_transfer(params, account, account, asset_id, 0)
    }

    /// Asset creation
    pub fn asset_create(params: &SuggestedParams, sender: Address, asset: AssetParams) -> Result<Self> {
        if asset.total == 0 {
            return Err(Error::validation("Asset total must be greater than zero"));
        }
        Self::with_params(params, sender, TransactionKind::AssetCreate(asset))
    }

    fn to_wire(&self) -> WireTransaction {
        let mut wire = WireTransaction {
            fee: self.fee,
            fv: self.first_valid,
            gen: self.genesis_id.clone(),
            gh: Some(ByteBuf::from(self.genesis_hash.clone())),
            lv: self.last_valid,
            snd: Some(addr_bytes(&self.sender)),
            ..Default::default()
        };

        match &self.kind {
            TransactionKind::Payment { receiver, amount } => {
                wire.tx_type = "pay".to_string();
                wire.rcv = Some(addr_bytes(receiver));
                wire.amt = *amount;
            }
            TransactionKind::AssetTransfer {
                asset_id,
                receiver,
                amount,
            } => {
                wire.tx_type = "axfer".to_string();
                wire.arcv = Some(addr_bytes(receiver));
                wire.aamt = *amount;
                wire.xaid = *asset_id;
            }
            TransactionKind::AssetCreate(asset) => {
                wire.tx_type = "acfg".to_string();
                let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
                wire.apar = Some(WireAssetParams {
                    an: non_empty(&asset.asset_name),
                    au: non_empty(&asset.url),
                    c: asset.clawback.as_ref().map(addr_bytes),
                    dc: asset.decimals as u64,
                    df: asset.default_frozen,
                    f: asset.freeze.as_ref().map(addr_bytes),
                    m: asset.manager.as_ref().map(addr_bytes),
                    r: asset.reserve.as_ref().map(addr_bytes),
                    t: asset.total,
                    un: non_empty(&asset.unit_name),
                });
            }
        }

        wire
    }

    /// Canonical msgpack encoding of the unsigned transaction
    pub fn encode(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(&self.to_wire())
            .map_err(|e| Error::encoding(format!("Failed to encode transaction: {}", e)))
    }

    fn bytes_to_sign(&self) -> Result<Vec<u8>> {
        let encoded = self.encode()?;
        let mut buf = Vec::with_capacity(TX_TAG.len() + encoded.len());
        buf.extend_from_slice(TX_TAG);
        buf.extend_from_slice(&encoded);
        Ok(buf)
    }

    /// Transaction id: base32 of SHA-512/256 over the tagged encoding
    pub fn id(&self) -> Result<String> {
        Ok(BASE32_NOPAD.encode(&Sha512_256::digest(self.bytes_to_sign()?)))
    }

    /// Sign with `key`, which must belong to the sender
    pub fn sign(&self, key: &PrivateKey) -> Result<SignedTransaction> {
        if key.address() != self.sender {
            return Err(Error::validation(format!(
                "Signing key {} does not match sender {}",
                key.address(),
                self.sender
            )));
        }

        let message = self.bytes_to_sign()?;
        let signature = key.sign(&message);
        let wire = self.to_wire();
        let bytes = rmp_serde::to_vec_named(&WireSignedTransaction {
            sig: ByteBuf::from(signature.to_vec()),
            txn: &wire,
        })
        .map_err(|e| Error::encoding(format!("Failed to encode signed transaction: {}", e)))?;

        Ok(SignedTransaction {
            tx_id: BASE32_NOPAD.encode(&Sha512_256::digest(&message)),
            bytes,
        })
    }
}
