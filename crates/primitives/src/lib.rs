//! Types for building and serializing Cardano transactions.
//!
//! Every type in this crate has a canonical CBOR encoding that matches the
//! ledger's wire format. Encoding a value, decoding the bytes and encoding
//! again always reproduces the same bytes.

use {
  minicbor::{
    data::{Int, Tag, Type},
    decode, encode, Decode, Decoder, Encode, Encoder,
  },
  serde::{Deserialize, Deserializer, Serialize, Serializer},
  serde_with::{DeserializeFromStr, SerializeDisplay},
  std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
  },
  thiserror::Error,
};

pub use {
  address::Address,
  asset_name::AssetName,
  certificate::{Certificate, Credential},
  hash::{blake2b_224, blake2b_256, DatumHash, Hash, KeyHash, PolicyId, ScriptHash, TransactionId},
  input::TransactionInput,
  metadata::{AuxiliaryData, Metadatum},
  output::{Datum, OutputFormat, TransactionOutput},
  plutus_data::PlutusData,
  protocol_parameters::{Language, ProtocolParameters},
  redeemer::{ExUnits, Redeemer, RedeemerTag},
  script::Script,
  transaction::{Transaction, TransactionBody, VKeyWitness, WitnessSet},
  utxo::Utxo,
  value::{Assets, Value},
};

pub mod cbor;

mod address;
mod asset_name;
mod certificate;
mod hash;
mod input;
mod metadata;
mod output;
mod plutus_data;
mod protocol_parameters;
mod redeemer;
mod script;
mod transaction;
mod utxo;
mod value;

/// Lovelace in one ada.
pub const COIN_VALUE: i64 = 1_000_000;
