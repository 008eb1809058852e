//! Access to the chain: protocol parameters, UTXOs, script evaluation and
//! submission.

use super::*;

pub use self::{
  cached::{CachedContext, Clock, SystemClock},
  offline::OfflineContext,
};

mod cached;
mod offline;

pub trait ChainContext: Send + Sync {
  fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters>;

  fn utxo_from_ref(&self, input: &TransactionInput) -> anyhow::Result<Option<TransactionOutput>>;

  fn utxos_at(&self, address: &Address) -> anyhow::Result<Vec<Utxo>>;

  /// Evaluate the scripts of an encoded transaction, returning execution
  /// units keyed by `<tag>:<index>`.
  fn evaluate_tx(&self, transaction: &[u8]) -> anyhow::Result<BTreeMap<String, ExUnits>>;

  fn submit_tx(&self, transaction: &Transaction) -> anyhow::Result<TransactionId>;
}
