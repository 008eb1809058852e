use super::*;

/// Holder of the keys that witness a transaction.
///
/// Key storage and derivation live behind this trait; the builder only
/// asks for a witness set and merges its vkey witnesses.
pub trait Wallet: Send + Sync {
  fn sign(&self, transaction: &Transaction) -> anyhow::Result<WitnessSet>;
}
