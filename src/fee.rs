//! Fee and minimum-coin arithmetic.
//!
//! Fees are linear in transaction size, plus the priced execution units of
//! every redeemer, plus a surcharge for scripts reached through reference
//! inputs. The surcharge is billed in bands of `REFERENCE_SCRIPT_BAND` bytes,
//! each band's per-byte rate being `REFERENCE_SCRIPT_MULTIPLIER` times the
//! previous band's.

use super::*;

pub const REFERENCE_SCRIPT_BAND: usize = 25_600;

pub const REFERENCE_SCRIPT_MULTIPLIER: f64 = 1.2;

/// Bytes of ledger overhead counted for every output on top of its encoding.
pub const OUTPUT_OVERHEAD: i64 = 160;

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn estimate_fee(
  params: &ProtocolParameters,
  size: usize,
  ex_units: ExUnits,
  reference_script_size: usize,
) -> i64 {
  let size = i64::try_from(size).unwrap_or(i64::MAX);

  size * params.min_fee_coefficient
    + params.min_fee_constant
    + (ex_units.steps as f64 * params.price_step).round() as i64
    + (ex_units.mem as f64 * params.price_mem).round() as i64
    + reference_script_fee(params, reference_script_size)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn reference_script_fee(params: &ProtocolParameters, size: usize) -> i64 {
  let mut fee = 0.0;
  let mut rate = params.min_fee_ref_script_cost_per_byte;
  let mut remaining = size;

  while remaining > 0 {
    let band = remaining.min(REFERENCE_SCRIPT_BAND);
    fee += band as f64 * rate;
    remaining -= band;
    rate *= REFERENCE_SCRIPT_MULTIPLIER;
  }

  fee.floor() as i64
}

/// Smallest coin the ledger accepts for `output`. Outputs with zero coin
/// are measured as if they held one ada.
pub fn min_lovelace(params: &ProtocolParameters, output: &TransactionOutput) -> i64 {
  let mut output = output.clone();

  if output.value.coin == 0 {
    output.value.coin = COIN_VALUE;
  }

  let size = cbor::try_to_vec(&output)
    .map(|bytes| bytes.len())
    .unwrap_or_default();

  (OUTPUT_OVERHEAD + i64::try_from(size).unwrap_or(i64::MAX)) * params.coins_per_utxo_byte
}
