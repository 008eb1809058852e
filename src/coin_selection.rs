//! Input selection.
//!
//! Selection runs in two passes. For every asset still owed, the asset pass
//! walks the pool once, taking each UTXO holding any of it until the need is
//! met, so a UTXO covering what remains ends the walk. The coin pass
//! then takes the smallest remaining UTXOs until the selection exceeds the
//! requested coin by `SAFETY_MARGIN`.
//!
//! The pool must be sorted ascending by coin. Selected UTXOs are removed
//! from it.

use super::*;

/// Coin selected beyond the request, covering change and fee drift.
pub(crate) const SAFETY_MARGIN: i64 = COIN_VALUE;

pub(crate) fn select(
  requested: &Value,
  selected: &Value,
  pool: &mut Vec<Utxo>,
) -> Result<Vec<Utxo>> {
  if selected.dominates(requested) {
    log::debug!("preselected inputs cover request");
    return Ok(Vec::new());
  }

  let unfulfilled = (requested - selected).remove_zero_assets();

  let mut selected = selected.clone();
  let mut chosen = Vec::new();

  for (policy_id, asset_name, _) in unfulfilled.asset_entries() {
    let mut remaining = requested.get_by_policy_and_asset(policy_id, asset_name)
      - selected.get_by_policy_and_asset(policy_id, asset_name);

    let held = |utxo: &Utxo| utxo.value().get_by_policy_and_asset(policy_id, asset_name);

    let mut i = 0;
    while remaining > 0 && i < pool.len() {
      let quantity = held(&pool[i]);

      if quantity <= 0 {
        i += 1;
        continue;
      }

      let utxo = pool.remove(i);
      tprintln!("selected {} holding {quantity} {asset_name}", utxo.key());
      remaining -= quantity;
      selected += utxo.value();
      chosen.push(utxo);
    }

    if remaining > 0 {
      return Err(Error::MissingRequiredAssets {
        policy_id: *policy_id,
        asset_name: asset_name.clone(),
        missing: remaining,
      });
    }
  }

  let target = requested.coin + SAFETY_MARGIN;

  while selected.coin <= target {
    if pool.is_empty() {
      return Err(Error::InsufficientFunds {
        requested: target,
        available: selected.coin,
      });
    }

    let utxo = pool.remove(0);
    tprintln!("selected {} for {} lovelace", utxo.key(), utxo.value().coin);
    selected += utxo.value();
    chosen.push(utxo);
  }

  log::debug!(
    "selected {} inputs worth {} lovelace",
    chosen.len(),
    selected.coin
  );

  Ok(chosen)
}
