use super::*;

/// Plutus language versions, ordered by their cost model key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
  PlutusV1,
  PlutusV2,
  PlutusV3,
}

impl Language {
  pub fn key(self) -> u8 {
    match self {
      Self::PlutusV1 => 0,
      Self::PlutusV2 => 1,
      Self::PlutusV3 => 2,
    }
  }
}

/// The subset of protocol parameters the builder consults.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolParameters {
  pub min_fee_coefficient: i64,
  pub min_fee_constant: i64,
  pub max_tx_size: usize,
  pub coins_per_utxo_byte: i64,
  pub price_mem: f64,
  pub price_step: f64,
  pub max_collateral_inputs: usize,
  pub collateral_percent: u64,
  pub key_deposit: i64,
  pub pool_deposit: i64,
  pub max_tx_ex_units: ExUnits,
  pub min_fee_ref_script_cost_per_byte: f64,
  pub cost_models: BTreeMap<Language, Vec<i64>>,
}

impl Default for ProtocolParameters {
  fn default() -> Self {
    Self {
      min_fee_coefficient: 44,
      min_fee_constant: 155_381,
      max_tx_size: 16_384,
      coins_per_utxo_byte: 4_310,
      price_mem: 0.0577,
      price_step: 0.0000721,
      max_collateral_inputs: 3,
      collateral_percent: 150,
      key_deposit: 2_000_000,
      pool_deposit: 500_000_000,
      max_tx_ex_units: ExUnits::new(14_000_000, 10_000_000_000),
      min_fee_ref_script_cost_per_byte: 15.0,
      cost_models: BTreeMap::new(),
    }
  }
}

impl ProtocolParameters {
  pub fn cost_model(&self, language: Language) -> &[i64] {
    self
      .cost_models
      .get(&language)
      .map(Vec::as_slice)
      .unwrap_or_default()
  }
}
