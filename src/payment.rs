use super::*;

/// A quantity of one native asset. Negative quantities burn.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Unit {
  pub policy_id: PolicyId,
  pub name: AssetName,
  pub quantity: i64,
}

impl Unit {
  pub fn new(policy_id: PolicyId, name: AssetName, quantity: i64) -> Self {
    Self {
      policy_id,
      name,
      quantity,
    }
  }

  pub fn to_value(&self) -> Value {
    Value::from_asset(self.policy_id, self.name.clone(), self.quantity)
  }
}

/// An intended output, converted into a transaction output at build time.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Payment {
  pub lovelace: i64,
  pub receiver: Address,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub units: Vec<Unit>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datum: Option<PlutusData>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datum_hash: Option<Hash<32>>,
  #[serde(default)]
  pub inline: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub script_ref: Option<Script>,
}

impl Payment {
  pub fn new(receiver: Address, lovelace: i64) -> Self {
    Self {
      lovelace,
      receiver,
      units: Vec::new(),
      datum: None,
      datum_hash: None,
      inline: false,
      script_ref: None,
    }
  }

  pub fn with_unit(mut self, unit: Unit) -> Self {
    self.units.push(unit);
    self
  }

  pub fn with_datum(mut self, datum: PlutusData, inline: bool) -> Self {
    self.datum = Some(datum);
    self.inline = inline;
    self
  }

  pub fn to_value(&self) -> Value {
    let mut value = Value::from_coin(self.lovelace);
    for unit in &self.units {
      value += &unit.to_value();
    }
    value
  }

  /// An inline datum is embedded in the output; otherwise the output
  /// carries a datum hash, from the datum itself or from `datum_hash`.
  pub fn to_output(&self) -> TransactionOutput {
    let datum = match (&self.datum, self.inline) {
      (Some(datum), true) => Some(Datum::Inline(datum.clone())),
      (Some(datum), false) => Some(Datum::Hash(datum.hash())),
      (None, _) => self.datum_hash.map(Datum::Hash),
    };

    TransactionOutput {
      datum,
      script_ref: self.script_ref.clone(),
      ..TransactionOutput::new(self.receiver.clone(), self.to_value())
    }
  }

  /// Raise `lovelace` to the minimum the output needs.
  pub fn ensure_min_utxo(&mut self, params: &ProtocolParameters) {
    loop {
      let minimum = fee::min_lovelace(params, &self.to_output());

      if self.lovelace >= minimum {
        break;
      }

      log::debug!(
        "raising payment to {} from {} to {minimum} lovelace",
        self.receiver,
        self.lovelace
      );

      self.lovelace = minimum;
    }
  }
}

/// Redeemer data registered with an intent. Without execution units the
/// builder asks the chain context to evaluate them.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedeemerData {
  pub data: PlutusData,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ex_units: Option<ExUnits>,
}

impl RedeemerData {
  pub fn new(data: PlutusData, ex_units: ExUnits) -> Self {
    Self {
      data,
      ex_units: Some(ex_units),
    }
  }
}

impl From<PlutusData> for RedeemerData {
  fn from(data: PlutusData) -> Self {
    Self {
      data,
      ex_units: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  #[test]
  fn value_includes_units() {
    let payment = Payment::new(address(1), 2_000_000).with_unit(unit(1, "a", 5));

    assert_eq!(
      payment.to_value(),
      &Value::from_asset(policy_id(1), AssetName::from_utf8("a").unwrap(), 5)
        + &Value::from_coin(2_000_000)
    );
  }

  #[test]
  fn datum_outputs() {
    let datum = PlutusData::Integer(42);

    let hashed = Payment::new(address(1), 2_000_000).with_datum(datum.clone(), false);
    assert_eq!(hashed.to_output().datum, Some(Datum::Hash(datum.hash())));

    let inline = Payment::new(address(1), 2_000_000).with_datum(datum.clone(), true);
    assert_eq!(inline.to_output().datum, Some(Datum::Inline(datum)));

    let by_hash = Payment {
      datum_hash: Some(Hash::new([3; 32])),
      ..Payment::new(address(1), 2_000_000)
    };
    assert_eq!(
      by_hash.to_output().datum,
      Some(Datum::Hash(Hash::new([3; 32])))
    );
  }

  #[test]
  fn ensure_min_utxo_raises_small_payments() {
    let params = ProtocolParameters::default();
    let mut payment = Payment::new(address(1), 1);
    payment.ensure_min_utxo(&params);
    assert_eq!(
      payment.lovelace,
      fee::min_lovelace(&params, &payment.to_output())
    );
  }

  #[test]
  fn ensure_min_utxo_keeps_large_payments() {
    let mut payment = Payment::new(address(1), 10_000_000);
    payment.ensure_min_utxo(&ProtocolParameters::default());
    assert_eq!(payment.lovelace, 10_000_000);
  }

  #[test]
  fn burn_units_are_negative() {
    assert_eq!(
      unit(2, "b", -1).to_value().get_by_policy_and_asset(
        &policy_id(2),
        &AssetName::from_utf8("b").unwrap()
      ),
      -1
    );
  }

  #[test]
  fn yaml() {
    let payment: Payment = serde_yaml::from_str(&format!(
      "receiver: {}\nlovelace: 3000000\nunits:\n- policy_id: {}\n  name: '61'\n  quantity: 2\n",
      address(1),
      policy_id(1),
    ))
    .unwrap();

    assert_eq!(
      payment,
      Payment::new(address(1), 3_000_000).with_unit(unit(1, "a", 2))
    );
  }
}
