//! Scenario files describe a transaction to build against an in-memory
//! chain: the protocol parameters, the UTXOs on chain and the builder
//! intents.

use super::*;

#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
  #[serde(default)]
  pub parameters: ProtocolParameters,
  #[serde(default)]
  pub utxos: Vec<Utxo>,
  #[serde(default)]
  pub change_address: Option<Address>,
  #[serde(default)]
  pub input_addresses: Vec<Address>,
  #[serde(default)]
  pub payments: Vec<Payment>,
  #[serde(default)]
  pub mints: Vec<Mint>,
  #[serde(default)]
  pub collect: Vec<Collect>,
  #[serde(default)]
  pub reference_inputs: Vec<TransactionInput>,
  #[serde(default)]
  pub scripts: Vec<Script>,
  #[serde(default)]
  pub datums: Vec<PlutusData>,
  #[serde(default)]
  pub metadata: BTreeMap<u64, Metadatum>,
  #[serde(default)]
  pub fee: Option<i64>,
  #[serde(default)]
  pub budget: Option<ExUnits>,
  #[serde(default)]
  pub ttl: Option<u64>,
  #[serde(default)]
  pub validity_start: Option<u64>,
}

#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Mint {
  pub unit: Unit,
  #[serde(default)]
  pub redeemer: Option<RedeemerData>,
}

/// A script-locked UTXO to spend.
#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Collect {
  pub input: TransactionInput,
  pub redeemer: RedeemerData,
}

impl Scenario {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    serde_yaml::from_reader(
      File::open(path).with_context(|| format!("failed to open scenario `{}`", path.display()))?,
    )
    .with_context(|| format!("failed to parse scenario `{}`", path.display()))
  }

  /// An offline chain holding the scenario's UTXOs.
  pub fn context(&self) -> OfflineContext {
    let context = OfflineContext::new(self.parameters.clone()).with_utxos(self.utxos.clone());

    match self.budget {
      Some(budget) => context.with_budget(budget),
      None => context,
    }
  }

  /// A builder carrying every intent in the scenario. Every UTXO in the
  /// scenario is available to coin selection.
  pub fn builder(
    &self,
    context: Arc<dyn ChainContext>,
    settings: &Settings,
  ) -> anyhow::Result<TransactionBuilder> {
    let mut builder = TransactionBuilder::from_settings(context.clone(), settings);

    builder.add_loaded_utxos(self.utxos.iter().cloned());

    for address in &self.input_addresses {
      builder.add_input_address(address.clone())?;
    }

    if let Some(address) = &self.change_address {
      builder.set_change_address(address.clone());
    }

    for collect in &self.collect {
      let output = context
        .utxo_from_ref(&collect.input)?
        .ok_or_else(|| anyhow!("collected input {} not found", collect.input))?;

      builder.collect_from(Utxo::new(collect.input, output), collect.redeemer.clone());
    }

    for input in &self.reference_inputs {
      builder.add_reference_input_by_ref(*input)?;
    }

    for mint in &self.mints {
      builder.mint(mint.unit.clone(), mint.redeemer.clone());
    }

    for payment in &self.payments {
      builder.pay(payment.clone());
    }

    for script in &self.scripts {
      builder.attach_script(script.clone());
    }

    for datum in &self.datums {
      builder.attach_datum(datum.clone());
    }

    for (label, metadatum) in &self.metadata {
      builder.add_metadata(*label, metadatum.clone());
    }

    if let Some(ttl) = self.ttl {
      builder.set_ttl(ttl);
    }

    if let Some(slot) = self.validity_start {
      builder.set_validity_start(slot);
    }

    Ok(builder)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scenario(yaml: &str) -> Scenario {
    serde_yaml::from_str(&yaml.unindent()).unwrap()
  }

  fn build(scenario: &Scenario) -> Result<Transaction> {
    let context: Arc<dyn ChainContext> = Arc::new(scenario.context());

    let mut builder = scenario.builder(context, &Settings::default()).unwrap();

    match scenario.fee {
      Some(fee) => builder.complete_exact(fee),
      None => builder.complete(),
    }
  }

  #[test]
  fn payment_with_change() {
    let scenario = scenario(&format!(
      "
        utxos:
        - input: {}
          output:
            address: {}
            value:
              coin: 15000000
        change_address: {}
        payments:
        - receiver: {}
          lovelace: 2000000
      ",
      input(1, 0),
      address(1),
      change_address(),
      address(2),
    ));

    let transaction = build(&scenario).unwrap();

    assert_eq!(transaction.body.inputs, [input(1, 0)].into());
    assert_eq!(transaction.body.outputs.len(), 2);
    assert_eq!(transaction.body.outputs[1].address, change_address());
    assert_eq!(
      transaction.body.outputs[1].lovelace(),
      15_000_000 - 2_000_000 - transaction.body.fee
    );
  }

  #[test]
  fn defaults_are_empty() {
    let scenario = scenario("{}");

    assert_eq!(scenario, Scenario::default());
    assert_eq!(scenario.parameters, ProtocolParameters::default());
  }

  #[test]
  fn unknown_fields_are_rejected() {
    assert!(serde_yaml::from_str::<Scenario>("fee_rate: 1").is_err());
  }

  #[test]
  fn fixed_fee() {
    let scenario = scenario(&format!(
      "
        utxos:
        - input: {}
          output:
            address: {}
            value:
              coin: 15000000
        change_address: {}
        fee: 300000
      ",
      input(1, 0),
      address(1),
      change_address(),
    ));

    assert_eq!(build(&scenario).unwrap().body.fee, 300_000);
  }

  #[test]
  fn mints_and_metadata() {
    let scenario = scenario(&format!(
      "
        utxos:
        - input: {}
          output:
            address: {}
            value:
              coin: 15000000
        change_address: {}
        mints:
        - unit:
            policy_id: {}
            name: '61'
            quantity: 5
        metadata:
          674:
            string: hello
      ",
      input(1, 0),
      address(1),
      change_address(),
      policy_id(1),
    ));

    let transaction = build(&scenario).unwrap();

    assert_eq!(transaction.body.mint[&policy_id(1)].len(), 1);
    assert!(transaction.body.auxiliary_data_hash.is_some());
    assert_eq!(
      transaction.body.outputs[0]
        .value
        .get_by_policy_and_asset(&policy_id(1), &AssetName::from_utf8("a").unwrap()),
      5
    );
  }

  #[test]
  fn collected_input_must_exist() {
    let scenario = scenario(&format!(
      "
        change_address: {}
        collect:
        - input: {}
          redeemer:
            data:
              constructor: 0
              fields: []
      ",
      change_address(),
      input(9, 0),
    ));

    assert_eq!(
      scenario
        .builder(Arc::new(scenario.context()), &Settings::default())
        .err()
        .unwrap()
        .to_string(),
      format!("collected input {} not found", input(9, 0)),
    );
  }

  #[test]
  fn collect_uses_budget() {
    let scenario = scenario(&format!(
      "
        utxos:
        - input: {}
          output:
            address: {}
            value:
              coin: 20000000
        - input: {}
          output:
            address: {}
            value:
              coin: 30000000
        change_address: {}
        collect:
        - input: {}
          redeemer:
            data:
              constructor: 0
              fields: []
        scripts:
        - type: plutus_v2
          cbor: {}
        datums:
        - int: 42
        budget:
          mem: 1000
          steps: 2000
      ",
      input(1, 0),
      script_address(1),
      input(2, 0),
      address(2),
      change_address(),
      input(1, 0),
      hex::encode(plutus_v2().bytes()),
    ));

    let transaction = build(&scenario).unwrap();

    assert!(transaction.body.inputs.contains(&input(1, 0)));
    assert_eq!(
      transaction.witness_set.redeemers[0].ex_units,
      ExUnits::new(1000, 2000)
    );
    assert!(transaction.body.script_data_hash.is_some());
    assert_eq!(transaction.body.collateral, [input(2, 0)].into());
  }
}
