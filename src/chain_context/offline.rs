use super::*;

/// An in-memory chain, seeded with protocol parameters and UTXOs.
///
/// Script evaluation assigns every redeemer the same fixed budget, and
/// submitted transactions are only recorded.
#[derive(Default)]
pub struct OfflineContext {
  budget: Option<ExUnits>,
  params: ProtocolParameters,
  submitted: Mutex<Vec<Transaction>>,
  utxos: BTreeMap<TransactionInput, TransactionOutput>,
}

impl OfflineContext {
  pub fn new(params: ProtocolParameters) -> Self {
    Self {
      params,
      ..default()
    }
  }

  pub fn with_utxos(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
    self
      .utxos
      .extend(utxos.into_iter().map(|utxo| (utxo.input, utxo.output)));
    self
  }

  pub fn with_budget(mut self, budget: ExUnits) -> Self {
    self.budget = Some(budget);
    self
  }

  pub fn submitted(&self) -> Vec<Transaction> {
    self
      .submitted
      .lock()
      .map(|submitted| submitted.clone())
      .unwrap_or_default()
  }
}

impl ChainContext for OfflineContext {
  fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters> {
    Ok(self.params.clone())
  }

  fn utxo_from_ref(&self, input: &TransactionInput) -> anyhow::Result<Option<TransactionOutput>> {
    Ok(self.utxos.get(input).cloned())
  }

  fn utxos_at(&self, address: &Address) -> anyhow::Result<Vec<Utxo>> {
    Ok(
      self
        .utxos
        .iter()
        .filter(|(_, output)| output.address == *address)
        .map(|(input, output)| Utxo::new(*input, output.clone()))
        .collect(),
    )
  }

  fn evaluate_tx(&self, transaction: &[u8]) -> anyhow::Result<BTreeMap<String, ExUnits>> {
    let transaction =
      Transaction::from_cbor(transaction).context("failed to decode transaction to evaluate")?;

    let budget = self
      .budget
      .ok_or_else(|| anyhow!("no evaluation budget configured"))?;

    Ok(
      transaction
        .witness_set
        .redeemers
        .iter()
        .map(|redeemer| (redeemer.pointer(), budget))
        .collect(),
    )
  }

  fn submit_tx(&self, transaction: &Transaction) -> anyhow::Result<TransactionId> {
    let id = transaction.id();

    self
      .submitted
      .lock()
      .map_err(|err| anyhow!("submission log poisoned: {err}"))?
      .push(transaction.clone());

    log::info!("recorded submission of {id}");

    Ok(id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn utxos_at_filters_by_address() {
    let context = OfflineContext::default().with_utxos([
      utxo(1, 1_000_000),
      Utxo::new(
        input(2, 0),
        TransactionOutput::new(address(9), Value::from_coin(1)),
      ),
    ]);

    let utxos = context.utxos_at(&address(9)).unwrap();
    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].input, input(2, 0));
  }

  #[test]
  fn utxo_from_ref() {
    let context = OfflineContext::default().with_utxos([utxo(1, 7)]);
    assert_eq!(
      context.utxo_from_ref(&input(1, 0)).unwrap().unwrap().value.coin,
      7
    );
    assert_eq!(context.utxo_from_ref(&input(1, 1)).unwrap(), None);
  }

  #[test]
  fn evaluation_requires_budget() {
    let context = OfflineContext::default();
    let transaction = Transaction {
      body: TransactionBody::default(),
      witness_set: WitnessSet::default(),
      is_valid: true,
      auxiliary_data: None,
    };

    assert_eq!(
      context
        .evaluate_tx(&transaction.to_cbor())
        .unwrap_err()
        .to_string(),
      "no evaluation budget configured"
    );
  }

  #[test]
  fn evaluation_assigns_budget_to_every_redeemer() {
    let context = OfflineContext::default().with_budget(ExUnits::new(5, 6));

    let transaction = Transaction {
      body: TransactionBody::default(),
      witness_set: WitnessSet {
        redeemers: vec![
          Redeemer {
            tag: RedeemerTag::Spend,
            index: 0,
            data: PlutusData::unit(),
            ex_units: ExUnits::default(),
          },
          Redeemer {
            tag: RedeemerTag::Mint,
            index: 0,
            data: PlutusData::unit(),
            ex_units: ExUnits::default(),
          },
        ],
        ..default()
      },
      is_valid: true,
      auxiliary_data: None,
    };

    let result = context.evaluate_tx(&transaction.to_cbor()).unwrap();

    assert_eq!(
      result,
      [
        ("mint:0".to_string(), ExUnits::new(5, 6)),
        ("spend:0".to_string(), ExUnits::new(5, 6)),
      ]
      .into_iter()
      .collect()
    );
  }

  #[test]
  fn garbage_fails_evaluation() {
    let context = OfflineContext::default().with_budget(ExUnits::new(1, 1));
    assert!(context.evaluate_tx(&[0xff]).is_err());
  }

  #[test]
  fn submission_is_recorded() {
    let context = OfflineContext::default();
    let transaction = Transaction {
      body: TransactionBody::default(),
      witness_set: WitnessSet::default(),
      is_valid: true,
      auxiliary_data: None,
    };

    assert_eq!(context.submit_tx(&transaction).unwrap(), transaction.id());
    assert_eq!(context.submitted(), [transaction]);
  }
}
