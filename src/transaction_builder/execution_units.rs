use super::*;

impl TransactionBuilder {
  /// Fill in the execution units of redeemers registered without them.
  ///
  /// A copy of the builder, with estimation turned off, is built into a
  /// complete transaction and handed to the chain context's evaluator. Its
  /// answer is keyed by `<tag>:<index>`.
  pub(super) fn estimate_execution_units(mut self) -> Result<Self> {
    if !self.estimate_ex_units {
      return Ok(self);
    }

    let mut speculative = self.clone();
    speculative.estimate_ex_units = false;

    let transaction = speculative.build_transaction(None)?.build()?;

    let evaluation = self
      .context
      .evaluate_tx(&transaction.to_cbor())
      .map_err(|err| Error::ExecutionUnitEstimationFailed {
        reason: format!("{err:#}"),
      })?;

    let evaluation = evaluation
      .into_iter()
      .filter_map(|(key, ex_units)| {
        let (tag, index) = key.split_once(':')?;
        match (tag.parse::<RedeemerTag>(), index.parse::<u32>()) {
          (Ok(tag), Ok(index)) => Some(((tag, index), ex_units)),
          _ => {
            log::debug!("ignoring evaluation result for unknown redeemer `{key}`");
            None
          }
        }
      })
      .collect::<BTreeMap<(RedeemerTag, u32), ExUnits>>();

    for redeemer in self.redeemers.values_mut() {
      match evaluation.get(&(redeemer.tag, redeemer.index)) {
        Some(ex_units) => {
          tprintln!("{} uses {ex_units:?}", redeemer.pointer());
          redeemer.ex_units = *ex_units;
        }
        None if redeemer.ex_units.is_zero() => {
          return Err(Error::ExecutionUnitEstimationFailed {
            reason: format!("no execution units returned for {}", redeemer.pointer()),
          });
        }
        None => {}
      }
    }

    self.estimate_ex_units = false;

    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Evaluator(anyhow::Result<BTreeMap<String, ExUnits>>);

  impl ChainContext for Evaluator {
    fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters> {
      Ok(ProtocolParameters::default())
    }

    fn utxo_from_ref(&self, _: &TransactionInput) -> anyhow::Result<Option<TransactionOutput>> {
      Ok(None)
    }

    fn utxos_at(&self, _: &Address) -> anyhow::Result<Vec<Utxo>> {
      Ok(Vec::new())
    }

    fn evaluate_tx(&self, transaction: &[u8]) -> anyhow::Result<BTreeMap<String, ExUnits>> {
      Transaction::from_cbor(transaction)?;
      match &self.0 {
        Ok(result) => Ok(result.clone()),
        Err(err) => Err(anyhow!("{err}")),
      }
    }

    fn submit_tx(&self, transaction: &Transaction) -> anyhow::Result<TransactionId> {
      Ok(transaction.id())
    }
  }

  fn script_builder(evaluator: Evaluator) -> TransactionBuilder {
    let mut builder = TransactionBuilder::new(Arc::new(evaluator));

    builder
      .add_loaded_utxos([utxo(1, 50_000_000), utxo(2, 20_000_000)])
      .set_change_address(change_address())
      .attach_script(plutus_v2())
      .collect_from(
        Utxo::new(
          input(7, 0),
          TransactionOutput::new(script_address(7), Value::from_coin(10_000_000)),
        ),
        PlutusData::unit(),
      )
      .attach_datum(PlutusData::Integer(3));

    builder
  }

  #[test]
  fn evaluated_units_replace_placeholders() {
    let mut builder = script_builder(Evaluator(Ok(
      [("spend:0".to_string(), ExUnits::new(700, 900))]
        .into_iter()
        .collect(),
    )));

    let transaction = builder.complete().unwrap();

    assert_eq!(
      transaction.witness_set.redeemers[0].ex_units,
      ExUnits::new(700, 900)
    );
    assert!(!builder.estimate_ex_units);
  }

  #[test]
  fn evaluator_tag_aliases_are_understood() {
    let mut builder = script_builder(Evaluator(Ok(
      [
        ("spend:0".to_string(), ExUnits::new(1, 2)),
        ("withdrawal:4".to_string(), ExUnits::new(3, 4)),
        ("nonsense".to_string(), ExUnits::new(5, 6)),
      ]
      .into_iter()
      .collect(),
    )));

    assert_eq!(
      builder.complete().unwrap().witness_set.redeemers[0].ex_units,
      ExUnits::new(1, 2)
    );
  }

  #[test]
  fn evaluator_failure_is_an_error() {
    let mut builder = script_builder(Evaluator(Err(anyhow!("script failed"))));

    assert_matches!(
      builder.complete(),
      Err(Error::ExecutionUnitEstimationFailed { reason }) if reason == "script failed"
    );
  }

  #[test]
  fn missing_result_is_an_error() {
    let mut builder = script_builder(Evaluator(Ok(BTreeMap::new())));

    assert_matches!(
      builder.complete(),
      Err(Error::ExecutionUnitEstimationFailed { reason })
        if reason == "no execution units returned for spend:0"
    );
  }

  #[test]
  fn supplied_units_skip_evaluation() {
    let mut builder = TransactionBuilder::new(Arc::new(Evaluator(Err(anyhow!("unreachable")))));

    builder
      .add_loaded_utxos([utxo(1, 50_000_000), utxo(2, 20_000_000)])
      .set_change_address(change_address())
      .attach_script(plutus_v2())
      .collect_from(
        Utxo::new(
          input(7, 0),
          TransactionOutput::new(script_address(7), Value::from_coin(10_000_000)),
        ),
        RedeemerData::new(PlutusData::unit(), ExUnits::new(10, 10)),
      );

    assert_eq!(
      builder.complete().unwrap().witness_set.redeemers[0].ex_units,
      ExUnits::new(10, 10)
    );
  }
}
