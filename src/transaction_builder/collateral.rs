use super::*;

impl TransactionBuilder {
  fn requires_collateral(&self) -> bool {
    self.scripts.values().any(Script::is_plutus)
      || self
        .reference_inputs
        .iter()
        .any(|utxo| utxo.output.script_ref.is_some())
  }

  /// Pledge the first unused pure-coin UTXO holding more than
  /// `COLLATERAL_AMOUNT` whose excess can be returned in an output of its
  /// own. Explicitly added collateral is left as is.
  pub(super) fn select_collateral(mut self) -> Self {
    if !self.collateral.is_empty() || !self.requires_collateral() {
      return self;
    }

    let Ok(address) = self.change_address().cloned() else {
      log::warn!("no address to return collateral to, leaving collateral unset");
      return self;
    };

    let candidate = self.pool.iter().find_map(|utxo| {
      if self.used.contains(&utxo.input)
        || utxo.value().has_assets()
        || utxo.value().coin <= COLLATERAL_AMOUNT
      {
        return None;
      }

      let output = TransactionOutput::new(
        address.clone(),
        Value::from_coin(utxo.value().coin - COLLATERAL_AMOUNT),
      );

      if fee::min_lovelace(&self.params, &output) > output.value.coin {
        tprintln!("skipping collateral {} with unreturnable excess", utxo.key());
        return None;
      }

      Some((utxo.clone(), output))
    });

    match candidate {
      Some((utxo, output)) => {
        log::debug!("selected {} as collateral", utxo.key());
        self.used.insert(utxo.input);
        self.collateral.push(utxo);
        self.collateral_return = Some(output);
        self.total_collateral = Some(COLLATERAL_AMOUNT);
      }
      None => log::warn!("no UTXO qualifies as collateral, leaving collateral unset"),
    }

    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn prepared(builder: TransactionBuilder) -> TransactionBuilder {
    builder.load_protocol_parameters().unwrap()
  }

  #[test]
  fn not_selected_without_scripts() {
    let builder = prepared(builder([utxo(1, 20_000_000)])).select_collateral();
    assert!(builder.collateral.is_empty());
  }

  #[test]
  fn plutus_script_triggers_selection() {
    let mut builder = builder([
      utxo(1, 3_000_000),
      asset_utxo(2, 50_000_000, unit(1, "a", 1)),
      utxo(3, 20_000_000),
    ]);

    builder.attach_script(plutus_v1());

    let builder = prepared(builder).select_collateral();

    assert_eq!(builder.collateral, [utxo(3, 20_000_000)]);
    assert_eq!(builder.total_collateral, Some(COLLATERAL_AMOUNT));
    assert_eq!(
      builder.collateral_return,
      Some(TransactionOutput::new(
        change_address(),
        Value::from_coin(15_000_000)
      )),
    );
    assert!(builder.used.contains(&input(3, 0)));
  }

  #[test]
  fn reference_script_triggers_selection() {
    let mut builder = builder([utxo(1, 20_000_000)]);

    builder.add_reference_input(Utxo::new(
      input(9, 0),
      TransactionOutput {
        script_ref: Some(plutus_v2()),
        ..TransactionOutput::new(script_address(9), Value::from_coin(10_000_000))
      },
    ));

    let builder = prepared(builder).select_collateral();

    assert_eq!(builder.collateral, [utxo(1, 20_000_000)]);
  }

  #[test]
  fn native_scripts_need_no_collateral() {
    let mut builder = builder([utxo(1, 20_000_000)]);

    builder.attach_script(Script::Native(hex::decode(format!("8200581c{}", "00".repeat(28))).unwrap()));

    assert!(prepared(builder).select_collateral().collateral.is_empty());
  }

  #[test]
  fn excess_below_minimum_is_skipped() {
    let mut builder = builder([utxo(1, 5_500_000), utxo(2, 8_000_000)]);

    builder.attach_script(plutus_v2());

    let builder = prepared(builder).select_collateral();

    assert_eq!(builder.collateral, [utxo(2, 8_000_000)]);
  }

  #[test]
  fn exactly_threshold_is_not_enough() {
    let mut builder = builder([utxo(1, COLLATERAL_AMOUNT)]);

    builder.attach_script(plutus_v2());

    let builder = prepared(builder).select_collateral();

    assert!(builder.collateral.is_empty());
    assert_eq!(builder.collateral_return, None);
  }

  #[test]
  fn inputs_are_not_pledged() {
    let mut builder = builder([utxo(1, 20_000_000), utxo(2, 30_000_000)]);

    builder.add_input(utxo(1, 20_000_000)).attach_script(plutus_v2());

    let builder = prepared(builder).select_collateral();

    assert_eq!(builder.collateral, [utxo(2, 30_000_000)]);
  }

  #[test]
  fn explicit_collateral_is_kept() {
    let mut builder = builder([utxo(1, 20_000_000)]);

    builder
      .add_collateral(utxo(7, 9_000_000))
      .attach_script(plutus_v2());

    let builder = prepared(builder).select_collateral();

    assert_eq!(builder.collateral, [utxo(7, 9_000_000)]);
    assert_eq!(builder.total_collateral, None);
  }
}
