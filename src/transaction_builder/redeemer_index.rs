use super::*;

impl TransactionBuilder {
  /// Spend redeemers are indexed by the position of their input among the
  /// sorted inputs, mint redeemers by the position of their policy among the
  /// sorted minted policies, certificate redeemers by the position of their
  /// certificate, and reward redeemers by the position of their reward
  /// address among the sorted withdrawals.
  pub(super) fn index_redeemers(mut self) -> Result<Self> {
    let inputs = self
      .inputs
      .iter()
      .map(|utxo| utxo.input)
      .collect::<BTreeSet<TransactionInput>>();

    let policies = self
      .mint_value()
      .assets
      .into_keys()
      .collect::<BTreeSet<PolicyId>>();

    for (target, redeemer) in &mut self.redeemers {
      let position = match target {
        RedeemerTarget::Spend(input) => inputs.iter().position(|candidate| candidate == input),
        RedeemerTarget::Mint(policy_id) => policies
          .iter()
          .position(|candidate| candidate == policy_id),
        RedeemerTarget::Cert(index) => (*index < self.certificates.len()).then_some(*index),
        RedeemerTarget::Reward(address) => self
          .withdrawals
          .keys()
          .position(|candidate| candidate == address),
      };

      let position = position.ok_or_else(|| Error::Unsupported {
        message: format!("{} redeemer for {target} which is not in the transaction", target.tag()),
      })?;

      redeemer.index = u32::try_from(position).map_err(|_| Error::Unsupported {
        message: format!("redeemer index {position} out of range"),
      })?;

      tprintln!("{target} redeemer at index {}", redeemer.index);
    }

    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn indexes(builder: &TransactionBuilder) -> Vec<(RedeemerTag, u32)> {
    builder
      .redeemers()
      .map(|(_, redeemer)| (redeemer.tag, redeemer.index))
      .collect()
  }

  #[test]
  fn spend_redeemers_follow_input_order() {
    let mut builder = builder([]);

    builder
      .collect_from(utxo(0xaa, 10_000_000), PlutusData::Integer(1))
      .collect_from(utxo(0x11, 10_000_000), PlutusData::Integer(2));

    let builder = builder.index_redeemers().unwrap();

    assert_eq!(
      builder
        .redeemers()
        .map(|(target, redeemer)| (target.clone(), redeemer.index))
        .collect::<Vec<(RedeemerTarget, u32)>>(),
      [
        (RedeemerTarget::Spend(input(0x11, 0)), 0),
        (RedeemerTarget::Spend(input(0xaa, 0)), 1),
      ],
    );
  }

  #[test]
  fn spend_redeemers_distinguish_output_index() {
    let mut builder = builder([]);

    let second = Utxo::new(
      input(5, 1),
      TransactionOutput::new(address(1), Value::from_coin(10_000_000)),
    );

    builder
      .collect_from(second, PlutusData::Integer(1))
      .collect_from(utxo(5, 10_000_000), PlutusData::Integer(2));

    let builder = builder.index_redeemers().unwrap();

    assert_eq!(
      builder
        .redeemers()
        .map(|(target, redeemer)| (target.clone(), redeemer.index))
        .collect::<Vec<(RedeemerTarget, u32)>>(),
      [
        (RedeemerTarget::Spend(input(5, 0)), 0),
        (RedeemerTarget::Spend(input(5, 1)), 1),
      ],
    );
  }

  #[test]
  fn mint_redeemers_follow_policy_order() {
    let mut builder = builder([]);

    builder
      .mint(unit(9, "a", 1), Some(PlutusData::unit().into()))
      .mint(unit(3, "b", -1), Some(PlutusData::unit().into()));

    let builder = builder.index_redeemers().unwrap();

    assert_eq!(
      builder
        .redeemers()
        .map(|(target, redeemer)| (target.clone(), redeemer.index))
        .collect::<Vec<(RedeemerTarget, u32)>>(),
      [
        (RedeemerTarget::Mint(policy_id(3)), 0),
        (RedeemerTarget::Mint(policy_id(9)), 1),
      ],
    );
  }

  #[test]
  fn mint_redeemer_without_net_mint_is_unsupported() {
    let mut builder = builder([]);

    builder
      .mint(unit(9, "a", 1), Some(PlutusData::unit().into()))
      .mint(unit(9, "a", -1), None);

    assert_matches!(
      builder.index_redeemers(),
      Err(Error::Unsupported { message }) if message.contains("mint redeemer")
    );
  }

  #[test]
  fn certificate_and_reward_redeemers() {
    let mut builder = builder([]);

    let credential = Credential::Script(Hash::new([4; 28]));

    builder
      .add_certificate(Certificate::StakeRegistration(credential.clone()), None)
      .add_certificate(
        Certificate::StakeDelegation {
          credential,
          pool: Hash::new([5; 28]),
        },
        Some(PlutusData::unit().into()),
      )
      .add_withdrawal(reward_address(8), 1, Some(PlutusData::unit().into()))
      .add_withdrawal(reward_address(2), 1, Some(PlutusData::unit().into()));

    let builder = builder.index_redeemers().unwrap();

    assert_eq!(
      indexes(&builder),
      [
        (RedeemerTag::Cert, 1),
        (RedeemerTag::Reward, 0),
        (RedeemerTag::Reward, 1),
      ],
    );
  }
}
