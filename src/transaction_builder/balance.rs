use super::*;

impl TransactionBuilder {
  /// Settle the fee and change.
  ///
  /// The fee is re-estimated with the change output in place until the
  /// estimate no longer exceeds the fee paid, each round taking the increase
  /// out of the change. With a fixed fee there is a single round.
  pub(super) fn balance(mut self, fixed_fee: Option<i64>) -> Result<Self> {
    self.change = None;

    self.fee = match fixed_fee {
      Some(fee) => fee,
      None => self.estimate_fee()?,
    };

    loop {
      self.change = self.change_output()?;

      if fixed_fee.is_some() {
        break;
      }

      let estimate = self.estimate_fee()?;

      if estimate <= self.fee {
        break;
      }

      log::debug!("raising fee from {} to {estimate}", self.fee);

      self.fee = estimate;
    }

    if let Some(change) = &self.change {
      let minimum = fee::min_lovelace(&self.params, change);

      if change.value.coin < minimum {
        if !self.permissive_change {
          return Err(Error::ChangeBelowMinimum {
            change: change.value.coin,
            minimum,
          });
        }

        log::warn!(
          "change of {} lovelace is below the {minimum} lovelace minimum",
          change.value.coin
        );
      }
    }

    Ok(self)
  }

  /// Everything provided and not requested, or `None` when that is nothing.
  fn change_output(&self) -> Result<Option<TransactionOutput>> {
    let provided = self.provided();
    let requested = self.requested();

    let change = (&provided - &requested).remove_zero_assets();

    if change.coin < 0 {
      return Err(Error::InsufficientFunds {
        requested: requested.coin,
        available: provided.coin,
      });
    }

    if let Some((policy_id, asset_name, quantity)) = change
      .asset_entries()
      .find(|(_, _, quantity)| *quantity < 0)
    {
      return Err(Error::MissingRequiredAssets {
        policy_id: *policy_id,
        asset_name: asset_name.clone(),
        missing: -quantity,
      });
    }

    if change.is_zero() {
      return Ok(None);
    }

    Ok(Some(TransactionOutput::new(
      self.change_address()?.clone(),
      change,
    )))
  }
}
