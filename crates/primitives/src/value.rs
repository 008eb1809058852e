use super::*;

/// Native-token quantities keyed by policy and asset name.
pub type Assets = BTreeMap<PolicyId, BTreeMap<AssetName, i64>>;

/// An amount of lovelace plus native tokens.
///
/// Quantities may be negative while computing shortfalls and burns. Values
/// placed in outputs must be non-negative; encoding a negative quantity
/// fails. Equality ignores zero-quantity entries.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Value {
  pub coin: i64,
  #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
  pub assets: Assets,
}

impl Value {
  pub fn from_coin(coin: i64) -> Self {
    Self {
      coin,
      assets: Assets::new(),
    }
  }

  pub fn from_asset(policy_id: PolicyId, asset_name: AssetName, quantity: i64) -> Self {
    let mut value = Self::default();
    value.add_asset(policy_id, asset_name, quantity);
    value
  }

  pub fn add_asset(&mut self, policy_id: PolicyId, asset_name: AssetName, quantity: i64) {
    *self
      .assets
      .entry(policy_id)
      .or_default()
      .entry(asset_name)
      .or_default() += quantity;
  }

  pub fn get_by_policy_and_asset(&self, policy_id: &PolicyId, asset_name: &AssetName) -> i64 {
    self
      .assets
      .get(policy_id)
      .and_then(|assets| assets.get(asset_name))
      .copied()
      .unwrap_or_default()
  }

  /// Drop zero-quantity assets and policies left without assets.
  pub fn remove_zero_assets(mut self) -> Self {
    for assets in self.assets.values_mut() {
      assets.retain(|_, quantity| *quantity != 0);
    }
    self.assets.retain(|_, assets| !assets.is_empty());
    self
  }

  pub fn has_assets(&self) -> bool {
    self
      .assets
      .values()
      .any(|assets| assets.values().any(|quantity| *quantity != 0))
  }

  /// Non-zero asset entries.
  pub fn asset_entries(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, i64)> {
    self.assets.iter().flat_map(|(policy_id, assets)| {
      assets
        .iter()
        .filter(|(_, quantity)| **quantity != 0)
        .map(move |(asset_name, quantity)| (policy_id, asset_name, *quantity))
    })
  }

  /// Split into the positive and the negated negative parts, so that
  /// `value == positive - negative` with both parts non-negative.
  pub fn split_signs(&self) -> (Value, Value) {
    let mut positive = Value::from_coin(self.coin.max(0));
    let mut negative = Value::from_coin((-self.coin).max(0));

    for (policy_id, asset_name, quantity) in self.asset_entries() {
      if quantity > 0 {
        positive.add_asset(*policy_id, asset_name.clone(), quantity);
      } else {
        negative.add_asset(*policy_id, asset_name.clone(), -quantity);
      }
    }

    (positive, negative)
  }

  pub fn less_than(&self, other: &Value) -> bool {
    self.coin < other.coin
  }

  pub fn greater_than(&self, other: &Value) -> bool {
    self.coin > other.coin
  }

  pub fn greater_or_equal(&self, other: &Value) -> bool {
    self.coin >= other.coin
  }

  /// Whether every positive asset quantity in `other` is matched here.
  pub fn covers_assets(&self, other: &Value) -> bool {
    other
      .asset_entries()
      .filter(|(_, _, quantity)| *quantity > 0)
      .all(|(policy_id, asset_name, quantity)| {
        self.get_by_policy_and_asset(policy_id, asset_name) >= quantity
      })
  }

  /// Whether this value pays for `other` in full, coin and every asset.
  pub fn dominates(&self, other: &Value) -> bool {
    self.greater_or_equal(other) && self.covers_assets(other)
  }

  pub fn is_zero(&self) -> bool {
    self.coin == 0 && !self.has_assets()
  }

  pub fn is_non_negative(&self) -> bool {
    self.coin >= 0 && self.asset_entries().all(|(_, _, quantity)| quantity >= 0)
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    self.coin == other.coin && self.asset_entries().eq(other.asset_entries())
  }
}

impl Eq for Value {}

impl AddAssign<&Value> for Value {
  fn add_assign(&mut self, rhs: &Value) {
    self.coin += rhs.coin;
    for (policy_id, assets) in &rhs.assets {
      for (asset_name, quantity) in assets {
        self.add_asset(*policy_id, asset_name.clone(), *quantity);
      }
    }
  }
}

impl SubAssign<&Value> for Value {
  fn sub_assign(&mut self, rhs: &Value) {
    *self += &-rhs;
  }
}

impl Add<&Value> for &Value {
  type Output = Value;

  fn add(self, rhs: &Value) -> Value {
    let mut sum = self.clone();
    sum += rhs;
    sum
  }
}

impl Sub<&Value> for &Value {
  type Output = Value;

  fn sub(self, rhs: &Value) -> Value {
    let mut difference = self.clone();
    difference -= rhs;
    difference
  }
}

impl Neg for &Value {
  type Output = Value;

  fn neg(self) -> Value {
    Value {
      coin: -self.coin,
      assets: self
        .assets
        .iter()
        .map(|(policy_id, assets)| {
          (
            *policy_id,
            assets
              .iter()
              .map(|(asset_name, quantity)| (asset_name.clone(), -quantity))
              .collect(),
          )
        })
        .collect(),
    }
  }
}

impl std::iter::Sum for Value {
  fn sum<I: Iterator<Item = Value>>(iter: I) -> Self {
    iter.fold(Value::default(), |mut total, value| {
      total += &value;
      total
    })
  }
}

fn non_negative<E>(quantity: i64) -> Result<u64, encode::Error<E>> {
  u64::try_from(quantity)
    .map_err(|_| encode::Error::message(format!("negative quantity {quantity} in value")))
}

/// Encode an asset map, skipping zero entries. Output values encode
/// quantities as unsigned integers, mint fields as signed ones.
pub(crate) fn encode_assets<W: encode::Write>(
  assets: &Assets,
  signed: bool,
  e: &mut Encoder<W>,
) -> Result<(), encode::Error<W::Error>> {
  let policies = assets
    .iter()
    .map(|(policy_id, assets)| {
      (
        policy_id,
        assets
          .iter()
          .filter(|(_, quantity)| **quantity != 0)
          .collect::<Vec<_>>(),
      )
    })
    .filter(|(_, assets)| !assets.is_empty())
    .collect::<Vec<_>>();

  e.map(policies.len() as u64)?;

  for (policy_id, assets) in policies {
    e.encode(policy_id)?;
    e.map(assets.len() as u64)?;
    for (asset_name, quantity) in assets {
      e.encode(asset_name)?;
      if signed {
        e.i64(*quantity)?;
      } else {
        e.u64(non_negative(*quantity)?)?;
      }
    }
  }

  Ok(())
}

pub(crate) fn decode_assets(d: &mut Decoder) -> Result<Assets, decode::Error> {
  let mut assets = Assets::new();

  for (policy_id, names) in cbor::decode_map(d, |d| {
    let policy_id = d.decode::<PolicyId>()?;
    let names = cbor::decode_map(d, |d| Ok((d.decode::<AssetName>()?, d.i64()?)))?;
    Ok((policy_id, names))
  })? {
    let entry = assets.entry(policy_id).or_default();
    for (asset_name, quantity) in names {
      entry.insert(asset_name, quantity);
    }
  }

  Ok(assets)
}

impl<C> Encode<C> for Value {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    if self.has_assets() {
      e.array(2)?;
      e.u64(non_negative(self.coin)?)?;
      encode_assets(&self.assets, false, e)?;
    } else {
      e.u64(non_negative(self.coin)?)?;
    }

    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Value {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    match d.datatype()? {
      Type::Array => {
        cbor::expect_len(d.array()?, 2, "value")?;
        let coin = i64::try_from(d.u64()?).map_err(decode::Error::message)?;
        Ok(Self {
          coin,
          assets: decode_assets(d)?,
        })
      }
      _ => Ok(Self::from_coin(
        i64::try_from(d.u64()?).map_err(decode::Error::message)?,
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  fn token(n: u8) -> AssetName {
    AssetName::new(vec![n]).unwrap()
  }

  fn value(coin: i64, assets: &[(u8, u8, i64)]) -> Value {
    let mut value = Value::from_coin(coin);
    for (policy, name, quantity) in assets {
      value.add_asset(test::policy_id(*policy), token(*name), *quantity);
    }
    value
  }

  #[test]
  fn add() {
    assert_eq!(
      &value(1, &[(1, 1, 5)]) + &value(2, &[(1, 1, 3), (2, 1, 1)]),
      value(3, &[(1, 1, 8), (2, 1, 1)])
    );
  }

  #[test]
  fn subtract_is_pure_and_may_go_negative() {
    let a = value(1, &[(1, 1, 5)]);
    let b = value(3, &[(1, 1, 7)]);
    let difference = &a - &b;
    assert_eq!(difference, value(-2, &[(1, 1, -2)]));
    assert_eq!(a, value(1, &[(1, 1, 5)]));
    assert_eq!(b, value(3, &[(1, 1, 7)]));
  }

  #[test]
  fn remove_zero_assets() {
    let value = (&value(5, &[(1, 1, 2), (2, 1, 1)]) - &value(0, &[(1, 1, 2)])).remove_zero_assets();
    assert_eq!(value.assets.len(), 1);
    assert!(value.assets.contains_key(&test::policy_id(2)));
  }

  #[test]
  fn equality_ignores_zero_entries() {
    assert_eq!(value(1, &[(1, 1, 0)]), value(1, &[]));
    assert_ne!(value(1, &[(1, 1, 1)]), value(1, &[]));
  }

  #[test]
  fn comparisons_are_coin_only() {
    let rich = value(10, &[]);
    let tokens = value(5, &[(1, 1, 100)]);
    assert!(rich.greater_than(&tokens));
    assert!(tokens.less_than(&rich));
    assert!(rich.greater_or_equal(&value(10, &[])));
    assert!(!rich.covers_assets(&tokens));
    assert!(!rich.dominates(&tokens));
    assert!(value(5, &[(1, 1, 100)]).dominates(&tokens));
  }

  #[test]
  fn get_by_policy_and_asset() {
    let value = value(0, &[(1, 2, 9)]);
    assert_eq!(value.get_by_policy_and_asset(&test::policy_id(1), &token(2)), 9);
    assert_eq!(value.get_by_policy_and_asset(&test::policy_id(1), &token(3)), 0);
    assert_eq!(value.get_by_policy_and_asset(&test::policy_id(3), &token(2)), 0);
  }

  #[test]
  fn split_signs() {
    let (positive, negative) = value(-4, &[(1, 1, 3), (2, 1, -2)]).split_signs();
    assert_eq!(positive, value(0, &[(1, 1, 3)]));
    assert_eq!(negative, value(4, &[(2, 1, 2)]));
  }

  #[test]
  fn coin_only_encodes_as_uint() {
    assert_eq!(cbor::to_vec(&value(1_000_000, &[])), [0x1a, 0x00, 0x0f, 0x42, 0x40]);
    assert_eq!(cbor::to_vec(&value(1_000_000, &[(1, 1, 0)])), [0x1a, 0x00, 0x0f, 0x42, 0x40]);
  }

  #[test]
  fn multi_asset_round_trip() {
    let value = value(2_000_000, &[(1, 1, 5), (2, 3, 1)]);
    assert_eq!(test::round_trip(&value), value);
    assert_eq!(cbor::to_vec(&value)[0], 0x82);
  }

  #[test]
  fn negative_quantities_do_not_encode() {
    assert!(minicbor::to_vec(value(-1, &[])).is_err());
    assert!(minicbor::to_vec(value(1, &[(1, 1, -1)])).is_err());
  }
}
