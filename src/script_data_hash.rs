//! The script data hash binds redeemers, datums and the cost models of the
//! languages in use into the transaction body.
//!
//! The preimage is the redeemer list, then the datum list (or nothing when
//! there are no datums), then the language views. When a Plutus V1 script is
//! present the only view is the V1 one, in its legacy shape: the language id
//! serialized into a byte string, mapped to a byte string holding the cost
//! model as an indefinite array. Otherwise, when there are redeemers, the
//! views are a map from language id to the cost model as a definite array.
//! With neither, the views are an empty map.

use {
  super::*,
  minicbor::{encode, Encode, Encoder},
};

/// Returns `None` when the witness set carries neither datums nor redeemers.
pub fn script_data_hash(
  params: &ProtocolParameters,
  witness_set: &WitnessSet,
  languages: &BTreeSet<Language>,
) -> Option<Hash<32>> {
  if witness_set.plutus_data.is_empty() && witness_set.redeemers.is_empty() {
    return None;
  }

  let mut preimage = witness_set.encode_redeemers();

  if !witness_set.plutus_data.is_empty() {
    preimage.extend(witness_set.encode_plutus_data());
  }

  preimage.extend(language_views(
    params,
    languages,
    !witness_set.redeemers.is_empty(),
  ));

  Some(blake2b_256(&preimage))
}

pub fn language_views(
  params: &ProtocolParameters,
  languages: &BTreeSet<Language>,
  has_redeemers: bool,
) -> Vec<u8> {
  let views = if languages.contains(&Language::PlutusV1) {
    LanguageViews::Legacy(params.cost_model(Language::PlutusV1))
  } else if has_redeemers {
    let mut current = languages.iter().copied().collect::<Vec<Language>>();

    if current.is_empty() {
      current.push(Language::PlutusV2);
    }

    LanguageViews::Current(
      current
        .into_iter()
        .map(|language| (language.key(), params.cost_model(language)))
        .collect(),
    )
  } else {
    LanguageViews::Current(Vec::new())
  };

  cbor::to_vec(&views)
}

enum LanguageViews<'a> {
  Legacy(&'a [i64]),
  Current(Vec<(u8, &'a [i64])>),
}

struct IndefiniteCosts<'a>(&'a [i64]);

impl<C> Encode<C> for IndefiniteCosts<'_> {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.begin_array()?;
    for cost in self.0 {
      e.i64(*cost)?;
    }
    e.end()?;
    Ok(())
  }
}

impl<C> Encode<C> for LanguageViews<'_> {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    match self {
      Self::Legacy(costs) => {
        e.map(1)?
          .bytes(&cbor::to_vec(&Language::PlutusV1.key()))?
          .bytes(&cbor::to_vec(&IndefiniteCosts(costs)))?;
      }
      Self::Current(views) => {
        e.map(views.len().try_into().unwrap_or(u64::MAX))?;
        for (key, costs) in views {
          e.u8(*key)?.array(costs.len().try_into().unwrap_or(u64::MAX))?;
          for cost in *costs {
            e.i64(*cost)?;
          }
        }
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use {super::*, pretty_assertions::assert_eq};

  fn params() -> ProtocolParameters {
    ProtocolParameters {
      cost_models: [
        (Language::PlutusV1, vec![1, 2]),
        (Language::PlutusV2, vec![3, -4]),
        (Language::PlutusV3, vec![5]),
      ]
      .into_iter()
      .collect(),
      ..default()
    }
  }

  fn redeemer() -> Redeemer {
    Redeemer {
      tag: RedeemerTag::Spend,
      index: 0,
      data: PlutusData::unit(),
      ex_units: ExUnits::new(10, 20),
    }
  }

  fn languages(languages: &[Language]) -> BTreeSet<Language> {
    languages.iter().copied().collect()
  }

  #[test]
  fn absent_without_datums_or_redeemers() {
    assert_eq!(
      script_data_hash(&params(), &WitnessSet::default(), &languages(&[])),
      None
    );
  }

  #[test]
  fn legacy_view() {
    assert_eq!(
      hex::encode(language_views(
        &params(),
        &languages(&[Language::PlutusV1, Language::PlutusV2]),
        true
      )),
      "a14100449f0102ff",
    );
  }

  #[test]
  fn current_views() {
    assert_eq!(
      hex::encode(language_views(
        &params(),
        &languages(&[Language::PlutusV2, Language::PlutusV3]),
        true
      )),
      "a201820323028105",
    );
  }

  #[test]
  fn redeemers_without_attached_scripts_use_v2_view() {
    assert_eq!(
      hex::encode(language_views(&params(), &languages(&[]), true)),
      "a101820323",
    );
  }

  #[test]
  fn no_redeemers_is_empty_map() {
    assert_eq!(
      hex::encode(language_views(
        &params(),
        &languages(&[Language::PlutusV2]),
        false
      )),
      "a0",
    );
  }

  #[test]
  fn datum_only_preimage() {
    let witness_set = WitnessSet {
      plutus_data: vec![PlutusData::Integer(42)],
      ..default()
    };

    let mut preimage = vec![0x80];
    preimage.extend(witness_set.encode_plutus_data());
    preimage.push(0xa0);

    assert_eq!(hex::encode(&preimage), "809f182affa0");

    assert_eq!(
      script_data_hash(&params(), &witness_set, &languages(&[Language::PlutusV2])),
      Some(blake2b_256(&preimage)),
    );
  }

  #[test]
  fn redeemer_preimage() {
    let witness_set = WitnessSet {
      redeemers: vec![redeemer()],
      ..default()
    };

    let mut preimage = hex::decode("81840000d87980820a14").unwrap();
    preimage.extend(hex::decode("a101820323").unwrap());

    assert_eq!(
      script_data_hash(&params(), &witness_set, &languages(&[Language::PlutusV2])),
      Some(blake2b_256(&preimage)),
    );
  }

  #[test]
  fn hash_changes_with_language() {
    let witness_set = WitnessSet {
      redeemers: vec![redeemer()],
      ..default()
    };

    assert_ne!(
      script_data_hash(&params(), &witness_set, &languages(&[Language::PlutusV1])),
      script_data_hash(&params(), &witness_set, &languages(&[Language::PlutusV2])),
    );
  }
}
