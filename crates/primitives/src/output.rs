use super::*;

/// Data attached to an output, by hash or inline.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Datum {
  Hash(DatumHash),
  Inline(PlutusData),
}

/// Which of the two output wire shapes an output uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
  Legacy,
  #[default]
  PostAlonzo,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionOutput {
  pub address: Address,
  pub value: Value,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datum: Option<Datum>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub script_ref: Option<Script>,
  #[serde(default)]
  pub format: OutputFormat,
}

impl TransactionOutput {
  pub fn new(address: Address, value: Value) -> Self {
    Self {
      address,
      value,
      datum: None,
      script_ref: None,
      format: OutputFormat::PostAlonzo,
    }
  }

  pub fn lovelace(&self) -> i64 {
    self.value.coin
  }

  pub fn datum_hash(&self) -> Option<DatumHash> {
    match &self.datum {
      Some(Datum::Hash(hash)) => Some(*hash),
      Some(Datum::Inline(data)) => Some(data.hash()),
      None => None,
    }
  }

  /// Legacy outputs cannot carry inline datums or script references, so
  /// those are always written in the map shape.
  fn is_legacy(&self) -> bool {
    self.format == OutputFormat::Legacy
      && self.script_ref.is_none()
      && !matches!(self.datum, Some(Datum::Inline(_)))
  }
}

impl<C> Encode<C> for TransactionOutput {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    if self.is_legacy() {
      match &self.datum {
        Some(Datum::Hash(hash)) => {
          e.array(3)?.encode(&self.address)?.encode(&self.value)?.encode(hash)?;
        }
        _ => {
          e.array(2)?.encode(&self.address)?.encode(&self.value)?;
        }
      }
      return Ok(());
    }

    let len = 2 + u64::from(self.datum.is_some()) + u64::from(self.script_ref.is_some());

    e.map(len)?;
    e.u8(0)?.encode(&self.address)?;
    e.u8(1)?.encode(&self.value)?;

    match &self.datum {
      Some(Datum::Hash(hash)) => {
        e.u8(2)?.array(2)?.u8(0)?.encode(hash)?;
      }
      Some(Datum::Inline(data)) => {
        e.u8(2)?
          .array(2)?
          .u8(1)?
          .tag(Tag::new(cbor::TAG_ENCODED_CBOR))?
          .bytes(&data.to_cbor())?;
      }
      None => {}
    }

    if let Some(script) = &self.script_ref {
      e.u8(3)?
        .tag(Tag::new(cbor::TAG_ENCODED_CBOR))?
        .bytes(&cbor::to_vec(script))?;
    }

    Ok(())
  }
}

fn decode_encoded_cbor(d: &mut Decoder) -> Result<Vec<u8>, decode::Error> {
  let tag = d.tag()?.as_u64();
  if tag != cbor::TAG_ENCODED_CBOR {
    return Err(decode::Error::message(format!(
      "expected encoded cbor tag, found {tag}"
    )));
  }
  cbor::decode_bytes(d)
}

fn decode_datum(d: &mut Decoder) -> Result<Datum, decode::Error> {
  cbor::expect_len(d.array()?, 2, "datum option")?;
  match d.u8()? {
    0 => Ok(Datum::Hash(d.decode()?)),
    1 => Ok(Datum::Inline(cbor::from_slice(&decode_encoded_cbor(d)?)?)),
    kind => Err(decode::Error::message(format!(
      "unknown datum option {kind}"
    ))),
  }
}

impl<'b, C> Decode<'b, C> for TransactionOutput {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    match d.datatype()? {
      Type::Array | Type::ArrayIndef => {
        let len = d.array()?;
        let address = d.decode()?;
        let value = d.decode()?;

        let datum = match len {
          Some(3) => Some(Datum::Hash(d.decode()?)),
          Some(2) => None,
          None if d.datatype()? != Type::Break => Some(Datum::Hash(d.decode()?)),
          None => None,
          Some(len) => {
            return Err(decode::Error::message(format!(
              "legacy output: expected 2 or 3 elements, found {len}"
            )))
          }
        };

        cbor::end_indefinite(d, len)?;

        Ok(Self {
          address,
          value,
          datum,
          script_ref: None,
          format: OutputFormat::Legacy,
        })
      }
      Type::Map | Type::MapIndef => {
        let mut address = None;
        let mut value = None;
        let mut datum = None;
        let mut script_ref = None;

        cbor::decode_map(d, |d| {
          match d.u8()? {
            0 => address = Some(d.decode()?),
            1 => value = Some(d.decode()?),
            2 => datum = Some(decode_datum(d)?),
            3 => script_ref = Some(cbor::from_slice(&decode_encoded_cbor(d)?)?),
            key => {
              return Err(decode::Error::message(format!(
                "unknown output key {key}"
              )))
            }
          }
          Ok(((), ()))
        })?;

        Ok(Self {
          address: address.ok_or_else(|| decode::Error::message("output missing address"))?,
          value: value.ok_or_else(|| decode::Error::message("output missing value"))?,
          datum,
          script_ref,
          format: OutputFormat::PostAlonzo,
        })
      }
      ty => Err(decode::Error::message(format!(
        "unexpected output type {ty}"
      ))),
    }
  }
}
