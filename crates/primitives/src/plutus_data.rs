use super::*;

/// Structured data passed to Plutus scripts as datums and redeemers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlutusData {
  Constr {
    alternative: u64,
    fields: Vec<PlutusData>,
  },
  Map(Vec<(PlutusData, PlutusData)>),
  List(Vec<PlutusData>),
  Integer(i128),
  Bytes(Vec<u8>),
}

const BYTES_CHUNK_SIZE: usize = 64;
const TAG_GENERAL_CONSTR: u64 = 102;
const TAG_POSITIVE_BIGNUM: u64 = 2;
const TAG_NEGATIVE_BIGNUM: u64 = 3;

fn constr_tag(alternative: u64) -> Option<u64> {
  match alternative {
    0..=6 => Some(121 + alternative),
    7..=127 => Some(1280 + alternative - 7),
    _ => None,
  }
}

fn constr_alternative(tag: u64) -> Option<u64> {
  match tag {
    121..=127 => Some(tag - 121),
    1280..=1400 => Some(tag - 1280 + 7),
    _ => None,
  }
}

impl PlutusData {
  pub fn constr(alternative: u64, fields: Vec<PlutusData>) -> Self {
    Self::Constr {
      alternative,
      fields,
    }
  }

  pub fn unit() -> Self {
    Self::constr(0, Vec::new())
  }

  pub fn hash(&self) -> DatumHash {
    blake2b_256(&cbor::to_vec(self))
  }

  pub fn to_cbor(&self) -> Vec<u8> {
    cbor::to_vec(self)
  }

  pub fn from_cbor(bytes: &[u8]) -> Result<Self, decode::Error> {
    cbor::from_slice(bytes)
  }
}

fn encode_list<W: encode::Write>(
  items: &[PlutusData],
  e: &mut Encoder<W>,
) -> Result<(), encode::Error<W::Error>> {
  if items.is_empty() {
    e.array(0)?;
  } else {
    e.begin_array()?;
    for item in items {
      e.encode(item)?;
    }
    e.end()?;
  }
  Ok(())
}

impl<C> Encode<C> for PlutusData {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    match self {
      Self::Constr {
        alternative,
        fields,
      } => match constr_tag(*alternative) {
        Some(tag) => {
          e.tag(Tag::new(tag))?;
          encode_list(fields, e)?;
        }
        None => {
          e.tag(Tag::new(TAG_GENERAL_CONSTR))?;
          e.array(2)?.u64(*alternative)?;
          encode_list(fields, e)?;
        }
      },
      Self::Map(entries) => {
        e.map(entries.len() as u64)?;
        for (key, value) in entries {
          e.encode(key)?.encode(value)?;
        }
      }
      Self::List(items) => encode_list(items, e)?,
      Self::Integer(n) => match Int::try_from(*n) {
        Ok(int) => {
          e.int(int)?;
        }
        Err(_) => {
          let (tag, magnitude) = if *n >= 0 {
            (TAG_POSITIVE_BIGNUM, n.unsigned_abs())
          } else {
            (TAG_NEGATIVE_BIGNUM, (-1 - n).unsigned_abs())
          };
          let bytes = magnitude.to_be_bytes();
          let start = bytes.iter().position(|byte| *byte != 0).unwrap_or(bytes.len());
          e.tag(Tag::new(tag))?.bytes(&bytes[start..])?;
        }
      },
      Self::Bytes(bytes) => {
        if bytes.len() <= BYTES_CHUNK_SIZE {
          e.bytes(bytes)?;
        } else {
          e.begin_bytes()?;
          for chunk in bytes.chunks(BYTES_CHUNK_SIZE) {
            e.bytes(chunk)?;
          }
          e.end()?;
        }
      }
    }

    Ok(())
  }
}

fn decode_bignum(bytes: &[u8]) -> Result<u128, decode::Error> {
  if bytes.len() > 16 {
    return Err(decode::Error::message(format!(
      "bignum of {} bytes does not fit in 128 bits",
      bytes.len()
    )));
  }

  Ok(
    bytes
      .iter()
      .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte)),
  )
}

impl<'b, C> Decode<'b, C> for PlutusData {
  fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, decode::Error> {
    match d.datatype()? {
      Type::Tag => {
        let tag = d.tag()?.as_u64();

        if let Some(alternative) = constr_alternative(tag) {
          return Ok(Self::Constr {
            alternative,
            fields: cbor::decode_array(d, |d| Self::decode(d, ctx))?,
          });
        }

        match tag {
          TAG_GENERAL_CONSTR => {
            cbor::expect_len(d.array()?, 2, "constructor")?;
            let alternative = d.u64()?;
            Ok(Self::Constr {
              alternative,
              fields: cbor::decode_array(d, |d| Self::decode(d, ctx))?,
            })
          }
          TAG_POSITIVE_BIGNUM => {
            let magnitude = decode_bignum(&cbor::decode_bytes(d)?)?;
            Ok(Self::Integer(
              i128::try_from(magnitude).map_err(decode::Error::message)?,
            ))
          }
          TAG_NEGATIVE_BIGNUM => {
            let magnitude = decode_bignum(&cbor::decode_bytes(d)?)?;
            Ok(Self::Integer(
              -1 - i128::try_from(magnitude).map_err(decode::Error::message)?,
            ))
          }
          tag => Err(decode::Error::message(format!(
            "unexpected plutus data tag {tag}"
          ))),
        }
      }
      Type::Map | Type::MapIndef => Ok(Self::Map(cbor::decode_map(d, |d| {
        Ok((Self::decode(d, ctx)?, Self::decode(d, ctx)?))
      })?)),
      Type::Array | Type::ArrayIndef => Ok(Self::List(cbor::decode_array(d, |d| {
        Self::decode(d, ctx)
      })?)),
      Type::Bytes | Type::BytesIndef => Ok(Self::Bytes(cbor::decode_bytes(d)?)),
      Type::U8
      | Type::U16
      | Type::U32
      | Type::U64
      | Type::I8
      | Type::I16
      | Type::I32
      | Type::I64
      | Type::Int => Ok(Self::Integer(i128::from(d.int()?))),
      ty => Err(decode::Error::message(format!(
        "unexpected plutus data type {ty}"
      ))),
    }
  }
}

/// The detailed JSON schema used by cardano-cli:
/// `{"constructor": 0, "fields": []}`, `{"map": [{"k": .., "v": ..}]}`,
/// `{"list": []}`, `{"int": 1}` and `{"bytes": "00"}`.
mod schema {
  use super::*;

  #[derive(Deserialize, Serialize)]
  pub(super) struct Entry {
    pub(super) k: PlutusData,
    pub(super) v: PlutusData,
  }

  #[derive(Deserialize, Serialize)]
  #[serde(untagged)]
  pub(super) enum Schema {
    Constr {
      constructor: u64,
      fields: Vec<PlutusData>,
    },
    Map {
      map: Vec<Entry>,
    },
    List {
      list: Vec<PlutusData>,
    },
    Int {
      int: i64,
    },
    Bytes {
      #[serde(with = "hex::serde")]
      bytes: Vec<u8>,
    },
  }
}

impl Serialize for PlutusData {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    use {schema::Schema, serde::ser::Error};

    match self {
      Self::Constr {
        alternative,
        fields,
      } => Schema::Constr {
        constructor: *alternative,
        fields: fields.clone(),
      },
      Self::Map(entries) => Schema::Map {
        map: entries
          .iter()
          .map(|(k, v)| schema::Entry {
            k: k.clone(),
            v: v.clone(),
          })
          .collect(),
      },
      Self::List(items) => Schema::List {
        list: items.clone(),
      },
      Self::Integer(n) => Schema::Int {
        int: i64::try_from(*n).map_err(S::Error::custom)?,
      },
      Self::Bytes(bytes) => Schema::Bytes {
        bytes: bytes.clone(),
      },
    }
    .serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for PlutusData {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    use schema::Schema;

    Ok(match Schema::deserialize(deserializer)? {
      Schema::Constr {
        constructor,
        fields,
      } => Self::Constr {
        alternative: constructor,
        fields,
      },
      Schema::Map { map } => Self::Map(map.into_iter().map(|entry| (entry.k, entry.v)).collect()),
      Schema::List { list } => Self::List(list),
      Schema::Int { int } => Self::Integer(int.into()),
      Schema::Bytes { bytes } => Self::Bytes(bytes),
    })
  }
}
