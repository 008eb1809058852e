use super::*;

/// A transaction metadata value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Metadatum {
  Int(i128),
  Bytes(Vec<u8>),
  Text(String),
  List(Vec<Metadatum>),
  Map(Vec<(Metadatum, Metadatum)>),
}

impl<C> Encode<C> for Metadatum {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    match self {
      Self::Int(n) => {
        e.int(Int::try_from(*n).map_err(|err| encode::Error::message(err.to_string()))?)?;
      }
      Self::Bytes(bytes) => {
        e.bytes(bytes)?;
      }
      Self::Text(text) => {
        e.str(text)?;
      }
      Self::List(items) => {
        e.array(items.len() as u64)?;
        for item in items {
          item.encode(e, ctx)?;
        }
      }
      Self::Map(entries) => {
        e.map(entries.len() as u64)?;
        for (key, value) in entries {
          key.encode(e, ctx)?;
          value.encode(e, ctx)?;
        }
      }
    }
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Metadatum {
  fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, decode::Error> {
    match d.datatype()? {
      Type::Bytes | Type::BytesIndef => Ok(Self::Bytes(cbor::decode_bytes(d)?)),
      Type::String => Ok(Self::Text(d.str()?.into())),
      Type::StringIndef => {
        let mut text = String::new();
        for chunk in d.str_iter()? {
          text.push_str(chunk?);
        }
        Ok(Self::Text(text))
      }
      Type::Array | Type::ArrayIndef => Ok(Self::List(cbor::decode_array(d, |d| {
        Self::decode(d, ctx)
      })?)),
      Type::Map | Type::MapIndef => Ok(Self::Map(cbor::decode_map(d, |d| {
        Ok((Self::decode(d, ctx)?, Self::decode(d, ctx)?))
      })?)),
      Type::U8
      | Type::U16
      | Type::U32
      | Type::U64
      | Type::I8
      | Type::I16
      | Type::I32
      | Type::I64
      | Type::Int => Ok(Self::Int(i128::from(d.int()?))),
      ty => Err(decode::Error::message(format!(
        "unexpected metadatum type {ty}"
      ))),
    }
  }
}

/// JSON form uses the detailed schema: `{"int": 1}`, `{"bytes": "00"}`,
/// `{"string": ""}`, `{"list": []}` and `{"map": [{"k": .., "v": ..}]}`.
mod schema {
  use super::*;

  #[derive(Deserialize, Serialize)]
  pub(super) struct Entry {
    pub(super) k: Metadatum,
    pub(super) v: Metadatum,
  }

  #[derive(Deserialize, Serialize)]
  #[serde(untagged)]
  pub(super) enum Schema {
    Int {
      int: i64,
    },
    Bytes {
      #[serde(with = "hex::serde")]
      bytes: Vec<u8>,
    },
    Text {
      string: String,
    },
    List {
      list: Vec<Metadatum>,
    },
    Map {
      map: Vec<Entry>,
    },
  }
}

impl Serialize for Metadatum {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    use {schema::Schema, serde::ser::Error};

    match self {
      Self::Int(n) => Schema::Int {
        int: i64::try_from(*n).map_err(S::Error::custom)?,
      },
      Self::Bytes(bytes) => Schema::Bytes {
        bytes: bytes.clone(),
      },
      Self::Text(text) => Schema::Text {
        string: text.clone(),
      },
      Self::List(items) => Schema::List {
        list: items.clone(),
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
    }
    .serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Metadatum {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    use schema::Schema;

    Ok(match Schema::deserialize(deserializer)? {
      Schema::Int { int } => Self::Int(int.into()),
      Schema::Bytes { bytes } => Self::Bytes(bytes),
      Schema::Text { string } => Self::Text(string),
      Schema::List { list } => Self::List(list),
      Schema::Map { map } => Self::Map(map.into_iter().map(|entry| (entry.k, entry.v)).collect()),
    })
  }
}

/// Transaction metadata keyed by label, encoded in the post-Alonzo tagged
/// form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct AuxiliaryData {
  pub metadata: BTreeMap<u64, Metadatum>,
}

impl AuxiliaryData {
  pub fn is_empty(&self) -> bool {
    self.metadata.is_empty()
  }

  /// Hash committed to by the transaction body.
  pub fn hash(&self) -> Hash<32> {
    blake2b_256(&cbor::to_vec(self))
  }
}

impl<C> Encode<C> for AuxiliaryData {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.tag(Tag::new(cbor::TAG_AUXILIARY_DATA))?.map(1)?.u8(0)?;
    e.map(self.metadata.len() as u64)?;
    for (label, value) in &self.metadata {
      e.u64(*label)?;
      value.encode(e, ctx)?;
    }
    Ok(())
  }
}

fn decode_metadata<C>(
  d: &mut Decoder,
  ctx: &mut C,
) -> Result<BTreeMap<u64, Metadatum>, decode::Error> {
  Ok(
    cbor::decode_map(d, |d| Ok((d.u64()?, Metadatum::decode(d, ctx)?)))?
      .into_iter()
      .collect(),
  )
}

impl<'b, C> Decode<'b, C> for AuxiliaryData {
  fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, decode::Error> {
    let metadata = match d.datatype()? {
      Type::Tag => {
        let tag = d.tag()?.as_u64();
        if tag != cbor::TAG_AUXILIARY_DATA {
          return Err(decode::Error::message(format!(
            "unexpected auxiliary data tag {tag}"
          )));
        }

        let mut metadata = BTreeMap::new();
        for (key, value) in cbor::decode_map(d, |d| {
          let key = d.u64()?;
          let value = if key == 0 {
            Some(decode_metadata(d, ctx)?)
          } else {
            d.skip()?;
            None
          };
          Ok((key, value))
        })? {
          if let (0, Some(value)) = (key, value) {
            metadata = value;
          }
        }
        metadata
      }
      Type::Array | Type::ArrayIndef => {
        let len = d.array()?;
        let metadata = decode_metadata(d, ctx)?;
        match len {
          Some(len) => {
            for _ in 1..len {
              d.skip()?;
            }
          }
          None => {
            while d.datatype()? != Type::Break {
              d.skip()?;
            }
            cbor::end_indefinite(d, None)?;
          }
        }
        metadata
      }
      _ => decode_metadata(d, ctx)?,
    };

    Ok(Self { metadata })
  }
}
