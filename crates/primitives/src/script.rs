use super::*;

/// A script that can be attached to a witness set or referenced from an
/// output. Native scripts are kept as their raw CBOR; Plutus scripts as the
/// bytes the ledger hashes.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(tag = "type", content = "cbor", rename_all = "snake_case")]
pub enum Script {
  Native(#[serde(with = "hex::serde")] Vec<u8>),
  PlutusV1(#[serde(with = "hex::serde")] Vec<u8>),
  PlutusV2(#[serde(with = "hex::serde")] Vec<u8>),
  PlutusV3(#[serde(with = "hex::serde")] Vec<u8>),
}

impl Script {
  /// Byte prepended to the script before hashing, also used as the script
  /// reference discriminant.
  pub fn type_tag(&self) -> u8 {
    match self {
      Self::Native(_) => 0,
      Self::PlutusV1(_) => 1,
      Self::PlutusV2(_) => 2,
      Self::PlutusV3(_) => 3,
    }
  }

  pub fn bytes(&self) -> &[u8] {
    match self {
      Self::Native(bytes) | Self::PlutusV1(bytes) | Self::PlutusV2(bytes) | Self::PlutusV3(bytes) => {
        bytes
      }
    }
  }

  pub fn hash(&self) -> ScriptHash {
    let mut preimage = Vec::with_capacity(self.bytes().len() + 1);
    preimage.push(self.type_tag());
    preimage.extend_from_slice(self.bytes());
    blake2b_224(&preimage)
  }

  pub fn language(&self) -> Option<Language> {
    match self {
      Self::Native(_) => None,
      Self::PlutusV1(_) => Some(Language::PlutusV1),
      Self::PlutusV2(_) => Some(Language::PlutusV2),
      Self::PlutusV3(_) => Some(Language::PlutusV3),
    }
  }

  pub fn is_plutus(&self) -> bool {
    self.language().is_some()
  }

  /// Size counted against the reference-script fee.
  pub fn size(&self) -> usize {
    self.bytes().len()
  }

  /// Encode the body of the script as it appears in a witness set: raw CBOR
  /// for native scripts, a byte string for Plutus scripts.
  pub(crate) fn encode_body<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
  ) -> Result<(), encode::Error<W::Error>> {
    match self {
      Self::Native(raw) => cbor::write_raw(e, raw),
      Self::PlutusV1(bytes) | Self::PlutusV2(bytes) | Self::PlutusV3(bytes) => {
        e.bytes(bytes)?;
        Ok(())
      }
    }
  }
}

/// Script references use `[type, script]`.
impl<C> Encode<C> for Script {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(2)?.u8(self.type_tag())?;
    self.encode_body(e)
  }
}

impl<'b, C> Decode<'b, C> for Script {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 2, "script")?;
    match d.u8()? {
      0 => Ok(Self::Native(cbor::raw(d)?.to_vec())),
      1 => Ok(Self::PlutusV1(cbor::decode_bytes(d)?)),
      2 => Ok(Self::PlutusV2(cbor::decode_bytes(d)?)),
      3 => Ok(Self::PlutusV3(cbor::decode_bytes(d)?)),
      tag => Err(decode::Error::message(format!("unknown script type {tag}"))),
    }
  }
}
