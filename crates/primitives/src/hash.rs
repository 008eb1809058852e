use {
  super::*,
  blake2::{
    digest::consts::{U28, U32},
    Blake2b, Digest,
  },
};

/// A fixed-size ledger hash, displayed and parsed as lowercase hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const N: usize>([u8; N]);

pub type TransactionId = Hash<32>;
pub type DatumHash = Hash<32>;
pub type PolicyId = Hash<28>;
pub type ScriptHash = Hash<28>;
pub type KeyHash = Hash<28>;

pub fn blake2b_256(data: &[u8]) -> Hash<32> {
  Hash(Blake2b::<U32>::digest(data).into())
}

pub fn blake2b_224(data: &[u8]) -> Hash<28> {
  Hash(Blake2b::<U28>::digest(data).into())
}

impl<const N: usize> Hash<N> {
  pub const fn new(bytes: [u8; N]) -> Self {
    Self(bytes)
  }

  pub fn as_bytes(&self) -> &[u8; N] {
    &self.0
  }

  pub fn from_slice(bytes: &[u8]) -> Result<Self, Error> {
    Ok(Self(bytes.try_into().map_err(|_| Error::Length {
      expected: N,
      actual: bytes.len(),
    })?))
  }
}

impl<const N: usize> Default for Hash<N> {
  fn default() -> Self {
    Self([0; N])
  }
}

impl<const N: usize> Display for Hash<N> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", hex::encode(self.0))
  }
}

impl<const N: usize> FromStr for Hash<N> {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::from_slice(&hex::decode(s)?)
  }
}

impl<const N: usize> Serialize for Hash<N> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de, const N: usize> Deserialize<'de> for Hash<N> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    String::deserialize(deserializer)?
      .parse()
      .map_err(serde::de::Error::custom)
  }
}

impl<C, const N: usize> Encode<C> for Hash<N> {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.bytes(&self.0)?;
    Ok(())
  }
}

impl<'b, C, const N: usize> Decode<'b, C> for Hash<N> {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    Self::from_slice(d.bytes()?).map_err(decode::Error::message)
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("invalid hex: {0}")]
  Hex(#[from] hex::FromHexError),
  #[error("expected {expected} bytes, found {actual}")]
  Length { expected: usize, actual: usize },
}
