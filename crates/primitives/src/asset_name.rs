use super::*;

/// The name of a native token under its policy, at most 32 bytes.
///
/// Displayed and parsed as hex. Use `AssetName::from_utf8` for
/// human-readable names.
#[derive(
  Debug,
  PartialEq,
  Clone,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Hash,
  DeserializeFromStr,
  SerializeDisplay,
)]
pub struct AssetName(Vec<u8>);

impl AssetName {
  pub const MAX_LEN: usize = 32;

  pub fn new(bytes: Vec<u8>) -> Result<Self, Error> {
    if bytes.len() > Self::MAX_LEN {
      return Err(Error::Length(bytes.len()));
    }

    Ok(Self(bytes))
  }

  pub fn from_utf8(name: &str) -> Result<Self, Error> {
    Self::new(name.as_bytes().to_vec())
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }
}

impl Display for AssetName {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", hex::encode(&self.0))
  }
}

impl FromStr for AssetName {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(hex::decode(s)?)
  }
}

impl<C> Encode<C> for AssetName {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.bytes(&self.0)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for AssetName {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    Self::new(d.bytes()?.to_vec()).map_err(decode::Error::message)
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("invalid hex: {0}")]
  Hex(#[from] hex::FromHexError),
  #[error("asset name is {0} bytes, longer than 32")]
  Length(usize),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_utf8() {
    assert_eq!(
      AssetName::from_utf8("HOSKY").unwrap().to_string(),
      "484f534b59"
    );
    assert_eq!(
      AssetName::from_utf8(&"x".repeat(33)),
      Err(Error::Length(33))
    );
  }

  #[test]
  fn from_str() {
    assert_eq!(
      "484f534b59".parse::<AssetName>().unwrap(),
      AssetName::from_utf8("HOSKY").unwrap()
    );
    assert_eq!("".parse::<AssetName>().unwrap(), AssetName::default());
    assert!("xyz".parse::<AssetName>().is_err());
  }
}
