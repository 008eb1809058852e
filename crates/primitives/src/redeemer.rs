use super::*;

/// The purpose a redeemer is supplied for.
#[derive(
  Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub enum RedeemerTag {
  Spend,
  Mint,
  Cert,
  Reward,
}

impl RedeemerTag {
  fn code(self) -> u8 {
    match self {
      Self::Spend => 0,
      Self::Mint => 1,
      Self::Cert => 2,
      Self::Reward => 3,
    }
  }
}

impl Display for RedeemerTag {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Self::Spend => "spend",
        Self::Mint => "mint",
        Self::Cert => "cert",
        Self::Reward => "reward",
      }
    )
  }
}

impl FromStr for RedeemerTag {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "spend" => Ok(Self::Spend),
      "mint" => Ok(Self::Mint),
      "cert" | "certificate" | "publish" => Ok(Self::Cert),
      "reward" | "withdrawal" | "withdraw" => Ok(Self::Reward),
      _ => Err(Error::Tag(s.into())),
    }
  }
}

/// Memory and CPU steps consumed by a script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct ExUnits {
  pub mem: u64,
  pub steps: u64,
}

impl ExUnits {
  pub fn new(mem: u64, steps: u64) -> Self {
    Self { mem, steps }
  }

  pub fn is_zero(&self) -> bool {
    self.mem == 0 && self.steps == 0
  }
}

impl Add for ExUnits {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self {
      mem: self.mem + rhs.mem,
      steps: self.steps + rhs.steps,
    }
  }
}

impl std::iter::Sum for ExUnits {
  fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
    iter.fold(Self::default(), Add::add)
  }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Redeemer {
  pub tag: RedeemerTag,
  pub index: u32,
  pub data: PlutusData,
  pub ex_units: ExUnits,
}

impl Redeemer {
  /// Key under which script evaluators report execution units.
  pub fn pointer(&self) -> String {
    format!("{}:{}", self.tag, self.index)
  }
}

impl<C> Encode<C> for Redeemer {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(4)?
      .u8(self.tag.code())?
      .u32(self.index)?
      .encode(&self.data)?
      .array(2)?
      .u64(self.ex_units.mem)?
      .u64(self.ex_units.steps)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Redeemer {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 4, "redeemer")?;

    let tag = match d.u8()? {
      0 => RedeemerTag::Spend,
      1 => RedeemerTag::Mint,
      2 => RedeemerTag::Cert,
      3 => RedeemerTag::Reward,
      code => {
        return Err(decode::Error::message(format!(
          "unknown redeemer tag {code}"
        )))
      }
    };

    let index = d.u32()?;
    let data = d.decode()?;

    cbor::expect_len(d.array()?, 2, "execution units")?;

    Ok(Self {
      tag,
      index,
      data,
      ex_units: ExUnits {
        mem: d.u64()?,
        steps: d.u64()?,
      },
    })
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("unknown redeemer tag `{0}`")]
  Tag(String),
}
