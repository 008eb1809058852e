use {
  super::*,
  bech32::{FromBase32, ToBase32, Variant},
};

/// A Shelley-era binary address.
///
/// The first byte is a header whose high nibble is the address type and low
/// nibble the network id. Enterprise and base addresses carry a payment
/// credential in bytes 1..29, base addresses additionally carry a staking
/// credential in bytes 29..57, and reward addresses carry only a staking
/// credential in bytes 1..29.
#[derive(
  Debug, PartialEq, Clone, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Address(Vec<u8>);

const CREDENTIAL_LEN: usize = 28;

impl Address {
  pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Error> {
    let header = *bytes.first().ok_or(Error::Empty)?;

    let expected = match header >> 4 {
      0..=3 => Some(1 + 2 * CREDENTIAL_LEN),
      6 | 7 | 14 | 15 => Some(1 + CREDENTIAL_LEN),
      4 | 5 => None,
      8 => return Err(Error::Byron),
      ty => return Err(Error::Type(ty)),
    };

    match expected {
      Some(len) if bytes.len() != len => Err(Error::Length {
        expected: len,
        actual: bytes.len(),
      }),
      None if bytes.len() <= 1 + CREDENTIAL_LEN => Err(Error::Length {
        expected: 1 + CREDENTIAL_LEN + 3,
        actual: bytes.len(),
      }),
      _ => Ok(Self(bytes)),
    }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  fn kind(&self) -> u8 {
    self.0[0] >> 4
  }

  pub fn network_id(&self) -> u8 {
    self.0[0] & 0x0f
  }

  pub fn is_reward(&self) -> bool {
    matches!(self.kind(), 14 | 15)
  }

  pub fn payment_part(&self) -> Option<&[u8]> {
    if self.is_reward() {
      None
    } else {
      Some(&self.0[1..1 + CREDENTIAL_LEN])
    }
  }

  pub fn staking_part(&self) -> Option<&[u8]> {
    match self.kind() {
      0..=3 => Some(&self.0[1 + CREDENTIAL_LEN..1 + 2 * CREDENTIAL_LEN]),
      14 | 15 => Some(&self.0[1..1 + CREDENTIAL_LEN]),
      _ => None,
    }
  }

  /// The payment credential, if this address has one.
  pub fn payment_credential(&self) -> Option<Credential> {
    let hash = Hash::from_slice(self.payment_part()?).ok()?;

    Some(if self.kind() & 1 == 1 {
      Credential::Script(hash)
    } else {
      Credential::Key(hash)
    })
  }

  /// The staking credential of a base or reward address.
  pub fn staking_credential(&self) -> Option<Credential> {
    let hash = Hash::from_slice(self.staking_part()?).ok()?;

    let script = if self.is_reward() {
      self.kind() & 1 == 1
    } else {
      self.kind() & 2 == 2
    };

    Some(if script {
      Credential::Script(hash)
    } else {
      Credential::Key(hash)
    })
  }

  /// Build a reward address for a staking credential.
  pub fn reward(network_id: u8, credential: &Credential) -> Self {
    let header = match credential {
      Credential::Key(_) => 0xe0,
      Credential::Script(_) => 0xf0,
    } | (network_id & 0x0f);

    let mut bytes = vec![header];
    bytes.extend_from_slice(credential.hash().as_bytes());
    Self(bytes)
  }

  fn hrp(&self) -> &'static str {
    match (self.is_reward(), self.network_id() == 1) {
      (false, true) => "addr",
      (false, false) => "addr_test",
      (true, true) => "stake",
      (true, false) => "stake_test",
    }
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let encoded =
      bech32::encode(self.hrp(), self.0.to_base32(), Variant::Bech32).map_err(|_| fmt::Error)?;
    write!(f, "{encoded}")
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (hrp, data, variant) = bech32::decode(s)?;

    if variant != Variant::Bech32 {
      return Err(Error::Variant);
    }

    let address = Self::from_bytes(Vec::from_base32(&data)?)?;

    if address.hrp() != hrp {
      return Err(Error::Prefix {
        expected: address.hrp(),
        actual: hrp,
      });
    }

    Ok(address)
  }
}

impl<C> Encode<C> for Address {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.bytes(&self.0)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Address {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    Self::from_bytes(d.bytes()?.to_vec()).map_err(decode::Error::message)
  }
}

#[derive(Debug, Error, PartialEq)]
pub enum Error {
  #[error("invalid bech32: {0}")]
  Bech32(#[from] bech32::Error),
  #[error("byron addresses are not supported")]
  Byron,
  #[error("empty address")]
  Empty,
  #[error("expected {expected} address bytes, found {actual}")]
  Length { expected: usize, actual: usize },
  #[error("address should have `{expected}` prefix but has `{actual}`")]
  Prefix {
    expected: &'static str,
    actual: String,
  },
  #[error("unknown address type {0}")]
  Type(u8),
  #[error("addresses must use the bech32 variant")]
  Variant,
}

#[cfg(test)]
mod tests {
  use super::*;

  const ENTERPRISE: &str = "addr_test1vqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqd9tg5t";

  fn base(network: u8) -> Address {
    let mut bytes = vec![network];
    bytes.extend_from_slice(&[1; 28]);
    bytes.extend_from_slice(&[2; 28]);
    Address::from_bytes(bytes).unwrap()
  }

  #[test]
  fn bech32_round_trip() {
    for address in [base(0), base(1), test::address(9)] {
      assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
    }
  }

  #[test]
  fn prefixes() {
    assert!(base(1).to_string().starts_with("addr1"));
    assert!(base(0).to_string().starts_with("addr_test1"));

    let mut reward = vec![0xe1];
    reward.extend_from_slice(&[3; 28]);
    let reward = Address::from_bytes(reward).unwrap();
    assert!(reward.is_reward());
    assert!(reward.to_string().starts_with("stake1"));
    assert_eq!(reward.payment_part(), None);
    assert_eq!(reward.staking_part(), Some(&[3; 28][..]));
  }

  #[test]
  fn parts() {
    let address = base(0);
    assert_eq!(address.payment_part(), Some(&[1; 28][..]));
    assert_eq!(address.staking_part(), Some(&[2; 28][..]));
    assert_eq!(
      address.payment_credential(),
      Some(Credential::Key(Hash::new([1; 28])))
    );
    assert_eq!(test::address(5).staking_part(), None);
  }

  #[test]
  fn script_payment_credential() {
    let mut bytes = vec![0x70];
    bytes.extend_from_slice(&[4; 28]);
    assert_eq!(
      Address::from_bytes(bytes).unwrap().payment_credential(),
      Some(Credential::Script(Hash::new([4; 28])))
    );
  }

  #[test]
  fn reward_from_credential() {
    let credential = Credential::Script(Hash::new([6; 28]));
    let reward = Address::reward(0, &credential);
    assert_eq!(reward.as_bytes()[0], 0xf0);
    assert!(reward.to_string().starts_with("stake_test1"));
    assert_eq!(reward.staking_credential(), Some(credential));
    assert_eq!(
      base(0).staking_credential(),
      Some(Credential::Key(Hash::new([2; 28])))
    );
  }

  #[test]
  fn enterprise_parses() {
    let address = ENTERPRISE.parse::<Address>().unwrap();
    assert_eq!(address.as_bytes()[0], 0x60);
    assert_eq!(address.to_string(), ENTERPRISE);
  }

  #[test]
  fn invalid() {
    assert_eq!(Address::from_bytes(Vec::new()), Err(Error::Empty));
    assert_eq!(Address::from_bytes(vec![0x82, 0]), Err(Error::Byron));
    assert_eq!(
      Address::from_bytes(vec![0x60, 0]),
      Err(Error::Length {
        expected: 29,
        actual: 2
      })
    );
  }
}
