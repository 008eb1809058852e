use super::*;

/// A key hash or script hash that controls funds or stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(tag = "type", content = "hash", rename_all = "snake_case")]
pub enum Credential {
  Key(KeyHash),
  Script(ScriptHash),
}

impl Credential {
  pub fn hash(&self) -> &Hash<28> {
    match self {
      Self::Key(hash) | Self::Script(hash) => hash,
    }
  }

  pub fn is_script(&self) -> bool {
    matches!(self, Self::Script(_))
  }
}

impl<C> Encode<C> for Credential {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    let kind = match self {
      Self::Key(_) => 0,
      Self::Script(_) => 1,
    };
    e.array(2)?.u8(kind)?.encode(self.hash())?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Credential {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 2, "credential")?;
    match d.u8()? {
      0 => Ok(Self::Key(d.decode()?)),
      1 => Ok(Self::Script(d.decode()?)),
      kind => Err(decode::Error::message(format!(
        "unknown credential type {kind}"
      ))),
    }
  }
}

/// Stake certificates. Pool and governance certificates are not modeled.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Certificate {
  StakeRegistration(Credential),
  StakeDeregistration(Credential),
  StakeDelegation { credential: Credential, pool: KeyHash },
}

impl Certificate {
  pub fn credential(&self) -> &Credential {
    match self {
      Self::StakeRegistration(credential)
      | Self::StakeDeregistration(credential)
      | Self::StakeDelegation { credential, .. } => credential,
    }
  }

  /// Whether the ledger demands a witness for the certificate's credential.
  /// Registration needs none.
  pub fn requires_witness(&self) -> bool {
    !matches!(self, Self::StakeRegistration(_))
  }
}

impl<C> Encode<C> for Certificate {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    match self {
      Self::StakeRegistration(credential) => {
        e.array(2)?.u8(0)?.encode(credential)?;
      }
      Self::StakeDeregistration(credential) => {
        e.array(2)?.u8(1)?.encode(credential)?;
      }
      Self::StakeDelegation { credential, pool } => {
        e.array(3)?.u8(2)?.encode(credential)?.encode(pool)?;
      }
    }
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Certificate {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    let len = d.array()?;
    match d.u8()? {
      0 => {
        cbor::expect_len(len, 2, "stake registration")?;
        Ok(Self::StakeRegistration(d.decode()?))
      }
      1 => {
        cbor::expect_len(len, 2, "stake deregistration")?;
        Ok(Self::StakeDeregistration(d.decode()?))
      }
      2 => {
        cbor::expect_len(len, 3, "stake delegation")?;
        Ok(Self::StakeDelegation {
          credential: d.decode()?,
          pool: d.decode()?,
        })
      }
      kind => Err(decode::Error::message(format!(
        "unsupported certificate type {kind}"
      ))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn credential_encoding() {
    let credential = Credential::Script(Hash::new([1; 28]));
    let encoded = cbor::to_vec(&credential);
    assert_eq!(&encoded[..3], [0x82, 0x01, 0x58]);
    assert_eq!(test::round_trip(&credential), credential);
  }

  #[test]
  fn certificates_round_trip() {
    let credential = Credential::Key(Hash::new([2; 28]));
    for certificate in [
      Certificate::StakeRegistration(credential),
      Certificate::StakeDeregistration(credential),
      Certificate::StakeDelegation {
        credential,
        pool: Hash::new([3; 28]),
      },
    ] {
      assert_eq!(test::round_trip(&certificate), certificate);
      assert_eq!(certificate.credential(), &credential);
    }
  }

  #[test]
  fn registration_needs_no_witness() {
    let credential = Credential::Key(Hash::new([2; 28]));
    assert!(!Certificate::StakeRegistration(credential).requires_witness());
    assert!(Certificate::StakeDeregistration(credential).requires_witness());
  }

  #[test]
  fn pool_certificates_are_unsupported() {
    assert!(minicbor::decode::<Certificate>(&[0x82, 0x03, 0x00]).is_err());
  }
}
