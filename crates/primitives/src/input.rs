use super::*;

/// A reference to an output of a previous transaction.
///
/// The string form is the transaction id in hex followed by `:INDEX`, and is
/// used as the key that identifies a UTXO.
#[derive(
  Debug,
  PartialEq,
  Copy,
  Clone,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Hash,
  DeserializeFromStr,
  SerializeDisplay,
)]
pub struct TransactionInput {
  pub transaction_id: TransactionId,
  pub index: u32,
}

impl TransactionInput {
  pub fn new(transaction_id: TransactionId, index: u32) -> Self {
    Self {
      transaction_id,
      index,
    }
  }
}

impl Display for TransactionInput {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}:{}", self.transaction_id, self.index)
  }
}

impl FromStr for TransactionInput {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (transaction_id, index) = s.rsplit_once(':').ok_or_else(|| Error::Colon(s.into()))?;

    Ok(Self {
      transaction_id: transaction_id
        .parse()
        .map_err(|err| Error::TransactionId {
          transaction_id: transaction_id.into(),
          err,
        })?,
      index: index.parse().map_err(|err| Error::Index {
        index: index.into(),
        err,
      })?,
    })
  }
}

impl<C> Encode<C> for TransactionInput {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(2)?;
    self.transaction_id.encode(e, ctx)?;
    e.u32(self.index)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for TransactionInput {
  fn decode(d: &mut Decoder<'b>, ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 2, "transaction input")?;
    Ok(Self {
      transaction_id: TransactionId::decode(d, ctx)?,
      index: d.u32()?,
    })
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("input `{0}` missing colon")]
  Colon(String),
  #[error("input index `{index}` invalid: {err}")]
  Index { index: String, err: ParseIntError },
  #[error("input transaction id `{transaction_id}` invalid: {err}")]
  TransactionId {
    transaction_id: String,
    err: hash::Error,
  },
}
