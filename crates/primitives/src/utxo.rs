use super::*;

/// An unspent output together with the reference that spends it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Utxo {
  pub input: TransactionInput,
  pub output: TransactionOutput,
}

impl Utxo {
  pub fn new(input: TransactionInput, output: TransactionOutput) -> Self {
    Self { input, output }
  }

  /// Identity of the UTXO, `<hex tx id>:<index>`.
  pub fn key(&self) -> String {
    self.input.to_string()
  }

  pub fn value(&self) -> &Value {
    &self.output.value
  }
}

impl<C> Encode<C> for Utxo {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(2)?.encode(&self.input)?.encode(&self.output)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Utxo {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 2, "utxo")?;
    Ok(Self {
      input: d.decode()?,
      output: d.decode()?,
    })
  }
}
