use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Decode {
  #[arg(help = "Decode hex-encoded <TRANSACTION>, or read it from stdin when `-`.")]
  transaction: String,
}

impl Decode {
  pub(crate) fn run(self) -> SubcommandResult {
    let hex = if self.transaction == "-" {
      io::read_to_string(io::stdin()).context("failed to read transaction from stdin")?
    } else {
      self.transaction
    };

    let bytes = hex::decode(hex.trim()).context("transaction is not valid hex")?;

    let transaction = Transaction::from_cbor(&bytes).context("failed to decode transaction")?;

    Ok(Some(Box::new(TransactionSummary::from(&transaction))))
  }
}
