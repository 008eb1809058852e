use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum Error {
  #[snafu(display("{err}"))]
  Chain { err: anyhow::Error },
  #[snafu(display(
    "computed change of {change} lovelace is below the {minimum} lovelace minimum for its output"
  ))]
  ChangeBelowMinimum { change: i64, minimum: i64 },
  #[snafu(display("failed to encode transaction"))]
  Encoding {
    source: minicbor::encode::Error<std::convert::Infallible>,
  },
  #[snafu(display("execution unit estimation failed: {reason}"))]
  ExecutionUnitEstimationFailed { reason: String },
  #[snafu(display(
    "insufficient funds: {requested} lovelace requested but only {available} available"
  ))]
  InsufficientFunds { requested: i64, available: i64 },
  #[snafu(display("no change address or input address declared"))]
  MissingChangeAddress,
  #[snafu(display("missing {missing} of asset {asset_name} under policy {policy_id}"))]
  MissingRequiredAssets {
    policy_id: PolicyId,
    asset_name: AssetName,
    missing: i64,
  },
  #[snafu(display("no wallet set to sign with"))]
  MissingWallet,
  #[snafu(display("failed to sign transaction: {err}"))]
  Signing { err: anyhow::Error },
  #[snafu(display("transaction is {size} bytes but the maximum is {maximum}"))]
  TransactionTooLarge { size: usize, maximum: usize },
  #[snafu(display("unsupported: {message}"))]
  Unsupported { message: String },
}

impl From<anyhow::Error> for Error {
  fn from(err: anyhow::Error) -> Self {
    Self::Chain { err }
  }
}
