use super::*;

pub mod build;
pub mod decode;
pub mod fee;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
  #[command(about = "Build a transaction from a scenario file")]
  Build(build::Build),
  #[command(about = "Decode a transaction")]
  Decode(decode::Decode),
  #[command(about = "Calculate a fee")]
  Fee(fee::Fee),
  #[command(about = "Display settings")]
  Settings,
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Build(build) => build.run(settings),
      Self::Decode(decode) => decode.run(),
      Self::Fee(fee) => fee.run(),
      Self::Settings => Ok(Some(Box::new(settings))),
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub type SubcommandResult = anyhow::Result<Option<Box<dyn Output>>>;

/// Summary of a transaction printed by `build` and `decode`.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
  pub id: TransactionId,
  pub fee: i64,
  pub inputs: Vec<TransactionInput>,
  pub outputs: Vec<TransactionOutput>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub reference_inputs: Vec<TransactionInput>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub collateral: Vec<TransactionInput>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub redeemers: Vec<Redeemer>,
  pub transaction: String,
}

impl From<&Transaction> for TransactionSummary {
  fn from(transaction: &Transaction) -> Self {
    Self {
      id: transaction.id(),
      fee: transaction.body.fee,
      inputs: transaction.body.inputs.iter().copied().collect(),
      outputs: transaction.body.outputs.clone(),
      reference_inputs: transaction.body.reference_inputs.iter().copied().collect(),
      collateral: transaction.body.collateral.iter().copied().collect(),
      redeemers: transaction.witness_set.redeemers.clone(),
      transaction: hex::encode(transaction.to_cbor()),
    }
  }
}
