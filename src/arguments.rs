use super::*;

#[derive(Debug, Parser)]
#[clap(name = "forge", version)]
pub struct Arguments {
  #[clap(flatten)]
  pub(crate) options: Options,
  #[clap(subcommand)]
  pub(crate) subcommand: Subcommand,
}

impl Arguments {
  pub fn run(self) -> SubcommandResult {
    let settings = Settings::load(self.options)?;
    self.subcommand.run(settings)
  }
}
