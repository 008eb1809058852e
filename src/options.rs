use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
  #[arg(long, help = "Load configuration from <CONFIG>.")]
  pub(crate) config: Option<PathBuf>,
  #[arg(long, help = "Load configuration from <CONFIG_DIR>.")]
  pub(crate) config_dir: Option<PathBuf>,
  #[arg(
    long,
    help = "Add <FEE_PADDING> lovelace to every fee estimate. [default: 0]"
  )]
  pub(crate) fee_padding: Option<i64>,
  #[clap(long, short, help = "Specify output format. [default: json]")]
  pub(crate) format: Option<OutputFormat>,
  #[arg(
    long,
    help = "Cache protocol parameters for <PARAMS_TTL_SECONDS> seconds. [default: 60]"
  )]
  pub(crate) params_ttl_seconds: Option<u64>,
  #[arg(
    long,
    help = "Accept change below the minimum output value with a warning instead of failing."
  )]
  pub(crate) permissive_change: bool,
}
