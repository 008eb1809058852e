use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Fee {
  #[arg(long, help = "Calculate the fee of a <SIZE> byte transaction.")]
  size: usize,
  #[arg(long, default_value_t = 0, help = "Add the price of <MEM> memory units.")]
  mem: u64,
  #[arg(long, default_value_t = 0, help = "Add the price of <STEPS> CPU steps.")]
  steps: u64,
  #[arg(
    long,
    default_value_t = 0,
    help = "Add the surcharge for <REFERENCE_SCRIPT_SIZE> bytes of reference scripts."
  )]
  reference_script_size: usize,
  #[arg(
    long,
    help = "Use protocol parameters from <SCENARIO>. [default: mainnet-like parameters]"
  )]
  scenario: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
  pub fee: i64,
  pub reference_script_fee: i64,
}

impl Fee {
  pub(crate) fn run(self) -> SubcommandResult {
    let params = match &self.scenario {
      Some(path) => Scenario::load(path)?.parameters,
      None => ProtocolParameters::default(),
    };

    Ok(Some(Box::new(self.output(&params))))
  }

  fn output(&self, params: &ProtocolParameters) -> Output {
    Output {
      fee: crate::fee::estimate_fee(
        params,
        self.size,
        ExUnits::new(self.mem, self.steps),
        self.reference_script_size,
      ),
      reference_script_fee: crate::fee::reference_script_fee(params, self.reference_script_size),
    }
  }
}
