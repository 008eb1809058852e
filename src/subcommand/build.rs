use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Build {
  #[arg(help = "Read transaction intents and chain state from <SCENARIO>.")]
  scenario: PathBuf,
  #[arg(long, help = "Pay exactly <FEE> lovelace, overriding the scenario's fee.")]
  fee: Option<i64>,
}

impl Build {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    let scenario = Scenario::load(&self.scenario)?;

    let context: Arc<dyn ChainContext> = Arc::new(settings.cached(scenario.context()));

    let mut builder = scenario.builder(context, &settings)?;

    let transaction = match self.fee.or(scenario.fee) {
      Some(fee) => builder.complete_exact(fee),
      None => builder.complete(),
    }
    .with_context(|| {
      format!(
        "failed to build transaction from `{}`",
        self.scenario.display()
      )
    })?;

    Ok(Some(Box::new(TransactionSummary::from(&transaction))))
  }
}
