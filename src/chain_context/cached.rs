use super::*;

/// Source of the current time for cache expiry.
pub trait Clock: Send + Sync {
  /// Time elapsed since an arbitrary fixed epoch.
  fn now(&self) -> Duration;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> Duration {
    SystemTime::now()
      .duration_since(SystemTime::UNIX_EPOCH)
      .unwrap_or_default()
  }
}

/// Wraps a context, caching protocol parameters for `ttl`. Everything else
/// is passed through.
pub struct CachedContext<C, K = SystemClock> {
  cache: Mutex<Option<(Duration, ProtocolParameters)>>,
  clock: K,
  inner: C,
  ttl: Duration,
}

impl<C: ChainContext> CachedContext<C> {
  pub fn new(inner: C, ttl: Duration) -> Self {
    Self::with_clock(inner, ttl, SystemClock)
  }
}

impl<C: ChainContext, K: Clock> CachedContext<C, K> {
  pub fn with_clock(inner: C, ttl: Duration, clock: K) -> Self {
    Self {
      cache: Mutex::new(None),
      clock,
      inner,
      ttl,
    }
  }

  pub fn inner(&self) -> &C {
    &self.inner
  }
}

impl<C: ChainContext, K: Clock> ChainContext for CachedContext<C, K> {
  fn protocol_parameters(&self) -> anyhow::Result<ProtocolParameters> {
    let mut cache = self
      .cache
      .lock()
      .map_err(|err| anyhow!("protocol parameter cache poisoned: {err}"))?;

    let now = self.clock.now();

    if let Some((fetched, params)) = cache.as_ref() {
      if now.saturating_sub(*fetched) < self.ttl {
        return Ok(params.clone());
      }
    }

    log::debug!("fetching protocol parameters");

    let params = self.inner.protocol_parameters()?;

    *cache = Some((now, params.clone()));

    Ok(params)
  }

  fn utxo_from_ref(&self, input: &TransactionInput) -> anyhow::Result<Option<TransactionOutput>> {
    self.inner.utxo_from_ref(input)
  }

  fn utxos_at(&self, address: &Address) -> anyhow::Result<Vec<Utxo>> {
    self.inner.utxos_at(address)
  }

  fn evaluate_tx(&self, transaction: &[u8]) -> anyhow::Result<BTreeMap<String, ExUnits>> {
    self.inner.evaluate_tx(transaction)
  }

  fn submit_tx(&self, transaction: &Transaction) -> anyhow::Result<TransactionId> {
    self.inner.submit_tx(transaction)
  }
}
