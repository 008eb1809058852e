//! Transaction construction.
//!
//! A `TransactionBuilder` accumulates intents: inputs to spend, payments to
//! make, assets to mint or burn, scripts and datums to attach, certificates,
//! withdrawals and metadata. Registering an intent performs no computation.
//!
//! `TransactionBuilder::complete` then runs every step needed to turn the
//! intents into a balanced transaction, each step a method that takes and
//! returns the builder:
//!
//! - `select_inputs` picks inputs from the UTXO pool to cover payments, burns,
//!   deposits and a first fee estimate.
//! - `index_redeemers` points every redeemer at the position of its target in
//!   the final, sorted transaction fields.
//! - `select_collateral` sets aside a pure-coin UTXO when scripts are in play.
//! - `estimate_execution_units` builds a speculative copy of the transaction
//!   and asks the chain context for the execution units of its redeemers.
//! - `balance` iterates the fee to a fixed point and returns everything left
//!   over in a single change output.
//!
//! Fees are always measured on a full transaction with placeholder
//! witnesses, so the estimate tracks the exact encoding of the final
//! transaction.
//!
//! `complete` runs on a copy of the builder, so a failed build leaves the
//! accumulated intents untouched. On success the copy, including the inputs
//! it selected, replaces the builder.
//!
//! The final `build` step asserts the invariants a completed transaction
//! must satisfy, chiefly that value is conserved.

use super::*;

mod balance;
mod collateral;
mod execution_units;
mod redeemer_index;

/// Coin pledged when collateral is selected automatically.
pub const COLLATERAL_AMOUNT: i64 = 5 * COIN_VALUE;

/// What a redeemer unlocks, used to find its index once the transaction's
/// fields are final.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RedeemerTarget {
  Spend(TransactionInput),
  Mint(PolicyId),
  Cert(usize),
  Reward(Address),
}

impl RedeemerTarget {
  pub fn tag(&self) -> RedeemerTag {
    match self {
      Self::Spend(_) => RedeemerTag::Spend,
      Self::Mint(_) => RedeemerTag::Mint,
      Self::Cert(_) => RedeemerTag::Cert,
      Self::Reward(_) => RedeemerTag::Reward,
    }
  }
}

impl Display for RedeemerTarget {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Spend(input) => write!(f, "input {input}"),
      Self::Mint(policy_id) => write!(f, "policy {policy_id}"),
      Self::Cert(index) => write!(f, "certificate {index}"),
      Self::Reward(address) => write!(f, "withdrawal from {address}"),
    }
  }
}

#[derive(Clone)]
pub struct TransactionBuilder {
  certificates: Vec<Certificate>,
  change: Option<TransactionOutput>,
  change_addresses: Vec<Address>,
  collateral: Vec<Utxo>,
  collateral_return: Option<TransactionOutput>,
  context: Arc<dyn ChainContext>,
  datums: BTreeMap<DatumHash, PlutusData>,
  estimate_ex_units: bool,
  fee: i64,
  fee_padding: i64,
  input_addresses: Vec<Address>,
  inputs: Vec<Utxo>,
  metadata: AuxiliaryData,
  mints: Vec<Unit>,
  params: ProtocolParameters,
  payments: Vec<Payment>,
  permissive_change: bool,
  pool: Vec<Utxo>,
  redeemers: BTreeMap<RedeemerTarget, Redeemer>,
  reference_inputs: Vec<Utxo>,
  required_signers: BTreeSet<KeyHash>,
  scripts: BTreeMap<ScriptHash, Script>,
  total_collateral: Option<i64>,
  ttl: Option<u64>,
  used: BTreeSet<TransactionInput>,
  validity_start: Option<u64>,
  wallet: Option<Arc<dyn Wallet>>,
  withdrawals: BTreeMap<Address, i64>,
}

impl Debug for TransactionBuilder {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_struct("TransactionBuilder")
      .field("certificates", &self.certificates)
      .field("change", &self.change)
      .field("change_addresses", &self.change_addresses)
      .field("collateral", &self.collateral)
      .field("collateral_return", &self.collateral_return)
      .field("datums", &self.datums)
      .field("estimate_ex_units", &self.estimate_ex_units)
      .field("fee", &self.fee)
      .field("fee_padding", &self.fee_padding)
      .field("input_addresses", &self.input_addresses)
      .field("inputs", &self.inputs)
      .field("metadata", &self.metadata)
      .field("mints", &self.mints)
      .field("payments", &self.payments)
      .field("permissive_change", &self.permissive_change)
      .field("pool", &self.pool)
      .field("redeemers", &self.redeemers)
      .field("reference_inputs", &self.reference_inputs)
      .field("required_signers", &self.required_signers)
      .field("scripts", &self.scripts)
      .field("total_collateral", &self.total_collateral)
      .field("ttl", &self.ttl)
      .field("validity_start", &self.validity_start)
      .field("withdrawals", &self.withdrawals)
      .finish_non_exhaustive()
  }
}

impl TransactionBuilder {
  pub fn new(context: Arc<dyn ChainContext>) -> Self {
    Self {
      certificates: Vec::new(),
      change: None,
      change_addresses: Vec::new(),
      collateral: Vec::new(),
      collateral_return: None,
      context,
      datums: BTreeMap::new(),
      estimate_ex_units: false,
      fee: 0,
      fee_padding: 0,
      input_addresses: Vec::new(),
      inputs: Vec::new(),
      metadata: AuxiliaryData::default(),
      mints: Vec::new(),
      params: ProtocolParameters::default(),
      payments: Vec::new(),
      permissive_change: false,
      pool: Vec::new(),
      redeemers: BTreeMap::new(),
      reference_inputs: Vec::new(),
      required_signers: BTreeSet::new(),
      scripts: BTreeMap::new(),
      total_collateral: None,
      ttl: None,
      used: BTreeSet::new(),
      validity_start: None,
      wallet: None,
      withdrawals: BTreeMap::new(),
    }
  }

  pub fn from_settings(context: Arc<dyn ChainContext>, settings: &Settings) -> Self {
    let mut builder = Self::new(context);
    builder
      .set_fee_padding(settings.fee_padding())
      .set_permissive_change(settings.permissive_change());
    builder
  }

  /// Lovelace added to every fee estimate.
  pub fn set_fee_padding(&mut self, padding: i64) -> &mut Self {
    self.fee_padding = padding;
    self
  }

  /// Accept change below its output's minimum, logging a warning instead of
  /// failing.
  pub fn set_permissive_change(&mut self, permissive: bool) -> &mut Self {
    self.permissive_change = permissive;
    self
  }

  /// Make UTXOs available to input selection.
  pub fn add_loaded_utxos(&mut self, utxos: impl IntoIterator<Item = Utxo>) -> &mut Self {
    for utxo in utxos {
      if !self.pool.iter().any(|loaded| loaded.input == utxo.input) {
        self.pool.push(utxo);
      }
    }
    self
  }

  /// Load the UTXOs held at `address` into the pool. The address also
  /// receives change when no change address is set.
  pub fn add_input_address(&mut self, address: Address) -> Result<&mut Self> {
    let utxos = self.context.utxos_at(&address)?;
    log::debug!("loaded {} UTXOs from {address}", utxos.len());
    self.add_loaded_utxos(utxos);
    self.input_addresses.push(address);
    Ok(self)
  }

  /// Spend `utxo` whatever input selection decides.
  pub fn add_input(&mut self, utxo: Utxo) -> &mut Self {
    if self.used.insert(utxo.input) {
      self.inputs.push(utxo);
    } else {
      log::debug!("ignoring {} which is already in use", utxo.key());
    }
    self
  }

  /// Spend a script-locked `utxo` with `redeemer`.
  pub fn collect_from(&mut self, utxo: Utxo, redeemer: impl Into<RedeemerData>) -> &mut Self {
    let target = RedeemerTarget::Spend(utxo.input);
    self.add_input(utxo);
    self.register_redeemer(target, redeemer.into());
    self
  }

  /// Mint, or with a negative quantity burn, `unit`.
  pub fn mint(&mut self, unit: Unit, redeemer: Option<RedeemerData>) -> &mut Self {
    if let Some(redeemer) = redeemer {
      self.register_redeemer(RedeemerTarget::Mint(unit.policy_id), redeemer);
    }
    self.mints.push(unit);
    self
  }

  pub fn add_certificate(
    &mut self,
    certificate: Certificate,
    redeemer: Option<RedeemerData>,
  ) -> &mut Self {
    if let Some(redeemer) = redeemer {
      self.register_redeemer(RedeemerTarget::Cert(self.certificates.len()), redeemer);
    }
    self.certificates.push(certificate);
    self
  }

  pub fn add_withdrawal(
    &mut self,
    address: Address,
    lovelace: i64,
    redeemer: Option<RedeemerData>,
  ) -> &mut Self {
    if let Some(redeemer) = redeemer {
      self.register_redeemer(RedeemerTarget::Reward(address.clone()), redeemer);
    }
    self.withdrawals.insert(address, lovelace);
    self
  }

  pub fn pay(&mut self, payment: Payment) -> &mut Self {
    self.payments.push(payment);
    self
  }

  pub fn attach_datum(&mut self, datum: PlutusData) -> &mut Self {
    self.datums.insert(datum.hash(), datum);
    self
  }

  pub fn attach_script(&mut self, script: Script) -> &mut Self {
    self.scripts.insert(script.hash(), script);
    self
  }

  /// Reference `utxo` without spending it. Outputs already spent, pledged as
  /// collateral or referenced are ignored.
  pub fn add_reference_input(&mut self, utxo: Utxo) -> &mut Self {
    if self.used.insert(utxo.input) {
      self.reference_inputs.push(utxo);
    } else {
      log::debug!("ignoring reference to {} which is already in use", utxo.key());
    }
    self
  }

  /// Reference the output at `input`, looked up through the chain context.
  pub fn add_reference_input_by_ref(&mut self, input: TransactionInput) -> Result<&mut Self> {
    let output = self
      .context
      .utxo_from_ref(&input)?
      .ok_or_else(|| anyhow!("reference input {input} not found"))?;

    Ok(self.add_reference_input(Utxo::new(input, output)))
  }

  pub fn add_collateral(&mut self, utxo: Utxo) -> &mut Self {
    if self.used.insert(utxo.input) {
      self.collateral.push(utxo);
    }
    self
  }

  pub fn set_collateral_return(&mut self, output: TransactionOutput) -> &mut Self {
    self.collateral_return = Some(output);
    self
  }

  pub fn set_total_collateral(&mut self, lovelace: i64) -> &mut Self {
    self.total_collateral = Some(lovelace);
    self
  }

  pub fn add_required_signer(&mut self, key_hash: KeyHash) -> &mut Self {
    self.required_signers.insert(key_hash);
    self
  }

  pub fn set_ttl(&mut self, slot: u64) -> &mut Self {
    self.ttl = Some(slot);
    self
  }

  pub fn set_validity_start(&mut self, slot: u64) -> &mut Self {
    self.validity_start = Some(slot);
    self
  }

  /// Add a change address. Change goes to the first one set.
  pub fn set_change_address(&mut self, address: Address) -> &mut Self {
    self.change_addresses.push(address);
    self
  }

  pub fn add_metadata(&mut self, label: u64, metadatum: Metadatum) -> &mut Self {
    self.metadata.metadata.insert(label, metadatum);
    self
  }

  pub fn set_wallet(&mut self, wallet: Arc<dyn Wallet>) -> &mut Self {
    self.wallet = Some(wallet);
    self
  }

  pub fn inputs(&self) -> &[Utxo] {
    &self.inputs
  }

  pub fn redeemers(&self) -> impl Iterator<Item = (&RedeemerTarget, &Redeemer)> {
    self.redeemers.iter()
  }

  fn register_redeemer(&mut self, target: RedeemerTarget, redeemer: RedeemerData) {
    let ex_units = redeemer.ex_units.unwrap_or_default();

    if ex_units.is_zero() {
      self.estimate_ex_units = true;
    }

    self.redeemers.insert(
      target.clone(),
      Redeemer {
        tag: target.tag(),
        index: 0,
        data: redeemer.data,
        ex_units,
      },
    );
  }

  /// Select inputs, estimate the fee and balance the transaction.
  pub fn complete(&mut self) -> Result<Transaction> {
    self.complete_with(None)
  }

  /// Like `complete`, but with `fee` as the fee instead of an estimate.
  pub fn complete_exact(&mut self, fee: i64) -> Result<Transaction> {
    self.complete_with(Some(fee))
  }

  fn complete_with(&mut self, fixed_fee: Option<i64>) -> Result<Transaction> {
    let builder = self.clone().build_transaction(fixed_fee)?;

    let transaction = builder.build()?;

    log::info!(
      "built transaction {} spending {} inputs with fee {}",
      transaction.id(),
      transaction.body.inputs.len(),
      transaction.body.fee,
    );

    *self = builder;

    Ok(transaction)
  }

  fn build_transaction(self, fixed_fee: Option<i64>) -> Result<Self> {
    self
      .load_protocol_parameters()?
      .ensure_min_utxo()
      .select_inputs(fixed_fee)?
      .index_redeemers()?
      .select_collateral()
      .estimate_execution_units()?
      .balance(fixed_fee)
  }

  fn load_protocol_parameters(mut self) -> Result<Self> {
    self.params = self.context.protocol_parameters()?;
    Ok(self)
  }

  fn ensure_min_utxo(mut self) -> Self {
    for payment in &mut self.payments {
      payment.ensure_min_utxo(&self.params);
    }
    self
  }

  fn select_inputs(mut self, fixed_fee: Option<i64>) -> Result<Self> {
    self.change = None;

    self.fee = match fixed_fee {
      Some(fee) => fee,
      None => self.estimate_fee()?,
    };

    let mut pool = self
      .pool
      .iter()
      .filter(|utxo| !self.used.contains(&utxo.input))
      .cloned()
      .collect::<Vec<Utxo>>();

    pool.sort_by_key(|utxo| utxo.value().coin);

    let selected = coin_selection::select(&self.requested(), &self.provided(), &mut pool)?;

    for utxo in selected {
      self.used.insert(utxo.input);
      self.inputs.push(utxo);
    }

    Ok(self)
  }

  /// Sign `transaction` with the wallet, adding its vkey witnesses.
  pub fn sign(&self, transaction: &Transaction) -> Result<Transaction> {
    let wallet = self.wallet.as_ref().ok_or(Error::MissingWallet)?;

    let witness_set = wallet
      .sign(transaction)
      .map_err(|err| Error::Signing { err })?;

    let mut signed = transaction.clone();

    for witness in witness_set.vkey_witnesses {
      if !signed.witness_set.vkey_witnesses.contains(&witness) {
        signed.witness_set.vkey_witnesses.push(witness);
      }
    }

    Ok(signed)
  }

  pub fn submit(&self, transaction: &Transaction) -> Result<TransactionId> {
    Ok(self.context.submit_tx(transaction)?)
  }

  fn mint_value(&self) -> Value {
    self
      .mints
      .iter()
      .map(Unit::to_value)
      .sum::<Value>()
      .remove_zero_assets()
  }

  fn deposits(&self) -> i64 {
    self
      .certificates
      .iter()
      .filter(|certificate| matches!(certificate, Certificate::StakeRegistration(_)))
      .map(|_| self.params.key_deposit)
      .sum()
  }

  fn refunds(&self) -> i64 {
    self
      .certificates
      .iter()
      .filter(|certificate| matches!(certificate, Certificate::StakeDeregistration(_)))
      .map(|_| self.params.key_deposit)
      .sum()
  }

  /// Inputs, minted assets, withdrawals and deposit refunds.
  fn provided(&self) -> Value {
    let mut provided = self
      .inputs
      .iter()
      .map(|utxo| utxo.value().clone())
      .sum::<Value>();

    provided += &self.mint_value().split_signs().0;
    provided.coin += self.withdrawals.values().sum::<i64>() + self.refunds();

    provided
  }

  /// Payments, burned assets, the fee and deposits.
  fn requested(&self) -> Value {
    let mut requested = self.payments.iter().map(Payment::to_value).sum::<Value>();

    requested += &self.mint_value().split_signs().1;
    requested.coin += self.fee + self.deposits();

    requested
  }

  fn change_address(&self) -> Result<&Address> {
    self
      .change_addresses
      .first()
      .or(self.input_addresses.first())
      .ok_or(Error::MissingChangeAddress)
  }

  fn outputs(&self) -> Vec<TransactionOutput> {
    self
      .payments
      .iter()
      .map(Payment::to_output)
      .chain(self.change.clone())
      .collect()
  }

  fn languages(&self) -> BTreeSet<Language> {
    self
      .scripts
      .values()
      .chain(
        self
          .reference_inputs
          .iter()
          .filter_map(|utxo| utxo.output.script_ref.as_ref()),
      )
      .filter_map(Script::language)
      .collect()
  }

  fn reference_script_size(&self) -> usize {
    self
      .reference_inputs
      .iter()
      .filter_map(|utxo| utxo.output.script_ref.as_ref())
      .map(Script::size)
      .sum()
  }

  fn total_ex_units(&self) -> ExUnits {
    self.redeemers.values().map(|redeemer| redeemer.ex_units).sum()
  }

  fn auxiliary_data(&self) -> Option<AuxiliaryData> {
    (!self.metadata.is_empty()).then(|| self.metadata.clone())
  }

  /// Distinct keys expected to sign: payment keys of inputs and collateral,
  /// required signers, and key credentials of certificates and withdrawals.
  fn signer_count(&self) -> usize {
    let key = |credential: &Credential| match credential {
      Credential::Key(hash) => Some(*hash),
      Credential::Script(_) => None,
    };

    let mut signers = self
      .inputs
      .iter()
      .chain(&self.collateral)
      .filter_map(|utxo| utxo.output.address.payment_credential())
      .filter_map(|credential| key(&credential))
      .collect::<BTreeSet<KeyHash>>();

    signers.extend(self.required_signers.iter().copied());

    signers.extend(
      self
        .certificates
        .iter()
        .filter(|certificate| certificate.requires_witness())
        .filter_map(|certificate| key(certificate.credential())),
    );

    signers.extend(
      self
        .withdrawals
        .keys()
        .filter_map(Address::staking_credential)
        .filter_map(|credential| key(&credential)),
    );

    signers.len().max(1)
  }

  fn witness_set(&self) -> WitnessSet {
    let mut redeemers = self.redeemers.values().cloned().collect::<Vec<Redeemer>>();
    redeemers.sort_by_key(|redeemer| (redeemer.tag, redeemer.index));

    WitnessSet {
      vkey_witnesses: Vec::new(),
      scripts: self.scripts.values().cloned().collect(),
      plutus_data: self.datums.values().cloned().collect(),
      redeemers,
    }
  }

  fn body(&self, script_data_hash: Option<Hash<32>>) -> TransactionBody {
    TransactionBody {
      inputs: self.inputs.iter().map(|utxo| utxo.input).collect(),
      outputs: self.outputs(),
      fee: self.fee,
      ttl: self.ttl,
      certificates: self.certificates.clone(),
      withdrawals: self.withdrawals.clone(),
      auxiliary_data_hash: self.auxiliary_data().map(|data| data.hash()),
      validity_start: self.validity_start,
      mint: self.mint_value().assets,
      script_data_hash,
      collateral: self.collateral.iter().map(|utxo| utxo.input).collect(),
      required_signers: self.required_signers.clone(),
      network_id: None,
      collateral_return: self.collateral_return.clone(),
      total_collateral: self.total_collateral,
      reference_inputs: self.reference_inputs.iter().map(|utxo| utxo.input).collect(),
    }
  }

  /// The transaction as it would be built now, with placeholder vkey
  /// witnesses and script data hash standing in for the real ones.
  fn fake_transaction(&self) -> Transaction {
    let mut witness_set = self.witness_set();

    witness_set.vkey_witnesses = vec![VKeyWitness::placeholder(); self.signer_count()];

    let script_data_hash = (!witness_set.plutus_data.is_empty()
      || !witness_set.redeemers.is_empty())
    .then(Hash::default);

    Transaction {
      body: self.body(script_data_hash),
      witness_set,
      is_valid: true,
      auxiliary_data: self.auxiliary_data(),
    }
  }

  /// Encoded size of `transaction`, which must fit in a block.
  fn checked_size(&self, transaction: &Transaction) -> Result<usize> {
    let size = cbor::try_to_vec(transaction)
      .map_err(|source| Error::Encoding { source })?
      .len();

    if size > self.params.max_tx_size {
      return Err(Error::TransactionTooLarge {
        size,
        maximum: self.params.max_tx_size,
      });
    }

    Ok(size)
  }

  fn estimate_fee(&self) -> Result<i64> {
    let size = self.checked_size(&self.fake_transaction())?;

    let fee = fee::estimate_fee(
      &self.params,
      size,
      self.total_ex_units(),
      self.reference_script_size(),
    ) + self.fee_padding;

    tprintln!("estimated fee of {fee} for {size} bytes");

    Ok(fee)
  }

  fn build(&self) -> Result<Transaction> {
    let witness_set = self.witness_set();

    let script_data_hash =
      script_data_hash::script_data_hash(&self.params, &witness_set, &self.languages());

    let transaction = Transaction {
      body: self.body(script_data_hash),
      witness_set,
      is_valid: true,
      auxiliary_data: self.auxiliary_data(),
    };

    self.checked_size(&transaction)?;

    let mut consumed = self
      .inputs
      .iter()
      .map(|utxo| utxo.value().clone())
      .sum::<Value>();
    consumed += &self.mint_value();
    consumed.coin += self.withdrawals.values().sum::<i64>() + self.refunds();

    let mut produced = transaction
      .body
      .outputs
      .iter()
      .map(|output| output.value.clone())
      .sum::<Value>();
    produced.coin += transaction.body.fee + self.deposits();

    assert_eq!(consumed, produced, "invariant: value is conserved");

    assert_eq!(
      transaction.body.inputs.len(),
      self.inputs.len(),
      "invariant: inputs are spent once"
    );

    assert!(
      transaction
        .body
        .collateral
        .is_disjoint(&transaction.body.inputs),
      "invariant: collateral is not spent",
    );

    assert_eq!(
      transaction.body.script_data_hash.is_some(),
      !transaction.witness_set.plutus_data.is_empty()
        || !transaction.witness_set.redeemers.is_empty(),
      "invariant: script data hash is present iff there are datums or redeemers",
    );

    assert!(
      transaction
        .body
        .outputs
        .iter()
        .all(|output| output.value.is_non_negative()),
      "invariant: outputs are non-negative",
    );

    Ok(transaction)
  }
}
