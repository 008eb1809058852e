use {super::*, std::collections::BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionBody {
  pub inputs: BTreeSet<TransactionInput>,
  pub outputs: Vec<TransactionOutput>,
  pub fee: i64,
  pub ttl: Option<u64>,
  pub certificates: Vec<Certificate>,
  pub withdrawals: BTreeMap<Address, i64>,
  pub auxiliary_data_hash: Option<Hash<32>>,
  pub validity_start: Option<u64>,
  pub mint: Assets,
  pub script_data_hash: Option<Hash<32>>,
  pub collateral: BTreeSet<TransactionInput>,
  pub required_signers: BTreeSet<KeyHash>,
  pub network_id: Option<u8>,
  pub collateral_return: Option<TransactionOutput>,
  pub total_collateral: Option<i64>,
  pub reference_inputs: BTreeSet<TransactionInput>,
}

impl TransactionBody {
  pub fn id(&self) -> TransactionId {
    blake2b_256(&cbor::to_vec(self))
  }
}

fn coin<W: encode::Write>(
  e: &mut Encoder<W>,
  coin: i64,
) -> Result<(), encode::Error<W::Error>> {
  let coin = u64::try_from(coin)
    .map_err(|_| encode::Error::message(format!("negative coin {coin}")))?;
  e.u64(coin)?;
  Ok(())
}

fn encode_inputs<W: encode::Write>(
  e: &mut Encoder<W>,
  inputs: &BTreeSet<TransactionInput>,
) -> Result<(), encode::Error<W::Error>> {
  e.array(inputs.len() as u64)?;
  for input in inputs {
    e.encode(input)?;
  }
  Ok(())
}

impl<C> Encode<C> for TransactionBody {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    let len = 3
      + u64::from(self.ttl.is_some())
      + u64::from(!self.certificates.is_empty())
      + u64::from(!self.withdrawals.is_empty())
      + u64::from(self.auxiliary_data_hash.is_some())
      + u64::from(self.validity_start.is_some())
      + u64::from(!self.mint.is_empty())
      + u64::from(self.script_data_hash.is_some())
      + u64::from(!self.collateral.is_empty())
      + u64::from(!self.required_signers.is_empty())
      + u64::from(self.network_id.is_some())
      + u64::from(self.collateral_return.is_some())
      + u64::from(self.total_collateral.is_some())
      + u64::from(!self.reference_inputs.is_empty());

    e.map(len)?;

    e.u8(0)?;
    encode_inputs(e, &self.inputs)?;

    e.u8(1)?.array(self.outputs.len() as u64)?;
    for output in &self.outputs {
      output.encode(e, ctx)?;
    }

    e.u8(2)?;
    coin(e, self.fee)?;

    if let Some(ttl) = self.ttl {
      e.u8(3)?.u64(ttl)?;
    }

    if !self.certificates.is_empty() {
      e.u8(4)?.array(self.certificates.len() as u64)?;
      for certificate in &self.certificates {
        certificate.encode(e, ctx)?;
      }
    }

    if !self.withdrawals.is_empty() {
      e.u8(5)?.map(self.withdrawals.len() as u64)?;
      for (address, amount) in &self.withdrawals {
        e.encode(address)?;
        coin(e, *amount)?;
      }
    }

    if let Some(hash) = &self.auxiliary_data_hash {
      e.u8(7)?.encode(hash)?;
    }

    if let Some(start) = self.validity_start {
      e.u8(8)?.u64(start)?;
    }

    if !self.mint.is_empty() {
      e.u8(9)?;
      value::encode_assets(&self.mint, true, e)?;
    }

    if let Some(hash) = &self.script_data_hash {
      e.u8(11)?.encode(hash)?;
    }

    if !self.collateral.is_empty() {
      e.u8(13)?;
      encode_inputs(e, &self.collateral)?;
    }

    if !self.required_signers.is_empty() {
      e.u8(14)?.array(self.required_signers.len() as u64)?;
      for signer in &self.required_signers {
        e.encode(signer)?;
      }
    }

    if let Some(network_id) = self.network_id {
      e.u8(15)?.u8(network_id)?;
    }

    if let Some(output) = &self.collateral_return {
      e.u8(16)?;
      output.encode(e, ctx)?;
    }

    if let Some(total) = self.total_collateral {
      e.u8(17)?;
      coin(e, total)?;
    }

    if !self.reference_inputs.is_empty() {
      e.u8(18)?;
      encode_inputs(e, &self.reference_inputs)?;
    }

    Ok(())
  }
}

fn decode_coin(d: &mut Decoder) -> Result<i64, decode::Error> {
  i64::try_from(d.u64()?).map_err(decode::Error::message)
}

fn decode_inputs(d: &mut Decoder) -> Result<BTreeSet<TransactionInput>, decode::Error> {
  Ok(cbor::decode_array(d, |d| d.decode())?.into_iter().collect())
}

impl<'b, C> Decode<'b, C> for TransactionBody {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    let mut body = Self::default();
    let mut seen = BTreeSet::new();

    cbor::decode_map(d, |d| {
      let key = d.u8()?;

      if !seen.insert(key) {
        return Err(decode::Error::message(format!(
          "duplicate transaction body key {key}"
        )));
      }

      match key {
        0 => body.inputs = decode_inputs(d)?,
        1 => body.outputs = cbor::decode_array(d, |d| d.decode())?,
        2 => body.fee = decode_coin(d)?,
        3 => body.ttl = Some(d.u64()?),
        4 => body.certificates = cbor::decode_array(d, |d| d.decode())?,
        5 => {
          body.withdrawals = cbor::decode_map(d, |d| Ok((d.decode()?, decode_coin(d)?)))?
            .into_iter()
            .collect()
        }
        7 => body.auxiliary_data_hash = Some(d.decode()?),
        8 => body.validity_start = Some(d.u64()?),
        9 => body.mint = value::decode_assets(d)?,
        11 => body.script_data_hash = Some(d.decode()?),
        13 => body.collateral = decode_inputs(d)?,
        14 => {
          body.required_signers = cbor::decode_array(d, |d| d.decode())?
            .into_iter()
            .collect()
        }
        15 => body.network_id = Some(d.u8()?),
        16 => body.collateral_return = Some(d.decode()?),
        17 => body.total_collateral = Some(decode_coin(d)?),
        18 => body.reference_inputs = decode_inputs(d)?,
        key => {
          return Err(decode::Error::message(format!(
            "unsupported transaction body key {key}"
          )))
        }
      }

      Ok(((), ()))
    })?;

    for key in [0, 1, 2] {
      if !seen.contains(&key) {
        return Err(decode::Error::message(format!(
          "transaction body missing key {key}"
        )));
      }
    }

    Ok(body)
  }
}

/// A verification key and its signature over the transaction id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct VKeyWitness {
  pub vkey: Vec<u8>,
  pub signature: Vec<u8>,
}

impl VKeyWitness {
  /// Witness with correctly sized zero bytes, used when measuring fees.
  pub fn placeholder() -> Self {
    Self {
      vkey: vec![0; 32],
      signature: vec![0; 64],
    }
  }

  pub fn key_hash(&self) -> KeyHash {
    blake2b_224(&self.vkey)
  }
}

impl<C> Encode<C> for VKeyWitness {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    _ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(2)?.bytes(&self.vkey)?.bytes(&self.signature)?;
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for VKeyWitness {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    cbor::expect_len(d.array()?, 2, "vkey witness")?;
    Ok(Self {
      vkey: d.bytes()?.to_vec(),
      signature: d.bytes()?.to_vec(),
    })
  }
}

struct IndefiniteList<'a, T>(&'a [T]);

impl<C, T: Encode<C>> Encode<C> for IndefiniteList<'_, T> {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.begin_array()?;
    for item in self.0 {
      item.encode(e, ctx)?;
    }
    e.end()?;
    Ok(())
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WitnessSet {
  pub vkey_witnesses: Vec<VKeyWitness>,
  pub scripts: Vec<Script>,
  pub plutus_data: Vec<PlutusData>,
  pub redeemers: Vec<Redeemer>,
}

impl WitnessSet {
  pub fn is_empty(&self) -> bool {
    self.vkey_witnesses.is_empty()
      && self.scripts.is_empty()
      && self.plutus_data.is_empty()
      && self.redeemers.is_empty()
  }

  fn scripts_with_tag(&self, tag: u8) -> impl Iterator<Item = &Script> {
    self
      .scripts
      .iter()
      .filter(move |script| script.type_tag() == tag)
  }

  /// Datums in their witness set encoding, an indefinite list.
  pub fn encode_plutus_data(&self) -> Vec<u8> {
    cbor::to_vec(&IndefiniteList(&self.plutus_data))
  }

  /// Redeemers in their witness set encoding, a definite list.
  pub fn encode_redeemers(&self) -> Vec<u8> {
    cbor::to_vec(&self.redeemers)
  }
}

impl<C> Encode<C> for WitnessSet {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    let script_keys = [(0, 1), (1, 3), (2, 6), (3, 7)]
      .into_iter()
      .filter(|(tag, _)| self.scripts_with_tag(*tag).next().is_some())
      .collect::<Vec<(u8, u8)>>();

    let len = u64::from(!self.vkey_witnesses.is_empty())
      + script_keys.len() as u64
      + u64::from(!self.plutus_data.is_empty())
      + u64::from(!self.redeemers.is_empty());

    let mut entries = Vec::new();

    if !self.vkey_witnesses.is_empty() {
      entries.push(0);
    }
    entries.extend(script_keys.iter().map(|(_, key)| *key));
    if !self.plutus_data.is_empty() {
      entries.push(4);
    }
    if !self.redeemers.is_empty() {
      entries.push(5);
    }
    entries.sort();

    e.map(len)?;

    for key in entries {
      e.u8(key)?;
      match key {
        0 => {
          e.array(self.vkey_witnesses.len() as u64)?;
          for witness in &self.vkey_witnesses {
            witness.encode(e, ctx)?;
          }
        }
        4 => IndefiniteList(&self.plutus_data).encode(e, ctx)?,
        5 => {
          e.array(self.redeemers.len() as u64)?;
          for redeemer in &self.redeemers {
            redeemer.encode(e, ctx)?;
          }
        }
        key => {
          let tag = script_keys
            .iter()
            .find(|(_, script_key)| *script_key == key)
            .map(|(tag, _)| *tag)
            .unwrap_or_default();
          let scripts = self.scripts_with_tag(tag).collect::<Vec<&Script>>();
          e.array(scripts.len() as u64)?;
          for script in scripts {
            script.encode_body(e)?;
          }
        }
      }
    }

    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for WitnessSet {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    let mut witness_set = Self::default();
    let mut scripts = BTreeMap::<u8, Vec<Script>>::new();

    cbor::decode_map(d, |d| {
      match d.u8()? {
        0 => witness_set.vkey_witnesses = cbor::decode_array(d, |d| d.decode())?,
        1 => {
          scripts.insert(
            0,
            cbor::decode_array(d, |d| Ok(Script::Native(cbor::raw(d)?.to_vec())))?,
          );
        }
        3 => {
          scripts.insert(
            1,
            cbor::decode_array(d, |d| Ok(Script::PlutusV1(cbor::decode_bytes(d)?)))?,
          );
        }
        4 => witness_set.plutus_data = cbor::decode_array(d, |d| d.decode())?,
        5 => witness_set.redeemers = cbor::decode_array(d, |d| d.decode())?,
        6 => {
          scripts.insert(
            2,
            cbor::decode_array(d, |d| Ok(Script::PlutusV2(cbor::decode_bytes(d)?)))?,
          );
        }
        7 => {
          scripts.insert(
            3,
            cbor::decode_array(d, |d| Ok(Script::PlutusV3(cbor::decode_bytes(d)?)))?,
          );
        }
        key => {
          return Err(decode::Error::message(format!(
            "unsupported witness set key {key}"
          )))
        }
      }
      Ok(((), ()))
    })?;

    witness_set.scripts = scripts.into_values().flatten().collect();

    Ok(witness_set)
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
  pub body: TransactionBody,
  pub witness_set: WitnessSet,
  pub is_valid: bool,
  pub auxiliary_data: Option<AuxiliaryData>,
}

impl Transaction {
  pub fn id(&self) -> TransactionId {
    self.body.id()
  }

  pub fn to_cbor(&self) -> Vec<u8> {
    cbor::to_vec(self)
  }

  pub fn from_cbor(bytes: &[u8]) -> Result<Self, decode::Error> {
    cbor::from_slice(bytes)
  }

  pub fn size(&self) -> usize {
    self.to_cbor().len()
  }
}

impl<C> Encode<C> for Transaction {
  fn encode<W: encode::Write>(
    &self,
    e: &mut Encoder<W>,
    ctx: &mut C,
  ) -> Result<(), encode::Error<W::Error>> {
    e.array(4)?;
    self.body.encode(e, ctx)?;
    self.witness_set.encode(e, ctx)?;
    e.bool(self.is_valid)?;
    match &self.auxiliary_data {
      Some(auxiliary_data) => auxiliary_data.encode(e, ctx)?,
      None => {
        e.null()?;
      }
    }
    Ok(())
  }
}

impl<'b, C> Decode<'b, C> for Transaction {
  fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
    let len = d.array()?;

    let body = d.decode()?;
    let witness_set = d.decode()?;

    let (is_valid, auxiliary_data) = match len {
      Some(3) => (true, decode_auxiliary_data(d)?),
      Some(4) => (d.bool()?, decode_auxiliary_data(d)?),
      len => {
        return Err(decode::Error::message(format!(
          "transaction: expected 3 or 4 elements, found {len:?}"
        )))
      }
    };

    Ok(Self {
      body,
      witness_set,
      is_valid,
      auxiliary_data,
    })
  }
}

fn decode_auxiliary_data(d: &mut Decoder) -> Result<Option<AuxiliaryData>, decode::Error> {
  if d.datatype()? == Type::Null {
    d.skip()?;
    Ok(None)
  } else {
    Ok(Some(d.decode()?))
  }
}
