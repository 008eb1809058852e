#![no_main]

use {
  arbitrary::Arbitrary,
  cardano_forge::{OfflineContext, Payment, TransactionBuilder},
  forge_primitives::{
    Address, Hash, ProtocolParameters, TransactionInput, TransactionOutput, Utxo, Value,
  },
  libfuzzer_sys::fuzz_target,
  std::sync::Arc,
};

#[derive(Clone, Debug, Arbitrary)]
struct Input {
  utxos: Vec<u32>,
  payments: Vec<u32>,
  fee_padding: u16,
}

fn address(n: u8) -> Address {
  let mut bytes = vec![0x60];
  bytes.extend([n; 28]);
  Address::from_bytes(bytes).unwrap()
}

fuzz_target!(|input: Input| {
  let utxos = input
    .utxos
    .iter()
    .take(64)
    .enumerate()
    .map(|(i, lovelace)| {
      Utxo::new(
        TransactionInput::new(Hash::new([0; 32]), u32::try_from(i).unwrap()),
        TransactionOutput::new(address(1), Value::from_coin(i64::from(*lovelace))),
      )
    })
    .collect::<Vec<Utxo>>();

  let mut builder = TransactionBuilder::new(Arc::new(
    OfflineContext::new(ProtocolParameters::default()).with_utxos(utxos.clone()),
  ));

  builder
    .add_loaded_utxos(utxos)
    .set_change_address(address(0xcc))
    .set_fee_padding(i64::from(input.fee_padding));

  for lovelace in input.payments.iter().take(16) {
    builder.pay(Payment::new(address(2), i64::from(*lovelace)));
  }

  if let Ok(transaction) = builder.complete() {
    assert!(transaction.body.fee > 0);
  }
});
