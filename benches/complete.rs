use {
  cardano_forge::{OfflineContext, Payment, TransactionBuilder},
  criterion::{criterion_group, criterion_main, BatchSize, Criterion},
  forge_primitives::{
    Address, Hash, ProtocolParameters, TransactionInput, TransactionOutput, Utxo, Value,
  },
  std::sync::Arc,
};

fn address(n: u8) -> Address {
  let mut bytes = vec![0x60];
  bytes.extend([n; 28]);
  Address::from_bytes(bytes).unwrap()
}

fn pool(count: u8) -> Vec<Utxo> {
  (0..count)
    .map(|n| {
      Utxo::new(
        TransactionInput::new(Hash::new([n; 32]), 0),
        TransactionOutput::new(address(1), Value::from_coin(i64::from(n) * 1_000_000 + 2_000_000)),
      )
    })
    .collect()
}

fn builder(utxos: &[Utxo], payments: u8) -> TransactionBuilder {
  let mut builder = TransactionBuilder::new(Arc::new(
    OfflineContext::new(ProtocolParameters::default()).with_utxos(utxos.iter().cloned()),
  ));

  builder
    .add_loaded_utxos(utxos.iter().cloned())
    .set_change_address(address(0xcc));

  for n in 0..payments {
    builder.pay(Payment::new(address(n + 2), 5_000_000));
  }

  builder
}

fn complete(c: &mut Criterion) {
  let utxos = pool(100);

  let mut group = c.benchmark_group("complete");

  for payments in [1, 10, 40] {
    group.bench_function(format!("{payments} payments"), |b| {
      b.iter_batched(
        || builder(&utxos, payments),
        |mut builder| builder.complete().unwrap(),
        BatchSize::SmallInput,
      )
    });
  }

  group.finish();
}

criterion_group!(benches, complete);
criterion_main!(benches);
