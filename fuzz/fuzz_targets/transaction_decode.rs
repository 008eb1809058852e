#![no_main]

use {forge_primitives::Transaction, libfuzzer_sys::fuzz_target};

fuzz_target!(|input: &[u8]| {
  let Ok(transaction) = Transaction::from_cbor(input) else {
    return;
  };

  let encoded = transaction.to_cbor();

  assert_eq!(Transaction::from_cbor(&encoded).unwrap(), transaction);
});
