//! Helpers shared by the ledger type codecs.

use {super::*, std::convert::Infallible};

/// Tag wrapping CBOR-in-CBOR byte strings, used for inline datums and
/// script references.
pub const TAG_ENCODED_CBOR: u64 = 24;

/// Optional tag marking an array as a set.
pub const TAG_SET: u64 = 258;

/// Tag for post-Alonzo auxiliary data.
pub const TAG_AUXILIARY_DATA: u64 = 259;

/// Encode a value that may be rejected by its encoder, such as a value with
/// negative coin.
pub fn try_to_vec<T: Encode<()>>(value: &T) -> Result<Vec<u8>, encode::Error<Infallible>> {
  minicbor::to_vec(value)
}

/// Encode a value that is known to be encodable.
pub fn to_vec<T: Encode<()>>(value: &T) -> Vec<u8> {
  try_to_vec(value).expect("value should be encodable")
}

/// Decode a value, rejecting trailing bytes.
pub fn from_slice<'b, T: Decode<'b, ()>>(bytes: &'b [u8]) -> Result<T, decode::Error> {
  let mut decoder = Decoder::new(bytes);
  let value = decoder.decode()?;

  if decoder.position() != bytes.len() {
    return Err(decode::Error::message(format!(
      "{} trailing bytes",
      bytes.len() - decoder.position()
    )));
  }

  Ok(value)
}

/// Consume a set tag if one is present.
pub fn skip_set_tag(d: &mut Decoder) -> Result<(), decode::Error> {
  if d.datatype()? == Type::Tag {
    let position = d.position();
    if d.tag()?.as_u64() != TAG_SET {
      d.set_position(position);
    }
  }

  Ok(())
}

/// Decode a definite or indefinite array, calling `f` for each element.
pub fn decode_array<'b, T>(
  d: &mut Decoder<'b>,
  mut f: impl FnMut(&mut Decoder<'b>) -> Result<T, decode::Error>,
) -> Result<Vec<T>, decode::Error> {
  skip_set_tag(d)?;

  let mut items = Vec::new();

  match d.array()? {
    Some(len) => {
      for _ in 0..len {
        items.push(f(d)?);
      }
    }
    None => {
      while d.datatype()? != Type::Break {
        items.push(f(d)?);
      }
      d.set_position(d.position() + 1);
    }
  }

  Ok(items)
}

/// Decode a definite or indefinite map, calling `f` for each entry.
pub fn decode_map<'b, K, V>(
  d: &mut Decoder<'b>,
  mut f: impl FnMut(&mut Decoder<'b>) -> Result<(K, V), decode::Error>,
) -> Result<Vec<(K, V)>, decode::Error> {
  let mut entries = Vec::new();

  match d.map()? {
    Some(len) => {
      for _ in 0..len {
        entries.push(f(d)?);
      }
    }
    None => {
      while d.datatype()? != Type::Break {
        entries.push(f(d)?);
      }
      d.set_position(d.position() + 1);
    }
  }

  Ok(entries)
}

/// Decode a byte string that may be split into indefinite-length chunks.
pub fn decode_bytes(d: &mut Decoder) -> Result<Vec<u8>, decode::Error> {
  if d.datatype()? == Type::BytesIndef {
    let mut bytes = Vec::new();
    for chunk in d.bytes_iter()? {
      bytes.extend_from_slice(chunk?);
    }
    Ok(bytes)
  } else {
    Ok(d.bytes()?.to_vec())
  }
}

/// Decode the next item and return the raw bytes it spans.
pub fn raw<'b>(d: &mut Decoder<'b>) -> Result<&'b [u8], decode::Error> {
  let start = d.position();
  d.skip()?;
  Ok(&d.input()[start..d.position()])
}

/// Write bytes that are already valid CBOR.
pub fn write_raw<W: encode::Write>(
  e: &mut Encoder<W>,
  bytes: &[u8],
) -> Result<(), encode::Error<W::Error>> {
  e.writer_mut().write_all(bytes).map_err(encode::Error::write)
}

/// Check the length of a definite array against what a type expects.
pub fn expect_len(actual: Option<u64>, expected: u64, what: &str) -> Result<(), decode::Error> {
  match actual {
    Some(len) if len == expected => Ok(()),
    Some(len) => Err(decode::Error::message(format!(
      "{what}: expected array of length {expected}, found {len}"
    ))),
    None => Err(decode::Error::message(format!(
      "{what}: expected definite-length array"
    ))),
  }
}

/// Close an indefinite-length container opened while decoding.
pub fn end_indefinite(d: &mut Decoder, len: Option<u64>) -> Result<(), decode::Error> {
  if len.is_none() {
    if d.datatype()? != Type::Break {
      return Err(decode::Error::message("expected break"));
    }
    d.set_position(d.position() + 1);
  }
  Ok(())
}
