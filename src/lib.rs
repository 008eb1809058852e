#![allow(
  clippy::large_enum_variant,
  clippy::result_large_err,
  clippy::too_many_arguments,
  clippy::type_complexity
)]
#![deny(
  clippy::cast_lossless,
  clippy::cast_possible_truncation,
  clippy::cast_possible_wrap,
  clippy::cast_sign_loss
)]

use {
  self::{
    arguments::Arguments,
    config::Config,
    payment::RedeemerData,
    scenario::Scenario,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  anyhow::{anyhow, Context},
  clap::{Parser, ValueEnum},
  forge_primitives::{
    blake2b_256, cbor, Address, AssetName, AuxiliaryData, Certificate, Credential, Datum,
    DatumHash, ExUnits, Hash, KeyHash, Language, Metadatum, PlutusData, PolicyId,
    ProtocolParameters, Redeemer, RedeemerTag, Script, ScriptHash, Transaction, TransactionBody,
    TransactionId, TransactionInput, TransactionOutput, Utxo, VKeyWitness, Value, WitnessSet,
    COIN_VALUE,
  },
  serde::{Deserialize, Serialize},
  snafu::Snafu,
  std::{
    collections::{BTreeMap, BTreeSet},
    env,
    ffi::OsString,
    fmt::{self, Debug, Display, Formatter},
    fs::File,
    io,
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime},
  },
};

pub use self::{
  chain_context::{CachedContext, ChainContext, Clock, OfflineContext, SystemClock},
  error::Error,
  options::Options,
  payment::{Payment, Unit},
  settings::Settings,
  transaction_builder::{RedeemerTarget, TransactionBuilder},
  wallet::Wallet,
};

#[macro_use]
mod macros;


#[cfg(test)]
use self::test::*;

pub mod arguments;
pub mod chain_context;
mod coin_selection;
mod config;
mod error;
pub mod fee;
pub mod options;
pub mod payment;
pub mod scenario;
pub mod script_data_hash;
pub mod settings;
pub mod subcommand;
pub mod transaction_builder;
pub mod wallet;

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn default<T: Default>() -> T {
  Default::default()
}

pub fn main() {
  env_logger::init();

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      for (i, err) in err.chain().skip(1).enumerate() {
        if i == 0 {
          eprintln!();
          eprintln!("because:");
        }

        eprintln!("- {err}");
      }

      if env::var_os("RUST_BACKTRACE")
        .map(|val| val == "1")
        .unwrap_or_default()
      {
        eprintln!("{}", err.backtrace());
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
