use super::*;

#[derive(Deserialize, Default, PartialEq, Debug)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
  pub(crate) fee_padding: Option<i64>,
  pub(crate) params_ttl_seconds: Option<u64>,
  pub(crate) permissive_change: Option<bool>,
}
