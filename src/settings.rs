use super::*;

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
  fee_padding: i64,
  params_ttl_seconds: u64,
  permissive_change: bool,
}

impl Settings {
  const CONFIG_FILE: &'static str = "forge.yaml";
  const ENV_PREFIX: &'static str = "FORGE_";

  /// Settings from `options`, `FORGE_` environment variables and the config
  /// file, in that order of precedence.
  pub fn load(options: Options) -> anyhow::Result<Self> {
    Self::merge(
      options,
      env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value)))
        .filter_map(|(key, value)| {
          key
            .strip_prefix(Self::ENV_PREFIX)
            .map(|key| (key.into(), value))
        })
        .collect(),
    )
  }

  pub(crate) fn merge(options: Options, env: BTreeMap<String, OsString>) -> anyhow::Result<Self> {
    let config = Self::config(&options)?;

    Ok(Self {
      fee_padding: Self::setting_typed(
        options.fee_padding,
        &env,
        "FEE_PADDING",
        config.fee_padding,
        0,
      )?,
      params_ttl_seconds: Self::setting_typed(
        options.params_ttl_seconds,
        &env,
        "PARAMS_TTL_SECONDS",
        config.params_ttl_seconds,
        60,
      )?,
      permissive_change: Self::setting_typed(
        options.permissive_change.then_some(true),
        &env,
        "PERMISSIVE_CHANGE",
        config.permissive_change,
        false,
      )?,
    })
  }

  fn config(options: &Options) -> anyhow::Result<Config> {
    let path = match (&options.config, &options.config_dir) {
      (Some(path), _) => Some(path.clone()),
      (None, Some(dir)) => Some(dir.join(Self::CONFIG_FILE)).filter(|path| path.exists()),
      (None, None) => dirs::config_dir()
        .map(|dir| dir.join("forge").join(Self::CONFIG_FILE))
        .filter(|path| path.exists()),
    };

    let Some(path) = path else {
      return Ok(Config::default());
    };

    log::debug!("loading config from {}", path.display());

    serde_yaml::from_reader(
      File::open(&path).with_context(|| format!("failed to open config `{}`", path.display()))?,
    )
    .with_context(|| format!("failed to parse config `{}`", path.display()))
  }

  fn setting_typed<T>(
    arg_value: Option<T>,
    env: &BTreeMap<String, OsString>,
    env_key: &str,
    config_value: Option<T>,
    default_value: T,
  ) -> anyhow::Result<T>
  where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
  {
    if let Some(arg_value) = arg_value {
      return Ok(arg_value);
    }

    if let Some(env_value) = env.get(env_key) {
      let env_value = env_value
        .to_str()
        .ok_or_else(|| anyhow!("{}{env_key} is not valid unicode", Self::ENV_PREFIX))?;

      return env_value
        .parse()
        .with_context(|| anyhow!("failed to parse {}{env_key}", Self::ENV_PREFIX));
    }

    if let Some(config_value) = config_value {
      return Ok(config_value);
    }

    Ok(default_value)
  }

  pub fn fee_padding(&self) -> i64 {
    self.fee_padding
  }

  pub fn params_ttl(&self) -> Duration {
    Duration::from_secs(self.params_ttl_seconds)
  }

  pub fn permissive_change(&self) -> bool {
    self.permissive_change
  }

  /// Wrap `context` so protocol parameters are cached for the configured
  /// TTL.
  pub fn cached<C: ChainContext>(&self, context: C) -> CachedContext<C> {
    CachedContext::new(context, self.params_ttl())
  }
}
