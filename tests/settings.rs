use super::*;

#[test]
fn defaults() {
  let settings = CommandBuilder::new("settings").run_and_deserialize_output::<Settings>();

  assert_eq!(settings.fee_padding(), 0);
  assert_eq!(settings.params_ttl().as_secs(), 60);
  assert!(!settings.permissive_change());
}

#[test]
fn config_dir_file_is_loaded() {
  let settings = CommandBuilder::new("settings")
    .write("forge.yaml", "fee_padding: 7\nparams_ttl_seconds: 5\n")
    .run_and_deserialize_output::<Settings>();

  assert_eq!(settings.fee_padding(), 7);
  assert_eq!(settings.params_ttl().as_secs(), 5);
}

#[test]
fn config_option_is_loaded() {
  let tempdir = TempDir::new().unwrap();

  let config = tempdir.path().join("custom.yaml");

  fs::write(&config, "permissive_change: true").unwrap();

  let settings = CommandBuilder::new(format!("--config {} settings", config.to_str().unwrap()))
    .run_and_deserialize_output::<Settings>();

  assert!(settings.permissive_change());
}

#[test]
fn env_overrides_config() {
  let settings = CommandBuilder::new("settings")
    .write("forge.yaml", "fee_padding: 7\n")
    .env("FORGE_FEE_PADDING", "9")
    .run_and_deserialize_output::<Settings>();

  assert_eq!(settings.fee_padding(), 9);
}

#[test]
fn option_overrides_env() {
  let settings = CommandBuilder::new("--fee-padding 11 settings")
    .env("FORGE_FEE_PADDING", "9")
    .run_and_deserialize_output::<Settings>();

  assert_eq!(settings.fee_padding(), 11);
}

#[test]
fn invalid_env() {
  CommandBuilder::new("settings")
    .env("FORGE_PARAMS_TTL_SECONDS", "soon")
    .expected_exit_code(1)
    .expected_stderr(
      "error: failed to parse FORGE_PARAMS_TTL_SECONDS\n\nbecause:\n- invalid digit found in string\n",
    )
    .run_and_extract_stdout();
}

#[test]
fn config_not_found() {
  CommandBuilder::new("--config missing.yaml settings")
    .expected_exit_code(1)
    .stderr_regex("error: failed to open config `missing.yaml`\n.*")
    .run_and_extract_stdout();
}

#[test]
fn unknown_config_field() {
  CommandBuilder::new("settings")
    .write("forge.yaml", "fee_rate: 1\n")
    .expected_exit_code(1)
    .stderr_regex("error: failed to parse config `.*forge.yaml`\n.*unknown field `fee_rate`.*")
    .run_and_extract_stdout();
}
