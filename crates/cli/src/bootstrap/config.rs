use shunt_dns_domain::config::CliOverrides;
use shunt_dns_domain::Config;

/// Load and validate the configuration.
///
/// Runs before the tracing subscriber is installed, so it must not log;
/// the caller reports the loaded configuration once logging is up.
pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;
    Ok(config)
}
