use crate::config::{Config, ConfigError, ConfigPaths};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print config with secrets redacted
    #[arg(long)]
    pub print: bool,

    /// Print the config file path
    #[arg(long)]
    pub path: bool,

    /// Set a config value (dotted key=value)
    #[arg(long, value_name = "key=value")]
    pub set: Vec<String>,
}

pub fn run(args: &ConfigArgs, paths: &ConfigPaths) -> Result<(), ConfigError> {
    if args.path {
        println!("{}", paths.config_path.display());
        return Ok(());
    }

    let mut config = Config::load_or_create(paths)?;

    if !args.set.is_empty() {
        for assignment in &args.set {
            apply_set(&mut config, assignment)?;
        }
        config.validate()?;
        Config::write(paths, &config)?;
    }

    if args.print || args.set.is_empty() {
        let redacted = config.redacted();
        let output = toml::to_string_pretty(&redacted)?;
        println!("{output}");
    }

    Ok(())
}

fn apply_set(config: &mut Config, assignment: &str) -> Result<(), ConfigError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation("expected key=value for --set".into()))?;
    let value = value.trim();
    match key {
        "gateway.provider" => {
            config.gateway.provider = value.to_string();
        }
        "gateway.model" => {
            config.gateway.model = value.to_string();
        }
        "gateway.api_key" => {
            config.gateway.api_key = value.to_string();
        }
        "standup.display_name" => {
            config.standup.display_name = value.to_string();
        }
        "storage.export_dir" => {
            config.storage.export_dir = value.to_string();
        }
        other => {
            return Err(ConfigError::Validation(format!(
                "unknown config key: {other}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::apply_set;
    use crate::config::Config;

    #[test]
    fn apply_set_updates_known_keys() {
        let mut config = Config::default();
        apply_set(&mut config, "gateway.model=gemini-2.5-flash").unwrap();
        apply_set(&mut config, "standup.display_name=Ada").unwrap();
        assert_eq!(config.gateway.model, "gemini-2.5-flash");
        assert_eq!(config.standup.display_name, "Ada");
    }

    #[test]
    fn apply_set_rejects_unknown_key() {
        let mut config = Config::default();
        assert!(apply_set(&mut config, "gateway.bogus=x").is_err());
    }

    #[test]
    fn apply_set_requires_assignment() {
        let mut config = Config::default();
        assert!(apply_set(&mut config, "gateway.model").is_err());
    }
}
