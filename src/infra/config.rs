use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Default directory for result files (current directory if unset)
    pub output_dir: Option<PathBuf>,

    /// Default search settings
    pub search: SearchConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default pre-context window size
    pub pre_context: usize,
    /// Default post-context window size
    pub post_context: usize,
    /// Keep role tags in context output by default
    pub keep_annotations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: None,
            search: SearchConfig {
                pre_context: 1,
                post_context: 1,
                keep_annotations: false,
            },
        }
    }
}

pub fn load_config() -> Result<Config> {
    let mut builder = config::Config::builder();

    // Load from config files in priority order
    let config_paths = ["concord.toml", ".concord.toml"];

    for path in &config_paths {
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
            break;
        }
    }

    // Add environment variables with CONCORD_ prefix
    builder = builder.add_source(config::Environment::with_prefix("CONCORD").separator("_"));

    let cfg = builder.build().context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(args: InitArgs, ctx: &AppContext) -> Result<()> {
    let config_path = args.path.join("concord.toml");

    if config_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let toml_string = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&toml_string).unwrap();
        assert_eq!(parsed.search.pre_context, 1);
        assert_eq!(parsed.search.post_context, 1);
        assert!(!parsed.search.keep_annotations);
    }
}
