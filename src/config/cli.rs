use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "crop-predict")]
#[command(version)]
#[command(about = "Serves a pre-trained crop classifier over HTTP")]
pub struct CliConfig {
    #[arg(short, long, help = "TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Model artifact path [default: model.json]")]
    pub model_path: Option<String>,

    #[arg(long, help = "Address to bind [default: 127.0.0.1]")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port to listen on [default: 50001]")]
    pub port: Option<u16>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the TOML file if one was given, then applies flags set on the command line.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(model_path) = &self.model_path {
            config.model.path = model_path.clone();
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_flags() {
        let cli = CliConfig::parse_from(["crop-predict"]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.port(), 50001);
        assert_eq!(config.model_path(), "model.json");
    }

    #[test]
    fn test_flags_override_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 9000\nhost = \"0.0.0.0\"\n\n[model]\npath = \"a.json\"\n")
            .unwrap();
        let path = temp_file.path().to_str().unwrap();

        let cli = CliConfig::parse_from(["crop-predict", "--config", path, "--model-path", "b.json"]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.port(), 9000);
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.model_path(), "b.json");
    }
}
