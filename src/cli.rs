use clap::Parser;
use std::path::PathBuf;

/// Eleven Setup: terminal setup form for the Eleven chat assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "eleven-setup")]
#[command(author = "Eleven Chats")]
#[command(version)]
#[command(about = "Set up your API key and model for the Eleven chat assistant", long_about = None)]
pub struct Cli {
    /// Directory holding the configuration store. Defaults to the platform
    /// config directory.
    #[arg(long, value_name = "DIR", env = "ELEVEN_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Keep the store in memory; nothing is written to disk
    #[arg(long, default_value_t = false)]
    pub ephemeral: bool,

    /// Remove any stored configuration and exit
    #[arg(long, default_value_t = false)]
    pub reset: bool,

    /// Print the stored configuration state and exit (API key masked)
    #[arg(long, default_value_t = false)]
    pub show: bool,

    /// Log file path. Defaults to eleven-setup.log next to the store.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["eleven-setup"]);
        assert_eq!(cli.config_dir, None);
        assert!(!cli.ephemeral);
        assert!(!cli.reset);
        assert!(!cli.show);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "eleven-setup",
            "--config-dir",
            "/tmp/eleven",
            "--ephemeral",
            "--show",
        ]);
        assert_eq!(cli.config_dir.as_deref(), Some(std::path::Path::new("/tmp/eleven")));
        assert!(cli.ephemeral);
        assert!(cli.show);
    }
}
