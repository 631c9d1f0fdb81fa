use clap::Parser;
use std::path::PathBuf;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "sigflow")]
#[command(about = "Configuration-driven financial signal ETL pipeline")]
#[command(version)]
pub struct Args {
    /// Pipeline configuration file (YAML)
    #[arg(short, long, default_value = "config/signals.yaml", env = "SIGFLOW_CONFIG")]
    pub config: PathBuf,

    /// Run only the named signal
    #[arg(short, long)]
    pub signal: Option<String>,

    /// Data root for SQLite and file outputs [default: data]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory for rolling log files [default: logs]
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Secrets that must be present before any signal runs
    #[arg(long = "require-secret", env = "SIGFLOW_REQUIRED_SECRETS", value_delimiter = ',')]
    pub required_secrets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["sigflow"]).unwrap();
        assert!(args.signal.is_none());
        assert!(args.data_dir.is_none());
        assert!(args.log_dir.is_none());
    }

    #[test]
    fn test_required_secrets_list() {
        let args = Args::try_parse_from([
            "sigflow",
            "--require-secret",
            "FRED_API_KEY,COINGECKO_API_KEY",
        ])
        .unwrap();
        assert_eq!(args.required_secrets, vec!["FRED_API_KEY", "COINGECKO_API_KEY"]);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "sigflow",
            "--config",
            "etc/pipeline.yaml",
            "--signal",
            "bitcoin_price",
            "--data-dir",
            "/var/lib/sigflow",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("etc/pipeline.yaml"));
        assert_eq!(args.signal.as_deref(), Some("bitcoin_price"));
        assert_eq!(args.data_dir, Some(PathBuf::from("/var/lib/sigflow")));
    }
}
