use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "trustchain",
    about = "TrustChain — append-only, HMAC-signed audit ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the ledger storage file
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    /// File holding the HMAC signing key
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    /// TOML configuration file (default: ./trustchain.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Anchor a batch of evidence hashes as a new signed block
    Append(AppendArgs),
    /// Replay the full ledger and report chain health
    Verify(VerifyArgs),
    /// Show the verified tail block
    Head(HeadArgs),
    /// Compute the SHA-256 transaction hash of a scan summary
    Digest(DigestArgs),
}

#[derive(Args)]
pub struct AppendArgs {
    /// Evidence hashes, 64 hex characters each
    pub hashes: Vec<String>,
    /// Additionally read hashes from stdin, one per line
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct HeadArgs {}

#[derive(Args)]
pub struct DigestArgs {
    /// File to digest; stdin when omitted
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_append() {
        let hash = "a".repeat(64);
        let cli = Cli::try_parse_from(["trustchain", "append", hash.as_str()]).unwrap();
        if let Command::Append(args) = cli.command {
            assert_eq!(args.hashes.len(), 1);
            assert!(!args.stdin);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_append_stdin() {
        let cli = Cli::try_parse_from(["trustchain", "append", "--stdin"]).unwrap();
        if let Command::Append(args) = cli.command {
            assert!(args.stdin);
            assert!(args.hashes.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["trustchain", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_head() {
        let cli = Cli::try_parse_from(["trustchain", "head"]).unwrap();
        assert!(matches!(cli.command, Command::Head(_)));
    }

    #[test]
    fn parse_digest_with_file() {
        let cli = Cli::try_parse_from(["trustchain", "digest", "summary.json"]).unwrap();
        if let Command::Digest(args) = cli.command {
            assert_eq!(args.file, Some(PathBuf::from("summary.json")));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_ledger_and_key_file() {
        let cli = Cli::try_parse_from([
            "trustchain",
            "verify",
            "--ledger",
            "/var/lib/tc/audit.dat",
            "--key-file",
            "/etc/tc/key",
        ])
        .unwrap();
        assert_eq!(cli.ledger, Some(PathBuf::from("/var/lib/tc/audit.dat")));
        assert_eq!(cli.key_file, Some(PathBuf::from("/etc/tc/key")));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["trustchain", "--verbose", "verify"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["trustchain", "--format", "json", "head"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
