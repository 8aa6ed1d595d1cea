use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

/// Environment variable naming the ledger storage file.
pub const ENV_LEDGER: &str = "TRUSTCHAIN_LEDGER";
/// Environment variable naming the HMAC key file.
pub const ENV_KEY_FILE: &str = "TRUSTCHAIN_KEY_FILE";

/// Config file consulted when `--config` is not given.
const DEFAULT_CONFIG: &str = "trustchain.toml";
/// Storage location used when nothing else names one.
const DEFAULT_LEDGER: &str = "data/trustchain.dat";

/// Shape of the optional TOML configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub ledger: Option<PathBuf>,
    pub key_file: Option<PathBuf>,
}

impl ConfigFile {
    fn parse(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parsing configuration")
    }
}

/// Resolved runtime settings: storage path plus signing key material.
///
/// Resolution order is flags, then environment, then config file, then
/// defaults. The key has no default — it is read from a file (never from
/// argv) and a missing key is a configuration error, not a fallback.
#[derive(Debug)]
pub struct Settings {
    pub ledger: PathBuf,
    pub key: Vec<u8>,
}

impl Settings {
    pub fn resolve(
        ledger_flag: Option<PathBuf>,
        key_file_flag: Option<PathBuf>,
        config_flag: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let file = load_config_file(config_flag)?;

        let ledger = ledger_flag
            .or_else(|| env::var_os(ENV_LEDGER).map(PathBuf::from))
            .or(file.ledger)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER));

        let key_path = key_file_flag
            .or_else(|| env::var_os(ENV_KEY_FILE).map(PathBuf::from))
            .or(file.key_file);
        let Some(key_path) = key_path else {
            bail!(
                "no signing key configured; pass --key-file, set {ENV_KEY_FILE}, \
                 or add key_file to trustchain.toml"
            );
        };

        let key = read_key(&key_path)?;
        Ok(Self { ledger, key })
    }
}

fn load_config_file(flag: Option<PathBuf>) -> anyhow::Result<ConfigFile> {
    let (path, required) = match flag {
        Some(path) => (path, true),
        None => (PathBuf::from(DEFAULT_CONFIG), false),
    };
    match fs::read_to_string(&path) {
        Ok(text) => {
            ConfigFile::parse(&text).with_context(|| format!("in {}", path.display()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound && !required => Ok(ConfigFile::default()),
        Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
    }
}

/// Read the key file, trimming a trailing line terminator that editors and
/// `echo` leave behind.
fn read_key(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut key = fs::read(path).with_context(|| format!("reading key file {}", path.display()))?;
    while matches!(key.last(), Some(b'\n') | Some(b'\r')) {
        key.pop();
    }
    if key.is_empty() {
        bail!("key file {} is empty", path.display());
    }
    Ok(key)
}
