use std::fs;
use std::io::{self, BufRead, Read};

use anyhow::Context;
use colored::Colorize;

use trustchain_ledger::{BlockHeader, ChainStatus, Ledger};
use trustchain_types::Digest;

use crate::cli::{AppendArgs, Cli, Command, DigestArgs, OutputFormat};
use crate::config::Settings;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli {
        command,
        ledger,
        key_file,
        config,
        format,
        ..
    } = cli;

    match command {
        // `digest` needs no ledger or key.
        Command::Digest(args) => cmd_digest(args),
        command => {
            let settings = Settings::resolve(ledger, key_file, config)?;
            let ledger = Ledger::new(settings.ledger, settings.key);
            match command {
                Command::Append(args) => cmd_append(&ledger, args, &format),
                Command::Verify(_) => cmd_verify(&ledger, &format),
                Command::Head(_) => cmd_head(&ledger, &format),
                Command::Digest(_) => unreachable!("handled above"),
            }
        }
    }
}

fn cmd_append(ledger: &Ledger, args: AppendArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut hashes = args.hashes;
    if args.stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("reading hashes from stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                hashes.push(line.to_string());
            }
        }
    }

    let header = ledger
        .append_block(&hashes)
        .context("appending block to audit ledger")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&header)?),
        OutputFormat::Text => {
            println!("{} Anchored block #{}", "✓".green().bold(), header.index);
            print_header(&header);
        }
    }
    Ok(())
}

fn cmd_verify(ledger: &Ledger, format: &OutputFormat) -> anyhow::Result<()> {
    let status = ledger.verify_chain().context("replaying audit ledger")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => print_status(&status),
    }

    if !status.ok {
        anyhow::bail!("chain verification failed after {} valid blocks", status.blocks);
    }
    Ok(())
}

fn cmd_head(ledger: &Ledger, format: &OutputFormat) -> anyhow::Result<()> {
    match ledger.last_header().context("reading ledger tail")? {
        None => match format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Text => println!("Ledger is empty (genesis state)."),
        },
        Some(header) => match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&header)?),
            OutputFormat::Text => {
                println!("Block #{} (verified tail)", header.index.to_string().bold());
                print_header(&header);
            }
        },
    }
    Ok(())
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    let data = match &args.file {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };
    println!("{}", Digest::from_bytes(&data).to_hex());
    Ok(())
}

fn print_header(header: &BlockHeader) {
    println!("  timestamp:  {}", render_ts(header.timestamp));
    println!("  prevHash:   {}", header.prev_hash.to_hex().dimmed());
    println!("  merkleRoot: {}", header.merkle_root.to_hex().yellow());
}

fn print_status(status: &ChainStatus) {
    if status.ok {
        println!(
            "{} Chain OK — {} block(s)",
            "✓".green().bold(),
            status.blocks.to_string().bold()
        );
    } else {
        println!(
            "{} Chain BROKEN — {} block(s) verified before failure",
            "✗".red().bold(),
            status.blocks.to_string().bold()
        );
    }
    if let Some(first) = status.first_ts {
        println!("  first: {}", render_ts(first));
    }
    if let Some(last) = status.last_ts {
        println!("  last:  {}", render_ts(last));
    }
}

fn render_ts(ts: u64) -> String {
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| format!("{} ({ts})", dt.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_else(|| ts.to_string())
}
