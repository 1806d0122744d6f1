use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use keyseal::audit::AuditLogger;
use keyseal::cli::{
    handle_decrypt_command, handle_encrypt_command, CliContext, DecryptArgs, EncryptArgs,
};
use keyseal::config::{KeysealPaths, Settings};

#[derive(Parser)]
#[command(
    name = "keyseal",
    version,
    about = "Seal short secrets with AES-256-GCM",
    long_about = "keyseal encrypts a piece of text into an .enc file and writes the \
                  key needed to recover it into a separate, owner-only .key file."
)]
struct Cli {
    /// Directory holding config.json and audit.log
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text and write the encrypted file and its key file
    #[command(alias = "seal")]
    Encrypt(EncryptArgs),

    /// Decrypt an encrypted file with its key file
    #[command(alias = "open")]
    Decrypt(DecryptArgs),

    /// Show current configuration and paths
    Config {
        /// Write the effective settings to config.json
        #[arg(long)]
        init: bool,
    },

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("keyseal={}", log_level(verbose))))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = match cli.home {
        Some(home) => KeysealPaths::with_base_dir(home),
        None => KeysealPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let ctx = CliContext::new(paths, settings);

    match cli.command {
        Commands::Encrypt(args) => {
            handle_encrypt_command(&ctx, args)?;
        }
        Commands::Decrypt(args) => {
            handle_decrypt_command(&ctx, args)?;
        }
        Commands::Config { init } => {
            if init {
                ctx.settings.save(&ctx.paths)?;
                println!("Settings written to {}", ctx.paths.settings_file().display());
                println!();
            }
            println!("keyseal Configuration");
            println!("=====================");
            println!("Base directory:   {}", ctx.paths.base_dir().display());
            println!("Settings file:    {}", ctx.paths.settings_file().display());
            println!("Audit log:        {}", ctx.paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  KDF iterations:       {}", ctx.settings.kdf_iterations);
            println!("  Encrypted extension:  .{}", ctx.settings.encrypted_extension);
            println!("  Key extension:        .{}", ctx.settings.key_extension);
            println!("  Audit enabled:        {}", ctx.settings.audit_enabled);
            println!("  Verify after encrypt: {}", ctx.settings.verify_after_encrypt);
        }
        Commands::Audit { limit } => {
            let logger = AuditLogger::new(ctx.paths.audit_log());
            let total = logger.entry_count()?;
            if total == 0 {
                println!("No audit entries.");
                return Ok(());
            }

            let entries = logger.read_recent(limit)?;
            println!("Showing {} of {} audit entries:", entries.len(), total);
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_verbosity() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(5), "debug");
    }

    #[test]
    fn test_force_flag_parses() {
        let cli = Cli::try_parse_from(["keyseal", "encrypt", "-t", "x", "-n", "notes", "--force"])
            .unwrap();
        match cli.command {
            Commands::Encrypt(args) => assert!(args.force),
            _ => panic!("expected encrypt"),
        }
    }
}
