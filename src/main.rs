use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use log::error;

use sequoia_openpgp as openpgp;
use openpgp::Result;
use openpgp::cert::CipherSuite;

use keystore_keygen::Config;
use keystore_keygen::DEFAULT_NAMES;
use keystore_keygen::parse_cipher_suite;
use keystore_keygen::render;

/// Generates OpenPGP key fixtures for keystore test suites.
///
/// Without a subcommand, keys are generated as with `generate`.
#[derive(Debug, Parser)]
#[command(author, version, about, args_conflicts_with_subcommands = true)]
struct Args {
    /// Logs more.  Use twice for debug output.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    generate: GenerateArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generates fresh keys and writes the key map.
    Generate(GenerateArgs),
    /// Checks that an existing key map is consistent.
    Verify(VerifyArgs),
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// The file to write the key map to.  It is overwritten.
    #[arg(short, long, default_value = "keymap.rs",
          value_hint = clap::ValueHint::FilePath)]
    output: PathBuf,

    /// Generates a key for NAME.  May be given multiple times.
    /// Defaults to the built-in list of names.
    #[arg(short = 'n', long = "name", value_name = "NAME")]
    names: Vec<String>,

    /// The cipher suite of the generated keys.
    #[arg(long, default_value = "cv25519", value_parser = parse_cipher_suite)]
    cipher_suite: CipherSuite,

    /// The number of keys to generate concurrently.  0 means one per
    /// CPU.
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,
}

#[derive(Debug, clap::Args)]
struct VerifyArgs {
    /// The key map to check.
    #[arg(default_value = "keymap.rs", value_hint = clap::ValueHint::FilePath)]
    keymap: PathBuf,
}

fn generate(args: GenerateArgs) -> Result<()> {
    let names: Vec<&str> = if args.names.is_empty() {
        DEFAULT_NAMES.to_vec()
    } else {
        args.names.iter().map(|n| n.as_str()).collect()
    };

    let mut config = Config::new();
    config.set_cipher_suite(args.cipher_suite).set_jobs(args.jobs);

    keystore_keygen::generate_keymap(&names[..], &config, &args.output)?;
    Ok(())
}

fn verify(args: VerifyArgs) -> Result<()> {
    let text = fs::read_to_string(&args.keymap)
        .with_context(|| format!("Reading {:?}", args.keymap))?;
    let table = render::parse(&text)
        .with_context(|| format!("Parsing {:?}", args.keymap))?;
    table.verify()?;
    log::info!("{:?}: all {} keys are consistent",
               args.keymap, table.len());
    Ok(())
}

fn run(args: Args) -> Result<()> {
    match args.command.unwrap_or(Command::Generate(args.generate)) {
        Command::Generate(args) => generate(args),
        Command::Verify(args) => verify(args),
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let logger_env = env_logger::Env::new()
        .filter_or("KEYSTORE_KEYGEN_LOG", default_filter)
        .write_style("KEYSTORE_KEYGEN_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(err) = run(args) {
        error!("Aborting");
        keystore_keygen::print_error_chain(&err);
        process::exit(1);
    }
}
