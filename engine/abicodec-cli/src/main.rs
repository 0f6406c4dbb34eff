use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use abicodec::serde_support::to_json_pretty;
use abicodec::{AbiContext, AbiDef, AbiError, KeyError, PrivateKey, PublicKey, Signature};
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "abicodec", version, about = "ABI-driven JSON/binary conversion")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode JSON to binary, printed as uppercase hex
    Json2bin {
        #[command(flatten)]
        target: TargetArgs,
        /// Require struct fields in schema order
        #[arg(long)]
        strict: bool,
        /// JSON input file, or - for stdin
        file: PathBuf,
    },
    /// Decode hex-encoded binary and print JSON
    Bin2json {
        #[command(flatten)]
        target: TargetArgs,
        /// Hex input file, or - for stdin
        file: PathBuf,
    },
    /// Decode a hex-encoded binary ABI and print it as JSON
    Abi2json {
        /// Hex input file, or - for stdin
        file: PathBuf,
    },
    /// Encode a JSON ABI to binary, printed as uppercase hex
    Json2abi {
        /// JSON input file, or - for stdin
        file: PathBuf,
    },
    /// Check a key or signature and print its canonical form
    Key {
        /// PUB_/PVT_/SIG_ text, or a legacy EOS public key
        text: String,
    },
}

#[derive(Args, Debug)]
struct TargetArgs {
    /// ABI file, JSON or hex-encoded binary
    #[arg(long)]
    abi: PathBuf,
    /// Type to convert
    #[arg(long = "type", conflicts_with = "action", required_unless_present = "action")]
    type_name: Option<String>,
    /// Action whose argument struct to convert
    #[arg(long)]
    action: Option<String>,
    /// Contract account the ABI is installed under
    #[arg(long, default_value = "")]
    contract: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Codec(#[from] abicodec::Error),
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Json2bin {
            target,
            strict,
            file,
        } => cmd_json2bin(&target, strict, &file),
        Commands::Bin2json { target, file } => cmd_bin2json(&target, &file),
        Commands::Abi2json { file } => cmd_abi2json(&file),
        Commands::Json2abi { file } => cmd_json2abi(&file),
        Commands::Key { text } => cmd_key(&text),
    }
}

fn cmd_json2bin(target: &TargetArgs, strict: bool, path: &Path) -> Result<(), CliError> {
    let context = load_context(target)?;
    let type_name = resolve_type(&context, target)?;
    let json = read_input(path)?;
    let contract = Some(target.contract.as_str());
    let bin = if strict {
        context.json_to_bin(contract, Some(type_name.as_str()), Some(json.as_str()))?
    } else {
        context.json_to_bin_reorderable(contract, Some(type_name.as_str()), Some(json.as_str()))?
    };
    println!("{}", bin.to_hex());
    Ok(())
}

fn cmd_bin2json(target: &TargetArgs, path: &Path) -> Result<(), CliError> {
    let context = load_context(target)?;
    let type_name = resolve_type(&context, target)?;
    let hex = read_input(path)?;
    let json = context.hex_to_json(
        Some(target.contract.as_str()),
        Some(type_name.as_str()),
        Some(hex.trim()),
    )?;
    println!("{json}");
    Ok(())
}

fn cmd_abi2json(path: &Path) -> Result<(), CliError> {
    let bytes = hex::decode(read_input(path)?.trim())?;
    let abi = AbiDef::from_bin(&bytes)?;
    let json = to_json_pretty(&abi.to_jvalue()).map_err(AbiError::from)?;
    println!("{json}");
    Ok(())
}

fn cmd_json2abi(path: &Path) -> Result<(), CliError> {
    let abi = AbiDef::from_json(&read_input(path)?)?;
    println!("{}", hex::encode_upper(abi.to_bin()?));
    Ok(())
}

fn cmd_key(text: &str) -> Result<(), CliError> {
    let text = text.trim();
    let (kind, curve, canonical) = if text.starts_with("SIG_") {
        let signature: Signature = text.parse()?;
        ("signature", signature.key_type.suffix(), signature.to_string())
    } else if text.starts_with("PVT_") {
        let key: PrivateKey = text.parse()?;
        ("private_key", key.key_type.suffix(), key.to_string())
    } else {
        let key: PublicKey = text.parse()?;
        ("public_key", key.key_type.suffix(), key.to_string())
    };
    println!("{kind} {curve} {canonical}");
    Ok(())
}

/// ABI files starting with `{` are JSON; anything else is hex.
fn load_context(target: &TargetArgs) -> Result<AbiContext, CliError> {
    let text = fs::read_to_string(&target.abi)?;
    let text = text.trim();
    let contract = Some(target.contract.as_str());
    let mut context = AbiContext::new();
    if text.starts_with('{') {
        context.set_abi(contract, Some(text))?;
    } else {
        context.set_abi_hex(contract, Some(text))?;
    }
    debug!(abi = %target.abi.display(), contract = %target.contract, "loaded abi");
    Ok(context)
}

fn resolve_type(context: &AbiContext, target: &TargetArgs) -> Result<String, CliError> {
    match (&target.type_name, &target.action) {
        (Some(type_name), _) => Ok(type_name.clone()),
        (None, action) => Ok(context
            .get_type_for_action(Some(target.contract.as_str()), action.as_deref())?
            .to_string()),
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}
