//! cipherkit - command-line front end
//!
//! Usage:
//!   cipherkit encrypt -a caesar -k 3 "attack at dawn"
//!   cipherkit decrypt -a aes -k <key> "CBC/b64:..."
//!   cipherkit keygen -a hill
//!   cipherkit algorithms [--json]
//!   cipherkit strength <key>
//!   cipherkit rsa keygen | encrypt | decrypt
//!   cipherkit config init | show

use cipherkit::{
    config::Config,
    crypto::{AesMode, OutputFormat},
    descriptors,
    keygen::generate_key,
    rsa::{self, KeyPair, PrivateKey, PublicKey},
    strength, Algorithm, Error, Operation, Result,
};
use clap::{Args, Parser, Subcommand};
use num_bigint::BigUint;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "cipherkit")]
#[command(author = "cipherkit Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classical, positional and modern ciphers")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt text
    Encrypt(CipherArgs),

    /// Decrypt text
    Decrypt(CipherArgs),

    /// Generate a random key for an algorithm
    Keygen {
        /// Algorithm name or slug
        #[arg(short, long)]
        algorithm: String,
    },

    /// List algorithms and their key formats
    Algorithms {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rate the strength of a key
    Strength {
        /// Key to rate
        key: String,
    },

    /// Raw RSA operations
    Rsa {
        #[command(subcommand)]
        command: RsaCommands,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
struct CipherArgs {
    /// Algorithm name or slug (see `cipherkit algorithms`)
    #[arg(short, long)]
    algorithm: String,

    /// Key
    #[arg(short, long)]
    key: Option<String>,

    /// Read the key from a file
    #[arg(long, conflicts_with = "key")]
    key_file: Option<PathBuf>,

    /// Prompt for the key without echo
    #[arg(long, conflicts_with_all = ["key", "key_file"])]
    prompt_key: bool,

    /// AES mode (cbc, ctr, gcm)
    #[arg(long)]
    mode: Option<String>,

    /// AES output format (base64, hex)
    #[arg(long)]
    format: Option<String>,

    /// Read input from a file instead of TEXT or stdin
    #[arg(short, long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Write the result to a file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input text (stdin when omitted)
    text: Option<String>,
}

#[derive(Subcommand)]
enum RsaCommands {
    /// Generate a key pair
    Keygen {
        /// First prime
        #[arg(long, requires = "q")]
        p: Option<u64>,

        /// Second prime
        #[arg(long, requires = "p")]
        q: Option<u64>,

        /// Use two random primes
        #[arg(long, conflicts_with_all = ["p", "q"])]
        random: bool,

        /// Bits per random prime
        #[arg(long, requires = "random")]
        bits: Option<u64>,
    },

    /// Encrypt text with a public key
    Encrypt {
        /// Public exponent
        #[arg(long)]
        e: String,

        /// Modulus
        #[arg(long)]
        n: String,

        /// Encrypt as one integer instead of blocks
        #[arg(long)]
        single: bool,

        text: String,
    },

    /// Decrypt ciphertext integers with a private key
    Decrypt {
        /// Private exponent
        #[arg(long)]
        d: String,

        /// Modulus
        #[arg(long)]
        n: String,

        /// Ciphertext is one integer rather than blocks
        #[arg(long)]
        single: bool,

        #[arg(required = true)]
        blocks: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .as_ref()
        .map(expand_tilde)
        .unwrap_or_else(Config::default_path);

    let config = Config::load_or_default(&config_path);

    // Setup logging; RUST_LOG wins over --verbose and the configured level
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config
            .as_ref()
            .map(|c| c.logging.level.clone())
            .unwrap_or_else(|_| "info".to_string())
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let result = config.and_then(|config| run_command(cli.command, &config, &config_path));
    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_command(command: Commands, config: &Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Encrypt(args) => cmd_cipher(config, Operation::Encrypt, args),
        Commands::Decrypt(args) => cmd_cipher(config, Operation::Decrypt, args),
        Commands::Keygen { algorithm } => cmd_keygen(config, &algorithm),
        Commands::Algorithms { json } => cmd_algorithms(json),
        Commands::Strength { key } => cmd_strength(&key),
        Commands::Rsa { command } => match command {
            RsaCommands::Keygen { p, q, random, bits } => cmd_rsa_keygen(config, p, q, random, bits),
            RsaCommands::Encrypt { e, n, single, text } => cmd_rsa_encrypt(&e, &n, single, &text),
            RsaCommands::Decrypt {
                d,
                n,
                single,
                blocks,
            } => cmd_rsa_decrypt(&d, &n, single, &blocks),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init { force } => cmd_config_init(config_path, force),
            ConfigCommands::Show => cmd_config_show(config, config_path),
        },
    }
}

fn cmd_cipher(config: &Config, operation: Operation, args: CipherArgs) -> Result<()> {
    let algorithm: Algorithm = args.algorithm.parse()?;

    let mut options = config.cipher_options();
    if let Some(mode) = &args.mode {
        options.aes_mode = mode.parse::<AesMode>()?;
    }
    if let Some(format) = &args.format {
        options.output_format = format.parse::<OutputFormat>()?;
    }

    let key = read_key(&args)?;
    let text = read_input(args.text, args.input.as_deref())?;

    debug!("{} {} ({} bytes of input)", algorithm, operation, text.len());
    let result = algorithm.run(operation, &text, key.as_deref(), &options)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &result)?;
            info!("Wrote {} bytes to {:?}", result.len(), path);
        }
        None => println!("{}", result),
    }

    Ok(())
}

/// Resolve the key from `--key`, `--key-file` or `--prompt-key`
fn read_key(args: &CipherArgs) -> Result<Option<String>> {
    if let Some(key) = &args.key {
        return Ok(Some(key.clone()));
    }

    if let Some(path) = &args.key_file {
        let key = std::fs::read_to_string(path)
            .map_err(|e| Error::InvalidKey(format!("Failed to read key file: {}", e)))?;
        return Ok(Some(key.trim_end_matches(['\r', '\n']).to_string()));
    }

    if args.prompt_key {
        let key = rpassword::prompt_password("Enter key: ")?;
        return Ok(Some(key));
    }

    Ok(None)
}

/// Input text from the argument, a file, or stdin
fn read_input(text: Option<String>, input: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = input {
        return std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(format!("Failed to read input file {:?}: {}", path, e))
        });
    }

    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf)?;
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn cmd_keygen(config: &Config, algorithm: &str) -> Result<()> {
    let algorithm: Algorithm = algorithm.parse()?;
    let key = generate_key(algorithm, &config.keygen_options(), &mut rand::thread_rng())?;

    println!("{}", key);
    Ok(())
}

fn cmd_algorithms(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(descriptors())?);
        return Ok(());
    }

    println!("{:<22} {:<18} {:<5} Key format", "Algorithm", "Slug", "Key");
    println!("{}", "-".repeat(80));
    for d in descriptors() {
        println!(
            "{:<22} {:<18} {:<5} {}",
            d.name,
            d.slug,
            if d.key_required { "yes" } else { "no" },
            d.format_hint
        );
    }

    Ok(())
}

fn cmd_strength(key: &str) -> Result<()> {
    let assessment = strength::assess(key);
    println!("Score: {}/100 ({})", assessment.score, assessment.rating);
    Ok(())
}

fn cmd_rsa_keygen(
    config: &Config,
    p: Option<u64>,
    q: Option<u64>,
    random: bool,
    bits: Option<u64>,
) -> Result<()> {
    let pair = if random {
        let bits = bits.unwrap_or(config.rsa.random_prime_bits);
        info!("Generating RSA key pair from two {}-bit primes", bits);
        KeyPair::random(bits, &mut rand::thread_rng())?
    } else {
        let p = p.unwrap_or(config.rsa.p);
        let q = q.unwrap_or(config.rsa.q);
        rsa::generate_keys(&BigUint::from(p), &BigUint::from(q))?
    };

    println!("Public key (e,n):  {}", pair.public);
    println!("Private key (d,n): {}", pair.private);
    Ok(())
}

fn cmd_rsa_encrypt(e: &str, n: &str, single: bool, text: &str) -> Result<()> {
    let key: PublicKey = format!("{},{}", e, n).parse()?;

    if single {
        println!("{}", rsa::encrypt_text(text, &key)?);
    } else {
        let blocks = rsa::encrypt_blocks(text, &key)?;
        println!("{}", rsa::text::format_blocks(&blocks));
    }

    Ok(())
}

fn cmd_rsa_decrypt(d: &str, n: &str, single: bool, blocks: &[String]) -> Result<()> {
    let key: PrivateKey = format!("{},{}", d, n).parse()?;
    let blocks = rsa::text::parse_blocks(&blocks.join(" "))?;

    let text = if single {
        match blocks.as_slice() {
            [c] => rsa::decrypt_text(c, &key)?,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "--single expects exactly one ciphertext integer, got {}",
                    blocks.len()
                )))
            }
        }
    } else {
        rsa::decrypt_blocks(&blocks, &key)?
    };

    println!("{}", text);
    Ok(())
}

fn cmd_config_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "{:?} already exists (use --force to overwrite)",
            config_path
        )));
    }

    Config::default().save(config_path)?;
    println!("Wrote default configuration to {:?}", config_path);
    Ok(())
}

fn cmd_config_show(config: &Config, config_path: &Path) -> Result<()> {
    println!("# {:?}", config_path);
    print!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

/// Expand ~ to home directory
fn expand_tilde(path: &PathBuf) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.clone()
}
