use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use xorbreak::cipher;
use xorbreak::config::{DEFAULT_CANDIDATES, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN};
use xorbreak::{Breaker, ByteArray, ChiSquared, Config};

#[derive(Parser, Debug)]
#[command(name = "xorbreak")]
#[command(about = "Recover the key of a repeating-key XOR ciphertext")]
#[command(version)]
struct Cli {
    /// Base64 ciphertext file. Without one, runs the built-in examples.
    file: Option<PathBuf>,

    /// Shortest key length to try
    #[arg(long, default_value_t = DEFAULT_MIN_LEN)]
    min_len: usize,

    /// Longest key length to try
    #[arg(long, default_value_t = DEFAULT_MAX_LEN)]
    max_len: usize,

    /// Ranked key lengths to solve before picking a plaintext
    #[arg(short, long, default_value_t = DEFAULT_CANDIDATES)]
    candidates: usize,
}

impl Cli {
    fn config(&self) -> Config {
        Config::default()
            .with_key_lengths(self.min_len, self.max_len)
            .with_candidates(self.candidates)
    }
}

fn demo() -> Result<(), failure::Error> {
    let hex = "49276d206b696c6c696e6720796f757220627261696e206c696b65206120706f69736f6e6f7573206d757368726f6f6d";
    println!("{}", ByteArray::from_hex(hex)?.base64());

    let xored = ByteArray::from_hex("1c0111001f010100061a024b53535009181c")?
        .xor(&ByteArray::from_hex("686974207468652062756c6c277320657965")?);
    println!("{}", xored.hex());

    let encrypted = ByteArray::from_hex("1b37373331363f78151b7f2b783431333d78397828372d363c78373e783a393b3736")?;
    let guess = cipher::find_key(encrypted.as_bytes(), &ChiSquared);
    println!("{:#04x}: {}", guess.key, ByteArray::from_bytes(guess.plaintext).string());

    let stanza = "Burning 'em, if you ain't quick and nimble\nI go crazy when I hear a cymbal";
    println!("{}", cipher::encrypt(stanza, "ICE")?);

    Ok(())
}

fn break_file(path: &Path, config: Config) -> Result<(), failure::Error> {
    let contents = fs::read_to_string(path)?;
    let encrypted = ByteArray::from_base64(&contents)?;
    let breaker = Breaker::new(config, ChiSquared);

    for candidate in breaker.estimate(encrypted.as_bytes())?.iter().take(config.candidates) {
        println!("key length {:>2}: {:.4}", candidate.length, candidate.score);
    }

    let broken = breaker.break_cipher(encrypted.as_bytes())?;
    info!(key_length = broken.key.len(), score = broken.score, "recovered key");

    println!("key: {}", ByteArray::from_bytes(broken.key).string());
    println!("{}", ByteArray::from_bytes(broken.plaintext).string());

    Ok(())
}

fn main() -> Result<(), failure::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xorbreak=info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.file {
        Some(path) => break_file(path, cli.config()),
        None => demo(),
    }
}
