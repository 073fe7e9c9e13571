use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fileprobe::transform::{
    CipherKind, Codec, KeyMaterial, Operation, TransformConfig, TransformJob, TransformService,
    TransformStatus,
};
use fileprobe::{BatchAnalyzer, FeatureExtractor, ProbeConfig};

#[derive(Parser)]
#[command(name = "fileprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Fingerprint files and transform them with standard ciphers and codecs",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the feature vector of each file
    Analyze {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit one JSON report per line
        #[arg(long)]
        json: bool,

        /// JSON file with analyzer settings
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Compress each file into the output directory
    Compress {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "deflate")]
        codec: CodecArg,

        #[arg(short, long)]
        output: PathBuf,

        /// Leave files that already look compressed or encrypted alone
        #[arg(long)]
        skip_high_entropy: bool,
    },

    /// Restore files written by `compress`
    Decompress {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum, default_value = "deflate")]
        codec: CodecArg,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt each file with a key read from disk
    Encrypt {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum)]
        cipher: CipherArg,

        /// Raw key bytes, followed by the IV for aes and blowfish
        #[arg(short, long)]
        key_file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decrypt files written by `encrypt`
    Decrypt {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(long, value_enum)]
        cipher: CipherArg,

        #[arg(short, long)]
        key_file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CipherArg {
    Aes,
    Blowfish,
    Chacha,
}

impl From<CipherArg> for CipherKind {
    fn from(arg: CipherArg) -> Self {
        match arg {
            CipherArg::Aes => CipherKind::Aes256Cfb,
            CipherArg::Blowfish => CipherKind::BlowfishCfb,
            CipherArg::Chacha => CipherKind::ChaCha20Poly1305,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CodecArg {
    Deflate,
    Lzma,
}

impl From<CodecArg> for Codec {
    fn from(arg: CodecArg) -> Self {
        match arg {
            CodecArg::Deflate => Codec::Deflate,
            CodecArg::Lzma => Codec::Lzma,
        }
    }
}

const COMPRESSED_SUFFIX: &str = ".compressed";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    match cli.command {
        Commands::Analyze {
            paths,
            json,
            config,
        } => run_analyze(&paths, json, config.as_deref()),
        Commands::Compress {
            paths,
            codec,
            output,
            skip_high_entropy,
        } => {
            let config = TransformConfig::new(Operation::Compress(codec.into()))
                .skip_high_entropy(skip_high_entropy);
            run_transform(config, &paths, &output, |name| format!("{name}{COMPRESSED_SUFFIX}"))
        }
        Commands::Decompress {
            paths,
            codec,
            output,
        } => {
            let config = TransformConfig::new(Operation::Decompress(codec.into()));
            run_transform(config, &paths, &output, |name| {
                strip_or_append(name, COMPRESSED_SUFFIX, ".decompressed")
            })
        }
        Commands::Encrypt {
            paths,
            cipher,
            key_file,
            output,
        } => {
            let cipher = CipherKind::from(cipher);
            let key = load_key(cipher, &key_file)?;
            let config = TransformConfig::new(Operation::Encrypt(key));
            run_transform(config, &paths, &output, |name| format!("{name}.{cipher}.enc"))
        }
        Commands::Decrypt {
            paths,
            cipher,
            key_file,
            output,
        } => {
            let cipher = CipherKind::from(cipher);
            let key = load_key(cipher, &key_file)?;
            let config = TransformConfig::new(Operation::Decrypt(key));
            let suffix = format!(".{cipher}.enc");
            run_transform(config, &paths, &output, |name| {
                strip_or_append(name, &suffix, ".dec")
            })
        }
    }
}

fn init_tracing(verbose: bool, debug: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_analyze(paths: &[PathBuf], json: bool, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => ProbeConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ProbeConfig::default(),
    };
    let analyzer = BatchAnalyzer::new(FeatureExtractor::with_config(config));

    let mut failures = 0usize;
    for entry in analyzer.inspect_all(paths) {
        match entry.result {
            Ok(report) if json => {
                println!("{}", serde_json::to_string(&report)?);
            }
            Ok(report) => {
                let format = report
                    .verdict
                    .format
                    .map_or_else(|| "unknown".to_string(), |f| f.to_string());
                println!("{}", report.path.display());
                println!("  sha256:  {}", report.sha256);
                println!("  format:  {format}");
                println!("  content: {}", report.verdict.class);
                println!("  features: {}", report.features);
            }
            Err(err) => {
                failures += 1;
                eprintln!("[!] {}: {err}", entry.path.display());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files could not be analyzed", paths.len());
    }
    Ok(())
}

fn run_transform(
    config: TransformConfig,
    paths: &[PathBuf],
    output_dir: &Path,
    name_output: impl Fn(&str) -> String,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut jobs = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_name()
            .with_context(|| format!("{} has no file name", path.display()))?
            .to_string_lossy();
        jobs.push(TransformJob::new(path, output_dir.join(name_output(name.as_ref()))));
    }

    let service = TransformService::new(config);
    let mut failures = 0usize;
    for outcome in service.run(jobs) {
        let input = outcome.job.input.display();
        match outcome.result {
            Ok(TransformStatus::Written {
                bytes_in,
                bytes_out,
            }) => println!(
                "{input} -> {} ({bytes_in} -> {bytes_out} bytes)",
                outcome.job.output.display()
            ),
            Ok(TransformStatus::Skipped { entropy }) => {
                println!("{input} skipped (entropy {entropy:.3})")
            }
            Err(err) => {
                failures += 1;
                eprintln!("[!] {input}: {err}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files failed", paths.len());
    }
    Ok(())
}

fn load_key(cipher: CipherKind, path: &Path) -> Result<KeyMaterial> {
    KeyMaterial::from_key_file(cipher, path)
        .with_context(|| format!("Failed to load {cipher} key from {}", path.display()))
}

fn strip_or_append(name: &str, suffix: &str, fallback: &str) -> String {
    match name.strip_suffix(suffix) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{name}{fallback}"),
    }
}
