use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use text_codecs::dispatch::{DispatchConfig, Dispatcher, Request, Response};

#[derive(Parser)]
#[command(name = "textcodec", version, about = "Compress text with RLE, Huffman or LZW")]
struct Cli {
    /// Log each request at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base alphabet size for LZW (128 = 7-bit ASCII, 256 = Latin-1)
    #[arg(long, global = true, default_value_t = 128)]
    lzw_alphabet: usize,

    /// Most characters a decompression may produce
    #[arg(long, global = true)]
    max_output: Option<usize>,

    /// Allow RLE compression of text containing digits (it will not decode back)
    #[arg(long, global = true)]
    allow_digits: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress text and print the result envelope as JSON
    Compress {
        /// rle, huffman or lzw
        #[arg(short, long)]
        algorithm: String,
        #[command(flatten)]
        input: TextInput,
    },
    /// Decompress a JSON envelope produced by `compress`
    Decompress {
        /// rle, huffman or lzw
        #[arg(short, long)]
        algorithm: String,
        /// Envelope file, or `-` for stdin
        #[arg(short, long)]
        envelope: PathBuf,
    },
    /// Compress, print, decompress, print, and check the text came back
    Roundtrip {
        /// rle, huffman or lzw
        #[arg(short, long)]
        algorithm: String,
        #[command(flatten)]
        input: TextInput,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TextInput {
    /// Text given on the command line
    #[arg(long)]
    text: Option<String>,
    /// File to read the text from
    #[arg(long)]
    file: Option<PathBuf>,
}

impl TextInput {
    fn read(&self) -> Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => read_source(path),
            (None, None) => bail!("either --text or --file is required"),
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run(dispatcher: &Dispatcher, request: &Request) -> Result<Response> {
    dispatcher
        .handle(request)
        .map_err(|err| anyhow!("{}: {}", err.kind(), err))
}

fn print(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "text_codecs=debug"
    } else {
        "text_codecs=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    let defaults = DispatchConfig::default();
    let dispatcher = Dispatcher::new(DispatchConfig {
        lzw_alphabet_size: cli.lzw_alphabet,
        max_output_len: cli.max_output.or(defaults.max_output_len),
        reject_ambiguous_rle: !cli.allow_digits,
    })
    .map_err(|err| anyhow!("{}: {}", err.kind(), err))?;

    match cli.command {
        Commands::Compress { algorithm, input } => {
            let response = run(&dispatcher, &Request::compress(algorithm, input.read()?))?;
            print(&response)?;
        }
        Commands::Decompress {
            algorithm,
            envelope,
        } => {
            let raw = read_source(&envelope)?;
            let compressed: Response =
                serde_json::from_str(&raw).context("Envelope is not valid JSON")?;
            let response = run(&dispatcher, &Request::decompress(algorithm, compressed))?;
            print(&response)?;
        }
        Commands::Roundtrip { algorithm, input } => {
            let text = input.read()?;
            let compressed = run(&dispatcher, &Request::compress(algorithm.clone(), text.clone()))?;
            print(&compressed)?;
            let decompressed = run(&dispatcher, &Request::decompress(algorithm, compressed))?;
            print(&decompressed)?;
            if decompressed.decoded_text.as_deref() != Some(text.as_str()) {
                bail!("decoded text differs from the input");
            }
        }
    }

    Ok(())
}
