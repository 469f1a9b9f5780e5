use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use marktree::{CharsetStrategy, Node, PermissiveCharset, StrictUtf8};

#[derive(Debug, Parser)]
#[command(
    name = "marktree",
    version,
    about = "Parse, inspect and re-render XML documents"
)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output form (xml, json, paths)
    #[arg(short, long, value_enum, default_value_t = OutputArg::Xml)]
    to: OutputArg,
    /// Prefix XML output with the document declaration
    #[arg(short, long)]
    declaration: bool,
    /// Charset handling for declared encodings
    #[arg(long, value_enum, default_value_t = CharsetArg::Strict)]
    charset: CharsetArg,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputArg {
    /// Re-rendered markup
    Xml,
    /// Pretty-printed JSON tree
    Json,
    /// One line per element path
    Paths,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CharsetArg {
    /// UTF-8 only
    Strict,
    /// UTF-8, US-ASCII and ISO-8859-1
    Permissive,
}

impl CharsetArg {
    fn strategy(self) -> Box<dyn CharsetStrategy> {
        match self {
            Self::Strict => Box::new(StrictUtf8),
            Self::Permissive => Box::new(PermissiveCharset::default()),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let input_data = read_input(&args.input)?;
    let doc = marktree::from_bytes_with_charset(&input_data, args.charset.strategy())?;

    let output = render(&doc, args.to, args.declaration)?;
    write_output(&args.output, output.as_bytes())?;
    Ok(())
}

fn render(doc: &Node, to: OutputArg, declaration: bool) -> Result<String> {
    match to {
        OutputArg::Xml => Ok(doc.to_xml(declaration)?),
        OutputArg::Json => {
            serde_json::to_string_pretty(doc).context("failed to encode JSON")
        }
        OutputArg::Paths => {
            let mut lines = String::new();
            doc.traverse(|path, node| {
                if !node.is_anonymous() {
                    lines.push_str(path);
                    lines.push('\n');
                }
                true
            });
            Ok(lines)
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.iter().all(|b| b.is_ascii_whitespace()) {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
