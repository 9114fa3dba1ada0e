//! Slz command-line tool for checking, dumping, and transcoding documents.
//!
//! Usage: slz [OPTIONS] [PATH]
//!
//! Reads a JSON or YAML document (from PATH, or stdin when PATH is omitted or
//! `-`), builds its document tree and writes it back out as a tree dump,
//! JSON, YAML, TOML, CBOR or CBOR diagnostic notation. A directory PATH
//! processes every `.json`, `.yaml` and `.yml` file in it.
//!
//! Diagnostics are reported on stderr through `tracing`; the exit code is 1
//! when any input failed to parse or convert.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use libslz::{encode, parse_with_filename, Document, Format, Syntax};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};

mod transcode;

#[derive(Parser, Debug)]
#[command(name = "slz")]
#[command(version, about = "Check, dump, and transcode JSON and YAML documents", long_about = None)]
struct Cli {
    /// Input file or directory (reads stdin when omitted or `-`)
    path: Option<PathBuf>,

    /// Input format [default: inferred from the file extension]
    #[arg(short, long, value_enum)]
    from: Option<InputFormat>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
    to: OutputFormat,

    /// Write output to the given file (not valid with directory input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check that the input parses; print `<path>: ok` on success
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Json,
    #[value(alias = "yml")]
    Yaml,
}

impl From<InputFormat> for Syntax {
    fn from(format: InputFormat) -> Syntax {
        match format {
            InputFormat::Json => Syntax::Json,
            InputFormat::Yaml => Syntax::Yaml,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Indented node-per-line dump of the document tree
    Tree,
    Json,
    #[value(alias = "yml")]
    Yaml,
    Toml,
    /// Binary CBOR (write it with --output)
    Cbor,
    /// CBOR diagnostic notation (RFC 8949 §8)
    Diag,
}

/// A rendered document.
enum Output {
    Text(String),
    Binary(Vec<u8>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .without_time()
        .with_target(cli.verbose > 0)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let path = cli.path.as_deref().filter(|p| *p != Path::new("-"));

    if let Some(dir) = path.filter(|p| p.is_dir()) {
        if cli.output.is_some() {
            bail!("--output cannot be used with directory input");
        }
        return process_directory(cli, dir);
    }

    let input = match path {
        Some(file) => fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            buffer
        }
    };

    let syntax = match (cli.from, path) {
        (Some(format), _) => format.into(),
        (None, Some(file)) => match Syntax::from_path(file) {
            Some(syntax) => syntax,
            None => bail!("cannot infer the format of {}; use --from", file.display()),
        },
        (None, None) => bail!("reading stdin requires --from"),
    };

    let document = parse_input(&input, syntax, path)?;
    if cli.check {
        println!("{}: ok", label(path));
        return Ok(());
    }

    let output = render(&document, cli.to)?;
    match &cli.output {
        Some(file) => write_file(file, &output),
        None => write_stdout(&output),
    }
}

fn process_directory(cli: &Cli, dir: &Path) -> Result<()> {
    let mut files: Vec<(PathBuf, Syntax)> = fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.is_file())
        .filter_map(|p| Syntax::from_path(&p).map(|syntax| (p, syntax)))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    debug!("{} documents in {}", files.len(), dir.display());

    let mut failed = 0;
    for (file, inferred) in &files {
        let syntax = cli.from.map(Syntax::from).unwrap_or(*inferred);
        if let Err(err) = process_file(cli, file, syntax) {
            eprintln!("{err:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, files.len());
    }
    info!("{} files ok", files.len());
    Ok(())
}

fn process_file(cli: &Cli, file: &Path, syntax: Syntax) -> Result<()> {
    let input = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let document = parse_input(&input, syntax, Some(file))?;

    if cli.check {
        println!("{}: ok", file.display());
        return Ok(());
    }
    write_stdout(&render(&document, cli.to)?)
}

fn parse_input(input: &str, syntax: Syntax, path: Option<&Path>) -> Result<Document> {
    let filename = path.map(|p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| p.display().to_string())
    });

    // Each diagnostic has already been logged by the front end.
    parse_with_filename(input, syntax, filename.as_deref()).map_err(|err| {
        anyhow::anyhow!(
            "{} failed to parse as {} ({} diagnostics)",
            label(path),
            syntax,
            err.diagnostics().len()
        )
    })
}

fn render(document: &Document, format: OutputFormat) -> Result<Output> {
    Ok(match format {
        OutputFormat::Tree => Output::Text(encode(document, Format::Tree)),
        OutputFormat::Json => Output::Text(encode(document, Format::Json)),
        OutputFormat::Yaml => Output::Text(transcode::yaml::encode(document)?),
        OutputFormat::Toml => Output::Text(transcode::toml::encode(document)?),
        OutputFormat::Cbor => Output::Binary(transcode::cbor::encode(document)),
        OutputFormat::Diag => Output::Text(transcode::cbor::diagnostic(&transcode::cbor::encode(document))?),
    })
}

fn label(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<stdin>".to_string(),
    }
}

fn write_file(file: &Path, output: &Output) -> Result<()> {
    let bytes = match output {
        Output::Text(text) => text.as_bytes(),
        Output::Binary(bytes) => bytes.as_slice(),
    };
    fs::write(file, bytes).with_context(|| format!("writing {}", file.display()))
}

fn write_stdout(output: &Output) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match output {
        Output::Text(text) => {
            handle.write_all(text.as_bytes())?;
            // Ensure output ends with newline
            if !text.ends_with('\n') {
                handle.write_all(b"\n")?;
            }
        }
        Output::Binary(bytes) => handle.write_all(bytes)?,
    }
    handle.flush().context("writing to stdout")
}
