//! csv-dialect CLI - detect and convert CSV dialects

use clap::{Args, Parser, Subcommand};
use csv_dialect::{
    Detector, Dialect, DialectBuilder, DoubleQuote, LineTerminator, Quoting, Reader, Sample,
    SampleSize, Writer,
};
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Detect and convert CSV dialects.
#[derive(Parser, Debug)]
#[command(name = "csv-dialect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected delimiter and row terminator of each file
    Detect {
        /// Input file(s) to examine
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Quote character enclosing fields (ignored when counting)
        #[arg(short = 'q', long, default_value = "\"", value_parser = parse_char)]
        quote: char,

        #[command(flatten)]
        sample: SampleArgs,

        /// Output format
        #[arg(short = 'f', long, default_value = "text")]
        format: OutputFormat,
    },
    /// Read records in one dialect and write them in another
    Convert {
        /// Input file (standard input if omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        input: InputDialectArgs,

        #[command(flatten)]
        output: OutputDialectArgs,

        #[command(flatten)]
        sample: SampleArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Number of bytes to sample for detection
    #[arg(short = 'b', long, default_value_t = csv_dialect::DEFAULT_SAMPLE_BYTES)]
    sample_bytes: usize,
}

impl SampleArgs {
    fn size(&self) -> SampleSize {
        SampleSize::Bytes(self.sample_bytes)
    }

    fn detector(&self) -> Detector {
        let mut detector = Detector::new();
        detector.sample_size(self.size());
        detector
    }
}

/// Input settings; anything left unset is detected.
#[derive(Args, Debug)]
struct InputDialectArgs {
    /// Input field delimiter
    #[arg(long, value_parser = parse_char)]
    in_delimiter: Option<char>,

    /// Input quote character
    #[arg(long, value_parser = parse_char)]
    in_quote: Option<char>,

    /// Input escape character
    #[arg(long, value_parser = parse_char)]
    in_escape: Option<char>,

    /// Input line terminator (lf, cr or crlf)
    #[arg(long)]
    in_terminator: Option<LineTerminator>,
}

impl InputDialectArgs {
    fn apply(&self, builder: &mut DialectBuilder) {
        if let Some(delimiter) = self.in_delimiter {
            builder.delimiter(delimiter);
        }
        if let Some(quote) = self.in_quote {
            builder.quote(quote);
        }
        if self.in_escape.is_some() {
            builder.escape(self.in_escape);
        }
        if let Some(terminator) = self.in_terminator {
            builder.line_terminator(terminator);
        }
    }
}

/// Output dialect, built from command-line flags.
#[derive(Args, Debug)]
struct OutputDialectArgs {
    /// Output field delimiter
    #[arg(short = 'd', long, default_value = ",", value_parser = parse_char)]
    delimiter: char,

    /// Output quote character
    #[arg(long, default_value = "\"", value_parser = parse_char)]
    quote: char,

    /// Output escape character
    #[arg(long, value_parser = parse_char)]
    escape: Option<char>,

    /// Output quoting mode (all, minimal, nonnumeric or none)
    #[arg(long, default_value = "minimal")]
    quoting: Quoting,

    /// Escape embedded quotes instead of doubling them
    #[arg(long)]
    no_double_quote: bool,

    /// Output line terminator (lf, cr or crlf)
    #[arg(short = 't', long, default_value = "lf")]
    terminator: LineTerminator,
}

impl OutputDialectArgs {
    fn dialect(&self) -> csv_dialect::Result<Dialect> {
        let double_quote = if self.no_double_quote {
            DoubleQuote::Off
        } else {
            DoubleQuote::On
        };
        Dialect::builder()
            .delimiter(self.delimiter)
            .quote(self.quote)
            .escape(self.escape)
            .quoting(self.quoting)
            .double_quote(double_quote)
            .line_terminator(self.terminator)
            .build()
    }
}

/// Parse a single character, accepting `\t` and `tab` for tab.
fn parse_char(s: &str) -> Result<char, String> {
    match s {
        "\\t" | "tab" => return Ok('\t'),
        "space" => return Ok(' '),
        _ => {}
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("expected a single character, got {s:?}")),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Detect {
            files,
            quote,
            sample,
            format,
        } => {
            let detector = sample.detector();
            let mut exit_code = ExitCode::SUCCESS;
            for file in files {
                if let Err(e) = detect_file(&detector, sample.size(), file, *quote, *format) {
                    eprintln!("Error processing {}: {}", file.display(), e);
                    exit_code = ExitCode::FAILURE;
                }
            }
            exit_code
        }
        Command::Convert {
            file,
            input,
            output,
            sample,
        } => match convert(file.as_deref(), input, output, sample) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn detect_file(
    detector: &Detector,
    size: SampleSize,
    path: &Path,
    quote: char,
    format: OutputFormat,
) -> csv_dialect::Result<()> {
    let sample = Sample::read(File::open(path)?, size)?;
    let delimiter = detector.detect_delimiter(sample.bytes(), quote);
    let terminator = detector.detect_terminator(sample.bytes());

    match format {
        OutputFormat::Text => {
            println!("File: {}", path.display());
            match delimiter {
                Some(d) => println!("  Delimiter: {d:?}"),
                None => println!("  Delimiter: undetectable"),
            }
            match terminator {
                Some(t) => println!("  Terminator: {t}"),
                None => println!("  Terminator: undetectable"),
            }
            println!();
        }
        OutputFormat::Json => {
            let delimiter = delimiter.map_or_else(
                || "null".to_string(),
                |d| format!("\"{}\"", d.escape_default()),
            );
            let terminator =
                terminator.map_or_else(|| "null".to_string(), |t| format!("\"{}\"", t.escaped()));
            println!(
                r#"{{"file":"{}","delimiter":{},"terminator":{}}}"#,
                path.display().to_string().escape_default(),
                delimiter,
                terminator
            );
        }
    }
    Ok(())
}

fn convert(
    path: Option<&Path>,
    input: &InputDialectArgs,
    output: &OutputDialectArgs,
    sample_args: &SampleArgs,
) -> csv_dialect::Result<()> {
    let source: Box<dyn Read> = match path {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };

    let sample = Sample::read(source, sample_args.size())?;
    let mut builder = sample_args
        .detector()
        .detect_dialect(sample.bytes())?
        .to_builder();
    input.apply(&mut builder);
    let in_dialect = builder.build()?;
    log::debug!("reading with {in_dialect:?}");

    let mut reader = Reader::with_dialect(sample.into_reader(), in_dialect);
    let mut writer = Writer::with_dialect(io::stdout().lock(), output.dialect()?);
    for record in reader.records() {
        writer.write_record(record?)?;
    }
    writer.flush()
}
