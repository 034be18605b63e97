use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use micro_uu::{Decoder, Encoder, Header};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Mode used for new files when the source permissions can't be read.
const FALLBACK_MODE: u16 = 0o644;

#[derive(Debug, Parser)]
#[command(name = "uu", version, about = "Encode and decode files in the uuencode format")]
struct Cli {
    /// Log more details. Repeat for even more.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a file.
    Encode {
        /// The file to encode.
        file: PathBuf,

        /// The name stored in the `begin` line.
        ///
        /// Defaults to the file name of FILE.
        #[arg(long)]
        name: Option<String>,

        /// The permission bits stored in the `begin` line, in octal.
        ///
        /// Defaults to the permissions of FILE.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<u16>,

        /// Where to write the encoded text. Defaults to stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Decode uuencoded text.
    Decode {
        /// The encoded input. Reads stdin when missing or `-`.
        input: Option<PathBuf>,

        /// Where to write the decoded data, `-` for stdout.
        ///
        /// Defaults to the name stored in the `begin` line.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Command::Encode { file, name, mode, out } => encode(&file, name, mode, out.as_deref()),
        Command::Decode { input, out } => decode(input.as_deref(), out.as_deref()),
    }
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).with_writer(io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

fn encode(file: &Path, name: Option<String>, mode: Option<u16>, out: Option<&Path>) -> anyhow::Result<()> {
    let source = File::open(file).with_context(|| format!("failed to open `{}`", file.display()))?;

    let name = match name {
        Some(name) => name,
        None => file
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .context("input has no usable file name, pass --name")?,
    };

    let mode = match mode {
        Some(mode) => mode,
        None => source.metadata().map_or(FALLBACK_MODE, |metadata| file_mode(&metadata)),
    };

    let header = Header::new(mode, name).context("invalid header")?;
    info!(name = header.name(), "encoding `{}`, mode {:03o}", file.display(), header.mode());

    match out {
        Some(path) => {
            let dest = File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
            encode_into(source, BufWriter::new(dest), header)
        }
        None => encode_into(source, io::stdout().lock(), header),
    }
}

fn encode_into<R: Read, W: Write>(mut source: R, writer: W, header: Header) -> anyhow::Result<()> {
    let mut encoder = Encoder::new(writer, header);
    let copied = io::copy(&mut source, &mut encoder).context("failed to encode")?;
    encoder.finish().context("failed to write trailer")?;

    debug!(bytes = copied, "encoded input");
    Ok(())
}

fn decode(input: Option<&Path>, out: Option<&Path>) -> anyhow::Result<()> {
    let reader: Box<dyn Read> = match input {
        Some(path) if path != Path::new("-") => {
            Box::new(File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?)
        }
        _ => Box::new(io::stdin().lock()),
    };

    let mut decoder = Decoder::new(reader);
    let header = decoder.header().context("failed to read header")?.clone();
    eprintln!("file: {} mode: {:03o}", header.name(), header.mode());

    let dest = match out {
        Some(path) => path,
        None => Path::new(header.name()),
    };
    if dest == Path::new("-") {
        return copy_decoded(&mut decoder, io::stdout().lock());
    }

    let file = File::create(dest).with_context(|| format!("failed to create `{}`", dest.display()))?;
    if let Err(e) = copy_decoded(&mut decoder, BufWriter::new(file)) {
        if let Err(cause) = fs::remove_file(dest) {
            warn!(%cause, "failed to remove partial output `{}`", dest.display());
        }
        return Err(e.context(format!("failed to decode into `{}`", dest.display())));
    }

    apply_permissions(dest, header.permissions());
    info!(name = header.name(), "decoded into `{}`", dest.display());
    Ok(())
}

fn copy_decoded<R: Read, W: Write>(decoder: &mut Decoder<R>, mut writer: W) -> anyhow::Result<()> {
    let copied = io::copy(decoder, &mut writer)?;
    writer.flush()?;

    debug!(bytes = copied, "decoded input");
    Ok(())
}

fn parse_mode(s: &str) -> Result<u16, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    match u16::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(_) => Err(format!("mode `{s}` is out of range")),
        Err(e) => Err(format!("mode `{s}` is not octal: {e}")),
    }
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> u16 {
    use std::os::unix::fs::PermissionsExt as _;
    u16::try_from(metadata.permissions().mode() & 0o777).unwrap_or(FALLBACK_MODE)
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> u16 {
    FALLBACK_MODE
}

#[cfg(unix)]
fn apply_permissions(path: &Path, mode: u16) {
    use std::os::unix::fs::PermissionsExt as _;
    if let Err(cause) = fs::set_permissions(path, fs::Permissions::from_mode(u32::from(mode))) {
        warn!(%cause, "failed to set mode {:03o} on `{}`", mode, path.display());
    }
}

#[cfg(not(unix))]
fn apply_permissions(_path: &Path, _mode: u16) {}
