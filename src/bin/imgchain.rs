use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "imgchain", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `/images/{operations}/{filename}` over HTTP.
    Serve(ServeArgs),
    /// Apply an operation chain to one file, bypassing the cache.
    Apply(ApplyArgs),
    /// Print the cache digest for a filename and chain.
    Key(KeyArgs),
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = imgchain::DEFAULT_LISTEN)]
    listen: SocketAddr,

    /// Directory that request filenames resolve against.
    #[arg(long, default_value = "images")]
    images_dir: PathBuf,

    /// Cache directory (created if missing).
    #[arg(long, default_value = ".cache")]
    cache_dir: PathBuf,

    /// Encoding of cached images and responses.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpg)]
    format: FormatChoice,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = imgchain::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Override rayon worker threads for image work.
    #[arg(long)]
    threads: Option<usize>,

    /// Skip unknown operation names instead of rejecting the request.
    #[arg(long, default_value_t = false)]
    lenient_ops: bool,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Operation chain, e.g. `resize=200x0,grayscale`.
    #[arg(long)]
    ops: String,

    /// Output path; `.png` writes PNG, anything else JPEG.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = imgchain::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// Skip unknown operation names instead of failing.
    #[arg(long, default_value_t = false)]
    lenient_ops: bool,
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Source filename as it appears in the request path.
    #[arg(long)]
    filename: String,

    /// Raw operation chain.
    #[arg(long)]
    ops: String,

    /// Output encoding of the server the key is for.
    #[arg(long, value_enum, default_value_t = FormatChoice::Jpg)]
    format: FormatChoice,

    /// JPEG quality of the server the key is for.
    #[arg(long, default_value_t = imgchain::DEFAULT_JPEG_QUALITY)]
    jpeg_quality: u8,

    /// The server skips unknown operation names.
    #[arg(long, default_value_t = false)]
    lenient_ops: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpg,
    Png,
}

impl From<FormatChoice> for imgchain::OutputFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Jpg => imgchain::OutputFormat::Jpeg,
            FormatChoice::Png => imgchain::OutputFormat::Png,
        }
    }
}

fn unknown_policy(lenient: bool) -> imgchain::UnknownOps {
    if lenient {
        imgchain::UnknownOps::Skip
    } else {
        imgchain::UnknownOps::Reject
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Key(args) => cmd_key(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = imgchain::ServerConfig {
        listen: args.listen,
        images_dir: args.images_dir,
        cache_dir: args.cache_dir,
        format: args.format.into(),
        jpeg_quality: args.jpeg_quality,
        threads: args.threads,
        unknown_ops: unknown_policy(args.lenient_ops),
    };
    config.validate()?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    rt.block_on(imgchain::serve(config))
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        (1..=100).contains(&args.jpeg_quality),
        "jpeg quality must be in 1..=100, got {}",
        args.jpeg_quality
    );
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read input '{}'", args.in_path.display()))?;
    let img = imgchain::decode_image(&bytes)
        .with_context(|| format!("decode input '{}'", args.in_path.display()))?;

    let pipeline = imgchain::Pipeline::new(
        imgchain::Registry::builtin(),
        unknown_policy(args.lenient_ops),
    );
    let out = pipeline.apply(img, &args.ops)?;

    let format = format_for_path(&args.out);
    let encoded = imgchain::encode_image(&out, format, args.jpeg_quality)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, encoded)
        .with_context(|| format!("write output '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        out.width(),
        out.height()
    );
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let settings = imgchain::settings_tag(
        args.format.into(),
        args.jpeg_quality,
        unknown_policy(args.lenient_ops),
    );
    println!(
        "{}",
        imgchain::CacheKey::derive(&settings, &args.filename, &args.ops)
    );
    Ok(())
}

fn format_for_path(path: &Path) -> imgchain::OutputFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => imgchain::OutputFormat::Png,
        _ => imgchain::OutputFormat::Jpeg,
    }
}
