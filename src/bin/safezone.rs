use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use safezone::entitlement::{DailyQuota as _, LocalDailyCounter, authorize_export};
use safezone::{
    CatalogSnapshot, Compositor, Exporter, FormatKey, HexColor, InMemoryBlobStore,
    JsonFileCatalog, ManualFrameScheduler, MediaKind, MediaLoader, PreviewSession, RenderOutcome,
    RenderTarget, ToolConfig, Upload, sniff_image_signature,
};

#[derive(Parser, Debug)]
#[command(name = "safezone", version)]
struct Cli {
    /// Tool config JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the active formats of a catalog.
    Formats(FormatsArgs),
    /// Render the preview canvas (creative + mask) to a PNG.
    Preview(PreviewArgs),
    /// Export a format's mask as a PNG.
    Export(ExportArgs),
    /// Validate a file as an upload without loading it.
    CheckUpload(CheckUploadArgs),
}

#[derive(Parser, Debug)]
struct FormatsArgs {
    /// Catalog JSON (array of format rows).
    #[arg(long)]
    catalog: PathBuf,

    /// Only list this platform.
    #[arg(long)]
    platform: Option<String>,

    /// Print the entries as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FormatArgs {
    /// Catalog JSON (array of format rows).
    #[arg(long)]
    catalog: PathBuf,

    #[arg(long)]
    platform: String,

    /// Format name; defaults to the platform's first format.
    #[arg(long)]
    format: Option<String>,

    /// Mask color as #RRGGBB.
    #[arg(long)]
    color: Option<String>,

    /// Mask opacity in [0, 1].
    #[arg(long)]
    opacity: Option<f64>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    format: FormatArgs,

    /// Creative image to draw under the mask; the empty state is drawn without one.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    format: FormatArgs,

    /// Directory the mask PNG is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Export at full resolution without counting against the daily limit.
    #[arg(long)]
    pro: bool,

    /// JSON file holding the free-tier daily download counter.
    #[arg(long)]
    counter: Option<PathBuf>,

    /// Day key for the counter (defaults to days since the Unix epoch).
    #[arg(long)]
    day: Option<String>,
}

#[derive(Parser, Debug)]
struct CheckUploadArgs {
    file: PathBuf,

    #[arg(long, value_enum, default_value_t = KindChoice::Image)]
    kind: KindChoice,

    /// Declared MIME type; guessed from the extension when omitted.
    #[arg(long)]
    content_type: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Image,
    Video,
}

impl From<KindChoice> for MediaKind {
    fn from(k: KindChoice) -> Self {
        match k {
            KindChoice::Image => MediaKind::Image,
            KindChoice::Video => MediaKind::Video,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ToolConfig::from_path(path)?,
        None => ToolConfig::default(),
    };
    config.apply_env();

    match cli.cmd {
        Command::Formats(args) => cmd_formats(args),
        Command::Preview(args) => cmd_preview(args, config),
        Command::Export(args) => cmd_export(args, config),
        Command::CheckUpload(args) => cmd_check_upload(args, &config),
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<CatalogSnapshot> {
    Ok(CatalogSnapshot::load(&JsonFileCatalog::new(path))?)
}

fn cmd_formats(args: FormatsArgs) -> anyhow::Result<()> {
    let snapshot = load_catalog(&args.catalog)?;
    let entries: Vec<_> = snapshot
        .entries()
        .iter()
        .filter(|e| args.platform.as_deref().is_none_or(|p| e.key.platform == p))
        .collect();

    if args.json {
        let rows: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "platform": e.key.platform,
                    "format": e.key.format,
                    "spec": e.spec,
                    "description": e.description,
                    "reference_link": e.reference_link,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for e in entries {
        println!("{}", e.key);
        println!("  Dimensions: {}x{}", e.spec.width, e.spec.height);
        if !e.spec.has_mask_geometry() {
            println!("  No safe zone data");
        }
        if let Some(d) = &e.description {
            println!("  {d}");
        }
        if let Some(link) = &e.reference_link {
            println!("  Reference: {link}");
        }
    }
    Ok(())
}

/// Build a session on the selected format with the requested style applied.
fn open_session(args: &FormatArgs, config: &ToolConfig) -> anyhow::Result<PreviewSession> {
    let snapshot = load_catalog(&args.catalog)?;
    let mut session = PreviewSession::new(
        snapshot,
        Rc::new(ManualFrameScheduler::new()),
        Rc::new(InMemoryBlobStore::new()),
    )
    .with_style(config.mask);

    match &args.format {
        Some(format) => {
            let key = FormatKey::new(&args.platform, format);
            if session.catalog().get_key(&key).is_none() {
                anyhow::bail!("unknown format {key}");
            }
            session.on_format_changed(key);
        }
        None => {
            if !session.select_platform(&args.platform) {
                anyhow::bail!("platform '{}' has no formats", args.platform);
            }
        }
    }

    let mut style = *session.style();
    if let Some(color) = &args.color {
        style.color = HexColor::parse(color)?;
    }
    if let Some(opacity) = args.opacity {
        style.opacity = opacity;
    }
    session.on_style_changed(style)?;
    Ok(session)
}

fn cmd_preview(args: PreviewArgs, config: ToolConfig) -> anyhow::Result<()> {
    let mut session = open_session(&args.format, &config)?;

    if let Some(path) = &args.image {
        let upload = read_upload(path, None)?;
        let loader = MediaLoader::new(
            config.image_policy.clone(),
            config.video_policy.clone(),
            Rc::new(InMemoryBlobStore::new()),
        );
        let mut unlimited = LocalDailyCounter::new(u32::MAX, "cli");
        session.load_upload(
            &loader,
            Some(&upload),
            MediaKind::Image,
            &true,
            &mut unlimited,
        )?;
    }

    let canvas = session
        .current_spec()
        .context("no format selected")?
        .canvas();
    let mut target = RenderTarget::new(canvas)?;
    let mut compositor = Compositor::new(config.placeholder.clone());
    if session.render(&mut compositor, &mut target)? != RenderOutcome::Rendered {
        anyhow::bail!("nothing rendered");
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, target.encode_png()?)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs, config: ToolConfig) -> anyhow::Result<()> {
    let session = open_session(&args.format, &config)?;

    let day = args.day.clone().unwrap_or_else(epoch_day);
    let mut counter = match &args.counter {
        Some(path) if path.exists() => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read counter '{}'", path.display()))?;
            serde_json::from_str::<LocalDailyCounter>(&json)
                .with_context(|| format!("parse counter '{}'", path.display()))?
        }
        _ => LocalDailyCounter::new(config.free_download_limit, day.clone()),
    };
    counter.set_day(&day);

    let grant = authorize_export(&args.pro, &counter, config.preview_scale)?;
    let (file_name, export) = session.export_mask(&mut Exporter::new(), grant.scale)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out = args.out_dir.join(&file_name);
    export.write_to(&out)?;
    grant.commit(&mut counter);

    if let Some(path) = &args.counter {
        std::fs::write(path, serde_json::to_string(&counter)?)
            .with_context(|| format!("write counter '{}'", path.display()))?;
    }

    eprintln!("wrote {} ({}x{})", out.display(), export.width, export.height);
    if !args.pro {
        eprintln!(
            "{} of {} free downloads remaining today",
            counter.remaining(),
            counter.limit
        );
    }
    Ok(())
}

fn cmd_check_upload(args: CheckUploadArgs, config: &ToolConfig) -> anyhow::Result<()> {
    let upload = read_upload(&args.file, args.content_type.as_deref())?;
    let loader = MediaLoader::new(
        config.image_policy.clone(),
        config.video_policy.clone(),
        Rc::new(InMemoryBlobStore::new()),
    );
    let kind = MediaKind::from(args.kind);
    loader.validate(Some(&upload), kind)?;
    if kind == MediaKind::Image {
        safezone::verify_image_content(&upload.content_type, &upload.bytes)?;
    }

    let detected = sniff_image_signature(&upload.bytes)
        .map(|s| s.content_type())
        .unwrap_or("unknown");
    println!(
        "ok: {} ({}, {} bytes, detected {detected})",
        upload.name,
        upload.content_type,
        upload.bytes.len()
    );
    Ok(())
}

fn read_upload(path: &Path, content_type: Option<&str>) -> anyhow::Result<Upload> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = content_type
        .map(str::to_owned)
        .unwrap_or_else(|| guess_content_type(path).to_owned());
    Ok(Upload::new(name, content_type, bytes))
}

fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

fn epoch_day() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    (secs / 86_400).to_string()
}
