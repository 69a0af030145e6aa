use std::path::PathBuf;

use anyhow::Context as _;
use autothumb::{
    Composer, CompositionRequest, EngineConfig, FixedAdvanceMeasure, FrameProvider,
    ImageFileFrameProvider, OutputFormat, Resolution, DEFAULT_OUTPUT_TEMPLATE,
};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "autothumb", version, about = "Compose captioned video thumbnails")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render thumbnails for a frame image.
    Compose(ComposeArgs),
    /// Print the layout plan per resolution as JSON, without rendering.
    Plan(PlanArgs),
    /// List available styles.
    Styles(StylesArgs),
}

#[derive(Args, Debug)]
struct EngineArgs {
    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Style overrides JSON (`{"styles": [...]}`).
    #[arg(long)]
    styles: Option<PathBuf>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct CaptionArgs {
    /// Caption text.
    #[arg(long, default_value = "")]
    text: String,

    /// Smaller secondary line drawn under the caption.
    #[arg(long)]
    subtext: Option<String>,

    /// Style name.
    #[arg(long, default_value = "youtube")]
    style: String,

    /// Target resolution, `WIDTHxHEIGHT`, `720p` or `1080p` (repeatable).
    #[arg(long = "resolution", default_value = "1280x720")]
    resolutions: Vec<Resolution>,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Base frame image (PNG, JPEG, ...).
    image: PathBuf,

    #[command(flatten)]
    caption: CaptionArgs,

    /// Output path template; `{width}`, `{height}` and `{style}` are substituted.
    #[arg(long)]
    out: Option<String>,

    /// Output format (`png` or `jpeg`); defaults to the template's extension, then the config.
    #[arg(long)]
    format: Option<String>,

    /// Worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Render resolutions one after another.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Rotate each resolution to the frame's orientation.
    #[arg(long, default_value_t = false)]
    match_orientation: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    caption: CaptionArgs,

    /// Measure with a fixed per-character advance (in ems) instead of the style's font.
    #[arg(long)]
    fixed_advance: Option<f32>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Args, Debug)]
struct StylesArgs {
    /// Print full style definitions as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Styles(args) => cmd_styles(args),
    }
}

fn load_config(args: &EngineArgs) -> anyhow::Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(styles) = &args.styles {
        cfg.styles_path = Some(styles.clone());
    }
    cfg.font_dirs.extend(args.font_dirs.iter().cloned());
    autothumb::init_logging(&cfg.logging);
    Ok(cfg)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.engine)?;
    if args.threads.is_some() {
        cfg.threads = args.threads;
    }
    if args.sequential {
        cfg.parallel = false;
    }
    if args.match_orientation {
        cfg.match_orientation = true;
    }
    cfg.validate()?;

    let template = args
        .out
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_TEMPLATE.to_string());
    let format = match &args.format {
        Some(name) => OutputFormat::parse(name, cfg.jpeg_quality)?,
        None => match OutputFormat::from_path(std::path::Path::new(&template)) {
            Some(OutputFormat::Jpeg { .. }) => OutputFormat::Jpeg {
                quality: cfg.jpeg_quality,
            },
            Some(format) => format,
            None => cfg.output_format()?,
        },
    };

    let frame = ImageFileFrameProvider::new(&args.image).get_selected_frame()?;
    let composer = Composer::new(cfg.style_registry()?, cfg.font_resolver())
        .with_options(cfg.compose_options());
    let mut request = CompositionRequest::new(frame, args.caption.text, args.caption.style)
        .with_resolutions(args.caption.resolutions)
        .with_format(format)
        .with_output_template(template.clone());
    if let Some(subtext) = args.caption.subtext {
        request = request.with_subtext(subtext);
    }

    let report = composer.compose(&request)?;
    let written = autothumb::write_outputs(&report, &template)?;
    for (res, path) in &written {
        eprintln!("wrote {res} -> {}", path.display());
    }
    for (res, err) in &report.failures {
        eprintln!("failed {res}: {err}");
    }
    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} resolution(s) failed",
            report.failures.len(),
            report.failures.len() + report.outputs.len()
        );
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.engine)?;
    let composer = Composer::new(cfg.style_registry()?, cfg.font_resolver());
    let caption = &args.caption;

    let plans = match args.fixed_advance {
        Some(advance_em) => {
            let style = composer.registry().resolve(&caption.style)?;
            composer.plan_with(
                &caption.text,
                caption.subtext.as_deref(),
                style,
                &caption.resolutions,
                &mut FixedAdvanceMeasure::new(advance_em),
            )?
        }
        None => composer.plan(
            &caption.text,
            caption.subtext.as_deref(),
            &caption.style,
            &caption.resolutions,
        )?,
    };

    let mut out = serde_json::Map::new();
    for (res, plan) in plans {
        let value = match plan {
            Ok(plan) => serde_json::to_value(&plan).context("serialize layout plan")?,
            Err(err) => serde_json::json!({ "error": err.to_string() }),
        };
        out.insert(res.to_string(), value);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize plans")?
    );
    Ok(())
}

fn cmd_styles(args: StylesArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.engine)?;
    let registry = cfg.style_registry()?;
    if args.json {
        let styles: Vec<_> = registry.iter().collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&styles).context("serialize styles")?
        );
    } else {
        for name in registry.names() {
            println!("{name}");
        }
    }
    Ok(())
}
