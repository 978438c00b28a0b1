use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use spinekit_core::abnormality::{ScoliosisCurveType, StenosisType};
use spinekit_core::implants::{CubicSegment, RodMeasurement, RodPath};
use spinekit_core::measurement::Measurement;
use spinekit_core::session::MeasureOutcome;
use spinekit_core::tools::{ToolDescriptor, ToolOptions, TOOLS};
use spinekit_core::{DrawList, MeasureSession, Point, SpineConfig};
use spinekit_surgery::{RasterBuffer, SimulationMode, SimulationSession};
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "spinekit")]
#[command(about = "Spinal measurements and surgical simulation on 2D images.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the tool catalog as JSON.
    Tools,
    /// Run a measurement tool over a click sequence.
    Measure {
        #[arg(long)]
        tool: String,
        /// Click sequence, e.g. "10,20;30,40".
        #[arg(long)]
        points: String,
        /// Curve catalog key for the curvature tool.
        #[arg(long)]
        curve: Option<String>,
        #[arg(long)]
        stenosis_type: Option<String>,
        #[arg(long)]
        scoliosis_curve: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        mm_per_pixel: Option<f64>,
        #[arg(long, default_value_t = 1000.0)]
        canvas_width: f64,
        #[arg(long, default_value_t = 1000.0)]
        canvas_height: f64,
    },
    /// Apply a surgical simulation to a PNG image.
    Simulate {
        #[arg(long)]
        mode: String,
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        points: String,
        #[arg(long)]
        out: PathBuf,
        /// Disc gap in pixels for the listhesis correction.
        #[arg(long)]
        gap: Option<f64>,
        /// Also write the guide overlay as JSON.
        #[arg(long)]
        guides: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Fit a rod through the given points.
    Rod {
        #[arg(long)]
        points: String,
        #[arg(long)]
        curvature: Option<f64>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Tools => tools(),
        Command::Measure {
            tool,
            points,
            curve,
            stenosis_type,
            scoliosis_curve,
            config,
            mm_per_pixel,
            canvas_width,
            canvas_height,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(mm) = mm_per_pixel {
                cfg.mm_per_pixel = mm;
            }
            let mut options = ToolOptions::default();
            if let Some(curve) = curve {
                options.curve = curve;
            }
            if let Some(kind) = stenosis_type {
                options.stenosis_type = kind
                    .parse::<StenosisType>()
                    .with_context(|| format!("stenosis type: {kind}"))?;
            }
            if let Some(kind) = scoliosis_curve {
                options.scoliosis_curve = kind
                    .parse::<ScoliosisCurveType>()
                    .with_context(|| format!("scoliosis curve: {kind}"))?;
            }
            measure(&tool, &parse_points(&points)?, cfg, options, (canvas_width, canvas_height))
        }
        Command::Simulate {
            mode,
            image,
            points,
            out,
            gap,
            guides,
            config,
        } => {
            let mut cfg = load_config(config.as_deref())?;
            if let Some(gap) = gap {
                cfg.simulation.listhesis_gap = gap;
            }
            let mode: SimulationMode = mode.parse().with_context(|| format!("simulation mode: {mode}"))?;
            simulate(mode, &image, &parse_points(&points)?, &out, guides.as_deref(), cfg)
        }
        Command::Rod { points, curvature } => {
            let cfg = SpineConfig::default();
            rod(&parse_points(&points)?, curvature.unwrap_or(cfg.implants.rod_curvature))
        }
    }
}

fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[derive(Serialize)]
struct SimulationEntry {
    key: &'static str,
    label: &'static str,
    required_points: usize,
}

#[derive(Serialize)]
struct Catalog {
    tools: &'static [ToolDescriptor],
    simulations: Vec<SimulationEntry>,
}

fn tools() -> Result<()> {
    let catalog = Catalog {
        tools: TOOLS,
        simulations: SimulationMode::ALL
            .into_iter()
            .map(|m| SimulationEntry {
                key: m.key(),
                label: m.label(),
                required_points: m.point_count(),
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&catalog).context("serialize catalog")?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct MeasureReport<'a> {
    tool: &'a str,
    summary: String,
    classification: Option<String>,
    measurement: &'a Measurement,
    draw: &'a DrawList,
}

fn measure(key: &str, points: &[Point], cfg: SpineConfig, options: ToolOptions, canvas: (f64, f64)) -> Result<()> {
    let mut session = MeasureSession::new(key, cfg, canvas.0, canvas.1)?.with_options(options);
    let descriptor = session.descriptor();

    let mut outcome: Option<MeasureOutcome> = None;
    let closes_polygon = matches!(key, "polygon" | "stenosis");
    for (i, &pt) in points.iter().enumerate() {
        let last = i + 1 == points.len();
        let step = if last && closes_polygon {
            session.double_click(pt)?
        } else {
            session.click(pt)?
        };
        if step.is_some() {
            outcome = step;
        }
    }
    if descriptor.required_points.is_none() && !closes_polygon {
        if let Some(done) = session.finish()? {
            outcome = Some(done);
        }
    }

    let Some(outcome) = outcome else {
        match descriptor.required_points {
            Some(n) => bail!("{key} needs {n} points, got {}", points.len()),
            None => bail!("{key} did not complete with {} points", points.len()),
        }
    };

    tracing::info!(tool = descriptor.key, points = points.len(), "{}", outcome.measurement);
    let report = MeasureReport {
        tool: descriptor.key,
        summary: outcome.measurement.summary(),
        classification: outcome.measurement.classification().map(|c| c.to_string()),
        measurement: &outcome.measurement,
        draw: &outcome.draw,
    };
    let json = serde_json::to_string_pretty(&report).context("serialize measurement")?;
    println!("{json}");
    Ok(())
}

fn simulate(
    mode: SimulationMode,
    image_path: &Path,
    points: &[Point],
    out: &Path,
    guides: Option<&Path>,
    cfg: SpineConfig,
) -> Result<()> {
    ensure_input_file(image_path)?;
    let rgba = image::open(image_path)
        .with_context(|| format!("decode image: {image_path:?}"))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let raster = RasterBuffer::from_raw(width, height, rgba.into_raw()).context("wrap pixels")?;

    let mut session = SimulationSession::new(mode, cfg.simulation);
    session.set_source(raster);
    let mut output = None;
    for &pt in points {
        output = session.click(pt)?.or(output);
    }
    let Some(output) = output else {
        bail!("{mode} needs {} points, got {}", mode.point_count(), points.len());
    };

    let summary = output.summary();
    if let Some(path) = guides {
        let json = serde_json::to_string_pretty(&output.guides).context("serialize guides")?;
        write_file(path, &json).with_context(|| format!("write guides: {path:?}"))?;
    }

    let Some(composed) = image::RgbaImage::from_raw(width, height, output.raster.into_raw()) else {
        bail!("composed raster does not match {width}x{height}");
    };
    ensure_parent_dir(out)?;
    composed.save(out).with_context(|| format!("write image: {out:?}"))?;
    tracing::info!(mode = %mode, dropped = summary.dropped_pixels, "wrote {}", out.display());

    let json = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct RodReport {
    #[serde(flatten)]
    measurement: RodMeasurement,
    curve: Vec<CubicSegment>,
}

fn rod(points: &[Point], curvature: f64) -> Result<()> {
    let mut path = RodPath::new(curvature);
    for &pt in points {
        path.push(pt);
    }
    let measurement = path.measure(None)?;
    let report = RodReport {
        measurement,
        curve: path.curve(),
    };
    let json = serde_json::to_string_pretty(&report).context("serialize rod")?;
    println!("{json}");
    Ok(())
}

fn parse_points(raw: &str) -> Result<Vec<Point>> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> Result<Point> {
            let Some((x, y)) = pair.split_once(',') else {
                bail!("expected x,y but got {pair:?}");
            };
            let x: f64 = x.trim().parse().with_context(|| format!("x in {pair:?}"))?;
            let y: f64 = y.trim().parse().with_context(|| format!("y in {pair:?}"))?;
            Ok(Point::new(x, y))
        })
        .collect()
}

fn load_config(path: Option<&Path>) -> Result<SpineConfig> {
    let Some(path) = path else {
        return Ok(SpineConfig::default());
    };
    ensure_input_file(path)?;
    let text = std::fs::read_to_string(path).with_context(|| format!("read config: {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse config: {path:?}"))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display())),
        _ => Ok(()),
    }
}

fn ensure_input_file(input: &Path) -> Result<()> {
    match std::fs::metadata(input) {
        Ok(meta) => {
            if meta.is_file() {
                Ok(())
            } else {
                bail!("input is not a file: {input:?}");
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
