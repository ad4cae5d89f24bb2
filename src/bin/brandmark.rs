//! brandmark - render and export parametric logo presets

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use brandmark_renderer::{BrandPreset, Configurable, CustomPreset, Studio};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "brandmark")]
#[command(about = "Parametric logo renderer")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Custom template documents to register before running
    #[arg(long = "template", global = true)]
    templates: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available presets
    List,

    /// Render a preset to PNG or SVG
    Render {
        /// Preset identifier
        preset: String,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,

        /// Canvas size in pixels
        #[arg(short, long, default_value_t = 512)]
        size: u32,

        /// Animation time in seconds
        #[arg(short, long, default_value_t = 0.0)]
        time: f64,

        /// Parameter override as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Brand preset JSON applied before the overrides
        #[arg(long)]
        import: Option<PathBuf>,

        /// Write SVG instead of PNG
        #[arg(long)]
        svg: bool,
    },

    /// Print the resolved parameter set as brand preset JSON
    Export {
        /// Preset identifier
        preset: String,

        /// Parameter override as key=value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Name stored in the payload (defaults to the preset identifier)
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut studio = Studio::new();
    for path in &cli.templates {
        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let template = CustomPreset::from_json(&json).with_context(|| format!("loading template {}", path.display()))?;
        info!(id = template.document().id.as_str(), "registered custom template");
        studio.register(template);
    }

    match cli.command {
        Commands::List => {
            for preset in studio.registry().iter() {
                println!("{:<18} {}", preset.id(), preset.name());
            }
        }

        Commands::Render {
            preset,
            out,
            size,
            time,
            overrides,
            import,
            svg,
        } => {
            studio.select(&preset)?;
            if let Some(path) = import {
                apply_import(&mut studio, &preset, &path)?;
            }
            apply_overrides(&mut studio, &overrides)?;

            if svg {
                let document = studio.render_svg(size as f64, size as f64, time)?;
                fs::write(&out, document).with_context(|| format!("writing {}", out.display()))?;
            } else {
                let image = studio.render_image(size, size, time)?;
                image.save(&out).with_context(|| format!("writing {}", out.display()))?;
            }
            info!(preset = preset.as_str(), size, time, out = %out.display(), "rendered");
        }

        Commands::Export {
            preset,
            overrides,
            name,
        } => {
            studio.select(&preset)?;
            apply_overrides(&mut studio, &overrides)?;
            let profile = studio.export_profile(name.as_deref().unwrap_or(&preset));
            println!("{}", profile.to_json_pretty()?);
        }
    }

    Ok(())
}

fn apply_import(studio: &mut Studio, preset: &str, path: &Path) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let profile = BrandPreset::from_json(&json).with_context(|| format!("importing {}", path.display()))?;
    if profile.preset != preset {
        bail!("{} is a `{}` preset, not `{}`", path.display(), profile.preset, preset);
    }
    studio.apply_profile(&profile)?;
    Ok(())
}

fn apply_overrides(studio: &mut Studio, overrides: &[String]) -> Result<()> {
    for entry in overrides {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("override `{entry}` must look like key=value");
        };
        if !studio.set_param_str(key.trim(), value.trim()) {
            warn!(key, value, "override ignored");
        }
    }
    Ok(())
}
