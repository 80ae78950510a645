//! Ember CLI
//!
//! Play, validate, and scaffold scene projects headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_scene::{schema, FsAssets, SceneOrchestrator, SequenceController};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod project;
mod script;

use config::EmberConfig;
use script::Player;

const DEFAULT_SCRIPT: &str = "v wait:3 t wait:1 v wait:3 t wait:1 v wait:3";

#[derive(Parser)]
#[command(name = "ember")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Ember scene player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project directory (holding ember.toml)
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scene with scripted input
    Play {
        /// Scene id (scenes/configs/<id>.json)
        scene: String,

        /// Input script, e.g. "v wait:2 t wait:1 v"
        #[arg(short, long, default_value = DEFAULT_SCRIPT)]
        script: String,
    },

    /// Play a novel's scenes in order with scripted input
    Novel {
        /// Novel id (novels/<id>.json); defaults to the project's novel
        id: Option<String>,

        /// Input script; use n/p to move between scenes
        #[arg(short, long, default_value = DEFAULT_SCRIPT)]
        script: String,
    },

    /// Load and validate scene configs and their geometry without playing
    Validate {
        /// Scene ids; all of scenes/configs when omitted
        scenes: Vec<String>,
    },

    /// Print the authoring schema for every animation and geometry type
    Schema {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a new Ember project
    New {
        /// Project name
        name: String,
    },

    /// Initialize an Ember project in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Play { scene, script } => cmd_play(&cli.project, &scene, &script),
        Commands::Novel { id, script } => cmd_novel(&cli.project, id.as_deref(), &script),
        Commands::Validate { scenes } => cmd_validate(&cli.project, &scenes),
        Commands::Schema { output } => cmd_schema(output.as_deref()),
        Commands::New { name } => cmd_new(&name),
        Commands::Init => cmd_init(),
    }
}

fn load_assets(project: &Path) -> Result<(EmberConfig, FsAssets)> {
    let config = EmberConfig::load_or_default(project)?;
    let assets = FsAssets::new(config.asset_root(project));
    Ok((config, assets))
}

fn play(
    config: &EmberConfig,
    mut sequence: SequenceController<FsAssets>,
    script: &str,
) -> Result<()> {
    let steps = script::parse(script)?;
    sequence.start().context("Failed to load the first scene")?;

    let mut player = Player::new(sequence, config.key_bindings()?, config.player.frame_time());
    player.run(&steps)?;

    let orchestrator = player.sequence().orchestrator();
    info!(
        "Finished at t={:.2}s on scene {} ({:?}, {} nodes on stage)",
        player.elapsed(),
        player.sequence().current_id().unwrap_or("-"),
        orchestrator.state(),
        orchestrator.stage().len()
    );
    Ok(())
}

fn cmd_play(project: &Path, scene: &str, script: &str) -> Result<()> {
    let (config, assets) = load_assets(project)?;
    info!("Playing scene {} from {}", scene, assets.root().display());

    let orchestrator = SceneOrchestrator::new(assets, config.player.surface());
    let sequence = SequenceController::new(orchestrator, vec![scene.to_string()]);
    play(&config, sequence, script)
}

fn cmd_novel(project: &Path, id: Option<&str>, script: &str) -> Result<()> {
    let (config, assets) = load_assets(project)?;
    let id = id
        .or(config.project.novel.as_deref())
        .context("No novel named and ember.toml has no [project] novel")?
        .to_string();
    info!("Playing novel {}", id);

    let sequence = SequenceController::from_novel(assets, config.player.surface(), &id)
        .with_context(|| format!("Failed to load novel '{}'", id))?;
    play(&config, sequence, script)
}

fn cmd_validate(project: &Path, scenes: &[String]) -> Result<()> {
    let (config, assets) = load_assets(project)?;
    let ids = if scenes.is_empty() {
        scene_ids(&assets.root().join("scenes/configs"))?
    } else {
        scenes.to_vec()
    };
    if ids.is_empty() {
        warn!("No scenes to validate");
        return Ok(());
    }

    let mut orchestrator = SceneOrchestrator::new(assets, config.player.surface());
    let mut failed = 0;
    for id in &ids {
        match orchestrator.load_scene_by_id(id) {
            Ok(()) => info!(
                "{}: ok (image: {}, geometry: {}, text: {})",
                id,
                orchestrator.image_track().map_or("-", |t| t.name()),
                orchestrator.geometry_track().map_or("-", |t| t.name()),
                orchestrator.text_track().map_or("-", |t| t.name()),
            ),
            Err(err) => {
                failed += 1;
                warn!("{}: {}", id, err);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} scenes failed validation", failed, ids.len());
    }
    info!("All {} scenes valid", ids.len());
    Ok(())
}

fn scene_ids(dir: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut ids = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

fn cmd_schema(output: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(&schema::all_schemas())?;
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Schema written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn cmd_new(name: &str) -> Result<()> {
    info!("Creating new project: {}", name);

    let path = PathBuf::from(name);
    if path.exists() {
        anyhow::bail!("Directory '{}' already exists", name);
    }

    fs::create_dir_all(&path)?;
    project::create_project(&path, name)?;

    info!("Project created at {}/", name);
    info!("To get started:");
    info!("  cd {}", name);
    info!("  ember play intro");

    Ok(())
}

fn cmd_init() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let name = cwd
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("ember_project");

    if cwd.join("ember.toml").exists() {
        anyhow::bail!("This directory already contains an ember.toml");
    }

    project::create_project(&cwd, name)?;

    info!("Project initialized!");
    info!("Run `ember play intro` to try the sample scene");

    Ok(())
}
