//! Kinedrive CLI - run velocity-controlled drives from scene files

use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::Level;

use kinedrive::config::SceneConfig;
use kinedrive::drive::DriveReport;
use kinedrive::physics::PhysicsWorld;
use kinedrive::scenario::{compare_sliding, run_scene};
use kinedrive::Result;

#[derive(Parser)]
#[command(name = "kinedrive")]
#[command(about = "Kinematic drive runner for navigation-filtered scenes", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scene's drive once and print a summary
    Run {
        /// Path to the scene TOML file
        scene: PathBuf,
        /// Hard-stop blocked motion instead of sliding along obstacles
        #[arg(long)]
        no_sliding: bool,
        /// Override the drive duration in seconds
        #[arg(long)]
        duration: Option<f32>,
        /// Write every step's pose to this JSON file
        #[arg(long)]
        trace: Option<PathBuf>,
    },
    /// Run the sliding and non-sliding variants and compare them
    Compare {
        /// Path to the scene TOML file
        scene: PathBuf,
    },
    /// Validate a scene file and list its objects
    Check {
        /// Path to the scene TOML file
        scene: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Run {
            scene,
            no_sliding,
            duration,
            trace,
        } => run_command(&scene, no_sliding, duration, trace.as_deref()),
        Commands::Compare { scene } => compare_command(&scene),
        Commands::Check { scene } => check_command(&scene),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Run Command
// =============================================================================

fn run_command(path: &Path, no_sliding: bool, duration: Option<f32>, trace: Option<&Path>) -> Result<()> {
    let mut scene = SceneConfig::from_file(path)?;
    if let (Some(duration), Some(drive)) = (duration, scene.drive.as_mut()) {
        drive.duration = duration;
        scene.validate()?;
    }

    let report = run_scene(&scene, !no_sliding)?;
    print_summary(&report);

    if let Some(trace_path) = trace {
        let writer = BufWriter::new(File::create(trace_path)?);
        serde_json::to_writer_pretty(writer, &report)?;
        println!("Trace written to {}", trace_path.display());
    }
    Ok(())
}

// =============================================================================
// Compare Command
// =============================================================================

fn compare_command(path: &Path) -> Result<()> {
    let scene = SceneConfig::from_file(path)?;
    let [sliding, non_sliding] = compare_sliding(&scene)?;

    print_summary(&sliding);
    println!();
    print_summary(&non_sliding);
    println!();
    println!(
        "Sliding travelled {:.3} m more and collided {} times fewer",
        sliding.distance - non_sliding.distance,
        non_sliding.collisions as i64 - sliding.collisions as i64
    );
    Ok(())
}

// =============================================================================
// Check Command
// =============================================================================

fn check_command(path: &Path) -> Result<()> {
    let scene = SceneConfig::from_file(path)?;
    let world = PhysicsWorld::from_scene(&scene, scene.simulator.clone())?;

    println!("Scene {} is valid", path.display());
    println!(
        "  timestep={:.4}s gravity={:?} allow_sliding={}",
        scene.simulator.timestep, scene.simulator.gravity, scene.simulator.allow_sliding
    );
    for id in world.object_ids() {
        let object = world.object(id)?;
        println!("  [{}] {} ({:?})", id, object.name, object.motion_type);
    }
    match &scene.drive {
        Some(drive) => println!(
            "  drive: object={} duration={}s time_step={:.4}s wander={}",
            drive.object,
            drive.duration,
            drive.time_step,
            drive.wander.is_some()
        ),
        None => println!("  drive: none"),
    }
    Ok(())
}

fn print_summary(report: &DriveReport) {
    let mode = if report.allow_sliding { "sliding" } else { "no sliding" };
    println!("Drive ({})", mode);
    println!("  steps:        {}", report.steps);
    println!("  elapsed:      {:.3}s", report.elapsed);
    println!(
        "  collisions:   {} ({:.1}%)",
        report.collisions,
        report.collision_fraction() * 100.0
    );
    println!("  distance:     {:.3} m", report.distance);
    println!("  displacement: {:.3} m", report.displacement());
    println!(
        "  final pose:   translation={:?} rotation={:?}",
        report.final_translation, report.final_rotation
    );
}
