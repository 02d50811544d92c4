use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use handsign::camera::{self, DeviceCamera};
use handsign::config::Config;
use handsign::dispatch::{Dispatcher, EnigoKeySender, KeySender, LogKeySender};
use handsign::gesture::GESTURE_TABLE;
use handsign::hand_model::HandLandmarker;
use handsign::preview::PreviewWindow;
use handsign::{GestureController, Pipeline};

#[derive(Parser)]
#[command(name = "handsign")]
#[command(about = "Control media playback with hand gestures in front of a webcam")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera index
    #[arg(long)]
    camera: Option<u32>,

    /// Path to the hand landmark ONNX model
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Minimum hand presence score (0.0 - 1.0)
    #[arg(long)]
    min_presence: Option<f32>,

    /// Do not mirror the camera image
    #[arg(long)]
    no_mirror: bool,

    /// Recognise gestures but only log the keys instead of pressing them
    #[arg(long)]
    dry_run: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// List available cameras and exit
    #[arg(long)]
    list_cameras: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(index) = self.camera {
            config.camera.index = index;
        }
        if let Some(model) = &self.model {
            config.model.path = model.clone();
        }
        if let Some(min_presence) = self.min_presence {
            config.model.min_presence = min_presence;
        }
        if self.no_mirror {
            config.pipeline.mirror = false;
        }
        if self.dry_run {
            config.dispatch.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "handsign=debug" } else { "handsign=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if args.list_cameras {
        println!("{:<8} | Name", "Index");
        println!("{}", "-".repeat(40));
        for (index, name) in camera::list_cameras()? {
            println!("{:<8} | {}", index, name);
        }
        return Ok(());
    }

    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    print_banner();

    // Landmark model
    print!("Loading model...");
    let start = Instant::now();
    let mut landmarker = HandLandmarker::new(
        &config.model.path,
        config.model.input_size,
        config.model.min_presence,
        config.model.threads,
    )?;
    println!(" done ({:.2}s)", start.elapsed().as_secs_f32());

    // Camera; failing here exits non-zero before any loop runs
    println!("Starting camera...");
    let camera_config = config.camera.clone();
    let pipeline = Pipeline::start(move || DeviceCamera::open(&camera_config), &config.pipeline)
        .context("Initialization failed. Please check your camera and try again")?;

    let sender: Box<dyn KeySender> = if config.dispatch.enabled {
        match EnigoKeySender::new() {
            Ok(sender) => Box::new(sender),
            Err(e) => {
                warn!("{e}, falling back to dry run");
                Box::new(LogKeySender)
            }
        }
    } else {
        Box::new(LogKeySender)
    };
    let dispatcher = Dispatcher::new(sender, &config.dispatch);
    info!("key backend: {}", dispatcher.backend());

    let mut controller = GestureController::new(dispatcher, config.pipeline.mirror);
    let mut window = PreviewWindow::open("Media Control", config.camera.width, config.camera.height)?;

    println!("Press 'q' in the preview window to quit");
    println!();

    let result = pipeline.run(&mut controller, &mut landmarker, &mut window);
    drop(window);

    let summary = result?;
    info!(
        "processed {} frames, hand seen in {}, {} actions",
        summary.frames,
        summary.hands,
        summary.events.len()
    );
    println!("Gesture control system terminated.");
    Ok(())
}

fn print_banner() {
    println!("{}", "=".repeat(50));
    println!("{:^50}", "Gesture Control System");
    println!("{}", "=".repeat(50));
    println!();
    println!("Available gestures:");
    for (_, label) in GESTURE_TABLE {
        println!("  {:<26} {}", label.pose_hint(), label.display_name());
    }
    println!("{}", "=".repeat(50));
    println!();
}
