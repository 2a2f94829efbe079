//! Demo: run the capture-track loop over the synthetic camera and print
//! the 6-DOF output stream.

use std::error::Error;
use std::time::{Duration, Instant};

use clap::Parser;
use log::LevelFilter;

use head_track::synth::{sweep_script, SyntheticCamera, SyntheticExtractor};
use head_track::{Tracker, TrackerConfig};

#[derive(Parser, Debug)]
#[command(name = "head-track", about = "Synthetic head-tracking demo")]
struct Args {
    /// Number of synthetic frames to play back.
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Yaw sweep amplitude, degrees.
    #[arg(long, default_value_t = 20.0)]
    yaw: f64,

    /// Distance of the rig from the camera, millimetres.
    #[arg(long, default_value_t = 900.0)]
    depth: f64,

    /// Diagonal field of view, degrees.
    #[arg(long, default_value_t = 56)]
    fov: u32,

    /// Output sample interval, milliseconds.
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    #[arg(long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    head_track::core::init_with_level(level)?;

    let config = TrackerConfig {
        camera_name: "synthetic".into(),
        fov: args.fov,
        ..TrackerConfig::default()
    };
    let camera = SyntheticCamera::new(
        &config.model()?,
        sweep_script(args.frames, args.yaw.to_radians(), args.depth),
    );

    let mut tracker = Tracker::new(
        config,
        Box::new(camera),
        Box::new(SyntheticExtractor::default()),
        None,
    )?;
    tracker.start_tracking()?;
    log::info!("tracking {} synthetic frames", args.frames);

    // The synthetic camera delivers a frame every millisecond or so; keep
    // sampling until the playback is over, then a little longer to show
    // that the last pose stays published.
    let deadline = Instant::now() + Duration::from_millis(args.frames as u64 * 2 + 500);
    while Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(args.interval_ms));
        match tracker.pose_data() {
            Some([yaw, pitch, roll, x, y, z]) => println!(
                "yaw {yaw:7.2}  pitch {pitch:7.2}  roll {roll:7.2}  \
                 x {x:7.2}  y {y:7.2}  z {z:7.2}  ({} pts)",
                tracker.point_count()
            ),
            None => println!("no pose yet"),
        }
    }

    tracker.stop_tracking();
    log::info!("done");
    Ok(())
}
