use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueHint};

use k2_core::cli::{print_telemetry, print_timeline, print_track_info, print_track_overview};
use k2_core::elevation::ElevationChart;
use k2_core::kettler::decode_status;
use k2_core::komoot_api::KomootClient;
use k2_core::playback::synthetic_ticks;
use k2_core::route::load_gpx_dir;
use k2_core::topics::Topics;
use k2_core::{
    build_timeline, error::from_json_str, format_status, load_config, read_gpx, K2Client,
    KettlerData, LogTransport, RouteRide, Track, TrackPoint, TrainerSession,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "K2 trainer tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effort intervals of a configured workout
    Timeline {
        #[arg(short, long, default_value = "k2.json", value_hint = ValueHint::FilePath)]
        config: PathBuf,
        /// Index into the configured workouts
        #[arg(short, long, default_value_t = 0)]
        workout: usize,
    },
    /// Play a workout against synthetic playback and log every command
    Simulate {
        #[arg(short, long, default_value = "k2.json", value_hint = ValueHint::FilePath)]
        config: PathBuf,
        #[arg(short, long, default_value_t = 0)]
        workout: usize,
        /// Seconds between samples (defaults to the configured poll interval)
        #[arg(long)]
        step: Option<f64>,
        /// Stop at this playback time (defaults to the end of the workout + one step)
        #[arg(long)]
        until: Option<f64>,
    },
    /// Decode a raw Kettler status line and show it as the status bar would
    Status { line: String },
    /// Summarize a track and optionally render its elevation profile
    Route {
        /// GPX file, or JSON file with `[[lat, lon, alt], ...]`
        #[arg(value_hint = ValueHint::FilePath, required_unless_present = "komoot")]
        track: Option<PathBuf>,
        /// Fetch a public komoot tour instead of reading a file
        #[arg(long, conflicts_with = "track")]
        komoot: Option<String>,
        /// Distance ridden (m) to report position, grade and power for
        #[arg(long)]
        at: Option<f64>,
        /// Write the elevation chart as SVG
        #[arg(long, value_hint = ValueHint::FilePath)]
        svg: Option<PathBuf>,
        #[arg(short, long, default_value = "k2.json", value_hint = ValueHint::FilePath)]
        config: PathBuf,
    },
    /// List every GPX track in a directory
    Tracks {
        #[arg(default_value = "tracks", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
    },
    /// Ride a track at constant speed and log every power and location command
    Ride {
        /// GPX or JSON track file
        #[arg(value_hint = ValueHint::FilePath)]
        track: PathBuf,
        /// Meters between simulated Kettler readings
        #[arg(long, default_value_t = 50.0)]
        step: f64,
        #[arg(short, long, default_value = "k2.json", value_hint = ValueHint::FilePath)]
        config: PathBuf,
    },
}

fn read_track_points(path: &Path) -> Result<Vec<TrackPoint>> {
    let is_gpx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gpx"));
    if is_gpx {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        Ok(read_gpx(BufReader::new(file))?)
    } else {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Ok(from_json_str(&text)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Timeline { config, workout } => {
            let cfg =
                load_config(&config).with_context(|| format!("reading {}", config.display()))?;
            let w = cfg
                .workout(workout)
                .ok_or_else(|| anyhow!("no workout #{workout} in {}", config.display()))?;
            print_timeline(&w.name, &build_timeline(w));
        }
        Command::Simulate { config, workout, step, until } => {
            let cfg =
                load_config(&config).with_context(|| format!("reading {}", config.display()))?;
            let w = cfg
                .workout(workout)
                .ok_or_else(|| anyhow!("no workout #{workout} in {}", config.display()))?;

            let step = step.unwrap_or(cfg.poll_interval_ms as f64 / 1000.0);
            let until = until.unwrap_or(w.final_time() + step);

            let topics = Topics::new(cfg.mqtt.base_topic.clone());
            let client = K2Client::new(LogTransport, topics.clone());
            let mut session = TrainerSession::new(w, cfg.power, client, topics);
            let n = session.run(synthetic_ticks(0.0, until, step));
            log::info!("{n} effort changes dispatched");
            print!("{}", session.metrics().gather_text());
            session.finish();
        }
        Command::Status { line } => {
            let data = decode_status(&line)?;
            print_telemetry(&format_status(&data));
        }
        Command::Route { track, komoot, at, svg, config } => {
            let points: Vec<TrackPoint> = match (track, komoot) {
                (_, Some(id)) => KomootClient::new().fetch_track(&id)?,
                (Some(path), None) => read_track_points(&path)?,
                (None, None) => bail!("either a track file or --komoot is required"),
            };

            let track = Track::new(points.clone())?;
            print_track_overview(&track.overview());

            if let Some(d) = at {
                let cfg = load_config(&config)?;
                let info = track.info_at_distance(d);
                print_track_info(d, &info, cfg.grade_power.power_for_grade(info.grade));
            }

            if let Some(out) = svg {
                let mut chart = ElevationChart::new(&points, Vec::new())?;
                if let Some(d) = at {
                    chart.set_position(d);
                }
                fs::write(&out, chart.to_svg())
                    .with_context(|| format!("writing {}", out.display()))?;
                log::info!("elevation chart written to {}", out.display());
            }
        }
        Command::Tracks { dir } => {
            let tracks =
                load_gpx_dir(&dir).with_context(|| format!("listing {}", dir.display()))?;
            for (i, (path, track)) in tracks.iter().enumerate() {
                println!("#{i} {}", path.display());
                print_track_overview(&track.overview());
            }
        }
        Command::Ride { track, step, config } => {
            if step <= 0.0 {
                bail!("--step must be positive");
            }
            let cfg = load_config(&config)?;
            let topics = Topics::new(cfg.mqtt.base_topic.clone());
            let track = Track::new(read_track_points(&track)?)?;
            print_track_overview(&track.overview());

            let mut client = K2Client::new(LogTransport, topics.clone());
            let mut ride = RouteRide::new(track, cfg.grade_power, topics);
            ride.start(&mut client);
            let mut distance = 0.0;
            while !ride.is_finished() {
                let reading = KettlerData { calc_distance: Some(distance), ..Default::default() };
                if let Some(info) = ride.on_telemetry(&reading, &mut client) {
                    let watts = cfg.grade_power.power_for_grade(info.grade).trunc();
                    print_track_info(distance, &info, watts);
                }
                distance += step;
            }
            print!("{}", ride.metrics().gather_text());
        }
    }
    Ok(())
}
