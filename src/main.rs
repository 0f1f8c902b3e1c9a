//! touring cli - replay location logs through the ride tracker and manage trip plans

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use argopt::{cmd_group, subcmd};
use csv::Reader;
use env_logger::Env;
use log::warn;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use touring::sources::{CsvSource, FieldsConfiguration};
use touring::{
    Conversion, DistanceUnit, LocationSource, RideGpx, RideReadout, RideTracker, TrackerConfig,
    TripRepository,
};

/// CLI of touring - Track rides from your raw GPS data
#[cmd_group(commands = [replay, plans, delete])]
fn main() -> Result<(), String> {}

/// Replay a CSV location log through the ride tracker
#[subcmd]
fn replay(
    /// CSV location log
    csv_path: String,
    /// GPX path file destination
    destination: String,
    /// Trip plan file to ride and record the ride on
    #[opt(long)]
    plan: Option<String>,
    /// Continue the ride already recorded on the trip plan
    #[opt(long)]
    resume: bool,
    /// Trip plans directory. Default: <data dir>/touring
    #[opt(long)]
    plans_dir: Option<String>,
    /// Tracker, units and fields configuration. Default: .touring.yaml, ~/.touring.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let configs = load_configs(config);

    let csv = File::open(csv_path)
        .map_err(|e| format!("Failed on open the CSV file: {}", e.to_string()))?;
    let mut source = CsvSource::new(Reader::from_reader(csv), Some(configs.fields));
    let positions = source.fetch().map_err(|e| e.to_string())?;

    let destination = File::create(destination)
        .map_err(|e| format!("Failed on create the destination file: {}", e.to_string()))?;

    let repo = TripRepository::new(plans_path(plans_dir));
    let mut tracker = RideTracker::new(configs.tracker);

    // a plan that can't be loaded only means riding without one
    let mut trip_plan = plan.and_then(|name| tracker.load_plan(&repo, &name).ok());
    if resume {
        if let Some(tp) = &trip_plan {
            tracker.resume_plan(tp).map_err(|e| e.to_string())?;
        }
    }

    let changed = tracker.replay(&positions);

    let end = positions
        .last()
        .map(|p| p.time)
        .unwrap_or_else(OffsetDateTime::now_utc);
    let state = tracker.into_state();

    let readout = RideReadout::new(&state, &Conversion::new(configs.units), end, UtcOffset::UTC);
    println!("positions: {} ({} state updates)", positions.len(), changed);
    println!("status:    {:?}", state.status);
    println!("distance:  {} / {}", readout.distance, readout.total_distance);
    println!("time:      {}", readout.trip_time);
    println!("speed:     avg {} max {}", readout.avg_speed, readout.max_speed);
    println!("eta:       {}", readout.eta);

    let gpx = match &mut trip_plan {
        Some(tp) => {
            tp.record_ride(&state, end);
            match repo.save(tp) {
                Ok(file_name) => println!("plan:      {}", file_name),
                Err(e) => warn!("Ride not recorded on the trip plan: {}", e),
            }
            RideGpx::from_plan(tp)
        }
        None => {
            let mut gpx = RideGpx::empty();
            gpx.ride("ride", &state.route_points);
            gpx
        }
    };

    gpx.write(BufWriter::new(destination))
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// List the stored trip plans
#[subcmd]
fn plans(
    /// Trip plans directory. Default: <data dir>/touring
    #[opt(long)]
    plans_dir: Option<String>,
    /// Units configuration. Default: .touring.yaml, ~/.touring.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let conversion = Conversion::new(load_configs(config).units);
    let repo = TripRepository::new(plans_path(plans_dir));

    for (file_name, tp) in repo.list().map_err(|e| e.to_string())? {
        let planned = tp.total_distance().unwrap_or(0.0);
        let ridden = match tp.time_start {
            Some(start) => format!(
                "ridden {:.1} from {}",
                conversion.distance(tp.trip_distance),
                start
            ),
            None => "not ridden".to_string(),
        };
        println!(
            "{}\t{}\t{:.1} planned, {}",
            file_name,
            tp.name,
            conversion.distance(planned),
            ridden
        );
    }

    Ok(())
}

/// Delete a stored trip plan
#[subcmd]
fn delete(
    /// Trip plan file
    file_name: String,
    /// Trip plans directory. Default: <data dir>/touring
    #[opt(long)]
    plans_dir: Option<String>,
) -> Result<(), String> {
    init_logging();

    TripRepository::new(plans_path(plans_dir))
        .delete(&file_name)
        .map_err(|e| e.to_string())
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info")).try_init();
}

fn plans_path(provided: Option<String>) -> PathBuf {
    if let Some(dir) = provided {
        return PathBuf::from(dir);
    }

    match dirs::data_dir() {
        Some(data) => data.join("touring"),
        None => PathBuf::from("."),
    }
}

const CONFIG_FILE: &str = ".touring.yaml";

/// Config files by priority: the provided one, the working dir, then home
fn config_paths(provided: Option<String>) -> Vec<PathBuf> {
    provided
        .map(PathBuf::from)
        .into_iter()
        .chain([PathBuf::from(CONFIG_FILE)])
        .chain(dirs::home_dir().map(|home| home.join(CONFIG_FILE)))
        .collect()
}

/// First readable config file, defaults when there is none or it's invalid
fn load_configs(provided: Option<String>) -> Configs {
    let found = config_paths(provided)
        .into_iter()
        .find_map(|path| fs::read_to_string(&path).ok().map(|yaml| (path, yaml)));

    let Some((path, yaml)) = found else {
        return Configs::default();
    };

    serde_yaml::from_str(&yaml).unwrap_or_else(|e| {
        warn!("Ignoring invalid configuration {}: {}", path.display(), e);
        Configs::default()
    })
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Configs {
    pub tracker: TrackerConfig,
    pub units: DistanceUnit,
    pub fields: FieldsConfiguration,
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "tracker: {}\nfields: {}";

    let conf: Configs = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;

    assert_eq!(Configs::default(), conf);

    let yaml = concat!(
        "tracker:\n",
        "  auto_start_speed: 2.2\n",
        "units: km\n",
        "fields:\n",
        "  time: ts\n",
        "  flip_coordinates: true\n",
    );

    let conf: Configs = serde_yaml::from_str(&yaml).map_err(|e| e.to_string())?;

    assert_eq!(
        Configs {
            tracker: TrackerConfig {
                auto_start_speed: 2.2,
                max_pause_gap: 30,
                tick_interval_ms: 1000,
                zero_speed_when_paused: true,
            },
            units: DistanceUnit::Km,
            fields: FieldsConfiguration {
                time: "ts".to_string(),
                coordinates: "coordinates".to_string(),
                speed: "speed".to_string(),
                elevation: "elevation".to_string(),
                flip_coordinates: true,
            },
        },
        conf
    );

    Ok(())
}

#[test]
fn config_lookup_order() {
    let paths = config_paths(Some("custom.yaml".to_string()));
    assert_eq!(PathBuf::from("custom.yaml"), paths[0]);
    assert_eq!(PathBuf::from(CONFIG_FILE), paths[1]);

    let paths = config_paths(None);
    assert_eq!(PathBuf::from(CONFIG_FILE), paths[0]);
    if let Some(home) = dirs::home_dir() {
        assert_eq!(Some(&home.join(CONFIG_FILE)), paths.last());
    }

    let missing = "this/config/does/not/exist.yaml".to_string();
    let conf = load_configs(Some(missing));
    assert!(conf.tracker.auto_start_speed > 0.0);
}
