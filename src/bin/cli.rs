//! trackdist CLI - host shell around the distance engine
//!
//! Usage:
//!   trackdist-cli run <input.csv> [--output <out.csv>] [--sequential] [--delay-ms <ms>]
//!   trackdist-cli compare <input.csv> [--delay-ms <ms>]
//!   trackdist-cli capacity [--cgroup-root <dir>]
//!
//! Input CSV columns: `timestamp,x,y,<track id column>` (x = longitude,
//! y = latitude); the track id column defaults to `track_id` and is chosen
//! with `--track-id-column`. Output keeps that column name and adds
//! `distance_from_previous` in kilometers (empty for the first fix of each
//! track).

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use trackdist::{
    CapacityDetector, Crs, EngineConfig, Executor, Fix, ParallelExecutor, SequentialExecutor,
    TrackCollection, compare_executors,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "trackdist-cli")]
#[command(about = "Successive-fix geodesic distances for GPS tracks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Per-track artificial delay in milliseconds (overrides config)
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Name of the input column holding the track identifier
    #[arg(long, global = true, default_value = "track_id")]
    track_id_column: String,

    /// Spatial reference system of the input coordinates
    #[arg(long, global = true, default_value = "EPSG:4326")]
    crs: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute distances and write the augmented CSV
    Run {
        /// Input CSV file
        input: PathBuf,

        /// Output CSV path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use the sequential executor
        #[arg(long)]
        sequential: bool,
    },

    /// Time the sequential and parallel executors on the same input
    Compare {
        /// Input CSV file
        input: PathBuf,
    },

    /// Print the detected worker capacity
    Capacity {
        /// Root of the cgroup filesystem
        #[arg(long)]
        cgroup_root: Option<PathBuf>,
    },
}

/// How an input file is read into a collection.
#[derive(Debug, Clone)]
struct InputFormat {
    track_id_column: String,
    crs: Crs,
}

/// Positions of the required columns in the input header.
struct Columns {
    timestamp: usize,
    x: usize,
    y: usize,
    track_id: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord, track_id_column: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .with_context(|| format!("missing column {:?}", name))
        };
        Ok(Self {
            timestamp: find("timestamp")?,
            x: find("x")?,
            y: find("y")?,
            track_id: find(track_id_column)?,
        })
    }
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(ms) = cli.delay_ms {
        config.partition_delay_ms = ms;
    }
    let format = InputFormat {
        track_id_column: cli.track_id_column,
        crs: Crs(cli.crs),
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            sequential,
        } => {
            let collection = load_csv(&input, &format)?;
            let result = if sequential {
                SequentialExecutor::new(&config).run(&collection)?
            } else {
                ParallelExecutor::new(config)
                    .with_sequential_fallback(true)
                    .run(&collection)?
            };
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_csv(&result, file)?;
                    println!("Wrote {} fixes to {}", result.len(), path.display());
                }
                None => write_csv(&result, io::stdout().lock())?,
            }
        }
        Commands::Compare { input } => {
            let collection = load_csv(&input, &format)?;
            let report = compare_executors(&collection, &config)?;

            println!("\n{}", "=".repeat(60));
            println!("Tracks:            {}", report.partitions);
            println!("Workers:           {}", report.workers);
            println!("Sequential:        {:?}", report.sequential_elapsed);
            println!("Parallel:          {:?}", report.parallel_elapsed);
            println!("Speedup:           {:.2}x", report.speedup());
            println!("Outputs identical: {}", report.outputs_match);
            println!("{}", "=".repeat(60));

            if !report.outputs_match {
                bail!("sequential and parallel outputs differ");
            }
        }
        Commands::Capacity { cgroup_root } => {
            if let Some(root) = cgroup_root {
                config.cgroup_root = root;
            }
            let detector = CapacityDetector::from_config(&config);
            println!("{}", detector.detect());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| value.parse::<NaiveDateTime>())
        .with_context(|| format!("invalid timestamp {:?}", value))
}

fn parse_coordinate(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64> {
    let value = record.get(index).unwrap_or_default().trim();
    value
        .parse()
        .with_context(|| format!("invalid {} value {:?}", name, value))
}

fn load_csv(path: &Path, format: &InputFormat) -> Result<TrackCollection> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let columns = Columns::locate(reader.headers()?, &format.track_id_column)
        .with_context(|| format!("reading header of {}", path.display()))?;

    let mut fixes = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let context = || format!("{}: row {}", path.display(), line + 1);
        let record = record.with_context(context)?;
        let timestamp = parse_timestamp(record.get(columns.timestamp).unwrap_or_default())
            .with_context(context)?;
        let x = parse_coordinate(&record, columns.x, "x").with_context(context)?;
        let y = parse_coordinate(&record, columns.y, "y").with_context(context)?;
        let track_id = record.get(columns.track_id).unwrap_or_default();
        fixes.push(Fix::new(timestamp, y, x, track_id));
    }

    log::info!(
        "Loaded {} fixes from {} (track id column {:?}, CRS {})",
        fixes.len(),
        path.display(),
        format.track_id_column,
        format.crs
    );
    let collection = TrackCollection::new(fixes, format.track_id_column.as_str());
    Ok(collection.with_crs(format.crs.clone()))
}

fn write_csv<W: Write>(collection: &TrackCollection, sink: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    writer.write_record([
        "timestamp",
        "x",
        "y",
        collection.track_id_column.as_str(),
        "distance_from_previous",
    ])?;
    for fix in &collection.fixes {
        let distance = fix
            .distance_from_previous
            .map(|d| d.to_string())
            .unwrap_or_default();
        writer.write_record([
            fix.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            fix.x().to_string(),
            fix.y().to_string(),
            fix.track_id.clone(),
            distance,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_input(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_uses_track_id_column_and_crs() {
        let file = write_input(
            "vehicle,timestamp,x,y\n\
             bus-1,2001-06-11 09:00:00,1.0,5.0\n\
             bus-1,2001-07-12 09:00:00,2.0,4.0\n",
        );
        let format = InputFormat {
            track_id_column: "vehicle".to_string(),
            crs: Crs("EPSG:3857".to_string()),
        };

        let collection = load_csv(file.path(), &format).unwrap();
        assert_eq!(collection.track_id_column, "vehicle");
        assert_eq!(collection.crs, Crs("EPSG:3857".to_string()));
        assert_eq!(collection.track_ids(), vec!["bus-1"]);
        assert_eq!(collection.fixes[1].x(), 2.0);
        assert_eq!(collection.fixes[1].y(), 4.0);
    }

    #[test]
    fn test_load_csv_missing_track_id_column() {
        let file = write_input("timestamp,x,y,track_id\n2001-06-11 09:00:00,1.0,5.0,ID_1\n");
        let format = InputFormat {
            track_id_column: "vehicle".to_string(),
            crs: Crs::wgs84(),
        };
        let err = load_csv(file.path(), &format).unwrap_err();
        assert!(format!("{:#}", err).contains("missing column \"vehicle\""));
    }

    #[test]
    fn test_write_csv_keeps_track_id_column_name() {
        let t0 = parse_timestamp("2001-06-11 09:00:00").unwrap();
        let collection = TrackCollection::new(
            vec![Fix::new(t0, 5.0, 1.0, "bus-1"), Fix::new(t0, 4.0, 2.0, "bus-1")],
            "vehicle",
        );
        let result = SequentialExecutor::default().run(&collection).unwrap();

        let mut out = Vec::new();
        write_csv(&result, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,x,y,vehicle,distance_from_previous")
        );
        assert_eq!(lines.next(), Some("2001-06-11 09:00:00,1,5,bus-1,"));
        assert!(lines.next().unwrap().starts_with("2001-06-11 09:00:00,2,4,bus-1,156.6"));
    }
}
