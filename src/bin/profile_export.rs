//! profile-export - Render and export a survey from a station store.
//!
//! Reads the stations saved by a survey session (a directory with
//! `stations.json` and `counter.json`), reconstructs the 2D profile and
//! writes any of: an SVG drawing, a Therion centerline file, a CSV dump.
//!
//! ```bash
//! profile-export --store ./survey-data --svg profile.svg --therion sump.thr --csv dump.csv
//! ```

use std::fs;
use std::io::Write;
use std::process::ExitCode;

use cave_survey::{
    csv_export, reconstruct, render_profile_svg, therion_export, JsonFileStore, ProfileConfig,
    RecordStore, Result, TherionConfig,
};

struct Args {
    store_dir: String,
    svg_path: Option<String>,
    therion_path: Option<String>,
    csv_path: Option<String>,
    units_per_meter: f32,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args {
        store_dir: "survey-data".to_string(),
        svg_path: None,
        therion_path: None,
        csv_path: None,
        units_per_meter: 20.0,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    result.store_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--svg" => {
                if i + 1 < args.len() {
                    result.svg_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--therion" => {
                if i + 1 < args.len() {
                    result.therion_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--csv" => {
                if i + 1 < args.len() {
                    result.csv_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--scale" => {
                if i + 1 < args.len() {
                    if let Ok(scale) = args[i + 1].parse() {
                        result.units_per_meter = scale;
                    }
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    result
}

fn print_help() {
    println!("profile-export - Render and export a cave survey");
    println!();
    println!("USAGE:");
    println!("    profile-export [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -s, --store <DIR>       Station store directory (default: survey-data)");
    println!("    --svg <FILE>            Write the profile drawing as SVG");
    println!("    --therion <FILE>        Write a Therion centerline file");
    println!("    --csv <FILE>            Write all stations as CSV");
    println!("    --scale <N>             Screen units per meter (default: 20)");
    println!("    -h, --help              Print help information");
}

fn run(args: &Args) -> Result<()> {
    let store = JsonFileStore::new(&args.store_dir)?;
    let stations = store.load_all()?;
    log::info!("loaded {} stations from {}", stations.len(), args.store_dir);

    if let Some(path) = &args.csv_path {
        fs::write(path, csv_export(&stations))?;
        log::info!("wrote CSV to {path}");
    }

    if let Some(path) = &args.therion_path {
        let text = therion_export(&stations, &TherionConfig::default())?;
        fs::write(path, text)?;
        log::info!("wrote Therion centerline to {path}");
    }

    if let Some(path) = &args.svg_path {
        let config = ProfileConfig {
            units_per_meter: args.units_per_meter,
        };
        let profile = reconstruct(&stations, &config)?;
        log::info!(
            "profile: {} segments, {:.1} m total",
            profile.segment_distances.len(),
            profile.total_length_m()
        );
        svg::save(path, &render_profile_svg(&profile)).map_err(cave_survey::SurveyError::Io)?;
        log::info!("wrote SVG to {path}");
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = parse_args();
    if args.svg_path.is_none() && args.therion_path.is_none() && args.csv_path.is_none() {
        eprintln!("Nothing to do: pass at least one of --svg, --therion, --csv");
        print_help();
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
