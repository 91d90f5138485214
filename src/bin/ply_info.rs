//! ply-info - Inspect an exported AR point cloud and mesh the tunnel.
//!
//! Parses an annotated ASCII PLY, reports what is inside, and can build
//! the variable-radius tube mesh from the centerline and wall points.
//!
//! ```bash
//! ply-info pointcloud.ply --obj tunnel.obj
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::process::ExitCode;

use cave_survey::{
    build_tube, estimate_radii, parse_ply, split_cloud, RadiusConfig, Result, SurveyError,
    TubeConfig,
};

struct Args {
    ply_path: Option<String>,
    obj_path: Option<String>,
    sides: usize,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut result = Args {
        ply_path: None,
        obj_path: None,
        sides: 16,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--obj" => {
                if i + 1 < args.len() {
                    result.obj_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--sides" => {
                if i + 1 < args.len() {
                    if let Ok(sides) = args[i + 1].parse() {
                        result.sides = sides;
                    }
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            path if !path.starts_with('-') => {
                result.ply_path = Some(path.to_string());
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
    println!("ply-info - Inspect an exported cave point cloud");
    println!();
    println!("USAGE:");
    println!("    ply-info <FILE> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --obj <FILE>            Mesh the tunnel and write Wavefront OBJ");
    println!("    --sides <N>             Vertices per mesh ring (default: 16)");
    println!("    -h, --help              Print help information");
}

fn run(ply_path: &str, args: &Args) -> Result<()> {
    let file = File::open(ply_path)?;
    let cloud = parse_ply(BufReader::new(file))?;
    let (centerline, walls) = split_cloud(&cloud.points);

    log::info!(
        "{}: {} vertices ({} path, {} wall), {} annotations",
        ply_path,
        cloud.points.len(),
        centerline.len(),
        walls.len(),
        cloud.annotations.len()
    );
    for (index, text) in &cloud.annotations {
        log::info!("  note at waypoint {index}: {text}");
    }
    if let Some(max_depth) = cloud
        .points
        .iter()
        .filter(|p| p.is_centerline())
        .map(|p| p.depth)
        .max_by(f32::total_cmp)
    {
        log::info!("max recorded depth: {max_depth:.2} m");
    }

    if let Some(obj_path) = &args.obj_path {
        if centerline.len() < 2 {
            return Err(SurveyError::InsufficientData(
                "need at least 2 path points to mesh a tunnel".into(),
            ));
        }
        let radii = estimate_radii(&centerline, &walls, &RadiusConfig::default());
        let mesh = build_tube(&centerline, &radii, &TubeConfig { sides: args.sides })?;
        let mut writer = BufWriter::new(File::create(obj_path)?);
        mesh.write_obj(&mut writer)?;
        log::info!(
            "wrote {} vertices / {} triangles to {obj_path}",
            mesh.vertices.len(),
            mesh.triangle_count()
        );
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
    let ply_path = match &args.ply_path {
        Some(path) => path.clone(),
        None => {
            eprintln!("Missing input file");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    match run(&ply_path, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
