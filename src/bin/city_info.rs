//! CLI tool for inspecting CityJSON files
//!
//! Usage:
//!   cargo run --release --bin city_info -- <cityjson_file> [options]
//!
//! Options:
//!   --lod <n[,n...]>     LODs to select (default: 2)
//!   --prefer-solid       Prefer Solid over surface geometry at equal LOD
//!   --sequential         Resolve buildings on one thread
//!   --region <x1,y1,x2,y2>  Only list buildings intersecting this box
//!   --summary            Show summary stats only
//!   --export <file>      Write the loaded city back out as CityJSON
//!
//! Set RUST_LOG=debug for stage timings.

use std::env;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use cityjson_io::serialize_cityjson::DEFAULT_SCALE;
use cityjson_io::{city_to_file, load_city_file_with, Bounds, BuildingIndex, LoadOptions};

fn print_usage(program: &str) {
    eprintln!("Usage: {} <cityjson_file> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --lod <n[,n...]>          LODs to select (default: 2)");
    eprintln!("  --prefer-solid            Prefer Solid over surface geometry at equal LOD");
    eprintln!("  --sequential              Resolve buildings on one thread");
    eprintln!("  --region <x1,y1,x2,y2>    Only list buildings intersecting this box");
    eprintln!("  --summary                 Show summary stats only");
    eprintln!("  --export <file>           Write the loaded city back out as CityJSON");
}

fn parse_list<T: std::str::FromStr>(value: &str) -> anyhow::Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .split(',')
        .map(|part| part.trim().parse::<T>().with_context(|| format!("invalid value '{}'", part)))
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        return Ok(());
    }

    let path = &args[1];
    let mut options = LoadOptions::default();
    let mut region: Option<Bounds> = None;
    let mut summary_only = false;
    let mut export: Option<String> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--lod" => {
                i += 1;
                let value = args.get(i).context("--lod needs a value")?;
                options.lods = parse_list(value)?;
            }
            "--prefer-solid" => options.prefer_surface = false,
            "--sequential" => options.parallel = false,
            "--region" => {
                i += 1;
                let value = args.get(i).context("--region needs a value")?;
                match parse_list::<f64>(value)?.as_slice() {
                    &[x1, y1, x2, y2] => region = Some(Bounds::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))),
                    _ => bail!("--region expects x1,y1,x2,y2"),
                }
            }
            "--summary" => summary_only = true,
            "--export" => {
                i += 1;
                export = Some(args.get(i).context("--export needs a value")?.clone());
            }
            other => {
                print_usage(&args[0]);
                bail!("unknown option '{}'", other);
            }
        }
        i += 1;
    }

    let city = load_city_file_with(path, &options)?;
    let summary = city.summary();

    println!("File: {}", path);
    if let Some(b) = city.bounds() {
        println!("Bounds: ({:.3}, {:.3}) - ({:.3}, {:.3})", b.xmin, b.ymin, b.xmax, b.ymax);
    }
    println!("Buildings: {}", summary.buildings);
    println!("Building parts: {}", summary.building_parts);
    println!("Surfaces: {}", summary.surfaces);
    println!("Terrain: {} vertices, {} faces", summary.terrain_vertices, summary.terrain_faces);
    println!("Warnings: {}", summary.warnings);
    for warning in city.warnings() {
        println!("  - {}", warning);
    }

    if !summary_only {
        let selected: Vec<usize> = match &region {
            Some(bounds) => BuildingIndex::new(&city).query(bounds),
            None => (0..city.buildings().len()).collect(),
        };
        println!();
        for idx in selected {
            let building = &city.buildings()[idx];
            let lods: Vec<String> = building
                .geometry()
                .iter()
                .map(|(lod, ms)| format!("LOD{}: {} surfaces", lod, ms.len()))
                .collect();
            println!(
                "{}  parts={}  {}",
                building.id(),
                building.parts().len(),
                if lods.is_empty() { "no geometry".to_string() } else { lods.join(", ") }
            );
        }
    }

    if let Some(out) = export {
        city_to_file(&city, &out, DEFAULT_SCALE)?;
        println!("\nWrote {}", out);
    }

    Ok(())
}
