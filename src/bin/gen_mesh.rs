use std::path::PathBuf;
use std::process::ExitCode;

use xmlmesh::{Error, GridConfig, LogLevel, Logger, Mesh};

/// Every generated element goes into this composite.
const FIXED_COMPOSITE_ID: usize = 2;

fn usage() {
    println!("Usage:");
    println!(" gen-mesh nx ny lx ly ux uy shape");
    println!(
        "  - Where nx,ny set the size of the grid, lx,ly,ux,uy set the coordinate bounds and shape is either 'Quad' or 'Tri'"
    );
    println!("  - e.g. gen-mesh 5 6 0.0 1.0  2.0 3.0  Quad");
    println!("    (generates a 5x6 quadrilateral grid from (0,1) -> (2,3)");
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> xmlmesh::Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::Config(format!("{name} [{value}]: {e}")))
}

fn config_from_args(args: &[String]) -> xmlmesh::Result<GridConfig> {
    let config = GridConfig {
        nx: parse("nx", &args[0])?,
        ny: parse("ny", &args[1])?,
        lx: parse("lx", &args[2])?,
        ly: parse("ly", &args[3])?,
        ux: parse("ux", &args[4])?,
        uy: parse("uy", &args[5])?,
        composite: FIXED_COMPOSITE_ID,
        shape: args[6].parse()?,
    };
    config.validate()?;
    Ok(config)
}

fn outfile_name(config: &GridConfig) -> PathBuf {
    PathBuf::from(format!("output/{}x{}_grid.xml", config.nx, config.ny))
}

fn run(args: &[String]) -> xmlmesh::Result<()> {
    let config = config_from_args(args)?;
    println!("Options are:");
    println!("{config:?}");

    let mesh = Mesh::structured_grid(&config)?;

    let mut log = Logger::stdout(LogLevel::Info).with_prefix("jac");
    let invalid = mesh.negative_jacobians();
    log.info(format_args!(
        "Found {} elements with negative Jacobian",
        invalid.len()
    ))?;
    for id in &invalid {
        log.info(format_args!("  element {id}"))?;
    }
    drop(log);

    let outfile = outfile_name(&config);
    if let Some(dir) = outfile.parent() {
        std::fs::create_dir_all(dir)?;
    }
    mesh.write_xml_file(&outfile)?;
    println!("Mesh written to {}", outfile.display());
    Ok(())
}

pub fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 7 {
        usage();
        return ExitCode::from(1);
    }
    xmlmesh::init_tracing();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}
