use std::path::PathBuf;
use std::process::ExitCode;

use xmlmesh::{LogLevel, Logger, Mesh};

/// Exit status when the mesh cannot be read or reported.
const FAILURE: u8 = 2;

fn run(mesh_fpath: PathBuf) -> xmlmesh::Result<()> {
    let mesh = Mesh::read_from_file(&mesh_fpath)?;
    let mut log = Logger::stdout(LogLevel::Info);
    mesh.print_stats(&mut log)?;
    Ok(())
}

pub fn main() -> ExitCode {
    let mut args = std::env::args_os();
    let program = args
        .next()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let args: Vec<_> = args.collect();
    if args.len() != 1 {
        println!("Usage: {program}: [path_to_mesh_xml]");
        return ExitCode::from(1);
    }
    xmlmesh::init_tracing();

    let mesh_fpath = PathBuf::from(&args[0]);
    match run(mesh_fpath) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(FAILURE)
        }
    }
}
