use dualmesh::{
    Error, Result,
    config::ExportOptions,
    dual::{DebugTrace, DualMesh, Progress},
    mesh::read_stl,
};
use env_logger::Env;
use log::info;
use std::{path::Path, time::Instant};

pub fn init_log(level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    init_log("info");

    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 3 || args.len() > 4 {
        return Err(Error::from(&format!(
            "usage: {} <input.stl> <output> [options.json]",
            args[0]
        )));
    }
    let (input, output) = (&args[1], &args[2]);

    let options = if let Some(fname) = args.get(3) {
        ExportOptions::from_json(fname)?
    } else {
        ExportOptions::default()
    };
    info!("{options:?}");

    let msh = read_stl(input)?;

    let progress = Progress::new(|stage, current, total| {
        if current == 0 {
            info!("{stage}: {total} items");
        }
        true
    });

    let now = Instant::now();
    let mut trace = DebugTrace::for_output(Path::new(output), &options);
    let dual = DualMesh::with_trace(&msh, &options, &progress, &mut trace)?;
    info!("dual mesh built in {:.2e}s", now.elapsed().as_secs_f64());

    if Path::new(output)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("vtu"))
    {
        dual.write_vtk(output)?;
    } else {
        dual.write(output)?;
    }

    Ok(())
}
