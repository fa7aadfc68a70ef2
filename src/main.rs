use std::path::PathBuf;
use std::process;

use anyhow::{bail, Result};

use microstab::io::tiff::{read_stack, write_stack, Stack};
use microstab::{Stabilizer, Strategy};

fn usage() -> ! {
    eprintln!("usage: microstab <input.tif> <output.tif> [optical-flow|feature-match]");
    process::exit(2);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let input: PathBuf = match args.next() {
        Some(p) => p.into(),
        None => usage(),
    };
    let output: PathBuf = match args.next() {
        Some(p) => p.into(),
        None => usage(),
    };
    let strategy = match args.next().as_deref() {
        None | Some("optical-flow") => Strategy::OpticalFlow,
        Some("feature-match") => Strategy::FeatureMatch,
        Some(other) => bail!("unknown strategy {other:?}"),
    };

    let stack = read_stack(&input)?;
    println!(
        "Loaded {} with {} time frames",
        input.display(),
        stack.num_frames()
    );

    let stabilizer = Stabilizer::new(strategy);
    let corrected = match stack {
        Stack::U8(volume) => Stack::U8(stabilizer.stabilize(&volume, Stack::AXES)?),
        Stack::U16(volume) => Stack::U16(stabilizer.stabilize(&volume, Stack::AXES)?),
    };

    write_stack(&output, &corrected)?;
    println!("Wrote stabilized stack to {}", output.display());
    Ok(())
}
