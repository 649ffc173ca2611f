use anyhow::{Result, bail};
use env_logger::Builder;
use log::{LevelFilter, info};
use std::path::PathBuf;

use raycheck::pipeline::{RunConfig, run};

fn main() -> Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let Some(path) = std::env::args().nth(1).map(PathBuf::from) else {
        bail!("Usage: raycheck <run.toml>");
    };

    let config = RunConfig::load(&path)?;
    info!("Starting run from {}", path.display());
    let response = run(&config)?;

    for (z, floor) in &response.power_map_legend {
        info!("Floor {z}: {:.2}% covered", floor.total);
    }
    Ok(())
}
