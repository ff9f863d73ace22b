//! Runs a rigid-body scenario and prints its trajectory to stdout. Pass a TOML scenario file as the only
//! argument, or nothing for the built-in hover-and-spin demo. Set `RUST_LOG` for diagnostics on stderr.
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

mod scenario;

use scenario::Scenario;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let scenario = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Scenario::load(&path)?,
        None => Scenario::default(),
    };
    let out = scenario.run(std::io::stdout().lock())?;
    drop(out);
    Ok(())
}
