use std::io;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing(log_to_stderr: bool, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_target(false);

    match (json, log_to_stderr) {
        (true, true) => registry
            .with(layer.json().with_writer(io::stderr))
            .try_init()?,
        (true, false) => registry.with(layer.json()).try_init()?,
        (false, true) => registry.with(layer.with_writer(io::stderr)).try_init()?,
        (false, false) => registry.with(layer).try_init()?,
    }
    Ok(())
}
