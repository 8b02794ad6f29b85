use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pmai-relay", version, about = "PMAI chat and link-scan relay")]
pub(crate) struct Args {
    /// Optional TOML config; built-in defaults are used when omitted.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, default_value = "0.0.0.0:8000")]
    pub(crate) listen_addr: String,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    #[arg(long, default_value_t = false)]
    pub(crate) log_json: bool,
}
