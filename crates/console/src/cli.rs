use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "promptwatch-console",
    version,
    about = "Terminal console for the prompt vulnerability classifier"
)]
pub(crate) struct Args {
    #[arg(long, default_value = "config/config.toml")]
    pub(crate) config: PathBuf,
    /// Overrides the endpoint from the config file.
    #[arg(long)]
    pub(crate) endpoint: Option<String>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}
