use clap::Parser;
use std::path::PathBuf;

use crate::layers::service::DEFAULT_SERVER;

#[derive(Parser, Debug)]
#[command(
    name = "aigc-monitor",
    version,
    about = "Terminal client for the AI-generated text detection service"
)]
pub(crate) struct Args {
    /// Base URL of the detection backend.
    #[arg(long, default_value = DEFAULT_SERVER)]
    pub(crate) server: String,
    /// Directory holding saved settings and theme. Defaults to the user config dir.
    #[arg(long)]
    pub(crate) store_dir: Option<PathBuf>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    /// Run one detection on this file (`-` for stdin) and print the report.
    #[arg(long)]
    pub(crate) text_file: Option<PathBuf>,
    /// Where to write the HTML report. In the UI, Ctrl+E writes here.
    #[arg(long)]
    pub(crate) html_out: Option<PathBuf>,
    #[arg(long)]
    pub(crate) api_base: Option<String>,
    #[arg(long)]
    pub(crate) api_key: Option<String>,
    #[arg(long)]
    pub(crate) model: Option<String>,
    #[arg(long)]
    pub(crate) temperature: Option<f64>,
}

impl Args {
    pub(crate) fn is_headless(&self) -> bool {
        self.text_file.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_backend() {
        let args = Args::try_parse_from(["aigc-monitor"]).expect("parse");
        assert_eq!(args.server, "http://127.0.0.1:8765");
        assert_eq!(args.log_dir, PathBuf::from("logs"));
        assert!(!args.is_headless());
        assert!(args.temperature.is_none());
    }

    #[test]
    fn headless_flags_parse() {
        let args = Args::try_parse_from([
            "aigc-monitor",
            "--text-file",
            "-",
            "--model",
            "gpt-4o",
            "--temperature",
            "0",
            "--html-out",
            "report.html",
        ])
        .expect("parse");
        assert!(args.is_headless());
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        assert_eq!(args.temperature, Some(0.0));
    }
}
