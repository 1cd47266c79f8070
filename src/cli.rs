//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::model::RunConfig;

const HOST_HELP: &str = "\
Image host:
  Uploads go to Gyazo anonymously by default; no account is needed.
  To use Imgur instead, set SNAPUP_HOST=imgur and SNAPUP_IMGUR_CLIENT_ID
  (register one at https://api.imgur.com/oauth2/addclient), or put
  \"host\" and \"imgur_client_id\" in <config dir>/snapup/config.json.
  SNAPUP_UPLOAD_URL points either protocol at another endpoint.

Each uploaded URL is also printed to stdout, one per line.";

/// Screenshot a region, upload it and copy the link
///
/// With no arguments, capture one region. With FILE/URL arguments, upload
/// those instead.
#[derive(Debug, Parser)]
#[command(name = "snapup", version)]
#[command(about = "Screenshot a region, upload it and copy the link")]
#[command(after_help = HOST_HELP)]
pub struct Cli {
    /// Local files or image URLs to upload instead of capturing
    #[arg(value_name = "FILE|URL")]
    pub inputs: Vec<String>,

    /// Screenshot N times and upload them all
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub times: u32,

    /// Don't open images in the browser (copy URL only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Write the screenshot to this file (still uploaded)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Settings file (defaults to <config dir>/snapup/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Builds the immutable run configuration
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            times:  self.times,
            quiet:  self.quiet,
            output: self.output.clone(),
            inputs: self.inputs.clone(),
        }
    }

    /// Default log directive for the chosen verbosity
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "snapup=warn",
            1 => "snapup=info",
            _ => "snapup=debug",
        }
    }
}
