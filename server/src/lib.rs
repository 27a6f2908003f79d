use core::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

pub mod config;
pub mod http;
pub mod validate;

#[derive(Debug, Parser)]
#[command(about = "Single-aircraft flight simulator served over HTTP")]
pub struct Cli {
  /// The socket address to bind the HTTP server to.
  #[arg(short, long, default_value = None)]
  pub address: Option<SocketAddr>,

  /// The path to the config file.
  #[arg(short, long = "config", default_value = None)]
  pub config_path: Option<PathBuf>,

  /// Where to write daily log files, in addition to stdout.
  #[arg(long, default_value = None)]
  pub log_dir: Option<PathBuf>,
}
