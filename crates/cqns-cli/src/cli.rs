use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "cqns",
    about = "Namespace cq:Widget property names in widget-tree JSON",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rewrite a widget tree read from a file or stdin
    Rewrite(RewriteArgs),
    /// Serve namespaced widget trees over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct RewriteArgs {
    /// Namespace prepended to every widget name
    #[arg(short, long)]
    pub namespace: String,
    /// Input file (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub pretty: bool,
    /// Maximum container nesting accepted in the input
    #[arg(long, default_value_t = cqns_core::DEFAULT_MAX_DEPTH, value_parser = parse_max_depth)]
    pub max_depth: usize,
    #[arg(long, default_value = cqns_core::DEFAULT_TYPE_FIELD)]
    pub type_field: String,
    #[arg(long, default_value = cqns_core::WIDGET_TYPE)]
    pub widget_type: String,
}

fn parse_max_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s.parse().map_err(|e| format!("{e}"))?;
    if depth > cqns_core::MAX_PARSE_DEPTH {
        return Err(format!("must be at most {}", cqns_core::MAX_PARSE_DEPTH));
    }
    Ok(depth)
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Overrides `bind_addr` from the configuration
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Overrides `content_root` from the configuration
    #[arg(long)]
    pub root: Option<PathBuf>,
}
