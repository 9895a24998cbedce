use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server settings, read from command-line flags or the environment
#[derive(Clone, Debug, Parser)]
#[command(name = "website", about = "Upload a CSV file and browse it as a sortable table")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "ANALYZER_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory for uploads while they are parsed
    #[arg(long, env = "ANALYZER_UPLOAD_DIR", default_value = "public/uploads")]
    pub upload_dir: PathBuf,

    /// Maximum request body in bytes; unlimited when unset
    #[arg(long, env = "ANALYZER_BODY_LIMIT")]
    pub body_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upload_dir: PathBuf::from("public/uploads"),
            body_limit: None,
        }
    }
}
