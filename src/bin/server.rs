use clap::Parser;
use tracing_subscriber::EnvFilter;

use flownet::server;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "JSON-RPC server computing maximum flows")]
struct Args {
    /// Address to listen at
    #[arg(default_value = "127.0.0.1:8080")]
    listen_at: String,

    /// Connections waiting for a worker before new ones are dropped
    #[arg(long, default_value_t = 10)]
    queue_size: usize,

    /// Worker threads
    #[arg(long, default_value_t = 4)]
    threads: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    server::start_server(&args.listen_at, args.queue_size, args.threads)?;
    Ok(())
}
