//! GARZA Orchestrator
//!
//! Usage:
//! - Normal mode: `garza-orchestrator`
//! - With custom port: `garza-orchestrator --port 9000`

use garza_orchestrator::RuntimeConfig;
use tracing_subscriber::EnvFilter;

/// 解析命令行参数
fn parse_args(args: &[String]) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("GARZA Orchestrator - remote deploy and command relay");
    println!();
    println!("USAGE:");
    println!("    garza-orchestrator [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port (default: $PORT or 8080)");
    println!("    -h, --help       Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    SSH_PRIVATE_KEY  Private key written to SSH_KEY_PATH on startup");
    println!("    REMOTE_HOST      Target host (default: garzahive.com)");
    println!("    RUST_LOG         Log filter (default: info)");
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = parse_args(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    if let Err(e) = rt.block_on(garza_orchestrator::run(config)) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}
