use clap::Parser;
use tracing::info;

use photo_core::commands::{self, Cli, Command};
use photo_core::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("photo_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let settings = Settings::new()?;

    match cli.command {
        Command::Start => {
            info!("[Startup] photo-core {} initializing...", env!("CARGO_PKG_VERSION"));
            commands::start::run(settings).await
        }
        Command::Reset => {
            let report = tokio::task::spawn_blocking(move || commands::reset::run(&settings)).await??;
            info!("[Reset] Done: {:?}", report);
            Ok(())
        }
    }
}
