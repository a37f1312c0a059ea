use simplelog::ColorChoice;
use simplelog::ConfigBuilder;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use taskgrid_server::Server;
use taskgrid_server::ServerConfig;
use taskgrid_server::server::cancel_on_signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Missing .env is fine; the defaults apply
    let dotenv = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let log_config = ConfigBuilder::new()
        .set_target_level(simplelog::LevelFilter::Error)
        .build();
    let _ = TermLogger::init(
        config.log_level,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    if let Ok(path) = dotenv {
        log::info!("loaded environment from {}", path.display());
    }

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            log::error!("failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown = CancellationToken::new();
    cancel_on_signal(tokio::signal::ctrl_c(), shutdown.clone());

    if let Err(e) = server.run(shutdown).await {
        log::error!("server error: {}", e);
        std::process::exit(1);
    }
}
