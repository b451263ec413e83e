use std::net::SocketAddr;

mod routes;
mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = config::read().await?;
    tracing::info!("serving menus from {}", config.upstream.url);

    let app = routes::make_router(&config).await;

    let addr = SocketAddr::new(config.server.address, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve::serve(listener, app).with_graceful_shutdown(async {
        _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
    }).await?;

    Ok(())
}
