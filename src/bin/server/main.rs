//! Demo service: two related tables served from the router files in `ROUTERS_DIR`.

mod models;

use models::{Test1, Test2};
use ms_core::{App, Settings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ms_core=info,server=info,tower_http=info")),
        )
        .init();

    let mut app = App::new();
    app.register::<Test2>()?.register::<Test1>()?;
    app.setup(&settings).await?;

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_router()).await?;
    Ok(())
}
