//! The PostAssist HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use llm::{OpenAiClient, OpenAiConfig, TavilyClient, TavilyConfig};
use postassist::api::{routes, AppContext};
use postassist::store::TaskStore;
use postassist::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,postassist=debug")),
        )
        .init();

    let settings = Settings::from_env().context("loading configuration")?;

    let model = OpenAiClient::new(
        OpenAiConfig::new(&settings.openai_api_key, &settings.openai_model)
            .with_temperature(settings.openai_temperature),
    )
    .context("building completion client")?;
    let search = TavilyClient::new(TavilyConfig::new(&settings.tavily_api_key))
        .context("building search client")?;

    let store = TaskStore::open(&settings.store_path, settings.task_ttl).await;

    let addr = format!("{}:{}", settings.host, settings.port);
    let context = AppContext {
        settings,
        store,
        model: Arc::new(model),
        search: Arc::new(search),
    };

    let app = routes::router(Arc::new(context));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "postassist server listening");

    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
