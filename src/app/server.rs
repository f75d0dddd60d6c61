use crate::adapters::http::{router, AppState, SharedState};
use crate::adapters::weather::HttpWeatherSource;
use crate::core::loader::ModelLoader;
use crate::core::predictor::Predictor;
use crate::core::recommend::RecommendationService;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Loads the model and wires the handlers. Fails if the artifact cannot be loaded, so
/// no listener is ever bound without a model.
pub fn build_state<C: ConfigProvider>(config: &C) -> Result<SharedState> {
    let model = ModelLoader::load(config.model_path())?;
    let predictor = Predictor::new(model);

    let recommender = match config.weather() {
        Some(weather) => {
            let source = HttpWeatherSource::from_config(weather)?;
            tracing::info!("Crop recommendation enabled (Meteostat + NASA POWER)");
            Some(RecommendationService::new(
                predictor.clone(),
                Arc::new(source),
                config.crop_labels(),
            ))
        }
        None => None,
    };

    Ok(Arc::new(AppState::new(predictor, recommender)))
}

pub async fn run<C: ConfigProvider>(config: &C, state: SharedState) -> Result<()> {
    let listener = TcpListener::bind((config.host(), config.port())).await?;
    tracing::info!("🌱 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
