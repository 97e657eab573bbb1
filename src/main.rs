/// API сервер для пайплайна признаков

use anyhow::Context;

use laptop_price_ml::{
    api::{router, AppState},
    config::ServiceConfig,
    dataset, FeaturePipeline, FittedOneHotEncoder,
};

/// Загружает сохраненный кодировщик; если его нет, обучает на исходных данных и сохраняет
fn load_or_fit_encoder(config: &ServiceConfig, pipeline: &FeaturePipeline) -> anyhow::Result<FittedOneHotEncoder> {
    if config.encoder_path.exists() {
        return FittedOneHotEncoder::load(&config.encoder_path)
            .with_context(|| format!("Failed to load encoder from {:?}", config.encoder_path));
    }

    let data_path = config
        .data_path
        .as_ref()
        .context("No encoder artifact found and LAPTOP_ML_DATA is not set")?;

    let raws = dataset::load_raw_csv(data_path)?;
    let output = pipeline.run(&raws).context("Feature pipeline failed")?;

    output.encoder.save(&config.encoder_path)?;
    let engineered_path = config.encoder_path.with_file_name("engineered.csv");
    dataset::save_engineered_csv(&output.table, &engineered_path)?;

    Ok(output.encoder)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServiceConfig::from_env()?;
    let pipeline = FeaturePipeline::new(config.pipeline_config()?);
    let encoder = load_or_fit_encoder(&config, &pipeline)?;

    let app = router(AppState::new(pipeline, encoder));

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    tracing::info!("Server listening on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
