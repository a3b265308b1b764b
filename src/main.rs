use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use futures::future::try_join_all;
use geojson::GeoJson;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use trip_uploader::config::AppConfig;
use trip_uploader::delivery::manifest::{UploadManifest, apply_manifest};
use trip_uploader::domain::photo::PhotoId;
use trip_uploader::repository::http::HttpMapApi;
use trip_uploader::repository::kamadak::KamadakExifReader;
use trip_uploader::telemetry;
use trip_uploader::usecase::assembly::UploadSession;
use trip_uploader::usecase::geojson_export::map_to_geojson;
use trip_uploader::usecase::ingest::{PhotoFile, PhotoIngestor};
use trip_uploader::usecase::submission::MapSubmitter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = if config.telemetry_enabled {
        let provider = telemetry::init_telemetry_with_subscriber(&config.telemetry(), env_filter)
            .map_err(|e| anyhow::anyhow!("failed to initialize telemetry: {e}"))?;
        Some(provider)
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
        None
    };

    tracing::info!("config loaded, telemetry_enabled={}", config.telemetry_enabled);

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, cancelling");
            ctrl_c_token.cancel();
        }
    });

    let result = run(&config, &cancel).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{e:#}"), "upload failed");
    }

    if let Some(provider) = provider {
        telemetry::shutdown_telemetry(provider);
    }

    result
}

async fn run(config: &AppConfig, cancel: &CancellationToken) -> anyhow::Result<()> {
    let manifest = UploadManifest::load(&config.manifest_path)
        .await
        .context("failed to load manifest")?;

    let paths: Vec<PathBuf> = manifest.photo_paths();
    let files = try_join_all(paths.iter().map(|path| PhotoFile::read(path)))
        .await
        .context("failed to read photos")?;
    tracing::info!(file_count = files.len(), "photos read");

    let ingestor = PhotoIngestor::new(KamadakExifReader, config.preview_width);
    let photos = ingestor
        .ingest(files, cancel)
        .await
        .context("failed to ingest photos")?;
    tracing::info!(
        photo_count = photos.len(),
        with_gps = photos.iter().filter(|p| p.has_gps()).count(),
        "photos ingested"
    );

    let photo_ids: HashMap<PathBuf, PhotoId> = paths
        .into_iter()
        .zip(photos.iter().map(|photo| photo.id))
        .collect();

    let mut session = UploadSession::new();
    session.add_photos(photos)?;
    apply_manifest(&mut session, &manifest, &photo_ids)?;

    let draft = session.finalize().context("map is not ready to submit")?;

    if let Some(output) = &config.geojson_output {
        let geojson = GeoJson::from(map_to_geojson(&draft));
        tokio::fs::write(output, geojson.to_string())
            .await
            .with_context(|| format!("failed to write GeoJSON to {}", output.display()))?;
        tracing::info!(path = %output.display(), "GeoJSON preview written");
    }

    let api = HttpMapApi::new(config.api_base_url.clone(), config.request_timeout())
        .context("failed to build HTTP client")?;
    if let Some((email, password)) = config.credentials() {
        api.login(email, password).await.context("login failed")?;
    }

    let submitter = MapSubmitter::new(api);
    let report = submitter.submit(&draft, cancel).await?;

    for failure in &report.failed_uploads {
        tracing::warn!(
            poi = %failure.poi_name,
            file = %failure.file_name,
            reason = %failure.reason,
            "photo not uploaded"
        );
    }
    for poi in &report.unresolved_pois {
        tracing::warn!(%poi, "POI photos not uploaded, no matching record");
    }
    tracing::info!(
        map_id = %report.map_id,
        uploaded = report.uploaded_photos,
        complete = report.is_complete(),
        "map uploaded"
    );

    session.reset();
    Ok(())
}
