use crate::{
    cli::OutputFormat,
    config::AppConfig,
    error::{AppError, Result},
    output::{InspectionReport, OutputManager, write_output},
};
use hls_adfilter::AdFilter;
use playback_loader::{
    AdFilteringLoader, HttpLoader, LoaderContext, PlaylistLoader, ResourceKind,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

/// Base URL for local files without `--source-url`.
pub const DEFAULT_FILE_SOURCE_URL: &str = "file:///";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(Url),
    File(PathBuf),
}

impl Source {
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Remote(url),
            _ => Source::File(PathBuf::from(input)),
        }
    }
}

/// Remote playlists are filtered by the loader itself, which resolves against
/// the URL it fetched. An explicit `--source-url` or `--json` needs the
/// playlist read unfiltered first.
fn interceptable<'a>(source: &'a Source, source_url: Option<&str>, json: bool) -> Option<&'a Url> {
    match source {
        Source::Remote(url) if source_url.is_none() && !json => Some(url),
        _ => None,
    }
}

struct Playlist {
    text: String,
    source_url: String,
}

pub struct CommandExecutor {
    config: AppConfig,
    output: OutputManager,
    token: CancellationToken,
}

impl CommandExecutor {
    pub fn new(config: AppConfig, output: OutputManager, token: CancellationToken) -> Self {
        Self {
            config,
            output,
            token,
        }
    }

    pub async fn filter(
        &self,
        source: &str,
        source_url: Option<&str>,
        output_file: Option<&Path>,
        json: bool,
    ) -> Result<()> {
        let source = Source::parse(source);

        if let Some(url) = interceptable(&source, source_url, json) {
            let loader = AdFilteringLoader::http(self.config.loader_config()?)?;
            if !loader.is_enabled() {
                warn!("Ad filtering is disabled in the configuration, writing playlist unchanged");
            }
            let response = loader
                .load(
                    &LoaderContext::new(url.as_str(), ResourceKind::Manifest),
                    &self.token,
                )
                .await?;
            let text = into_text(&response.data, &response.url)?;
            write_output(&text, output_file)?;

            let stats = loader.stats();
            info!(
                segments = stats.segments_removed,
                seconds = stats.seconds_removed,
                fallbacks = stats.passthrough_fallbacks,
                "Filtered remote playlist"
            );
            return Ok(());
        }

        let playlist = self.read(&source, source_url).await?;
        let outcome = AdFilter::new(self.config.ad_filter.clone())
            .filter(&playlist.text, &playlist.source_url);

        if json {
            write_output(&self.output.format_outcome_json(&outcome)?, output_file)
        } else {
            write_output(&outcome.filtered_text, output_file)
        }
    }

    pub async fn inspect(
        &self,
        source: &str,
        source_url: Option<&str>,
        format: OutputFormat,
    ) -> Result<()> {
        let playlist = self.read(&Source::parse(source), source_url).await?;
        let filter = AdFilter::new(self.config.ad_filter.clone());
        let (_, classification) = filter.analyze(&playlist.text, &playlist.source_url);

        let report = InspectionReport::new(&playlist.source_url, &classification);
        write_output(&self.output.format_report(&report, format)?, None)
    }

    /// Reads the unfiltered playlist.
    async fn read(&self, source: &Source, source_url: Option<&str>) -> Result<Playlist> {
        match source {
            Source::Remote(url) => {
                let loader = HttpLoader::new(self.config.loader_config()?)?;
                let response = loader
                    .load(
                        &LoaderContext::new(url.as_str(), ResourceKind::Manifest),
                        &self.token,
                    )
                    .await?;
                Ok(Playlist {
                    text: into_text(&response.data, &response.url)?,
                    source_url: source_url.map_or(response.url, str::to_string),
                })
            }
            Source::File(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::InvalidInput(format!("cannot read {}: {e}", path.display()))
                })?;
                Ok(Playlist {
                    text,
                    source_url: source_url.unwrap_or(DEFAULT_FILE_SOURCE_URL).to_string(),
                })
            }
        }
    }
}

fn into_text(data: &[u8], url: &str) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|_| AppError::InvalidInput(format!("{url} did not return UTF-8 text")))
}
