//! waxshelf - fills in missing cover art and release years for a vinyl
//! catalog kept in Notion, querying Spotify first and falling back to a web
//! image search, with artwork re-hosted on imgbb.

mod catalog;
mod config;
mod enrichment;
mod metadata;
mod rehost;

use catalog::notion::NotionCatalogAdapter;
use config::Config;
use enrichment::EnrichmentManager;
use log::error;
use metadata::spotify::SpotifyMetadataSource;
use metadata::web_search::WebSearchMetadataSource;
use rehost::ImgbbArtworkHost;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Info);
    clog.init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(reason) => {
            error!("{reason}");
            return Err(reason.into());
        }
    };

    let catalog = NotionCatalogAdapter::new(&config);
    let primary_source = SpotifyMetadataSource::new(&config);
    let fallback_source = WebSearchMetadataSource::new();
    let artwork_host = ImgbbArtworkHost::new(&config);

    let manager = EnrichmentManager::new(
        &catalog,
        &primary_source,
        &fallback_source,
        &artwork_host,
    );

    // Per-record failures are contained inside the pass; only a catalog
    // listing failure reaches here.
    match manager.run() {
        Ok(_) => Ok(()),
        Err(reason) => {
            error!("Enrichment pass aborted: {reason}");
            Err(reason.into())
        }
    }
}
