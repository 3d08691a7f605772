//! `search` subcommands: run the search service against the configured
//! listings provider and print candidates as JSON.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use foodme_core::{AppConfig, LocationQuery};
use foodme_listings::ListingsClient;
use foodme_search::{query, SearchService, ThreadRandom};

/// Either a place name or a coordinate pair.
#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Free-text place, e.g. "montreal"
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,
}

impl LocationArgs {
    fn parse(&self) -> Result<LocationQuery, foodme_search::SearchError> {
        query::parse_location(
            self.location.as_deref(),
            self.longitude.as_deref(),
            self.latitude.as_deref(),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum SearchCommands {
    /// Candidates nearest first
    Distance {
        #[command(flatten)]
        location: LocationArgs,
        /// Radius in meters (1-40000)
        #[arg(long)]
        radius: Option<String>,
    },
    /// One random candidate
    Random {
        #[command(flatten)]
        location: LocationArgs,
        /// Radius in meters (1-40000)
        #[arg(long)]
        radius: Option<String>,
    },
    /// Candidates at a price tier (1-4 or $-$$$$)
    Price {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        price: String,
    },
    /// Candidates serving a cuisine
    Cuisine {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        cuisine: String,
    },
}

pub(crate) async fn run_search(config: &AppConfig, command: SearchCommands) -> anyhow::Result<()> {
    tracing::debug!(?command, base_url = %config.listings_base_url, "running search");
    let client = ListingsClient::with_base_url(
        config.listings_api_key.as_deref(),
        config.provider_timeout_secs,
        &config.listings_user_agent,
        &config.listings_base_url,
    )?;
    let service = SearchService::new(
        Arc::new(client),
        Arc::new(ThreadRandom),
        Duration::from_secs(config.provider_timeout_secs),
    );

    let output = match command {
        SearchCommands::Distance { location, radius } => {
            let radius = query::parse_radius(radius.as_deref())?;
            let candidates = service.search_by_distance(&location.parse()?, radius).await?;
            serde_json::to_string_pretty(&candidates)?
        }
        SearchCommands::Random { location, radius } => {
            let radius = query::parse_radius(radius.as_deref())?;
            let candidate = service.recommend_random(&location.parse()?, radius).await?;
            serde_json::to_string_pretty(&candidate)?
        }
        SearchCommands::Price { location, price } => {
            let price = query::parse_price(Some(price.as_str()))?;
            let candidates = service.search_by_price(&location.parse()?, price).await?;
            serde_json::to_string_pretty(&candidates)?
        }
        SearchCommands::Cuisine { location, cuisine } => {
            let cuisine = query::parse_cuisine(Some(cuisine.as_str()))?;
            let candidates = service.search_by_cuisine(&location.parse()?, &cuisine).await?;
            serde_json::to_string_pretty(&candidates)?
        }
    };

    println!("{output}");
    Ok(())
}
