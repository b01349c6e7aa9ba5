use anyhow::{bail, Context};
use clap::Parser;
use listing_scout::client::HttpListingsClient;
use listing_scout::favorites::{Favorites, ToggleOutcome};
use listing_scout::{Config, ListingsLoader, LoadOutcome, LoadedListings};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Browse marketplace listings from the command line
#[derive(Debug, Parser)]
#[command(name = "listing-scout", version)]
struct Args {
    /// Listings location, e.g. "/buy?bhk=2%20BHK&sort=price-low"
    location: String,

    /// Where to write the current page as JSON
    #[arg(short, long, default_value = "listings.json")]
    output: PathBuf,

    /// Save this search under the given name
    #[arg(long)]
    save_search: Option<String>,

    /// Toggle a property in the user's favorites before listing
    #[arg(long)]
    toggle_favorite: Option<String>,

    /// Do not add this search to the search history
    #[arg(long)]
    no_history: bool,
}

/// Location of another page of the same search
fn page_location(listings: &LoadedListings, page: u32) -> String {
    let query = listings.query.update(|q| q.page = page).encode();
    if query.is_empty() {
        listings.path.clone()
    } else {
        format!("{}?{}", listings.path, query)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load();

    info!("🏠 Listing Scout");
    info!("Backend: {}", config.api_url);

    let api = Arc::new(
        HttpListingsClient::with_config(&config).context("Failed to create HTTP client")?,
    );
    let favorites = Favorites::new(api.clone());
    let loader = ListingsLoader::new(api, config.fetch_limit);

    if let Some(property_id) = &args.toggle_favorite {
        match favorites.toggle(property_id).await {
            Ok(ToggleOutcome::Added) => info!("⭐ Added {} to favorites", property_id),
            Ok(ToggleOutcome::Removed) => info!("Removed {} from favorites", property_id),
            Ok(ToggleOutcome::Skipped) => {}
            Err(e) => warn!("Could not update favorites: {}", e),
        }
    } else if let Err(e) = favorites.refresh().await {
        warn!("Could not load favorites: {}", e);
    }

    let listings = match loader.load(&args.location).await {
        Ok(LoadOutcome::Loaded(listings)) => listings,
        Ok(LoadOutcome::Superseded) => bail!("Listings request was superseded"),
        Err(e) if e.is_retryable() => {
            return Err(e).context("Failed to load listings, please try again");
        }
        Err(e) => return Err(e).context("Failed to load listings"),
    };

    let page = listings.page();
    info!(
        "✅ Page {} of {} ({} matching properties, {} filters active)\n",
        page.page,
        page.total_pages,
        page.total_items,
        listings.query.filters.active_count()
    );

    let favorite_ids = favorites.snapshot().await;
    for (i, property) in page.items.iter().enumerate() {
        let position = (page.page as usize - 1) * listing_scout::filters::PAGE_SIZE + i + 1;
        let star = if favorite_ids.contains(&property.id) { " ⭐" } else { "" };
        println!("{}. {} ({}){}", position, property.title, property.price, star);
        if let Some(bedrooms) = property.bedrooms {
            println!("   {} BHK", bedrooms);
        }
        let location: Vec<_> = property.location_fields().collect();
        if !location.is_empty() {
            println!("   Location: {}", location.join(", "));
        }
        println!("   ID: {}", property.id);
        println!();
    }

    if page.items.is_empty() && page.total_pages > 0 {
        warn!("Page {} is past the last page ({})", page.page, page.total_pages);
    }
    if page.has_previous() {
        println!("Previous: {}", page_location(&listings, page.page - 1));
    }
    if page.has_next() {
        println!("Next: {}", page_location(&listings, page.page + 1));
    }

    let json = serde_json::to_string_pretty(page.items)?;
    tokio::fs::write(&args.output, json)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("💾 Saved page to {}", args.output.display());

    if !args.no_history {
        loader.record_search(&listings).await;
    }

    if let Some(name) = &args.save_search {
        match loader.save_search(name, &listings).await {
            Ok(search) => info!("💾 Saved search '{}' ({})", search.name, search.query),
            Err(e) => warn!("Could not save search: {}", e),
        }
    }

    Ok(())
}
