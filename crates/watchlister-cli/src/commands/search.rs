use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde_json::json;
use std::sync::Arc;
use watchlister_backend::tmdb::genre_id_for_name;
use watchlister_backend::MetadataProvider;
use watchlister_core::DiscoveryFeed;
use watchlister_models::{DiscoverFilter, MediaType, MovieRecord, SortKey};

use crate::commands::app::App;
use crate::commands::list::MediaArg;
use crate::output::{Output, OutputFormat};

pub async fn run_search(app: &App, query: &str, pages: u32, output: &Output) -> Result<()> {
    let metadata = app.metadata()?;
    let mut feed = DiscoveryFeed::new(Arc::new(metadata));
    feed.search(query).await?;
    fetch_remaining(&mut feed, pages, output).await?;

    print_results(feed.items(), feed.page(), feed.total_pages(), output);
    Ok(())
}

pub async fn run_discover(
    app: &App,
    media: MediaArg,
    genres: Vec<String>,
    min_rating: Option<f64>,
    year: Option<u32>,
    sort_by: Option<String>,
    pages: u32,
    output: &Output,
) -> Result<()> {
    let genre_ids = parse_genres(&genres)?;

    let sort_str = sort_by.as_deref().unwrap_or(&app.config.discover.sort_by);
    let sort_by = SortKey::parse(sort_str).ok_or_else(|| {
        eyre!("Unknown sort key: {} (try popular, rating, or newest)", sort_str)
    })?;

    let filter = DiscoverFilter {
        genres: genre_ids,
        min_rating: min_rating.or(app.config.discover.min_rating),
        year,
        sort_by,
    };

    let metadata = app.metadata()?;
    let mut feed = DiscoveryFeed::new(Arc::new(metadata));
    feed.discover(media.into(), filter).await?;
    fetch_remaining(&mut feed, pages, output).await?;

    print_results(feed.items(), feed.page(), feed.total_pages(), output);
    Ok(())
}

pub async fn run_trending(app: &App, pages: u32, output: &Output) -> Result<()> {
    let metadata = app.metadata()?;
    let mut feed = DiscoveryFeed::new(Arc::new(metadata));
    feed.trending().await?;
    fetch_remaining(&mut feed, pages, output).await?;

    print_results(feed.items(), feed.page(), feed.total_pages(), output);
    Ok(())
}

pub async fn run_show(app: &App, id: u64, media: MediaArg, output: &Output) -> Result<()> {
    let metadata = app.metadata()?;
    let media_type = MediaType::from(media);
    let record = metadata
        .details(id, media_type)
        .await
        .map_err(|e| eyre!("Failed to look up {} {}: {}", media_type, id, e))?;
    let videos = metadata
        .videos(id, media_type)
        .await
        .unwrap_or_default();
    let trailers: Vec<_> = videos.iter().filter(|v| v.is_trailer()).collect();

    match output.format() {
        OutputFormat::Human => {
            println!("{}", record.display_title().bold());
            println!(
                "{} · {} · rated {}",
                record.media_type.as_str(),
                record.date().unwrap_or("unknown date"),
                record
                    .vote_average
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_else(|| "-".to_string()),
            );
            if let Some(overview) = &record.overview {
                println!("\n{}", overview);
            }
            if !trailers.is_empty() {
                println!("\nTrailers:");
                for trailer in &trailers {
                    if trailer.site.eq_ignore_ascii_case("youtube") {
                        println!(
                            "  {} https://www.youtube.com/watch?v={}",
                            trailer.name, trailer.key
                        );
                    } else {
                        println!("  {} ({}: {})", trailer.name, trailer.site, trailer.key);
                    }
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "details": record,
                "trailers": trailers,
            }));
        }
    }
    Ok(())
}

/// Pull additional pages up to the requested count. The feed already
/// refuses to read past the provider's last page.
async fn fetch_remaining<P: MetadataProvider>(
    feed: &mut DiscoveryFeed<P>,
    pages: u32,
    output: &Output,
) -> Result<()> {
    if pages <= 1 || !feed.has_more() {
        return Ok(());
    }

    let bar = if output.format() == OutputFormat::Human {
        let bar = ProgressBar::new(pages as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} fetching page {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_position(1);
        Some(bar)
    } else {
        None
    };

    while feed.page() < pages && feed.has_more() {
        feed.load_more().await?;
        if let Some(bar) = &bar {
            bar.set_position(feed.page() as u64);
        }
    }
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    Ok(())
}

fn parse_genres(genres: &[String]) -> Result<Vec<u32>> {
    genres
        .iter()
        .map(|g| {
            if let Ok(id) = g.parse::<u32>() {
                return Ok(id);
            }
            genre_id_for_name(g).ok_or_else(|| eyre!("Unknown genre: {}", g))
        })
        .collect()
}

fn print_results(items: &[MovieRecord], page: u32, total_pages: u32, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            if items.is_empty() {
                output.info("No results");
                return;
            }
            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Id").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Date").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for item in items {
                table.add_row(vec![
                    Cell::new(item.id),
                    Cell::new(item.media_type.as_str()),
                    Cell::new(item.display_title()),
                    Cell::new(
                        item.vote_average
                            .map(|v| format!("{:.1}", v))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::new(item.date().unwrap_or("-")),
                ]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
            println!("{} result(s), page {} of {}", items.len(), page, total_pages);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "page": page,
                "total_pages": total_pages,
                "results": items,
            }));
        }
    }
}
