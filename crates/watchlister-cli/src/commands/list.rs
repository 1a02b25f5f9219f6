use clap::ValueEnum;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use watchlister_backend::MetadataProvider;
use watchlister_models::{MediaType, MovieKey, MovieRecord, Priority};

use crate::commands::app::App;
use crate::output::{Output, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaArg {
    Movie,
    Tv,
}

impl From<MediaArg> for MediaType {
    fn from(arg: MediaArg) -> Self {
        match arg {
            MediaArg::Movie => MediaType::Movie,
            MediaArg::Tv => MediaType::Tv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    /// Insertion order (date added)
    Added,
    /// High priority first, insertion order within a level
    Priority,
    /// Highest rated first
    Rating,
}

pub async fn run_list(app: &App, sort: SortArg, watched: bool, output: &Output) -> Result<()> {
    let store = app.hydrated_store(output).await?;

    let mut items: Vec<&MovieRecord> = if watched {
        store.watched().iter().collect()
    } else {
        store.watchlist().iter().collect()
    };

    match sort {
        SortArg::Added => {}
        SortArg::Priority => items.sort_by_key(|m| m.priority.rank()),
        SortArg::Rating => items.sort_by(|a, b| {
            let ra = a.vote_average.unwrap_or(0.0);
            let rb = b.vote_average.unwrap_or(0.0);
            rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }

    match output.format() {
        OutputFormat::Human => {
            if items.is_empty() {
                if watched {
                    output.info("Nothing marked watched yet");
                } else {
                    output.info("Your watchlist is empty. Add something with `watchlister add`");
                }
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Id").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Priority").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Date").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Watched").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for item in &items {
                table.add_row(vec![
                    Cell::new(item.id),
                    Cell::new(item.media_type.as_str()),
                    Cell::new(item.display_title()),
                    Cell::new(item.priority.as_str()),
                    Cell::new(
                        item.vote_average
                            .map(|v| format!("{:.1}", v))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::new(item.date().unwrap_or("-")),
                    Cell::new(if store.is_watched(item.key()) { "✓" } else { "" }),
                ]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
            println!(
                "{} item(s), {} watched",
                store.count(),
                store.watched().len()
            );
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "count": store.count(),
                "watched_count": store.watched().len(),
                "items": items,
            }));
        }
    }
    Ok(())
}

pub async fn run_add(
    app: &App,
    id: u64,
    media: MediaArg,
    priority: PriorityArg,
    output: &Output,
) -> Result<()> {
    let metadata = app.metadata()?;
    let media_type = MediaType::from(media);
    let record = metadata
        .details(id, media_type)
        .await
        .map_err(|e| eyre!("Failed to look up {} {}: {}", media_type, id, e))?;

    let mut store = app.hydrated_store(output).await?;
    let events = store.add_to_watchlist(record, priority.into())?;
    output.report_events(&events);
    store.flush().await;
    Ok(())
}

pub async fn run_remove(app: &App, id: u64, media: MediaArg, output: &Output) -> Result<()> {
    let mut store = app.hydrated_store(output).await?;
    let key = MovieKey::new(id, media.into());
    let events = store.remove_from_watchlist(key);
    if events.is_empty() {
        output.info(format!("{} was not on your watchlist", key));
    } else {
        output.report_events(&events);
    }
    store.flush().await;
    Ok(())
}

pub async fn run_clear(app: &App, yes: bool, output: &Output) -> Result<()> {
    let mut store = app.hydrated_store(output).await?;
    if store.count() == 0 {
        output.info("Your watchlist is already empty");
        return Ok(());
    }

    if !yes && output.format() == OutputFormat::Human {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Remove all {} item(s) from your watchlist?",
                store.count()
            ))
            .default(false)
            .interact()
            .map_err(|e| eyre!("Prompt failed: {}", e))?;
        if !confirmed {
            output.info("Aborted");
            return Ok(());
        }
    }

    let events = store.clear_watchlist();
    output.report_events(&events);
    store.flush().await;
    Ok(())
}

pub async fn run_priority(
    app: &App,
    id: u64,
    media: MediaArg,
    level: PriorityArg,
    output: &Output,
) -> Result<()> {
    let mut store = app.hydrated_store(output).await?;
    let key = MovieKey::new(id, media.into());
    let events = store.update_priority(key, level.into());
    if events.is_empty() {
        output.info(format!("{} was not on your watchlist", key));
    } else {
        output.report_events(&events);
    }
    store.flush().await;
    Ok(())
}

pub async fn run_watched(app: &App, id: u64, media: MediaArg, output: &Output) -> Result<()> {
    let mut store = app.hydrated_store(output).await?;
    let key = MovieKey::new(id, media.into());
    let events = store.toggle_watched(key)?;
    output.report_events(&events);
    store.flush().await;
    Ok(())
}

/// Achievement progress summary, human mode only gets the fancy bar.
pub async fn run_achievements(app: &App, output: &Output) -> Result<()> {
    let store = app.hydrated_store(output).await?;
    let count = store.count() as u32;

    match output.format() {
        OutputFormat::Human => {
            for threshold in watchlister_models::ACHIEVEMENT_THRESHOLDS {
                if count >= threshold {
                    println!(
                        "{} {} titles",
                        "🏆".yellow(),
                        threshold.to_string().bold()
                    );
                } else {
                    println!("   {} titles ({} to go)", threshold, threshold - count);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let unlocked: Vec<u32> = watchlister_models::ACHIEVEMENT_THRESHOLDS
                .into_iter()
                .filter(|t| count >= *t)
                .collect();
            output.json(&json!({
                "count": count,
                "unlocked": unlocked,
            }));
        }
    }
    Ok(())
}
