use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;

use crate::commands::app::App;
use crate::output::{Output, OutputFormat};
use crate::ShareCommands;

pub async fn run_share(cmd: ShareCommands, app: &App, output: &Output) -> Result<()> {
    match cmd {
        ShareCommands::Enable { title, no_copying } => {
            enable(app, title, !no_copying, output).await
        }
        ShareCommands::Disable => disable(app, output).await,
        ShareCommands::Status => status(app, output).await,
        ShareCommands::View { share_id } => view(app, &share_id, output).await,
        ShareCommands::Copy { share_id } => copy(app, &share_id, output).await,
    }
}

async fn enable(
    app: &App,
    title: Option<String>,
    allow_copying: bool,
    output: &Output,
) -> Result<()> {
    let session = app.session().await?;
    let link = app
        .sharing()
        .enable_sharing(&session, title, allow_copying)
        .await?;

    match output.format() {
        OutputFormat::Human => {
            output.success("Sharing enabled");
            output.println(format!("Share link: {}", link.url));
            if !allow_copying {
                output.info("Viewers can browse but not copy this watchlist");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "share_id": link.share_id,
                "url": link.url,
                "allow_copying": allow_copying,
            }));
        }
    }
    Ok(())
}

async fn disable(app: &App, output: &Output) -> Result<()> {
    let session = app.session().await?;
    app.sharing().disable_sharing(&session).await?;
    output.success("Sharing disabled; the old link no longer resolves");
    Ok(())
}

async fn status(app: &App, output: &Output) -> Result<()> {
    let store = app.hydrated_store(output).await?;
    let settings = store.share_settings();

    match output.format() {
        OutputFormat::Human => {
            if !settings.is_public {
                output.info("Sharing is off. Enable it with `watchlister share enable`");
                return Ok(());
            }
            output.success("Sharing is on");
            if let Some(share_id) = &settings.share_id {
                output.println(format!("Share link: {}", app.sharing().share_url(share_id)));
            }
            if let Some(title) = &settings.share_title {
                output.println(format!("Title: {}", title));
            }
            output.println(format!(
                "{} view(s), {} item(s) copied by others",
                settings.view_count, settings.copy_count
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "is_public": settings.is_public,
                "share_id": settings.share_id,
                "share_title": settings.share_title,
                "allow_copying": settings.allow_copying,
                "view_count": settings.view_count,
                "copy_count": settings.copy_count,
            }));
        }
    }
    Ok(())
}

async fn view(app: &App, share_id: &str, output: &Output) -> Result<()> {
    let shared = app.sharing().resolve_shared(share_id).await?;

    match output.format() {
        OutputFormat::Human => {
            let title = shared
                .share_title
                .clone()
                .unwrap_or_else(|| format!("{}'s watchlist", shared.owner_name));
            output.println(format!("{} ({} views)", title, shared.view_count));

            if shared.watchlist.is_empty() {
                output.info("This watchlist is empty");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Date").add_attribute(comfy_table::Attribute::Bold),
            ]);
            for item in &shared.watchlist {
                table.add_row(vec![
                    Cell::new(item.display_title()),
                    Cell::new(item.media_type.as_str()),
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

            if shared.allow_copying {
                output.info(format!(
                    "Copy it to your own list with `watchlister share copy {}`",
                    share_id
                ));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "owner_name": shared.owner_name,
                "share_title": shared.share_title,
                "shared_at": shared.shared_at,
                "allow_copying": shared.allow_copying,
                "view_count": shared.view_count,
                "copy_count": shared.copy_count,
                "watchlist": shared.watchlist,
                "watched": shared.watched,
            }));
        }
    }
    Ok(())
}

async fn copy(app: &App, share_id: &str, output: &Output) -> Result<()> {
    let session = app.session().await?;
    let copied = app.sharing().copy_shared(&session, share_id).await?;
    if copied == 0 {
        output.info("Nothing new to copy; you already have everything on that list");
    } else {
        output.success(format!("Copied {} item(s) to your watchlist", copied));
    }
    Ok(())
}
