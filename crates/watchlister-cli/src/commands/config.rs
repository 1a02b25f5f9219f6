use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use watchlister_config::{BackendConfig, Config, PathManager, TmdbConfig};

use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::SetTmdb { api_key } => set_tmdb(api_key, output),
        ConfigCommands::SetBackend {
            api_key,
            docstore_url,
            identity_url,
            poll_interval,
        } => set_backend(api_key, docstore_url, identity_url, poll_interval, output),
        ConfigCommands::SetShare { base_url } => set_share(base_url, output),
    }
}

fn load(paths: &PathManager) -> Result<Config> {
    Config::load(&paths.config_file())
        .map_err(|e| eyre!("Failed to load config from {}: {}", paths.config_file().display(), e))
}

fn save(paths: &PathManager, config: &Config) -> Result<()> {
    config
        .save(&paths.config_file())
        .map_err(|e| eyre!("Failed to save config to {}: {}", paths.config_file().display(), e))
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();

    if !config_file.exists() {
        output.warn(format!(
            "Configuration file not found at: {}",
            config_file.display()
        ));
        output.info("It is created on the first `watchlister config set-tmdb` or `set-backend`.");
        return Ok(());
    }

    let config = load(&paths)?;

    match output.format() {
        OutputFormat::Human => {
            let mut info_table = Table::new();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.load_preset(comfy_table::presets::UTF8_FULL);
            info_table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", info_table);
            println!();

            if let Some(tmdb) = &config.tmdb {
                let mut table = Table::new();
                table.set_header(vec![Cell::new("Metadata Provider")
                    .fg(comfy_table::Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold)]);
                let key = if full {
                    tmdb.api_key.clone()
                } else {
                    mask_string(&tmdb.api_key)
                };
                table.add_row(vec![Cell::new("API Key"), Cell::new(key)]);
                table.add_row(vec![Cell::new("Base URL"), Cell::new(&tmdb.base_url)]);
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", table);
                println!();
            } else {
                println!("{}", "Metadata provider: Not configured".bright_black());
                println!();
            }

            if let Some(backend) = &config.backend {
                let mut table = Table::new();
                table.set_header(vec![Cell::new("Backend")
                    .fg(comfy_table::Color::Cyan)
                    .add_attribute(comfy_table::Attribute::Bold)]);
                let key = if full {
                    backend.api_key.clone()
                } else {
                    mask_string(&backend.api_key)
                };
                table.add_row(vec![Cell::new("API Key"), Cell::new(key)]);
                table.add_row(vec![
                    Cell::new("Document Store URL"),
                    Cell::new(&backend.docstore_url),
                ]);
                table.add_row(vec![
                    Cell::new("Identity URL"),
                    Cell::new(&backend.identity_url),
                ]);
                table.add_row(vec![
                    Cell::new("Poll Interval"),
                    Cell::new(format!("{}s", backend.poll_interval_secs)),
                ]);
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", table);
                println!();
            } else {
                println!("{}", "Backend: Not configured".bright_black());
                println!();
            }

            let mut table = Table::new();
            table.set_header(vec![Cell::new("Defaults")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold)]);
            table.add_row(vec![
                Cell::new("Discover sort"),
                Cell::new(&config.discover.sort_by),
            ]);
            table.add_row(vec![
                Cell::new("Discover min rating"),
                Cell::new(
                    config
                        .discover
                        .min_rating
                        .map(|r| r.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]);
            table.add_row(vec![
                Cell::new("Share base URL"),
                Cell::new(&config.share.base_url),
            ]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "tmdb": config.tmdb.as_ref().map(|t| json!({
                    "api_key": if full { t.api_key.clone() } else { mask_string(&t.api_key) },
                    "base_url": t.base_url,
                })),
                "backend": config.backend.as_ref().map(|b| json!({
                    "api_key": if full { b.api_key.clone() } else { mask_string(&b.api_key) },
                    "docstore_url": b.docstore_url,
                    "identity_url": b.identity_url,
                    "poll_interval_secs": b.poll_interval_secs,
                })),
                "discover": {
                    "sort_by": config.discover.sort_by,
                    "min_rating": config.discover.min_rating,
                },
                "share": { "base_url": config.share.base_url },
            }));
        }
    }
    Ok(())
}

fn set_tmdb(api_key: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let mut config = load(&paths)?;

    let api_key = match api_key {
        Some(k) => k,
        None => rpassword::prompt_password("Metadata provider API key: ")
            .map_err(|e| eyre!("Failed to read API key: {}", e))?,
    };
    if api_key.trim().is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let base_url = config
        .tmdb
        .as_ref()
        .map(|t| t.base_url.clone())
        .unwrap_or_else(|| "https://api.themoviedb.org/3".to_string());
    config.tmdb = Some(TmdbConfig {
        api_key: api_key.trim().to_string(),
        base_url,
    });
    save(&paths, &config)?;
    output.success("Metadata provider configured");
    Ok(())
}

fn set_backend(
    api_key: Option<String>,
    docstore_url: String,
    identity_url: String,
    poll_interval: Option<u64>,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    let mut config = load(&paths)?;

    let api_key = match api_key {
        Some(k) => k,
        None => rpassword::prompt_password("Backend API key: ")
            .map_err(|e| eyre!("Failed to read API key: {}", e))?,
    };
    if api_key.trim().is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let poll_interval_secs = poll_interval
        .or_else(|| config.backend.as_ref().map(|b| b.poll_interval_secs))
        .unwrap_or(3);

    config.backend = Some(BackendConfig {
        api_key: api_key.trim().to_string(),
        docstore_url,
        identity_url,
        poll_interval_secs,
    });
    save(&paths, &config)?;
    output.success("Backend configured");
    Ok(())
}

fn set_share(base_url: String, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let mut config = load(&paths)?;
    config.share.base_url = base_url.trim_end_matches('/').to_string();
    save(&paths, &config)?;
    output.success("Share base URL updated");
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    format!("{}***{}", &s[..2], &s[s.len() - 2..])
}
