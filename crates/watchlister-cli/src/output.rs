use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde_json::json;
use watchlister_core::StoreEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "✓".green(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "success",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        // Errors are shown even in quiet mode
        match self.format {
            OutputFormat::Human => {
                eprintln!("{} {}", "✗".red(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "error",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                println!("{}", msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "info",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", "⚠".yellow(), msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "warning",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn println(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => {
                println!("{}", msg.as_ref());
            }
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.print_json(&json!({
                    "type": "info",
                    "message": msg.as_ref()
                }));
            }
        }
    }

    pub fn json(&self, data: &serde_json::Value) {
        if self.quiet && self.format != OutputFormat::Human {
            return;
        }
        self.print_json(data);
    }

    fn print_json(&self, data: &serde_json::Value) {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(data).unwrap_or_default());
            }
            OutputFormat::JsonPretty => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Human => {
                println!("{}", data);
            }
        }
    }

    /// Map store mutation events to user notifications. Achievement
    /// unlocks get the loud treatment.
    pub fn report_events(&self, events: &[StoreEvent]) {
        for event in events {
            match event {
                StoreEvent::Added { title, .. } => {
                    self.success(format!("Added \"{}\" to your watchlist", title));
                }
                StoreEvent::Removed { title, .. } => {
                    self.success(format!("Removed \"{}\" from your watchlist", title));
                }
                StoreEvent::Cleared { removed } => {
                    self.success(format!("Cleared {} item(s) from your watchlist", removed));
                }
                StoreEvent::PriorityChanged { key, priority } => {
                    self.success(format!("Set priority of {} to {}", key, priority));
                }
                StoreEvent::MarkedWatched { title, .. } => {
                    self.success(format!("Marked \"{}\" as watched", title));
                }
                StoreEvent::UnmarkedWatched { title, .. } => {
                    self.success(format!("Unmarked \"{}\" as watched", title));
                }
                StoreEvent::AchievementUnlocked { threshold } => match self.format {
                    OutputFormat::Human => {
                        if !self.quiet {
                            println!(
                                "{} {}",
                                "🏆".yellow(),
                                format!("Achievement unlocked: {} titles on your watchlist!", threshold)
                                    .bold()
                            );
                        }
                    }
                    OutputFormat::Json | OutputFormat::JsonPretty => {
                        self.print_json(&json!({
                            "type": "achievement",
                            "threshold": threshold
                        }));
                    }
                },
            }
        }
    }
}
