use clap::{ArgAction, Parser, Subcommand};
use commands::app::App;
use commands::list::{MediaArg, PriorityArg, SortArg};
use watchlister_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchlister")]
#[command(about = "Watchlister - Track what to watch, share it, and never lose it")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use an in-process store instead of the configured backend
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show your watchlist
    #[command(long_about = "Show your watchlist (or the watched list with --watched). Sort by date added, priority, or rating.")]
    List {
        /// Sort order
        #[arg(long, default_value = "added", value_enum)]
        sort: SortArg,

        /// Show the watched list instead of the watchlist
        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,
    },
    /// Add a title to your watchlist
    #[command(long_about = "Add a title by its metadata-provider id. Ids are shown by `search`, `discover`, and `trending`. The same numeric id can exist as both a movie and a series, so --type is required.")]
    Add {
        /// Title id from search results
        id: u64,

        /// movie or tv
        #[arg(long = "type", value_enum)]
        media: MediaArg,

        /// Watch priority
        #[arg(long, default_value = "medium", value_enum)]
        priority: PriorityArg,
    },
    /// Remove a title from your watchlist
    Remove {
        /// Title id
        id: u64,

        /// movie or tv
        #[arg(long = "type", value_enum)]
        media: MediaArg,
    },
    /// Remove everything from your watchlist
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Change the priority of a watchlist entry
    Priority {
        /// Title id
        id: u64,

        /// movie or tv
        #[arg(long = "type", value_enum)]
        media: MediaArg,

        /// New priority
        #[arg(value_enum)]
        level: PriorityArg,
    },
    /// Toggle watched status for a title
    #[command(long_about = "Mark a watchlist entry as watched, or unmark it if it already is. Watched status survives removal from the watchlist.")]
    Watched {
        /// Title id
        id: u64,

        /// movie or tv
        #[arg(long = "type", value_enum)]
        media: MediaArg,
    },
    /// Show achievement progress
    Achievements,
    /// Show details and trailers for a title
    Show {
        /// Title id
        id: u64,

        /// movie or tv
        #[arg(long = "type", value_enum)]
        media: MediaArg,
    },
    /// Search movies and TV series by title
    Search {
        /// Free-text query
        query: String,

        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Browse titles by genre, rating, and year
    Discover {
        /// movie or tv
        #[arg(long = "type", default_value = "movie", value_enum)]
        media: MediaArg,

        /// Genre names or ids (repeatable): --genre action --genre 27
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// Minimum average rating (0-10)
        #[arg(long)]
        min_rating: Option<f64>,

        /// Release year
        #[arg(long)]
        year: Option<u32>,

        /// Sort key (popular, rating, newest, oldest)
        #[arg(long)]
        sort_by: Option<String>,

        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show what's trending this week
    Trending {
        /// Number of result pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Share your watchlist or browse someone else's
    Share {
        #[command(subcommand)]
        cmd: ShareCommands,
    },
    /// Follow your watchlist live and print remote changes
    #[command(long_about = "Subscribe to your document and print a line whenever a change lands from another device. Runs until interrupted.")]
    Watch,
    /// Manage your account
    Auth {
        #[command(subcommand)]
        cmd: AuthCommands,
    },
    /// View or modify configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create an account
    Signup {
        /// Email address
        #[arg(long)]
        email: String,
    },
    /// Sign in to an existing account
    Login {
        /// Email address
        #[arg(long)]
        email: String,
    },
    /// Sign in with an OAuth token from an external provider
    #[command(long_about = "Exchange an OAuth id token obtained from an external provider for a session. Get the token from the provider's own tooling (e.g. `gcloud auth print-identity-token` for Google).")]
    LoginExternal {
        /// Provider: google, apple, or a raw provider id
        #[arg(long, default_value = "google")]
        provider: String,

        /// OAuth id token (prompted when omitted)
        #[arg(long)]
        token: Option<String>,
    },
    /// Sign out and clear the saved session
    Logout,
    /// Send a password reset email
    ResetPassword {
        /// Email address
        #[arg(long)]
        email: String,
    },
    /// Show the current session
    Status,
}

#[derive(Subcommand)]
pub enum ShareCommands {
    /// Make your watchlist publicly viewable under a fresh link
    Enable {
        /// Public title for the shared list
        #[arg(long)]
        title: Option<String>,

        /// Let viewers browse but not copy
        #[arg(long, action = ArgAction::SetTrue)]
        no_copying: bool,
    },
    /// Turn sharing off; the old link stops resolving
    Disable,
    /// Show your sharing settings and view/copy counts
    Status,
    /// View someone else's shared watchlist
    View {
        /// Share id from their link
        share_id: String,
    },
    /// Copy a shared watchlist into your own
    #[command(long_about = "Copy every title you don't already have from a shared watchlist into your own. Copied entries remember which share they came from.")]
    Copy {
        /// Share id from their link
        share_id: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Configure the metadata provider API key
    SetTmdb {
        /// API key (prompted when omitted)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Configure the document store and identity service
    SetBackend {
        /// API key (prompted when omitted)
        #[arg(long)]
        api_key: Option<String>,

        /// Document store base URL
        #[arg(long)]
        docstore_url: String,

        /// Identity service base URL
        #[arg(long)]
        identity_url: String,

        /// Snapshot poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,
    },
    /// Set the base URL used to build share links
    SetShare {
        /// Base URL; the share id is appended
        base_url: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The watch command runs long; its logs go to the rotating file so
    // they don't interleave with the snapshot lines.
    let log_file = matches!(&cli.command, Commands::Watch)
        .then(|| PathManager::default().log_file());
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::List { sort, watched } => {
            let app = App::init(cli.offline)?;
            commands::list::run_list(&app, sort, watched, &output).await
        }
        Commands::Add {
            id,
            media,
            priority,
        } => {
            let app = App::init(cli.offline)?;
            commands::list::run_add(&app, id, media, priority, &output).await
        }
        Commands::Remove { id, media } => {
            let app = App::init(cli.offline)?;
            commands::list::run_remove(&app, id, media, &output).await
        }
        Commands::Clear { yes } => {
            let app = App::init(cli.offline)?;
            commands::list::run_clear(&app, yes, &output).await
        }
        Commands::Priority { id, media, level } => {
            let app = App::init(cli.offline)?;
            commands::list::run_priority(&app, id, media, level, &output).await
        }
        Commands::Watched { id, media } => {
            let app = App::init(cli.offline)?;
            commands::list::run_watched(&app, id, media, &output).await
        }
        Commands::Achievements => {
            let app = App::init(cli.offline)?;
            commands::list::run_achievements(&app, &output).await
        }
        Commands::Show { id, media } => {
            let app = App::init(cli.offline)?;
            commands::search::run_show(&app, id, media, &output).await
        }
        Commands::Search { query, pages } => {
            let app = App::init(cli.offline)?;
            commands::search::run_search(&app, &query, pages, &output).await
        }
        Commands::Discover {
            media,
            genres,
            min_rating,
            year,
            sort_by,
            pages,
        } => {
            let app = App::init(cli.offline)?;
            commands::search::run_discover(
                &app, media, genres, min_rating, year, sort_by, pages, &output,
            )
            .await
        }
        Commands::Trending { pages } => {
            let app = App::init(cli.offline)?;
            commands::search::run_trending(&app, pages, &output).await
        }
        Commands::Share { cmd } => {
            let app = App::init(cli.offline)?;
            commands::share::run_share(cmd, &app, &output).await
        }
        Commands::Watch => {
            let app = App::init(cli.offline)?;
            commands::watch::run_watch(&app, &output).await
        }
        Commands::Auth { cmd } => {
            let app = App::init(cli.offline)?;
            commands::auth::run_auth(cmd, &app, &output).await
        }
        Commands::Config { cmd } => commands::config::run_config(cmd, &output).await,
    };

    if let Err(e) = result {
        match cli.output {
            // Human mode gets the full color-eyre report.
            output::OutputFormat::Human => return Err(e),
            _ => {
                output.error(format!("{:#}", e));
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
