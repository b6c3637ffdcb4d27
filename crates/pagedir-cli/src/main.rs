use clap::Parser;
use pagedir_api::{FaviconProbe, GitHubClient};
use pagedir_core::card::SiteCard;
use pagedir_core::directory;
use pagedir_core::export::Directory;
use pagedir_core::providers::GitHubSource;
use pagedir_core::{
    Config, ExportFormat, Exporter, IconLoader, LoadState, Preferences, SortMode, ViewController,
    ViewMode,
};
use pagedir_tui::{run_tui, App};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pagedir")]
#[command(version, about = "Browse a GitHub user's Pages sites from the terminal", long_about = None)]
struct Cli {
    /// GitHub account to list (overrides config and PAGEDIR_OWNER)
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Print the site directory
    List {
        /// Only sites whose name or description contains this
        #[arg(short, long)]
        query: Option<String>,
        /// created or alpha (defaults to the stored preference)
        #[arg(long)]
        sort: Option<SortMode>,
    },
    /// Write the site directory to a file
    Export {
        /// Output file (.json, .md or .html)
        path: PathBuf,
        /// Override the format implied by the extension
        #[arg(long)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        query: Option<String>,
        /// Link primary favicon paths without probing them
        #[arg(long)]
        no_favicons: bool,
    },
    /// Show or change stored sort/view preferences
    Prefs {
        #[arg(long)]
        sort: Option<SortMode>,
        #[arg(long)]
        view: Option<ViewMode>,
    },
}

fn init_logging(to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pagedir=info".into());

    // Anything written to the terminal would tear through the TUI
    if to_file {
        let file = Config::log_path().and_then(|path| {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok()?;
            }
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

        let layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        });

        tracing_subscriber::registry().with(filter).with(layer).init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_preferences(config: &Config) -> Preferences {
    match config.preferences_path() {
        Some(path) => Preferences::open_or_unavailable(path),
        None => Preferences::unavailable(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none());

    let mut config = Config::load()?;
    if let Some(owner) = cli.owner {
        config.github.owner = owner;
    }
    tracing::debug!("Listing Pages sites for {}", config.github.owner);

    let client = GitHubClient::with_base_url(config.github.api_url.clone())?
        .with_per_page(config.github.per_page);
    let source = GitHubSource::new(client);

    match cli.command {
        None => {
            let controller = ViewController::new(&config.github.owner, open_preferences(&config))
                .with_date_format(&config.ui.date_format);

            let loader: Option<Arc<dyn IconLoader>> = if config.ui.resolve_favicons {
                Some(Arc::new(FaviconProbe::new()?))
            } else {
                None
            };

            run_tui(App::new(controller), Arc::new(source), loader).await?;
        }
        Some(Commands::List { query, sort }) => {
            let mut controller = load(&config, &source).await?;
            controller.set_query(query.unwrap_or_default());
            let cards = arranged_cards(&controller, &config, sort);

            println!("{} · {} site(s)", controller.owner(), controller.count());
            if let Some(status) = controller.status() {
                println!("{}", status);
            }
            for card in &cards {
                print_card(card);
            }
        }
        Some(Commands::Export {
            path,
            format,
            query,
            no_favicons,
        }) => {
            let mut controller = load(&config, &source).await?;
            controller.set_query(query.unwrap_or_default());
            let cards = arranged_cards(&controller, &config, None);
            let owner = controller.owner().to_string();
            let view_mode = controller.view_mode();

            let dir = if no_favicons || !config.ui.resolve_favicons {
                Directory::unresolved(&owner, view_mode, cards)
            } else {
                let probe = FaviconProbe::new()?;
                Directory::resolve(&owner, view_mode, cards, &probe).await
            }
            .with_total(controller.count());

            match format {
                Some(format) => Exporter::export_to_file_with_format(&dir, &path, format)?,
                None => Exporter::export_to_file(&dir, &path)?,
            }
            println!("Exported {} site(s) to {}", dir.entries.len(), path.display());
        }
        Some(Commands::Prefs { sort, view }) => {
            let prefs = open_preferences(&config);
            if !prefs.is_available() {
                eprintln!("Preference store unavailable; showing defaults");
            }
            if let Some(sort) = sort {
                prefs.set_sort_mode(sort);
            }
            if let Some(view) = view {
                prefs.set_view_mode(view);
            }
            println!("sort = {}", prefs.sort_mode());
            println!("view = {}", prefs.view_mode());
        }
    }

    Ok(())
}

async fn load(config: &Config, source: &GitHubSource) -> anyhow::Result<ViewController> {
    let mut controller = ViewController::new(&config.github.owner, open_preferences(config))
        .with_date_format(&config.ui.date_format);
    controller.load(source).await;

    if controller.state() == LoadState::Error {
        anyhow::bail!(
            "{} Could not list repositories for {}",
            controller.status().map(|s| s.text()).unwrap_or_default(),
            controller.owner()
        );
    }

    Ok(controller)
}

/// Cards for a one-off sort that leaves the stored preference alone
fn arranged_cards(
    controller: &ViewController,
    config: &Config,
    sort: Option<SortMode>,
) -> Vec<SiteCard> {
    let sort = sort.unwrap_or_else(|| controller.sort_mode());
    directory::arrange(controller.repositories(), controller.query(), sort)
        .into_iter()
        .map(|repo| SiteCard::from_record(repo, controller.owner(), &config.ui.date_format))
        .collect()
}

fn print_card(card: &SiteCard) {
    let [updated, link, language, stars] = card.meta_row();
    println!();
    println!("{}  <{}>", card.title, card.site_url);
    println!("  {}", card.description);
    println!("  {} · {} <{}> · {} · {}", updated, link, card.repo_url, language, stars);
}
