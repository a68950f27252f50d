use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use dialoguer::{Confirm, Select};
use std::io;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use tv2go_client::format::{format_airdate, human_size, relative_time};
use tv2go_client::model::{
    Episode, EpisodeId, EpisodeStatus, IndexerQuery, NewEpisode, NewShow, ProviderResult, Show,
    ShowCandidate, ShowId, UnknownStatusError,
};
use tv2go_client::{ClientConfig, HttpBackend, Session, Tv2goError, config_path};

/// Command line client for a tv2go TV show library
#[derive(Parser)]
#[command(name = "tv2go", version, about)]
struct Cli {
    /// Base URL of the backend API, overrides the configured one
    #[arg(long, global = true)]
    url: Option<String>,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List all shows in the library
    Shows,

    /// Show the details of a single show
    Show { id: ShowId },

    /// List the episodes of a show
    Episodes {
        show_id: ShowId,

        /// Only list episodes of this season
        #[arg(long)]
        season: Option<i64>,
    },

    /// Search an indexer and add the chosen show to the library
    AddShow(AddShowArgs),

    /// Manually add an episode to a show
    AddEpisode {
        show_id: ShowId,
        season: i64,
        episode: i64,
        name: String,

        /// Air date as YYYY-MM-DD
        #[arg(long)]
        airdate: Option<NaiveDate>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, value_parser = parse_status, default_value = "WANTED")]
        status: EpisodeStatus,
    },

    /// Change the status of an episode
    SetStatus {
        show_id: ShowId,
        episode_id: EpisodeId,
        #[arg(value_parser = parse_status)]
        status: EpisodeStatus,
    },

    /// Delete an episode
    DeleteEpisode {
        show_id: ShowId,
        episode_id: EpisodeId,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Search providers for an episode and download the chosen release
    Grab {
        show_id: ShowId,
        episode_id: EpisodeId,
    },

    /// Reload a show from its indexer
    Refresh { show_id: ShowId },

    /// Match files on disk to a show's episodes
    Rescan { show_id: ShowId },

    /// Print the configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Args)]
struct AddShowArgs {
    /// Name to search for
    name: String,

    /// Indexer to search, defaults to the configured one
    #[arg(long)]
    indexer: Option<String>,

    /// Quality group, defaults to the backend's default group
    #[arg(long)]
    quality_group: Option<String>,

    /// Initial status of the show's episodes, asked for when omitted
    #[arg(long, value_parser = parse_status)]
    status: Option<EpisodeStatus>,

    /// Directory holding the show's files
    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    anime: bool,

    #[arg(long)]
    air_by_date: bool,
}

fn parse_status(value: &str) -> Result<EpisodeStatus, UnknownStatusError> {
    value.parse()
}

fn init_tracing(configured_level: &str, verbose: u8) {
    // -v wins over RUST_LOG, which wins over the config file
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured_level)),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn prompt_error(error: dialoguer::Error) -> Tv2goError {
    Tv2goError::Io(io::Error::other(error))
}

type ClientSession = Session<HttpBackend>;

fn print_show(show: &Show) {
    let now = Utc::now();
    println!("{} [{}]", show.name, show.id);
    println!("  Indexer: {}", show.indexer_label());
    if !show.network.is_empty() {
        println!("  Network: {}", show.network);
    }
    if !show.airs.is_empty() {
        println!("  Airs: {}", show.airs);
    }
    println!("  Status: {}", show.status);
    println!("  Quality: {}", show.quality_group);
    println!("  Location: {}", show.location);
    if show.paused {
        println!("  Paused");
    }
    if let Some(next) = &show.next_ep_airdate {
        println!("  Next episode: {}", relative_time(next, &now));
    }
    if let Some(updated) = &show.last_indexer_update {
        println!("  Last indexer update: {}", relative_time(updated, &now));
    }
}

fn episode_line(episode: &Episode) -> String {
    let mut line = format!(
        "{:>6}  {}  {:<12}  {:<15}  {}",
        episode.id,
        episode.label(),
        format_airdate(episode.airdate),
        episode.status,
        episode.name
    );
    if episode.file_size > 0 {
        line.push_str(&format!(" ({})", human_size(episode.file_size)));
    }
    line
}

fn candidate_label(candidate: &ShowCandidate) -> String {
    let mut details = vec![candidate.network.as_str(), candidate.status.as_str()];
    details.retain(|detail| !detail.is_empty());
    if details.is_empty() {
        format!("{} #{}", candidate.name, candidate.indexer_id)
    } else {
        format!(
            "{} ({}) #{}",
            candidate.name,
            details.join(", "),
            candidate.indexer_id
        )
    }
}

fn release_label(release: &ProviderResult) -> String {
    let age = release
        .age
        .map(|age| relative_time(&age, &Utc::now()))
        .unwrap_or_else(|| "unknown age".to_string());
    format!(
        "[{}] {} ({}, {}, {})",
        release.provider,
        release.name,
        release.quality,
        human_size(release.size),
        age
    )
}

async fn add_show(
    session: &ClientSession,
    config: &ClientConfig,
    args: AddShowArgs,
) -> Result<(), Tv2goError> {
    let AddShowArgs {
        name,
        indexer,
        quality_group,
        status,
        location,
        anime,
        air_by_date,
    } = args;
    let indexer = indexer.unwrap_or_else(|| config.default_indexer.clone());
    let candidates = session
        .indexer
        .search(&IndexerQuery::new(indexer.as_str(), name.as_str()))
        .await?;

    if candidates.is_empty() {
        println!("No shows found on {} for '{}'.", indexer, name);
        return Ok(());
    }

    let labels: Vec<String> = candidates.iter().map(candidate_label).collect();
    let Some(choice) = Select::new()
        .with_prompt("Which show do you want to add?")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?
    else {
        println!("Cancelled.");
        return Ok(());
    };

    let status = match status {
        Some(status) => status,
        None => {
            let statuses = session.indexer.default_statuses();
            let labels: Vec<&str> = statuses.iter().map(EpisodeStatus::as_str).collect();
            let Some(index) = Select::new()
                .with_prompt("Initial status of its episodes")
                .items(&labels)
                .default(0)
                .interact_opt()
                .map_err(prompt_error)?
            else {
                println!("Cancelled.");
                return Ok(());
            };
            statuses[index].clone()
        }
    };

    let quality_group = match quality_group {
        Some(group) => group,
        None => session
            .indexer
            .reference_data()
            .await?
            .default_quality_group()
            .map(|group| group.name.clone())
            .unwrap_or_default(),
    };

    let mut new_show = NewShow::from_candidate(&indexer, &candidates[choice]);
    new_show.quality_group = quality_group;
    new_show.episode_status = Some(status);
    new_show.location = location.unwrap_or_default();
    new_show.anime = anime;
    new_show.air_by_date = air_by_date;

    let show = session.shows.create_show(&new_show).await?;
    println!("Added '{}' with id {}.", show.name, show.id);
    Ok(())
}

async fn grab(
    session: &ClientSession,
    show_id: ShowId,
    episode_id: EpisodeId,
) -> Result<(), Tv2goError> {
    let show = session.select_show(show_id).await?;
    let episode = session.find_episode(show_id, episode_id).await?;

    println!("Searching providers for {} {}...", show.name, episode.label());
    let releases = session.episodes.search_episode(&show, &episode).await?;
    if releases.is_empty() {
        println!("No releases found.");
        return Ok(());
    }

    let labels: Vec<String> = releases.iter().map(release_label).collect();
    let Some(choice) = Select::new()
        .with_prompt("Which release do you want to download?")
        .items(&labels)
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?
    else {
        println!("Cancelled.");
        return Ok(());
    };

    let downloaded = session
        .episodes
        .download_episode(&show, &episode, &releases[choice])
        .await?;
    println!(
        "{} {} is now {}.",
        show.name,
        downloaded.label(),
        downloaded.status
    );
    Ok(())
}

async fn run(cli: Cli, config: ClientConfig) -> Result<(), Tv2goError> {
    if let Command::Config { save } = cli.command {
        if save {
            let path = config.save()?;
            println!("Saved configuration to {}", path.display());
        } else {
            println!("# {}", config_path()?.display());
        }
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let session = Session::connect(&config)?;

    match cli.command {
        Command::Shows => {
            let shows = session.shows.get_shows().await?;
            if shows.is_empty() {
                println!("No shows in the library.");
            }
            for show in &shows {
                let paused = if show.paused { "  (paused)" } else { "" };
                println!("{:>6}  {}{}", show.id, show.name, paused);
            }
        }
        Command::Show { id } => {
            let show = session.select_show(id).await?;
            print_show(&show);
        }
        Command::Episodes { show_id, season } => {
            let show = session.select_show(show_id).await?;
            let episodes = session.episodes.get_episodes(show_id).await?;
            println!("{} - {} episode(s)\n", show.name, episodes.len());
            for episode in episodes
                .iter()
                .filter(|episode| season.is_none_or(|season| episode.season == season))
            {
                println!("{}", episode_line(episode));
            }
        }
        Command::AddShow(args) => add_show(&session, &config, args).await?,
        Command::AddEpisode {
            show_id,
            season,
            episode,
            name,
            airdate,
            description,
            status,
        } => {
            session.select_show(show_id).await?;
            session.episodes.get_episodes(show_id).await?;
            let new_episode = NewEpisode {
                show_id,
                name,
                season,
                episode,
                airdate,
                description,
                status,
            };
            let created = session.episodes.create_episode(&new_episode).await?;
            println!("Added {} with id {}.", created.label(), created.id);
        }
        Command::SetStatus {
            show_id,
            episode_id,
            status,
        } => {
            let mut episode = session.find_episode(show_id, episode_id).await?;
            episode.status = status;
            let updated = session.episodes.update_episode(&episode).await?;
            println!("{} is now {}.", updated.label(), updated.status);
        }
        Command::DeleteEpisode {
            show_id,
            episode_id,
            yes,
        } => {
            let episode = session.find_episode(show_id, episode_id).await?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Delete {} '{}'?", episode.label(), episode.name))
                    .default(false)
                    .interact()
                    .map_err(prompt_error)?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
            session.episodes.delete_episode(&episode).await?;
            println!("Deleted {}.", episode.label());
        }
        Command::Grab {
            show_id,
            episode_id,
        } => grab(&session, show_id, episode_id).await?,
        Command::Refresh { show_id } => {
            let show = session.select_show(show_id).await?;
            let refreshed = session.shows.refresh_from_indexer(&show).await?;
            println!("Refreshed '{}' from {}.", refreshed.name, refreshed.indexer_label());
        }
        Command::Rescan { show_id } => {
            let show = session.select_show(show_id).await?;
            let rescanned = session.shows.rescan_from_disk(&show).await?;
            println!("Rescanned '{}' at {}.", rescanned.name, rescanned.location);
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }

    init_tracing(&config.log_level, cli.verbose);
    tracing::debug!(base_url = %config.base_url, "Configuration loaded");

    if let Err(e) = run(cli, config).await {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
