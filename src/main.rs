use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinelist::{
    config::Config,
    db::{CollectionStore, FileStorage},
    models::{CollectionName, DiscoverFilters, Movie},
    services::{CatalogProvider, HomeFeed, SearchController, TmdbProvider},
};

const USAGE: &str = "usage: cinelist [home | search <query> | show <id> | genres | discover [genre-id] | favorite <id> | watch <id> | list <favorites|watchlist>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let provider: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::from_config(&config)?);
    let storage = Arc::new(FileStorage::new(&config.data_dir));
    let mut store = CollectionStore::initialize(storage);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("home");

    match command {
        "home" => {
            let mut feed = HomeFeed::new(provider);
            let report = feed.refresh().await;
            let sections = feed.sections();
            print_section("Trending Movies", &sections.trending);
            print_section("Popular Movies", &sections.popular);
            print_section("Latest Movies", &sections.now_playing);
            for (section, e) in &report.failed {
                eprintln!("could not load {:?}: {}", section, e);
            }
        }
        "search" => {
            let query = args[1..].join(" ");
            let controller = SearchController::new(provider);
            controller.search(&query).await?;
            let snapshot = controller.snapshot();
            print_section(&format!("Search Results for \"{}\"", query), &snapshot.results);
            println!("page {} of {}", snapshot.page, snapshot.total_pages);
        }
        "show" => {
            let movie = provider.get_detail(parse_id(args.get(1))?).await?;
            print_detail(&movie, &store);
        }
        "genres" => {
            for genre in provider.get_genres().await? {
                println!("{:>6}  {}", genre.id, genre.name);
            }
        }
        "discover" => {
            let mut filters = DiscoverFilters::default();
            if args.get(1).is_some() {
                let genre = u32::try_from(parse_id(args.get(1))?).context("genre id out of range")?;
                filters = filters.genre(genre);
            }
            let page = provider.discover(&filters).await?;
            print_section("Discover", &page.results);
        }
        "favorite" | "watch" => {
            let name = if command == "favorite" {
                CollectionName::Favorites
            } else {
                CollectionName::Watchlist
            };
            let movie = provider.get_detail(parse_id(args.get(1))?).await?;
            let title = movie.title.clone();
            let (member, outcome) = store.toggle(name, movie);
            if let Some(warning) = outcome.warning {
                eprintln!("warning: {} was not saved: {}", warning.collection, warning.message);
            }
            let verb = if member { "added to" } else { "removed from" };
            println!("{} {} {}", title, verb, name);
        }
        "list" => {
            let name: CollectionName = args
                .get(1)
                .context(USAGE)?
                .parse()
                .context(USAGE)?;
            print_section(&format!("My {}", name), store.list(name));
        }
        _ => anyhow::bail!(USAGE),
    }

    Ok(())
}

fn parse_id(arg: Option<&String>) -> anyhow::Result<u64> {
    let arg = arg.context(USAGE)?;
    arg.parse()
        .with_context(|| format!("invalid movie id: {}", arg))
}

fn print_section(heading: &str, movies: &[Movie]) {
    println!("{}", heading);
    if movies.is_empty() {
        println!("  (none)");
    }
    for movie in movies {
        let year = movie
            .release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        println!(
            "  {:>8}  {}  {}  {}",
            movie.id,
            year,
            movie.rating_label(),
            movie.title
        );
    }
    println!();
}

fn print_detail(movie: &Movie, store: &CollectionStore) {
    println!("{} ({})", movie.title, movie.id);
    if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("{}", tagline);
    }
    let mut facts = vec![format!("rating {}", movie.rating_label())];
    if let Some(year) = movie.release_year() {
        facts.push(year.to_string());
    }
    if let Some(runtime) = movie.runtime_label() {
        facts.push(runtime);
    }
    println!("{}", facts.join(" | "));
    if !movie.genres.is_empty() {
        let names: Vec<&str> = movie.genres.iter().map(|g| g.name.as_str()).collect();
        println!("{}", names.join(", "));
    }
    println!();
    println!("{}", movie.overview);
    println!();
    println!(
        "favorite: {}  watchlist: {}",
        store.contains(CollectionName::Favorites, movie.id),
        store.contains(CollectionName::Watchlist, movie.id)
    );
}
