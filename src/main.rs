use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_tags::{
    api::ConsoleRenderer,
    config::Config,
    models::{MovieId, TagId},
    services::{HttpTagBackend, TagBackend, TagSuggestionEngine},
};

const USAGE: &str = "commands: ? <text> | + <name> | - <tag_id> <name> | ls | quit";

/// One line of stdin input
#[derive(Debug, PartialEq)]
enum Command {
    Suggest(String),
    Add(String),
    Remove(TagId, String),
    List,
    Quit,
}

impl Command {
    /// `None` for blank lines and malformed commands
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end();

        if let Some(query) = line.strip_prefix('?') {
            return Some(Command::Suggest(query.trim_start().to_string()));
        }
        if let Some(name) = line.strip_prefix('+') {
            let name = name.trim();
            return (!name.is_empty()).then(|| Command::Add(name.to_string()));
        }
        if let Some(rest) = line.strip_prefix('-') {
            let mut parts = rest.trim().splitn(2, ' ');
            let tag_id = parts.next()?.parse::<i64>().ok()?;
            let name = parts.next().map(str::trim).unwrap_or_default();
            return (!name.is_empty()).then(|| Command::Remove(TagId(tag_id), name.to_string()));
        }

        match line {
            "ls" => Some(Command::List),
            "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_tags=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let movie_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: movie-tags <movie_id>"))?
        .parse::<i64>()
        .map(MovieId)
        .map_err(|e| anyhow::anyhow!("Invalid movie id: {}", e))?;

    let config = Config::from_env()?;

    let backend = Arc::new(HttpTagBackend::from_config(&config));
    tracing::info!(
        backend = backend.name(),
        api_url = %config.api_base_url,
        tags_path = %config.tags_path,
        movie_id = %movie_id,
        "Starting tag session"
    );

    let renderer = Arc::new(ConsoleRenderer::new());
    renderer.mount(movie_id);

    let engine = TagSuggestionEngine::from_config(&config, backend, renderer.clone());
    let debouncer = engine.suggestion_debouncer(config.debounce());

    if let Err(e) = engine.refresh_movie_tags(movie_id).await {
        if e.is_transport() {
            anyhow::bail!("Cannot load tags from {}: {}", config.api_base_url, e);
        }
    }
    println!("{}", USAGE);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        // Engine failures are already logged and shown as notifications
        match Command::parse(&line) {
            Some(Command::Suggest(query)) => debouncer.call((movie_id, query)),
            Some(Command::Add(name)) => {
                debouncer.cancel();
                let _ = engine.add_tag(movie_id, &name).await;
            }
            Some(Command::Remove(tag_id, name)) => {
                let _ = engine.remove_tag(movie_id, tag_id, &name).await;
            }
            Some(Command::List) => {
                let _ = engine.refresh_movie_tags(movie_id).await;
            }
            Some(Command::Quit) => break,
            None => println!("{}", USAGE),
        }
    }

    renderer.unmount(movie_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("? dra"),
            Some(Command::Suggest("dra".to_string()))
        );
        assert_eq!(
            Command::parse("+  Hidden Gem "),
            Some(Command::Add("Hidden Gem".to_string()))
        );
        assert_eq!(
            Command::parse("- 7 Film Noir"),
            Some(Command::Remove(TagId(7), "Film Noir".to_string()))
        );
        assert_eq!(Command::parse("ls"), Some(Command::List));
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
    }

    #[test]
    fn test_blank_add_is_rejected() {
        assert_eq!(Command::parse("+"), None);
        assert_eq!(Command::parse("+   "), None);
    }

    #[test]
    fn test_malformed_remove_is_rejected() {
        assert_eq!(Command::parse("- x Drama"), None);
        assert_eq!(Command::parse("- 3"), None);
        assert_eq!(Command::parse("nonsense"), None);
    }
}
