mod config;
mod session;
mod view;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use controller::render::render_matches;
use oauth_client::TokenProvider;
use recommender_client::{
    MAX_RATING, MIN_RATING, MatchQuery, ReactionValue, RecommenderClient, SortOrder, Submission,
};

use config::{Flow, Settings};

/// Kooyara - react to statements and answer questions from the command line
#[derive(Parser)]
#[command(name = "kooyara")]
#[command(about = "Client for the Kooyara recommender API", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Kind of items to work with
    #[arg(long, value_enum, global = true, default_value = "statements")]
    flow: Flow,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an access token and show its details
    Token,

    /// Show the next item the profile has not reacted to
    Next,

    /// Post a reaction to a statement
    React {
        /// Statement ID
        #[arg(long)]
        statement: String,

        /// Rating from 1 to 5
        #[arg(long, conflicts_with = "skip", required_unless_present = "skip")]
        rating: Option<u8>,

        /// Skip the statement instead of rating it
        #[arg(long)]
        skip: bool,
    },

    /// Post an answer to a question
    Answer {
        /// Question ID
        #[arg(long)]
        question: String,

        /// The selected option
        #[arg(long)]
        option: String,
    },

    /// List profiles similar to this one
    Matches {
        /// Maximum number of matches
        #[arg(long)]
        limit: Option<u32>,

        /// Sort by similarity
        #[arg(long, value_enum)]
        sort: Option<Sort>,
    },

    /// Fetch, display and react to items until the server runs out
    Session {
        /// Whether the profile has been pushed to the recommender
        #[arg(long, env = "KOOYARA_PUSHED", default_value_t = true, action = ArgAction::Set)]
        pushed: bool,

        /// Show the matches sidebar
        #[arg(long)]
        matches: bool,

        /// Maximum number of matches in the sidebar
        #[arg(long, requires = "matches")]
        limit: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Sort {
    Asc,
    Desc,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Asc => SortOrder::Ascending,
            Sort::Desc => SortOrder::Descending,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = cli.settings;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Token => handle_token(&settings).await?,
        Commands::Next => handle_next(&settings, cli.flow).await?,
        Commands::React {
            statement,
            rating,
            skip,
        } => handle_react(&settings, statement, rating, skip).await?,
        Commands::Answer { question, option } => {
            handle_answer(&settings, question, option).await?
        }
        Commands::Matches { limit, sort } => {
            let query = MatchQuery {
                sort: sort.map(SortOrder::from),
                limit,
            };
            handle_matches(&settings, query).await?
        }
        Commands::Session {
            pushed,
            matches,
            limit,
        } => {
            let query = matches.then_some(MatchQuery {
                sort: Some(SortOrder::Descending),
                limit,
            });
            session::run(&settings, cli.flow, pushed, query).await?
        }
    }

    Ok(())
}

fn token_provider(settings: &Settings) -> Result<TokenProvider> {
    TokenProvider::new(settings.credentials()).context("Invalid OAuth2 credentials")
}

fn recommender(settings: &Settings, flow: Flow) -> Result<RecommenderClient> {
    RecommenderClient::new(settings.endpoints(flow)?).context("Invalid endpoint configuration")
}

/// Handle the 'token' command
async fn handle_token(settings: &Settings) -> Result<()> {
    let token = token_provider(settings)?
        .fetch_token()
        .await
        .context("Failed to obtain an access token")?;

    println!("{} Token acquired", "✓".green());
    println!("{}Type: {}", "• ".cyan(), token.token_type);
    println!("{}Scope: {}", "• ".cyan(), token.scope);
    println!("{}Expires in: {}s", "• ".cyan(), token.expires_in);
    Ok(())
}

/// Handle the 'next' command
async fn handle_next(settings: &Settings, flow: Flow) -> Result<()> {
    let tokens = token_provider(settings)?;
    let api = recommender(settings, flow)?;

    let token = tokens.fetch_token().await.context("Failed to obtain an access token")?;
    let item = api
        .fetch_next_item(&token)
        .await
        .context("Failed to fetch the next item")?;

    match item {
        Some(item) => {
            println!("{} {}", item.id.dimmed(), item.text.bold());
            for (i, option) in item.options.iter().enumerate() {
                println!("  {} {}", format!("{})", i + 1).cyan(), option);
            }
        }
        None => println!("{}", "Nothing left to react to.".green()),
    }
    Ok(())
}

/// Handle the 'react' command
async fn handle_react(
    settings: &Settings,
    statement: String,
    rating: Option<u8>,
    skip: bool,
) -> Result<()> {
    let value = match (skip, rating) {
        (true, _) => ReactionValue::Skip,
        (false, Some(r)) => ReactionValue::rating(r).ok_or_else(|| {
            anyhow!("Rating must be between {} and {}", MIN_RATING, MAX_RATING)
        })?,
        (false, None) => return Err(anyhow!("Either --rating or --skip is required")),
    };

    let submission = Submission::reaction(settings.profile.clone(), statement, value);
    submit(settings, Flow::Statements, &submission).await
}

/// Handle the 'answer' command
async fn handle_answer(settings: &Settings, question: String, option: String) -> Result<()> {
    let submission = Submission::answer(settings.profile.clone(), question, option);
    submit(settings, Flow::Questions, &submission).await
}

async fn submit(settings: &Settings, flow: Flow, submission: &Submission) -> Result<()> {
    let tokens = token_provider(settings)?;
    let api = recommender(settings, flow)?;

    let token = tokens.fetch_token().await.context("Failed to obtain an access token")?;
    api.submit(&token, submission)
        .await
        .with_context(|| format!("Failed to submit for item {}", submission.item_id()))?;

    println!("{} Submitted for {}", "✓".green(), submission.item_id());
    Ok(())
}

/// Handle the 'matches' command
async fn handle_matches(settings: &Settings, query: MatchQuery) -> Result<()> {
    let tokens = token_provider(settings)?;
    let api = recommender(settings, Flow::Statements)?;

    let token = tokens.fetch_token().await.context("Failed to obtain an access token")?;
    let matches = api
        .fetch_matches(&token, &query)
        .await
        .context("Failed to fetch matches")?;

    let mut view = view::TerminalView::new();
    view.apply(&render_matches(&matches));
    Ok(())
}
