//! Interactive session: the page controller driven from stdin.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use controller::{ControllerConfig, PageController, RenderInstruction, UserAction};
use oauth_client::{TokenProvider, TokenSource};
use recommender_client::{MatchQuery, RecommenderApi, RecommenderClient};

use crate::config::{Flow, Settings};
use crate::view::{Input, TerminalView, parse_input};

pub async fn run(
    settings: &Settings,
    flow: Flow,
    pushed: bool,
    matches: Option<MatchQuery>,
) -> Result<()> {
    let tokens =
        TokenProvider::new(settings.credentials()).context("Invalid OAuth2 credentials")?;
    let api = RecommenderClient::new(settings.endpoints(flow)?)
        .context("Invalid endpoint configuration")?;

    let mut config = ControllerConfig::new(settings.profile.clone(), flow.into()).with_pushed(pushed);
    if let Some(query) = matches {
        config = config.with_matches(query);
    }

    info!("Starting {:?} session for profile {}", flow, settings.profile);
    let mut page = PageController::new(config, tokens, api);
    let mut view = TerminalView::new();

    print_help(flow);
    let outcome = page.start().await;
    show(&page, &mut view, outcome);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if let Step::Quit = dispatch(&mut page, &mut view, flow, parse_input(&line)).await {
            break;
        }
    }

    info!("Session ended");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Quit,
}

/// Apply one line of input to the page.
async fn dispatch<T: TokenSource, A: RecommenderApi>(
    page: &mut PageController<T, A>,
    view: &mut TerminalView,
    flow: Flow,
    input: Input,
) -> Step {
    let outcome = match input {
        Input::Quit => return Step::Quit,
        Input::Help => {
            print_help(flow);
            return Step::Continue;
        }
        Input::Number(n) => {
            select(page, view, flow, n);
            return Step::Continue;
        }
        Input::Submit => page.handle(UserAction::Submit).await,
        Input::Skip => page.handle(UserAction::Skip).await,
        Input::Reload if page.displayed_item().is_some() => {
            println!("An item is already displayed.");
            return Step::Continue;
        }
        Input::Reload => page.load_next().await,
        Input::Matches => page.refresh_matches().await,
        Input::Unknown(word) => {
            println!("Unknown command '{}', type h for help.", word);
            return Step::Continue;
        }
    };
    show(page, view, outcome);
    Step::Continue
}

/// Apply a plan, or route the failure through the controller's error handler.
fn show<T: TokenSource, A: RecommenderApi>(
    page: &PageController<T, A>,
    view: &mut TerminalView,
    outcome: controller::Result<Vec<RenderInstruction>>,
) {
    match outcome {
        Ok(plan) => view.apply(&plan),
        Err(e) => view.apply(&page.report_error(&e)),
    }
}

fn select<T: TokenSource, A: RecommenderApi>(
    page: &mut PageController<T, A>,
    view: &mut TerminalView,
    flow: Flow,
    n: usize,
) {
    match flow {
        Flow::Statements => {
            let value = u8::try_from(n).unwrap_or(u8::MAX);
            match page.set_rating(value) {
                Ok(()) => view.move_slider(value),
                Err(e) => view.apply(&page.report_error(&e)),
            }
        }
        Flow::Questions => match view.option(n).map(str::to_string) {
            Some(option) => match page.select_option(option.as_str()) {
                Ok(()) => println!("Selected: {}", option),
                Err(e) => view.apply(&page.report_error(&e)),
            },
            None => println!("There is no option {}.", n),
        },
    }
}

fn print_help(flow: Flow) {
    match flow {
        Flow::Statements => println!(
            "Type 1-5 to move the slider, Enter to submit, s to skip, m for matches, q to quit."
        ),
        Flow::Questions => {
            println!("Type an option number to select it, Enter to save, m for matches, q to quit.")
        }
    }
}
