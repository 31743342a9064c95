//! Terminal front end: applies render plans and parses user input.

use colored::Colorize;

use controller::{MatchRow, RenderInstruction};

/// One line of user input in a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Move the slider (statements) or pick an option (questions)
    Number(usize),
    Submit,
    Skip,
    /// Fetch again after a failure
    Reload,
    Matches,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return Input::Number(n);
    }
    match line.to_lowercase().as_str() {
        "" | "submit" | "save" | "ok" => Input::Submit,
        "s" | "skip" => Input::Skip,
        "r" | "reload" => Input::Reload,
        "m" | "matches" => Input::Matches,
        "h" | "?" | "help" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Prints render instructions and remembers what is on screen.
#[derive(Debug, Default)]
pub struct TerminalView {
    options: Vec<String>,
    slider: Option<(u8, u8, u8)>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Option text for a 1-based index
    pub fn option(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }

    /// Redraw the slider with a new value.
    pub fn move_slider(&mut self, value: u8) {
        if let Some((min, max, _)) = self.slider {
            self.slider = Some((min, max, value));
            println!("{}", slider_line(min, max, value));
        }
    }

    pub fn apply(&mut self, plan: &[RenderInstruction]) {
        for instruction in plan {
            match instruction {
                RenderInstruction::ClearItem => {
                    self.options.clear();
                    self.slider = None;
                    println!();
                }
                RenderInstruction::ShowText { text } => {
                    println!("{}", text.bold());
                }
                RenderInstruction::ResetSlider { min, max, value } => {
                    self.slider = Some((*min, *max, *value));
                    println!("{}", slider_line(*min, *max, *value));
                }
                RenderInstruction::ShowOptions { options } => {
                    self.options = options.clone();
                    for (i, option) in options.iter().enumerate() {
                        println!("  {} {}", format!("{})", i + 1).cyan(), option);
                    }
                }
                RenderInstruction::ClearSelection => {}
                RenderInstruction::ShowMatches { rows } => print_matches(rows),
                RenderInstruction::ShowExhausted => {
                    println!("{}", "Nothing left to react to. Check back later.".green());
                }
                RenderInstruction::Alert { message } => {
                    println!("{} {}", "!".yellow().bold(), message.yellow());
                }
                RenderInstruction::ShowError { message } => {
                    eprintln!("{} {}", "✗".red().bold(), message.red());
                }
            }
        }
    }
}

fn slider_line(min: u8, max: u8, value: u8) -> String {
    (min..=max)
        .map(|v| {
            if v == value {
                format!("[{}]", v).green().bold().to_string()
            } else {
                format!(" {} ", v)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_matches(rows: &[MatchRow]) {
    println!("{}", "Matches:".bold().blue());
    if rows.is_empty() {
        println!("  (none yet)");
    }
    for row in rows {
        println!(
            "  {} {} {}",
            format!("{:>3}%", row.percent).green(),
            row.name,
            format!("({})", row.external_id).dimmed()
        );
    }
}
