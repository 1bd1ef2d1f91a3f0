use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use lingua_core::Clock;
use services::{
    DEFAULT_CARDS_PER_DECK, DEFAULT_OPTION_COUNT, DeckGenService, Direction, FlashcardAiService,
    Mode, StudySession,
};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { flag: &'static str, raw: String },
    InvalidMode { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidMode { raw } => {
                write!(f, "invalid --mode value: {raw} (expected study or quiz)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--topic <topic>] [--mode study|quiz]");
    eprintln!("                      [--cards <n>] [--choices <n>]");
    eprintln!();
    eprintln!("Without --topic the AI collaborator is asked to suggest one.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LINGUA_AI_API_KEY   (required) collaborator API key");
    eprintln!("  LINGUA_AI_BASE_URL  chat-completions endpoint base");
    eprintln!("  LINGUA_AI_MODEL     model name");
    eprintln!("  LINGUA_TOPIC, LINGUA_MODE  defaults for --topic / --mode");
}

struct Args {
    topic: Option<String>,
    mode: Mode,
    cards: u32,
    choices: usize,
}

fn parse_mode(raw: &str) -> Result<Mode, ArgsError> {
    match raw {
        "study" => Ok(Mode::Study),
        "quiz" => Ok(Mode::Quiz),
        _ => Err(ArgsError::InvalidMode {
            raw: raw.to_owned(),
        }),
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topic = std::env::var("LINGUA_TOPIC").ok().filter(|t| !t.trim().is_empty());
        let mut mode = match std::env::var("LINGUA_MODE") {
            Ok(raw) => parse_mode(raw.trim())?,
            Err(_) => Mode::Study,
        };
        let mut cards = DEFAULT_CARDS_PER_DECK;
        let mut choices = DEFAULT_OPTION_COUNT;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => {
                    topic = Some(require_value(args, "--topic")?);
                }
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    mode = parse_mode(value.trim())?;
                }
                "--cards" => {
                    let value = require_value(args, "--cards")?;
                    cards = value.parse().ok().filter(|n| *n > 0).ok_or_else(|| {
                        ArgsError::InvalidCount {
                            flag: "--cards",
                            raw: value.clone(),
                        }
                    })?;
                }
                "--choices" => {
                    let value = require_value(args, "--choices")?;
                    choices = value.parse().ok().filter(|n| *n > 0).ok_or_else(|| {
                        ArgsError::InvalidCount {
                            flag: "--choices",
                            raw: value.clone(),
                        }
                    })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            topic,
            mode,
            cards,
            choices,
        })
    }
}

fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn show_card(session: &StudySession) {
    if let Some(card) = session.current_card() {
        println!();
        println!(
            "Card {}/{}: {}",
            session.current_index() + 1,
            session.deck().len(),
            card.term()
        );
    }
}

fn run_study(session: &mut StudySession) -> io::Result<()> {
    println!("Study mode: Enter reveals, n = next, p = previous, q = quit.");
    loop {
        show_card(session);
        let Some(input) = prompt_line("> ")? else {
            return Ok(());
        };
        match input.as_str() {
            "" => {
                if let Some(card) = session.current_card() {
                    println!("  {}", card.meaning());
                    if let Some(example) = card.example() {
                        println!("  e.g. {example}");
                    }
                }
            }
            "n" => {
                if !session.advance(Direction::Forward, Mode::Study) {
                    println!("(last card)");
                }
            }
            "p" => {
                if !session.advance(Direction::Back, Mode::Study) {
                    println!("(first card)");
                }
            }
            "q" => return Ok(()),
            _ => println!("Enter, n, p or q."),
        }
    }
}

fn run_quiz(session: &mut StudySession) -> io::Result<()> {
    println!("Quiz mode: answer with the option number, q = quit.");
    loop {
        while !session.is_finished() {
            let Some(card) = session.current_card() else {
                break;
            };
            let card_id = card.id();
            show_card(session);
            let options: Vec<String> = session
                .options_for(card_id)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {option}", i + 1);
            }

            let Some(input) = prompt_line("answer> ")? else {
                return Ok(());
            };
            if input == "q" {
                return Ok(());
            }
            let chosen = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i));
            let Some(chosen) = chosen else {
                println!("Pick a number between 1 and {}.", options.len());
                continue;
            };

            match session.submit_answer(card_id, chosen).cloned() {
                Some(record) if record.is_correct => println!("Correct!"),
                Some(record) => {
                    println!("Not quite: you chose \"{}\".", record.chosen);
                    if let Some(card) = session.deck().card(card_id) {
                        println!("The answer is \"{}\".", card.meaning());
                    }
                }
                None => {}
            }
            let progress = session.progress();
            println!("Score: {}/{}", progress.score, progress.total);

            session.advance(Direction::Forward, Mode::Quiz);
        }

        println!();
        println!(
            "Quiz complete! {}% ({} out of {} correct)",
            session.percent_score(),
            session.score(),
            session.deck().len()
        );
        let Some(again) = prompt_line("Try again? [y/N] ")? else {
            return Ok(());
        };
        if again.eq_ignore_ascii_case("y") {
            session.restart();
        } else {
            return Ok(());
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let ai = FlashcardAiService::from_env();
    if !ai.enabled() {
        eprintln!("LINGUA_AI_API_KEY is not set; cannot reach the flashcard collaborator.");
        print_usage();
        std::process::exit(2);
    }

    let service = DeckGenService::new(Clock::default_clock(), Arc::new(ai))
        .with_cards_per_deck(args.cards)
        .with_option_count(args.choices);

    let topic = match args.topic {
        Some(topic) => topic,
        None => {
            println!("No topic given, asking for a suggestion...");
            let topic = service.suggest_topic().await?;
            println!("Suggested topic: {topic}");
            topic
        }
    };

    println!("Generating flashcards for \"{}\"...", topic.trim());
    let mut session = service.generate(&topic).await?;
    println!(
        "Generated {} cards for \"{}\".",
        session.deck().len(),
        session.deck().topic()
    );

    match args.mode {
        Mode::Study => run_study(&mut session)?,
        Mode::Quiz => run_quiz(&mut session)?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
