// This demo sends one request to Gemini through the retrying uplink.
//
//   cargo run -p ask -- chat What is a coronal mass ejection?
//   cargo run -p ask -- quiz "Black Holes"
//   cargo run -p ask -- mission "Voyager 1" 1977
//
// Ctrl-C abandons the request while it is backing off.

use clap::{Parser, Subcommand};
use spacescope::llm::GenerateRequest;
use spacescope::prompts::{MissionAnalysis, QuizQuestion, fallback_quiz, quiz_or_fallback};
use spacescope::{
    CtrlCShutdown, FailureNotice, GenerationService, PromptCatalog, PromptError, cancel_on_signal,
};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Ask the SpaceScope navigator a question.
#[derive(Debug, Parser)]
#[command(name = "ask")]
#[command(about = "Query Gemini through the SpaceScope uplink", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Chat with the AI Navigator.
    Chat {
        /// Message words, joined with spaces.
        #[arg(required = true, value_parser = non_blank)]
        message: Vec<String>,
    },

    /// Generate a five-question quiz.
    Quiz {
        /// Topic of the quiz; general astronomy when omitted.
        #[arg(value_parser = non_blank)]
        topic: Option<String>,
    },

    /// Analyse a space mission.
    Mission {
        /// Mission name, e.g. "Voyager 1".
        #[arg(value_parser = non_blank)]
        name: String,
        /// Launch year.
        year: u16,
    },
}

fn non_blank(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err("value must not be blank".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn build_request(
    catalog: &PromptCatalog,
    command: &Command,
) -> Result<GenerateRequest, PromptError> {
    match command {
        Command::Chat { message } => Ok(catalog.chat(&message.join(" "))),
        Command::Quiz { topic } => catalog.quiz(topic.as_deref()),
        Command::Mission { name, year } => catalog.mission_analysis(name, &year.to_string()),
    }
}

fn print_quiz(questions: &[QuizQuestion]) {
    for (i, q) in questions.iter().enumerate() {
        println!("{}. {}", i + 1, q.question);
        for option in &q.options {
            println!("   - {option}");
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize the logger.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let catalog = match PromptCatalog::new() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "Failed to load prompt templates");
            return;
        }
    };
    let request = match build_request(&catalog, &cli.command) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Failed to build request");
            return;
        }
    };

    let token = CancellationToken::new();
    let watcher = cancel_on_signal(CtrlCShutdown::new(), token.clone());

    info!(model = %request.model, "Opening uplink");
    let result = GenerationService::from_env()
        .generate_cancellable(request, &token)
        .await;
    token.cancel();
    let _ = watcher.await;

    match (result, &cli.command) {
        (Ok(response), Command::Quiz { .. }) => print_quiz(&quiz_or_fallback(&response)),
        (Ok(response), Command::Mission { .. }) => {
            match response.parse_json_or::<MissionAnalysis>("{}") {
                Ok(analysis) => {
                    println!("{}\n\n{}", analysis.title, analysis.legacy_impact);
                    for reading in &analysis.telemetry_sim {
                        println!("  {}: {}", reading.sensor, reading.value);
                    }
                }
                Err(e) => error!(error = %e, "Mission payload unreadable"),
            }
        }
        (Ok(response), Command::Chat { .. }) => println!("{}", response.text_or("(no answer)")),
        (Err(e), command) => {
            let notice = FailureNotice::from_error(&e);
            println!("{}: {}", notice.headline(), notice);
            if let Command::Quiz { .. } = command {
                println!("Loading localized quiz archive.");
                print_quiz(&fallback_quiz());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        let argv = std::iter::once("ask").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.command)
    }

    #[test]
    fn chat_joins_words() {
        let command = parse(&["chat", "What", "is", "Kp?"]).unwrap();
        let catalog = PromptCatalog::new().unwrap();
        let request = build_request(&catalog, &command).unwrap();
        assert_eq!(request.prompt_text(), "What is Kp?");
    }

    #[test]
    fn chat_requires_a_message() {
        assert!(parse(&["chat"]).is_err());
        assert!(parse(&["chat", "   "]).is_err());
    }

    #[test]
    fn quiz_topic_is_optional() {
        assert!(matches!(parse(&["quiz"]).unwrap(), Command::Quiz { topic: None }));
        assert!(matches!(
            parse(&["quiz", "Black Holes"]).unwrap(),
            Command::Quiz { topic: Some(t) } if t == "Black Holes"
        ));
    }

    #[test]
    fn mission_requires_name_and_year() {
        assert!(parse(&["mission", "Voyager 1"]).is_err());
        assert!(parse(&["mission", "Voyager 1", "late"]).is_err());
        let command = parse(&["mission", "Voyager 1", "1977"]).unwrap();
        let catalog = PromptCatalog::new().unwrap();
        let request = build_request(&catalog, &command).unwrap();
        assert!(request.prompt_text().contains("Voyager 1 (1977)"));
    }
}
