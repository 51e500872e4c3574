//! quizforge CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizforge",
    version,
    about = "Generate, take, and score LLM-written quizzes"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides `data_dir` from the config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate quizzes and store them
    Generate {
        /// Topics, one quiz per topic (comma-separated)
        #[arg(long)]
        topic: String,

        /// Quiz title (defaults to "<topic> quiz")
        #[arg(long)]
        title: Option<String>,

        /// Questions per quiz
        #[arg(long, default_value = "10")]
        num_questions: u32,

        /// Time limit in minutes
        #[arg(long, default_value = "30")]
        time_limit: u32,

        /// Difficulty: easy, medium, hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Owner recorded on the quiz
        #[arg(long)]
        owner: Option<String>,

        /// Model to use (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
    },

    /// Run the normalizer over a saved completion
    Check {
        /// File holding raw completion text
        #[arg(long)]
        raw: PathBuf,

        /// Number of questions that were requested
        #[arg(long, default_value = "10")]
        expected_count: usize,
    },

    /// Print a stored quiz without its answers
    Show {
        #[arg(long)]
        quiz: String,
    },

    /// List quizzes created by an owner
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Delete a quiz you own
    Delete {
        #[arg(long)]
        quiz: String,

        #[arg(long)]
        owner: Option<String>,
    },

    /// Score a set of answers against a stored quiz
    Submit {
        #[arg(long)]
        quiz: String,

        /// JSON file with `[{"questionId": ..., "answer": ...}]`
        #[arg(long)]
        answers: PathBuf,

        #[arg(long)]
        candidate: Option<String>,

        /// Seconds spent on the attempt
        #[arg(long, default_value = "0")]
        time_taken: u64,
    },

    /// Show a candidate's result history
    Results {
        #[arg(long)]
        candidate: Option<String>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "quizforge=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();
    let ctx = commands::Context {
        config_path: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Generate {
            topic,
            title,
            num_questions,
            time_limit,
            difficulty,
            owner,
            model,
        } => {
            commands::generate::execute(
                &ctx,
                topic,
                title,
                num_questions,
                time_limit,
                difficulty,
                owner,
                model,
            )
            .await
        }
        Commands::Check {
            raw,
            expected_count,
        } => commands::check::execute(raw, expected_count),
        Commands::Show { quiz } => commands::show::execute(&ctx, quiz),
        Commands::List { owner } => commands::list::execute(&ctx, owner),
        Commands::Delete { quiz, owner } => commands::delete::execute(&ctx, quiz, owner),
        Commands::Submit {
            quiz,
            answers,
            candidate,
            time_taken,
        } => commands::submit::execute(&ctx, quiz, answers, candidate, time_taken),
        Commands::Results { candidate } => commands::results::execute(&ctx, candidate),
        Commands::ListModels { provider } => commands::list_models::execute(&ctx, provider),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
