//! ChefBot command-line client.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use chefbot::agent::ToolCallingAgent;
use chefbot::assistant::ChefAssistant;
use chefbot::dataset::{menu_eval_dataset, run_experiment, Evaluator, RuleEvaluator};
use chefbot::eval::LlmJudge;
use chefbot::planner::MenuPlanner;
use chefbot::provider::create_provider;
use chefbot::tools::ToolRegistry;
use chefbot::ChefBotConfig;

const DEFAULT_SWEEP_QUESTION: &str =
    "Give me an original recipe idea with leeks and walnuts.";

#[derive(Parser)]
#[command(author, version, about = "ChefBot culinary assistant", long_about = None)]
struct Cli {
    /// Path to chefbot.toml (environment variables override file values)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the assistant a single question
    Ask {
        question: String,

        #[arg(short, long, default_value_t = 0.7)]
        temperature: f64,
    },

    /// Ask the same question at several sampling temperatures
    Sweep {
        question: Option<String>,

        /// Temperatures to sample at
        #[arg(short, long, value_delimiter = ',', default_values_t = [0.1, 0.7, 1.2])]
        temperatures: Vec<f64>,
    },

    /// Plan a weekly menu from free-form constraints
    Plan {
        constraints: String,
    },

    /// Run the tool-calling agent over the restaurant toolset
    Agent {
        message: String,
    },

    /// Run the built-in evaluation dataset and print a JSON report
    Eval {
        /// Name recorded in the report
        #[arg(long, default_value = "menu-eval")]
        name: String,

        /// Also score outputs with the model-backed judge
        #[arg(long)]
        with_judge: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ChefBotConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let provider = create_provider(&config.llm).context("creating LLM provider")?;

    match cli.command {
        Commands::Ask {
            question,
            temperature,
        } => {
            let assistant = ChefAssistant::new(provider);
            let answer = assistant.ask(&question, temperature).await?;
            println!("{answer}");
        }

        Commands::Sweep {
            question,
            temperatures,
        } => {
            let question = question.as_deref().unwrap_or(DEFAULT_SWEEP_QUESTION);
            let assistant = ChefAssistant::new(provider);
            for (temperature, answer) in
                assistant.temperature_sweep(question, &temperatures).await?
            {
                println!("--- temperature {temperature} ---");
                println!("{answer}\n");
            }
        }

        Commands::Plan { constraints } => {
            let planner = MenuPlanner::with_config(provider, &config);
            let menu = planner.plan_weekly_menu(&constraints).await?;
            println!("{menu}");
            let metrics = planner.retry_metrics();
            tracing::info!(
                attempts = metrics.total_attempts,
                failures = metrics.failures,
                "plan phase metrics"
            );
        }

        Commands::Agent { message } => {
            let agent = ToolCallingAgent::with_config(provider, ToolRegistry::restaurant(), &config);
            let answer = agent.run(&message).await?;
            println!("{answer}");
        }

        Commands::Eval { name, with_judge } => {
            let judge = LlmJudge::new(provider.clone());
            let mut evaluators: Vec<&dyn Evaluator> = vec![&RuleEvaluator];
            if with_judge {
                evaluators.push(&judge);
            }

            let planner = MenuPlanner::with_config(provider, &config);
            let items = menu_eval_dataset();
            let report = run_experiment(
                &name,
                &items,
                |input| {
                    let planner = &planner;
                    async move { planner.plan_weekly_menu(&input).await }
                },
                &evaluators,
            )
            .await;

            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!(
                "{} of {} items completed",
                report.completed(),
                report.items.len()
            );
        }
    }

    Ok(())
}
