use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand, ValueEnum};
use recipe_stream::client::{ChatClient, collect_stream};
use recipe_stream::config::ClientConfig;
use recipe_stream::error::StreamError;
use recipe_stream::models::{
    Gender, Goal, MealPlanItem, MealPlanRequest, Period, Recipe, group_by_day, meal_type_label,
};
use recipe_stream::streaming::{FinalResult, ParserOptions, StreamingResultParser};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recipe-stream", version, about = "Stream AI recipe and meal-plan results")]
struct Cli {
    /// TOML configuration file (environment variables still override it)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print records as JSON instead of a summary
    #[arg(long, global = true)]
    json: bool,

    /// Report partial results on stderr while the stream is running
    #[arg(long, global = true)]
    progress: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommend recipes for the given ingredients
    Recipes {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Generate a meal plan
    MealPlan {
        #[arg(long, default_value = "week")]
        period: Period,
        #[arg(long, default_value = "normal")]
        goal: Goal,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<Gender>,
        /// Basal metabolic rate in kcal
        #[arg(long)]
        bmr: Option<u32>,
    },
    /// Parse a captured stream from a file (or `-` for stdin)
    Replay {
        #[arg(default_value = "-")]
        file: PathBuf,
        /// Bytes per simulated network chunk
        #[arg(long, default_value_t = 64)]
        chunk_size: usize,
        #[arg(long, value_enum, default_value_t = ResultKind::Recipes)]
        kind: ResultKind,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ResultKind {
    Recipes,
    MealPlan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ClientConfig::from_file(&path.to_string_lossy())?,
        None => ClientConfig::from_env()?,
    };

    let progress = cli.progress;
    let on_update = move |records: &[Value]| {
        if progress {
            eprintln!("... {} record(s) so far", records.len());
        }
    };

    let (kind, result) = match cli.command {
        Command::Recipes { query } => {
            let client = ChatClient::new(config)?;
            let result = client
                .recommend_recipes(&query.join(" "), on_update)
                .await?;
            (ResultKind::Recipes, result)
        }
        Command::MealPlan {
            period,
            goal,
            age,
            gender,
            bmr,
        } => {
            let client = ChatClient::new(config)?;
            let plan = MealPlanRequest {
                period,
                goal,
                age,
                gender,
                basic_metabolism: bmr,
            };
            let result = client.create_meal_plan(&plan, on_update).await?;
            (ResultKind::MealPlan, result)
        }
        Command::Replay {
            file,
            chunk_size,
            kind,
        } => {
            let data = read_input(&file)?;
            let options = ParserOptions {
                recover_from_transcript: kind == ResultKind::MealPlan,
                ..config.parser.clone()
            };
            let mut parser = StreamingResultParser::with_options(options);
            if kind == ResultKind::MealPlan {
                parser = parser.with_filter(MealPlanItem::is_meal_plan);
            }
            let chunks: Vec<_> = data
                .chunks(chunk_size.max(1))
                .map(|chunk| Ok::<_, StreamError>(Bytes::copy_from_slice(chunk)))
                .collect();
            let result = collect_stream(
                futures::stream::iter(chunks),
                parser,
                on_update,
            )
            .await?;
            (kind, result)
        }
    };

    render(kind, result, cli.json)
}

fn read_input(file: &Path) -> anyhow::Result<Vec<u8>> {
    if file.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin()
            .read_to_end(&mut data)
            .context("Failed to read stream from stdin")?;
        Ok(data)
    } else {
        std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))
    }
}

fn render(kind: ResultKind, result: FinalResult, json: bool) -> anyhow::Result<()> {
    match result {
        FinalResult::Records(records) if json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        FinalResult::Records(records) => match kind {
            ResultKind::Recipes => render_recipes(&records),
            ResultKind::MealPlan => render_meal_plan(&records)?,
        },
        FinalResult::RawText(text) => {
            eprintln!("결과를 해석하는 데 실패했습니다. 아래 원본 텍스트를 확인해주세요.");
            println!("{}", text.trim());
        }
        FinalResult::Empty => match kind {
            ResultKind::Recipes => println!("추천 결과가 없습니다."),
            ResultKind::MealPlan => println!("식단 결과를 전달받지 못했습니다."),
        },
    }

    Ok(())
}

fn render_recipes(records: &[Value]) {
    let recipes = Recipe::collect(records);
    if recipes.is_empty() {
        println!("추천 결과가 없습니다.");
        return;
    }

    for (i, recipe) in recipes.iter().enumerate() {
        println!("{:>2}. {}", i + 1, recipe.summary());
    }
}

fn render_meal_plan(records: &[Value]) -> anyhow::Result<()> {
    let items = MealPlanItem::collect(records);
    if items.is_empty() {
        eprintln!("식단 형식이 아닌 결과입니다.");
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    for day in group_by_day(&items) {
        println!("Day {}", day.day);
        for meal in &day.meals {
            println!("  {}: {}", meal_type_label(&meal.meal_type), meal.item);
        }
    }

    Ok(())
}
