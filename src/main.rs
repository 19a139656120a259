use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ats_resume::ats::calculate_score;
use ats_resume::chat::{
    ChatTurn, HttpCompletionClient, ProcessOutcome, ResumeAgent, ResumeInput, ResumeRequest,
};
use ats_resume::chat::extractor::ResumeExtractor;
use ats_resume::ingest::extract_text;
use ats_resume::models::{ResumeDocument, ScoreResult};
use ats_resume::render::{OutputFormats, RenderedFiles, Renderer, TemplateStyle};
use ats_resume::utils::cli::{Args, Command, OutputArgs, ProcessArgs, RenderArgs};
use ats_resume::utils::config::{API_KEY_ENV, Config, config};
use ats_resume::utils::log::Logger;
use clap::Parser;
use colored::Colorize;
use eyre::{Result, eyre};
use log::{debug, info};
use rayon::prelude::*;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    Logger::init(args.verbosity);

    info!(
        "starting ats-resume {}",
        format!("v{}", env!("CARGO_PKG_VERSION")).magenta()
    );

    let config: Config = config(args.config)?;

    match args.command {
        Command::Process(process_args) => process(&config, process_args).await,
        Command::Score {
            files,
            job_file,
            json,
        } => score(&files, job_file.as_deref(), json),
        Command::Extract { file } => extract(&config, &file).await,
        Command::Render(render_args) => render(&config, render_args).await,
        Command::Chat { message } => chat(&config, message).await,
    }
}

fn completion_client(config: &Config) -> Result<HttpCompletionClient> {
    let api_key = config.llm.api_key().ok_or_else(|| {
        eyre!(
            "LLM API key not configured in config.toml or {}",
            API_KEY_ENV
        )
    })?;

    let client = HttpCompletionClient::new(
        config.llm.provider,
        api_key,
        config.llm.model().to_string(),
        config.llm.endpoint().to_string(),
        config.llm.timeout(),
    )?
    .with_max_retries(config.llm.max_retries);

    Ok(client)
}

/// Output settings after command-line overrides are applied to the config.
struct OutputPlan {
    directory: PathBuf,
    base_name: String,
    style: TemplateStyle,
    formats: OutputFormats,
}

impl OutputPlan {
    fn resolve(config: &Config, args: OutputArgs) -> Result<Self> {
        let plan = Self {
            directory: args.output.unwrap_or_else(|| config.output.directory.clone()),
            base_name: args.name.unwrap_or_else(|| config.output.base_name.clone()),
            style: TemplateStyle::resolve(args.style.as_deref().unwrap_or(&config.output.style)),
            formats: args.format.unwrap_or(config.output.formats),
        };

        std::fs::create_dir_all(&plan.directory)?;
        Ok(plan)
    }
}

fn read_job_description(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            info!("job description loaded from {}", path.display());
            Ok(text)
        }
        None => {
            info!("no job description provided, scoring against general criteria");
            Ok(String::new())
        }
    }
}

fn read_form(path: &Path) -> Result<ResumeDocument> {
    let raw = std::fs::read_to_string(path)?;
    let doc = ResumeDocument::from_form_json(&raw)?;
    if doc.is_empty() {
        return Err(eyre!("{} holds no resume data", path.display()));
    }

    Ok(doc)
}

async fn process(config: &Config, args: ProcessArgs) -> Result<()> {
    let job_description = read_job_description(args.job_file.as_deref())?;
    let input = match (args.file, args.form) {
        (Some(file), _) => ResumeInput::File(file),
        (None, Some(form)) => ResumeInput::Form(read_form(&form)?),
        (None, None) => return Err(eyre!("either --file or --form is required")),
    };
    let plan = OutputPlan::resolve(config, args.output)?;

    let agent = ResumeAgent::new(
        completion_client(config)?,
        Renderer::new(&plan.directory),
        plan.formats,
        config.workspace.scratch_dir(),
    );

    let request = ResumeRequest::new(input)
        .with_job_description(job_description)
        .with_style(plan.style)
        .with_base_name(plan.base_name);

    let outcome = agent.process_resume(request).await?;
    print_outcome(&outcome);

    Ok(())
}

fn score(files: &[PathBuf], job_file: Option<&Path>, as_json: bool) -> Result<()> {
    let job_description = read_job_description(job_file)?;

    info!("scoring {} file(s)", files.len());
    let results: Vec<(&PathBuf, ats_resume::Result<ScoreResult>)> = files
        .par_iter()
        .map(|path| {
            let result = extract_text(path).map(|text| calculate_score(&text, &job_description));
            (path, result)
        })
        .collect();

    if as_json {
        let report: Vec<_> = results
            .iter()
            .map(|(path, result)| match result {
                Ok(score) => json!({"file": path, "result": score}),
                Err(e) => json!({"file": path, "error": e.to_string()}),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (path, result) in &results {
        println!("\n{}", path.display().to_string().bold());
        match result {
            Ok(score) => print_score("ATS score", score),
            Err(e) => println!("  {}", e.to_string().red()),
        }
    }

    Ok(())
}

async fn extract(config: &Config, file: &Path) -> Result<()> {
    let text = extract_text(file)?;
    debug!("extracted text:\n{}", text);

    let client = completion_client(config)?;
    let doc = ResumeExtractor::new(text).run(&client).await?;

    println!("{}", doc.to_json_pretty());
    Ok(())
}

async fn render(config: &Config, args: RenderArgs) -> Result<()> {
    let doc = read_form(&args.data)?;
    let plan = OutputPlan::resolve(config, args.output)?;

    let files = Renderer::new(&plan.directory)
        .render(&doc, plan.style, &plan.base_name, plan.formats)
        .await?;

    print_files(&files);
    Ok(())
}

async fn chat(config: &Config, message: Option<String>) -> Result<()> {
    let agent = ResumeAgent::new(
        completion_client(config)?,
        Renderer::new(&config.output.directory),
        config.output.formats,
        config.workspace.scratch_dir(),
    );

    if let Some(message) = message {
        println!("{}", agent.chat(&message, &[]).await?);
        return Ok(());
    }

    println!("{}", "=== Resume Assistant ===".cyan().bold());
    println!("{}\n", "Type 'exit' or 'quit' to leave.".cyan());

    let mut history: Vec<ChatTurn> = Vec::new();
    loop {
        print!("{} ", "you>".green().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match agent.chat(input, &history).await {
            Ok(reply) => {
                println!("{} {}\n", "assistant>".magenta().bold(), reply);
                history.push(ChatTurn::user(input));
                history.push(ChatTurn::assistant(reply));
            }
            Err(e) => println!("{}", format!("Error: {}", e).red()),
        }
    }

    Ok(())
}

fn print_outcome(outcome: &ProcessOutcome) {
    println!("\n{}", "=== Original resume ===".cyan().bold());
    print_score("Initial ATS score", &outcome.initial_score);

    println!("\n{}", "=== Enhanced resume ===".cyan().bold());
    println!("{}\n", outcome.enhanced_text);
    print_score("Final ATS score", &outcome.final_score);

    let delta = outcome.final_score.improvement_over(&outcome.initial_score);
    let delta = format!("{:+} points", delta);
    println!(
        "\nImprovement: {}",
        if delta.starts_with('-') {
            delta.red()
        } else {
            delta.green()
        }
    );

    print_files(&outcome.outputs);
}

fn print_score(label: &str, result: &ScoreResult) {
    let total = format!("{}/{}", result.score, result.max_score);
    let total = match result.score {
        80.. => total.green(),
        50.. => total.yellow(),
        _ => total.red(),
    };
    println!("  {}: {}", label.bold(), total);

    for (name, points, cap) in result.breakdown.entries() {
        println!("    {:<14} {:>2}/{}", name, points, cap);
    }
    for item in &result.feedback {
        println!("    {} {}", "•".yellow(), item);
    }
}

fn print_files(files: &RenderedFiles) {
    for path in files.paths() {
        println!("{} {}", "generated".green().bold(), path.display());
    }
}
