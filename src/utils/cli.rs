use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;

use crate::render::OutputFormats;

#[derive(Parser, Debug)]
#[command(name = "ats-resume")]
#[command(about = "Score, enhance and re-render resumes for applicant tracking systems", long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info, global = true)]
    pub verbosity: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract, score, enhance, rescore and render a resume
    Process(ProcessArgs),

    /// Score one or more resumes without changing them
    Score {
        /// PDF or DOCX files to score
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Path to file containing the target job description
        #[arg(long, value_name = "FILE")]
        job_file: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract structured resume data from a PDF or DOCX as JSON
    Extract {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Render documents straight from structured resume data
    Render(RenderArgs),

    /// Ask the resume assistant; starts an interactive session without a message
    Chat {
        message: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
pub struct ProcessArgs {
    /// Resume to process (PDF or DOCX)
    #[arg(long, value_name = "FILE", required_unless_present = "form", conflicts_with = "form")]
    pub file: Option<PathBuf>,

    /// Manually entered resume data as a JSON file
    #[arg(long, value_name = "JSON")]
    pub form: Option<PathBuf>,

    /// Path to file containing the target job description
    #[arg(long, value_name = "FILE")]
    pub job_file: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Resume data as a JSON file
    #[arg(long, value_name = "JSON")]
    pub data: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Default)]
pub struct OutputArgs {
    /// Template: professional, modern or academic
    #[arg(short, long, value_name = "STYLE")]
    pub style: Option<String>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Base name of the generated files
    #[arg(short, long, value_name = "BASE")]
    pub name: Option<String>,

    /// Which documents to generate
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormats>,
}
