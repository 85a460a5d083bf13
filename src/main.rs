//! Questionnaire Analyzer
//!
//! Crops a scanned survey sheet into its four fixed sections and asks a
//! Gemini multimodal model to read the checked answers of each section,
//! producing one JSON document for the whole sheet.

mod analysis;
mod config;
mod gemini;
mod paths;
mod survey;

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::analysis::{AnalysisResult, analyze_survey};
use crate::gemini::{GeminiClient, GeminiModel};
use crate::survey::{REGIONS, crop_region};

const LOG_FILE: &str = "questionnaire_analyzer.log";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join(LOG_FILE);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Parser)]
#[command(name = "questionnaire-analyzer", version, about = "アンケート画像解析ツール")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a survey image and write the answers as JSON
    Analyze {
        /// Survey image (PNG or JPEG)
        image: PathBuf,
        /// Gemini model id (defaults to the configured model)
        #[arg(short, long)]
        model: Option<GeminiModel>,
        /// Gemini API key (overrides config.json and GEMINI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Output JSON path (defaults to the configured output file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also write each cropped section as section_<id>.png
        /// (into DIR, or <exe_dir>/crops when no DIR is given)
        #[arg(long, value_name = "DIR", num_args = 0..=1)]
        save_crops: Option<Option<PathBuf>>,
    },
    /// Print the section bounding boxes as JSON
    Regions,
    /// List the selectable Gemini models
    Models,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join(LOG_FILE);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    let cli = Cli::parse();

    match cli.command {
        Command::Regions => {
            let table = serde_json::to_string_pretty(&survey::bounds_table())?;
            println!("{}", table);
            Ok(())
        }
        Command::Models => {
            let default = GeminiModel::default();
            for model in GeminiModel::ALL {
                let marker = if model == default { " (default)" } else { "" };
                println!("{:<22} {}{}", model.id(), model.label(), marker);
            }
            Ok(())
        }
        Command::Analyze {
            image,
            model,
            api_key,
            output,
            save_crops,
        } => {
            paths::ensure_directories()?;
            config::init_config();
            let crops_dir = save_crops.map(|dir| dir.unwrap_or_else(paths::get_crops_dir));
            run_analysis(
                &image,
                model,
                api_key.as_deref(),
                output,
                crops_dir.as_deref(),
            )
        }
    }
}

/// Runs the full pipeline for one image and writes the result file.
fn run_analysis(
    image_path: &Path,
    model: Option<GeminiModel>,
    cli_api_key: Option<&str>,
    output: Option<PathBuf>,
    crops_dir: Option<&Path>,
) -> Result<()> {
    let config = config::get_config();

    let api_key = config.resolve_api_key(cli_api_key);
    if api_key.is_empty() {
        return Err(anyhow!(
            "Gemini API key is not set. Pass --api-key, set api_key in config.json, or export {}",
            config::API_KEY_ENV
        ));
    }

    let model = model.unwrap_or(config.model);
    log(&format!("Selected model: {}", model.label()));

    let img = image::open(image_path)
        .with_context(|| format!("Failed to open image: {}", image_path.display()))?;
    log(&format!(
        "Loaded {} ({}x{})",
        image_path.display(),
        img.width(),
        img.height()
    ));

    if let Some(dir) = crops_dir {
        save_section_crops(&img, dir)?;
    }

    let client = GeminiClient::new(&config.api_base_url, config.request_timeout())
        .context("Failed to create Gemini client")?;

    let results = analyze_survey(&client, &img, &api_key, model.id())?;

    for (id, result) in results.iter() {
        match result {
            AnalysisResult::Parsed(_) => log(&format!("Section {}: OK", id)),
            AnalysisResult::Failed(e) => log(&format!("Section {}: {}", id, e.error)),
        }
    }

    let output_path = output.unwrap_or_else(|| PathBuf::from(&config.output_file));
    analysis::export::export_to_json(&results, &output_path)?;
    log(&format!("Analysis results saved: {}", output_path.display()));

    Ok(())
}

/// Writes each cropped section as `section_<id>.png`.
fn save_section_crops(img: &image::DynamicImage, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create crops directory: {}", dir.display()))?;

    for region in &REGIONS {
        let cropped = crop_region(img, &region.bounds)?;
        let path = dir.join(format!("section_{}.png", region.id));
        cropped
            .save(&path)
            .with_context(|| format!("Failed to save crop: {}", path.display()))?;
        log(&format!("Section {} crop saved: {}", region.id, path.display()));
    }

    Ok(())
}
