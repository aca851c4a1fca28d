use anyhow::{Context, Result};
use clap::Parser;
use copymark::batch::{collect_inputs, BatchRunner};
use copymark::codec::{decode_file, encode_jpeg, write_file};
use copymark::config::JobFile;
use copymark::constants::JPEG_QUALITY;
use copymark::error::CopymarkError;
use copymark::logging::{init_subscriber, LogFormat};
use copymark::watermark::{render_preview, FontResolver, WatermarkRenderer};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Copymark - batch copyright watermarking with embedded provenance metadata
#[derive(Parser, Debug)]
#[command(name = "copymark")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image file or directory of images
    #[arg(required_unless_present = "list_fonts")]
    input: Option<PathBuf>,

    /// Path to a YAML job file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watermark text (overrides the job file)
    #[arg(short, long)]
    text: Option<String>,

    /// Directory for outputs (default: next to each source)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Base name of batch outputs
    #[arg(long)]
    base_name: Option<String>,

    /// First index of batch outputs
    #[arg(long)]
    start_index: Option<u32>,

    /// Write a single output file instead of a numbered batch
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Render a preview of the first input to this file and exit
    #[arg(long)]
    preview: Option<PathBuf>,

    /// List available fonts and exit
    #[arg(long)]
    list_fonts: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_subscriber(args.log_format) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Run aborted");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_job_file(args: &Args) -> Result<JobFile> {
    let mut file = match &args.config {
        Some(path) => JobFile::from_file(path)
            .map_err(CopymarkError::Config)
            .with_context(|| format!("Failed to load job file {}", path.display()))?,
        None => JobFile::default(),
    };

    if let Some(text) = &args.text {
        file.watermark.text = text.clone();
    }
    if let Some(dir) = &args.output_dir {
        file.output.dir = Some(dir.clone());
    }
    if let Some(base_name) = &args.base_name {
        file.output.base_name = base_name.clone();
    }
    if let Some(start_index) = args.start_index {
        file.output.start_index = start_index;
    }
    if let Some(output) = &args.output {
        file.output.path = Some(output.clone());
    }

    Ok(file)
}

fn run(args: Args) -> Result<ExitCode> {
    let file = load_job_file(&args)?;
    let resolver = FontResolver::new(file.fonts.clone());

    if args.list_fonts {
        for font in resolver.available_fonts() {
            println!("{}", font);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let input = args.input.clone().unwrap_or_default();
    let job = file.to_job().map_err(CopymarkError::Config)?;

    tracing::info!(
        input = %input.display(),
        text = %job.text(),
        opacity = job.opacity_percent(),
        mosaic = job.layout().is_mosaic(),
        font = %job.font().name,
        "Job loaded"
    );

    if let Some(preview_path) = &args.preview {
        let prefix = job.output().output_prefix();
        let inputs = collect_inputs(&input, prefix.as_deref()).map_err(CopymarkError::from)?;
        let first = &inputs[0];

        let decoded = decode_file(first).with_context(|| format!("Cannot open {}", first.display()))?;
        let renderer = WatermarkRenderer::new(&job, &resolver);
        let preview = render_preview(&renderer, &decoded.image, &job).map_err(CopymarkError::from)?;
        let jpeg = encode_jpeg(&preview, JPEG_QUALITY)?;
        write_file(preview_path, &jpeg)?;

        println!("Preview written to {}", preview_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&cancel))
        .context("Failed to register Ctrl-C handler")?;

    let mut runner = BatchRunner::new(job, &resolver).with_cancel_flag(cancel);
    if let Some(dir) = &file.output.dir {
        runner = runner.with_output_dir(dir);
    }

    let report = runner.run_input(&input).map_err(CopymarkError::from)?;
    println!("{}", report.summary());

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
