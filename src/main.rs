use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use plagscan::config::{DEFAULT_MIN_PARTITION_LEN, DEFAULT_MIN_WORDS, DEFAULT_WORKER_COUNT};
use plagscan::{tokenize, util, DetectConfig, DetectionReport, Detector, WordSequence};

#[derive(Parser)]
#[command(name = "plagscan", about = "Detect copied word sequences between documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare one document against one reference document
    Compare {
        /// Document checked for copied fragments
        #[arg(long, short)]
        source: PathBuf,
        /// Document the fragments may have been copied from
        #[arg(long, short)]
        reference: PathBuf,
        #[command(flatten)]
        detect: DetectArgs,
    },
    /// Compare one document against every document in a directory tree
    Corpus {
        /// Document checked for copied fragments
        #[arg(long, short)]
        source: PathBuf,
        /// Directory of reference documents
        #[arg(long, short)]
        corpus: PathBuf,
        /// Only use reference files with this extension
        #[arg(long, default_value = "txt")]
        extension: String,
        /// Use every file regardless of extension
        #[arg(long)]
        all_files: bool,
        #[command(flatten)]
        detect: DetectArgs,
    },
}

#[derive(Args)]
struct DetectArgs {
    /// Minimum number of consecutive words reported as a fragment
    #[arg(long, env = "PLAGSCAN_MIN_WORDS", default_value_t = DEFAULT_MIN_WORDS)]
    min_words: usize,
    /// Number of parallel scan workers
    #[arg(long, env = "PLAGSCAN_WORKERS", default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,
    /// Smallest number of start offsets handed to one worker
    #[arg(long, default_value_t = DEFAULT_MIN_PARTITION_LEN)]
    min_partition: usize,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl DetectArgs {
    fn detector(&self) -> Result<Detector> {
        let config = DetectConfig::new(self.min_words, self.workers)
            .and_then(|c| c.with_min_partition_len(self.min_partition))
            .context("Invalid detection settings")?;
        Ok(Detector::new(config))
    }
}

#[derive(Serialize)]
struct CorpusEntry {
    reference: PathBuf,
    report: DetectionReport,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn load_words(path: &Path) -> Result<WordSequence> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<WordSequence> {
        let text = util::read_document(&path)?;
        Ok(tokenize(&text))
    })
    .await?
}

fn print_report(report: &DetectionReport, elapsed_secs: f64) {
    println!("\n--------------------  PLAGIARIZED FRAGMENTS:  --------------------\n");
    for m in &report.matches {
        println!("~ {}", m.text);
    }

    println!("\n--------------------  STATISTICS:  --------------------\n");
    for (length, count) in &report.histogram {
        println!("\t{length}-words sentences detected: {count} times");
    }
    println!("\n\tTotal words: {}", report.total_words);
    println!("\tPlagiarized words: {}", report.plagiarized_words);
    println!("\tPlagiarism score: {:.2}%\n", report.percentage);
    println!("\tExecution time: {elapsed_secs:.3}s");
}

async fn compare(source: &Path, reference: &Path, args: &DetectArgs) -> Result<()> {
    let detector = args.detector()?;

    let start = Instant::now();
    let (source_words, reference_words) =
        tokio::try_join!(load_words(source), load_words(reference))?;

    let report = tokio::task::spawn_blocking(move || {
        detector.detect(&source_words, &reference_words)
    })
    .await??;
    let elapsed = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Source:    {}", source.display());
        println!("Reference: {}", reference.display());
        print_report(&report, elapsed.as_secs_f64());
    }
    Ok(())
}

async fn load_corpus(root: &Path, extension: Option<&str>) -> Result<Vec<PathBuf>> {
    let root = root.to_path_buf();
    let extension = extension.map(str::to_owned);
    tokio::task::spawn_blocking(move || util::collect_documents(&root, extension.as_deref()))
        .await?
}

async fn corpus(
    source: &Path,
    root: &Path,
    extension: Option<&str>,
    args: &DetectArgs,
) -> Result<()> {
    let detector = args.detector()?;

    let (source_words, references) =
        tokio::try_join!(load_words(source), load_corpus(root, extension))?;
    let source_words = Arc::new(source_words);

    if references.is_empty() {
        bail!("No reference documents found in {}", root.display());
    }
    info!(count = references.len(), "comparing against corpus");

    let start = Instant::now();
    let mut entries: Vec<CorpusEntry> = Vec::with_capacity(references.len());
    for reference in references {
        // The source itself may live inside the corpus directory.
        if same_file(source, &reference) {
            warn!(path = %reference.display(), "skipping source document found in corpus");
            continue;
        }
        let reference_words = load_words(&reference).await?;
        let detector = detector.clone();
        let source_words = Arc::clone(&source_words);
        let report = tokio::task::spawn_blocking(move || {
            detector.detect(&source_words, &reference_words)
        })
        .await?
        .with_context(|| format!("Detection failed against {}", reference.display()))?;
        entries.push(CorpusEntry { reference, report });
    }
    let elapsed = start.elapsed();

    entries.sort_by(|a, b| {
        b.report
            .percentage
            .total_cmp(&a.report.percentage)
            .then_with(|| a.reference.cmp(&b.reference))
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Source: {}", source.display());
    println!("\n  {:>8}  {:>10}  {:>9}  Reference", "Score", "Words", "Fragments");
    for entry in &entries {
        println!(
            "  {:>7.2}%  {:>10}  {:>9}  {}",
            entry.report.percentage,
            entry.report.plagiarized_words,
            entry.report.matches.len(),
            entry.reference.display()
        );
    }
    println!("\n  Documents compared: {}", entries.len());
    println!("  Time elapsed: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            source,
            reference,
            detect,
        } => {
            init_logging(&detect.log_level);
            compare(&source, &reference, &detect).await?;
        }
        Commands::Corpus {
            source,
            corpus: root,
            extension,
            all_files,
            detect,
        } => {
            init_logging(&detect.log_level);
            let extension = (!all_files).then_some(extension.as_str());
            corpus(&source, &root, extension, &detect).await?;
        }
    }

    Ok(())
}
