//! The `vista analyze` command.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use futures_util::StreamExt;
use vista_core::{
    Config, FileDiscovery, FusionEngine, FusionReport, HttpBackend, ImageLoader, OutputFormat,
    OutputWriter, SidecarClassifier, SidecarDetector,
};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file or directory to analyze
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `[output] format`)
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Number of images analyzed concurrently
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,

    /// Remote backend base URL
    #[arg(long, env = "VISTA_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Skip the remote backend (and with it the description rules)
    #[arg(long)]
    pub no_backend: bool,

    /// Skip the object detector
    #[arg(long)]
    pub no_detector: bool,

    /// Skip the local classifier
    #[arg(long)]
    pub no_classifier: bool,

    /// Deadline for every source, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Report formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    /// One JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Json => OutputFormat::Json,
            ReportFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(url) = &args.backend_url {
        config.backend.endpoint = url.clone();
    }
    if args.no_backend {
        config.backend.enabled = false;
    }
    if args.no_detector {
        config.detector.enabled = false;
    }
    if args.no_classifier {
        config.classifier.enabled = false;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.detector.timeout_ms = timeout_ms;
        config.backend.timeout_ms = timeout_ms;
        config.classifier.timeout_ms = timeout_ms;
    }
}

/// Attach a predictor for every enabled source.
fn build_engine(config: &Config) -> FusionEngine {
    let mut engine = FusionEngine::new(config);
    if config.detector.enabled {
        engine = engine.with_detector(Box::new(SidecarDetector::from_config(&config.detector)));
    }
    if config.backend.enabled {
        engine = engine.with_backend(Box::new(HttpBackend::from_config(&config.backend)));
    }
    if config.classifier.enabled {
        engine = engine.with_classifier(Box::new(SidecarClassifier::from_config(
            &config.classifier,
        )));
    }
    engine
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, mut config: Config) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            args.input
        );
    }

    apply_overrides(&mut config, &args);
    config.validate()?;

    let loader = ImageLoader::new(&config);
    let files = FileDiscovery::new(loader.validator()).discover(&args.input);
    if files.is_empty() {
        tracing::warn!("No supported image files found at {:?}", args.input);
        return Ok(());
    }
    tracing::info!("Found {} image(s) to analyze", files.len());

    let engine = build_engine(&config);
    if config.backend.enabled {
        tracing::debug!("Using backend at {}", config.backend.endpoint);
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    let mut writer = match args.format {
        Some(format) => OutputWriter::new(sink, format.into(), config.output.pretty),
        None => OutputWriter::from_config(sink, &config.output),
    };

    let progress = args
        .output
        .as_ref()
        .map(|_| create_progress_bar(files.len() as u64));

    let mut summary = Summary::default();
    let start = Instant::now();
    let engine = &engine;
    let loader = &loader;

    // `buffered` keeps output in discovery order while analyzing ahead.
    let mut reports = futures_util::stream::iter(files)
        .map(|file| async move {
            let outcome = match loader.load(&file.path).await {
                Ok(image) => Ok(engine.analyze(&image).await),
                Err(e) => Err(e),
            };
            (file, outcome)
        })
        .buffered(args.parallel.max(1));

    while let Some((file, outcome)) = reports.next().await {
        match outcome {
            Ok(report) => {
                summary.record(&report);
                writer.write(&report)?;
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, e);
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                pb.set_message(format!("{:.1} img/sec", summary.processed() as f64 / elapsed));
            }
        }
    }

    writer.finish()?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }

    summary.print(start.elapsed());
    Ok(())
}

/// Running tallies for the closing summary.
#[derive(Debug, Default)]
struct Summary {
    succeeded: u64,
    failed: u64,
    degraded: u64,
    unlabeled: u64,
    labels: u64,
}

impl Summary {
    fn record(&mut self, report: &FusionReport) {
        self.succeeded += 1;
        self.labels += report.labels.len() as u64;
        if report.labels.is_empty() {
            self.unlabeled += 1;
        }
        if report.sources.iter().any(|s| s.is_failed()) {
            self.degraded += 1;
        }
    }

    fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }

    fn print(&self, elapsed: Duration) {
        let rate = if elapsed.as_secs_f64() > 0.0 {
            self.succeeded as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        eprintln!();
        eprintln!("  ====================================");
        eprintln!("               Summary");
        eprintln!("  ====================================");
        eprintln!("    Analyzed:     {:>8}", self.succeeded);
        if self.failed > 0 {
            eprintln!("    Failed:       {:>8}", self.failed);
        }
        if self.degraded > 0 {
            eprintln!("    Degraded:     {:>8}", self.degraded);
        }
        if self.unlabeled > 0 {
            eprintln!("    No labels:    {:>8}", self.unlabeled);
        }
        eprintln!("  ------------------------------------");
        eprintln!("    Labels:       {:>8}", self.labels);
        eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
        eprintln!("    Rate:         {:>7.1} img/sec", rate);
        eprintln!("  ====================================");
    }
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::types::SourceState;
    use vista_core::Source;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn args(input: PathBuf, output: Option<PathBuf>) -> AnalyzeArgs {
        AnalyzeArgs {
            input,
            output,
            format: Some(ReportFormat::Jsonl),
            parallel: 2,
            backend_url: None,
            no_backend: true,
            no_detector: false,
            no_classifier: false,
            timeout_ms: None,
        }
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        let mut a = args(PathBuf::from("x"), None);
        a.backend_url = Some("http://10.0.0.2:5000".to_string());
        a.no_classifier = true;
        a.timeout_ms = Some(1500);
        apply_overrides(&mut config, &a);

        assert_eq!(config.backend.endpoint, "http://10.0.0.2:5000");
        assert!(!config.backend.enabled);
        assert!(config.detector.enabled);
        assert!(!config.classifier.enabled);
        assert_eq!(config.backend.timeout_ms, 1500);
        assert_eq!(config.detector.timeout_ms, 1500);
    }

    #[test]
    fn test_summary_tallies() {
        let mut summary = Summary::default();
        summary.record(&FusionReport {
            file_path: "a.png".into(),
            file_name: "a.png".to_string(),
            content_hash: String::new(),
            file_size: 8,
            description: None,
            labels: Default::default(),
            sources: vec![vista_core::SourceStatus::failed(Source::RemoteBackend, "down")],
            elapsed_ms: 1,
        });
        summary.failed += 1;
        assert_eq!(summary.processed(), 2);
        assert_eq!(summary.unlabeled, 1);
        assert_eq!(summary.degraded, 1);
    }

    #[tokio::test]
    async fn test_analyze_directory_with_sidecars() {
        let dir = tempfile::tempdir().unwrap();
        let photos = dir.path().join("photos");
        std::fs::create_dir(&photos).unwrap();

        std::fs::write(photos.join("a.png"), PNG_HEADER).unwrap();
        std::fs::write(
            photos.join("a.png.detections.json"),
            r#"[{"class":"dog","score":0.9}]"#,
        )
        .unwrap();
        std::fs::write(
            photos.join("a.png.classifications.json"),
            r#"[{"className":"dog","probability":0.5},{"className":"leash","probability":0.4}]"#,
        )
        .unwrap();
        // No sidecars: both local sources fail for this one
        std::fs::write(photos.join("b.png"), PNG_HEADER).unwrap();
        std::fs::write(photos.join("notes.txt"), "not an image").unwrap();

        let output = dir.path().join("out.jsonl");
        execute(args(photos, Some(output.clone())), Config::default())
            .await
            .unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let reports: Vec<FusionReport> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(reports.len(), 2);

        assert_eq!(reports[0].file_name, "a.png");
        assert_eq!(reports[0].labels.labels(), vec!["dog", "leash"]);
        assert_eq!(reports[0].sources[1].state, SourceState::Disabled);

        assert_eq!(reports[1].file_name, "b.png");
        assert!(reports[1].labels.is_empty());
        assert!(reports[1].sources[0].is_failed());
        assert!(reports[1].sources[2].is_failed());
    }

    #[tokio::test]
    async fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(args(dir.path().join("nope"), None), Config::default()).await;
        assert!(result.is_err());
    }
}
