use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use printmatch::{
    EnrolledReference, ImageSource, MatchConfig, MatchOutcome, MatchStatus, Matcher,
    ReferenceRegistry,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PrintMatch CLI (file-store backed)")]
struct Cli {
    /// Path to an optional JSON configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enroll one or more reference images into the store.
    Enroll {
        /// Directory holding the enrolled reference images.
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,
        /// Encoded image files to enroll.
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,
    },
    /// Identify a query image against the store and print the decision.
    Verify {
        /// Directory holding the enrolled reference images.
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,
        /// Encoded query image.
        #[arg(value_name = "QUERY")]
        query: PathBuf,
    },
    /// List the enrolled references.
    List {
        /// Directory holding the enrolled reference images.
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,
    },
    /// Score two images against each other without touching a store.
    Compare {
        #[arg(value_name = "A")]
        a: PathBuf,
        #[arg(value_name = "B")]
        b: PathBuf,
    },
    /// Remove every enrolled reference from the store.
    Clear {
        /// Directory holding the enrolled reference images.
        #[arg(short, long, value_name = "DIR")]
        store: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigJson {
    threshold: f64,
    canonical_width: u32,
    canonical_height: u32,
    parallel: bool,
}

impl Default for ConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            threshold: cfg.threshold,
            canonical_width: cfg.canonical_width,
            canonical_height: cfg.canonical_height,
            parallel: cfg.parallel,
        }
    }
}

impl From<ConfigJson> for MatchConfig {
    fn from(value: ConfigJson) -> Self {
        Self {
            threshold: value.threshold,
            canonical_width: value.canonical_width,
            canonical_height: value.canonical_height,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum StatusRecord {
    NoReferences,
    NoMatch,
    Matched,
}

impl From<MatchStatus> for StatusRecord {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::NoReferences => StatusRecord::NoReferences,
            MatchStatus::NoMatch => StatusRecord::NoMatch,
            MatchStatus::Matched => StatusRecord::Matched,
        }
    }
}

#[derive(Debug, Serialize)]
struct SkippedRecord {
    id: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct VerifyOutput {
    authenticated: bool,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_id: Option<String>,
    status: StatusRecord,
    message: String,
    skipped: Vec<SkippedRecord>,
}

impl VerifyOutput {
    fn from_outcome(outcome: MatchOutcome, threshold: f64) -> Self {
        let score = round2(outcome.score);
        let message = match (outcome.status, outcome.authenticated) {
            (MatchStatus::NoReferences, _) => {
                "No enrolled fingerprints found. Please enroll first.".to_string()
            }
            (_, true) => format!("Authentication successful! Similarity: {score:.2}%"),
            (_, false) => {
                format!("Authentication failed. Similarity: {score:.2}% (threshold: {threshold}%)")
            }
        };
        let skipped = outcome
            .skipped
            .into_iter()
            .map(|entry| SkippedRecord {
                id: entry.id,
                error: entry.error.to_string(),
            })
            .collect();
        Self {
            authenticated: outcome.authenticated,
            score,
            matched_id: outcome.matched_id,
            status: outcome.status.into(),
            message,
            skipped,
        }
    }
}

#[derive(Debug, Serialize)]
struct EnrollRecord {
    id: String,
    enrolled_at: String,
}

#[derive(Debug, Serialize)]
struct EnrollOutput {
    enrolled: Vec<EnrollRecord>,
}

#[derive(Debug, Serialize)]
struct ReferenceRecord {
    id: String,
    enrolled_at: String,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    count: usize,
    references: Vec<ReferenceRecord>,
}

#[derive(Debug, Serialize)]
struct CompareOutput {
    score: f64,
}

#[derive(Debug, Serialize)]
struct ClearOutput {
    cleared: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("printmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config = load_config(cli.config.as_deref())?;
    let matcher = Matcher::with_config(config)?;

    let command = match cli.command {
        Some(command) => command,
        None => return Err("a command is required (see --help)".into()),
    };

    match command {
        Command::Enroll { store, images } => enroll(&matcher, &store, &images),
        Command::Verify { store, query } => verify(&matcher, &store, &query),
        Command::List { store } => list(&store),
        Command::Compare { a, b } => compare(&matcher, &a, &b),
        Command::Clear { store } => clear(&store),
    }
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig, Box<dyn std::error::Error>> {
    let json = match path {
        Some(path) => serde_json::from_str::<ConfigJson>(&fs::read_to_string(path)?)?,
        None => ConfigJson::default(),
    };
    Ok(MatchConfig::from(json))
}

/// Reads the store directory into enrollment entries, ordered by id.
///
/// A missing directory is an empty store. Ids are the stored file stems;
/// the generated `<unix-millis>-<stem>` scheme makes the lexicographic
/// order chronological.
fn load_store(dir: &Path) -> Result<Vec<EnrolledReference>, Box<dyn std::error::Error>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut entries = Vec::new();
    for path in paths {
        let id = match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(stem) => stem.to_string(),
            None => continue,
        };
        let enrolled_at = fs::metadata(&path)?.modified()?;
        entries.push(EnrolledReference::new(
            id,
            ImageSource::from_path(&path),
            enrolled_at,
        ));
    }
    Ok(entries)
}

fn enroll(
    matcher: &Matcher,
    store: &Path,
    images: &[PathBuf],
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(store)?;
    let mut enrolled = Vec::new();
    for image in images {
        // Reject images that would fail at verification time.
        matcher.normalize(&ImageSource::from_path(image))?;

        let stem = image
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or("image file name must be valid UTF-8")?;
        let now = SystemTime::now();
        let id = format!("{}-{stem}", unix_millis(now));
        let extension = image
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("png");
        let target = store.join(format!("{id}.{extension}"));
        if target.exists() {
            return Err(format!("reference id {id} already exists in the store").into());
        }
        fs::copy(image, &target)?;
        tracing::info!(%id, "enrolled reference");
        enrolled.push(EnrollRecord {
            id,
            enrolled_at: rfc3339(now),
        });
    }
    print_json(&EnrollOutput { enrolled })
}

fn verify(
    matcher: &Matcher,
    store: &Path,
    query: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ReferenceRegistry::from_entries(load_store(store)?)?;
    let references = registry.snapshot();
    let outcome = matcher.identify(&ImageSource::from_path(query), &references)?;
    print_json(&VerifyOutput::from_outcome(outcome, matcher.config().threshold))
}

fn list(store: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let registry = ReferenceRegistry::from_entries(load_store(store)?)?;
    let references: Vec<ReferenceRecord> = registry
        .entries()
        .iter()
        .map(|entry| ReferenceRecord {
            id: entry.id().to_string(),
            enrolled_at: rfc3339(entry.enrolled_at()),
        })
        .collect();
    print_json(&ListOutput {
        count: references.len(),
        references,
    })
}

fn compare(matcher: &Matcher, a: &Path, b: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let score = matcher.compare(&ImageSource::from_path(a), &ImageSource::from_path(b))?;
    print_json(&CompareOutput {
        score: round2(score),
    })
}

fn clear(store: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut cleared = 0usize;
    if store.exists() {
        for entry in fs::read_dir(store)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                cleared += 1;
            }
        }
    }
    print_json(&ClearOutput { cleared })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn round2(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn unix_millis(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0)
}

fn rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
