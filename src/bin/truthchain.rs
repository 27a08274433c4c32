#![forbid(unsafe_code)]
//! TruthChain command line: publish, attest, audit and query provenance entries.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use truthchain::classifier::{self, classify_with_fallback, ClassificationResult};
use truthchain::clock::SystemClock;
use truthchain::config::{load_config_from, Config, DEFAULT_CONFIG_PATH};
use truthchain::dashboard;
use truthchain::error::LedgerError;
use truthchain::ledger::Ledger;
use truthchain::participants::{ContentCreator, EndUser, FactChecker, Publisher};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Ledger export file (overrides ledger.path from the configuration)
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates a fresh ledger holding only the genesis entry
    Init {
        /// Overwrite an existing ledger file
        #[arg(long)]
        force: bool,
    },
    /// Classifies content and appends it to the ledger
    Publish {
        /// The content to record
        content: String,
        /// Who is making the claim
        #[arg(long)]
        author: String,
        /// Skip classification and use this label
        #[arg(long)]
        content_type: Option<String>,
        /// Skip classification and use this AI-likelihood score
        #[arg(long)]
        score: Option<f64>,
    },
    /// Attests an entry
    Attest {
        index: u64,
        /// Name of the attesting party
        #[arg(long = "by")]
        by: String,
    },
    /// Shows one entry, or the whole chain
    Show {
        index: Option<u64>,
        /// Render the chain as a table
        #[arg(long)]
        table: bool,
    },
    /// Checks chain integrity
    Validate {
        /// Report every violation instead of stopping at the first
        #[arg(long)]
        all: bool,
    },
    /// Prints the provenance record of an entry
    Query {
        index: u64,
        /// Emit the record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Runs the configured classifier on a piece of text
    Classify { text: String },
    /// Runs the scripted walkthrough on an in-memory ledger
    Demo,
    /// Mutates a stored entry out of band (demonstration only)
    #[cfg(feature = "tamper")]
    Tamper {
        index: u64,
        /// Replace content without updating its fingerprint
        #[arg(long)]
        content: Option<String>,
        /// Replace content and rewrite its fingerprint to match
        #[arg(long)]
        rewrite: Option<String>,
        /// Zero out the content fingerprint
        #[arg(long)]
        forge_fingerprint: bool,
        /// Overwrite the previous fingerprint (hex)
        #[arg(long)]
        previous: Option<String>,
        /// Recompute the entry fingerprint afterwards
        #[arg(long)]
        reseal: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config_from(&cli.config)?;
    truthchain::logging::init(&config.logging.level);

    let ledger_path = cli
        .ledger
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.ledger.path));

    match cli.command {
        Commands::Init { force } => init(&config, &ledger_path, force)?,
        Commands::Publish { content, author, content_type, score } => {
            publish(&config, &ledger_path, &author, &content, content_type, score).await?
        }
        Commands::Attest { index, by } => attest(&ledger_path, index, &by)?,
        Commands::Show { index, table } => show(&ledger_path, index, table)?,
        Commands::Validate { all } => validate(&ledger_path, all)?,
        Commands::Query { index, json } => {
            let ledger = open_ledger(&ledger_path)?;
            let record = EndUser::new("cli").query_provenance(&ledger, index)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", dashboard::render_provenance(&record));
            }
        }
        Commands::Classify { text } => {
            let result = classify(&config, &text).await?;
            println!("{}", "🤖 Classification".bright_magenta().bold());
            println!("{}", dashboard::render_classification(&result));
        }
        Commands::Demo => demo(&config).await?,
        #[cfg(feature = "tamper")]
        Commands::Tamper { index, content, rewrite, forge_fingerprint, previous, reseal } => {
            tamper(&ledger_path, index, content, rewrite, forge_fingerprint, previous, reseal)?
        }
    }

    Ok(())
}

fn open_ledger(path: &Path) -> Result<Ledger, Box<dyn std::error::Error>> {
    if !path.exists() {
        eprintln!("{}", format!("❌ No ledger at {}", path.display()).red());
        eprintln!("{}", "💡 Run 'truthchain init' to create one".yellow());
        return Err(format!("ledger file {} not found", path.display()).into());
    }
    Ok(Ledger::read_json(path)?)
}

fn init(config: &Config, path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    let ledger = Ledger::with_genesis(config.ledger.genesis_spec(), Arc::new(SystemClock))?;
    ledger.write_json(path)?;
    println!("{}", format!("⛓️  Ledger initialized at {}", path.display()).bright_green());
    println!("{}", dashboard::render_entry(&ledger.latest()));
    Ok(())
}

async fn classify(config: &Config, text: &str) -> Result<ClassificationResult, LedgerError> {
    let classifier = classifier::from_config(&config.classifier)?;
    let timeout = Duration::from_secs(config.classifier.timeout_secs);
    Ok(classify_with_fallback(classifier.as_ref(), text, timeout).await)
}

async fn publish(
    config: &Config,
    path: &Path,
    author: &str,
    content: &str,
    content_type: Option<String>,
    score: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(path)?;
    ledger.validate().into_result()?;
    if let Some(score) = score {
        // Checked here because ClassificationResult clamps.
        if !(0.0..=1.0).contains(&score) {
            return Err(LedgerError::InvalidInput(format!("score {} outside [0, 1]", score)).into());
        }
    }

    let mut classification = match score {
        Some(score) => ClassificationResult::from_score(score, config.classifier.ai_threshold),
        None => classify(config, content).await?,
    };
    if let Some(label) = content_type {
        classification.label = label;
    }

    let entry = ContentCreator::new(author).publish_classified(&ledger, content, &classification)?;
    ledger.write_json(path)?;

    println!("{}", format!("📝 Entry #{} recorded", entry.index()).bright_green().bold());
    println!("{}", dashboard::render_classification(&classification));
    println!("{}", dashboard::render_entry(&entry));
    Ok(())
}

fn attest(path: &Path, index: u64, by: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(path)?;
    match FactChecker::new(by).verify(&ledger, index) {
        Ok(()) => {
            ledger.write_json(path)?;
            println!("{}", format!("✅ Entry #{} attested by {}", index, by).bright_green());
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("❌ {}", e).red());
            Err(e.into())
        }
    }
}

fn show(path: &Path, index: Option<u64>, table: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(path)?;
    match index {
        Some(index) => println!("{}", dashboard::render_entry(&ledger.get(index)?)),
        None if table => {
            println!("{}", dashboard::chain_table(&ledger));
            println!("{}", dashboard::render_validation(&ledger.validate()));
        }
        None => println!("{}", dashboard::render_chain(&ledger)),
    }
    Ok(())
}

fn validate(path: &Path, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(path)?;
    if all {
        let violations = ledger.audit();
        if violations.is_empty() {
            println!("{}", "✅ Chain integrity verified".bright_green());
            return Ok(());
        }
        for violation in &violations {
            println!("{}", format!("❌ {}", violation).red());
        }
        return Err(LedgerError::ChainCorrupted(violations[0]).into());
    }

    let validation = Publisher::new("cli").run_integrity_check(&ledger);
    println!("{}", dashboard::render_validation(&validation));
    Ok(validation.into_result()?)
}

async fn demo(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "⛓️  TruthChain walkthrough".bright_cyan().bold());
    let ledger = Ledger::with_genesis(config.ledger.genesis_spec(), Arc::new(SystemClock))?;
    let heuristic = classifier::HeuristicClassifier::new(config.classifier.ai_threshold);
    let timeout = Duration::from_secs(config.classifier.timeout_secs);

    let alice = ContentCreator::new("Alice");
    let (report, _) = alice
        .publish(
            &ledger,
            &heuristic,
            "Breaking report: Satellite imagery confirms heavy flooding in the delta region.",
            timeout,
        )
        .await?;
    let bob = ContentCreator::new("Bob");
    let (essay, result) = bob
        .publish(
            &ledger,
            &heuristic,
            "In conclusion, this response uses structured phrasing and overall polished transitions.",
            timeout,
        )
        .await?;
    println!(
        "{}",
        format!(
            "📝 #{} {} / #{} {} ({})",
            report.index(),
            report.content_type(),
            essay.index(),
            essay.content_type(),
            result.label
        )
        .cyan()
    );

    let checker = FactChecker::new("Dr. Veritas");
    checker.verify(&ledger, 1)?;
    if let Err(e) = checker.verify(&ledger, 1) {
        println!("{}", format!("↩️  Second attestation refused: {}", e).yellow());
    }

    let publisher = Publisher::new("TruthTimes");
    println!("Before tampering: {}", dashboard::render_validation(&publisher.run_integrity_check(&ledger)));

    #[cfg(feature = "tamper")]
    {
        ledger.raw_entry_mut(2, |raw| {
            raw.set_content("Tampered payload: Deepfake content inserted retroactively.")
                .set_content_fingerprint(truthchain::ledger::ZERO_FINGERPRINT);
        })?;
        println!("After tampering: {}", dashboard::render_validation(&publisher.run_integrity_check(&ledger)));
    }
    #[cfg(not(feature = "tamper"))]
    println!("{}", "💡 Build with --features tamper to stage the tampering step".yellow());

    println!();
    println!("{}", dashboard::render_chain(&ledger));
    Ok(())
}

#[cfg(feature = "tamper")]
fn tamper(
    path: &Path,
    index: u64,
    content: Option<String>,
    rewrite: Option<String>,
    forge_fingerprint: bool,
    previous: Option<String>,
    reseal: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = open_ledger(path)?;
    let previous = previous
        .as_deref()
        .map(truthchain::ledger::fingerprint_from_hex)
        .transpose()?;

    ledger.raw_entry_mut(index, |raw| {
        if let Some(content) = &content {
            raw.set_content(content);
        }
        if let Some(content) = &rewrite {
            raw.rewrite_content(content);
        }
        if forge_fingerprint {
            raw.set_content_fingerprint(truthchain::ledger::ZERO_FINGERPRINT);
        }
        if let Some(previous) = previous {
            raw.set_previous_fingerprint(previous);
        }
        if reseal {
            raw.reseal();
        }
    })?;
    ledger.write_json(path)?;

    println!("{}", format!("🕵️  Entry #{} modified out of band", index).bright_red());
    println!("{}", dashboard::render_validation(&ledger.validate()));
    Ok(())
}
