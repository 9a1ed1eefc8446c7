use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::Path;

// Import from fddmap-core
use fddmap_core::{
    first_pages_text, AnalysisConfig, CanonicalTable, Document, DoclingPreprocessor, LoadReport,
    OutputWriter, ProcessedDocument, SectionAnalyzer,
};

// Import CLI utilities
use fddmap::report;

#[derive(Parser)]
#[command(name = "fddmap")]
#[command(about = "Map franchise disclosure documents onto their 23 canonical items")]
struct Args {
    /// Path to custom config file (YAML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Match headers to the canonical items, validate, and write JSON results
    Analyze {
        /// Path to the Docling JSON file to process
        #[arg(short, long)]
        input: String,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: String,

        /// Alternate canonical item table (YAML list of item_number/title)
        #[arg(long)]
        table: Option<String>,

        /// Print the per-item table
        #[arg(long)]
        print: bool,

        /// Print per-step timings
        #[arg(long)]
        profile: bool,
    },
    /// List section-header candidates with their numbering hints
    Headers {
        #[arg(short, long)]
        input: String,

        /// Also write the candidates to this JSON file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print each fragment group with its combined text
    Groups {
        #[arg(short, long)]
        input: String,
    },
    /// Print the text of the first pages in reading order
    Preview {
        #[arg(short, long)]
        input: String,

        /// Last page to include (default from config)
        #[arg(long)]
        pages: Option<u32>,
    },
    /// Print the effective configuration as YAML
    ShowConfig,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => "warn",
        1 => "fddmap_core=info,fddmap=info",
        2 => "fddmap_core=debug,fddmap=debug",
        _ => "fddmap_core=trace,fddmap=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Analyze {
            input,
            output,
            table,
            print,
            profile,
        } => analyze(&input, &output, table.as_deref(), print, profile, config),
        Command::Headers { input, output } => headers(&input, output.as_deref(), config),
        Command::Groups { input } => groups(&input),
        Command::Preview { input, pages } => {
            let (_, document, _) = load_document(&input)?;
            let pages = pages.unwrap_or(config.reading_order.preview_pages);
            println!("{}", first_pages_text(&document, pages));
            Ok(())
        }
        Command::ShowConfig => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
    }
}

/// An explicit config path must load; without one the defaults apply.
fn load_config(path: Option<&str>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let config = AnalysisConfig::load_from_file(path)
                .with_context(|| format!("failed to load config {path}"))?;
            eprintln!("📋 Loaded config from: {path}");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn load_document(input: &str) -> Result<(Vec<u8>, Document, LoadReport)> {
    let bytes = std::fs::read(input).with_context(|| format!("failed to read {input}"))?;
    let root: serde_json::Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse JSON in {input}"))?;
    let (document, load_report) = DoclingPreprocessor::new()
        .parse_value(&root)
        .with_context(|| format!("failed to load document {input}"))?;
    Ok((bytes, document, load_report))
}

fn analyze(
    input: &str,
    output: &str,
    table: Option<&str>,
    print: bool,
    profile: bool,
    config: AnalysisConfig,
) -> Result<()> {
    let table = match table {
        Some(path) => CanonicalTable::load_from_file(path)
            .with_context(|| format!("failed to load canonical table {path}"))?,
        None => CanonicalTable::fdd(),
    };
    let analyzer = SectionAnalyzer::new(config, table)?;

    println!("📄 Processing: {input}");
    let (bytes, document, load_report) = load_document(input)?;
    println!("   - Pages: {}", document.page_count());
    println!("   - Fragments: {}", document.len());
    println!("   - Section headers: {}", document.section_headers().count());
    println!("{}", report::load_summary(&load_report));

    let (analysis, timings) = analyzer.analyze_timed(&document);

    if print {
        println!("\n{}", report::item_table(&analysis.sections));
    }
    println!("📊 Section summary:");
    print!("{}", report::summary(&analysis.sections, &analysis.validation));

    if profile {
        println!("\n⏱️  Step timings:");
        for (step, duration) in &timings.steps {
            println!("   {:.<35} {:.3}ms", step, duration.as_secs_f64() * 1000.0);
        }
        println!("   {:.<35} {:.3}ms", "Total", timings.total().as_secs_f64() * 1000.0);
    }

    let file_name = Path::new(input)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(input);
    let processed = ProcessedDocument::from_analysis(
        file_name,
        &bytes,
        analyzer.config(),
        analysis,
        Utc::now(),
    )?;

    let writer = OutputWriter::new(output)?;
    let grouped_path = writer.write_processed(&processed)?;
    let summary_path = writer.write_analysis(std::slice::from_ref(&processed), processed.processed_at)?;
    println!("💾 Sections saved to: {}", grouped_path.display());
    println!("💾 Analysis saved to: {}", summary_path.display());

    Ok(())
}

fn headers(input: &str, output: Option<&str>, config: AnalysisConfig) -> Result<()> {
    let analyzer = SectionAnalyzer::new(config, CanonicalTable::fdd())?;
    let (_, document, _) = load_document(input)?;
    let candidates = analyzer.detect_headers(&document);

    println!("📑 Section headers ({}):", candidates.len());
    for candidate in &candidates {
        let hints: Vec<String> = candidate
            .hints
            .iter()
            .map(|h| format!("{}={}", h.scheme, h.value))
            .collect();
        println!(
            "   p{:<4} {:<60} [{}]",
            candidate.page_no(),
            report::truncate(candidate.text(), 60),
            hints.join(", ")
        );
    }

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&candidates)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {path}"))?;
        println!("💾 Headers saved to: {path}");
    }
    Ok(())
}

fn groups(input: &str) -> Result<()> {
    let (_, document, _) = load_document(input)?;

    println!("🗂️  Groups ({}):", document.groups.len());
    for group in &document.groups {
        let texts = document.group_texts(group);
        let combined = if texts.is_empty() {
            "No texts found".to_string()
        } else {
            report::truncate(&texts.join(" "), 1000)
        };
        println!(
            "\n{} ({}{})",
            group.self_ref,
            group.label,
            group
                .name
                .as_deref()
                .map(|n| format!(", {n}"))
                .unwrap_or_default()
        );
        println!("   {combined}");
    }
    Ok(())
}
