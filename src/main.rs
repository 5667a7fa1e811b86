//! PDF sanitization CLI.
//!
//! Command-line interface for the pdfscrub library: destructive redaction by
//! literal term, pattern category, or manually supplied region, plus a text
//! layout inspection subcommand.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use pdfscrub::{
    CancellationToken, PageRasterizer, PdfiumRasterizer, Pipeline, PipelineOptions, Rect,
    RedactionRegion, RedactionRequest, RegionSource, RuleKind, ScrubResult,
};

/// PDF Sanitization Tool
///
/// Destroys sensitive content in PDF documents by flattening affected pages
/// to masked raster images, then verifies that nothing extractable remains.
/// With no targets specified, performs a metadata-only sanitization pass.
#[derive(Parser)]
#[command(name = "pdfscrub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input PDF file path
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Literal text to redact (can be specified multiple times)
    #[arg(short, long, value_name = "TEXT")]
    term: Vec<String>,

    /// Match literal terms case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Redact nine-digit national identifiers (SSN-shaped)
    #[arg(long)]
    ssn: bool,

    /// Redact email addresses
    #[arg(long)]
    emails: bool,

    /// Redact NANP phone numbers
    #[arg(long)]
    phones: bool,

    /// Redact payment card numbers
    #[arg(long)]
    cards: bool,

    /// Manual region to redact, as "page,x,y,width,height" in points with a
    /// 0-based page index (can be specified multiple times)
    #[arg(long, value_name = "REGION")]
    region: Vec<String>,

    /// Render-quality scale factor for flattened pages (>= 1)
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// Do not re-render with widened margins if verification fails
    #[arg(long)]
    no_retry: bool,

    /// Print the verification report and statistics as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the positioned text layout of a PDF (for inspection)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Raster backend for runs that cannot touch any page: it refuses to
/// rasterize, which is fine because a sanitize-only pass never asks.
struct UnreachableRasterizer;

impl PageRasterizer for UnreachableRasterizer {
    fn rasterize(
        &self,
        _document: &[u8],
        _page_index: usize,
        _scale: f32,
    ) -> ScrubResult<pdfscrub::PageSurface> {
        Err(pdfscrub::ScrubError::Raster(
            "no raster backend configured".to_string(),
        ))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.verbose {
        "info"
    } else {
        "warn"
    }))
    .init();

    match &cli.command {
        Some(Commands::Extract { input, output }) => extract(input, output.as_deref()),
        None => {
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            let output = cli
                .output
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--output is required"))?;
            redact(&cli, input, output)
        }
    }
}

fn redact(cli: &Cli, input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let request = build_request(cli)?;
    let has_targets = !request.terms.is_empty()
        || !request.rules.is_empty()
        || !request.manual_regions.is_empty();

    if cli.verbose {
        println!("Input:  {}", input.display());
        println!("Output: {}", output.display());
        if !has_targets {
            println!("No targets specified; metadata-only sanitization");
        }
    }

    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let options = PipelineOptions {
        scale: cli.scale,
        margin_retry: !cli.no_retry,
    };

    // The pdfium library only has to be present when pages will actually be
    // flattened; a metadata-only pass must work without it.
    let pdfium;
    let fallback = UnreachableRasterizer;
    let rasterizer: &dyn PageRasterizer = if has_targets {
        pdfium = PdfiumRasterizer::new()?;
        &pdfium
    } else {
        &fallback
    };

    let pipeline = Pipeline::new(rasterizer, options);
    let outcome = pipeline
        .run(&bytes, &request, &CancellationToken::new())
        .with_context(|| "Sanitization failed")?;

    std::fs::write(output, &outcome.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if cli.json {
        let report = serde_json::json!({
            "verification": outcome.report,
            "stats": outcome.stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if cli.verbose {
        println!("\nSanitization Summary:");
        println!("  Pages processed:  {}", outcome.stats.pages_processed);
        println!("  Pages flattened:  {}", outcome.stats.pages_flattened);
        println!("  Matches found:    {}", outcome.stats.matches_found);
        println!("  Regions applied:  {}", outcome.stats.regions_applied);
        if outcome.stats.degenerate_dropped > 0 {
            println!(
                "  Degenerate regions dropped: {}",
                outcome.stats.degenerate_dropped
            );
        }
        if outcome.stats.retried {
            println!("  Re-rendered once with widened margins");
        }
    }

    if outcome.report.success {
        println!(
            "✓ Sanitized {} page(s), {} region(s) destroyed → {}",
            outcome.stats.pages_processed,
            outcome.stats.regions_applied,
            output.display()
        );
    } else {
        println!(
            "⚠ Verification found {} residual fragment(s) in redacted zones:",
            outcome.report.residual_fragments.len()
        );
        for fragment in &outcome.report.residual_fragments {
            println!("    {:?}", fragment);
        }
        println!("  The output was written, but should not be trusted as-is.");
    }

    Ok(())
}

fn extract(input: &Path, output: Option<&Path>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let doc = lopdf::Document::load(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let pages = pdfscrub::layout::extract_all_runs(&doc).with_context(|| "Extraction failed")?;

    let mut text = String::new();
    for (page_index, runs) in pages.iter().enumerate() {
        text.push_str(&format!("--- page {} ({} runs)\n", page_index, runs.len()));
        for run in runs {
            text.push_str(&format!(
                "[{:>7.2},{:>7.2} {:>6.2}x{:>5.2}] {}\n",
                run.x, run.y, run.width, run.height, run.text
            ));
        }
    }

    if let Some(output_path) = output {
        std::fs::write(output_path, &text)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!(
            "✓ Extracted {} page(s) → {}",
            pages.len(),
            output_path.display()
        );
    } else {
        print!("{}", text);
    }

    Ok(())
}

/// Maps command-line flags to a pipeline request.
fn build_request(cli: &Cli) -> Result<RedactionRequest> {
    let mut request = RedactionRequest {
        case_sensitive: !cli.ignore_case,
        rules: pdfscrub::RuleSet::none(),
        ..RedactionRequest::default()
    };
    request.terms = cli.term.clone();

    if cli.ssn {
        request.rules.enable(RuleKind::NationalId);
    }
    if cli.emails {
        request.rules.enable(RuleKind::Email);
    }
    if cli.phones {
        request.rules.enable(RuleKind::Phone);
    }
    if cli.cards {
        request.rules.enable(RuleKind::PaymentCard);
    }

    for spec in &cli.region {
        request.manual_regions.push(parse_region(spec)?);
    }

    Ok(request)
}

/// Parses a manual region of the form "page,x,y,width,height".
fn parse_region(spec: &str) -> Result<RedactionRegion> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() != 5 {
        anyhow::bail!(
            "Invalid region '{}': expected page,x,y,width,height",
            spec
        );
    }
    let page_index: usize = parts[0]
        .parse()
        .with_context(|| format!("Invalid page index in region '{}'", spec))?;
    let nums: Vec<f32> = parts[1..]
        .iter()
        .map(|p| p.parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid coordinates in region '{}'", spec))?;

    Ok(RedactionRegion::new(
        page_index,
        Rect::new(nums[0], nums[1], nums[2], nums[3]),
        RegionSource::Manual,
    ))
}
