use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context as AnyhowContext, Result};
use clap::{ArgAction, Parser, Subcommand};
use crosswalk_cda::ClinicalDocument;
use crosswalk_convert::{
    build_qrda_xml, convert_ccda_to_fhir, convert_fhir_to_ccda, ConvertOptions, DocumentKind,
    FhirToCcdaOptions, QrdaInput, QrdaParams,
};
use crosswalk_fhir::Bundle;

#[derive(Parser)]
#[command(
    name = "crosswalk",
    about = "Convert between C-CDA documents and FHIR bundles",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a C-CDA XML document to a FHIR document bundle (JSON).
    ToFhir {
        /// Path to the C-CDA document (or "-" for stdin).
        input: PathBuf,
        /// Skip entries with unrecognized template ids instead of failing.
        #[arg(long, action = ArgAction::SetTrue)]
        ignore_unsupported: bool,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print the JSON output.
        #[arg(long, action = ArgAction::SetTrue)]
        pretty: bool,
    },

    /// Convert a FHIR document bundle (JSON) to a C-CDA XML document.
    ToCda {
        /// Path to the bundle JSON (or "-" for stdin).
        input: PathBuf,
        /// Document kind: summary or referral.
        #[arg(short, long, default_value = "summary")]
        kind: String,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a QRDA Category I report from a FHIR document bundle.
    Qrda {
        /// Path to the bundle JSON (or "-" for stdin).
        input: PathBuf,
        /// Patient identifier for the report header.
        #[arg(long)]
        patient_id: String,
        /// Measure period start (FHIR dateTime).
        #[arg(long)]
        period_start: String,
        /// Measure period end (FHIR dateTime).
        #[arg(long)]
        period_end: String,
        /// Output file path (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::ToFhir { input, ignore_unsupported, output, pretty } => {
            let xml = read_input(&input)?;
            let doc = ClinicalDocument::from_xml(&xml).context("failed to parse C-CDA document")?;
            let options = ConvertOptions {
                ignore_unsupported_sections: ignore_unsupported,
                ..Default::default()
            };
            let bundle = convert_ccda_to_fhir(&doc, &options)?;
            let json = if pretty {
                serde_json::to_string_pretty(&bundle)?
            } else {
                serde_json::to_string(&bundle)?
            };
            write_output(output.as_deref(), &json)
        }

        Commands::ToCda { input, kind, output } => {
            let bundle = read_bundle(&input)?;
            let options = FhirToCcdaOptions {
                kind: match kind.as_str() {
                    "referral" => DocumentKind::Referral,
                    _ => DocumentKind::Summary,
                },
            };
            let doc = convert_fhir_to_ccda(&bundle, &options)?;
            write_output(output.as_deref(), &doc.to_xml()?)
        }

        Commands::Qrda { input, patient_id, period_start, period_end, output } => {
            let bundle = read_bundle(&input)?;
            let resources: Vec<_> = bundle.resources().cloned().collect();
            let qrda_input = QrdaInput::collect(&resources);
            let params = QrdaParams {
                patient_id,
                measure_period_start: period_start,
                measure_period_end: period_end,
            };
            let xml = build_qrda_xml(&qrda_input, &params)?;
            write_output(output.as_deref(), &xml)
        }
    }
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

fn read_bundle(path: &PathBuf) -> Result<Bundle> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("failed to parse FHIR bundle")
}

fn write_output(path: Option<&std::path::Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
