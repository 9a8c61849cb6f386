use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use variants::FieldSelection;
use varmap_core::config::patient_data_dir_from_env_value;
use varmap_core::constants::PATIENT_DATA_DIR_ENV;
use varmap_core::{CoreConfig, FileVariantStore, VariantMapper};
use varmap_uuid::PatientId;

#[derive(Parser)]
#[command(name = "varmap")]
#[command(about = "Gene variant mapping CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh patient identifier
    NewPatient,
    /// Import variants from a JSON document, replacing the stored ones
    Import {
        /// Patient UUID (32 lowercase hex characters)
        patient: String,
        /// JSON file with a top-level "variants" array
        file: PathBuf,
    },
    /// Export stored variants as JSON
    Export {
        /// Patient UUID (32 lowercase hex characters)
        patient: String,
        /// Selected field names (comma-separated); variants are only exported with "genes"
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,
    },
    /// Show stored variants field by field
    Show {
        /// Patient UUID (32 lowercase hex characters)
        patient: String,
    },
}

fn parse_patient(input: &str) -> anyhow::Result<PatientId> {
    PatientId::parse(input).with_context(|| format!("invalid patient id '{input}'"))
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("varmap=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let patient_data_dir = patient_data_dir_from_env_value(std::env::var(PATIENT_DATA_DIR_ENV).ok());
    let cfg = Arc::new(CoreConfig::with_data_dir(patient_data_dir)?);
    tracing::debug!(dir = %cfg.patient_data_dir().display(), "using patient data directory");
    let mapper = VariantMapper::new(FileVariantStore::new(cfg.clone()), &cfg);

    match cli.command {
        Some(Commands::NewPatient) => {
            println!("{}", PatientId::new());
        }
        Some(Commands::Import { patient, file }) => {
            let patient = parse_patient(&patient)?;
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;

            match mapper.read_json_str(&text) {
                Some(variants) => {
                    mapper.save(&patient, Some(&variants));
                    let stored = mapper.load(&patient).map_or(0, |v| v.len());
                    println!(
                        "Imported {} variants for patient {} ({} stored)",
                        variants.len(),
                        patient,
                        stored
                    );
                }
                None => println!("No variants found in {}", file.display()),
            }
        }
        Some(Commands::Export { patient, fields }) => {
            let patient = parse_patient(&patient)?;
            let selection = fields.map(FieldSelection::from_names);

            let mut json = Map::new();
            mapper.write_json(&patient, &mut json, selection.as_ref());
            println!("{}", serde_json::to_string_pretty(&Value::Object(json))?);
        }
        Some(Commands::Show { patient }) => {
            let patient = parse_patient(&patient)?;
            match mapper.load(&patient) {
                Some(variants) => {
                    for (index, record) in variants.iter().enumerate() {
                        println!("Variant {}:", index + 1);
                        for (field, value) in record.iter() {
                            println!("  {field}: {value}");
                        }
                    }
                }
                None => println!("No variants stored for patient {patient}"),
            }
        }
        None => {
            println!("Use 'varmap --help' for commands");
        }
    }

    Ok(())
}
