use clap::{Parser, Subcommand};
use dashboard_core::{
    resolve, ContactsService, CoreConfig, FileProvider, HivSummaryLatestService, PatientUuid,
    SummaryQuery, DEFAULT_PATIENT_DATA_DIR,
};
use openmrs::{HivSummary, Patient};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dashboard")]
#[command(about = "Patient dashboard CLI")]
struct Cli {
    /// Patient data directory
    #[arg(long, env = "PATIENT_DATA_DIR", default_value = DEFAULT_PATIENT_DATA_DIR)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the contacts panel for a stored patient
    Contacts {
        /// Patient UUID (hyphenated or plain)
        uuid: String,
    },
    /// Show the latest HIV summary and eligibility for a stored patient
    HivSummary {
        /// Patient UUID (hyphenated or plain)
        uuid: String,
        /// Maximum number of summary rows to load
        #[arg(long, default_value_t = SummaryQuery::default().limit)]
        limit: usize,
        /// Drop non-clinical rows before resolving
        #[arg(long)]
        exclude_non_clinical: bool,
    },
    /// Resolve eligibility from JSON files without touching the data directory
    Eligibility {
        /// Patient resource JSON file
        #[arg(long)]
        patient: Option<PathBuf>,
        /// HIV summary rows JSON file
        #[arg(long)]
        summaries: PathBuf,
    },
    /// Import a patient (and optionally their HIV summary rows) into the data directory
    Import {
        /// Patient resource JSON file
        #[arg(long)]
        patient: PathBuf,
        /// HIV summary rows JSON file
        #[arg(long)]
        summaries: Option<PathBuf>,
    },
}

fn config(data_dir: PathBuf, query: SummaryQuery) -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    Ok(Arc::new(CoreConfig::new(data_dir, query)?))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Contacts { uuid }) => {
            let uuid = PatientUuid::parse(&uuid)?;
            let cfg = config(cli.data_dir, SummaryQuery::default())?;
            let service = ContactsService::new(FileProvider::new(cfg));
            match service.contacts(&uuid) {
                Ok(display) => print_json(&display)?,
                Err(e) => eprintln!("Error loading contacts: {}", e),
            }
        }
        Some(Commands::HivSummary {
            uuid,
            limit,
            exclude_non_clinical,
        }) => {
            let uuid = PatientUuid::parse(&uuid)?;
            let query = SummaryQuery {
                start_index: 0,
                limit,
                include_non_clinical: !exclude_non_clinical,
            };
            let cfg = config(cli.data_dir, query)?;
            let provider = FileProvider::new(cfg.clone());
            let service = HivSummaryLatestService::new(cfg, provider.clone(), provider);
            let view = service.load(&uuid);
            for error in &view.errors {
                eprintln!("{}: {}", error.id, error.message);
            }
            print_json(&view)?;
        }
        Some(Commands::Eligibility { patient, summaries }) => {
            let patient = match patient {
                Some(path) => Some(Patient::parse(&std::fs::read_to_string(path)?)?),
                None => None,
            };
            let rows = HivSummary::parse_list(&std::fs::read_to_string(summaries)?)?;
            print_json(&resolve(patient.as_ref(), &rows))?;
        }
        Some(Commands::Import { patient, summaries }) => {
            let cfg = config(cli.data_dir, SummaryQuery::default())?;
            let provider = FileProvider::new(cfg);
            let patient = Patient::parse(&std::fs::read_to_string(patient)?)?;
            provider.store_patient(&patient)?;
            if let Some(path) = summaries {
                let rows = HivSummary::parse_list(&std::fs::read_to_string(path)?)?;
                provider.store_hiv_summaries(&patient.uuid, &rows)?;
                println!("Imported patient {} with {} summary rows", patient.uuid, rows.len());
            } else {
                println!("Imported patient {}", patient.uuid);
            }
        }
        None => {
            println!("Use 'dashboard --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_hiv_summary_flags() {
        let cli = Cli::try_parse_from([
            "dashboard",
            "--data-dir",
            "/tmp/data",
            "hiv-summary",
            "5b6e2f9a-1c3d-4e5f-8a9b-0c1d2e3f4a5b",
            "--limit",
            "5",
            "--exclude-non-clinical",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/data"));
        match cli.command {
            Some(Commands::HivSummary {
                limit,
                exclude_non_clinical,
                ..
            }) => {
                assert_eq!(limit, 5);
                assert!(exclude_non_clinical);
            }
            _ => panic!("expected hiv-summary command"),
        }
    }

    #[test]
    fn eligibility_requires_summaries() {
        assert!(Cli::try_parse_from(["dashboard", "eligibility", "--patient", "p.json"]).is_err());
    }
}
