use ayunex_core::{
    core_config_from_env_values, CodeSystem, CoreConfig, PatientService, DATABASE_ENV,
    TERMINOLOGY_FILE_ENV,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ayunex")]
#[command(about = "AYUNEX clinical record CLI")]
struct Cli {
    /// SQLite database file (overrides AYUNEX_DATABASE)
    #[arg(long, global = true)]
    database: Option<String>,
    /// YAML terminology table (overrides AYUNEX_TERMINOLOGY_FILE)
    #[arg(long, global = true)]
    terminology: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Add a patient and record diagnoses matched in the note
    Add {
        /// Patient name
        name: String,
        /// Free-text diagnosis note
        diagnosis: String,
        /// Age in years
        #[arg(long)]
        age: Option<u32>,
        /// Gender
        #[arg(long)]
        gender: Option<String>,
    },
    /// Show a patient and its diagnosis history
    Show {
        /// Patient id
        id: i64,
    },
    /// Match a note against the terminology table without storing it
    Match {
        /// Free-text diagnosis note
        text: String,
    },
    /// Translate a code from one coding system into another
    Translate {
        /// Code in the source system
        code: String,
        /// Source system (NAMASTE, ICD11, SNOMED, LOINC)
        #[arg(long)]
        from: CodeSystem,
        /// Target system (NAMASTE, ICD11, SNOMED, LOINC)
        #[arg(long)]
        to: CodeSystem,
    },
    /// Print the loaded terminology table
    Terminology {
        /// Print as YAML, usable as an AYUNEX_TERMINOLOGY_FILE
        #[arg(long)]
        yaml: bool,
    },
}

fn load_config(cli: &Cli) -> Result<Arc<CoreConfig>, Box<dyn std::error::Error>> {
    let database = cli
        .database
        .clone()
        .or_else(|| std::env::var(DATABASE_ENV).ok());
    let terminology = cli
        .terminology
        .clone()
        .or_else(|| std::env::var(TERMINOLOGY_FILE_ENV).ok());
    Ok(Arc::new(core_config_from_env_values(database, terminology)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;

    match cli.command {
        Some(Commands::List) => {
            let service = PatientService::open(cfg)?;
            let patients = service.list_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Age: {}, Gender: {}",
                        patient.id,
                        patient.name,
                        patient.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into()),
                        patient.gender.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Some(Commands::Add {
            name,
            diagnosis,
            age,
            gender,
        }) => {
            let service = PatientService::open(cfg)?;
            match service.create_record(Some(&name), age, gender.as_deref(), Some(&diagnosis)) {
                Ok(record) => {
                    let matched: Vec<&str> = record
                        .diagnoses
                        .iter()
                        .map(|d| d.disease_name.as_str())
                        .collect();
                    println!(
                        "Added patient {} (matched: {})",
                        record.patient.id,
                        if matched.is_empty() {
                            "none".to_string()
                        } else {
                            matched.join(", ")
                        }
                    );
                }
                Err(e) => eprintln!("Error adding patient: {}", e),
            }
        }
        Some(Commands::Show { id }) => {
            let service = PatientService::open(cfg)?;
            match service.get_patient(id) {
                Ok(record) => {
                    println!("ID: {}, Name: {}", record.patient.id, record.patient.name);
                    for d in &record.diagnoses {
                        println!(
                            "  [{}] {} NAMASTE={} ICD11={} SNOMED={} LOINC={}",
                            d.formatted_timestamp(),
                            d.disease_name,
                            d.namaste,
                            d.icd11,
                            d.snomed,
                            d.loinc
                        );
                        println!("      {}", d.preventive);
                    }
                }
                Err(e) => eprintln!("Error showing patient: {}", e),
            }
        }
        Some(Commands::Match { text }) => {
            let matches = cfg.terminology().match_note(&text);
            if matches.is_empty() {
                println!("No terminology matches.");
            }
            for entry in matches {
                println!(
                    "{}: NAMASTE={} ICD11={} SNOMED={} LOINC={}",
                    entry.disease_key, entry.namaste, entry.icd11, entry.snomed, entry.loinc
                );
            }
        }
        Some(Commands::Translate { code, from, to }) => {
            match cfg.terminology().translate(from, &code, to) {
                Some(target) => println!("{from} {code} -> {to} {target}"),
                None => println!("No {from} entry with code {code}."),
            }
        }
        Some(Commands::Terminology { yaml: true }) => {
            print!("{}", cfg.terminology().render()?);
        }
        Some(Commands::Terminology { yaml: false }) => {
            for entry in cfg.terminology().entries() {
                println!(
                    "{}: NAMASTE={} ICD11={} SNOMED={} LOINC={} | {}",
                    entry.disease_key,
                    entry.namaste,
                    entry.icd11,
                    entry.snomed,
                    entry.loinc,
                    entry.preventive_advice
                );
            }
        }
        None => {
            println!("Use 'ayunex --help' for commands");
        }
    }

    Ok(())
}
