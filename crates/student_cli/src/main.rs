//! Command-line transport over the student repository.
//!
//! # Responsibility
//! - Map subcommands onto repository operations and print JSON results.
//! - Apply display-only name search to listings.
//! - Map failure classes onto distinct exit codes.

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use student_core::{
    init_logging, open_repository, Backend, ErrorClass, NewStudent, RegistryConfig, RepoError,
    StudentId, StudentRepository, StudentUpdate, EXPORT_FILE_NAME,
};

const EXIT_STORAGE_FAULT: u8 = 1;
const EXIT_VALIDATION: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

/// Manage student records.
///
/// Without `--db` or a config naming a SQLite backend, records live in
/// memory and vanish when the command exits.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite database file; overrides the configured backend
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new student
    Add {
        name: String,
        #[arg(allow_hyphen_values = true)]
        grade: i64,
        section: String,
        contact: String,
    },

    /// List students, newest first
    List {
        /// Keep only names containing this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one student
    Get { id: StudentId },

    /// Change some fields of a student
    Update {
        id: StudentId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        grade: Option<i64>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },

    /// Remove a student
    Delete { id: StudentId },

    /// Print the number of students
    Count,

    /// Write every student to a JSON file
    Export {
        #[arg(short, long, value_name = "FILE", default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    if let Some(log_dir) = config.log_dir.as_ref() {
        init_logging(&config.log_level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let repo = open_repository(&config).context("failed to open student store")?;
    execute(&repo, cli.command).inspect_err(|err| {
        error!("event=cli_command module=cli status=error error={err}");
    })
}

fn resolve_config(cli: &Cli) -> anyhow::Result<RegistryConfig> {
    let mut config = match cli.config.as_ref() {
        Some(path) => RegistryConfig::load(path)?,
        None => RegistryConfig::default(),
    };
    if let Some(path) = cli.db.as_ref() {
        config.backend = Backend::Sqlite { path: path.clone() };
    }
    if let Some(log_dir) = cli.log_dir.as_ref() {
        config.log_dir = Some(log_dir.clone());
    }
    if let Some(level) = cli.log_level.as_ref() {
        config.log_level = level.clone();
    }
    Ok(config)
}

fn execute(repo: &StudentRepository, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Add {
            name,
            grade,
            section,
            contact,
        } => {
            let created = repo.add_student(&NewStudent::new(name, grade, section, contact))?;
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Commands::List { search } => {
            let mut students = repo.list_students()?;
            if let Some(query) = search.as_deref() {
                students.retain(|student| student.matches_name(query));
            }
            println!("{}", serde_json::to_string_pretty(&students)?);
        }
        Commands::Get { id } => {
            let student = repo.get_student(id)?;
            println!("{}", serde_json::to_string_pretty(&student)?);
        }
        Commands::Update {
            id,
            name,
            grade,
            section,
            contact,
        } => {
            let update = StudentUpdate {
                name,
                grade,
                section,
                contact,
            };
            let updated = repo.update_student(id, &update)?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        Commands::Delete { id } => {
            repo.delete_student(id)?;
            println!("{}", serde_json::json!({ "message": "Deleted", "id": id }));
        }
        Commands::Count => {
            let count = repo.count_students()?;
            println!("{}", serde_json::json!({ "count": count }));
        }
        Commands::Export { out } => {
            let bytes = repo.export_students()?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write `{}`", out.display()))?;
            println!(
                "{}",
                serde_json::json!({ "message": "Exported", "path": out.display().to_string() })
            );
        }
    }
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<RepoError>().map(RepoError::class) {
        Some(ErrorClass::Validation) => EXIT_VALIDATION,
        Some(ErrorClass::NotFound) => EXIT_NOT_FOUND,
        Some(ErrorClass::StorageFault) | None => EXIT_STORAGE_FAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use student_core::{MemoryStudentStore, StudentStore};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("student_cli").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn db_flag_selects_sqlite_backend() {
        let cli = parse(&["--db", "/tmp/students.sqlite3", "count"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(
            config.backend,
            Backend::Sqlite {
                path: PathBuf::from("/tmp/students.sqlite3")
            }
        );
    }

    #[test]
    fn update_flags_stay_absent_when_not_given() {
        let cli = parse(&["update", "3", "--grade", "-1"]);
        match cli.command {
            Commands::Update {
                id,
                name,
                grade,
                section,
                contact,
            } => {
                assert_eq!(id, 3);
                assert_eq!(grade, Some(-1));
                assert!(name.is_none() && section.is_none() && contact.is_none());
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn failures_map_to_distinct_exit_codes() {
        let store: Box<dyn StudentStore> = Box::new(MemoryStudentStore::new());
        let repo = StudentRepository::new(store);

        let err = execute(&repo, Commands::Get { id: 1 }).unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_NOT_FOUND);

        let add = Commands::Add {
            name: String::new(),
            grade: 1,
            section: "A".to_string(),
            contact: "1".to_string(),
        };
        let err = execute(&repo, add).unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_VALIDATION);

        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(exit_code_for(&err), EXIT_STORAGE_FAULT);
    }
}
