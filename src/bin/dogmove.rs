//! DogMove CLI - Command-line interface for DogMove
//!
//! Commands:
//! - subjects: List SubjectTrialIDs
//! - behaviors: List behaviors observed for a subject/trial
//! - signals: Export a signal series as CSV
//! - steps: Count steps in a gait segment
//! - summary: Print dataset counts
//! - validate: Validate the data file row by row
//! - doctor: Diagnose configuration and data file
//! - schema: Print the expected input columns

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use dogmove::encoder::{write_series_csv, ReportEncoder};
use dogmove::schema::{ValidationSummary, OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use dogmove::{
    Config, DatasetLoader, Explorer, Gait, RecordAdapter, SignalColumn, SubjectTrialId,
    DOGMOVE_VERSION, PRODUCER_NAME, SCHEMA_NAME,
};

/// DogMove - step counting for dog accelerometer recordings
#[derive(Parser)]
#[command(name = "dogmove")]
#[command(version = DOGMOVE_VERSION)]
#[command(about = "Explore DogMove signals and count steps in gait segments", long_about = None)]
struct Cli {
    /// DogMove data file (overrides the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Configuration file (JSON); defaults apply when it does not exist
    #[arg(long, global = true, default_value = "dogmove.json")]
    config: PathBuf,

    /// Log level or filter directive (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List SubjectTrialIDs in file order
    Subjects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List behaviors observed for a subject/trial
    Behaviors {
        /// SubjectTrialID (DogID followed by TestNum)
        #[arg(short, long)]
        subject: SubjectTrialId,

        /// Only list gait behaviors
        #[arg(long)]
        gait: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export signal columns for a subject/trial and behavior as CSV
    Signals {
        /// SubjectTrialID (DogID followed by TestNum)
        #[arg(short, long)]
        subject: SubjectTrialId,

        /// Behavior label, matched exactly
        #[arg(short, long)]
        behavior: String,

        /// Comma-separated columns (defaults to the configured selection)
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Count steps in a gait segment
    Steps {
        /// SubjectTrialID (DogID followed by TestNum)
        #[arg(short, long)]
        subject: SubjectTrialId,

        /// Gait behavior label, matched exactly
        #[arg(short, long)]
        behavior: String,

        /// Minimum distance between steps in samples (1 sample = 0.01 s)
        #[arg(short, long)]
        distance: Option<usize>,

        /// Output the step report as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON step report
        #[arg(long)]
        pretty: bool,
    },

    /// Print dataset counts
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate every row of the data file
    Validate {
        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and data file
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the expected input columns
    Schema,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), DogmoveCliError> {
    let mut config = Config::load(&cli.config)?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Commands::Subjects { json } => cmd_subjects(&config, json),

        Commands::Behaviors {
            subject,
            gait,
            json,
        } => cmd_behaviors(&config, subject, gait, json),

        Commands::Signals {
            subject,
            behavior,
            columns,
            output,
        } => cmd_signals(&config, subject, &behavior, &columns, &output),

        Commands::Steps {
            subject,
            behavior,
            distance,
            json,
            pretty,
        } => cmd_steps(&config, subject, &behavior, distance, json, pretty),

        Commands::Summary { json } => cmd_summary(&config, json),

        Commands::Validate { json } => cmd_validate(&config, json),

        Commands::Doctor { json } => cmd_doctor(&config, &cli.config, json),

        Commands::Schema => cmd_schema(),
    }
}

fn open_explorer(config: &Config) -> Result<Explorer, DogmoveCliError> {
    let adapter = RecordAdapter::with_delimiter(config.delimiter_byte()?);
    let loader = DatasetLoader::with_adapter(&config.data_path, adapter);
    tracing::debug!(path = %loader.path().display(), "opening dataset");
    let dataset = loader.load().map_err(dogmove::ComputeError::from)?;
    Ok(Explorer::with_sample_rate(dataset, config.sample_rate_hz))
}

fn cmd_subjects(config: &Config, json: bool) -> Result<(), DogmoveCliError> {
    let explorer = open_explorer(config)?;
    let ids = explorer.subject_trial_ids();

    if json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        for id in ids {
            println!("{id}");
        }
    }

    Ok(())
}

fn cmd_behaviors(
    config: &Config,
    subject: SubjectTrialId,
    gait: bool,
    json: bool,
) -> Result<(), DogmoveCliError> {
    let explorer = open_explorer(config)?;

    if !gait {
        let behaviors = explorer.behaviors(subject)?;
        if json {
            println!("{}", serde_json::to_string(&behaviors)?);
        } else {
            for behavior in behaviors {
                println!("{behavior}");
            }
        }
        return Ok(());
    }

    let gaits: Vec<GaitBehavior> = explorer
        .gait_behaviors(subject)?
        .into_iter()
        .filter_map(|label| {
            Gait::classify(&label).map(|gait| GaitBehavior {
                suggested_distance: gait.suggested_distance(),
                gait,
                label,
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string(&gaits)?);
    } else {
        for g in &gaits {
            println!("{} (suggested distance {})", g.label, g.suggested_distance);
        }
    }

    Ok(())
}

fn cmd_signals(
    config: &Config,
    subject: SubjectTrialId,
    behavior: &str,
    columns: &[String],
    output: &Path,
) -> Result<(), DogmoveCliError> {
    let selected: Vec<SignalColumn> = if columns.is_empty() {
        config.default_columns.clone()
    } else {
        columns
            .iter()
            .map(|c| c.parse::<SignalColumn>())
            .collect::<Result<_, _>>()?
    };

    let explorer = open_explorer(config)?;
    let series = explorer.signal_series(subject, behavior, &selected);
    tracing::info!(
        subject_trial_id = %subject,
        behavior,
        samples = series.len(),
        "exporting signal series"
    );

    if output.to_string_lossy() == "-" {
        let stdout = io::stdout();
        write_series_csv(&series, stdout.lock())?;
    } else {
        let file = File::create(output)?;
        write_series_csv(&series, BufWriter::new(file))?;
    }

    Ok(())
}

fn cmd_steps(
    config: &Config,
    subject: SubjectTrialId,
    behavior: &str,
    distance: Option<usize>,
    json: bool,
    pretty: bool,
) -> Result<(), DogmoveCliError> {
    let distance = distance.unwrap_or(config.default_distance);
    if distance > config.max_distance {
        return Err(DogmoveCliError::DistanceOutOfRange {
            distance,
            max: config.max_distance,
        });
    }

    let explorer = open_explorer(config)?;

    if pretty {
        let report = explorer.step_report(subject, behavior, distance)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if json {
        println!("{}", explorer.step_report_json(subject, behavior, distance)?);
    } else {
        let segment = explorer.count_steps(subject, behavior, distance)?;
        println!("subject_trial_id == {subject}");
        println!("behavior == {behavior}");
        println!(
            "distance == {distance} ({:.2} s)",
            distance as f64 / explorer.sample_rate_hz()
        );
        println!("samples == {}", segment.signal.len());
        if segment.prominence_threshold.is_finite() {
            println!("prominence threshold == {:.4}", segment.prominence_threshold);
        }
        for (t, v) in segment.step_times().iter().zip(segment.step_values()) {
            println!("  step at {t:.2} s (ANeck_RMS {v:.4})");
        }
        println!("{}", ReportEncoder::summary_line(segment.step_count()));
    }

    Ok(())
}

fn cmd_summary(config: &Config, json: bool) -> Result<(), DogmoveCliError> {
    let explorer = open_explorer(config)?;
    let summary = explorer.dataset().summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Dataset Summary");
        println!("===============");
        println!("Source:          {}", config.data_path.display());
        println!("Rows:            {}", summary.rows);
        println!("Subject/trials:  {}", summary.subject_trials);
        println!("Behaviors:       {}", summary.behaviors);
        println!("Gait behaviors:  {}", summary.gait_behaviors);
        if let (Some(min), Some(max)) = (summary.t_sec_min, summary.t_sec_max) {
            println!("Time span:       {min:.2} s .. {max:.2} s");
        }
    }

    Ok(())
}

fn cmd_validate(config: &Config, json: bool) -> Result<(), DogmoveCliError> {
    let adapter = RecordAdapter::with_delimiter(config.delimiter_byte()?);
    let file = File::open(&config.data_path)?;
    let summary = adapter
        .validate(BufReader::new(file))
        .map_err(dogmove::ComputeError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_validation(&summary);
    }

    if summary.is_valid() {
        Ok(())
    } else {
        Err(DogmoveCliError::ValidationFailed(summary.issues.len()))
    }
}

fn print_validation(summary: &ValidationSummary) {
    println!("Validation Report");
    println!("=================");
    println!("Total rows:   {}", summary.total_rows);
    println!("Valid rows:   {}", summary.valid_rows);
    println!("Invalid rows: {}", summary.issues.len());

    if !summary.issues.is_empty() {
        println!("\nErrors:");
        for issue in &summary.issues {
            println!("  - Row {}: {}", issue.row, issue.message);
        }
    }
}

fn cmd_doctor(config: &Config, config_path: &Path, json: bool) -> Result<(), DogmoveCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "dogmove_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("DogMove version {}", DOGMOVE_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_NAME),
    });

    // Config::load already succeeded; report where the values came from
    checks.push(if config_path.exists() {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!("Config loaded from {}", config_path.display()),
        }
    } else {
        DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: format!("{} does not exist, using defaults", config_path.display()),
        }
    });

    let data_check = if !config.data_path.exists() {
        DoctorCheck {
            name: "data".to_string(),
            status: CheckStatus::Error,
            message: format!("Data file {} does not exist", config.data_path.display()),
        }
    } else {
        match open_explorer(config) {
            Ok(explorer) => {
                let summary = explorer.dataset().summary();
                DoctorCheck {
                    name: "data".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Data file valid ({} rows, {} subject/trials)",
                        summary.rows, summary.subject_trials
                    ),
                }
            }
            Err(e) => DoctorCheck {
                name: "data".to_string(),
                status: CheckStatus::Error,
                message: CliError::from(e).message,
            },
        }
    };
    checks.push(data_check);

    // Check whether output goes to a terminal or a pipe
    let stdout_check = if atty::is(atty::Stream::Stdout) {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a TTY (text output recommended)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdout".to_string(),
            status: CheckStatus::Ok,
            message: "stdout is a pipe (--json output recommended)".to_string(),
        }
    };
    checks.push(stdout_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: DOGMOVE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("DogMove Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(DogmoveCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema() -> Result<(), DogmoveCliError> {
    println!("Input Schema: {}", SCHEMA_NAME);
    println!();
    println!("Required columns:");
    for column in REQUIRED_COLUMNS {
        println!("  - {column}");
    }
    println!();
    println!("Optional columns:");
    for column in OPTIONAL_COLUMNS {
        println!("  - {column}");
    }
    println!();
    println!("Derived columns:");
    println!("  - SubjectTrialID: DogID and TestNum concatenated");
    println!("  - Behavior: Behavior_1, Behavior_2, Behavior_3 joined with '_'");
    println!("  - ANeck_RMS, GNeck_RMS: neck sensor magnitudes");
    println!();
    let gaits: Vec<&str> = Gait::ALL.iter().map(|g| g.as_str()).collect();
    println!("Gait names: {}", gaits.join(", "));

    // Keep output flushed for pipes
    io::stdout().flush()?;
    Ok(())
}

// Error types

#[derive(Debug)]
enum DogmoveCliError {
    Io(io::Error),
    Compute(dogmove::ComputeError),
    Json(serde_json::Error),
    DistanceOutOfRange { distance: usize, max: usize },
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for DogmoveCliError {
    fn from(e: io::Error) -> Self {
        DogmoveCliError::Io(e)
    }
}

impl From<dogmove::ComputeError> for DogmoveCliError {
    fn from(e: dogmove::ComputeError) -> Self {
        DogmoveCliError::Compute(e)
    }
}

impl From<serde_json::Error> for DogmoveCliError {
    fn from(e: serde_json::Error) -> Self {
        DogmoveCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<DogmoveCliError> for CliError {
    fn from(e: DogmoveCliError) -> Self {
        use dogmove::ComputeError;

        match e {
            DogmoveCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            DogmoveCliError::Compute(ComputeError::DataLoad(e)) => CliError {
                code: "DATA_LOAD_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'dogmove validate' for details".to_string()),
            },
            DogmoveCliError::Compute(ComputeError::InvalidBehavior(e)) => CliError {
                code: "INVALID_BEHAVIOR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'dogmove behaviors --gait' to list gait behaviors".to_string()),
            },
            DogmoveCliError::Compute(ComputeError::UnknownSubjectTrial(id)) => CliError {
                code: "UNKNOWN_SUBJECT_TRIAL".to_string(),
                message: format!("Unknown SubjectTrialID: {id}"),
                hint: Some("Run 'dogmove subjects' to list SubjectTrialIDs".to_string()),
            },
            DogmoveCliError::Compute(ComputeError::UnknownColumn(name)) => CliError {
                code: "UNKNOWN_COLUMN".to_string(),
                message: format!("Unknown signal column: {name}"),
                hint: Some(format!(
                    "Valid columns: {}",
                    SignalColumn::ALL
                        .iter()
                        .map(|c| c.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            },
            DogmoveCliError::Compute(ComputeError::ConfigError(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check the --config file".to_string()),
            },
            DogmoveCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            DogmoveCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            DogmoveCliError::DistanceOutOfRange { distance, max } => CliError {
                code: "DISTANCE_OUT_OF_RANGE".to_string(),
                message: format!("Distance {distance} exceeds the maximum of {max}"),
                hint: Some(format!("Choose a distance between 0 and {max}")),
            },
            DogmoveCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            DogmoveCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct GaitBehavior {
    label: String,
    gait: Gait,
    suggested_distance: usize,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
