//! Command-line anonymizer
//!
//! Runs an anonymizer script against XML files, checks scripts, evaluates
//! single expressions and lists the script functions.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ctp_anonymizer::registry::AnonymizerFunction;
use ctp_anonymizer::{
    Anonymizer, AnonymizerConfig, Document, Script, Status, UnknownFunctionPolicy, canonicalize,
    create_standard_registry,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "ctp-anonymize")]
#[command(about = "Script-driven anonymizer for clinical XML documents")]
#[command(version)]
struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Anonymize an XML file
    Anonymize {
        /// XML file to anonymize
        input: PathBuf,
        /// Anonymizer script
        #[arg(short, long)]
        script: PathBuf,
        /// Where to write the anonymized document
        #[arg(short, long)]
        output: PathBuf,
        /// Directory receiving a copy of the input when it is quarantined
        #[arg(short, long)]
        quarantine_dir: Option<PathBuf>,
        /// Lookup table for $lookup (properties or CSV)
        #[arg(short, long)]
        lookup: Option<PathBuf>,
        /// Key type prepended to bare keys of a CSV lookup table
        #[arg(long)]
        lookup_key_type: Option<String>,
        /// Ignore calls to unknown functions instead of quarantining
        #[arg(long)]
        ignore_unknown_functions: bool,
    },
    /// Parse a script and print its commands in canonical form
    Check {
        /// Anonymizer script
        script: PathBuf,
        /// Print only OK or the error
        #[arg(short, long)]
        quiet: bool,
    },
    /// Evaluate one expression against an XML document
    Eval {
        /// Expression, as written on the right of a command
        expression: String,
        /// XML document that path references resolve against
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Value of `this`
        #[arg(short, long, default_value = "")]
        this: String,
    },
    /// List the script functions with their parameters
    Functions {
        /// Show only this function, with or without the leading `$`
        name: Option<String>,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnonymizerConfig> {
    match path {
        Some(path) => AnonymizerConfig::from_json_file(path)
            .with_context(|| format!("reading configuration {}", path.display())),
        None => Ok(AnonymizerConfig::default()),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Anonymize {
            input,
            script,
            output,
            quarantine_dir,
            lookup,
            lookup_key_type,
            ignore_unknown_functions,
        } => {
            if quarantine_dir.is_some() {
                config.quarantine_dir = quarantine_dir;
            }
            if lookup.is_some() {
                config.lookup_table = lookup;
            }
            if lookup_key_type.is_some() {
                config.lookup_default_key_type = lookup_key_type;
            }
            if ignore_unknown_functions {
                config.unknown_functions = UnknownFunctionPolicy::Ignore;
            }
            handle_anonymize(&input, &script, &output, config)
        }
        Commands::Check { script, quiet } => handle_check(&script, quiet, &config),
        Commands::Eval {
            expression,
            file,
            this,
        } => handle_eval(&expression, file.as_deref(), &this, config),
        Commands::Functions { name } => handle_functions(name.as_deref()),
    }
}

fn handle_anonymize(input: &Path, script: &Path, output: &Path, config: AnonymizerConfig) -> Result<i32> {
    let script = Script::from_file(script, &config)
        .with_context(|| format!("loading script {}", script.display()))?;
    let quarantine_dir = config.quarantine_dir.clone();
    let anonymizer = Anonymizer::from_config(script, config).context("opening lookup table")?;

    let status = anonymizer.anonymize_file(input, output);
    println!("{status}");
    match status {
        Status::Ok | Status::Skip(_) => Ok(0),
        Status::Quarantine(_) => {
            if let Some(dir) = quarantine_dir {
                let copy = quarantine(input, &dir)?;
                eprintln!("Quarantined {} to {}", input.display(), copy.display());
            }
            Ok(2)
        }
    }
}

fn quarantine(input: &Path, dir: &Path) -> Result<PathBuf> {
    let Some(name) = input.file_name() else {
        bail!("input {} has no file name", input.display());
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let target = dir.join(name);
    fs::copy(input, &target).with_context(|| format!("copying to {}", target.display()))?;
    Ok(target)
}

fn handle_check(path: &Path, quiet: bool, config: &AnonymizerConfig) -> Result<i32> {
    let script = Script::from_file(path, config)
        .with_context(|| format!("checking script {}", path.display()))?;
    if quiet {
        println!("OK");
        return Ok(0);
    }
    let text = fs::read_to_string(path)?;
    print!("{}", canonicalize(&text)?);
    let comments = script.commands().iter().filter(|c| c.is_comment()).count();
    eprintln!("{} commands ({comments} comments)", script.len());
    Ok(0)
}

fn handle_eval(expression: &str, file: Option<&Path>, this: &str, config: AnonymizerConfig) -> Result<i32> {
    let document = match file {
        Some(path) => {
            let xml = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            Document::parse(&xml)?
        }
        None => Document::new(),
    };
    let anonymizer = Anonymizer::from_config(Script::default(), config)?;
    println!("{}", anonymizer.evaluate(&document, expression, this)?);
    Ok(0)
}

fn handle_functions(name: Option<&str>) -> Result<i32> {
    let registry = create_standard_registry();
    let wanted = name.map(|n| format!("${}", n.trim_start_matches('$')));
    let functions: Vec<_> = registry
        .functions()
        .into_iter()
        .filter(|f| wanted.as_deref().is_none_or(|w| f.name() == w))
        .collect();
    if functions.is_empty() {
        bail!("unknown function {}", wanted.unwrap_or_default());
    }
    for function in functions {
        print_function(function.as_ref());
    }
    Ok(0)
}

fn print_function(function: &dyn AnonymizerFunction) {
    let purity = if function.is_pure() { "pure" } else { "impure" };
    println!("{} - {} ({purity})", function.signature(), function.human_friendly_name());
    for param in &function.signature().parameters {
        let optional = if param.optional { ", optional" } else { "" };
        println!("    {}: {}{optional}", param.name, param.kind);
    }
    println!("    {}", function.documentation());
}
