use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tmrun::{
    ExecutionSettings, Executor, MachineConfiguration, MachineDefinition, ProgramLoader,
    ProgramManager, Settings,
};
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Runs a declaratively defined Turing machine and prints every step.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmrun-cli --definition machines/busy-beaver-2.json
  tmrun-cli --builtin 'Binary increment' --tape 1,1,1 --json
  tmrun-cli --list --directory machines
  RUST_LOG=tmrun=trace tmrun-cli --settings settings.json")]
struct Cli {
    /// The machine definition file (.json, .yaml or .yml) to execute
    #[clap(short, long, conflicts_with = "builtin")]
    definition: Option<PathBuf>,

    /// The name of a bundled machine to execute
    #[clap(short, long)]
    builtin: Option<String>,

    /// A settings file (.json, .yaml or .yml); flags below override its executor section
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Pause between steps, in milliseconds
    #[clap(long, allow_negative_numbers = true)]
    delay: Option<i64>,

    /// The initial tape as comma separated symbols
    #[clap(short, long, value_delimiter = ',')]
    tape: Option<Vec<String>>,

    /// The initial head index
    #[clap(short, long, allow_negative_numbers = true)]
    index: Option<i64>,

    /// Stop with an error after this many steps
    #[clap(long)]
    max_steps: Option<u64>,

    /// Print each step as a JSON object
    #[clap(long)]
    json: bool,

    /// Only print the final tape
    #[clap(short, long)]
    quiet: bool,

    /// List the bundled machines and exit
    #[clap(short, long)]
    list: bool,

    /// With --list, list the definition files in this directory instead
    #[clap(long, requires = "list")]
    directory: Option<PathBuf>,
}

fn main() {
    init_logging();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Reads `RUST_LOG`, defaulting to `warn`. Logs go to stderr so stdout only carries steps.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        match &cli.directory {
            Some(directory) => {
                for line in definition_lines(directory) {
                    println!("{}", line);
                }
            }
            None => list_programs()?,
        }
        return Ok(());
    }

    let mut settings = match &cli.settings {
        Some(path) => ProgramLoader::load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    apply_overrides(&cli, &mut settings);

    let definition = load_definition(&cli, &settings)?;
    let config = MachineConfiguration::build(&definition, &settings.executor)
        .with_context(|| format!("invalid machine definition '{}'", definition.name))?;
    let mut executor = Executor::from_configuration(Arc::new(config))
        .context("failed to initialize the machine")?;

    if !cli.quiet {
        render(&executor, cli.json);
    }

    let result = executor.run_with(
        |_| {},
        |executor| {
            if !cli.quiet {
                render(executor, cli.json);
            }
        },
    );

    if !cli.quiet {
        println!("\nFinal tape:");
    }
    println!("{}", executor.tape().join(" "));

    result.context("machine stopped with an error")
}

fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    let executor = &mut settings.executor;

    if let Some(delay) = cli.delay {
        executor.execution_delay_ms = delay;
    }
    if let Some(tape) = &cli.tape {
        executor.initial_tape = Some(tape.clone());
    }
    if let Some(index) = cli.index {
        executor.initial_index = index;
    }
    if let Some(max_steps) = cli.max_steps {
        executor.max_steps = Some(max_steps);
    }
}

fn load_definition(cli: &Cli, settings: &Settings) -> Result<MachineDefinition> {
    if let Some(path) = &cli.definition {
        return ProgramLoader::load_definition(path)
            .with_context(|| format!("failed to load definition from {}", path.display()));
    }

    if let Some(name) = &cli.builtin {
        return ProgramManager::get_program_by_name(name)
            .context("use --list to see the bundled machines");
    }

    match &settings.general.definition_file {
        Some(path) => ProgramLoader::load_definition(path)
            .with_context(|| format!("failed to load definition from {}", path.display())),
        None => bail!("no machine given, pass --definition, --builtin or a settings file"),
    }
}

fn list_programs() -> Result<()> {
    for index in 0..ProgramManager::get_program_count() {
        let info = ProgramManager::get_program_info(index)?;
        println!(
            "{:>2}. {} (initial: {}, states: {}, actions: {})",
            info.index, info.name, info.initial_state, info.state_count, info.action_count
        );
    }

    Ok(())
}

/// One line per definition file found in `directory`, marking the ones that fail to
/// load or validate.
fn definition_lines(directory: &Path) -> Vec<String> {
    let mut lines: Vec<(Option<PathBuf>, String)> = ProgramLoader::load_definitions(directory)
        .into_iter()
        .map(|result| match result {
            Ok((path, definition)) => {
                let status =
                    match MachineConfiguration::build(&definition, &ExecutionSettings::default()) {
                        Ok(config) => format!("states: {}", config.states().len()),
                        Err(e) => format!("invalid: {}", e),
                    };
                let line = format!("{} ({}, {})", definition.name, path.display(), status);
                (Some(path), line)
            }
            Err(e) => {
                warn!(error = %e, "skipping definition");
                (None, format!("error: {}", e))
            }
        })
        .collect();

    lines.sort();
    lines.into_iter().map(|(_, line)| line).collect()
}

fn render(executor: &Executor, json: bool) {
    let snapshot = executor.to_display();

    if json {
        match serde_json::to_string(&snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "failed to serialize snapshot"),
        }
    } else {
        println!("{}", snapshot);
    }
}
