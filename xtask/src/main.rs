use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

const MACHINES_DIR: &str = "machines";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tasks for devcore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format check, clippy, every test scope and the machine smoke run
    Ci {
        /// Run every step and report all failures at the end
        #[arg(long)]
        keep_going: bool,
    },
    /// Run tests, optionally limited to one or more scopes
    Test {
        #[arg(value_enum)]
        scopes: Vec<Scope>,
        #[arg(long)]
        ignored: bool,
    },
    /// Start and stop every machine description under machines/
    Machines,
    /// Run criterion benchmarks, optionally one group
    Bench {
        #[arg(value_enum)]
        group: Option<BenchGroup>,
    },
    /// Run the CLI on a machine description
    Run {
        #[arg(default_value = "machines/usgames.toml")]
        machine: PathBuf,
        #[arg(short = 'r', long, default_value = "0")]
        resets: u32,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        release: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    /// Registry, lifecycle and query protocol
    Device,
    /// Reference device types
    Devices,
    /// Machine hooks, descriptions and listings
    Machine,
    /// tests/ directory
    Integration,
    Doc,
}

impl Scope {
    const ALL: [Scope; 5] = [
        Scope::Device,
        Scope::Devices,
        Scope::Machine,
        Scope::Integration,
        Scope::Doc,
    ];

    fn label(self) -> &'static str {
        match self {
            Scope::Device => "device layer",
            Scope::Devices => "reference devices",
            Scope::Machine => "machine",
            Scope::Integration => "integration",
            Scope::Doc => "doc",
        }
    }

    fn cargo_args(self) -> Vec<&'static str> {
        match self {
            // Trailing separators keep `core::device::` from matching `core::devices::`
            Scope::Device => vec!["test", "--lib", "core::device::"],
            Scope::Devices => vec!["test", "--lib", "core::devices::"],
            Scope::Machine => vec!["test", "--lib", "core::machine::"],
            Scope::Integration => vec!["test", "--test", "integration_test"],
            Scope::Doc => vec!["test", "--doc"],
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BenchGroup {
    Registry,
    Info,
    Startup,
}

impl BenchGroup {
    fn filter(self) -> &'static str {
        match self {
            BenchGroup::Registry => "registry",
            BenchGroup::Info => "info",
            BenchGroup::Startup => "startup",
        }
    }
}

/// One named cargo invocation
struct Step {
    name: String,
    args: Vec<String>,
}

impl Step {
    fn new(name: impl Into<String>, args: &[&str]) -> Self {
        Self {
            name: name.into(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn with_arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_owned());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("cargo");
        cmd.args(&self.args);
        cmd
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { keep_going } => run_ci(keep_going),
        Commands::Test { scopes, ignored } => {
            let scopes = if scopes.is_empty() {
                Scope::ALL.to_vec()
            } else {
                scopes
            };
            run_steps("Tests", test_steps(&scopes, ignored), true)
        }
        Commands::Machines => check_machines(),
        Commands::Bench { group } => {
            let mut step = Step::new("bench", &["bench", "--bench", "device_bench"]);
            if let Some(group) = group {
                step = step.with_arg("--").with_arg(group.filter());
            }
            run_steps("Benchmarks", vec![step], false)
        }
        Commands::Run {
            machine,
            resets,
            json,
            release,
        } => run_machine(&machine, resets, json, release),
    }
}

fn test_steps(scopes: &[Scope], ignored: bool) -> Vec<Step> {
    scopes
        .iter()
        .map(|scope| {
            let step = Step::new(format!("test {}", scope.label()), &scope.cargo_args());
            if ignored {
                step.with_arg("--").with_arg("--ignored")
            } else {
                step
            }
        })
        .collect()
}

fn run_ci(keep_going: bool) -> Result<()> {
    let mut steps = vec![
        Step::new("fmt", &["fmt", "--all", "--", "--check"]),
        Step::new(
            "clippy",
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        ),
    ];
    steps.extend(test_steps(&Scope::ALL, false));

    run_steps("CI", steps, !keep_going)?;
    check_machines()
}

/// Run steps in order, printing one status line per step
///
/// With `fail_fast` the first failure aborts; otherwise every step runs and
/// the failed step names are reported together.
fn run_steps(title: &str, steps: Vec<Step>, fail_fast: bool) -> Result<()> {
    println!("{}", format!("=== {} ===", title).bold().blue());

    let start = Instant::now();
    let mut failed = Vec::new();

    for step in &steps {
        println!("{} {}", "→".blue(), step.name.bold());
        let step_start = Instant::now();

        match execute(&mut step.command()) {
            Ok(()) => println!(
                "{} {} ({:.2}s)\n",
                "✓".green(),
                step.name,
                step_start.elapsed().as_secs_f64()
            ),
            Err(e) => {
                println!("{} {}: {}\n", "✗".red().bold(), step.name, e);
                if fail_fast {
                    return Err(e.context(format!("step `{}` failed", step.name)));
                }
                failed.push(step.name.as_str());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} of {} steps failed: {}", failed.len(), steps.len(), failed.join(", "));
    }

    println!(
        "{} {} passed in {:.2}s",
        "✓".green().bold(),
        title,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn machine_files() -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(MACHINES_DIR)
        .with_context(|| format!("reading {}/", MACHINES_DIR))?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();
    Ok(files)
}

/// Build the CLI once, then start and stop each machine with one reset
fn check_machines() -> Result<()> {
    let files = machine_files()?;
    if files.is_empty() {
        anyhow::bail!("no machine descriptions under {}/", MACHINES_DIR);
    }

    run_steps(
        "Machine smoke run",
        vec![Step::new("build devcore", &["build", "--bin", "devcore"])],
        true,
    )?;

    let binary = Path::new("target")
        .join("debug")
        .join(format!("devcore{}", std::env::consts::EXE_SUFFIX));
    let mut failed = 0;

    for file in &files {
        let mut cmd = Command::new(&binary);
        cmd.arg(file).args(["--resets", "1", "--quiet"]);

        let output = cmd.stderr(Stdio::inherit()).output()?;
        if output.status.success() {
            println!("{} {}", "✓".green(), file.display());
        } else {
            println!("{} {} ({})", "✗".red().bold(), file.display(), output.status);
            failed += 1;
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} machines failed to start", failed, files.len());
    }
    Ok(())
}

fn run_machine(machine: &Path, resets: u32, json: bool, release: bool) -> Result<()> {
    if !machine.exists() {
        println!(
            "{} Machine description not found: {}",
            "✗".red().bold(),
            machine.display().to_string().yellow()
        );
        if let Ok(files) = machine_files() {
            for file in files {
                println!("  {}", file.display());
            }
        }
        anyhow::bail!("Machine description not found");
    }

    let mut cmd = Command::new("cargo");
    cmd.args(["run", "--bin", "devcore"]);
    if release {
        cmd.arg("--release");
    }
    cmd.arg("--")
        .arg(machine)
        .args(["--resets", &resets.to_string()]);
    if json {
        cmd.arg("--json");
    }

    execute(&mut cmd)
}

fn execute(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("spawning {:?}", cmd.get_program()))?;

    if !status.success() {
        anyhow::bail!("exited with {}", status);
    }
    Ok(())
}
