//! Tetromino Tiling Generator
//!
//! Searches seeded piece combinations for exact tilings of a square grid and
//! writes each distinct tiling as a JSON placement list for the puzzle
//! board to load. Runs are checkpointed and resume where they stopped.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use tetrofill::duplicates::{self, KeyMode};
use tetrofill::grid::{format_solution, validate_solution};
use tetrofill::{persistence, progress, Runner, SearchConfig};

/// Generates tetromino tilings of square grids.
#[derive(Parser)]
#[command(name = "tetrofill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search piece combinations and save new solutions to disk.
    Solve(SolveArgs),
    /// Report solution files that encode the same tiling.
    CheckDuplicates {
        #[command(flatten)]
        location: Location,
        /// Also treat rotated and reflected tilings as duplicates.
        #[arg(long)]
        symmetric: bool,
    },
    /// Check that every saved solution tiles its grid.
    Verify {
        #[command(flatten)]
        location: Location,
    },
    /// Show the number of saved solutions and checkpoint totals.
    Count {
        #[command(flatten)]
        location: Location,
    },
    /// Print one saved solution as text.
    Show {
        #[command(flatten)]
        location: Location,
        /// Index of the solution file.
        index: usize,
    },
}

/// Where the solutions for one grid size live.
#[derive(Args)]
struct Location {
    #[arg(short, long, default_value_t = 5)]
    grid_size: usize,
    #[arg(short, long, default_value = "solutions")]
    output: PathBuf,
    #[arg(long, default_value = "pieces")]
    category: String,
}

impl Location {
    fn solutions_dir(&self) -> PathBuf {
        persistence::category_dir(&self.output, self.grid_size, &self.category)
    }
}

/// Overrides for the run configuration; unset flags keep the config file's
/// value or the default.
#[derive(Args)]
struct SolveArgs {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    grid_size: Option<usize>,
    #[arg(long)]
    num_pieces: Option<usize>,
    /// Number of distinct piece combinations to search.
    #[arg(short, long)]
    combinations: Option<usize>,
    /// Solution cap per combination.
    #[arg(long)]
    max_solutions: Option<usize>,
    /// Time budget per combination in seconds.
    #[arg(long, conflicts_with = "no_time_limit")]
    time_budget: Option<f64>,
    /// Search each combination until exhausted or capped.
    #[arg(long)]
    no_time_limit: bool,
    #[arg(long)]
    seed: Option<String>,
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    category: Option<String>,
    /// Disable the symmetry-breaking position filters.
    #[arg(long)]
    no_symmetry: bool,
    #[arg(long)]
    max_attempts: Option<usize>,
    #[arg(short, long)]
    workers: Option<usize>,
}

impl SolveArgs {
    fn into_config(self) -> anyhow::Result<SearchConfig> {
        let mut config = match &self.config {
            Some(path) => SearchConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SearchConfig::default(),
        };

        if let Some(grid_size) = self.grid_size {
            config.grid_size = grid_size;
        }
        if self.num_pieces.is_some() {
            config.num_pieces = self.num_pieces;
        }
        if let Some(combinations) = self.combinations {
            config.combinations = combinations;
        }
        if let Some(max_solutions) = self.max_solutions {
            config.max_solutions = max_solutions;
        }
        if let Some(seconds) = self.time_budget {
            let budget = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid time budget {seconds}"))?;
            let millis = u64::try_from(budget.as_millis())
                .with_context(|| format!("time budget {seconds} is too large"))?;
            config.time_budget_ms = Some(millis);
        }
        if self.no_time_limit {
            config.time_budget_ms = None;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(category) = self.category {
            config.category = category;
        }
        if self.no_symmetry {
            config.symmetry_breaking = false;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Solve(args) => run_solver(args.into_config()?),
        Command::CheckDuplicates {
            location,
            symmetric,
        } => run_check_duplicates(&location, symmetric),
        Command::Verify { location } => run_verify(&location),
        Command::Count { location } => run_count(&location),
        Command::Show { location, index } => run_show(&location, index),
    }
}

/// Runs the generator with a progress bar over pending combinations.
fn run_solver(config: SearchConfig) -> anyhow::Result<ExitCode> {
    let runner = Runner::new(config).context("preparing run")?;
    let bar = ProgressBar::new(runner.pending().len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] Combinations: [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let summary = runner.run(&|report| {
        bar.set_message(format!("{}: {}", report.combination, report.files.len()));
        bar.inc(1);
    });
    bar.finish_and_clear();
    let summary = summary.context("running search")?;

    println!(
        "Searched {} combinations ({} skipped), wrote {} solutions, {} in total",
        summary.searched, summary.skipped, summary.solutions_written, summary.total_solutions
    );
    Ok(ExitCode::SUCCESS)
}

/// Prints groups of duplicate files; fails if any exist.
fn run_check_duplicates(location: &Location, symmetric: bool) -> anyhow::Result<ExitCode> {
    let mode = if symmetric {
        KeyMode::Symmetric
    } else {
        KeyMode::Exact
    };
    let dir = location.solutions_dir();
    let report = duplicates::find_duplicates(&dir, location.grid_size, mode)
        .with_context(|| format!("checking {}", dir.display()))?;

    if !report.has_duplicates() {
        println!("{} files, no duplicates", report.files_checked);
        return Ok(ExitCode::SUCCESS);
    }

    for group in &report.groups {
        let names: Vec<String> = group
            .files
            .iter()
            .map(|path| file_name(path))
            .collect();
        println!("{}", names.join(", "));
    }
    println!(
        "{} files, {} duplicate groups, {} redundant files",
        report.files_checked,
        report.groups.len(),
        report.redundant_files()
    );
    Ok(ExitCode::FAILURE)
}

/// Validates every saved solution; fails if any is invalid.
fn run_verify(location: &Location) -> anyhow::Result<ExitCode> {
    let dir = location.solutions_dir();
    let solutions =
        persistence::load_all(&dir).with_context(|| format!("loading {}", dir.display()))?;

    let mut invalid = 0;
    for (path, solution) in &solutions {
        if let Err(err) = validate_solution(solution, location.grid_size) {
            invalid += 1;
            println!("{}: {err}", file_name(path));
        }
    }

    println!("{} solutions, {invalid} invalid", solutions.len());
    Ok(if invalid == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Prints the count of saved solutions.
fn run_count(location: &Location) -> anyhow::Result<ExitCode> {
    let dir = location.solutions_dir();
    let files = persistence::count(&dir).with_context(|| format!("counting {}", dir.display()))?;
    let checkpoint = persistence::checkpoint_path(&location.output, location.grid_size);
    let state = progress::load(&checkpoint);

    println!("{files} solution files");
    println!(
        "{} combinations completed, {} solutions recorded, last run {}",
        state.completed_combos.len(),
        state.total_solutions,
        state.last_run
    );
    Ok(ExitCode::SUCCESS)
}

fn run_show(location: &Location, index: usize) -> anyhow::Result<ExitCode> {
    let path = location.solutions_dir().join(format!("{index}.json"));
    if !path.exists() {
        bail!("no solution file {}", path.display());
    }
    let solution = persistence::load_solution(&path)?;
    print!("{}", format_solution(&solution, location.grid_size));
    if let Err(err) = validate_solution(&solution, location.grid_size) {
        eprintln!("warning: {err}");
    }
    Ok(ExitCode::SUCCESS)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
