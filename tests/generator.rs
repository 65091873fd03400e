//! End-to-end runs of the generator against a temporary output directory.

use std::fs;
use std::path::Path;

use tetrofill::duplicates::{find_duplicates, KeyMode};
use tetrofill::grid::validate_solution;
use tetrofill::pieces::num_empty_tiles;
use tetrofill::pieces::PieceKind::{I, J, L, O};
use tetrofill::solver::{solve, SearchLimits};
use tetrofill::symmetry::SymmetryBreaker;
use tetrofill::{persistence, progress, runner, Runner, SearchConfig, SearchStatus};

fn config(output: &Path, grid_size: usize) -> SearchConfig {
    SearchConfig {
        grid_size,
        combinations: 4,
        max_solutions: 3,
        time_budget_ms: Some(5_000),
        seed: "integration".to_string(),
        output: output.to_path_buf(),
        ..SearchConfig::default()
    }
}

#[test]
fn four_by_four_run_produces_valid_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = SearchConfig {
        time_budget_ms: None,
        max_solutions: 100,
        ..config(dir.path(), 4)
    };

    let summary = runner::run(config.clone()).unwrap();
    assert_eq!(summary.searched, 4);

    let solutions = persistence::load_all(&config.solutions_dir()).unwrap();
    assert_eq!(solutions.len(), summary.solutions_written);
    for (path, solution) in &solutions {
        assert_eq!(validate_solution(solution, 4), Ok(()), "{}", path.display());
        assert_eq!(solution.len(), 4);
    }

    let report = find_duplicates(&config.solutions_dir(), 4, KeyMode::Exact).unwrap();
    assert!(!report.has_duplicates(), "{report:?}");
}

#[test]
fn five_by_five_solutions_carry_one_sentinel() {
    let dir = tempfile::tempdir().unwrap();
    let config = SearchConfig {
        combinations: 2,
        ..config(dir.path(), 5)
    };

    let reports = std::sync::Mutex::new(Vec::new());
    let summary = Runner::new(config.clone())
        .unwrap()
        .run(&|report| reports.lock().unwrap().push(report.status))
        .unwrap();
    assert_eq!(summary.searched, 2);
    for status in reports.into_inner().unwrap() {
        assert_ne!(status, SearchStatus::Searching);
        assert_ne!(status, SearchStatus::Idle);
    }

    for (path, solution) in persistence::load_all(&config.solutions_dir()).unwrap() {
        assert_eq!(validate_solution(&solution, 5), Ok(()), "{}", path.display());
        let sentinels = solution.iter().filter(|p| p.is_empty_cell()).count();
        assert_eq!(sentinels, num_empty_tiles(5));
    }
}

#[test]
fn interrupted_run_resumes_from_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let small = SearchConfig {
        combinations: 2,
        ..config(dir.path(), 4)
    };
    let first = runner::run(small).unwrap();
    let files_after_first = persistence::count(&config(dir.path(), 4).solutions_dir()).unwrap();

    let second = runner::run(config(dir.path(), 4)).unwrap();
    assert_eq!(second.skipped, 2);
    assert_eq!(second.searched, 2);
    assert_eq!(
        second.total_solutions,
        first.total_solutions + second.solutions_written as u64
    );

    let files = persistence::solution_files(&config(dir.path(), 4).solutions_dir()).unwrap();
    assert_eq!(files.len(), files_after_first + second.solutions_written);
    let indices: Vec<usize> = files.iter().map(|(index, _)| *index).collect();
    assert_eq!(indices, (0..files.len()).collect::<Vec<_>>());

    let state = progress::load(&config(dir.path(), 4).checkpoint_path());
    assert_eq!(state.completed_combos.len(), 4);
    assert_eq!(state.total_solutions, second.total_solutions);
}

#[test]
fn corrupt_checkpoint_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 4);
    let checkpoint = config.checkpoint_path();
    fs::create_dir_all(checkpoint.parent().unwrap()).unwrap();
    fs::write(&checkpoint, "not json at all").unwrap();

    let summary = runner::run(config.clone()).unwrap();
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.searched, 4);

    let state = progress::load(&checkpoint);
    assert_eq!(state.completed_combos.len(), 4);
}

#[test]
fn duplicate_checker_flags_copied_file() {
    let dir = tempfile::tempdir().unwrap();
    let solutions_dir = dir.path().join("4x4").join("pieces");
    let report = solve(4, &[I, O, L, J], SymmetryBreaker::disabled(), SearchLimits::default()).unwrap();
    assert_eq!(report.solutions.len(), 4);
    persistence::save_all(&solutions_dir, &report.solutions).unwrap();

    assert!(!find_duplicates(&solutions_dir, 4, KeyMode::Exact)
        .unwrap()
        .has_duplicates());
    // the four tilings form two pairs related by a board symmetry
    let symmetric = find_duplicates(&solutions_dir, 4, KeyMode::Symmetric).unwrap();
    assert_eq!(symmetric.groups.len(), 2);
    assert_eq!(symmetric.redundant_files(), 2);

    fs::copy(solutions_dir.join("0.json"), solutions_dir.join("4.json")).unwrap();
    let report = find_duplicates(&solutions_dir, 4, KeyMode::Exact).unwrap();
    assert_eq!(report.files_checked, 5);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(
        report.groups[0].files,
        vec![solutions_dir.join("0.json"), solutions_dir.join("4.json")]
    );
    // the checker never touches the files
    assert_eq!(persistence::count(&solutions_dir).unwrap(), 5);
}
