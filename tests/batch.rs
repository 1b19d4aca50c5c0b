//! Directory runs over the checked-in fixtures and generated samples

mod common;

use std::fs;

use common::fixtures::{copy_fixtures, load_fixture};
use paramdup::{run, BatchConfig, ExecutionMode, RunMetrics, SelectionPolicy};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[test]
fn test_fixture_tree_with_broken_file() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    copy_fixtures("", input.path());

    let metrics = run(&BatchConfig::new(input.path(), output.path())).unwrap();
    assert_eq!(
        metrics,
        RunMetrics {
            files_processed: 2,
            files_failed: 1,
            declarations_processed: 5,
            declarations_skipped: 4,
            parameters_duplicated: 5,
        }
    );

    let stock = fs::read_to_string(output.path().join("Shop").join("Stock.cs")).unwrap();
    assert_eq!(stock, load_fixture("Shop/Stock.cs.expected"));
    assert!(output.path().join("Shop").join("Orders").join("Order.cs").exists());
    assert!(!output.path().join("Broken.cs").exists());
}

#[test]
fn test_generated_samples_sequential_and_concurrent() {
    let input = TempDir::new().unwrap();
    for i in 0..8 {
        let dir = input.path().join(format!("batch{}", i % 2));
        fs::create_dir_all(&dir).unwrap();
        paramdup_samples::write_sample(&dir, &format!("Sample{}", i)).unwrap();
    }

    let sequential_out = TempDir::new().unwrap();
    let concurrent_out = TempDir::new().unwrap();
    let sequential = run(&BatchConfig::new(input.path(), sequential_out.path())
        .with_mode(ExecutionMode::Sequential))
    .unwrap();
    let concurrent = run(&BatchConfig::new(input.path(), concurrent_out.path()).with_workers(3)).unwrap();

    assert_eq!(sequential, concurrent);
    assert_eq!(sequential.files_processed, 8);
    assert_eq!(sequential.declarations_processed, 8 * 144);
    assert_eq!(sequential.parameters_duplicated, 8 * 144);

    for i in 0..8 {
        let relative = format!("batch{}/Sample{}.cs", i % 2, i);
        let a = fs::read(sequential_out.path().join(&relative)).unwrap();
        let b = fs::read(concurrent_out.path().join(&relative)).unwrap();
        assert_eq!(a, b, "{}", relative);
    }
}

#[test]
fn test_all_policy_counts_every_parameter() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    copy_fixtures("Shop", input.path());

    let metrics = run(&BatchConfig::new(input.path(), output.path()).with_policy(SelectionPolicy::All)).unwrap();
    // Stock: Add, Has, Move (2), Record; Order: Add, AddMany, TryFind (2)
    assert_eq!(metrics.declarations_processed, 7);
    assert_eq!(metrics.declarations_skipped, 2);
    assert_eq!(metrics.parameters_duplicated, 9);
}
