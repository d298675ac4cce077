//! End-to-end integration tests
//!
//! Each fixture under tests/fixtures/ holds an operation file (input.csv)
//! and the CSV report it must produce (expected.csv). A test replays the
//! input through a strategy, writes the report to a temporary file and
//! compares it with the expectation.
//!
//! Every fixture runs with the sequential strategy. Fixtures whose outcome
//! does not depend on the order operations commit in also run with the
//! concurrent strategy.

#[cfg(test)]
mod tests {
    use coin_ledger::cli::{OutputFormat, StrategyType};
    use coin_ledger::core::CoinEngine;
    use coin_ledger::strategy::{create_strategy, write_report, BatchConfig, RetryPolicy};
    use rstest::rstest;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn replay(input_path: &Path, strategy_type: StrategyType) -> CoinEngine {
        let strategy = create_strategy(
            strategy_type,
            Some(BatchConfig::new(1000, 4)),
            RetryPolicy::fixed(1_000, Duration::from_millis(1)),
        );
        let engine = CoinEngine::default();
        strategy
            .process(&engine, input_path)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));
        engine
    }

    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        let engine = replay(Path::new(&input_path), strategy_type);

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");
        write_report(&engine, OutputFormat::Csv, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to write report: {}", e));
        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("happy_path")]
    #[case("invalid_operations")]
    #[case("malformed_data")]
    #[case("repeat_purchases")]
    #[case("circular_transfers")]
    #[case("reauthentication")]
    fn test_order_independent_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy);
    }

    #[rstest]
    #[case("insufficient_funds")]
    fn test_sequential_fixtures(#[case] fixture: &str) {
        run_test_fixture(fixture, StrategyType::Sync);
    }

    #[test]
    fn test_json_report_matches_csv_report() {
        let engine = replay(
            Path::new("tests/fixtures/happy_path/input.csv"),
            StrategyType::Sync,
        );

        let mut output = Vec::new();
        write_report(&engine, OutputFormat::Json, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["account"], "alice");
        assert_eq!(lines[0]["coins"], 860);
        assert_eq!(
            lines[0]["inventory"],
            serde_json::json!([
                {"type": "pen", "quantity": 1},
                {"type": "t-shirt", "quantity": 1}
            ])
        );
        assert_eq!(
            lines[0]["coinHistory"],
            serde_json::json!({
                "received": [{"fromUser": "bob", "amount": 50}],
                "sent": [{"toUser": "bob", "amount": 100}]
            })
        );
        assert_eq!(lines[1]["account"], "bob");
        assert_eq!(lines[1]["coins"], 1030);
    }

    #[test]
    fn test_missing_input_fails_both_strategies() {
        for strategy_type in [StrategyType::Sync, StrategyType::Async] {
            let strategy = create_strategy(strategy_type, None, RetryPolicy::default());
            let engine = CoinEngine::default();
            let result = strategy.process(&engine, Path::new("tests/fixtures/missing/input.csv"));
            assert!(result.is_err());
        }
    }
}
