// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use super::*;
use crate::coverage::Metric;
use crate::test_utils::{create_tree, temp_project_with_config};

fn parse_str(content: &str) -> Config {
    parse(content, Path::new("testgate.toml")).unwrap()
}

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn empty_config_uses_defaults() {
    let config = parse_str("");
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.roots, vec!["<rootDir>"]);
    assert_eq!(config.test_timeout, 5000);
    assert!(!config.collect_coverage);
    assert!(config.coverage_threshold.global.is_empty());
    assert_eq!(config.runner.command, vec!["node", "{unit}"]);
}

#[test]
fn accepts_camel_case_aliases() {
    let config = parse_str(
        r#"
roots = ["<rootDir>/src", "<rootDir>/tests"]
testMatch = ["**/*.test.ts"]
collectCoverage = true
coverageDirectory = "coverage"

[[moduleNameMapper]]
pattern = "^@/(.*)$"
target = "<rootDir>/src/$1"

[coverageThreshold.global]
branches = 80
functions = 80
lines = 80
statements = 80
"#,
    );

    assert_eq!(config.test_match, vec!["**/*.test.ts"]);
    assert!(config.collect_coverage);
    assert_eq!(config.module_name_mapper.len(), 1);
    for metric in Metric::ALL {
        assert_eq!(config.coverage_threshold.global.minimum(metric), Some(80.0));
    }
}

#[test]
fn mapper_accepts_target_list() {
    let config = parse_str(
        r#"
[[module_name_mapper]]
pattern = "@lib/*"
targets = ["<rootDir>/lib/*", "<rootDir>/vendor/*"]
"#,
    );
    let targets = config.module_name_mapper[0].target.clone().into_vec();
    assert_eq!(targets.len(), 2);
}

#[test]
fn mapper_order_is_preserved() {
    let config = parse_str(
        r#"
[[module_name_mapper]]
pattern = "^@/utils/(.*)$"
target = "a/$1"

[[module_name_mapper]]
pattern = "^@/(.*)$"
target = "b/$1"
"#,
    );
    let patterns: Vec<&str> = config
        .module_name_mapper
        .iter()
        .map(|r| r.pattern.as_str())
        .collect();
    assert_eq!(patterns, vec!["^@/utils/(.*)$", "^@/(.*)$"]);
}

#[test]
fn parse_error_is_config_error() {
    let err = parse("test_timeout = \"soon\"", Path::new("testgate.toml")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("testgate.toml"));
}

// =============================================================================
// ROOT DIRECTORY EXPANSION
// =============================================================================

#[test]
fn expands_root_dir_token_in_roots() {
    let mut config = parse_str("roots = [\"<rootDir>/src\", \"tests\"]");
    config.anchor(Path::new("/project"));

    assert_eq!(
        config.root_paths(),
        vec![PathBuf::from("/project/src"), PathBuf::from("/project/tests")]
    );
}

#[test]
fn relative_root_dir_is_anchored_at_config_dir() {
    let mut config = parse_str("root_dir = \"../app\"");
    config.anchor(Path::new("/work/config"));
    assert_eq!(config.root_dir, PathBuf::from("/work/app"));
}

#[test]
fn coverage_and_cache_dirs_are_absolute() {
    let mut config = parse_str("coverage_directory = \"out/cov\"");
    config.anchor(Path::new("/project"));
    assert_eq!(config.coverage_dir(), PathBuf::from("/project/out/cov"));
    assert_eq!(config.cache_dir(), PathBuf::from("/project/.testgate"));
}

#[test]
fn normalize_collapses_dot_segments() {
    assert_eq!(
        normalize(Path::new("/a/./b/../c")),
        PathBuf::from("/a/c")
    );
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn load_and_validate_minimal_project() {
    let tmp = temp_project_with_config("roots = [\"<rootDir>/src\"]\n");
    create_tree(tmp.path(), &[("src/a.test.js", "")]);

    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    config.validate().unwrap();
    assert!(config.root_dir.is_absolute());
}

#[test]
fn missing_root_is_config_error() {
    let tmp = temp_project_with_config("roots = [\"<rootDir>/nope\"]\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("root directory not found"));
}

#[test]
fn threshold_out_of_range_fails_validation() {
    let tmp = temp_project_with_config("[coverage_threshold.global]\nlines = 120\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    assert!(matches!(config.validate(), Err(Error::Config { .. })));
}

#[test]
fn invalid_glob_fails_validation() {
    let tmp = temp_project_with_config("test_match = [\"**/*.{js\"]\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    assert!(config.validate().unwrap_err().to_string().contains("invalid glob"));
}

#[test]
fn invalid_ignore_regex_fails_validation() {
    let tmp = temp_project_with_config("test_path_ignore_patterns = [\"(unclosed\"]\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    assert!(config.validate().unwrap_err().to_string().contains("invalid regex"));
}

#[test]
fn zero_workers_fails_validation() {
    let tmp = temp_project_with_config("max_workers = 0\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn unsupported_version_fails_validation() {
    let tmp = temp_project_with_config("version = 2\n");
    let config = load_with_warnings(&tmp.path().join("testgate.toml")).unwrap();
    assert!(config.validate().unwrap_err().to_string().contains("version"));
}

// =============================================================================
// DISCOVERY OF THE CONFIG FILE
// =============================================================================

#[test]
fn find_config_walks_up_to_git_root() {
    let tmp = temp_project_with_config("");
    create_tree(tmp.path(), &[("packages/app/src/a.js", "")]);
    std::fs::create_dir(tmp.path().join(".git")).unwrap();

    let found = find_config(&tmp.path().join("packages/app/src")).unwrap();
    assert_eq!(found, tmp.path().join("testgate.toml"));
}

#[test]
fn find_config_stops_at_git_root() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_tree(tmp.path(), &[("repo/src/a.js", "")]);
    std::fs::create_dir(tmp.path().join("repo/.git")).unwrap();
    std::fs::write(tmp.path().join("testgate.toml"), "").unwrap();

    assert!(find_config(&tmp.path().join("repo/src")).is_none());
}
