// ABOUTME: Integration tests for override assembly.
// ABOUTME: Tests value-file tier order, skipping of missing files, and secret handling.

mod support;

use impeller::command::Arg;
use impeller::config::{ClusterConfig, Override, Release, Value};
use impeller::diagnostics::{Diagnostics, WarningKind};
use impeller::orchestrator::{Orchestrator, RunContext};
use impeller::types::ReleaseName;
use proptest::prelude::*;
use support::{RecordingRunner, write_file};
use tempfile::TempDir;

fn release(name: &str) -> Release {
    Release::new(ReleaseName::new(name).unwrap(), "charts/app", "1.0.0")
}

fn orchestrator(cluster: &str, ctx: RunContext) -> Orchestrator<RecordingRunner> {
    let config = ClusterConfig {
        name: cluster.to_string(),
        ..ClusterConfig::default()
    };
    Orchestrator::new(config, ctx, RecordingRunner::new())
}

fn argv(args: &[Arg]) -> Vec<String> {
    args.iter().flat_map(Arg::argv).collect()
}

mod tiers {
    use super::*;

    #[test]
    fn all_tiers_in_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "values/app/default.yaml", "a: 1\n");
        write_file(dir.path(), "extra/app.yaml", "b: 2\n");
        write_file(dir.path(), "values/app/prod.yaml", "c: 3\n");

        let ctx = RunContext::new(dir.path()).value_files(["global.yaml"]);
        let orch = orchestrator("prod", ctx);

        let mut rel = release("app");
        rel.value_files = vec!["extra/app.yaml".to_string()];
        rel.overrides = vec![Override::new("image.tag", Value::literal("v2").revealed(true))];

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&rel, &mut diag);

        let root = dir.path().display();
        assert_eq!(
            argv(&args),
            vec![
                "-f".to_string(),
                "global.yaml".to_string(),
                "-f".to_string(),
                format!("{root}/values/app/default.yaml"),
                "-f".to_string(),
                format!("{root}/extra/app.yaml"),
                "-f".to_string(),
                format!("{root}/values/app/prod.yaml"),
                "--set".to_string(),
                "image.tag=v2".to_string(),
            ]
        );
        assert!(!diag.has_warnings());
    }

    #[test]
    fn missing_release_value_file_is_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator("", RunContext::new(dir.path()));

        let mut rel = release("app");
        rel.value_files = vec!["missing.yaml".to_string()];

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&rel, &mut diag);

        assert!(args.is_empty());
        assert_eq!(diag.count(WarningKind::MissingValueFile), 1);
    }

    #[test]
    fn cluster_file_needs_cluster_name() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "values/app/.yaml", "x: 1\n");
        let orch = orchestrator("", RunContext::new(dir.path()));

        let mut diag = Diagnostics::default();
        assert!(orch.overrides(&release("app"), &mut diag).is_empty());
    }

    #[test]
    fn absent_default_and_cluster_files_add_nothing() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator("prod", RunContext::new(dir.path()));

        let mut diag = Diagnostics::default();
        assert!(orch.overrides(&release("app"), &mut diag).is_empty());
        assert!(!diag.has_warnings());
    }

    #[test]
    fn blank_run_value_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new(dir.path()).value_files(["", " a.yaml "]);
        let orch = orchestrator("", ctx);

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&release("app"), &mut diag);
        assert_eq!(argv(&args), vec!["-f", "a.yaml"]);
    }
}

mod values {
    use super::*;

    #[test]
    fn hidden_values_are_secret_and_revealed_are_not() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator("", RunContext::new(dir.path()));

        let mut rel = release("app");
        rel.overrides = vec![
            Override::new("db.password", Value::literal("hunter2")),
            Override::new("replicas", Value::literal("3").revealed(true)),
        ];

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&rel, &mut diag);
        assert!(args[0].is_secret());
        assert!(!args[1].is_secret());
        assert!(!args[0].safe_string().contains("hunter2"));
        assert_eq!(args[1].safe_string(), "--set replicas=3");
    }

    #[test]
    fn env_override_reads_variable() {
        temp_env::with_var("IMPELLER_TEST_TAG", Some("v9"), || {
            let dir = TempDir::new().unwrap();
            let orch = orchestrator("", RunContext::new(dir.path()));

            let mut rel = release("app");
            rel.overrides = vec![Override::new("image.tag", Value::from_env("IMPELLER_TEST_TAG"))];

            let mut diag = Diagnostics::default();
            let args = orch.overrides(&rel, &mut diag);
            assert_eq!(args[0].argv(), vec!["--set", "image.tag=v9"]);
        });
    }

    #[test]
    fn blank_override_warns_but_is_kept() {
        let dir = TempDir::new().unwrap();
        let orch = orchestrator("", RunContext::new(dir.path()));

        let mut rel = release("app");
        rel.overrides = vec![Override::new("note", Value::literal(""))];

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&rel, &mut diag);
        assert_eq!(args.len(), 1);
        assert_eq!(diag.count(WarningKind::BlankOverride), 1);
    }
}

proptest! {
    #[test]
    fn run_value_files_keep_their_order(files in prop::collection::vec("[a-z]{1,8}\\.yaml", 0..6)) {
        let dir = TempDir::new().unwrap();
        let ctx = RunContext::new(dir.path()).value_files(files.clone());
        let orch = orchestrator("", ctx);

        let mut diag = Diagnostics::default();
        let args = orch.overrides(&release("app"), &mut diag);

        let paths: Vec<String> = args.iter().map(|a| a.value().to_string()).collect();
        prop_assert_eq!(paths, files);
        prop_assert!(args.iter().all(|a| a.name() == Some("f")));
    }
}
