// ABOUTME: Integration tests for cluster configuration parsing and validation.
// ABOUTME: Tests YAML parsing, legacy key aliases, value sources, and load errors.

use impeller::config::*;
use impeller::error::{Error, ErrorKind};
use std::path::PathBuf;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
name: prod
releases:
  - name: ingress
    version: 4.10.0
    chartPath: ingress-nginx/ingress-nginx
"#;
        let config = ClusterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, "prod");
        assert_eq!(config.releases.len(), 1);

        let release = &config.releases[0];
        assert_eq!(release.name.as_str(), "ingress");
        assert_eq!(release.deployment_method, DeploymentMethod::Package);
        assert_eq!(release.namespace(), None);
        assert!(!release.has_wait_targets());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
name: staging
helm:
  skipSetupHelmRepo: false
  defaultHistory: 5
  debug: true
  log: 3
  repos:
    - name: bitnami
      url: https://charts.bitnami.com/bitnami
      username:
        value: reader
      password:
        valueFrom:
          environment: REPO_PASSWORD
releases:
  - name: metrics
    deploymentMethod: kubectl
    version: 0.7.0
    chartPath: charts/metrics
    chartsSource: https://example.com/charts/metrics-0.7.0.tgz
    history: 2
    namespace: monitoring
    valueFiles:
      - values/metrics/extra.yaml
    overrides:
      - target: image.tag
        value: v0.7.0
        showValue: true
      - target: auth.token
        valueFrom:
          environment: METRICS_TOKEN
      - target: tls.cert
        valueFrom:
          file: certs/tls.crt
    waitForDeployment: [metrics-server]
    waitForDaemonSet: [node-exporter]
    waitForStatefulSet: [prometheus]
    kubectlFiles:
      - manifests/metrics
    force: true
"#;
        let config = ClusterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.package.default_history, 5);
        assert_eq!(config.package.log_level, 3);
        assert_eq!(config.package.repos.len(), 1);
        assert_eq!(
            config.package.repos[0].password,
            Some(Value::from_env("REPO_PASSWORD"))
        );

        let release = config.release("metrics").unwrap();
        assert_eq!(release.deployment_method, DeploymentMethod::Manifest);
        assert_eq!(release.effective_history(5), Some(2));
        assert_eq!(release.namespace(), Some("monitoring"));
        assert_eq!(
            release.charts_source(),
            Some("https://example.com/charts/metrics-0.7.0.tgz")
        );
        assert_eq!(release.overrides.len(), 3);
        assert_eq!(
            release.overrides[0].value,
            Value::literal("v0.7.0").revealed(true)
        );
        assert_eq!(
            release.overrides[2].value.file_path(),
            Some(PathBuf::from("certs/tls.crt").as_path())
        );
        assert_eq!(release.wait_for_daemon_set, vec!["node-exporter"]);
        assert_eq!(
            release.post_apply_files,
            vec![PathBuf::from("manifests/metrics")]
        );
        assert!(release.force);
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let yaml = r#"
addons:
  - name: dns
    deployment: manifest
    version: 1.0.0
    chartPath: charts/dns
    historyLimit: 4
    postApplyFiles: [extra.yaml]
package:
  defaultHistory: 9
"#;
        let config = ClusterConfig::from_yaml(yaml).unwrap();
        let release = &config.releases[0];
        assert_eq!(release.deployment_method, DeploymentMethod::Manifest);
        assert_eq!(release.history_limit, 4);
        assert_eq!(release.post_apply_files, vec![PathBuf::from("extra.yaml")]);
        assert_eq!(config.package.default_history, 9);
    }

    #[test]
    fn value_takes_precedence_over_value_from() {
        let yaml = r#"
releases:
  - name: app
    version: 1.0.0
    chartPath: charts/app
    overrides:
      - target: replicas
        value: "3"
        valueFrom:
          environment: REPLICAS
"#;
        let config = ClusterConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.releases[0].overrides[0].value.source,
            ValueSource::Literal("3".to_string())
        );
    }

    #[test]
    fn empty_namespace_is_unset() {
        let yaml = r#"
releases:
  - name: app
    version: 1.0.0
    chartPath: charts/app
    namespace: ""
    chartsSource: ""
"#;
        let config = ClusterConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.releases[0].namespace(), None);
        assert_eq!(config.releases[0].charts_source(), None);
    }
}

mod validation {
    use super::*;

    #[test]
    fn override_without_source_fails_to_load() {
        let yaml = r#"
releases:
  - name: app
    version: 1.0.0
    chartPath: charts/app
    overrides:
      - target: image.tag
"#;
        let err = ClusterConfig::from_yaml(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("image.tag"));
    }

    #[test]
    fn empty_value_from_fails_to_load() {
        let yaml = r#"
releases:
  - name: app
    version: 1.0.0
    chartPath: charts/app
    overrides:
      - target: image.tag
        valueFrom: {}
"#;
        assert!(ClusterConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn duplicate_release_names_rejected() {
        let yaml = r#"
releases:
  - name: app
    version: 1.0.0
    chartPath: charts/app
  - name: app
    version: 2.0.0
    chartPath: charts/app
"#;
        let err = ClusterConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn missing_version_rejected() {
        let yaml = r#"
releases:
  - name: app
    version: ""
    chartPath: charts/app
"#;
        let err = ClusterConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn invalid_release_name_rejected() {
        let yaml = r#"
releases:
  - name: My_App
    version: 1.0.0
    chartPath: charts/app
"#;
        assert!(ClusterConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn unknown_deployment_method_rejected() {
        let yaml = r#"
releases:
  - name: app
    deploymentMethod: kustomize
    version: 1.0.0
    chartPath: charts/app
"#;
        assert!(ClusterConfig::from_yaml(yaml).is_err());
    }
}

mod loading {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ClusterConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn load_directory_is_not_a_config() {
        let dir = TempDir::new().unwrap();
        let err = ClusterConfig::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "releases: [unclosed").unwrap();

        let err = ClusterConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn load_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prod.yaml");
        std::fs::write(
            &path,
            "name: prod\nreleases:\n  - name: app\n    version: 1.0.0\n    chartPath: charts/app\n",
        )
        .unwrap();

        let config = ClusterConfig::load(&path).unwrap();
        assert_eq!(config.name, "prod");
    }
}

mod values {
    use super::*;

    #[test]
    fn env_value_resolves_at_use() {
        temp_env::with_var("IMPELLER_TEST_TOKEN", Some("s3cret"), || {
            assert_eq!(
                Value::from_env("IMPELLER_TEST_TOKEN").resolve().unwrap(),
                "s3cret"
            );
        });
    }

    #[test]
    fn unset_env_value_is_blank() {
        temp_env::with_var_unset("IMPELLER_TEST_UNSET", || {
            let value = Value::from_env("IMPELLER_TEST_UNSET");
            assert!(value.is_blank());
            assert_eq!(value.resolve().unwrap(), "");
        });
    }

    #[test]
    fn missing_file_value_is_resolution_error() {
        let err = Value::from_file("/nonexistent/impeller/value")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ValueError::ReadFile { .. }));
    }

    #[test]
    fn hidden_override_is_redacted() {
        let arg = Override::new("db.password", Value::literal("hunter2")).to_arg();
        assert!(!arg.safe_string().contains("hunter2"));
        assert_eq!(arg.argv(), vec!["--set", "db.password=hunter2"]);
    }

    #[test]
    fn file_override_passes_path() {
        let arg = Override::new("tls.cert", Value::from_file("certs/tls.crt")).to_arg();
        assert_eq!(arg.argv(), vec!["--set-file", "tls.cert=certs/tls.crt"]);
        assert!(!arg.is_secret());
    }
}
