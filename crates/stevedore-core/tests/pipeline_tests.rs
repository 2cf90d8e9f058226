//! End-to-end tests for the manifest resolution pipeline

use serde_json::json;
use stevedore_core::{
    Context, EnrichError, EnvSpecifications, Enricher, FileConfigProvider, IgnoredRelease,
    Ignores, Labels, ManifestFile, MockConfigProvider, NoopReporter, Overrides, ProviderRegistry,
    Substitute, files,
};

fn context() -> Context {
    Context::new("components-staging", "staging-cluster")
        .unwrap()
        .with_label("environment", "env")
        .with_label("environmentType", "staging")
        .with_label("contextType", "components")
        .with_label("applicationName", "x-application")
}

fn overrides() -> Overrides {
    serde_yaml::from_str(
        r#"
- matches: {applicationName: x-application}
  values:
    APPLICATION_NAME: x-application
    COMPONENT: ${COMPONENT}
- matches: {contextName: components-staging}
  values:
    CONTEXT_NAME: test-components
    COMPONENT: ${COMPONENT}
- matches: {environmentType: staging}
  values:
    ENVIRONMENT_TYPE: test
    COMPONENT: ${COMPONENT}
- matches: {contextType: components}
  values:
    CONTEXT_TYPE: components
    COMPONENT: ${COMPONENT}
- matches: {environment: env}
  values:
    ENVIRONMENT: test-environment
    COMPONENT: ${COMPONENT}
- matches: {environment: production}
  values:
    ENVIRONMENT: production
"#,
    )
    .unwrap()
}

fn ignores() -> Ignores {
    serde_yaml::from_str(
        r#"
- matches: {contextName: components-staging}
  releases:
    - name: y-stevedore
"#,
    )
    .unwrap()
}

fn envs() -> EnvSpecifications {
    serde_yaml::from_str(
        r#"
- matches: {environment: env}
  env: {ENV: using env}
- matches: {environment: production}
  env: {ENV: using production}
"#,
    )
    .unwrap()
}

fn store() -> FileConfigProvider {
    FileConfigProvider::from_entries(
        serde_yaml::from_str(
            r#"
- matches: {name: x-stevedore}
  values:
    COMPONENT: x-component
    UNUSED: value
- matches: {name: z-stevedore}
  values:
    COMPONENT: z-component
"#,
        )
        .unwrap(),
    )
}

fn manifests() -> Vec<ManifestFile> {
    vec![
        ManifestFile::new(
            "components.yaml",
            serde_yaml::from_str(
                r#"
deployTo:
  - contextName: components-staging
spec:
  - release:
      name: x-stevedore
      namespace: default
      chart: chart/x-stevedore
      values:
        COMPONENT: ${COMPONENT}
        ENV: ${ENV}
    configs:
      store:
        - name: x-stevedore
  - release:
      name: y-stevedore
      namespace: default
      chart: chart/y-stevedore
      values:
        SECRET: ${NOT_DEFINED_ANYWHERE}
"#,
            )
            .unwrap(),
        ),
        ManifestFile::new(
            "env.yaml",
            serde_yaml::from_str(
                r#"
deployTo:
  - contextName: env
spec:
  - release:
      name: z-stevedore
      namespace: default
      chart: chart/z-stevedore
      values:
        COMPONENT: ${COMPONENT}
    configs:
      store:
        - name: z-stevedore
"#,
            )
            .unwrap(),
        ),
    ]
}

fn enricher() -> Enricher {
    Enricher::builder(context())
        .labels(Labels::default())
        .overrides(overrides())
        .ignores(ignores())
        .envs(envs())
        .base_env(Substitute::new())
        .build()
}

#[test]
fn test_components_staging_scenario() {
    let registry = ProviderRegistry::new().with_config("store", store());

    let info = enricher()
        .enrich(manifests(), &registry, &NoopReporter)
        .unwrap();

    assert_eq!(info.manifest_files.len(), 1);
    let file = &info.manifest_files[0];
    assert_eq!(file.file, "components.yaml");
    assert_eq!(file.manifest.spec.len(), 1);

    let release = &file.manifest.spec[0].release;
    assert_eq!(release.name, "x-stevedore");
    assert_eq!(release.chart, "chart/x-stevedore");
    assert_eq!(
        release.values.inner(),
        &json!({
            "COMPONENT": "x-component",
            "ENVIRONMENT_TYPE": "test",
            "ENVIRONMENT": "test-environment",
            "CONTEXT_TYPE": "components",
            "CONTEXT_NAME": "test-components",
            "APPLICATION_NAME": "x-application",
            "ENV": "using env",
        })
    );

    assert_eq!(
        info.ignored,
        vec![
            IgnoredRelease::new("y-stevedore", ""),
            IgnoredRelease::new(
                "z-stevedore",
                "Not applicable for the context 'components-staging'"
            ),
        ]
    );
}

#[test]
fn test_literal_release_never_fetches_store() {
    let store = MockConfigProvider::new([("COMPONENT", "x-component")]);
    let registry = ProviderRegistry::new().with_config("store", store.clone());

    let files = vec![ManifestFile::new(
        "literal.yaml",
        serde_yaml::from_str(
            r#"
deployTo: [{contextName: components-staging}]
spec:
  - release:
      name: literal
      chart: chart/literal
      values:
        COMPONENT: fixed
        nested: {list: [a, 1, true]}
    configs:
      store:
        - name: literal
"#,
        )
        .unwrap(),
    )];

    let info = Enricher::builder(context())
        .build()
        .enrich(files.clone(), &registry, &NoopReporter)
        .unwrap();

    assert_eq!(store.fetch_count(), 0);
    assert_eq!(
        info.manifest_files[0].manifest.spec[0].release.values,
        files[0].manifest.spec[0].release.values
    );
}

#[test]
fn test_literal_releases_unaffected_by_pending_overrides() {
    let store = MockConfigProvider::new([("COMPONENT", "x-component")]);
    let registry = ProviderRegistry::new().with_config("store", store.clone());

    let files = vec![ManifestFile::new(
        "literal.yaml",
        serde_yaml::from_str(
            r#"
deployTo: [{contextName: components-staging}]
spec:
  - release:
      name: literal
      chart: chart/literal
      values:
        COMPONENT: fixed
        nested: {list: [a, 1, true]}
    configs:
      store:
        - name: literal
  - release:
      name: no-configs
      chart: chart/no-configs
      values:
        replicas: 2
"#,
        )
        .unwrap(),
    )];

    let info = enricher()
        .enrich(files, &registry, &NoopReporter)
        .unwrap();

    assert_eq!(store.fetch_count(), 0);

    let spec = &info.manifest_files[0].manifest.spec;
    assert_eq!(spec.len(), 2);
    assert_eq!(
        spec[0].release.values.inner(),
        &json!({
            "COMPONENT": "fixed",
            "nested": {"list": ["a", 1, true]},
            "ENVIRONMENT_TYPE": "test",
            "ENVIRONMENT": "test-environment",
            "CONTEXT_TYPE": "components",
            "CONTEXT_NAME": "test-components",
            "APPLICATION_NAME": "x-application",
        })
    );
    assert_eq!(spec[1].release.values.inner()["replicas"], 2);
    assert!(spec[1].release.values.inner().get("COMPONENT").is_none());
}

#[test]
fn test_malformed_token_fails_run() {
    let files = vec![ManifestFile::new(
        "malformed.yaml",
        serde_yaml::from_str(
            r#"
deployTo: [{contextName: components-staging}]
spec:
  - release:
      name: malformed
      chart: chart/malformed
      values:
        A: "${DB HOST}"
        B: "${}"
"#,
        )
        .unwrap(),
    )];

    let err = enricher()
        .enrich(files, &ProviderRegistry::new(), &NoopReporter)
        .unwrap_err();

    let EnrichError::Substitution(report) = err else {
        panic!("expected substitution report");
    };
    assert_eq!(
        report.unresolved().collect::<Vec<_>>(),
        vec![("malformed.yaml", ""), ("malformed.yaml", "DB HOST")]
    );
}

#[test]
fn test_unresolved_token_fails_run_with_file_and_token() {
    let registry = ProviderRegistry::new().with_config("store", store());
    let mut files = manifests();
    files.push(ManifestFile::new(
        "broken.yaml",
        serde_yaml::from_str(
            r#"
deployTo: [{environment: env}]
spec:
  - release:
      name: broken
      chart: chart/broken
      values:
        DSN: postgres://${DB_HOST}/app
    configs:
      store:
        - name: broken
"#,
        )
        .unwrap(),
    ));

    let err = enricher()
        .enrich(files, &registry, &NoopReporter)
        .unwrap_err();

    match err {
        EnrichError::Substitution(report) => {
            assert_eq!(report.files_with_errors(), 1);
            assert_eq!(
                report.unresolved().collect::<Vec<_>>(),
                vec![("broken.yaml", "DB_HOST")]
            );
            assert_eq!(report.summary(), "1 unresolved token in 1 file");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_process_env_is_the_base() {
    let base = Substitute::from_process_env();
    let usable = base.iter().find(|(name, value)| {
        name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && value.as_str().is_some_and(|v| !v.contains('$') && !v.contains('"'))
    });
    let Some((name, value)) = usable.map(|(k, v)| (k.clone(), v.clone())) else {
        return;
    };

    let files = vec![ManifestFile::new(
        "env.yaml",
        serde_yaml::from_str(&format!(
            "deployTo: [{{contextName: components-staging}}]\nspec:\n  - release:\n      name: from-env\n      chart: c\n      values: {{VALUE: \"${{{}}}\"}}\n",
            name
        ))
        .unwrap(),
    )];

    let info = Enricher::builder(context())
        .base_env(base)
        .build()
        .enrich(files, &ProviderRegistry::new(), &NoopReporter)
        .unwrap();

    assert_eq!(
        info.manifest_files[0].manifest.spec[0].release.values.inner()["VALUE"],
        value
    );
}

#[test]
fn test_rules_loaded_from_files() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("overrides.yaml"),
        serde_yaml::to_string(&serde_json::json!({ "overrides": overrides() })).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("ignores.yaml"),
        serde_yaml::to_string(&serde_json::json!({ "ignores": ignores() })).unwrap(),
    )
    .unwrap();

    let loaded_overrides = files::load_overrides(&dir.path().join("overrides.yaml")).unwrap();
    let loaded_ignores = files::load_ignores(&dir.path().join("ignores.yaml")).unwrap();
    assert_eq!(loaded_overrides, overrides());
    assert_eq!(loaded_ignores, ignores());
}
