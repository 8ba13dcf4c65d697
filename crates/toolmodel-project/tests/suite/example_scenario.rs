use serde_json::json;
use toolmodel_config::{ProjectionConfig, StructuralPolicy};
use toolmodel_model::{
    decode, encode, GradlePluginDescriptor, ProjectSnapshotFile, SnapshotFormat,
};
use toolmodel_project::{ProjectSnapshotAssembler, ProjectionError};

use super::support::{capture_logs, example_host, host};

#[test]
fn example_project_projects_as_expected() {
    let host = example_host();
    let snapshot = ProjectSnapshotAssembler::default().snapshot(&host).unwrap();

    assert_eq!(snapshot.name, "app");
    assert_eq!(snapshot.path, ":app");
    assert_eq!(snapshot.group, "com.example");
    assert_eq!(snapshot.version, "1.0-SNAPSHOT");
    assert_eq!(snapshot.name_to_configuration.len(), 3);

    let names = |name: &str| -> Vec<String> {
        snapshot
            .extends_from(name)
            .into_iter()
            .map(|c| c.name.clone())
            .collect()
    };
    assert_eq!(names("testCompile"), ["compile"]);
    assert!(names("runtimeOnly").is_empty());
    assert!(names("compile").is_empty());

    let compile = snapshot.configuration("compile").unwrap();
    assert_eq!(compile.requested.len(), 1);
    assert_eq!(compile.requested[0].gav.version, "1.0");
    assert_eq!(compile.requested[0].scope, "compile");

    let resolved = &compile.resolved[0];
    assert_eq!(resolved.gav.version, "1.0.1");
    assert_eq!(resolved.depth, 0);
    assert_eq!(resolved.requested.gav.version, "1.0");
    assert_eq!(
        resolved.repository.as_ref().map(|repo| repo.id.as_str()),
        Some("central")
    );

    assert_eq!(
        snapshot.plugins,
        vec![GradlePluginDescriptor {
            fully_qualified_class_name: "org.gradle.api.plugins.JavaPlugin".to_string(),
            id: Some("java".to_string()),
        }]
    );
    assert_eq!(snapshot.maven_repositories.len(), 1);
    assert!(snapshot.maven_plugin_repositories.is_empty());
    assert!(snapshot.dangling_links().is_empty());
}

#[test]
fn snapshot_survives_both_codecs() {
    let host = example_host();
    let snapshot = ProjectSnapshotAssembler::default().assemble(&host).unwrap();
    let file = ProjectSnapshotFile::new(snapshot);

    for format in [SnapshotFormat::Json, SnapshotFormat::Bincode] {
        let bytes = encode(&file, format).unwrap();
        assert_eq!(decode(&bytes, format).unwrap(), file, "{format:?}");
    }
}

#[test]
fn failed_resolution_is_recorded_as_unresolved_with_a_warning() {
    let host = host(json!({
        "name": "lib",
        "path": ":lib",
        "configurations": [
            {
                "name": "runtimeClasspath",
                "requested": [
                    { "group": "g", "name": "a", "version": "1", "scope": "runtime" }
                ],
                "resolutionError": "Could not resolve g:a:1"
            }
        ]
    }));

    let (snapshot, logs) =
        capture_logs(|| ProjectSnapshotAssembler::default().assemble(&host).unwrap());

    let runtime = snapshot.configuration("runtimeClasspath").unwrap();
    assert_eq!(runtime.requested.len(), 1);
    assert!(runtime.resolved.is_empty());
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains(":lib"), "{logs}");
    assert!(logs.contains("runtimeClasspath"), "{logs}");
}

#[test]
fn dangling_links_are_dropped_and_logged_at_debug() {
    let host = host(json!({
        "name": "lib",
        "path": ":lib",
        "configurations": [
            { "name": "implementation", "extendsFrom": ["api", "ghost"] },
            { "name": "api" }
        ]
    }));

    let (snapshot, logs) =
        capture_logs(|| ProjectSnapshotAssembler::default().assemble(&host).unwrap());

    assert_eq!(
        snapshot.configuration("implementation").unwrap().extends_from,
        ["api"]
    );
    assert!(logs.contains("DEBUG"), "{logs}");
    assert!(logs.contains("ghost"), "{logs}");
}

#[test]
fn duplicate_configuration_names_follow_the_structural_policy() {
    let description = json!({
        "name": "lib",
        "path": ":lib",
        "configurations": [
            { "name": "api", "description": "first" },
            { "name": "api", "description": "second" }
        ]
    });

    let strict = ProjectSnapshotAssembler::default();
    let err = strict.snapshot(&host(description.clone())).unwrap_err();
    assert_eq!(
        err,
        ProjectionError::DuplicateConfiguration {
            project: ":lib".to_string(),
            name: "api".to_string(),
        }
    );
    assert!(strict.cache().is_empty());

    let best_effort = ProjectSnapshotAssembler::new(ProjectionConfig {
        structural_policy: StructuralPolicy::BestEffort,
        ..ProjectionConfig::default()
    });
    let snapshot = best_effort.snapshot(&host(description)).unwrap();
    assert_eq!(snapshot.name_to_configuration.len(), 1);
    assert_eq!(
        snapshot.configuration("api").unwrap().description.as_deref(),
        Some("second")
    );
}

#[test]
fn capability_flags_are_copied() {
    let host = host(json!({
        "name": "lib",
        "path": ":lib",
        "configurations": [
            {
                "name": "apiElements",
                "description": "API elements for main.",
                "transitive": false,
                "canBeConsumed": true,
                "canBeResolved": false
            }
        ]
    }));

    let snapshot = ProjectSnapshotAssembler::default().assemble(&host).unwrap();
    let api = snapshot.configuration("apiElements").unwrap();
    assert_eq!(api.description.as_deref(), Some("API elements for main."));
    assert!(!api.transitive);
    assert!(api.can_be_consumed);
    assert!(!api.can_be_resolved);
}
