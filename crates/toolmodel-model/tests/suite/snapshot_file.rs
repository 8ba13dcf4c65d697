use std::collections::BTreeMap;
use std::path::PathBuf;

use toolmodel_model::{
    decode, encode, read_snapshot_file, write_snapshot_file, CodecError, Dependency,
    DependencyConfiguration, GradlePluginDescriptor, GroupArtifact, GroupArtifactVersion,
    JavaVersionInfo, MavenRepository, ProjectSnapshot, ProjectSnapshotFile, ResolvedDependency,
    ResolvedGroupArtifactVersion, SnapshotFormat, SourceSetInfo, PROJECT_SNAPSHOT_SCHEMA_VERSION,
};

fn sample_snapshot() -> ProjectSnapshot {
    let mut central = MavenRepository::new("central", "https://repo.maven.apache.org/maven2");
    central.known_to_exist = true;

    let mut requested = Dependency::new(
        GroupArtifactVersion::new("com.google.guava", "guava", "33.0.0-jre"),
        "compile",
    );
    requested
        .exclusions
        .push(GroupArtifact::new("com.google.code.findbugs", "jsr305"));

    let failureaccess = ResolvedDependency {
        repository: Some(central.clone()),
        gav: ResolvedGroupArtifactVersion::new("com.google.guava", "failureaccess", "1.0.2"),
        requested: Dependency::new(
            GroupArtifactVersion::new("com.google.guava", "failureaccess", "1.0.2"),
            "compile",
        ),
        dependencies: Vec::new(),
        depth: 1,
    };
    let guava = ResolvedDependency {
        repository: Some(central.clone()),
        gav: ResolvedGroupArtifactVersion::new("com.google.guava", "guava", "33.0.0-jre"),
        requested: requested.clone(),
        dependencies: vec![failureaccess],
        depth: 0,
    };

    let mut implementation = DependencyConfiguration::new("implementation");
    implementation.can_be_resolved = false;
    implementation.requested.push(requested);

    let mut compile_classpath = DependencyConfiguration::new("compileClasspath");
    compile_classpath.can_be_consumed = false;
    compile_classpath.extends_from.push("implementation".to_string());
    compile_classpath.resolved.push(guava);

    ProjectSnapshot {
        name: "app".to_string(),
        path: ":app".to_string(),
        group: "com.example".to_string(),
        version: "1.0.0".to_string(),
        plugins: vec![GradlePluginDescriptor {
            fully_qualified_class_name: "org.gradle.api.plugins.JavaPlugin".to_string(),
            id: Some("java".to_string()),
        }],
        maven_repositories: vec![central],
        maven_plugin_repositories: vec![MavenRepository::new(
            "gradlePluginPortal",
            "https://plugins.gradle.org/m2",
        )],
        name_to_configuration: BTreeMap::from([
            ("implementation".to_string(), implementation),
            ("compileClasspath".to_string(), compile_classpath),
        ]),
    }
}

fn sample_file() -> ProjectSnapshotFile {
    let mut file = ProjectSnapshotFile::new(sample_snapshot());
    file.source_sets.push(SourceSetInfo {
        name: "main".to_string(),
        sources: vec![PathBuf::from("/ws/app/src/main/java/App.java")],
        source_directories: vec![PathBuf::from("/ws/app/src/main/resources")],
        java: vec![PathBuf::from("/ws/app/src/main/java/App.java")],
        classes_dirs: vec![PathBuf::from("/ws/app/build/classes/java/main")],
        compile_classpath: vec![PathBuf::from("/cache/guava-33.0.0-jre.jar")],
        implementation_classpath: Vec::new(),
        java_version: Some(JavaVersionInfo {
            created_by: Some("17.0.9+9".to_string()),
            vm_vendor: Some("Eclipse Adoptium".to_string()),
            source_compatibility: Some("17".to_string()),
            target_compatibility: Some("17".to_string()),
        }),
    });
    file
}

#[test]
fn snapshot_file_survives_both_encodings() {
    let file = sample_file();
    for format in [SnapshotFormat::Json, SnapshotFormat::Bincode] {
        let bytes = encode(&file, format).expect("encode snapshot");
        assert_eq!(SnapshotFormat::sniff(&bytes), format);
        let decoded = decode(&bytes, format).expect("decode snapshot");
        assert_eq!(decoded, file, "{format:?}");
    }
}

#[test]
fn json_layout_uses_camel_case_keys() {
    let bytes = encode(&sample_file(), SnapshotFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["schemaVersion"], PROJECT_SNAPSHOT_SCHEMA_VERSION);
    let classpath = &value["project"]["nameToConfiguration"]["compileClasspath"];
    assert_eq!(classpath["extendsFrom"], serde_json::json!(["implementation"]));
    assert_eq!(classpath["canBeConsumed"], false);
    assert_eq!(classpath["resolved"][0]["gav"]["version"], "33.0.0-jre");
    assert_eq!(
        classpath["resolved"][0]["dependencies"][0]["depth"],
        serde_json::json!(1)
    );
    assert_eq!(
        value["project"]["plugins"][0]["fullyQualifiedClassName"],
        "org.gradle.api.plugins.JavaPlugin"
    );
    assert_eq!(value["sourceSets"][0]["javaVersion"]["vmVendor"], "Eclipse Adoptium");
}

#[test]
fn snapshot_files_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_file();

    let json_path = dir.path().join("nested/snapshot.json");
    write_snapshot_file(&json_path, &file, SnapshotFormat::Json).unwrap();
    assert_eq!(read_snapshot_file(&json_path).unwrap(), file);

    let bin_path = dir.path().join("snapshot.bin");
    write_snapshot_file(&bin_path, &file, SnapshotFormat::Bincode).unwrap();
    assert_eq!(read_snapshot_file(&bin_path).unwrap(), file);
}

#[test]
fn binary_snapshot_with_other_schema_version_is_rejected() {
    let mut file = sample_file();
    file.schema_version = PROJECT_SNAPSHOT_SCHEMA_VERSION + 1;
    let bytes = encode(&file, SnapshotFormat::Bincode).unwrap();

    let err = decode(&bytes, SnapshotFormat::Bincode).unwrap_err();
    assert!(
        matches!(err, CodecError::UnsupportedSchemaVersion { found, .. } if found == PROJECT_SNAPSHOT_SCHEMA_VERSION + 1),
        "{err}"
    );
}

#[test]
fn missing_snapshot_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = read_snapshot_file(&path).unwrap_err();
    assert!(err.to_string().contains("missing.json"), "{err}");
}

fn chain_node(depth: u32, dependencies: Vec<ResolvedDependency>) -> ResolvedDependency {
    let artifact = format!("a{depth}");
    ResolvedDependency {
        repository: None,
        gav: ResolvedGroupArtifactVersion::new("g", artifact.clone(), "1"),
        requested: Dependency::new(GroupArtifactVersion::new("g", artifact, "1"), "compile"),
        dependencies,
        depth,
    }
}

fn chain(levels: u32) -> ResolvedDependency {
    let mut tree = chain_node(levels, Vec::new());
    for depth in (0..levels).rev() {
        tree = chain_node(depth, vec![tree]);
    }
    tree
}

fn file_with_chain(levels: u32) -> ProjectSnapshotFile {
    let mut snapshot = sample_snapshot();
    let mut runtime = DependencyConfiguration::new("runtimeClasspath");
    runtime.resolved.push(chain(levels));
    snapshot
        .name_to_configuration
        .insert("runtimeClasspath".to_string(), runtime);
    ProjectSnapshotFile::new(snapshot)
}

#[test]
fn json_snapshots_with_deep_trees_read_back() {
    let file = file_with_chain(100);
    let bytes = encode(&file, SnapshotFormat::Json).unwrap();
    assert_eq!(decode(&bytes, SnapshotFormat::Json).unwrap(), file);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.json");
    write_snapshot_file(&path, &file, SnapshotFormat::Json).unwrap();
    assert_eq!(read_snapshot_file(&path).unwrap(), file);
}

#[test]
fn very_deep_trees_survive_both_encodings() {
    let file = file_with_chain(10_000);
    for format in [SnapshotFormat::Json, SnapshotFormat::Bincode] {
        let bytes = encode(&file, format).unwrap();
        let decoded = decode(&bytes, format).unwrap();
        let root = &decoded.project.configuration("runtimeClasspath").unwrap().resolved[0];
        assert_eq!(root.node_count(), 10_001, "{format:?}");
        assert_eq!(root.max_depth(), 10_000, "{format:?}");
    }
}
