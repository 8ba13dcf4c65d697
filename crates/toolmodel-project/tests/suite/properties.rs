use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use toolmodel_config::StructuralPolicy;
use toolmodel_model::{Dependency, ResolvedDependency};
use toolmodel_project::host::{HostConfiguration, HostDependency, HostExclusion, HostResolvedDependency};
use toolmodel_project::{ConfigurationGraphProjector, ConfigurationInput};

#[derive(Debug, Clone)]
struct Shape(Vec<Shape>);

fn shape() -> impl Strategy<Value = Shape> {
    Just(Shape(Vec::new())).prop_recursive(6, 64, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Shape)
    })
}

fn build_host_tree(shape: &Shape, depth: u32, counter: &mut u32) -> Arc<HostResolvedDependency> {
    *counter += 1;
    let name = format!("artifact-{counter}");
    let children = shape
        .0
        .iter()
        .map(|child| build_host_tree(child, depth + 1, counter))
        .collect();
    Arc::new(HostResolvedDependency {
        repository: None,
        group: "g".to_string(),
        name: name.clone(),
        version: "1.0".to_string(),
        dated_snapshot_version: None,
        requested: HostDependency::new("g", name, "[1.0,)", "compile"),
        children,
        depth,
    })
}

/// `(depth, child count)` of every host node, in pre-order.
fn host_signature(root: &HostResolvedDependency) -> Vec<(u32, usize)> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        out.push((node.depth, node.children.len()));
        stack.extend(node.children.iter().rev().map(Arc::as_ref));
    }
    out
}

fn snapshot_signature(root: &ResolvedDependency) -> Vec<(u32, usize)> {
    root.walk()
        .map(|node| (node.depth, node.dependencies.len()))
        .collect()
}

fn name() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

prop_compose! {
    fn host_dependency()(
        group in name(),
        artifact in name(),
        version in "[0-9]\\.[0-9]",
        classifier in prop::option::of(name()),
        artifact_type in prop::option::of(name()),
        scope in prop::sample::select(vec!["compile", "runtime", "test", "provided"]),
        optional in prop::option::of(Just("true".to_string())),
        exclusions in prop::collection::vec((name(), name()), 0..4),
    ) -> HostDependency {
        HostDependency {
            group,
            name: artifact,
            version,
            classifier,
            artifact_type,
            scope: scope.to_string(),
            exclusions: exclusions
                .into_iter()
                .map(|(group, module)| HostExclusion { group, module })
                .collect(),
            optional,
        }
    }
}

proptest! {
    #[test]
    fn requested_dependency_fields_carry_over(host in host_dependency()) {
        let dep = Dependency::from(&host);
        prop_assert_eq!(&dep.gav.group_id, &host.group);
        prop_assert_eq!(&dep.gav.artifact_id, &host.name);
        prop_assert_eq!(&dep.gav.version, &host.version);
        prop_assert_eq!(&dep.classifier, &host.classifier);
        prop_assert_eq!(&dep.type_, &host.artifact_type);
        prop_assert_eq!(&dep.scope, &host.scope);
        prop_assert_eq!(&dep.optional, &host.optional);

        let exclusions: Vec<_> = dep
            .exclusions
            .iter()
            .map(|ga| (ga.group_id.clone(), ga.artifact_id.clone()))
            .collect();
        let expected: Vec<_> = host
            .exclusions
            .iter()
            .map(|ex| (ex.group.clone(), ex.module.clone()))
            .collect();
        prop_assert_eq!(exclusions, expected);
    }

    #[test]
    fn resolved_trees_keep_their_shape(shape in shape()) {
        let host = build_host_tree(&shape, 0, &mut 0);
        let mapped = ResolvedDependency::from(host.as_ref());
        prop_assert_eq!(snapshot_signature(&mapped), host_signature(&host));
    }

    #[test]
    fn extends_links_keep_present_names_only(
        extends in prop::collection::vec(prop::collection::vec(0usize..8, 0..5), 1..6)
    ) {
        // Indices past the configuration count name configurations that do not exist.
        let count = extends.len();
        let name_of = |index: usize| format!("conf{index}");
        let inputs: Vec<_> = extends
            .iter()
            .enumerate()
            .map(|(index, parents)| {
                ConfigurationInput::new(
                    HostConfiguration::new(name_of(index))
                        .extending(parents.iter().map(|&p| name_of(p))),
                )
            })
            .collect();

        let nodes = ConfigurationGraphProjector::default().project(":", &inputs).unwrap();
        prop_assert_eq!(nodes.len(), count);

        for (index, parents) in extends.iter().enumerate() {
            let expected: Vec<String> = parents
                .iter()
                .filter(|&&p| p < count && p != index)
                .map(|&p| name_of(p))
                .collect();
            prop_assert_eq!(&nodes[&name_of(index)].extends_from, &expected);
        }
        for node in nodes.values() {
            for parent in &node.extends_from {
                prop_assert!(nodes.contains_key(parent));
            }
        }
    }

    #[test]
    fn best_effort_keeps_one_entry_per_name(
        names in prop::collection::vec(prop::sample::select(vec!["api", "implementation", "runtimeOnly"]), 0..10)
    ) {
        let inputs: Vec<_> = names
            .iter()
            .map(|name| ConfigurationInput::new(HostConfiguration::new(*name)))
            .collect();

        let nodes = ConfigurationGraphProjector::new(StructuralPolicy::BestEffort)
            .project(":", &inputs)
            .unwrap();
        let distinct: BTreeSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(nodes.keys().map(String::as_str).collect::<BTreeSet<_>>(), distinct);
    }
}
