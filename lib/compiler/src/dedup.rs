use crate::graph::{EdgeId, QueryGraph, VerticeId};
use rustc_hash::FxHashMap;

/// Merges the outgoing edges of `vertice` that address the same relationship.
///
/// Edges are duplicates iff their identities are equal. The first occurrence is kept in place.
/// The child edges of a repeat are appended to the target of the kept edge, the kept edge becomes
/// visible if either edge was and optional only if both were, and the repeat is dropped. Filters
/// and constraints on the target of the repeat are not carried over.
///
/// The target of an edge that received children is deduplicated as well.
pub fn dedupe(graph: &mut QueryGraph, vertice: VerticeId) {
    let edges = graph.vertice_mut(vertice).take_edges();
    let mut kept = Vec::with_capacity(edges.len());
    let mut seen: FxHashMap<String, EdgeId> = FxHashMap::default();
    let mut merged_into = Vec::new();

    for edge in edges {
        let identity = graph.edge(edge).identity();
        match seen.get(&identity) {
            None => {
                seen.insert(identity, edge);
                kept.push(edge);
            }
            Some(&keep) => {
                tracing::debug!(identity = %identity, "Merging duplicate edge");
                merge(graph, keep, edge);
                if !merged_into.contains(&keep) {
                    merged_into.push(keep);
                }
            }
        }
    }

    graph.vertice_mut(vertice).set_edges(kept);
    for edge in merged_into {
        let target = graph.edge(edge).target();
        dedupe(graph, target);
    }
}

fn merge(graph: &mut QueryGraph, keep: EdgeId, repeat: EdgeId) {
    let (visible, optional, repeat_target) = {
        let repeat = graph.edge(repeat);
        (repeat.visible, repeat.optional, repeat.target())
    };
    let children = graph.vertice_mut(repeat_target).take_edges();

    let kept = graph.edge_mut(keep);
    kept.visible |= visible;
    kept.optional &= optional;
    let keep_target = kept.target();

    let target = graph.vertice_mut(keep_target);
    let mut edges = target.take_edges();
    edges.extend(children);
    target.set_edges(edges);
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapeql_common::CompilerConfig;
    use shapeql_model::{NamedNode, VariableStore};
    use shapeql_shapes::PropertyShape;

    fn property(name: &str) -> PropertyShape {
        PropertyShape::new(
            name,
            NamedNode::new_unchecked(format!("https://example.org/def#{name}")),
        )
    }

    #[test]
    fn test_merges_children_of_duplicates() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();

        let first = graph.add_edge(root, &property("beers"), &config, true, true);
        let first_target = graph.edge(first).target();
        let name = graph.add_edge(first_target, &property("name"), &config, true, true);

        let other = graph.add_edge(root, &property("identifier"), &config, true, false);

        let second = graph.add_edge(root, &property("beers"), &config, false, false);
        let second_target = graph.edge(second).target();
        let brewery = graph.add_edge(second_target, &property("brewery"), &config, true, true);

        dedupe(&mut graph, root);

        assert_eq!(graph.vertice(root).edges(), [first, other]);
        assert_eq!(graph.vertice(first_target).edges(), [name, brewery]);
        let first = graph.edge(first);
        assert!(first.visible);
        assert!(!first.optional);
    }

    #[test]
    fn test_merged_children_are_deduplicated() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();

        let first = graph.add_edge(root, &property("beers"), &config, true, true);
        let first_target = graph.edge(first).target();
        let name = graph.add_edge(first_target, &property("name"), &config, true, true);

        let second = graph.add_edge(root, &property("beers"), &config, true, true);
        let second_target = graph.edge(second).target();
        graph.add_edge(second_target, &property("name"), &config, true, true);

        dedupe(&mut graph, root);

        assert_eq!(graph.vertice(root).edges(), [first]);
        assert_eq!(graph.vertice(first_target).edges(), [name]);
        assert_eq!(graph.reachable_edge_count(), 2);
    }

    #[test]
    fn test_distinct_edges_are_untouched() {
        let config = CompilerConfig::default();
        let mut graph = QueryGraph::new(VariableStore::default());
        let root = graph.root();
        let name = graph.add_edge(root, &property("name"), &config, true, true);
        let identifier = graph.add_edge(root, &property("identifier"), &config, true, true);

        dedupe(&mut graph, root);

        assert_eq!(graph.vertice(root).edges(), [name, identifier]);
    }
}
