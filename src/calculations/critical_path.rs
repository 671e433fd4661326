use super::CpmNode;
use crate::graph::TaskDag;
use std::collections::HashSet;

/// One representative critical chain per critical root, roots in input order.
///
/// From each critical task with no resolved dependencies the walk moves to
/// the first critical dependent by input position until none remains. Ties
/// at a branch are not enumerated.
pub fn critical_chains(dag: &TaskDag, nodes: &[CpmNode]) -> Vec<Vec<String>> {
    let mut chains = Vec::new();

    for (root, node) in nodes.iter().enumerate() {
        if !node.is_critical || dag.has_dependencies(root) {
            continue;
        }
        let mut chain = vec![node.id.clone()];
        let mut current = root;
        while let Some(next) = dag
            .dependents_of(current)
            .filter(|&succ| nodes[succ].is_critical)
            .min()
        {
            chain.push(nodes[next].id.clone());
            current = next;
        }
        chains.push(chain);
    }

    chains
}

/// Concatenates chains, listing each task once. A chain that runs into an
/// already listed task stops there.
pub fn merge_chains(chains: &[Vec<String>]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut path = Vec::new();
    for chain in chains {
        for id in chain {
            if !seen.insert(id.as_str()) {
                break;
            }
            path.push(id.clone());
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_stops_chain_at_shared_task() {
        let chains = vec![
            vec!["a".to_string(), "c".to_string(), "d".to_string()],
            vec!["b".to_string(), "c".to_string(), "d".to_string()],
        ];
        assert_eq!(merge_chains(&chains), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        assert!(merge_chains(&[]).is_empty());
    }
}
