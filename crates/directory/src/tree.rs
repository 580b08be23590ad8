//! Department tree assembly.
//!
//! Converts a flat snapshot of department records into a rooted forest.
//! The input is borrowed and never mutated; the resulting tree is a
//! derived, disposable view owned by the caller.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use warden_core::DepartmentId;

use crate::department::Department;

/// A department with its children, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentNode {
    #[serde(flatten)]
    pub department: Department,
    pub children: Vec<DepartmentNode>,
}

/// Build a forest from flat records in a single linear pass keyed by id.
///
/// Roots keep the relative order of the input sequence, and the children of
/// each parent keep input order (stable, not sorted).
///
/// A record whose `parent_id` resolves to no known id is an orphan: it is
/// skipped with a warning rather than promoted to a root, since promotion
/// would silently rewrite the hierarchy. The create/update paths validate
/// parent existence, so orphans only arise from stale or inconsistent
/// snapshots. Members of a cyclic parent chain are never reachable from a
/// root and are likewise absent from the output; the builder cannot loop.
pub fn build_tree(records: &[Department]) -> Vec<DepartmentNode> {
    let known: HashSet<DepartmentId> = records.iter().map(|r| r.id).collect();
    let mut roots: Vec<&Department> = Vec::new();
    let mut children: HashMap<DepartmentId, Vec<&Department>> = HashMap::new();

    for record in records {
        match record.parent_id {
            None => roots.push(record),
            Some(parent_id) if known.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(record);
            }
            Some(parent_id) => {
                tracing::warn!(
                    department = %record.id,
                    parent = %parent_id,
                    "department references an unknown parent; omitting from tree"
                );
            }
        }
    }

    roots.iter().map(|root| assemble(root, &children)).collect()
}

fn assemble(
    department: &Department,
    children: &HashMap<DepartmentId, Vec<&Department>>,
) -> DepartmentNode {
    let child_nodes = children
        .get(&department.id)
        .map(|entries| {
            entries
                .iter()
                .map(|child| assemble(child, children))
                .collect()
        })
        .unwrap_or_default();

    DepartmentNode {
        department: department.clone(),
        children: child_nodes,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn dept(id: DepartmentId, name: &str, parent_id: Option<DepartmentId>) -> Department {
        let now = Utc::now();
        Department {
            id,
            name: name.to_string(),
            description: String::new(),
            parent_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn ids(n: usize) -> Vec<DepartmentId> {
        (0..n).map(|_| DepartmentId::new()).collect()
    }

    #[test]
    fn nests_children_under_parents_in_input_order() {
        let id = ids(4);
        let records = vec![
            dept(id[0], "Company", None),
            dept(id[1], "Engineering", Some(id[0])),
            dept(id[2], "Sales", Some(id[0])),
            dept(id[3], "Platform", Some(id[1])),
        ];

        let forest = build_tree(&records);
        assert_eq!(forest.len(), 1);

        let root = &forest[0];
        assert_eq!(root.department.name, "Company");
        let child_names: Vec<_> = root
            .children
            .iter()
            .map(|c| c.department.name.as_str())
            .collect();
        assert_eq!(child_names, vec!["Engineering", "Sales"]);
        assert_eq!(root.children[0].children[0].department.name, "Platform");
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn multiple_roots_keep_input_order() {
        let id = ids(3);
        let records = vec![
            dept(id[0], "EMEA", None),
            dept(id[1], "APAC", None),
            dept(id[2], "AMER", None),
        ];

        let forest = build_tree(&records);
        let names: Vec<_> = forest.iter().map(|n| n.department.name.as_str()).collect();
        assert_eq!(names, vec!["EMEA", "APAC", "AMER"]);
    }

    #[test]
    fn orphans_are_omitted_not_promoted() {
        let id = ids(3);
        let unknown = DepartmentId::new();
        let records = vec![
            dept(id[0], "Company", None),
            dept(id[1], "Stale", Some(unknown)),
            dept(id[2], "Engineering", Some(id[0])),
        ];

        let forest = build_tree(&records);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].department.name, "Engineering");
    }

    #[test]
    fn cyclic_chains_do_not_loop_the_builder() {
        let id = ids(3);
        let records = vec![
            dept(id[0], "Company", None),
            dept(id[1], "A", Some(id[2])),
            dept(id[2], "B", Some(id[1])),
        ];

        // The cycle's members are unreachable from any root.
        let forest = build_tree(&records);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn empty_input_yields_an_empty_forest() {
        assert!(build_tree(&[]).is_empty());
    }
}
