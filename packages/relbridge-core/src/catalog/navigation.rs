//! Foreign-key navigation grouping and traversal.
//!
//! The relationship graph may contain cycles and self references, so every
//! traversal tracks visited tables.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::datasource::ExportedKey;

use super::{NavigationKey, NavigationLink, TableSchema};

/// Groups exported keys by referencing table, preserving discovery order
/// of both the child tables and the column pairs within each link.
pub fn group_exported_keys(keys: Vec<ExportedKey>) -> Vec<NavigationLink> {
    let mut links: Vec<NavigationLink> = Vec::new();
    for key in keys {
        let pair = NavigationKey {
            parent_column: key.pk_column,
            child_column: key.fk_column,
        };
        match links.iter_mut().find(|link| link.child_table == key.fk_table) {
            Some(link) => link.keys.push(pair),
            None => links.push(NavigationLink {
                child_table: key.fk_table,
                keys: vec![pair],
            }),
        }
    }
    links
}

/// Adjacency mapping from parent table to child tables.
pub fn adjacency(tables: &[TableSchema]) -> HashMap<String, Vec<String>> {
    tables
        .iter()
        .map(|table| {
            let children = table
                .navigation
                .iter()
                .map(|link| link.child_table.clone())
                .collect();
            (table.name.clone(), children)
        })
        .collect()
}

/// Breadth-first reachability from `start`, excluding `start` itself
/// unless a cycle leads back to it.
pub fn reachable(graph: &HashMap<String, Vec<String>>, start: &str) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut order = Vec::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(start);

    while let Some(table) = queue.pop_front() {
        let Some(children) = graph.get(table) else {
            continue;
        };
        for child in children {
            if visited.insert(child.as_str()) {
                order.push(child.clone());
                queue.push_back(child.as_str());
            }
        }
    }
    order
}
