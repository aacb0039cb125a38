//! Internal dependency graph and cycle detection.
//!
//! Nodes are interned into a vector and edges carry indices, so the
//! depth-first search marks "on the current path" with a bit per node
//! instead of copying a visited set at every step.

use std::collections::HashMap;

/// A directed graph of "imports symbols from" relationships.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    edges: Vec<Vec<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a node, returning its index.
    pub fn node(&mut self, name: &str) -> usize {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        self.edges.push(Vec::new());
        id
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        if !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Node names in sorted order, for deterministic reporting.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Edges ordered by target index for deterministic traversal.
    pub fn sort_edges(&mut self) {
        for targets in &mut self.edges {
            targets.sort_unstable();
        }
    }

    /// Find a dependency cycle, if any, as a chain of node names whose
    /// first and last elements coincide.
    ///
    /// The search starts a depth-first walk from every node in turn and
    /// only accepts a chain that closes exactly back to its own start.
    /// A walk started from a node that merely reaches a cycle elsewhere
    /// produces a chain whose endpoints differ and is rejected, so the
    /// loop is always reported in its shortest form: `A -> B -> C -> A`
    /// yields `[A, B, C, A]`, never a longer chain through an unrelated
    /// importer of `A`.
    pub fn find_cycle(&self) -> Option<Vec<&str>> {
        let mut starts: Vec<usize> = (0..self.names.len()).collect();
        starts.sort_by(|&a, &b| self.names[a].cmp(&self.names[b]));

        for start in starts {
            let mut path = Vec::new();
            let mut on_path = vec![false; self.names.len()];
            if let Some(chain) = self.walk(start, &mut path, &mut on_path) {
                if chain.first() == chain.last() {
                    return Some(chain.into_iter().map(|id| self.name(id)).collect());
                }
            }
        }
        None
    }

    /// Depth-first walk returning the full path from the start node up
    /// to and including the first node revisited on the current path.
    fn walk(&self, node: usize, path: &mut Vec<usize>, on_path: &mut [bool]) -> Option<Vec<usize>> {
        if on_path[node] {
            let mut chain = path.clone();
            chain.push(node);
            return Some(chain);
        }
        path.push(node);
        on_path[node] = true;
        for &next in &self.edges[node] {
            if let Some(chain) = self.walk(next, path, on_path) {
                return Some(chain);
            }
        }
        path.pop();
        on_path[node] = false;
        None
    }
}
