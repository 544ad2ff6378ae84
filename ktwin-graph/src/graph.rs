// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Generic directed graph of twin entities
//!
//! Vertices live in a map keyed by id and edges store target ids, so an edge
//! always resolves to whatever payload currently sits under its target. This
//! is what lets a temporary vertex be promoted in place: every edge that
//! pointed at the stand-in now sees the real definition.
//!
//! **Invariants:**
//! - exactly one vertex per id
//! - every id referenced by an edge resolves to a vertex
//!
//! No cycle or self-loop detection happens here. Recursive callers carry
//! their own visited sets.

use ktwin_core::{normalize_name, GraphError, GraphResult, TwinEntity};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fmt::Write as _;
use tracing::debug;

/// A graph node holding one twin entity and its outgoing edges
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<T> {
    id: String,
    payload: T,
    edges: Vec<String>,
    is_temporary: bool,
}

impl<T> Vertex<T> {
    fn new(id: String, payload: T, is_temporary: bool) -> Self {
        Self {
            id,
            payload,
            edges: Vec::new(),
            is_temporary,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Target ids in insertion order
    pub fn edges(&self) -> &[String] {
        &self.edges
    }

    /// True while the vertex only exists because an edge referenced it
    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }
}

/// Directed graph of named vertices
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipGraph<T> {
    vertices: BTreeMap<String, Vertex<T>>,
}

impl<T> Default for RelationshipGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RelationshipGraph<T> {
    pub fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Total number of edges across all vertices
    pub fn edge_count(&self) -> usize {
        self.vertices.values().map(|v| v.edges.len()).sum()
    }

    /// Insert a real definition.
    ///
    /// - Absent id: creates a non-temporary vertex.
    /// - Temporary vertex present: promotes it in place (payload replaced,
    ///   flag cleared, edges kept) and returns `AlreadyExists`, since no new
    ///   slot was created.
    /// - Real vertex present: left untouched, returns `AlreadyExists`.
    pub fn add_vertex(&mut self, id: impl Into<String>, payload: T) -> GraphResult<&Vertex<T>> {
        self.insert(id.into(), payload, false)
    }

    /// Insert a stand-in for an entity referenced before its definition arrived.
    ///
    /// Never downgrades or overwrites an existing vertex.
    pub fn add_temporary_vertex(
        &mut self,
        id: impl Into<String>,
        payload: T,
    ) -> GraphResult<&Vertex<T>> {
        self.insert(id.into(), payload, true)
    }

    fn insert(&mut self, id: String, payload: T, is_temporary: bool) -> GraphResult<&Vertex<T>> {
        match self.vertices.entry(id) {
            Entry::Occupied(mut entry) => {
                let vertex = entry.get_mut();
                if vertex.is_temporary && !is_temporary {
                    debug!(id = %vertex.id, "promoting temporary vertex");
                    vertex.payload = payload;
                    vertex.is_temporary = false;
                }
                Err(GraphError::AlreadyExists(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                Ok(entry.insert(Vertex::new(id, payload, is_temporary)))
            }
        }
    }

    /// Append an edge `source -> target`, creating temporary endpoints as needed.
    ///
    /// The payloads are only used when an endpoint is missing. Edges are
    /// directional; the target does not get a reciprocal edge.
    pub fn add_edge(&mut self, source_id: &str, source_payload: T, target_id: &str, target_payload: T) {
        // Existing endpoints report AlreadyExists, which is expected here
        let _ = self.add_temporary_vertex(source_id, source_payload);
        let _ = self.add_temporary_vertex(target_id, target_payload);

        if let Some(source) = self.vertices.get_mut(source_id) {
            source.edges.push(target_id.to_string());
        }
    }

    /// Append an edge between two vertices that must both exist already
    pub fn connect(&mut self, source_id: &str, target_id: &str) -> GraphResult<()> {
        if !self.vertices.contains_key(target_id) {
            return Err(GraphError::NotFound(target_id.to_string()));
        }
        let source = self
            .vertices
            .get_mut(source_id)
            .ok_or_else(|| GraphError::NotFound(source_id.to_string()))?;
        source.edges.push(target_id.to_string());
        Ok(())
    }

    pub fn get_vertex(&self, id: &str) -> Option<&Vertex<T>> {
        self.vertices.get(id)
    }

    pub fn payload(&self, id: &str) -> Option<&T> {
        self.vertices.get(id).map(|v| &v.payload)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.vertices.contains_key(id)
    }

    /// True when the id holds a real (non-temporary) definition
    pub fn is_resolved(&self, id: &str) -> bool {
        self.vertices.get(id).is_some_and(|v| !v.is_temporary)
    }

    /// Delete a vertex and scrub it from every other vertex's edge list
    pub fn remove_vertex(&mut self, id: &str) -> GraphResult<T> {
        let removed = self
            .vertices
            .remove(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;

        for vertex in self.vertices.values_mut() {
            vertex.edges.retain(|edge| edge != id);
        }

        Ok(removed.payload)
    }

    /// Remove one `source -> target` edge from whichever side holds it.
    ///
    /// Edges are inserted one-directionally, but both sides are cleaned.
    pub fn remove_edge(&mut self, source_id: &str, target_id: &str) {
        if let Some(source) = self.vertices.get_mut(source_id) {
            remove_first(&mut source.edges, target_id);
        }
        if let Some(target) = self.vertices.get_mut(target_id) {
            remove_first(&mut target.edges, source_id);
        }
    }

    /// All vertices in id order
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex<T>> {
        self.vertices.values()
    }

    /// Vertices an id points at, in edge order
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Vertex<T>> + 'a {
        self.vertices
            .get(id)
            .into_iter()
            .flat_map(|v| v.edges.iter())
            .filter_map(|edge| self.vertices.get(edge))
    }

    /// Ids still waiting for their real definition
    pub fn temporary_ids(&self) -> Vec<&str> {
        self.vertices
            .values()
            .filter(|v| v.is_temporary)
            .map(|v| v.id.as_str())
            .collect()
    }

    /// Breadth-first walk over relationship edges starting at `id`.
    ///
    /// Relationship cycles are legitimate (twins may reference each other),
    /// so each vertex is yielded once and revisits are skipped.
    pub fn reachable_from(&self, id: &str) -> GraphResult<Vec<&Vertex<T>>> {
        let start = self
            .vertices
            .get(id)
            .ok_or_else(|| GraphError::NotFound(id.to_string()))?;

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut reached = Vec::new();
        visited.insert(start.id.as_str());

        while let Some(vertex) = queue.pop_front() {
            reached.push(vertex);
            for edge in &vertex.edges {
                if visited.insert(edge.as_str()) {
                    if let Some(next) = self.vertices.get(edge) {
                        queue.push_back(next);
                    }
                }
            }
        }

        Ok(reached)
    }

    /// Human-readable adjacency dump
    pub fn describe(&self) -> String {
        let mut out = String::from("Graph:\n");
        for vertex in self.vertices.values() {
            let marker = if vertex.is_temporary { " (temporary)" } else { "" };
            let _ = writeln!(
                out,
                "Vertex: {}{} - Relationships: {}",
                vertex.id,
                marker,
                vertex.edges.join(", ")
            );
        }
        out
    }
}

impl<T: TwinEntity> RelationshipGraph<T> {
    /// Insert an entity under its own normalized id
    pub fn add_entity(&mut self, entity: T) -> GraphResult<&Vertex<T>> {
        let id = entity.twin_id();
        self.add_vertex(id, entity)
    }

    /// Edge from an entity to a target known only by id
    pub fn link_to_id(&mut self, source: &T, target_id: &str) {
        let target_id = normalize_name(target_id);
        self.add_edge(
            &source.twin_id(),
            source.clone(),
            &target_id,
            T::placeholder(&target_id),
        );
    }

    /// Edge between two entities
    pub fn link(&mut self, source: &T, target: &T) {
        self.add_edge(
            &source.twin_id(),
            source.clone(),
            &target.twin_id(),
            target.clone(),
        );
    }
}

fn remove_first(edges: &mut Vec<String>, id: &str) {
    if let Some(index) = edges.iter().position(|edge| edge == id) {
        edges.remove(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> RelationshipGraph<&'static str> {
        RelationshipGraph::new()
    }

    #[test]
    fn test_add_vertex() {
        let mut g = graph();
        let vertex = g.add_vertex("a", "A").unwrap();
        assert_eq!(vertex.id(), "a");
        assert!(!vertex.is_temporary());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_add_vertex_twice_is_idempotent() {
        let mut g = graph();
        g.add_vertex("a", "A").unwrap();
        let before = g.clone();

        let err = g.add_vertex("a", "A").unwrap_err();
        assert_eq!(err, GraphError::AlreadyExists("a".into()));
        assert_eq!(g, before);
    }

    #[test]
    fn test_duplicate_does_not_overwrite_real_vertex() {
        let mut g = graph();
        g.add_vertex("a", "first").unwrap();
        assert!(g.add_vertex("a", "second").is_err());
        assert_eq!(g.payload("a"), Some(&"first"));
    }

    #[test]
    fn test_temporary_vertex_is_promoted_in_place() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "placeholder");
        assert!(g.get_vertex("b").unwrap().is_temporary());

        let err = g.add_vertex("b", "B").unwrap_err();
        assert!(err.is_already_exists());

        let b = g.get_vertex("b").unwrap();
        assert!(!b.is_temporary());
        assert_eq!(b.payload(), &"B");

        let targets: Vec<_> = g.neighbors("a").map(|v| *v.payload()).collect();
        assert_eq!(targets, vec!["B"]);
    }

    #[test]
    fn test_temporary_insert_never_downgrades() {
        let mut g = graph();
        g.add_vertex("a", "A").unwrap();
        assert!(g.add_temporary_vertex("a", "stand-in").is_err());
        let a = g.get_vertex("a").unwrap();
        assert!(!a.is_temporary());
        assert_eq!(a.payload(), &"A");
    }

    #[test]
    fn test_edges_are_directional() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "B");
        assert_eq!(g.get_vertex("a").unwrap().edges(), ["b".to_string()]);
        assert!(g.get_vertex("b").unwrap().edges().is_empty());
    }

    #[test]
    fn test_remove_vertex_scrubs_edges() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "B");
        g.add_edge("c", "C", "b", "B");

        assert_eq!(g.remove_vertex("b").unwrap(), "B");
        assert!(g.get_vertex("b").is_none());
        assert!(g.get_vertex("a").unwrap().edges().is_empty());
        assert!(g.get_vertex("c").unwrap().edges().is_empty());
    }

    #[test]
    fn test_remove_missing_vertex() {
        let mut g = graph();
        assert_eq!(
            g.remove_vertex("ghost").unwrap_err(),
            GraphError::NotFound("ghost".into())
        );
    }

    #[test]
    fn test_remove_edge_cleans_both_sides() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "B");
        g.add_edge("b", "B", "a", "A");

        g.remove_edge("a", "b");
        assert!(g.get_vertex("a").unwrap().edges().is_empty());
        assert!(g.get_vertex("b").unwrap().edges().is_empty());
    }

    #[test]
    fn test_connect_requires_both_endpoints() {
        let mut g = graph();
        g.add_vertex("a", "A").unwrap();
        assert!(g.connect("a", "b").unwrap_err().is_not_found());
        g.add_vertex("b", "B").unwrap();
        g.connect("a", "b").unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_reachable_from_tolerates_cycles() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "B");
        g.add_edge("b", "B", "c", "C");
        g.add_edge("c", "C", "a", "A");
        g.add_edge("a", "A", "a", "A");

        let ids: Vec<_> = g.reachable_from("a").unwrap().iter().map(|v| v.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_describe_marks_temporary() {
        let mut g = graph();
        g.add_edge("a", "A", "b", "B");
        let text = g.describe();
        assert!(text.contains("Vertex: a - Relationships: b"));
        assert!(text.contains("Vertex: b (temporary)"));
        assert_eq!(g.temporary_ids(), vec!["a", "b"]);
    }
}
