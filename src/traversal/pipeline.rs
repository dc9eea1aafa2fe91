//! Query pipelines: a start plus steps, evaluated only when asked.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::*;
use crate::storage::StorageBackend;
use crate::Result;

/// Where a pipeline starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Start {
    /// All vertices, or those with the given label.
    Vertices(Option<String>),
    /// All edges, or those with the given label.
    Edges(Option<String>),
    /// The elements with these identities; unknown ids are skipped.
    Ids(Vec<ElementId>),
}

/// One pipeline step. Element-only steps drop value items and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    HasLabel(String),
    Has(String, Value),
    HasNot(String),
    HasId(ElementId),
    /// Vertex → adjacent vertices over outgoing edges (optionally labelled).
    Out(Option<String>),
    /// Vertex → adjacent vertices over incoming edges.
    In(Option<String>),
    /// Vertex → outgoing edges.
    OutE(Option<String>),
    /// Vertex → incoming edges.
    InE(Option<String>),
    /// Edge → source vertex.
    OutV,
    /// Edge → target vertex.
    InV,
    /// Element → value of a property; elements without it are dropped.
    Values(String),
    /// Drop repeated elements (by identity) and repeated values.
    Dedup,
    /// Keep items `low..high`.
    Range(usize, usize),
}

/// A restartable query descriptor. Cloning it forks the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    start: Start,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(start: Start) -> Self {
        Self { start, steps: Vec::new() }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn start(&self) -> &Start {
        &self.start
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run the pipeline inside `tx`.
    pub fn execute<B: StorageBackend>(&self, backend: &B, tx: &B::Tx) -> Result<Vec<Item>> {
        let mut items = start_items(&self.start, backend, tx)?;
        for step in &self.steps {
            items = apply(step, items, backend, tx)?;
        }
        Ok(items)
    }
}

fn start_items<B: StorageBackend>(start: &Start, backend: &B, tx: &B::Tx) -> Result<Vec<Item>> {
    Ok(match start {
        Start::Vertices(None) => backend.all_vertices(tx)?.into_iter().map(Item::Vertex).collect(),
        Start::Vertices(Some(label)) => {
            backend.vertices_by_label(tx, label)?.into_iter().map(Item::Vertex).collect()
        }
        Start::Edges(None) => backend.all_edges(tx)?.into_iter().map(Item::Edge).collect(),
        Start::Edges(Some(label)) => {
            backend.edges_by_label(tx, label)?.into_iter().map(Item::Edge).collect()
        }
        Start::Ids(ids) => {
            let mut items = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(item) = backend.get_element(tx, id)? {
                    items.push(item);
                }
            }
            items
        }
    })
}

fn retain_elements(items: Vec<Item>, keep: impl Fn(&dyn GraphElement) -> bool) -> Vec<Item> {
    items
        .into_iter()
        .filter(|item| item.as_element().is_some_and(|e| keep(e)))
        .collect()
}

fn adjacent_vertices<B: StorageBackend>(
    items: Vec<Item>,
    backend: &B,
    tx: &B::Tx,
    dir: Direction,
    label: Option<&str>,
) -> Result<Vec<Item>> {
    let mut out = Vec::new();
    for item in items {
        let Item::Vertex(vertex) = item else { continue };
        for edge in backend.edges_of(tx, &vertex.id, dir, label)? {
            let other = match dir {
                Direction::Incoming => &edge.from,
                _ => &edge.to,
            };
            if let Some(next) = backend.get_vertex(tx, other)? {
                out.push(Item::Vertex(next));
            }
        }
    }
    Ok(out)
}

fn incident_edges<B: StorageBackend>(
    items: Vec<Item>,
    backend: &B,
    tx: &B::Tx,
    dir: Direction,
    label: Option<&str>,
) -> Result<Vec<Item>> {
    let mut out = Vec::new();
    for item in items {
        let Item::Vertex(vertex) = item else { continue };
        out.extend(backend.edges_of(tx, &vertex.id, dir, label)?.into_iter().map(Item::Edge));
    }
    Ok(out)
}

fn endpoints<B: StorageBackend>(items: Vec<Item>, backend: &B, tx: &B::Tx, source: bool) -> Result<Vec<Item>> {
    let mut out = Vec::new();
    for item in items {
        let Item::Edge(edge) = item else { continue };
        let end = if source { &edge.from } else { &edge.to };
        if let Some(vertex) = backend.get_vertex(tx, end)? {
            out.push(Item::Vertex(vertex));
        }
    }
    Ok(out)
}

fn dedup(items: Vec<Item>) -> Vec<Item> {
    let mut seen_ids: HashSet<ElementId> = HashSet::new();
    let mut seen_values: Vec<Value> = Vec::new();
    items
        .into_iter()
        .filter(|item| match item {
            Item::Vertex(v) => seen_ids.insert(v.id.clone()),
            Item::Edge(e) => seen_ids.insert(e.id.clone()),
            Item::Value(v) => {
                if seen_values.contains(v) {
                    false
                } else {
                    seen_values.push(v.clone());
                    true
                }
            }
        })
        .collect()
}

fn apply<B: StorageBackend>(step: &Step, items: Vec<Item>, backend: &B, tx: &B::Tx) -> Result<Vec<Item>> {
    Ok(match step {
        Step::HasLabel(label) => retain_elements(items, |e| e.label() == label),
        Step::Has(key, value) => retain_elements(items, |e| e.get(key) == Some(value)),
        Step::HasNot(key) => retain_elements(items, |e| e.get(key).is_none()),
        Step::HasId(id) => retain_elements(items, |e| e.id() == id),
        Step::Out(label) => adjacent_vertices(items, backend, tx, Direction::Outgoing, label.as_deref())?,
        Step::In(label) => adjacent_vertices(items, backend, tx, Direction::Incoming, label.as_deref())?,
        Step::OutE(label) => incident_edges(items, backend, tx, Direction::Outgoing, label.as_deref())?,
        Step::InE(label) => incident_edges(items, backend, tx, Direction::Incoming, label.as_deref())?,
        Step::OutV => endpoints(items, backend, tx, true)?,
        Step::InV => endpoints(items, backend, tx, false)?,
        Step::Values(key) => items
            .iter()
            .filter_map(|item| item.as_element()?.get(key).cloned())
            .map(Item::Value)
            .collect(),
        Step::Dedup => dedup(items),
        Step::Range(low, high) => items
            .into_iter()
            .skip(*low)
            .take(high.saturating_sub(*low))
            .collect(),
    })
}
