//! Shared fixtures: an in-memory graph mirror that records every call and
//! can be switched to fail, and a small deterministic calculation engine.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use heir_calc::{
    CalculationEngine, EngineError, EnginePerson, EngineRelationship, EngineRelationshipType,
    Heir, InheritanceResult, Share,
};
use heir_core::types::{CaseCreate, CaseId, EdgeRef, NodeRef, UserId};
use heir_graph::projection::iso_date;
use heir_graph::{
    FamilyTreeGraph, GraphError, GraphMirror, MirrorEdge, MirrorNode, PersonNode,
    PropertyChange, PropertyValue, RelationshipEdge,
};
use heir_store::{OwnedCase, Store};
use heir_sync::{CalculationGateway, Coordinator};

pub const ALICE: UserId = UserId(1);
pub const BOB: UserId = UserId(2);

// ── Graph double ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StoredNode {
    pub case_id: CaseId,
    pub person_id: i64,
    pub props: BTreeMap<&'static str, PropertyValue>,
}

#[derive(Debug, Clone)]
pub struct StoredEdge {
    pub from: String,
    pub to: String,
    pub edge_type: &'static str,
    pub props: BTreeMap<&'static str, PropertyValue>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    nodes: BTreeMap<String, StoredNode>,
    edges: BTreeMap<String, StoredEdge>,
    calls: Vec<&'static str>,
    cleared: Vec<CaseId>,
}

/// Recording [`GraphMirror`] backed by two maps.
#[derive(Default)]
pub struct MemoryGraph {
    state: Mutex<State>,
    failing: AtomicBool,
}

impl MemoryGraph {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every mirror call made so far, failed ones included.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn cleared_cases(&self) -> Vec<CaseId> {
        self.state.lock().unwrap().cleared.clone()
    }

    pub fn node(&self, node_ref: &NodeRef) -> Option<StoredNode> {
        self.state.lock().unwrap().nodes.get(&node_ref.0).cloned()
    }

    pub fn edge(&self, edge_ref: &EdgeRef) -> Option<StoredEdge> {
        self.state.lock().unwrap().edges.get(&edge_ref.0).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }

    /// Record the call, then fail if switched to failing.
    fn enter(&self, call: &'static str) -> Result<std::sync::MutexGuard<'_, State>, GraphError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GraphError::Connection("graph store unreachable".into()));
        }
        Ok(state)
    }
}

impl State {
    fn next_ref(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:{}", self.next_id)
    }
}

fn text(props: &BTreeMap<&'static str, PropertyValue>, key: &str) -> Option<String> {
    match props.get(key) {
        Some(PropertyValue::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

fn flag(props: &BTreeMap<&'static str, PropertyValue>, key: &str) -> Option<bool> {
    match props.get(key) {
        Some(PropertyValue::Bool(b)) => Some(*b),
        _ => None,
    }
}

#[async_trait]
impl GraphMirror for MemoryGraph {
    async fn create_person_node(&self, node: &PersonNode) -> Result<NodeRef, GraphError> {
        let mut state = self.enter("create_person_node")?;
        let mut props = BTreeMap::new();
        props.insert("name", PropertyValue::Text(node.name.clone()));
        props.insert("is_alive", PropertyValue::Bool(node.is_alive));
        props.insert("is_decedent", PropertyValue::Bool(node.is_decedent));
        props.insert("is_spouse", PropertyValue::Bool(node.is_spouse));
        if let Some(d) = node.birth_date {
            props.insert("birth_date", PropertyValue::Text(iso_date(d)));
        }
        if let Some(d) = node.death_date {
            props.insert("death_date", PropertyValue::Text(iso_date(d)));
        }
        if let Some(g) = &node.gender {
            props.insert("gender", PropertyValue::Text(g.clone()));
        }

        let id = state.next_ref("node");
        state.nodes.insert(
            id.clone(),
            StoredNode {
                case_id: node.case_id,
                person_id: node.person_id.0,
                props,
            },
        );
        Ok(NodeRef(id))
    }

    async fn update_person_node(
        &self,
        node_ref: &NodeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        let mut state = self.enter("update_person_node")?;
        let node = state.nodes.get_mut(&node_ref.0).ok_or(GraphError::NotFound {
            element: "node",
            id: node_ref.0.clone(),
        })?;
        for change in changes {
            node.props.insert(change.key, change.value.clone());
        }
        Ok(())
    }

    async fn delete_person_node(&self, node_ref: &NodeRef) -> Result<(), GraphError> {
        let mut state = self.enter("delete_person_node")?;
        state.nodes.remove(&node_ref.0);
        state
            .edges
            .retain(|_, e| e.from != node_ref.0 && e.to != node_ref.0);
        Ok(())
    }

    async fn create_relationship_edge(
        &self,
        from: &NodeRef,
        to: &NodeRef,
        edge: &RelationshipEdge,
    ) -> Result<EdgeRef, GraphError> {
        let mut state = self.enter("create_relationship_edge")?;
        for endpoint in [from, to] {
            if !state.nodes.contains_key(&endpoint.0) {
                return Err(GraphError::NotFound {
                    element: "node",
                    id: endpoint.0.clone(),
                });
            }
        }
        let mut props = BTreeMap::new();
        if let Some(b) = edge.is_biological {
            props.insert("is_biological", PropertyValue::Bool(b));
        }
        if let Some(a) = edge.is_adopted {
            props.insert("is_adopted", PropertyValue::Bool(a));
        }
        if let Some(bt) = edge.blood_type {
            props.insert("blood_type", PropertyValue::Text(bt.as_str().to_string()));
        }

        let id = state.next_ref("edge");
        state.edges.insert(
            id.clone(),
            StoredEdge {
                from: from.0.clone(),
                to: to.0.clone(),
                edge_type: edge.relationship_type.graph_label(),
                props,
            },
        );
        Ok(EdgeRef(id))
    }

    async fn update_relationship_edge(
        &self,
        edge_ref: &EdgeRef,
        changes: &[PropertyChange],
    ) -> Result<(), GraphError> {
        let mut state = self.enter("update_relationship_edge")?;
        let edge = state.edges.get_mut(&edge_ref.0).ok_or(GraphError::NotFound {
            element: "relationship",
            id: edge_ref.0.clone(),
        })?;
        for change in changes {
            edge.props.insert(change.key, change.value.clone());
        }
        Ok(())
    }

    async fn delete_relationship_edge(&self, edge_ref: &EdgeRef) -> Result<(), GraphError> {
        let mut state = self.enter("delete_relationship_edge")?;
        state.edges.remove(&edge_ref.0);
        Ok(())
    }

    async fn clear_case_graph(&self, case_id: CaseId) -> Result<(), GraphError> {
        let mut state = self.enter("clear_case_graph")?;
        state.cleared.push(case_id);
        let doomed: Vec<String> = state
            .nodes
            .iter()
            .filter(|(_, n)| n.case_id == case_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            state.nodes.remove(id);
        }
        state
            .edges
            .retain(|_, e| !doomed.contains(&e.from) && !doomed.contains(&e.to));
        Ok(())
    }

    async fn fetch_family_tree(&self, case_id: CaseId) -> Result<FamilyTreeGraph, GraphError> {
        let state = self.enter("fetch_family_tree")?;
        let nodes: Vec<MirrorNode> = state
            .nodes
            .iter()
            .filter(|(_, n)| n.case_id == case_id)
            .map(|(id, n)| MirrorNode {
                node_ref: id.clone(),
                person_id: Some(n.person_id),
                name: text(&n.props, "name").unwrap_or_default(),
                is_alive: flag(&n.props, "is_alive"),
                is_decedent: flag(&n.props, "is_decedent"),
                is_spouse: flag(&n.props, "is_spouse"),
                birth_date: text(&n.props, "birth_date"),
                death_date: text(&n.props, "death_date"),
                gender: text(&n.props, "gender"),
            })
            .collect();
        let edges = state
            .edges
            .iter()
            .filter(|(_, e)| nodes.iter().any(|n| n.node_ref == e.from))
            .map(|(id, e)| MirrorEdge {
                edge_ref: id.clone(),
                from_ref: e.from.clone(),
                to_ref: e.to.clone(),
                edge_type: e.edge_type.to_string(),
                is_biological: flag(&e.props, "is_biological"),
                is_adopted: flag(&e.props, "is_adopted"),
                blood_type: text(&e.props, "blood_type"),
            })
            .collect();
        Ok(FamilyTreeGraph { nodes, edges })
    }
}

// ── Engine double ─────────────────────────────────────────────────

/// Spouse takes half when there are children, everything otherwise;
/// children split the rest equally. Nobody else inherits.
pub struct SplitEngine;

impl CalculationEngine for SplitEngine {
    fn calculate(
        &self,
        decedent: &EnginePerson,
        persons: &[EnginePerson],
        relationships: &[EngineRelationship],
    ) -> Result<InheritanceResult, EngineError> {
        if !persons.iter().any(|p| p.id == decedent.id) {
            return Err(EngineError::new(format!("unknown decedent {}", decedent.id)));
        }

        let spouses: Vec<&EnginePerson> = relationships
            .iter()
            .filter(|r| r.relationship_type == EngineRelationshipType::SpouseOf)
            .filter_map(|r| {
                if r.to_person.id == decedent.id {
                    Some(&r.from_person)
                } else if r.from_person.id == decedent.id {
                    Some(&r.to_person)
                } else {
                    None
                }
            })
            .filter(|p| p.is_alive)
            .collect();
        let children: Vec<&EnginePerson> = relationships
            .iter()
            .filter(|r| {
                r.relationship_type == EngineRelationshipType::ChildOf
                    && r.to_person.id == decedent.id
                    && r.from_person.is_alive
            })
            .map(|r| &r.from_person)
            .collect();

        if spouses.is_empty() && children.is_empty() {
            return Err(EngineError::new("no heirs"));
        }

        let mut heirs = Vec::new();
        let children_pool = if spouses.is_empty() { (1, 1) } else { (1, 2) };
        if let Some(spouse) = spouses.first() {
            let share = if children.is_empty() { (1, 1) } else { (1, 2) };
            heirs.push(Heir {
                person: (*spouse).clone(),
                relationship: "spouse".into(),
                rank: 0,
                share: Share::new(share.0, share.1).ok_or_else(|| EngineError::new("share"))?,
            });
        }
        let n = children.len() as u64;
        for child in &children {
            heirs.push(Heir {
                person: (*child).clone(),
                relationship: "child".into(),
                rank: 1,
                share: Share::new(children_pool.0, children_pool.1 * n)
                    .ok_or_else(|| EngineError::new("share"))?,
            });
        }

        Ok(InheritanceResult {
            decedent: decedent.clone(),
            heirs,
            has_spouse: !spouses.is_empty(),
            has_children: !children.is_empty(),
            calculation_basis: vec!["spouse/children split".into()],
        })
    }

    fn render_tree(&self, result: &InheritanceResult) -> Result<String, EngineError> {
        let mut out = format!("{}\n", result.decedent.name);
        for heir in &result.heirs {
            out.push_str(&format!(
                "  {} ({}) {}/{}\n",
                heir.person.name, heir.relationship, heir.share.numerator, heir.share.denominator
            ));
        }
        Ok(out)
    }
}

// ── Fixture ───────────────────────────────────────────────────────

pub struct Fixture {
    pub store: Store,
    pub graph: Arc<MemoryGraph>,
    pub coordinator: Coordinator,
    pub gateway: CalculationGateway,
}

pub async fn fixture() -> Fixture {
    let store = Store::in_memory().await.unwrap();
    let graph = Arc::new(MemoryGraph::default());
    let coordinator = Coordinator::new(store.clone(), graph.clone());
    let gateway = CalculationGateway::new(store.clone(), Arc::new(SplitEngine));
    Fixture {
        store,
        graph,
        coordinator,
        gateway,
    }
}

impl Fixture {
    /// A fresh case owned by `owner`, already resolved.
    pub async fn case(&self, owner: UserId, title: &str) -> OwnedCase {
        let case = self
            .coordinator
            .create_case(owner, &CaseCreate::new(title))
            .await
            .unwrap();
        self.coordinator.resolve(case.id, owner).await.unwrap()
    }
}
