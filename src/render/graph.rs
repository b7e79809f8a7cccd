//! Graph visualization model.
//!
//! Collects the nodes and relationships found anywhere in a result
//! (including inside lists and paths) into a de-duplicated graph.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::db::{Node, QueryResult, Relationship, Value};

/// Default rendered node size.
const NODE_SIZE: u32 = 20;

/// A node in the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VizNode {
    pub id: String,
    pub caption: String,
    pub size: u32,
    pub properties: BTreeMap<String, String>,
}

/// A relationship in the visualization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VizRelationship {
    pub source: String,
    pub target: String,
    pub caption: String,
}

/// Nodes and relationships ready for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisualizationGraph {
    pub nodes: Vec<VizNode>,
    pub relationships: Vec<VizRelationship>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    #[serde(skip)]
    placeholders: Vec<bool>,
}

impl VisualizationGraph {
    /// Builds the graph from every value in a result.
    pub fn from_result(result: &QueryResult) -> Self {
        let mut graph = Self::default();
        for row in &result.rows {
            for value in row {
                graph.add_value(value);
            }
        }
        graph
    }

    /// Returns true if the result contained no graph values.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &str) -> Option<&VizNode> {
        self.index.get(id).and_then(|&i| self.nodes.get(i))
    }

    fn add_value(&mut self, value: &Value) {
        match value {
            Value::Node(node) => self.add_node(node),
            Value::Relationship(rel) => self.add_relationship(rel),
            Value::List(items) => items.iter().for_each(|v| self.add_value(v)),
            Value::Map(map) => map.values().for_each(|v| self.add_value(v)),
            _ => {}
        }
    }

    fn add_node(&mut self, node: &Node) {
        let viz = VizNode {
            id: node.element_id.clone(),
            caption: node_caption(node),
            size: NODE_SIZE,
            properties: node
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_display_string()))
                .collect(),
        };

        match self.index.get(&node.element_id) {
            // A node first seen as a relationship endpoint gets its details now.
            Some(&i) if self.placeholders[i] => {
                self.nodes[i] = viz;
                self.placeholders[i] = false;
            }
            Some(_) => {}
            None => self.push_node(viz, false),
        }
    }

    fn add_relationship(&mut self, rel: &Relationship) {
        for endpoint in [&rel.start_node_element_id, &rel.end_node_element_id] {
            if !self.index.contains_key(endpoint.as_str()) {
                self.push_node(
                    VizNode {
                        id: endpoint.clone(),
                        caption: endpoint.clone(),
                        size: NODE_SIZE,
                        properties: BTreeMap::new(),
                    },
                    true,
                );
            }
        }

        self.relationships.push(VizRelationship {
            source: rel.start_node_element_id.clone(),
            target: rel.end_node_element_id.clone(),
            caption: rel.rel_type.clone(),
        });
    }

    fn push_node(&mut self, node: VizNode, placeholder: bool) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.placeholders.push(placeholder);
    }
}

/// Caption: `name` or `title` property, else first label, else element id.
fn node_caption(node: &Node) -> String {
    ["name", "title"]
        .iter()
        .filter_map(|key| node.properties.get(*key))
        .find(|v| !v.is_null())
        .map(Value::to_display_string)
        .or_else(|| node.labels.first().cloned())
        .unwrap_or_else(|| node.element_id.clone())
}
