use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::EnvironmentValues;
use crate::keys::EnvironmentKey;
use crate::render::RenderedNode;

/// Produces a node's output from the environment it inherited.
pub type Content = Arc<dyn Fn(&EnvironmentValues) -> Vec<String> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

struct NodeData {
    label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // Values this node sets for its descendants.
    scope: EnvironmentValues,
    content: Option<Content>,
}

/// Arena of render nodes with parent links.
///
/// A `NodeId` is only meaningful for the tree that returned it; passing one
/// from another tree panics on out-of-range ids.
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeData {
                label: root_label.into(),
                parent: None,
                children: Vec::new(),
                scope: EnvironmentValues::new(),
                content: None,
            }],
        }
    }

    pub fn root(&self) -> NodeId { NodeId(0) }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { false }

    pub fn add_child(&mut self, parent: NodeId, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            label: label.into(),
            parent: Some(parent),
            children: Vec::new(),
            scope: EnvironmentValues::new(),
            content: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_content<F>(&mut self, node: NodeId, content: F)
    where
        F: Fn(&EnvironmentValues) -> Vec<String> + Send + Sync + 'static,
    {
        self.nodes[node.0].content = Some(Arc::new(content));
    }

    pub fn label(&self, node: NodeId) -> &str { &self.nodes[node.0].label }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { self.nodes[node.0].parent }

    pub fn children(&self, node: NodeId) -> &[NodeId] { &self.nodes[node.0].children }

    pub fn depth(&self, node: NodeId) -> usize { self.ancestors(node).count() - 1 }

    /// `node`, then its parent, up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |id| self.parent(*id))
    }

    /// Set `K` for every descendant of `node`. The node itself keeps
    /// resolving `K` from its own ancestors.
    pub fn set<K: EnvironmentKey>(&mut self, node: NodeId, value: K::Value) {
        debug!(key = K::NAME, node = %self.label(node), "set environment value");
        self.nodes[node.0].scope.set::<K>(value);
    }

    /// Values `node` sets for its subtree.
    pub fn scope(&self, node: NodeId) -> &EnvironmentValues { &self.nodes[node.0].scope }

    pub fn scope_mut(&mut self, node: NodeId) -> &mut EnvironmentValues {
        &mut self.nodes[node.0].scope
    }

    /// `K` as seen by `node`: the nearest strict ancestor that set it, else
    /// the key's default.
    pub fn resolve<K: EnvironmentKey>(&self, node: NodeId) -> K::Value {
        self.resolve_from::<K>(self.parent(node))
    }

    /// `K` as seen by the children of `node`.
    pub fn resolve_for_children<K: EnvironmentKey>(&self, node: NodeId) -> K::Value {
        self.resolve_from::<K>(Some(node))
    }

    fn resolve_from<K: EnvironmentKey>(&self, start: Option<NodeId>) -> K::Value {
        let Some(start) = start else {
            return K::default_value();
        };
        for id in self.ancestors(start) {
            if let Some(value) = self.scope(id).lookup::<K>() {
                trace!(key = K::NAME, from = %self.label(id), "resolved");
                return value;
            }
        }
        trace!(key = K::NAME, "resolved to default");
        K::default_value()
    }

    /// The environment `node` inherits from its ancestors.
    pub fn environment(&self, node: NodeId) -> EnvironmentValues {
        let mut chain: Vec<NodeId> = self.ancestors(node).skip(1).collect();
        chain.reverse();
        chain
            .into_iter()
            .fold(EnvironmentValues::new(), |env, id| env.overlay(self.scope(id)))
    }

    pub fn render(&self) -> Vec<RenderedNode> { self.render_from(self.root()) }

    /// Depth-first render of the subtree at `node`, threading the environment
    /// down: each node's content sees what it inherited, its children see that
    /// plus the node's own scope.
    pub fn render_from(&self, node: NodeId) -> Vec<RenderedNode> {
        let base_depth = self.depth(node);
        let mut out = Vec::new();
        let mut stack = vec![(node, self.environment(node))];
        while let Some((id, inherited)) = stack.pop() {
            let data = &self.nodes[id.0];
            let lines = data
                .content
                .as_ref()
                .map(|content| content(&inherited))
                .unwrap_or_default();
            let depth = self.depth(id) - base_depth;
            debug!(node = %data.label, depth, keys = ?inherited.names(), "rendered node");
            out.push(RenderedNode { label: data.label.clone(), depth, lines });

            let scoped = inherited.overlay(&data.scope);
            for child in data.children.iter().rev() {
                stack.push((*child, scoped.clone()));
            }
        }
        out
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.nodes.iter().map(|n| (&n.label, n.parent, &n.scope)))
            .finish()
    }
}
