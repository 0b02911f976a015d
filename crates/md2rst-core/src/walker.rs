//! Depth-first tree walker
//!
//! Yields every container node twice (on entry and on exit) and every leaf
//! node once, in document order. Each event carries the node's parent so
//! handlers can inspect their immediate container without the tree holding
//! back-references.

use crate::node::Node;

/// A single step of the walk
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    pub node: &'a Node,
    /// `true` on entry (and for leaves), `false` on exit
    pub entering: bool,
    pub parent: Option<&'a Node>,
}

struct Frame<'a> {
    node: &'a Node,
    parent: Option<&'a Node>,
    next_child: usize,
}

/// Iterator over the [`Event`]s of a tree
pub struct Walker<'a> {
    root: Option<&'a Node>,
    stack: Vec<Frame<'a>>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
        }
    }

    fn enter(&mut self, node: &'a Node, parent: Option<&'a Node>) -> Event<'a> {
        if node.is_container() {
            self.stack.push(Frame {
                node,
                parent,
                next_child: 0,
            });
        }
        Event {
            node,
            entering: true,
            parent,
        }
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            return Some(self.enter(root, None));
        }

        let frame = self.stack.last_mut()?;
        let node = frame.node;
        if let Some(child) = node.children.get(frame.next_child) {
            frame.next_child += 1;
            return Some(self.enter(child, Some(node)));
        }

        let frame = self.stack.pop()?;
        Some(Event {
            node: frame.node,
            entering: false,
            parent: frame.parent,
        })
    }
}

impl Node {
    /// Walk the tree rooted at this node
    pub fn walker(&self) -> Walker<'_> {
        Walker::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn trace(root: &Node) -> Vec<(NodeKind, bool)> {
        root.walker().map(|e| (e.node.kind, e.entering)).collect()
    }

    #[test]
    fn test_containers_visited_twice_leaves_once() {
        let doc = Node::document(vec![Node::paragraph(vec![
            Node::text("a"),
            Node::emphasis(vec![Node::text("b")]),
            Node::softbreak(),
        ])]);

        assert_eq!(
            trace(&doc),
            vec![
                (NodeKind::Document, true),
                (NodeKind::Paragraph, true),
                (NodeKind::Text, true),
                (NodeKind::Emphasis, true),
                (NodeKind::Text, true),
                (NodeKind::Emphasis, false),
                (NodeKind::Softbreak, true),
                (NodeKind::Paragraph, false),
                (NodeKind::Document, false),
            ]
        );
    }

    #[test]
    fn test_empty_container() {
        let doc = Node::document(vec![]);
        assert_eq!(
            trace(&doc),
            vec![(NodeKind::Document, true), (NodeKind::Document, false)]
        );
    }

    #[test]
    fn test_leaf_root() {
        let text = Node::text("alone");
        assert_eq!(trace(&text), vec![(NodeKind::Text, true)]);
    }

    #[test]
    fn test_parent_references() {
        let doc = Node::document(vec![Node::bullet_list(vec![Node::item(vec![
            Node::paragraph(vec![Node::text("x")]),
        ])])]);

        let parents: Vec<_> = doc
            .walker()
            .filter(|e| e.entering)
            .map(|e| (e.node.kind, e.parent.map(|p| p.kind)))
            .collect();

        assert_eq!(
            parents,
            vec![
                (NodeKind::Document, None),
                (NodeKind::List, Some(NodeKind::Document)),
                (NodeKind::Item, Some(NodeKind::List)),
                (NodeKind::Paragraph, Some(NodeKind::Item)),
                (NodeKind::Text, Some(NodeKind::Paragraph)),
            ]
        );

        let exits: Vec<_> = doc
            .walker()
            .filter(|e| !e.entering)
            .map(|e| (e.node.kind, e.parent.map(|p| p.kind)))
            .collect();
        assert_eq!(exits[0], (NodeKind::Paragraph, Some(NodeKind::Item)));
        assert_eq!(exits[3], (NodeKind::Document, None));
    }
}
