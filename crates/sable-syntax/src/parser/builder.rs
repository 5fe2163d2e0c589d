use rowan::{GreenNode, GreenToken, NodeOrToken};

use crate::SyntaxKind;

pub(crate) type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Upper bound on how many child lists the pool keeps around.
const MAX_POOLED_LISTS: usize = 128;
/// Lists that grew past this many slots are dropped instead of pooled.
const MAX_POOLED_CAPACITY: usize = 1024;

/// A position in the builder that can later be wrapped in a node or rewound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    depth: usize,
    len: usize,
}

/// Recycles the scratch vectors that hold children of open nodes.
#[derive(Debug, Default)]
struct ListPool {
    free: Vec<Vec<GreenElement>>,
}

impl ListPool {
    fn acquire(&mut self) -> Vec<GreenElement> {
        self.free.pop().unwrap_or_default()
    }

    fn release(&mut self, mut list: Vec<GreenElement>) {
        list.clear();
        if self.free.len() < MAX_POOLED_LISTS && list.capacity() <= MAX_POOLED_CAPACITY {
            self.free.push(list);
        }
    }
}

#[derive(Debug)]
struct Frame {
    kind: SyntaxKind,
    children: Vec<GreenElement>,
}

/// Green tree builder with rewindable checkpoints.
///
/// Unlike `rowan::GreenNodeBuilder`, a checkpoint taken here can be rolled back:
/// open frames above it are closed without producing nodes and their child lists
/// go back to the pool. This is what lets speculative parses undo partially built
/// subtrees.
#[derive(Debug)]
pub(crate) struct NodeBuilder {
    /// `frames[0]` is the document frame; it never becomes a node itself.
    frames: Vec<Frame>,
    pool: ListPool,
}

impl Default for NodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeBuilder {
    pub(crate) fn new() -> Self {
        Self {
            frames: vec![Frame {
                kind: SyntaxKind::Error,
                children: Vec::new(),
            }],
            pool: ListPool::default(),
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        let children = self.pool.acquire();
        self.frames.push(Frame { kind, children });
    }

    pub(crate) fn token(&mut self, kind: SyntaxKind, text: &str) {
        let token = GreenToken::new(kind.into(), text);
        self.top().children.push(NodeOrToken::Token(token));
    }

    /// Number of open frames, the document frame included.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        let depth = self.frames.len();
        Checkpoint {
            depth,
            len: self.frames[depth - 1].children.len(),
        }
    }

    /// Opens a node whose first child is whatever was emitted since `checkpoint`.
    pub(crate) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        debug_assert_eq!(
            checkpoint.depth,
            self.frames.len(),
            "checkpoint used at a different nesting depth"
        );
        let mut children = self.pool.acquire();
        let top = self.top();
        let len = checkpoint.len.min(top.children.len());
        children.extend(top.children.drain(len..));
        self.frames.push(Frame { kind, children });
    }

    pub(crate) fn finish_node(&mut self) {
        if self.frames.len() <= 1 {
            debug_assert!(false, "finish_node without a matching start_node");
            return;
        }
        let Some(Frame { kind, mut children }) = self.frames.pop() else {
            return;
        };
        let node = GreenNode::new(kind.into(), children.drain(..));
        self.pool.release(children);
        self.top().children.push(NodeOrToken::Node(node));
    }

    /// Discards everything emitted after `checkpoint`, including open nodes.
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        while self.frames.len() > checkpoint.depth {
            if let Some(frame) = self.frames.pop() {
                self.pool.release(frame.children);
            }
        }
        self.top().children.truncate(checkpoint.len);
    }

    /// The most recently completed child of the innermost open node, if it is a node.
    pub(crate) fn last_node(&self) -> Option<&GreenNode> {
        match self.frames.last()?.children.last()? {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    pub(crate) fn finish(mut self) -> GreenNode {
        debug_assert_eq!(self.frames.len(), 1, "unfinished nodes at end of parse");
        while self.frames.len() > 1 {
            self.finish_node();
        }
        let document = &mut self.frames[0].children;
        debug_assert_eq!(document.len(), 1, "parse must produce exactly one root");
        match document.pop() {
            Some(NodeOrToken::Node(root)) => root,
            _ => GreenNode::new(SyntaxKind::Error.into(), std::iter::empty()),
        }
    }

    #[cfg(test)]
    fn pooled_lists(&self) -> usize {
        self.pool.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SableLanguage;

    type SyntaxNode = rowan::SyntaxNode<SableLanguage>;

    #[test]
    fn start_node_at_wraps_emitted_children() {
        let mut builder = NodeBuilder::new();
        builder.start_node(SyntaxKind::ExpressionFragment);
        let checkpoint = builder.checkpoint();
        builder.token(SyntaxKind::Identifier, "a");
        builder.start_node_at(checkpoint, SyntaxKind::BinaryExpression);
        builder.token(SyntaxKind::Plus, "+");
        builder.token(SyntaxKind::Identifier, "b");
        builder.finish_node();
        builder.finish_node();

        let root = SyntaxNode::new_root(builder.finish());
        let binary = root.first_child().expect("binary node");
        assert_eq!(binary.kind(), SyntaxKind::BinaryExpression);
        assert_eq!(binary.text().to_string(), "a+b");
    }

    #[test]
    fn rewind_drops_open_frames_and_recycles_lists() {
        let mut builder = NodeBuilder::new();
        builder.start_node(SyntaxKind::StatementFragment);
        builder.token(SyntaxKind::Identifier, "keep");
        let checkpoint = builder.checkpoint();
        builder.start_node(SyntaxKind::Block);
        builder.start_node(SyntaxKind::ExpressionStatement);
        builder.token(SyntaxKind::Identifier, "drop");
        assert_eq!(builder.pooled_lists(), 0);

        builder.rewind(checkpoint);
        assert_eq!(builder.pooled_lists(), 2);

        builder.finish_node();
        let root = SyntaxNode::new_root(builder.finish());
        assert_eq!(root.text().to_string(), "keep");
        assert!(root.first_child().is_none());
    }

    #[test]
    fn finished_lists_are_reused() {
        let mut builder = NodeBuilder::new();
        builder.start_node(SyntaxKind::Block);
        builder.start_node(SyntaxKind::EmptyStatement);
        builder.token(SyntaxKind::Semicolon, ";");
        builder.finish_node();
        assert_eq!(builder.pooled_lists(), 1);
        builder.start_node(SyntaxKind::EmptyStatement);
        assert_eq!(builder.pooled_lists(), 0);
        builder.token(SyntaxKind::Semicolon, ";");
        builder.finish_node();
        builder.finish_node();
        assert_eq!(builder.finish().children().len(), 2);
    }

    #[test]
    fn last_node_sees_only_completed_nodes() {
        let mut builder = NodeBuilder::new();
        builder.start_node(SyntaxKind::ExpressionStatement);
        builder.start_node(SyntaxKind::InvocationExpression);
        builder.token(SyntaxKind::Identifier, "f");
        builder.finish_node();
        let last = builder.last_node().expect("completed node");
        assert_eq!(
            SableLanguage::kind_from_raw(last.kind()),
            SyntaxKind::InvocationExpression
        );
        builder.token(SyntaxKind::Semicolon, ";");
        assert!(builder.last_node().is_none());
    }

    use rowan::Language;
}
