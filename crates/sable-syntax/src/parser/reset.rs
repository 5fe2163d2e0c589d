use super::builder::Checkpoint;
use super::termination::TerminatorState;
use super::Parser;

/// A complete snapshot of parser position.
///
/// Taking one is O(1): every field is an index, a length or a flag. Points must be
/// handed back through [`Parser::release`]; the parser counts outstanding points
/// and asserts that none leak past the end of a parse.
#[derive(Debug)]
#[must_use = "reset points must be released"]
pub(crate) struct ResetPoint {
    position: usize,
    emitted: usize,
    builder: Checkpoint,
    errors: usize,
    termination: TerminatorState,
    in_try: bool,
    in_async: bool,
    query_depth: u32,
    recursion_depth: u32,
}

impl Parser<'_> {
    pub(super) fn checkpoint(&mut self) -> ResetPoint {
        self.outstanding_resets += 1;
        ResetPoint {
            position: self.tokens.position(),
            emitted: self.emitted,
            builder: self.builder.checkpoint(),
            errors: self.errors.len(),
            termination: self.termination,
            in_try: self.in_try,
            in_async: self.in_async,
            query_depth: self.query_depth,
            recursion_depth: self.recursion_depth,
        }
    }

    /// Restores the parser to `point`. Nodes and errors produced since are discarded.
    pub(super) fn rewind(&mut self, point: &ResetPoint) {
        self.tokens.reset(point.position);
        self.emitted = point.emitted;
        self.builder.rewind(point.builder);
        self.errors.truncate(point.errors);
        self.termination = point.termination;
        self.in_try = point.in_try;
        self.in_async = point.in_async;
        self.query_depth = point.query_depth;
        self.recursion_depth = point.recursion_depth;
    }

    pub(super) fn release(&mut self, _point: ResetPoint) {
        debug_assert!(self.outstanding_resets > 0, "released an unknown reset point");
        self.outstanding_resets = self.outstanding_resets.saturating_sub(1);
    }

    /// Runs a side-effect-free scan and puts the parser back where it was.
    pub(super) fn lookahead<T>(&mut self, scan: impl FnOnce(&mut Self) -> T) -> T {
        let point = self.checkpoint();
        let result = scan(self);
        self.rewind(&point);
        self.release(point);
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::SyntaxKind;

    #[test]
    fn rewind_restores_tokens_errors_and_flags() {
        let mut p = Parser::new("a b c", None);
        p.builder.start_node(SyntaxKind::StatementFragment);
        let point = p.checkpoint();

        p.in_async = true;
        p.query_depth = 3;
        p.bump();
        p.error_here("synthetic");
        assert_eq!(p.current(), SyntaxKind::Identifier);
        assert_eq!(p.current_text(), "b");

        p.rewind(&point);
        p.release(point);
        assert_eq!(p.current_text(), "a");
        assert!(p.errors.is_empty());
        assert!(!p.in_async);
        assert_eq!(p.query_depth, 0);
        assert_eq!(p.outstanding_resets, 0);
    }

    #[test]
    fn nested_checkpoints_unwind_independently() {
        let mut p = Parser::new("a b c", None);
        p.builder.start_node(SyntaxKind::StatementFragment);
        let outer = p.checkpoint();
        p.bump();
        let inner = p.checkpoint();
        p.bump();
        assert_eq!(p.current_text(), "c");
        p.rewind(&inner);
        p.release(inner);
        assert_eq!(p.current_text(), "b");
        p.rewind(&outer);
        p.release(outer);
        assert_eq!(p.current_text(), "a");
        assert_eq!(p.outstanding_resets, 0);
    }

    #[test]
    fn lookahead_leaves_no_trace() {
        let mut p = Parser::new("x < y", None);
        p.builder.start_node(SyntaxKind::ExpressionFragment);
        let seen = p.lookahead(|p| {
            p.advance_scan();
            p.advance_scan();
            p.current_text().to_string()
        });
        assert_eq!(seen, "y");
        assert_eq!(p.current_text(), "x");
    }
}
