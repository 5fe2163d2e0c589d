//! Speculative classification of token runs.
//!
//! Every `scan_*` method only advances the token cursor; nothing is built and no
//! diagnostics are produced. Public entry points wrap the scan in
//! [`Parser::lookahead`] so the cursor is restored afterwards.

use super::Parser;
use crate::SyntaxKind;

/// How confidently a run of tokens reads as a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanTypeFlags {
    /// Cannot be a type.
    NotType,
    /// Can only be a type (`int`, `T[]`, `(int, string)`, `A<B>` in definite position).
    MustBeType,
    /// A generic name whose type-argument list was confirmed by its follow token.
    GenericTypeOrMethod,
    /// A generic name that could equally be a chain of comparisons.
    GenericTypeOrExpression,
    /// A plain or dotted name: a type or a value.
    NonGenericTypeOrExpression,
    /// `alias::Name`.
    AliasQualifiedName,
    /// `T?`.
    NullableType,
    /// `T*`, which may also be a multiplication.
    PointerOrMultiplication,
    /// `(T1, T2)`.
    TupleType,
}

impl ScanTypeFlags {
    pub(crate) fn is_type(self) -> bool {
        self != ScanTypeFlags::NotType
    }

    /// Types that cannot be read as an expression.
    pub(crate) fn is_definite(self) -> bool {
        matches!(
            self,
            ScanTypeFlags::MustBeType
                | ScanTypeFlags::GenericTypeOrMethod
                | ScanTypeFlags::AliasQualifiedName
                | ScanTypeFlags::NullableType
                | ScanTypeFlags::TupleType
        )
    }
}

/// Where a type is being scanned; patterns must not swallow the `?` of a conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanMode {
    Normal,
    Pattern,
}

/// Tokens after `>` that confirm a type-argument list in expression context.
pub(crate) fn can_follow_type_argument_list(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::LParen
            | SyntaxKind::RParen
            | SyntaxKind::RBracket
            | SyntaxKind::RBrace
            | SyntaxKind::Colon
            | SyntaxKind::Semicolon
            | SyntaxKind::Comma
            | SyntaxKind::Dot
            | SyntaxKind::Question
            | SyntaxKind::EqEq
            | SyntaxKind::BangEq
            | SyntaxKind::Pipe
            | SyntaxKind::Caret
            | SyntaxKind::AmpAmp
            | SyntaxKind::PipePipe
            | SyntaxKind::Amp
            | SyntaxKind::LBracket
    )
}

/// Tokens that can begin an expression.
pub(crate) fn can_start_expression(kind: SyntaxKind) -> bool {
    kind.is_identifier_like()
        || kind.is_literal()
        || kind.is_predefined_type()
        || matches!(
            kind,
            SyntaxKind::LParen
                | SyntaxKind::Plus
                | SyntaxKind::Minus
                | SyntaxKind::Bang
                | SyntaxKind::Tilde
                | SyntaxKind::PlusPlus
                | SyntaxKind::MinusMinus
                | SyntaxKind::Amp
                | SyntaxKind::Star
                | SyntaxKind::Caret
                | SyntaxKind::DotDot
                | SyntaxKind::ThisKw
                | SyntaxKind::BaseKw
                | SyntaxKind::NewKw
                | SyntaxKind::TypeofKw
                | SyntaxKind::SizeofKw
                | SyntaxKind::DefaultKw
                | SyntaxKind::CheckedKw
                | SyntaxKind::UncheckedKw
                | SyntaxKind::DelegateKw
                | SyntaxKind::ThrowKw
                | SyntaxKind::RefKw
        )
}

/// Tokens after `(T)` that make an ambiguous parenthesized name a cast.
fn can_follow_cast(kind: SyntaxKind) -> bool {
    match kind {
        SyntaxKind::Tilde | SyntaxKind::Bang | SyntaxKind::LParen => true,
        SyntaxKind::AsKw | SyntaxKind::IsKw => false,
        k => k.is_identifier_like() || k.is_literal() || k.is_keyword(),
    }
}

/// Tokens after `T?` in a pattern that keep the `?` as part of the type.
fn can_follow_nullable_in_pattern(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::RParen
            | SyntaxKind::RBracket
            | SyntaxKind::RBrace
            | SyntaxKind::Comma
            | SyntaxKind::Semicolon
            | SyntaxKind::Colon
            | SyntaxKind::FatArrow
            | SyntaxKind::Eof
    )
}

/// Shape of a statement that starts with a scanned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocalShape {
    Declaration,
    Function,
}

impl Parser<'_> {
    pub(super) fn scan_type(&mut self) -> ScanTypeFlags {
        self.lookahead(|p| p.scan_type_core(ScanMode::Normal))
    }

    /// Whether `?` after a type in `mode` belongs to the type.
    pub(super) fn nullable_allowed(&self, mode: ScanMode) -> bool {
        match mode {
            ScanMode::Normal => true,
            ScanMode::Pattern => can_follow_nullable_in_pattern(self.nth(1)),
        }
    }

    /// Scans one type; nested tuple and type-argument scans count against the
    /// recursion guard like any other production.
    pub(super) fn scan_type_core(&mut self, mode: ScanMode) -> ScanTypeFlags {
        if !self.enter() {
            return ScanTypeFlags::NotType;
        }
        let result = self.scan_type_inner(mode);
        self.leave();
        result
    }

    fn scan_type_inner(&mut self, mode: ScanMode) -> ScanTypeFlags {
        let kind = self.current();
        let mut result = if kind.is_predefined_type() {
            self.advance_scan();
            ScanTypeFlags::MustBeType
        } else if kind == SyntaxKind::LParen {
            self.scan_tuple_type()
        } else if self.at_identifier() {
            self.scan_name()
        } else {
            ScanTypeFlags::NotType
        };
        if result == ScanTypeFlags::NotType {
            return result;
        }

        if self.at(SyntaxKind::Question) && self.nullable_allowed(mode) {
            self.advance_scan();
            result = ScanTypeFlags::NullableType;
        }

        while self.at(SyntaxKind::Star) && mode == ScanMode::Normal {
            self.advance_scan();
            result = match result {
                ScanTypeFlags::GenericTypeOrExpression
                | ScanTypeFlags::NonGenericTypeOrExpression
                | ScanTypeFlags::PointerOrMultiplication => ScanTypeFlags::PointerOrMultiplication,
                _ => ScanTypeFlags::MustBeType,
            };
        }

        while self.at(SyntaxKind::LBracket)
            && matches!(self.nth(1), SyntaxKind::RBracket | SyntaxKind::Comma)
        {
            self.advance_scan();
            while self.at(SyntaxKind::Comma) {
                self.advance_scan();
            }
            if !self.at(SyntaxKind::RBracket) {
                return ScanTypeFlags::NotType;
            }
            self.advance_scan();
            result = ScanTypeFlags::MustBeType;
        }

        result
    }

    /// `name`, `a.b.c`, `alias::name`, each segment optionally generic.
    fn scan_name(&mut self) -> ScanTypeFlags {
        let mut result = self.scan_named_type_part();
        if result == ScanTypeFlags::NotType {
            return result;
        }

        let mut alias_qualified = false;
        if self.at(SyntaxKind::ColonColon) {
            self.advance_scan();
            alias_qualified = true;
            result = self.scan_named_type_part();
            if result == ScanTypeFlags::NotType {
                return result;
            }
        }

        while self.at(SyntaxKind::Dot) && self.nth_is_identifier(1) {
            self.advance_scan();
            result = self.scan_named_type_part();
            if result == ScanTypeFlags::NotType {
                return result;
            }
        }

        if alias_qualified && result == ScanTypeFlags::NonGenericTypeOrExpression {
            ScanTypeFlags::AliasQualifiedName
        } else {
            result
        }
    }

    pub(super) fn scan_named_type_part(&mut self) -> ScanTypeFlags {
        if !self.at_identifier() {
            return ScanTypeFlags::NotType;
        }
        self.advance_scan();
        if self.at(SyntaxKind::Less) {
            return self.scan_possible_type_argument_list();
        }
        ScanTypeFlags::NonGenericTypeOrExpression
    }

    /// Scans `< type, ... >` with the cursor on `<`.
    pub(super) fn scan_possible_type_argument_list(&mut self) -> ScanTypeFlags {
        self.advance_scan();

        // `<>` and `<,,>` only appear in `typeof`.
        if matches!(self.current(), SyntaxKind::Greater | SyntaxKind::Comma) {
            while self.at(SyntaxKind::Comma) {
                self.advance_scan();
            }
            if !self.at(SyntaxKind::Greater) {
                return ScanTypeFlags::NotType;
            }
            self.advance_scan();
            return ScanTypeFlags::GenericTypeOrMethod;
        }

        let mut definitely_type = false;
        loop {
            let argument = self.scan_type_core(ScanMode::Normal);
            match argument {
                ScanTypeFlags::NotType => return ScanTypeFlags::NotType,
                ScanTypeFlags::MustBeType
                | ScanTypeFlags::GenericTypeOrMethod
                | ScanTypeFlags::NullableType
                | ScanTypeFlags::TupleType
                | ScanTypeFlags::AliasQualifiedName => definitely_type = true,
                ScanTypeFlags::GenericTypeOrExpression
                | ScanTypeFlags::NonGenericTypeOrExpression
                | ScanTypeFlags::PointerOrMultiplication => {}
            }
            if self.at(SyntaxKind::Comma) {
                self.advance_scan();
                continue;
            }
            break;
        }

        if !self.at(SyntaxKind::Greater) {
            return ScanTypeFlags::NotType;
        }
        self.advance_scan();

        if definitely_type || can_follow_type_argument_list(self.current()) {
            ScanTypeFlags::GenericTypeOrMethod
        } else {
            ScanTypeFlags::GenericTypeOrExpression
        }
    }

    /// `(T1 [name], T2 [name], ...)` with at least two elements.
    fn scan_tuple_type(&mut self) -> ScanTypeFlags {
        self.advance_scan();
        let mut count = 0;
        loop {
            if self.scan_type_core(ScanMode::Normal) == ScanTypeFlags::NotType {
                return ScanTypeFlags::NotType;
            }
            if self.at_identifier() {
                self.advance_scan();
            }
            count += 1;
            if self.at(SyntaxKind::Comma) {
                self.advance_scan();
                continue;
            }
            break;
        }
        if count < 2 || !self.at(SyntaxKind::RParen) {
            return ScanTypeFlags::NotType;
        }
        self.advance_scan();
        ScanTypeFlags::TupleType
    }

    /// Whether the `<` after the identifier under the cursor opens type arguments.
    pub(super) fn is_generic_name_in_expression(&mut self) -> bool {
        if !self.nth_at(1, SyntaxKind::Less) {
            return false;
        }
        self.lookahead(|p| {
            p.advance_scan();
            p.scan_possible_type_argument_list() == ScanTypeFlags::GenericTypeOrMethod
        })
    }

    /// With the cursor on `(`: is this `(T)expr`?
    pub(super) fn scan_cast(&mut self) -> bool {
        self.lookahead(|p| {
            p.advance_scan();
            let flags = p.scan_type_core(ScanMode::Normal);
            if !flags.is_type() || !p.at(SyntaxKind::RParen) {
                return false;
            }
            p.advance_scan();
            match flags {
                ScanTypeFlags::MustBeType
                | ScanTypeFlags::NullableType
                | ScanTypeFlags::PointerOrMultiplication
                | ScanTypeFlags::AliasQualifiedName => can_start_expression(p.current()),
                _ => can_follow_cast(p.current()),
            }
        })
    }

    /// With the cursor on `(` (or `async (`): is this a parenthesized lambda?
    pub(super) fn scan_parenthesized_lambda(&mut self) -> bool {
        self.lookahead(|p| {
            if p.at(SyntaxKind::AsyncKw) {
                p.advance_scan();
            }
            if !p.at(SyntaxKind::LParen) {
                return false;
            }
            let mut depth = 0u32;
            loop {
                match p.current() {
                    SyntaxKind::LParen => depth += 1,
                    SyntaxKind::RParen => {
                        depth -= 1;
                        if depth == 0 {
                            p.advance_scan();
                            return p.at(SyntaxKind::FatArrow);
                        }
                    }
                    SyntaxKind::Semicolon
                    | SyntaxKind::LBrace
                    | SyntaxKind::RBrace
                    | SyntaxKind::FatArrow
                    | SyntaxKind::Eof => return false,
                    _ => {}
                }
                p.advance_scan();
            }
        })
    }

    /// Statement-position check for `[modifiers] type name` followed by a token
    /// that only a declaration allows.
    pub(super) fn scan_local_shape(&mut self) -> Option<LocalShape> {
        self.lookahead(|p| {
            loop {
                match p.current() {
                    SyntaxKind::ConstKw | SyntaxKind::StaticKw | SyntaxKind::ExternKw => {}
                    SyntaxKind::UnsafeKw if !p.nth_at(1, SyntaxKind::LBrace) => {}
                    SyntaxKind::ReadonlyKw if p.nth_at(1, SyntaxKind::RefKw) => {}
                    SyntaxKind::AsyncKw | SyntaxKind::ScopedKw
                        if p.nth_is_identifier(1)
                            || p.nth(1).is_predefined_type()
                            || matches!(p.nth(1), SyntaxKind::RefKw | SyntaxKind::LParen) =>
                    {
                        if p.nth_at(1, SyntaxKind::LParen) && p.scan_parenthesized_lambda() {
                            return None;
                        }
                    }
                    _ => break,
                }
                p.advance_scan();
            }
            if p.at(SyntaxKind::RefKw) {
                p.advance_scan();
                if p.at(SyntaxKind::ReadonlyKw) {
                    p.advance_scan();
                }
            }

            let flags = p.scan_type_core(ScanMode::Normal);
            if !flags.is_type() || !p.at_identifier() {
                return None;
            }
            p.advance_scan();

            match p.current() {
                SyntaxKind::Eq | SyntaxKind::Semicolon | SyntaxKind::Comma => {
                    Some(LocalShape::Declaration)
                }
                SyntaxKind::InKw | SyntaxKind::Colon if flags != ScanTypeFlags::NullableType => {
                    Some(LocalShape::Declaration)
                }
                SyntaxKind::LParen | SyntaxKind::Less if flags != ScanTypeFlags::NullableType => {
                    Some(LocalShape::Function)
                }
                _ => None,
            }
        })
    }

    /// `name:` at the start of a named argument or tuple element.
    pub(super) fn is_named_argument(&self) -> bool {
        self.at_identifier() && self.nth_at(1, SyntaxKind::Colon)
    }

    /// `out T name` / `out var name` inside an argument list.
    pub(super) fn scan_declaration_expression(&mut self) -> bool {
        self.lookahead(|p| {
            if !p.scan_type_core(ScanMode::Normal).is_type() {
                return false;
            }
            (p.at_identifier() || p.at_discard())
                && matches!(
                    p.nth(1),
                    SyntaxKind::Comma | SyntaxKind::RParen | SyntaxKind::RBracket
                )
        })
    }

    /// `ident [typeargs] .` where another name follows: the part before a member
    /// name that names an explicitly implemented interface.
    pub(super) fn scan_explicit_interface_prefix(&mut self) -> bool {
        self.lookahead(|p| {
            let mut saw_dot = false;
            loop {
                if !p.at_identifier() {
                    return false;
                }
                if p.scan_named_type_part() == ScanTypeFlags::NotType {
                    return false;
                }
                if p.at(SyntaxKind::ColonColon) && !saw_dot {
                    p.advance_scan();
                    continue;
                }
                if !p.at(SyntaxKind::Dot) {
                    return saw_dot;
                }
                p.advance_scan();
                saw_dot = true;
                if matches!(p.current(), SyntaxKind::ThisKw | SyntaxKind::OperatorKw) {
                    return true;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn scan(text: &str) -> (ScanTypeFlags, String) {
        let mut p = Parser::new(text, None);
        let flags = p.scan_type_core(ScanMode::Normal);
        (flags, p.current_text().to_string())
    }

    #[test]
    fn predefined_and_array_types_are_definite() {
        assert_eq!(scan("int x").0, ScanTypeFlags::MustBeType);
        assert_eq!(scan("string[] x").0, ScanTypeFlags::MustBeType);
        assert_eq!(scan("T[,] x").0, ScanTypeFlags::MustBeType);
    }

    #[test]
    fn names_stay_ambiguous() {
        assert_eq!(scan("a.b.c = 1").0, ScanTypeFlags::NonGenericTypeOrExpression);
        assert_eq!(scan("a.b.c = 1").1, "=");
        assert_eq!(scan("global::System x").0, ScanTypeFlags::AliasQualifiedName);
        assert_eq!(scan("T* p").0, ScanTypeFlags::PointerOrMultiplication);
        assert_eq!(scan("T? p").0, ScanTypeFlags::NullableType);
    }

    #[test]
    fn type_argument_list_follow_set() {
        assert_eq!(scan("a<b,c>(d)").0, ScanTypeFlags::GenericTypeOrMethod);
        assert_eq!(scan("a<b,c> d").0, ScanTypeFlags::GenericTypeOrExpression);
        assert_eq!(scan("a<int> d").0, ScanTypeFlags::GenericTypeOrMethod);
        assert_eq!(scan("x < y").0, ScanTypeFlags::NotType);
        assert_eq!(scan("List<List<int>> x").0, ScanTypeFlags::GenericTypeOrMethod);
    }

    #[test]
    fn tuple_types_need_two_elements() {
        assert_eq!(scan("(int, string) t").0, ScanTypeFlags::TupleType);
        assert_eq!(scan("(int a, T b) t").0, ScanTypeFlags::TupleType);
        assert_eq!(scan("(int) t").0, ScanTypeFlags::NotType);
    }

    #[test]
    fn cast_disambiguation() {
        let is_cast = |text: &str| Parser::new(text, None).scan_cast();
        assert!(is_cast("(int)a"));
        assert!(is_cast("(int)-a"));
        assert!(is_cast("(T)x"));
        assert!(is_cast("(A.B)(y)"));
        assert!(is_cast("(T)!x"));
        assert!(!is_cast("(x)"));
        assert!(!is_cast("(x) + 1"));
        assert!(!is_cast("(x) as T"));
        assert!(!is_cast("(a, b)"));
    }

    #[test]
    fn lambda_scan_requires_arrow_after_balanced_parens() {
        let is_lambda = |text: &str| Parser::new(text, None).scan_parenthesized_lambda();
        assert!(is_lambda("(x) => x"));
        assert!(is_lambda("(int a, (int, int) b) => a"));
        assert!(is_lambda("async (a) => a"));
        assert!(!is_lambda("(x)"));
        assert!(!is_lambda("(x) + y => z"));
    }

    #[test]
    fn local_shapes() {
        let shape = |text: &str| Parser::new(text, None).scan_local_shape();
        assert_eq!(shape("int x = 1;"), Some(LocalShape::Declaration));
        assert_eq!(shape("var x;"), Some(LocalShape::Declaration));
        assert_eq!(shape("List<int> xs = new();"), Some(LocalShape::Declaration));
        assert_eq!(shape("const int X = 1;"), Some(LocalShape::Declaration));
        assert_eq!(shape("static int F() => 1;"), Some(LocalShape::Function));
        assert_eq!(shape("async Task F() {}"), Some(LocalShape::Function));
        assert_eq!(shape("x = y;"), None);
        assert_eq!(shape("a ? b : c;"), None);
        assert_eq!(shape("a ? b(c) : d;"), None);
        assert_eq!(shape("Foo(x);"), None);
        assert_eq!(shape("a < b;"), None);
    }
}
