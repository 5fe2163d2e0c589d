use crate::ast::{support, AstNode};
use crate::parser::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// A wrapper accepting exactly one node kind.
macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self { syntax })
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

/// A wrapper accepting any of a family of node kinds.
macro_rules! ast_family {
    ($name:ident, [$($kind:ident),+ $(,)?]) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SyntaxKind) -> bool {
                matches!(kind, $(SyntaxKind::$kind)|+)
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                Self::can_cast(syntax.kind()).then_some(Self { syntax })
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }

        impl $name {
            pub fn kind(&self) -> SyntaxKind {
                self.syntax.kind()
            }
        }
    };
}

ast_node!(CompilationUnit, CompilationUnit);
ast_node!(UsingDirective, UsingDirective);
ast_node!(NamespaceDeclaration, NamespaceDeclaration);
ast_node!(ClassDeclaration, ClassDeclaration);
ast_node!(MethodDeclaration, MethodDeclaration);
ast_node!(Modifiers, Modifiers);
ast_node!(ParameterList, ParameterList);
ast_node!(Parameter, Parameter);
ast_node!(Block, Block);
ast_node!(BinaryExpression, BinaryExpression);
ast_node!(InvocationExpression, InvocationExpression);
ast_node!(ArgumentList, ArgumentList);
ast_node!(Argument, Argument);

ast_family!(Name, [IdentifierName, GenericName, QualifiedName, AliasQualifiedName]);

ast_family!(
    TypeDeclaration,
    [
        ClassDeclaration,
        StructDeclaration,
        InterfaceDeclaration,
        RecordDeclaration,
    ]
);

ast_family!(
    Member,
    [
        NamespaceDeclaration,
        FileScopedNamespaceDeclaration,
        ClassDeclaration,
        StructDeclaration,
        InterfaceDeclaration,
        RecordDeclaration,
        EnumDeclaration,
        DelegateDeclaration,
        FieldDeclaration,
        EventFieldDeclaration,
        MethodDeclaration,
        ConstructorDeclaration,
        DestructorDeclaration,
        PropertyDeclaration,
        EventDeclaration,
        IndexerDeclaration,
        OperatorDeclaration,
        ConversionOperatorDeclaration,
        IncompleteMember,
        GlobalStatement,
    ]
);

ast_family!(
    Statement,
    [
        Block,
        EmptyStatement,
        LabeledStatement,
        LocalDeclarationStatement,
        LocalFunctionStatement,
        ExpressionStatement,
        IfStatement,
        WhileStatement,
        DoStatement,
        ForStatement,
        ForEachStatement,
        BreakStatement,
        ContinueStatement,
        ReturnStatement,
        ThrowStatement,
        YieldReturnStatement,
        YieldBreakStatement,
        GotoStatement,
        GotoCaseStatement,
        GotoDefaultStatement,
        TryStatement,
        SwitchStatement,
        UsingStatement,
        LockStatement,
        CheckedStatement,
        UnsafeStatement,
        FixedStatement,
    ]
);

ast_family!(
    Expression,
    [
        IdentifierName,
        GenericName,
        QualifiedName,
        AliasQualifiedName,
        PredefinedType,
        LiteralExpression,
        ThisExpression,
        BaseExpression,
        ParenthesizedExpression,
        TupleExpression,
        InvocationExpression,
        ElementAccessExpression,
        MemberAccessExpression,
        ConditionalAccessExpression,
        MemberBindingExpression,
        ElementBindingExpression,
        PostfixUnaryExpression,
        PrefixUnaryExpression,
        AwaitExpression,
        BinaryExpression,
        AssignmentExpression,
        ConditionalExpression,
        CastExpression,
        IsPatternExpression,
        RangeExpression,
        ThrowExpression,
        SimpleLambdaExpression,
        ParenthesizedLambdaExpression,
        AnonymousMethodExpression,
        ObjectCreationExpression,
        ImplicitObjectCreationExpression,
        ArrayCreationExpression,
        ImplicitArrayCreationExpression,
        AnonymousObjectCreationExpression,
        InitializerExpression,
        TypeOfExpression,
        SizeOfExpression,
        DefaultExpression,
        CheckedExpression,
        DeclarationExpression,
        RefExpression,
        SwitchExpression,
        WithExpression,
        QueryExpression,
    ]
);

impl CompilationUnit {
    pub fn usings(&self) -> impl Iterator<Item = UsingDirective> + '_ {
        support::children(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        support::children(&self.syntax)
    }
}

impl UsingDirective {
    pub fn is_global(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::GlobalKw).is_some()
    }

    pub fn is_static(&self) -> bool {
        support::token(&self.syntax, SyntaxKind::StaticKw).is_some()
    }

    /// `using Alias = Target;`
    pub fn alias(&self) -> Option<SyntaxToken> {
        let name_equals = self
            .syntax
            .children()
            .find(|n| n.kind() == SyntaxKind::NameEquals)?;
        support::ident_token(&name_equals).or_else(|| {
            name_equals
                .children()
                .find_map(Name::cast)
                .and_then(|name| support::ident_token(name.syntax()))
        })
    }

    pub fn name(&self) -> Option<Name> {
        support::child(&self.syntax)
    }
}

impl NamespaceDeclaration {
    pub fn name(&self) -> Option<Name> {
        support::child(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        support::children(&self.syntax)
    }
}

impl Name {
    pub fn text(&self) -> String {
        support::compact_text(&self.syntax)
    }
}

impl TypeDeclaration {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        support::children(&self.syntax)
    }
}

impl ClassDeclaration {
    pub fn name(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn members(&self) -> impl Iterator<Item = Member> + '_ {
        support::children(&self.syntax)
    }

    pub fn methods(&self) -> impl Iterator<Item = MethodDeclaration> + '_ {
        support::children(&self.syntax)
    }
}

impl Modifiers {
    pub fn keywords(&self) -> impl Iterator<Item = SyntaxToken> + '_ {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .filter(|t| !t.kind().is_trivia())
    }

    pub fn has(&self, kind: SyntaxKind) -> bool {
        self.keywords().any(|t| t.kind() == kind)
    }
}

impl MethodDeclaration {
    pub fn name(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    pub fn modifiers(&self) -> Option<Modifiers> {
        support::child(&self.syntax)
    }

    pub fn is_async(&self) -> bool {
        self.modifiers()
            .is_some_and(|m| m.has(SyntaxKind::AsyncKw))
    }

    pub fn parameter_list(&self) -> Option<ParameterList> {
        support::child(&self.syntax)
    }

    /// `None` for abstract, partial and expression-bodied methods.
    pub fn body(&self) -> Option<Block> {
        support::child(&self.syntax)
    }
}

impl ParameterList {
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> + '_ {
        support::children(&self.syntax)
    }
}

impl Parameter {
    pub fn name_token(&self) -> Option<SyntaxToken> {
        support::ident_token(&self.syntax)
    }

    /// The declared type, absent for untyped lambda parameters.
    pub fn ty(&self) -> Option<SyntaxNode> {
        self.syntax
            .children()
            .find(|n| {
                !matches!(
                    n.kind(),
                    SyntaxKind::AttributeList | SyntaxKind::Modifiers | SyntaxKind::EqualsValueClause
                )
            })
    }
}

impl Block {
    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        support::children(&self.syntax)
    }
}

impl BinaryExpression {
    pub fn lhs(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn op_token(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }

    pub fn rhs(&self) -> Option<Expression> {
        self.syntax.children().filter_map(Expression::cast).nth(1)
    }
}

impl InvocationExpression {
    pub fn callee(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }

    pub fn argument_list(&self) -> Option<ArgumentList> {
        support::child(&self.syntax)
    }
}

impl ArgumentList {
    pub fn arguments(&self) -> impl Iterator<Item = Argument> + '_ {
        support::children(&self.syntax)
    }
}

impl Argument {
    pub fn expression(&self) -> Option<Expression> {
        support::child(&self.syntax)
    }
}
