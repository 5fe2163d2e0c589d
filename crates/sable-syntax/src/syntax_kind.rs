use rowan::Language;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Unified syntax kind for both tokens and tree nodes.
///
/// This enum is intentionally "fat": having a stable set of kinds is a
/// prerequisite for typed AST wrappers and for the incremental reparser, which
/// compares node kinds across parses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u16)]
pub enum SyntaxKind {
    // --- Trivia ---
    Whitespace,
    LineComment,
    BlockComment,
    DocComment,

    // --- Identifiers & literals ---
    Identifier,
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,
    InterpolatedStringLiteral,
    RawStringLiteral,

    // --- Keywords (reserved) ---
    AbstractKw,
    AsKw,
    BaseKw,
    BoolKw,
    BreakKw,
    ByteKw,
    CaseKw,
    CatchKw,
    CharKw,
    CheckedKw,
    ClassKw,
    ConstKw,
    ContinueKw,
    DecimalKw,
    DefaultKw,
    DelegateKw,
    DoKw,
    DoubleKw,
    ElseKw,
    EnumKw,
    EventKw,
    ExplicitKw,
    ExternKw,
    FinallyKw,
    FixedKw,
    FloatKw,
    ForKw,
    ForeachKw,
    GotoKw,
    IfKw,
    ImplicitKw,
    InKw,
    IntKw,
    InterfaceKw,
    InternalKw,
    IsKw,
    LockKw,
    LongKw,
    NamespaceKw,
    NewKw,
    ObjectKw,
    OperatorKw,
    OutKw,
    OverrideKw,
    ParamsKw,
    PrivateKw,
    ProtectedKw,
    PublicKw,
    ReadonlyKw,
    RefKw,
    ReturnKw,
    SbyteKw,
    SealedKw,
    ShortKw,
    SizeofKw,
    StackallocKw,
    StaticKw,
    StringKw,
    StructKw,
    SwitchKw,
    ThisKw,
    ThrowKw,
    TryKw,
    TypeofKw,
    UintKw,
    UlongKw,
    UncheckedKw,
    UnsafeKw,
    UshortKw,
    UsingKw,
    VirtualKw,
    VoidKw,
    VolatileKw,
    WhileKw,

    // Literal keywords.
    TrueKw,
    FalseKw,
    NullKw,

    // --- Contextual keywords ---
    AddKw,
    AliasKw,
    AndKw,
    AscendingKw,
    AsyncKw,
    AwaitKw,
    ByKw,
    DescendingKw,
    EqualsKw,
    FileKw,
    FromKw,
    GetKw,
    GlobalKw,
    GroupKw,
    InitKw,
    IntoKw,
    JoinKw,
    LetKw,
    NotKw,
    OnKw,
    OrKw,
    OrderbyKw,
    PartialKw,
    RecordKw,
    RemoveKw,
    RequiredKw,
    ScopedKw,
    SelectKw,
    SetKw,
    VarKw,
    WhenKw,
    WhereKw,
    WithKw,
    YieldKw,

    // --- Operators / punctuation ---
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    Colon,
    ColonColon,
    Question,
    QuestionQuestion,
    QuestionQuestionEq,
    /// `->`
    Arrow,
    /// `=>`
    FatArrow,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Bang,
    Tilde,

    Eq,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    AmpAmp,
    PipePipe,
    PlusPlus,
    MinusMinus,

    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,

    LeftShift,
    LeftShiftEq,
    /// Never produced by the lexer: the parser joins two adjacent `>` tokens.
    RightShift,
    /// Never produced by the lexer: the parser joins adjacent `>` and `>=`.
    RightShiftEq,

    // --- Special ---
    Error,
    Eof,

    // --- Roots ---
    CompilationUnit,
    StatementFragment,
    MemberFragment,
    ExpressionFragment,

    // --- Declarations ---
    ExternAliasDirective,
    UsingDirective,
    NameEquals,
    NamespaceDeclaration,
    FileScopedNamespaceDeclaration,
    GlobalStatement,
    AttributeList,
    AttributeTargetSpecifier,
    Attribute,
    AttributeArgumentList,
    AttributeArgument,
    NameColon,
    Modifiers,

    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    RecordDeclaration,
    EnumDeclaration,
    DelegateDeclaration,
    EnumMemberDeclaration,
    BaseList,
    SimpleBaseType,
    PrimaryConstructorBaseType,
    TypeParameterList,
    TypeParameter,
    TypeParameterConstraintClause,
    TypeConstraint,
    ConstructorConstraint,
    ClassOrStructConstraint,
    DefaultConstraint,

    FieldDeclaration,
    EventFieldDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    ConstructorInitializer,
    DestructorDeclaration,
    PropertyDeclaration,
    EventDeclaration,
    IndexerDeclaration,
    OperatorDeclaration,
    ConversionOperatorDeclaration,
    IncompleteMember,
    AccessorList,
    AccessorDeclaration,
    ArrowExpressionClause,
    EqualsValueClause,
    ExplicitInterfaceSpecifier,
    ParameterList,
    BracketedParameterList,
    Parameter,
    VariableDeclaration,
    VariableDeclarator,

    // --- Names & types ---
    IdentifierName,
    GenericName,
    TypeArgumentList,
    OmittedTypeArgument,
    QualifiedName,
    AliasQualifiedName,
    PredefinedType,
    ArrayType,
    ArrayRankSpecifier,
    OmittedArraySizeExpression,
    NullableType,
    PointerType,
    TupleType,
    TupleElement,
    RefType,

    // --- Statements ---
    Block,
    EmptyStatement,
    LabeledStatement,
    LocalDeclarationStatement,
    LocalFunctionStatement,
    ExpressionStatement,
    IfStatement,
    ElseClause,
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
    CatchClause,
    CatchDeclaration,
    CatchFilterClause,
    FinallyClause,
    SwitchStatement,
    SwitchSection,
    CasePatternSwitchLabel,
    DefaultSwitchLabel,
    WhenClause,
    UsingStatement,
    LockStatement,
    CheckedStatement,
    UnsafeStatement,
    FixedStatement,

    // --- Expressions ---
    LiteralExpression,
    ThisExpression,
    BaseExpression,
    ParenthesizedExpression,
    TupleExpression,
    Argument,
    ArgumentList,
    BracketedArgumentList,
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
    AnonymousObjectMemberDeclarator,
    InitializerExpression,
    TypeOfExpression,
    SizeOfExpression,
    DefaultExpression,
    CheckedExpression,
    DeclarationExpression,
    RefExpression,
    SwitchExpression,
    SwitchExpressionArm,
    WithExpression,

    // --- Queries ---
    QueryExpression,
    FromClause,
    QueryBody,
    LetClause,
    WhereClause,
    JoinClause,
    JoinIntoClause,
    OrderByClause,
    Ordering,
    SelectClause,
    GroupClause,
    QueryContinuation,

    // --- Patterns & designations ---
    ConstantPattern,
    DeclarationPattern,
    VarPattern,
    DiscardPattern,
    TypePattern,
    RelationalPattern,
    BinaryPattern,
    UnaryPattern,
    ParenthesizedPattern,
    SingleVariableDesignation,
    DiscardDesignation,

    __Last,
}

impl SyntaxKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::Whitespace
                | SyntaxKind::LineComment
                | SyntaxKind::BlockComment
                | SyntaxKind::DocComment
        )
    }

    pub fn is_keyword(self) -> bool {
        (SyntaxKind::AbstractKw as u16..=SyntaxKind::YieldKw as u16).contains(&(self as u16))
    }

    pub fn is_contextual_keyword(self) -> bool {
        (SyntaxKind::AddKw as u16..=SyntaxKind::YieldKw as u16).contains(&(self as u16))
    }

    pub fn is_identifier_like(self) -> bool {
        self == SyntaxKind::Identifier || self.is_contextual_keyword()
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::IntLiteral
                | SyntaxKind::RealLiteral
                | SyntaxKind::CharLiteral
                | SyntaxKind::StringLiteral
                | SyntaxKind::InterpolatedStringLiteral
                | SyntaxKind::RawStringLiteral
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
        )
    }

    pub fn is_punctuation(self) -> bool {
        (SyntaxKind::LParen as u16..=SyntaxKind::RightShiftEq as u16).contains(&(self as u16))
    }

    /// Builtin type keywords, including `void`.
    pub fn is_predefined_type(self) -> bool {
        matches!(
            self,
            SyntaxKind::BoolKw
                | SyntaxKind::ByteKw
                | SyntaxKind::SbyteKw
                | SyntaxKind::ShortKw
                | SyntaxKind::UshortKw
                | SyntaxKind::IntKw
                | SyntaxKind::UintKw
                | SyntaxKind::LongKw
                | SyntaxKind::UlongKw
                | SyntaxKind::CharKw
                | SyntaxKind::FloatKw
                | SyntaxKind::DoubleKw
                | SyntaxKind::DecimalKw
                | SyntaxKind::StringKw
                | SyntaxKind::ObjectKw
                | SyntaxKind::VoidKw
        )
    }

    /// Declaration modifiers. `async`, `partial`, `required`, `file` and `scoped`
    /// are contextual and only act as modifiers in declaration position.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            SyntaxKind::PublicKw
                | SyntaxKind::PrivateKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::InternalKw
                | SyntaxKind::StaticKw
                | SyntaxKind::AbstractKw
                | SyntaxKind::SealedKw
                | SyntaxKind::VirtualKw
                | SyntaxKind::OverrideKw
                | SyntaxKind::ReadonlyKw
                | SyntaxKind::ExternKw
                | SyntaxKind::UnsafeKw
                | SyntaxKind::VolatileKw
                | SyntaxKind::NewKw
                | SyntaxKind::FixedKw
                | SyntaxKind::AsyncKw
                | SyntaxKind::PartialKw
                | SyntaxKind::RequiredKw
                | SyntaxKind::FileKw
        )
    }

    /// Contextual keywords that only act as keywords inside a query expression.
    pub fn is_query_contextual_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::FromKw
                | SyntaxKind::WhereKw
                | SyntaxKind::SelectKw
                | SyntaxKind::GroupKw
                | SyntaxKind::IntoKw
                | SyntaxKind::OrderbyKw
                | SyntaxKind::JoinKw
                | SyntaxKind::LetKw
                | SyntaxKind::OnKw
                | SyntaxKind::EqualsKw
                | SyntaxKind::ByKw
                | SyntaxKind::AscendingKw
                | SyntaxKind::DescendingKw
        )
    }

    /// `=`, `+=`, ... including the parser-synthesized `>>=`.
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            SyntaxKind::Eq
                | SyntaxKind::PlusEq
                | SyntaxKind::MinusEq
                | SyntaxKind::StarEq
                | SyntaxKind::SlashEq
                | SyntaxKind::PercentEq
                | SyntaxKind::AmpEq
                | SyntaxKind::PipeEq
                | SyntaxKind::CaretEq
                | SyntaxKind::LeftShiftEq
                | SyntaxKind::RightShiftEq
                | SyntaxKind::QuestionQuestionEq
        )
    }

    pub fn is_type_declaration_keyword(self) -> bool {
        matches!(
            self,
            SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::DelegateKw
        )
    }

    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            // Reserved keywords.
            "abstract" => SyntaxKind::AbstractKw,
            "as" => SyntaxKind::AsKw,
            "base" => SyntaxKind::BaseKw,
            "bool" => SyntaxKind::BoolKw,
            "break" => SyntaxKind::BreakKw,
            "byte" => SyntaxKind::ByteKw,
            "case" => SyntaxKind::CaseKw,
            "catch" => SyntaxKind::CatchKw,
            "char" => SyntaxKind::CharKw,
            "checked" => SyntaxKind::CheckedKw,
            "class" => SyntaxKind::ClassKw,
            "const" => SyntaxKind::ConstKw,
            "continue" => SyntaxKind::ContinueKw,
            "decimal" => SyntaxKind::DecimalKw,
            "default" => SyntaxKind::DefaultKw,
            "delegate" => SyntaxKind::DelegateKw,
            "do" => SyntaxKind::DoKw,
            "double" => SyntaxKind::DoubleKw,
            "else" => SyntaxKind::ElseKw,
            "enum" => SyntaxKind::EnumKw,
            "event" => SyntaxKind::EventKw,
            "explicit" => SyntaxKind::ExplicitKw,
            "extern" => SyntaxKind::ExternKw,
            "finally" => SyntaxKind::FinallyKw,
            "fixed" => SyntaxKind::FixedKw,
            "float" => SyntaxKind::FloatKw,
            "for" => SyntaxKind::ForKw,
            "foreach" => SyntaxKind::ForeachKw,
            "goto" => SyntaxKind::GotoKw,
            "if" => SyntaxKind::IfKw,
            "implicit" => SyntaxKind::ImplicitKw,
            "in" => SyntaxKind::InKw,
            "int" => SyntaxKind::IntKw,
            "interface" => SyntaxKind::InterfaceKw,
            "internal" => SyntaxKind::InternalKw,
            "is" => SyntaxKind::IsKw,
            "lock" => SyntaxKind::LockKw,
            "long" => SyntaxKind::LongKw,
            "namespace" => SyntaxKind::NamespaceKw,
            "new" => SyntaxKind::NewKw,
            "object" => SyntaxKind::ObjectKw,
            "operator" => SyntaxKind::OperatorKw,
            "out" => SyntaxKind::OutKw,
            "override" => SyntaxKind::OverrideKw,
            "params" => SyntaxKind::ParamsKw,
            "private" => SyntaxKind::PrivateKw,
            "protected" => SyntaxKind::ProtectedKw,
            "public" => SyntaxKind::PublicKw,
            "readonly" => SyntaxKind::ReadonlyKw,
            "ref" => SyntaxKind::RefKw,
            "return" => SyntaxKind::ReturnKw,
            "sbyte" => SyntaxKind::SbyteKw,
            "sealed" => SyntaxKind::SealedKw,
            "short" => SyntaxKind::ShortKw,
            "sizeof" => SyntaxKind::SizeofKw,
            "stackalloc" => SyntaxKind::StackallocKw,
            "static" => SyntaxKind::StaticKw,
            "string" => SyntaxKind::StringKw,
            "struct" => SyntaxKind::StructKw,
            "switch" => SyntaxKind::SwitchKw,
            "this" => SyntaxKind::ThisKw,
            "throw" => SyntaxKind::ThrowKw,
            "try" => SyntaxKind::TryKw,
            "typeof" => SyntaxKind::TypeofKw,
            "uint" => SyntaxKind::UintKw,
            "ulong" => SyntaxKind::UlongKw,
            "unchecked" => SyntaxKind::UncheckedKw,
            "unsafe" => SyntaxKind::UnsafeKw,
            "ushort" => SyntaxKind::UshortKw,
            "using" => SyntaxKind::UsingKw,
            "virtual" => SyntaxKind::VirtualKw,
            "void" => SyntaxKind::VoidKw,
            "volatile" => SyntaxKind::VolatileKw,
            "while" => SyntaxKind::WhileKw,

            // Literal keywords.
            "true" => SyntaxKind::TrueKw,
            "false" => SyntaxKind::FalseKw,
            "null" => SyntaxKind::NullKw,

            // Contextual keywords.
            "add" => SyntaxKind::AddKw,
            "alias" => SyntaxKind::AliasKw,
            "and" => SyntaxKind::AndKw,
            "ascending" => SyntaxKind::AscendingKw,
            "async" => SyntaxKind::AsyncKw,
            "await" => SyntaxKind::AwaitKw,
            "by" => SyntaxKind::ByKw,
            "descending" => SyntaxKind::DescendingKw,
            "equals" => SyntaxKind::EqualsKw,
            "file" => SyntaxKind::FileKw,
            "from" => SyntaxKind::FromKw,
            "get" => SyntaxKind::GetKw,
            "global" => SyntaxKind::GlobalKw,
            "group" => SyntaxKind::GroupKw,
            "init" => SyntaxKind::InitKw,
            "into" => SyntaxKind::IntoKw,
            "join" => SyntaxKind::JoinKw,
            "let" => SyntaxKind::LetKw,
            "not" => SyntaxKind::NotKw,
            "on" => SyntaxKind::OnKw,
            "or" => SyntaxKind::OrKw,
            "orderby" => SyntaxKind::OrderbyKw,
            "partial" => SyntaxKind::PartialKw,
            "record" => SyntaxKind::RecordKw,
            "remove" => SyntaxKind::RemoveKw,
            "required" => SyntaxKind::RequiredKw,
            "scoped" => SyntaxKind::ScopedKw,
            "select" => SyntaxKind::SelectKw,
            "set" => SyntaxKind::SetKw,
            "var" => SyntaxKind::VarKw,
            "when" => SyntaxKind::WhenKw,
            "where" => SyntaxKind::WhereKw,
            "with" => SyntaxKind::WithKw,
            "yield" => SyntaxKind::YieldKw,

            _ => return None,
        })
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(value: SyntaxKind) -> Self {
        rowan::SyntaxKind(value as u16)
    }
}

/// Rowan language marker for Sable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SableLanguage {}

impl Language for SableLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> SyntaxKind {
        if raw.0 < SyntaxKind::__Last as u16 {
            // SAFETY: We've verified the numeric value is within the enum range.
            unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
        } else {
            SyntaxKind::Error
        }
    }

    fn kind_to_raw(kind: SyntaxKind) -> rowan::SyntaxKind {
        kind.into()
    }
}
