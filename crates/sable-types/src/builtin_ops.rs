//! Builtin binary operator classification.
//!
//! Given an operator and the primitive types of both operands, this module answers
//! whether a predefined operator applies and, if so, which signature: the result
//! type plus the type each operand is implicitly converted to. Everything is driven
//! by static tables indexed by [`PrimitiveType`]; the binder consumes the result and
//! the parser never calls into this module.

/// Primitive operand types known to the builtin operator tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    Object,
}

const TYPE_COUNT: usize = 15;

impl PrimitiveType {
    pub const ALL: [PrimitiveType; TYPE_COUNT] = [
        PrimitiveType::Bool,
        PrimitiveType::Char,
        PrimitiveType::SByte,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::UShort,
        PrimitiveType::Int,
        PrimitiveType::UInt,
        PrimitiveType::Long,
        PrimitiveType::ULong,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Decimal,
        PrimitiveType::String,
        PrimitiveType::Object,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Char
                | PrimitiveType::SByte
                | PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::UShort
                | PrimitiveType::Int
                | PrimitiveType::UInt
                | PrimitiveType::Long
                | PrimitiveType::ULong
        )
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral()
            || matches!(
                self,
                PrimitiveType::Float | PrimitiveType::Double | PrimitiveType::Decimal
            )
    }

    /// Reference types never participate in nullable lifting.
    pub fn is_reference(self) -> bool {
        matches!(self, PrimitiveType::String | PrimitiveType::Object)
    }

    /// Keyword spelling of the type (`int`, `ulong`, ...).
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::SByte => "sbyte",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::UShort => "ushort",
            PrimitiveType::Int => "int",
            PrimitiveType::UInt => "uint",
            PrimitiveType::Long => "long",
            PrimitiveType::ULong => "ulong",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Decimal => "decimal",
            PrimitiveType::String => "string",
            PrimitiveType::Object => "object",
        }
    }

    pub fn from_keyword(text: &str) -> Option<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|ty| ty.keyword() == text)
    }
}

/// An operand type: a primitive plus whether it is the nullable form (`int?`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperandType {
    pub ty: PrimitiveType,
    pub nullable: bool,
}

impl OperandType {
    pub const fn new(ty: PrimitiveType) -> Self {
        Self {
            ty,
            nullable: false,
        }
    }

    pub const fn nullable(ty: PrimitiveType) -> Self {
        Self { ty, nullable: true }
    }
}

impl From<PrimitiveType> for OperandType {
    fn from(ty: PrimitiveType) -> Self {
        OperandType::new(ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Xor,
    LogicalAnd,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperatorCategory {
    Arithmetic,
    Shift,
    Equality,
    Relational,
    Bitwise,
    Logical,
}

impl BinaryOperatorKind {
    fn category(self) -> OperatorCategory {
        match self {
            BinaryOperatorKind::Add
            | BinaryOperatorKind::Sub
            | BinaryOperatorKind::Mul
            | BinaryOperatorKind::Div
            | BinaryOperatorKind::Rem => OperatorCategory::Arithmetic,
            BinaryOperatorKind::Shl | BinaryOperatorKind::Shr => OperatorCategory::Shift,
            BinaryOperatorKind::Eq | BinaryOperatorKind::Ne => OperatorCategory::Equality,
            BinaryOperatorKind::Lt
            | BinaryOperatorKind::Gt
            | BinaryOperatorKind::Le
            | BinaryOperatorKind::Ge => OperatorCategory::Relational,
            BinaryOperatorKind::And | BinaryOperatorKind::Or | BinaryOperatorKind::Xor => {
                OperatorCategory::Bitwise
            }
            BinaryOperatorKind::LogicalAnd | BinaryOperatorKind::LogicalOr => {
                OperatorCategory::Logical
            }
        }
    }

    /// Maps operator token text (`+`, `<<`, `&&`, ...) to an operator kind.
    pub fn from_token(text: &str) -> Option<Self> {
        Some(match text {
            "+" => BinaryOperatorKind::Add,
            "-" => BinaryOperatorKind::Sub,
            "*" => BinaryOperatorKind::Mul,
            "/" => BinaryOperatorKind::Div,
            "%" => BinaryOperatorKind::Rem,
            "<<" => BinaryOperatorKind::Shl,
            ">>" => BinaryOperatorKind::Shr,
            "==" => BinaryOperatorKind::Eq,
            "!=" => BinaryOperatorKind::Ne,
            "<" => BinaryOperatorKind::Lt,
            ">" => BinaryOperatorKind::Gt,
            "<=" => BinaryOperatorKind::Le,
            ">=" => BinaryOperatorKind::Ge,
            "&" => BinaryOperatorKind::And,
            "|" => BinaryOperatorKind::Or,
            "^" => BinaryOperatorKind::Xor,
            "&&" => BinaryOperatorKind::LogicalAnd,
            "||" => BinaryOperatorKind::LogicalOr,
            _ => return None,
        })
    }
}

/// A predefined operator signature selected for a pair of operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuiltinOperatorSignature {
    pub kind: BinaryOperatorKind,
    pub result: OperandType,
    /// Type the left operand is implicitly converted to.
    pub left: OperandType,
    /// Type the right operand is implicitly converted to.
    pub right: OperandType,
}

type Row = [Option<PrimitiveType>; TYPE_COUNT];

const XX: Option<PrimitiveType> = None;
const I4: Option<PrimitiveType> = Some(PrimitiveType::Int);
const U4: Option<PrimitiveType> = Some(PrimitiveType::UInt);
const I8: Option<PrimitiveType> = Some(PrimitiveType::Long);
const U8: Option<PrimitiveType> = Some(PrimitiveType::ULong);
const R4: Option<PrimitiveType> = Some(PrimitiveType::Float);
const R8: Option<PrimitiveType> = Some(PrimitiveType::Double);
const DE: Option<PrimitiveType> = Some(PrimitiveType::Decimal);

/// Binary numeric promotion. Row is the left operand, column the right; the entry
/// is the type both operands are converted to.
///
/// Column order: bool char sbyte byte short ushort int uint long ulong float double
/// decimal string object.
#[rustfmt::skip]
static NUMERIC_PROMOTION: [Row; TYPE_COUNT] = [
    /* bool    */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
    /* char    */ [XX, I4, I4, I4, I4, I4, I4, U4, I8, U8, R4, R8, DE, XX, XX],
    /* sbyte   */ [XX, I4, I4, I4, I4, I4, I4, I8, I8, XX, R4, R8, DE, XX, XX],
    /* byte    */ [XX, I4, I4, I4, I4, I4, I4, U4, I8, U8, R4, R8, DE, XX, XX],
    /* short   */ [XX, I4, I4, I4, I4, I4, I4, I8, I8, XX, R4, R8, DE, XX, XX],
    /* ushort  */ [XX, I4, I4, I4, I4, I4, I4, U4, I8, U8, R4, R8, DE, XX, XX],
    /* int     */ [XX, I4, I4, I4, I4, I4, I4, I8, I8, XX, R4, R8, DE, XX, XX],
    /* uint    */ [XX, U4, I8, U4, I8, U4, I8, U4, I8, U8, R4, R8, DE, XX, XX],
    /* long    */ [XX, I8, I8, I8, I8, I8, I8, I8, I8, XX, R4, R8, DE, XX, XX],
    /* ulong   */ [XX, U8, XX, U8, XX, U8, XX, U8, XX, U8, R4, R8, DE, XX, XX],
    /* float   */ [XX, R4, R4, R4, R4, R4, R4, R4, R4, R4, R4, R8, XX, XX, XX],
    /* double  */ [XX, R8, R8, R8, R8, R8, R8, R8, R8, R8, R8, R8, XX, XX, XX],
    /* decimal */ [XX, DE, DE, DE, DE, DE, DE, DE, DE, DE, XX, XX, DE, XX, XX],
    /* string  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
    /* object  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
];

/// Unary numeric promotion of a shift's left operand. The right operand always
/// converts to `int` and must be one of the types whose entry here is `int`.
#[rustfmt::skip]
static SHIFT_PROMOTION: Row = [
    /* bool char sbyte byte short ushort int uint long ulong float double decimal string object */
    XX, I4, I4, I4, I4, I4, I4, U4, I8, U8, XX, XX, XX, XX, XX,
];

/// Reference and bool operand pairs accepted by `==`/`!=` beyond numeric ones.
/// The entry is the type both operands are compared as.
#[rustfmt::skip]
static EQUALITY_EXTRA: [Row; TYPE_COUNT] = {
    const BO: Option<PrimitiveType> = Some(PrimitiveType::Bool);
    const ST: Option<PrimitiveType> = Some(PrimitiveType::String);
    const OB: Option<PrimitiveType> = Some(PrimitiveType::Object);
    [
        /* bool    */ [BO, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* char    */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* sbyte   */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* byte    */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* short   */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* ushort  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* int     */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* uint    */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* long    */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* ulong   */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* float   */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* double  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* decimal */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX],
        /* string  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, ST, OB],
        /* object  */ [XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, OB, OB],
    ]
};

/// Classifies `left op right` against the predefined operators.
///
/// Returns `None` when no builtin operator applies; the binder then falls back to
/// user-defined operator lookup or reports an error.
pub fn classify_binary_operator(
    kind: BinaryOperatorKind,
    left: OperandType,
    right: OperandType,
) -> Option<BuiltinOperatorSignature> {
    let category = kind.category();
    let (result, left_ty, right_ty) = match category {
        OperatorCategory::Arithmetic => {
            if kind == BinaryOperatorKind::Add {
                if let Some(concat) = string_concatenation(left.ty, right.ty) {
                    return Some(concat);
                }
            }
            let promoted = promote(left.ty, right.ty)?;
            (promoted, promoted, promoted)
        }
        OperatorCategory::Shift => {
            let promoted = SHIFT_PROMOTION[left.ty.index()]?;
            if SHIFT_PROMOTION[right.ty.index()] != I4 {
                return None;
            }
            (promoted, promoted, PrimitiveType::Int)
        }
        OperatorCategory::Equality => {
            let operand = promote(left.ty, right.ty)
                .or(EQUALITY_EXTRA[left.ty.index()][right.ty.index()])?;
            (PrimitiveType::Bool, operand, operand)
        }
        OperatorCategory::Relational => {
            let operand = promote(left.ty, right.ty)?;
            (PrimitiveType::Bool, operand, operand)
        }
        OperatorCategory::Bitwise => {
            if left.ty == PrimitiveType::Bool && right.ty == PrimitiveType::Bool {
                (PrimitiveType::Bool, PrimitiveType::Bool, PrimitiveType::Bool)
            } else if left.ty.is_integral() && right.ty.is_integral() {
                let promoted = promote(left.ty, right.ty)?;
                (promoted, promoted, promoted)
            } else {
                return None;
            }
        }
        OperatorCategory::Logical => {
            if left != OperandType::new(PrimitiveType::Bool)
                || right != OperandType::new(PrimitiveType::Bool)
            {
                return None;
            }
            (PrimitiveType::Bool, PrimitiveType::Bool, PrimitiveType::Bool)
        }
    };

    let lifted = (left.nullable || right.nullable) && !left_ty.is_reference();
    let operand = |ty| OperandType {
        ty,
        nullable: lifted,
    };
    let result = match category {
        OperatorCategory::Equality | OperatorCategory::Relational => OperandType::new(result),
        _ => operand(result),
    };
    Some(BuiltinOperatorSignature {
        kind,
        result,
        left: operand(left_ty),
        right: operand(right_ty),
    })
}

fn promote(left: PrimitiveType, right: PrimitiveType) -> Option<PrimitiveType> {
    NUMERIC_PROMOTION[left.index()][right.index()]
}

fn string_concatenation(
    left: PrimitiveType,
    right: PrimitiveType,
) -> Option<BuiltinOperatorSignature> {
    let (left, right) = match (left, right) {
        (PrimitiveType::String, PrimitiveType::String) => (PrimitiveType::String, PrimitiveType::String),
        (PrimitiveType::String, _) => (PrimitiveType::String, PrimitiveType::Object),
        (_, PrimitiveType::String) => (PrimitiveType::Object, PrimitiveType::String),
        _ => return None,
    };
    Some(BuiltinOperatorSignature {
        kind: BinaryOperatorKind::Add,
        result: OperandType::new(PrimitiveType::String),
        left: OperandType::new(left),
        right: OperandType::new(right),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use super::PrimitiveType as P;

    fn sig(
        kind: BinaryOperatorKind,
        result: OperandType,
        left: OperandType,
        right: OperandType,
    ) -> Option<BuiltinOperatorSignature> {
        Some(BuiltinOperatorSignature {
            kind,
            result,
            left,
            right,
        })
    }

    #[test]
    fn promotion_table_is_symmetric() {
        for left in P::ALL {
            for right in P::ALL {
                assert_eq!(
                    promote(left, right),
                    promote(right, left),
                    "{left:?} vs {right:?}"
                );
            }
        }
    }

    #[test]
    fn small_integers_promote_to_int() {
        let byte = OperandType::new(P::Byte);
        let short = OperandType::new(P::Short);
        let int = OperandType::new(P::Int);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Add, byte, short),
            sig(BinaryOperatorKind::Add, int, int, int)
        );
    }

    #[test]
    fn int_and_uint_widen_to_long() {
        let long = OperandType::new(P::Long);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Mul, P::Int.into(), P::UInt.into()),
            sig(BinaryOperatorKind::Mul, long, long, long)
        );
    }

    #[test]
    fn ulong_does_not_mix_with_signed_operands() {
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Add, P::ULong.into(), P::Int.into()),
            None
        );
        assert!(
            classify_binary_operator(BinaryOperatorKind::Add, P::ULong.into(), P::UInt.into())
                .is_some()
        );
    }

    #[test]
    fn decimal_does_not_mix_with_floating_point() {
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Sub, P::Decimal.into(), P::Double.into()),
            None
        );
        let dec = OperandType::new(P::Decimal);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Sub, P::Decimal.into(), P::Long.into()),
            sig(BinaryOperatorKind::Sub, dec, dec, dec)
        );
    }

    #[test]
    fn string_concatenation_converts_other_side_to_object() {
        let string = OperandType::new(P::String);
        let object = OperandType::new(P::Object);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Add, P::Int.into(), P::String.into()),
            sig(BinaryOperatorKind::Add, string, object, string)
        );
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Sub, P::Int.into(), P::String.into()),
            None
        );
    }

    #[test]
    fn shift_promotes_left_and_requires_int_convertible_right() {
        let uint = OperandType::new(P::UInt);
        let int = OperandType::new(P::Int);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Shl, P::UInt.into(), P::Byte.into()),
            sig(BinaryOperatorKind::Shl, uint, uint, int)
        );
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Shr, P::Int.into(), P::Long.into()),
            None
        );
    }

    #[test]
    fn comparisons_yield_bool_even_when_lifted() {
        let signature = classify_binary_operator(
            BinaryOperatorKind::Lt,
            OperandType::nullable(P::Int),
            P::Double.into(),
        )
        .unwrap();
        assert_eq!(signature.result, OperandType::new(P::Bool));
        assert_eq!(signature.left, OperandType::nullable(P::Double));
        assert_eq!(signature.right, OperandType::nullable(P::Double));
    }

    #[test]
    fn lifted_arithmetic_has_nullable_result() {
        let signature = classify_binary_operator(
            BinaryOperatorKind::Add,
            OperandType::nullable(P::Int),
            P::Int.into(),
        )
        .unwrap();
        assert_eq!(signature.result, OperandType::nullable(P::Int));
    }

    #[test]
    fn equality_covers_bool_and_reference_types() {
        let object = OperandType::new(P::Object);
        let boolean = OperandType::new(P::Bool);
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Eq, P::String.into(), P::Object.into()),
            sig(BinaryOperatorKind::Eq, boolean, object, object)
        );
        assert!(
            classify_binary_operator(BinaryOperatorKind::Ne, P::Bool.into(), P::Bool.into())
                .is_some()
        );
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::Lt, P::Bool.into(), P::Bool.into()),
            None
        );
    }

    #[test]
    fn bitwise_accepts_bool_pairs_and_integrals_only() {
        assert!(
            classify_binary_operator(BinaryOperatorKind::Xor, P::Bool.into(), P::Bool.into())
                .is_some()
        );
        assert_eq!(
            classify_binary_operator(BinaryOperatorKind::And, P::Int.into(), P::Float.into()),
            None
        );
    }

    #[test]
    fn logical_operators_are_never_lifted() {
        assert_eq!(
            classify_binary_operator(
                BinaryOperatorKind::LogicalAnd,
                OperandType::nullable(P::Bool),
                P::Bool.into()
            ),
            None
        );
    }

    #[test]
    fn operator_tokens_map_to_kinds() {
        assert_eq!(BinaryOperatorKind::from_token(">>"), Some(BinaryOperatorKind::Shr));
        assert_eq!(BinaryOperatorKind::from_token("??"), None);
        assert_eq!(P::from_keyword("ushort"), Some(P::UShort));
    }
}
