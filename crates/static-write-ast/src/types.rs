//! Types, integer values and template arguments of the host program.

use std::fmt;

use crate::decl::DeclId;

/// An integral type: bit width and signedness.
///
/// Widths above 64 bits are not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
    /// Width in bits (1..=64).
    pub bits: u8,
    /// Whether values are two's-complement signed.
    pub signed: bool,
}

impl IntType {
    pub const BOOL: IntType = IntType::new(1, false);
    pub const CHAR: IntType = IntType::new(8, true);
    pub const UCHAR: IntType = IntType::new(8, false);
    pub const SHORT: IntType = IntType::new(16, true);
    pub const USHORT: IntType = IntType::new(16, false);
    pub const INT: IntType = IntType::new(32, true);
    pub const UINT: IntType = IntType::new(32, false);
    pub const LONG: IntType = IntType::new(64, true);
    pub const ULONG: IntType = IntType::new(64, false);

    /// Create an integral type. `bits` is clamped to `1..=64`.
    pub const fn new(bits: u8, signed: bool) -> Self {
        let bits = if bits == 0 {
            1
        } else if bits > 64 {
            64
        } else {
            bits
        };
        Self { bits, signed }
    }
}

/// Width of a floating-point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    /// 32-bit `float`.
    Float,
    /// 64-bit `double`.
    Double,
}

/// A type in the host program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Type<'ast> {
    /// `void`
    Void,
    /// Any integral type, including `bool` and the character types.
    Int(IntType),
    /// Floating point.
    Float(FloatKind),
    /// Pointer to the given type.
    Pointer(&'ast Type<'ast>),
    /// Array with a size known at compile time.
    ConstantArray {
        /// Element type.
        element: &'ast Type<'ast>,
        /// Declared number of elements.
        len: u64,
    },
    /// A class, struct or union.
    Record(DeclId),
}

impl<'ast> Type<'ast> {
    /// Declared size, if this is a fixed-size array.
    pub fn array_len(&self) -> Option<u64> {
        match self {
            Type::ConstantArray { len, .. } => Some(*len),
            _ => None,
        }
    }

    /// Element type, if this is a fixed-size array.
    pub fn array_element(&self) -> Option<&'ast Type<'ast>> {
        match self {
            Type::ConstantArray { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// The integral type, if this is one.
    pub fn as_int(&self) -> Option<IntType> {
        match self {
            Type::Int(ty) => Some(*ty),
            _ => None,
        }
    }

    /// Whether values of this type live in memory and are referred to by
    /// address (arrays and records).
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::ConstantArray { .. } | Type::Record(_))
    }
}

/// A compile-time integer together with its type.
///
/// The value is always normalized to the type's width, so rendering and
/// truncation see what the host program sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntValue {
    value: i128,
    ty: IntType,
}

impl IntValue {
    /// Create a value, wrapping it into the range of `ty`.
    pub fn new(value: i128, ty: IntType) -> Self {
        Self {
            value: wrap(value, ty),
            ty,
        }
    }

    /// The numeric value.
    #[inline]
    pub fn get(&self) -> i128 {
        self.value
    }

    /// The value's type.
    #[inline]
    pub fn ty(&self) -> IntType {
        self.ty
    }

    /// The low-order byte, the unit every array element is emitted as.
    #[inline]
    pub fn low_byte(&self) -> u8 {
        self.value as u8
    }

    /// Convert to another integral type with the host's wrapping rules.
    pub fn cast(&self, ty: IntType) -> IntValue {
        IntValue::new(self.value, ty)
    }

    /// Whether the value is non-zero.
    pub fn is_truthy(&self) -> bool {
        self.value != 0
    }
}

impl fmt::Display for IntValue {
    /// Decimal rendering, signed or unsigned according to the type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

fn wrap(value: i128, ty: IntType) -> i128 {
    let bits = u32::from(ty.bits);
    let modulus = 1i128 << bits;
    let raw = value & (modulus - 1);
    if ty.signed && (raw >> (bits - 1)) & 1 == 1 {
        raw - modulus
    } else {
        raw
    }
}

/// One argument of a class-template specialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateArgument<'ast> {
    /// A non-type integral argument (`Foo<3>`).
    Integral(IntValue),
    /// A type argument (`Foo<int>`).
    Type(Type<'ast>),
    /// A declaration argument (`Foo<&global>`).
    Declaration(DeclId),
    /// A null pointer argument (`Foo<nullptr>`).
    NullPtr,
}

impl TemplateArgument<'_> {
    /// Short name of the argument kind, for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TemplateArgument::Integral(_) => "integral",
            TemplateArgument::Type(_) => "type",
            TemplateArgument::Declaration(_) => "declaration",
            TemplateArgument::NullPtr => "nullptr",
        }
    }
}
