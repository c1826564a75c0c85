//! Values produced by constant folding.

use std::fmt;

use ordered_float::OrderedFloat;
use static_write_ast::{DeclId, Expr, FloatKind, IntValue, Type};

/// A folded constant.
///
/// Produced by a [`ConstantFolder`](crate::ConstantFolder) and only read by
/// the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue<'ast> {
    /// Integer, `bool` or character value
    Int(IntValue),
    /// Floating-point value
    Float(FloatValue),
    /// Array or aggregate, element by element
    Array(ArrayValue<'ast>),
    /// A reference to storage: a declaration or a literal
    LValue(LValueBase<'ast>),
}

impl<'ast> ConstantValue<'ast> {
    /// Short name of the value's shape, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ConstantValue::Int(_) => "an integer",
            ConstantValue::Float(_) => "a floating-point",
            ConstantValue::Array(_) => "an array",
            ConstantValue::LValue(_) => "a reference",
        }
    }

    pub fn as_int(&self) -> Option<IntValue> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue<'ast>> {
        match self {
            ConstantValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// The zero value of `ty`, used to fill the unwritten tail of an array.
    ///
    /// Pointers and records have no zero value here.
    pub fn zero_of(ty: Type<'ast>) -> Option<ConstantValue<'ast>> {
        match ty {
            Type::Int(int) => Some(ConstantValue::Int(IntValue::new(0, int))),
            Type::Float(kind) => Some(ConstantValue::Float(FloatValue::new(0.0, kind))),
            Type::ConstantArray { element, .. } => Some(ConstantValue::Array(ArrayValue::new(
                Vec::new(),
                ConstantValue::zero_of(*element),
            ))),
            Type::Void | Type::Pointer(_) | Type::Record(_) => None,
        }
    }
}

/// A floating-point constant, rounded to the precision of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatValue {
    value: OrderedFloat<f64>,
    kind: FloatKind,
}

impl FloatValue {
    pub fn new(value: f64, kind: FloatKind) -> Self {
        let value = match kind {
            FloatKind::Float => value as f32 as f64,
            FloatKind::Double => value,
        };
        Self {
            value: OrderedFloat(value),
            kind,
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.into_inner()
    }

    #[inline]
    pub fn kind(&self) -> FloatKind {
        self.kind
    }
}

impl fmt::Display for FloatValue {
    /// Shortest text that reads back as the same value at the value's own
    /// precision: `0.1`, `2.0`, `1e300`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FloatKind::Float => write!(f, "{:?}", self.get() as f32),
            FloatKind::Double => write!(f, "{:?}", self.get()),
        }
    }
}

/// An array constant.
///
/// `elements` holds the explicitly initialized elements; every index past
/// them reads as `filler` when the declared length is longer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayValue<'ast> {
    elements: Vec<ConstantValue<'ast>>,
    filler: Option<Box<ConstantValue<'ast>>>,
}

impl<'ast> ArrayValue<'ast> {
    pub fn new(elements: Vec<ConstantValue<'ast>>, filler: Option<ConstantValue<'ast>>) -> Self {
        Self {
            elements,
            filler: filler.map(Box::new),
        }
    }

    /// Explicitly initialized elements.
    pub fn elements(&self) -> &[ConstantValue<'ast>] {
        &self.elements
    }

    pub fn filler(&self) -> Option<&ConstantValue<'ast>> {
        self.filler.as_deref()
    }

    /// The element at `index`, falling back to the filler.
    pub fn element(&self, index: usize) -> Option<&ConstantValue<'ast>> {
        self.elements.get(index).or_else(|| self.filler())
    }

    /// Shape the array for a declared length of `len`: the filler applies
    /// only when fewer than `len` elements were written.
    pub fn fit(mut self, len: u64, filler: Option<ConstantValue<'ast>>) -> Self {
        self.filler = if (self.elements.len() as u64) < len {
            filler.map(Box::new)
        } else {
            None
        };
        self
    }
}

/// What an lvalue refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LValueBase<'ast> {
    /// A declared variable or function
    Decl(DeclId),
    /// A literal with static storage, such as a string literal
    Expr(&'ast Expr<'ast>),
}
