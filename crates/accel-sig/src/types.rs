use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse::{SignatureParseError, parse_return_type, parse_type};

/// Element type of a scalar argument or of an array's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Bool,

    // ── Signed integers ─────────────────────────────────────────────────────
    Int8,
    Int16,
    Int32,
    Int64,

    // ── Unsigned integers ───────────────────────────────────────────────────
    UInt8,
    UInt16,
    UInt32,
    UInt64,

    // ── Floating point ──────────────────────────────────────────────────────
    Float16,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl ScalarType {
    pub const ALL: [ScalarType; 14] = [
        ScalarType::Bool,
        ScalarType::Int8,
        ScalarType::Int16,
        ScalarType::Int32,
        ScalarType::Int64,
        ScalarType::UInt8,
        ScalarType::UInt16,
        ScalarType::UInt32,
        ScalarType::UInt64,
        ScalarType::Float16,
        ScalarType::Float32,
        ScalarType::Float64,
        ScalarType::Complex64,
        ScalarType::Complex128,
    ];

    /// Canonical spelling, as accepted by the signature parser and used by `Display`.
    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int8 => "int8",
            ScalarType::Int16 => "int16",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::UInt8 => "uint8",
            ScalarType::UInt16 => "uint16",
            ScalarType::UInt32 => "uint32",
            ScalarType::UInt64 => "uint64",
            ScalarType::Float16 => "float16",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Complex64 => "complex64",
            ScalarType::Complex128 => "complex128",
        }
    }

    /// Looks up a type name, including the short and platform aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "bool" | "boolean" | "bool_" | "b1" => ScalarType::Bool,
            "int8" | "i1" | "byte" => ScalarType::Int8,
            "int16" | "i2" => ScalarType::Int16,
            "int32" | "i4" | "intc" => ScalarType::Int32,
            "int64" | "i8" | "intp" | "int_" => ScalarType::Int64,
            "uint8" | "u1" => ScalarType::UInt8,
            "uint16" | "u2" => ScalarType::UInt16,
            "uint32" | "u4" | "uintc" => ScalarType::UInt32,
            "uint64" | "u8" | "uintp" => ScalarType::UInt64,
            "float16" | "f2" | "half" => ScalarType::Float16,
            "float32" | "f4" | "float" | "single" => ScalarType::Float32,
            "float64" | "f8" | "double" | "float_" => ScalarType::Float64,
            "complex64" | "c8" => ScalarType::Complex64,
            "complex128" | "c16" | "complex_" => ScalarType::Complex128,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Memory layout of an array parameter.
///
/// `C` and `F` are the row-major and column-major contiguous layouts; `A` accepts any strides.
/// A one-dimensional contiguous array is always `C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layout {
    C,
    F,
    A,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::C => "C",
            Layout::F => "F",
            Layout::A => "A",
        })
    }
}

/// Array parameter type: element type, dimensionality and layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayType {
    dtype: ScalarType,
    ndim: u8,
    layout: Layout,
}

impl ArrayType {
    pub fn new(dtype: ScalarType, ndim: u8, layout: Layout) -> Self {
        let layout = match (ndim, layout) {
            (0 | 1, Layout::F) => Layout::C,
            (_, layout) => layout,
        };
        Self {
            dtype,
            ndim,
            layout,
        }
    }

    pub fn dtype(&self) -> ScalarType {
        self.dtype
    }

    pub fn ndim(&self) -> u8 {
        self.ndim
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ndim == 0 {
            return write!(f, "array({}, 0d, {})", self.dtype, self.layout);
        }
        write!(f, "{}[", self.dtype)?;
        let last = usize::from(self.ndim) - 1;
        for dim in 0..=last {
            if dim > 0 {
                f.write_str(", ")?;
            }
            let contiguous = match self.layout {
                Layout::C => dim == last,
                Layout::F => dim == 0,
                Layout::A => false,
            };
            f.write_str(if contiguous { "::1" } else { ":" })?;
        }
        f.write_str("]")
    }
}

/// Type of one kernel or device-function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    Scalar(ScalarType),
    Array(ArrayType),
}

impl DeviceType {
    /// Shorthand for an array type, e.g. `DeviceType::array(ScalarType::Int32, 1, Layout::A)`.
    pub fn array(dtype: ScalarType, ndim: u8, layout: Layout) -> Self {
        DeviceType::Array(ArrayType::new(dtype, ndim, layout))
    }

    pub fn dtype(&self) -> ScalarType {
        match self {
            DeviceType::Scalar(ty) => *ty,
            DeviceType::Array(array) => array.dtype(),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DeviceType::Array(_))
    }
}

impl From<ScalarType> for DeviceType {
    fn from(ty: ScalarType) -> Self {
        DeviceType::Scalar(ty)
    }
}

impl From<ArrayType> for DeviceType {
    fn from(array: ArrayType) -> Self {
        DeviceType::Array(array)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::Scalar(ty) => ty.fmt(f),
            DeviceType::Array(array) => array.fmt(f),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = SignatureParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        parse_type(&text)
    }
}

impl From<DeviceType> for String {
    fn from(ty: DeviceType) -> Self {
        ty.to_string()
    }
}

/// Declared result of a function: the explicit "no value" marker or a value type.
///
/// An *absent* return type is modelled one level up as `Option<ReturnType>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReturnType {
    Void,
    Value(DeviceType),
}

impl ReturnType {
    pub fn is_void(&self) -> bool {
        matches!(self, ReturnType::Void)
    }
}

impl From<DeviceType> for ReturnType {
    fn from(ty: DeviceType) -> Self {
        ReturnType::Value(ty)
    }
}

impl From<ScalarType> for ReturnType {
    fn from(ty: ScalarType) -> Self {
        ReturnType::Value(DeviceType::Scalar(ty))
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("void"),
            ReturnType::Value(ty) => ty.fmt(f),
        }
    }
}

impl TryFrom<String> for ReturnType {
    type Error = SignatureParseError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        parse_return_type(&text)
    }
}

impl From<ReturnType> for String {
    fn from(ty: ReturnType) -> Self {
        ty.to_string()
    }
}
