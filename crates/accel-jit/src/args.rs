//! Call-site argument values and the types inferred from them.

use accel_sig::{DeviceType, Layout, MAX_NDIM, ScalarType};

use crate::error::JitError;

/// A scalar argument passed by value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    C64 { re: f32, im: f32 },
    C128 { re: f64, im: f64 },
}

impl ScalarValue {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            ScalarValue::Bool(_) => ScalarType::Bool,
            ScalarValue::I8(_) => ScalarType::Int8,
            ScalarValue::I16(_) => ScalarType::Int16,
            ScalarValue::I32(_) => ScalarType::Int32,
            ScalarValue::I64(_) => ScalarType::Int64,
            ScalarValue::U8(_) => ScalarType::UInt8,
            ScalarValue::U16(_) => ScalarType::UInt16,
            ScalarValue::U32(_) => ScalarType::UInt32,
            ScalarValue::U64(_) => ScalarType::UInt64,
            ScalarValue::F32(_) => ScalarType::Float32,
            ScalarValue::F64(_) => ScalarType::Float64,
            ScalarValue::C64 { .. } => ScalarType::Complex64,
            ScalarValue::C128 { .. } => ScalarType::Complex128,
        }
    }
}

/// Descriptor of an array already resident on the device.
///
/// Only the shape and layout matter for typing; `address` is passed through to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayArg {
    dtype: ScalarType,
    shape: Vec<usize>,
    layout: Layout,
    address: u64,
}

impl ArrayArg {
    pub fn new(dtype: ScalarType, shape: Vec<usize>, layout: Layout, address: u64) -> Self {
        Self {
            dtype,
            shape,
            layout,
            address,
        }
    }

    /// A row-major contiguous array.
    pub fn contiguous(dtype: ScalarType, shape: Vec<usize>, address: u64) -> Self {
        Self::new(dtype, shape, Layout::C, address)
    }

    pub fn dtype(&self) -> ScalarType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    /// Fails with `Invocation` above [`MAX_NDIM`] dimensions, which no signature can express.
    pub fn device_type(&self) -> Result<DeviceType, JitError> {
        let ndim = self.shape.len();
        let rank = u8::try_from(ndim)
            .ok()
            .filter(|&rank| usize::from(rank) <= MAX_NDIM)
            .ok_or_else(|| {
                JitError::Invocation(format!(
                    "array argument has {ndim} dimensions; at most {MAX_NDIM} are supported"
                ))
            })?;
        Ok(DeviceType::array(self.dtype, rank, self.layout))
    }
}

/// One positional argument of a kernel call.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelArg {
    Scalar(ScalarValue),
    Array(ArrayArg),
}

impl KernelArg {
    /// The parameter type this argument specializes to.
    pub fn device_type(&self) -> Result<DeviceType, JitError> {
        match self {
            KernelArg::Scalar(value) => Ok(DeviceType::Scalar(value.scalar_type())),
            KernelArg::Array(array) => array.device_type(),
        }
    }
}

impl From<ArrayArg> for KernelArg {
    fn from(array: ArrayArg) -> Self {
        KernelArg::Array(array)
    }
}

impl From<ScalarValue> for KernelArg {
    fn from(value: ScalarValue) -> Self {
        KernelArg::Scalar(value)
    }
}

macro_rules! scalar_arg_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(value: $ty) -> Self {
                    ScalarValue::$variant(value)
                }
            }

            impl From<$ty> for KernelArg {
                fn from(value: $ty) -> Self {
                    KernelArg::Scalar(ScalarValue::$variant(value))
                }
            }
        )*
    };
}

scalar_arg_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

/// Positional type inference: the n-th argument determines the n-th parameter type.
pub fn infer_param_types(args: &[KernelArg]) -> Result<Vec<DeviceType>, JitError> {
    args.iter().map(KernelArg::device_type).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_infer_dimensionality_from_shape() {
        let arg = KernelArg::from(ArrayArg::new(
            ScalarType::Float32,
            vec![4, 8],
            Layout::F,
            0x1000,
        ));
        assert_eq!(
            arg.device_type().expect("device type"),
            DeviceType::array(ScalarType::Float32, 2, Layout::F)
        );
    }

    #[test]
    fn inference_is_positional() {
        let args = [
            KernelArg::from(ArrayArg::contiguous(ScalarType::Int32, vec![10], 0)),
            KernelArg::from(1.5f32),
            KernelArg::from(7u64),
        ];
        let types = infer_param_types(&args).expect("infer");
        assert_eq!(
            types,
            vec![
                DeviceType::array(ScalarType::Int32, 1, Layout::C),
                DeviceType::Scalar(ScalarType::Float32),
                DeviceType::Scalar(ScalarType::UInt64),
            ]
        );
    }

    #[test]
    fn rank_is_limited_to_what_a_signature_can_express() {
        let widest = ArrayArg::contiguous(ScalarType::Int32, vec![1; MAX_NDIM], 0);
        assert_eq!(
            widest.device_type().expect("device type").to_string(),
            format!("int32[{}::1]", ":, ".repeat(MAX_NDIM - 1))
        );

        for ndim in [MAX_NDIM + 1, 300, 400] {
            let array = ArrayArg::contiguous(ScalarType::Int32, vec![1; ndim], 0);
            let err = array.device_type().expect_err("too many dimensions");
            assert!(matches!(err, JitError::Invocation(_)), "{err}");
        }
    }

    #[test]
    fn complex_scalars_report_their_width() {
        let value = ScalarValue::C128 { re: 1.0, im: -1.0 };
        assert_eq!(value.scalar_type(), ScalarType::Complex128);
    }

    #[test]
    fn array_length_is_the_shape_product() {
        let array = ArrayArg::contiguous(ScalarType::UInt8, vec![3, 0, 2], 0);
        assert_eq!(array.len(), 0);
        assert!(array.is_empty());
    }
}
