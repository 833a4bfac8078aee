//! Launch geometry: how many blocks per grid and threads per block one kernel call requests.
//!
//! Callers write geometry as shorthand, a bare integer or a short tuple; `LaunchGeometry`
//! is the canonical form the backend receives. Normalization runs once per launch and is
//! never cached, since the same compiled kernel may be launched with different geometry.

use std::fmt;
use std::str::FromStr;

use crate::error::JitError;

const MAX_GRID_ARITY: usize = 2;
const MAX_BLOCK_ARITY: usize = 3;

/// Geometry shorthand exactly as the caller wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dims {
    Scalar(i64),
    Tuple(Vec<i64>),
}

macro_rules! dims_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Dims {
                fn from(value: $ty) -> Self {
                    Dims::Scalar(widen(value))
                }
            }

            impl From<($ty,)> for Dims {
                fn from(value: ($ty,)) -> Self {
                    Dims::Tuple(vec![widen(value.0)])
                }
            }

            impl From<($ty, $ty)> for Dims {
                fn from(value: ($ty, $ty)) -> Self {
                    Dims::Tuple(vec![widen(value.0), widen(value.1)])
                }
            }

            impl From<($ty, $ty, $ty)> for Dims {
                fn from(value: ($ty, $ty, $ty)) -> Self {
                    Dims::Tuple(vec![widen(value.0), widen(value.1), widen(value.2)])
                }
            }

            impl From<($ty, $ty, $ty, $ty)> for Dims {
                fn from(value: ($ty, $ty, $ty, $ty)) -> Self {
                    Dims::Tuple(vec![
                        widen(value.0),
                        widen(value.1),
                        widen(value.2),
                        widen(value.3),
                    ])
                }
            }

            impl From<&[$ty]> for Dims {
                fn from(values: &[$ty]) -> Self {
                    Dims::Tuple(values.iter().copied().map(widen).collect())
                }
            }

            impl From<Vec<$ty>> for Dims {
                fn from(values: Vec<$ty>) -> Self {
                    Dims::from(values.as_slice())
                }
            }
        )*
    };
}

dims_from_int!(i32, i64, u32, usize);

/// Saturates instead of wrapping so oversized values still fail the `u32` range check.
fn widen<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

impl FromStr for Dims {
    type Err = JitError;

    /// Accepts `5`, `(3, 4)`, `[3, 4]` or `3, 4`.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let bracketed = (trimmed.starts_with('(') && trimmed.ends_with(')'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']'));
        let inner = if bracketed {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };
        if !bracketed && !inner.contains(',') {
            return parse_component(inner).map(Dims::Scalar);
        }
        let mut parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.last().is_some_and(|part| part.is_empty()) {
            parts.pop();
        }
        let components = parts
            .into_iter()
            .map(parse_component)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Dims::Tuple(components))
    }
}

fn parse_component(text: &str) -> Result<i64, JitError> {
    text.parse::<i64>().map_err(|_| {
        JitError::LaunchConfig(format!("dimension {text:?} is not an integer"))
    })
}

/// A canonical dimension tuple of one to three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimTuple {
    components: [u32; 3],
    arity: u8,
}

impl DimTuple {
    /// The components in the caller's arity.
    pub fn as_slice(&self) -> &[u32] {
        &self.components[..usize::from(self.arity)]
    }

    pub fn arity(&self) -> usize {
        usize::from(self.arity)
    }

    /// Padded to `(x, y, z)` with 1s, the shape every accelerator driver takes.
    pub fn padded(&self) -> (u32, u32, u32) {
        let mut padded = [1u32; 3];
        padded[..self.arity()].copy_from_slice(self.as_slice());
        (padded[0], padded[1], padded[2])
    }

    /// Product of all components.
    pub fn count(&self) -> u64 {
        self.as_slice().iter().map(|&c| u64::from(c)).product()
    }
}

impl fmt::Display for DimTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_slice() {
            [x] => write!(f, "({x},)"),
            components => {
                let parts: Vec<String> = components.iter().map(u32::to_string).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Normalized launch geometry for one kernel invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaunchGeometry {
    grid: DimTuple,
    block: DimTuple,
}

impl LaunchGeometry {
    /// Grid accepts an integer or a 1–2 tuple; block an integer or a 1–3 tuple.
    pub fn normalize(grid: impl Into<Dims>, block: impl Into<Dims>) -> Result<Self, JitError> {
        Ok(Self {
            grid: normalize_dims("griddim", grid.into(), MAX_GRID_ARITY)?,
            block: normalize_dims("blockdim", block.into(), MAX_BLOCK_ARITY)?,
        })
    }

    pub fn grid(&self) -> &DimTuple {
        &self.grid
    }

    pub fn block(&self) -> &DimTuple {
        &self.block
    }

    pub fn total_threads(&self) -> u64 {
        self.grid.count().saturating_mul(self.block.count())
    }
}

impl fmt::Display for LaunchGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid={} block={}", self.grid, self.block)
    }
}

fn normalize_dims(label: &str, dims: Dims, max_arity: usize) -> Result<DimTuple, JitError> {
    let values = match dims {
        Dims::Scalar(value) => vec![value],
        Dims::Tuple(values) => values,
    };
    if values.is_empty() || values.len() > max_arity {
        let allowed = match max_arity {
            MAX_GRID_ARITY => "1 or 2",
            _ => "1, 2 or 3",
        };
        return Err(JitError::LaunchConfig(format!(
            "{label} must be an integer or a sequence of {allowed} integers, got {} components",
            values.len()
        )));
    }

    let mut components = [1u32; 3];
    for (slot, value) in components.iter_mut().zip(&values) {
        *slot = u32::try_from(*value).map_err(|_| {
            JitError::LaunchConfig(format!(
                "{label} components must be non-negative integers below 2^32, got {value}"
            ))
        })?;
    }
    Ok(DimTuple {
        components,
        arity: values.len() as u8,
    })
}
