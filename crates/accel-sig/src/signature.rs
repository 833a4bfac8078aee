use std::fmt;

use serde::{Deserialize, Serialize};

use crate::parse::{SignatureParseError, parse_signature};
use crate::types::{DeviceType, ReturnType};

/// Ordered parameter types plus a return type.
///
/// The return type is tri-state: absent (`None`), the explicit `void` marker, or a value type.
/// Kernel validation only rejects the last of these, so "absent" must never be collapsed into
/// `void`. Equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSignature {
    return_type: Option<ReturnType>,
    params: Vec<DeviceType>,
}

impl TypeSignature {
    pub fn new(return_type: Option<ReturnType>, params: Vec<DeviceType>) -> Self {
        Self {
            return_type,
            params,
        }
    }

    /// A signature that names parameters only; its return type is absent.
    pub fn params_only(params: Vec<DeviceType>) -> Self {
        Self::new(None, params)
    }

    /// `void(params...)`, the shape every launchable kernel has.
    pub fn void(params: Vec<DeviceType>) -> Self {
        Self::new(Some(ReturnType::Void), params)
    }

    pub fn return_type(&self) -> Option<&ReturnType> {
        self.return_type.as_ref()
    }

    pub fn params(&self) -> &[DeviceType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `true` only for a present, non-`void` return type.
    pub fn returns_value(&self) -> bool {
        matches!(self.return_type, Some(ReturnType::Value(_)))
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ret) = &self.return_type {
            write!(f, "{ret}")?;
        }
        f.write_str("(")?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

impl std::str::FromStr for TypeSignature {
    type Err = SignatureParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_signature(text)
    }
}

/// A signature as a caller wrote it, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignatureInput {
    /// Signature text, e.g. `"void(int32[:], int32[:])"`.
    Text(String),
    /// Already-typed return and parameter types.
    Structured {
        #[serde(default)]
        return_type: Option<ReturnType>,
        params: Vec<DeviceType>,
    },
}

impl SignatureInput {
    pub fn structured(return_type: Option<ReturnType>, params: Vec<DeviceType>) -> Self {
        SignatureInput::Structured {
            return_type,
            params,
        }
    }
}

impl From<&str> for SignatureInput {
    fn from(text: &str) -> Self {
        SignatureInput::Text(text.to_string())
    }
}

impl From<String> for SignatureInput {
    fn from(text: String) -> Self {
        SignatureInput::Text(text)
    }
}

impl From<TypeSignature> for SignatureInput {
    fn from(signature: TypeSignature) -> Self {
        SignatureInput::Structured {
            return_type: signature.return_type,
            params: signature.params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("signature and parameter types were both given: {0}")]
    Conflict(String),
    #[error(transparent)]
    Parse(#[from] SignatureParseError),
}

/// Resolves the signature slot and the separate parameter-type slot into one signature.
///
/// Returns `Ok(None)` when neither slot carries type information. Supplying a signature
/// together with separate parameter types is ambiguous and rejected.
pub fn resolve_signature(
    signature: Option<&SignatureInput>,
    param_types: Option<&[DeviceType]>,
) -> Result<Option<TypeSignature>, ResolveError> {
    match (signature, param_types) {
        (Some(SignatureInput::Text(text)), Some(_)) => Err(ResolveError::Conflict(format!(
            "signature text {text:?} already lists the parameters"
        ))),
        (Some(SignatureInput::Structured { .. }), Some(_)) => Err(ResolveError::Conflict(
            "structured signature already lists the parameters".to_string(),
        )),
        (Some(SignatureInput::Text(text)), None) => Ok(Some(parse_signature(text)?)),
        (
            Some(SignatureInput::Structured {
                return_type,
                params,
            }),
            None,
        ) => Ok(Some(TypeSignature::new(return_type.clone(), params.clone()))),
        (None, Some(params)) => Ok(Some(TypeSignature::params_only(params.to_vec()))),
        (None, None) => Ok(None),
    }
}
