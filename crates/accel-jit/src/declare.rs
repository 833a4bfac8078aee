use accel_sig::{DeviceType, SignatureInput, TypeSignature, resolve_signature};

use crate::error::JitError;

/// A device symbol implemented elsewhere: a name and a signature, no body.
///
/// Declarations are never compiled here and never enter a specialization table; device code
/// references them through [`crate::DeviceCallee::External`] and the backend links them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalDeclaration {
    name: String,
    signature: TypeSignature,
}

impl ExternalDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &TypeSignature {
        &self.signature
    }
}

/// Declares an external device function. The signature slots resolve like [`crate::jit`]'s.
pub fn declare_device(
    name: impl Into<String>,
    signature: Option<SignatureInput>,
    param_types: Option<Vec<DeviceType>>,
) -> Result<ExternalDeclaration, JitError> {
    let name = name.into();
    if name.trim().is_empty() {
        return Err(JitError::Configuration(
            "external device declarations need a symbol name".to_string(),
        ));
    }
    let signature = resolve_signature(signature.as_ref(), param_types.as_deref())?.ok_or_else(|| {
        JitError::Configuration(format!("external device function `{name}` needs a signature"))
    })?;
    tracing::debug!(%name, %signature, "declared external device function");
    Ok(ExternalDeclaration { name, signature })
}

#[cfg(test)]
mod tests {
    use accel_sig::{ReturnType, ScalarType};

    use super::*;

    #[test]
    fn declares_from_signature_text() {
        let decl = declare_device("fast_rsqrt", Some("float32(float32)".into()), None)
            .expect("declare");
        assert_eq!(decl.name(), "fast_rsqrt");
        assert_eq!(
            decl.signature().return_type(),
            Some(&ReturnType::Value(ScalarType::Float32.into()))
        );
    }

    #[test]
    fn declaration_without_types_is_a_configuration_error() {
        let err = declare_device("mystery", None, None).expect_err("no types");
        assert!(matches!(err, JitError::Configuration(_)));
    }

    #[test]
    fn text_plus_param_types_conflict() {
        let err = declare_device(
            "clash",
            Some("int32(int32)".into()),
            Some(vec![ScalarType::Int32.into()]),
        )
        .expect_err("conflict");
        assert!(matches!(err, JitError::Configuration(_)));
    }

    #[test]
    fn blank_names_are_rejected() {
        let err = declare_device("  ", Some("void()".into()), None).expect_err("blank");
        assert!(matches!(err, JitError::Configuration(_)));
    }
}
