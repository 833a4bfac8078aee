use std::path::Path;

use accel_sig::{DeviceType, SignatureInput};
use serde::{Deserialize, Serialize};

use crate::backend::LinkInput;
use crate::error::JitError;
use crate::specialize::Role;

const DEBUG_ENV: &str = "ACCEL_JIT_DEBUG";

/// Options accepted by [`crate::jit`].
///
/// Every value owns its `link_inputs`, so options built for one function never leak linked
/// objects into another's specialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitOptions {
    pub role: Role,
    pub signature: Option<SignatureInput>,
    pub param_types: Option<Vec<DeviceType>>,
    pub forced_inline: bool,
    pub eager_bind: bool,
    pub debug_info: bool,
    pub link_inputs: Vec<LinkInput>,
}

impl Default for JitOptions {
    fn default() -> Self {
        Self {
            role: Role::Kernel,
            signature: None,
            param_types: None,
            forced_inline: false,
            eager_bind: true,
            debug_info: false,
            link_inputs: Vec::new(),
        }
    }
}

impl JitOptions {
    pub fn kernel() -> Self {
        Self::default()
    }

    pub fn device() -> Self {
        Self {
            role: Role::DeviceFunction,
            ..Self::default()
        }
    }

    pub fn with_signature(mut self, signature: impl Into<SignatureInput>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_param_types(mut self, params: Vec<DeviceType>) -> Self {
        self.param_types = Some(params);
        self
    }

    pub fn with_link(mut self, input: LinkInput) -> Self {
        self.link_inputs.push(input);
        self
    }

    pub fn forced_inline(mut self, forced_inline: bool) -> Self {
        self.forced_inline = forced_inline;
        self
    }

    pub fn eager_bind(mut self, eager_bind: bool) -> Self {
        self.eager_bind = eager_bind;
        self
    }

    pub fn debug_info(mut self, debug_info: bool) -> Self {
        self.debug_info = debug_info;
        self
    }
}

/// On-disk form: a `[jit]` table holding [`JitOptions`] fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JitToml {
    #[serde(default)]
    pub jit: JitOptions,
}

impl std::str::FromStr for JitToml {
    type Err = JitError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        toml::from_str(text).map_err(|err| JitError::Config(err.to_string()))
    }
}

/// Loads options from a TOML file, honouring `ACCEL_JIT_DEBUG=1`.
pub fn read_jit_toml(path: &Path) -> Result<JitOptions, JitError> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| JitError::Config(format!("failed to read {}: {err}", path.display())))?;
    let parsed: JitToml = toml::from_str(&text)
        .map_err(|err| JitError::Config(format!("failed to parse {}: {err}", path.display())))?;
    Ok(apply_env(parsed.jit, std::env::var(DEBUG_ENV).ok().as_deref()))
}

/// Applies the value of `ACCEL_JIT_DEBUG`; only `"1"` turns debug info on.
fn apply_env(mut options: JitOptions, debug: Option<&str>) -> JitOptions {
    if debug == Some("1") {
        options.debug_info = true;
    }
    options
}

#[cfg(test)]
mod tests {
    use accel_sig::{Layout, ScalarType};

    use super::*;

    #[test]
    fn defaults_bind_eagerly_and_link_nothing() {
        let options = JitOptions::default();
        assert_eq!(options.role, Role::Kernel);
        assert!(options.eager_bind);
        assert!(options.link_inputs.is_empty());
    }

    #[test]
    fn link_inputs_are_not_shared_between_values() {
        let base = JitOptions::kernel();
        let linked = base.clone().with_link(LinkInput::new("libdevice.bc"));
        assert_eq!(linked.link_inputs.len(), 1);
        assert!(base.link_inputs.is_empty());
        assert!(JitOptions::kernel().link_inputs.is_empty());
    }

    #[test]
    fn parses_a_device_table() {
        let parsed: JitToml = r#"
            [jit]
            role = "device"
            signature = "int32(int32, int32)"
            forced_inline = true
        "#
        .parse()
        .expect("parse");
        assert_eq!(parsed.jit.role, Role::DeviceFunction);
        assert_eq!(
            parsed.jit.signature,
            Some(SignatureInput::from("int32(int32, int32)"))
        );
        assert!(parsed.jit.forced_inline);
        assert!(parsed.jit.eager_bind);
    }

    #[test]
    fn parses_param_types_and_links() {
        let parsed: JitToml = r#"
            [jit]
            param_types = ["float32[:, ::1]", "int64"]
            eager_bind = false
            link_inputs = ["kernels/helpers.ptx"]
        "#
        .parse()
        .expect("parse");
        assert_eq!(
            parsed.jit.param_types,
            Some(vec![
                DeviceType::array(ScalarType::Float32, 2, Layout::C),
                DeviceType::Scalar(ScalarType::Int64),
            ])
        );
        assert!(!parsed.jit.eager_bind);
        assert_eq!(
            parsed.jit.link_inputs,
            vec![LinkInput::new("kernels/helpers.ptx")]
        );
    }

    #[test]
    fn rejects_unknown_param_types() {
        let err = "[jit]\nparam_types = [\"int33\"]"
            .parse::<JitToml>()
            .expect_err("bad type");
        assert!(matches!(err, JitError::Config(_)));
    }

    #[test]
    fn missing_table_means_defaults() {
        let parsed: JitToml = "".parse().expect("parse");
        assert_eq!(parsed.jit, JitOptions::default());
    }

    #[test]
    fn reads_options_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("jit.toml");
        std::fs::write(&path, "[jit]\nsignature = \"void(float64[:])\"\n").expect("write");
        let options = read_jit_toml(&path).expect("read");
        assert_eq!(
            options.signature,
            Some(SignatureInput::from("void(float64[:])"))
        );

        let missing = read_jit_toml(&dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(missing, JitError::Config(_)));
    }

    #[test]
    fn parse_failures_on_disk_are_reported_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[jit\nsignature = 1\n").expect("write");
        let message = read_jit_toml(&path).expect_err("broken").to_string();
        assert!(message.starts_with("Config error: failed to parse "), "{message}");
        assert_eq!(message.matches("Config error").count(), 1, "{message}");
    }

    #[test]
    fn debug_override_only_accepts_one() {
        let base = JitOptions::kernel();
        assert!(apply_env(base.clone(), Some("1")).debug_info);
        for value in [None, Some("0"), Some("true"), Some(""), Some(" 1")] {
            assert!(!apply_env(base.clone(), value).debug_info, "{value:?}");
        }
        let already_on = base.debug_info(true);
        assert!(apply_env(already_on, Some("0")).debug_info);
    }
}
