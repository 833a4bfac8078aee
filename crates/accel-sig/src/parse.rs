//! Parser for the textual signature mini-language.
//!
//! ```text
//! signature := return '(' params? ')' | '(' params? ')' | type (',' type)* ','
//! return    := 'void' | 'none' | type
//! type      := scalar ('[' dim (',' dim)* ']')? | 'array' '(' scalar ',' ndim 'd' ',' layout ')'
//! dim       := ':' | '::1'
//! layout    := 'C' | 'F' | 'A'
//! ```
//!
//! The `array(...)` form is how zero-dimensional arrays print; it accepts any rank.
//!
//! The two parameter-only forms leave the return type absent.

use crate::signature::TypeSignature;
use crate::types::{ArrayType, DeviceType, Layout, ReturnType, ScalarType};

/// Highest array rank a signature can express.
pub const MAX_NDIM: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid signature {text:?} at offset {offset}: {message}")]
pub struct SignatureParseError {
    pub text: String,
    pub offset: usize,
    pub message: String,
}

/// Parses a full signature such as `"void(int32[:], int32[:])"` or `"(float32, float32)"`.
pub fn parse_signature(text: &str) -> Result<TypeSignature, SignatureParseError> {
    let mut parser = Parser::new(text);
    let signature = parser.signature()?;
    parser.expect_end()?;
    Ok(signature)
}

/// Parses a single parameter type such as `"float64[:, ::1]"`.
pub fn parse_type(text: &str) -> Result<DeviceType, SignatureParseError> {
    let mut parser = Parser::new(text);
    let ty = parser.device_type()?;
    parser.expect_end()?;
    Ok(ty)
}

/// Parses a return type: `void`, `none`, or a parameter type.
pub fn parse_return_type(text: &str) -> Result<ReturnType, SignatureParseError> {
    let mut parser = Parser::new(text);
    parser.skip_ws();
    let start = parser.pos;
    let name = parser.ident()?;
    let ret = if is_void(name) {
        ReturnType::Void
    } else {
        ReturnType::Value(parser.device_type_named(start, name)?)
    };
    parser.expect_end()?;
    Ok(ret)
}

fn is_void(name: &str) -> bool {
    matches!(name, "void" | "none")
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> SignatureParseError {
        SignatureParseError {
            text: self.text.to_string(),
            offset,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.text.as_bytes()[self.pos..].starts_with(token.as_bytes()) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect_end(&mut self) -> Result<(), SignatureParseError> {
        self.skip_ws();
        if self.at_end() {
            Ok(())
        } else {
            Err(self.error(self.pos, "unexpected trailing input"))
        }
    }

    fn ident(&mut self) -> Result<&'a str, SignatureParseError> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
            _ => return Err(self.error(start, "expected a type name")),
        }
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            self.pos += 1;
        }
        Ok(&self.text[start..self.pos])
    }

    fn signature(&mut self) -> Result<TypeSignature, SignatureParseError> {
        self.skip_ws();
        if self.peek() == Some(b'(') {
            let params = self.param_list()?;
            return Ok(TypeSignature::params_only(params));
        }

        let start = self.pos;
        let name = self.ident()?;
        if is_void(name) {
            self.skip_ws();
            if self.peek() != Some(b'(') {
                return Err(self.error(self.pos, "expected a parameter list after `void`"));
            }
            let params = self.param_list()?;
            return Ok(TypeSignature::new(Some(ReturnType::Void), params));
        }

        let first = self.device_type_named(start, name)?;
        self.skip_ws();
        match self.peek() {
            Some(b'(') => {
                let params = self.param_list()?;
                Ok(TypeSignature::new(Some(ReturnType::Value(first)), params))
            }
            Some(b',') => {
                let mut params = vec![first];
                while self.eat(",") {
                    self.skip_ws();
                    if self.at_end() {
                        break;
                    }
                    params.push(self.device_type()?);
                    self.skip_ws();
                }
                Ok(TypeSignature::params_only(params))
            }
            None => Err(self.error(
                start,
                "a bare type is not a signature; expected a parameter list",
            )),
            Some(_) => Err(self.error(self.pos, "expected `(` or `,`")),
        }
    }

    fn param_list(&mut self) -> Result<Vec<DeviceType>, SignatureParseError> {
        if !self.eat("(") {
            return Err(self.error(self.pos, "expected `(`"));
        }
        let mut params = Vec::new();
        self.skip_ws();
        if self.eat(")") {
            return Ok(params);
        }
        loop {
            params.push(self.device_type()?);
            self.skip_ws();
            if self.eat(",") {
                self.skip_ws();
                if self.eat(")") {
                    return Ok(params);
                }
                continue;
            }
            if self.eat(")") {
                return Ok(params);
            }
            return Err(self.error(self.pos, "expected `,` or `)`"));
        }
    }

    fn device_type(&mut self) -> Result<DeviceType, SignatureParseError> {
        self.skip_ws();
        let start = self.pos;
        let name = self.ident()?;
        self.device_type_named(start, name)
    }

    /// Continues a type whose scalar name has already been consumed.
    fn device_type_named(
        &mut self,
        start: usize,
        name: &str,
    ) -> Result<DeviceType, SignatureParseError> {
        if is_void(name) {
            return Err(self.error(start, "`void` is only valid as a return type"));
        }
        if name == "array" {
            self.skip_ws();
            if self.peek() == Some(b'(') {
                return self.array_call_form();
            }
        }
        let dtype = ScalarType::from_name(name)
            .ok_or_else(|| self.error(start, format!("unknown type name `{name}`")))?;
        self.skip_ws();
        if self.peek() != Some(b'[') {
            return Ok(DeviceType::Scalar(dtype));
        }
        self.array_suffix(dtype)
    }

    /// `array(<dtype>, <ndim>d, <layout>)`, with the cursor on the `(`.
    fn array_call_form(&mut self) -> Result<DeviceType, SignatureParseError> {
        self.pos += 1;
        self.skip_ws();
        let start = self.pos;
        let name = self.ident()?;
        let dtype = ScalarType::from_name(name)
            .ok_or_else(|| self.error(start, format!("unknown type name `{name}`")))?;
        self.separator()?;

        let digits = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let ndim = self.text[digits..self.pos]
            .parse::<usize>()
            .map_err(|_| self.error(digits, "expected a rank such as `0d`"))?;
        if !self.eat("d") {
            return Err(self.error(self.pos, "expected `d` after the rank"));
        }
        let ndim = u8::try_from(ndim)
            .ok()
            .filter(|&n| usize::from(n) <= MAX_NDIM)
            .ok_or_else(|| {
                self.error(digits, format!("arrays are limited to {MAX_NDIM} dimensions"))
            })?;
        self.separator()?;

        let start = self.pos;
        let layout = match self.ident()? {
            "C" => Layout::C,
            "F" => Layout::F,
            "A" => Layout::A,
            other => {
                return Err(self.error(start, format!("unknown layout `{other}`, expected C, F or A")));
            }
        };
        self.skip_ws();
        if !self.eat(")") {
            return Err(self.error(self.pos, "expected `)`"));
        }
        Ok(DeviceType::array(dtype, ndim, layout))
    }

    fn separator(&mut self) -> Result<(), SignatureParseError> {
        self.skip_ws();
        if !self.eat(",") {
            return Err(self.error(self.pos, "expected `,`"));
        }
        self.skip_ws();
        Ok(())
    }

    fn array_suffix(&mut self, dtype: ScalarType) -> Result<DeviceType, SignatureParseError> {
        let open = self.pos;
        self.pos += 1;
        let mut contiguous = Vec::new();
        loop {
            self.skip_ws();
            if self.eat("::1") {
                contiguous.push(true);
            } else if self.eat(":") {
                contiguous.push(false);
            } else {
                return Err(self.error(self.pos, "expected `:` or `::1`"));
            }
            if contiguous.len() > MAX_NDIM {
                return Err(self.error(open, format!("arrays are limited to {MAX_NDIM} dimensions")));
            }
            self.skip_ws();
            if self.eat(",") {
                continue;
            }
            if self.eat("]") {
                break;
            }
            return Err(self.error(self.pos, "expected `,` or `]`"));
        }

        let ndim = contiguous.len();
        let marked: Vec<usize> = contiguous
            .iter()
            .enumerate()
            .filter_map(|(dim, &c)| c.then_some(dim))
            .collect();
        let layout = match marked.as_slice() {
            [] => Layout::A,
            [dim] if *dim == ndim - 1 => Layout::C,
            [0] => Layout::F,
            _ => {
                return Err(self.error(
                    open,
                    "`::1` may only mark the first or the last dimension, once",
                ));
            }
        };
        // `ndim` is capped at MAX_NDIM above.
        Ok(DeviceType::Array(ArrayType::new(dtype, ndim as u8, layout)))
    }
}
