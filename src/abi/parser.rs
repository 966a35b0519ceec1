//! Parses operator text into typed values
//!
//! Accepted literal formats:
//! - integers: decimal (`-42`, `1000`), or `0x` hex for unsigned types
//! - bool: `true`/`false` (any case) or `1`/`0`
//! - address, bytes, bytesN, bytes32: hex with optional `0x` prefix
//! - arrays: `[a,b,c]` or `a,b,c`
//! - tuples: `(a,b,c)` or `a,b,c`
//!
//! Nested arrays and tuples split on top-level commas only, so `[[1,2],[3]]`
//! parses as two inner arrays.

use alloy::primitives::{Address, Sign, B256, I256, U256};

use super::types::{split_top_level, TypeDescriptor, TypedValue};
use crate::error::{Error, Result};

/// Parses `text` into a value of type `ty`
pub fn parse(text: &str, ty: &TypeDescriptor) -> Result<TypedValue> {
    match ty {
        TypeDescriptor::Int(bits) => parse_int(text, *bits).map(|v| TypedValue::Int(v, *bits)),
        TypeDescriptor::Uint(bits) => parse_uint(text, *bits).map(|v| TypedValue::Uint(v, *bits)),
        TypeDescriptor::Bool => parse_bool(text).map(TypedValue::Bool),
        TypeDescriptor::String => Ok(TypedValue::String(text.to_string())),
        TypeDescriptor::Address => parse_address(text).map(TypedValue::Address),
        TypeDescriptor::FixedBytes(size) => {
            let bytes = parse_hex(text, "bytes")?;
            if bytes.len() != *size {
                return Err(Error::TypeMismatch {
                    expected: ty.to_string(),
                    reason: format!("expected {} bytes, got {}", size, bytes.len()),
                });
            }
            Ok(TypedValue::FixedBytes(bytes))
        }
        TypeDescriptor::Bytes => parse_hex(text, "bytes").map(TypedValue::Bytes),
        TypeDescriptor::Hash => {
            let bytes = parse_hex(text, "bytes32")?;
            if bytes.len() != 32 {
                return Err(Error::TypeMismatch {
                    expected: ty.to_string(),
                    reason: format!("expected 32 bytes, got {}", bytes.len()),
                });
            }
            Ok(TypedValue::Hash(B256::from_slice(&bytes)))
        }
        TypeDescriptor::Array { element, length } => {
            let inner = strip_enclosing(text.trim(), '[', ']');
            let segments = split_top_level(inner);
            if let Some(len) = length {
                if segments.len() != *len {
                    return Err(Error::ArityMismatch {
                        ty: ty.to_string(),
                        expected: *len,
                        actual: segments.len(),
                    });
                }
            }
            segments
                .into_iter()
                .map(|segment| parse(segment, element))
                .collect::<Result<Vec<_>>>()
                .map(TypedValue::Array)
        }
        TypeDescriptor::Tuple(members) => {
            let inner = strip_enclosing(text.trim(), '(', ')');
            let segments = split_top_level(inner);
            if segments.len() != members.len() {
                return Err(Error::ArityMismatch {
                    ty: ty.to_string(),
                    expected: members.len(),
                    actual: segments.len(),
                });
            }
            members
                .iter()
                .zip(segments)
                .map(|((name, member), segment)| Ok((name.clone(), parse(segment, member)?)))
                .collect::<Result<Vec<_>>>()
                .map(TypedValue::Tuple)
        }
    }
}

/// Removes one pair of enclosing delimiters, if the opening one is closed by
/// the final character
fn strip_enclosing(s: &str, open: char, close: char) -> &str {
    let Some(inner) = s.strip_prefix(open).and_then(|inner| inner.strip_suffix(close)) else {
        return s;
    };

    // `[a],[b]` starts and ends with brackets but they belong to different elements
    let mut depth = 0usize;
    for c in inner.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return s,
            }
        }
    }
    inner
}

fn parse_uint(text: &str, bits: usize) -> Result<U256> {
    let s = text.trim();
    if s.starts_with('-') {
        return Err(Error::TypeMismatch {
            expected: format!("uint{bits}"),
            reason: format!("negative value {s}"),
        });
    }

    let expected = format!("uint{bits}");
    let value = parse_magnitude(s, "uint", &expected)?;
    if value.bit_len() > bits {
        return Err(Error::TypeMismatch {
            expected,
            reason: format!("{value} out of range"),
        });
    }
    Ok(value)
}

fn parse_int(text: &str, bits: usize) -> Result<I256> {
    let s = text.trim();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (Sign::Negative, rest),
        None => (Sign::Positive, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.starts_with("0x") || digits.starts_with("0X") {
        return Err(Error::MalformedLiteral {
            kind: "int",
            input: s.to_string(),
        });
    }

    let expected = format!("int{bits}");
    let abs = parse_magnitude(digits, "int", &expected)?;
    let out_of_range = || Error::TypeMismatch {
        expected: expected.clone(),
        reason: format!("{s} out of range"),
    };

    // The negative bound is one larger than the positive one
    let limit = U256::from(1u8) << (bits - 1);
    let fits = match sign {
        Sign::Negative => abs <= limit,
        Sign::Positive => abs < limit,
    };
    if !fits {
        return Err(out_of_range());
    }

    I256::checked_from_sign_and_abs(sign, abs).ok_or_else(out_of_range)
}

/// Parses an unsigned decimal literal, or hex when prefixed with `0x`
///
/// Well-formed digits that do not fit in 256 bits are out of range for `expected`.
fn parse_magnitude(s: &str, kind: &'static str, expected: &str) -> Result<U256> {
    let malformed = || Error::MalformedLiteral {
        kind,
        input: s.to_string(),
    };
    let too_wide = |_| Error::TypeMismatch {
        expected: expected.to_string(),
        reason: format!("{s} out of range"),
    };

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        return U256::from_str_radix(hex, 16).map_err(too_wide);
    }

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    U256::from_str_radix(s, 10).map_err(too_wide)
}

fn parse_bool(text: &str) -> Result<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::MalformedLiteral {
            kind: "bool",
            input: text.to_string(),
        }),
    }
}

fn parse_address(text: &str) -> Result<Address> {
    let bytes = parse_hex(text, "address")?;
    if bytes.len() != 20 {
        return Err(Error::TypeMismatch {
            expected: "address".to_string(),
            reason: format!("expected 20 bytes, got {}", bytes.len()),
        });
    }
    Ok(Address::from_slice(&bytes))
}

fn parse_hex(text: &str, kind: &'static str) -> Result<Vec<u8>> {
    let s = text.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(s).map_err(|_| Error::MalformedLiteral {
        kind,
        input: text.trim().to_string(),
    })
}
