//! Type descriptors and typed values for contract arguments
//!
//! A [`TypeDescriptor`] describes one ABI type, a [`TypedValue`] holds a value of
//! that shape. Both are closed enums so every conversion matches exhaustively.

use std::fmt;

use alloy::primitives::{Address, B256, I256, U256};
use alloy_dyn_abi::{DynSolType, DynSolValue};

use crate::error::{Error, Result};

/// Describes a single ABI type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// `intN`
    Int(usize),
    /// `uintN`
    Uint(usize),
    Bool,
    String,
    Address,
    /// `bytesN` for N in 1..=31 (`bytes32` is a [`TypeDescriptor::Hash`])
    FixedBytes(usize),
    /// Dynamic `bytes`
    Bytes,
    /// 32-byte word (`bytes32`)
    Hash,
    /// `T[]` when `length` is `None`, `T[N]` otherwise
    Array {
        element: Box<TypeDescriptor>,
        length: Option<usize>,
    },
    /// Ordered, named members; names may be empty
    Tuple(Vec<(String, TypeDescriptor)>),
}

impl TypeDescriptor {
    /// Parses a Solidity type string such as `uint256`, `(address,bool)[]` or `bytes4[3]`
    ///
    /// Tuple members parsed from a type string are unnamed.
    pub fn parse(ty: &str) -> Result<Self> {
        let ty = ty.trim();
        if ty.is_empty() {
            return Err(Error::UnsupportedType("empty type".to_string()));
        }

        // Array suffixes bind last: `(a,b)[2][]` is a dynamic array of `(a,b)[2]`
        if ty.ends_with(']') {
            let open = ty
                .rfind('[')
                .ok_or_else(|| Error::UnsupportedType(ty.to_string()))?;
            let element = Self::parse(&ty[..open])?;
            let length = parse_array_length(ty, &ty[open + 1..ty.len() - 1])?;
            return Ok(Self::array(element, length));
        }

        if let Some(inner) = ty.strip_prefix('(') {
            let inner = inner
                .strip_suffix(')')
                .ok_or_else(|| Error::UnsupportedType(ty.to_string()))?;
            let members = split_top_level(inner)
                .into_iter()
                .map(|member| Ok((String::new(), Self::parse(member)?)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(TypeDescriptor::Tuple(members));
        }

        Self::parse_elementary(ty)
    }

    fn parse_elementary(ty: &str) -> Result<Self> {
        match ty {
            "bool" => return Ok(TypeDescriptor::Bool),
            "string" => return Ok(TypeDescriptor::String),
            "address" => return Ok(TypeDescriptor::Address),
            "bytes" => return Ok(TypeDescriptor::Bytes),
            "int" => return Ok(TypeDescriptor::Int(256)),
            "uint" => return Ok(TypeDescriptor::Uint(256)),
            "function" => return Err(Error::UnsupportedType(ty.to_string())),
            _ => {}
        }

        if ty.starts_with("fixed") || ty.starts_with("ufixed") {
            return Err(Error::UnsupportedType(ty.to_string()));
        }
        if let Some(bits) = ty.strip_prefix("uint") {
            return Ok(TypeDescriptor::Uint(parse_bits(ty, bits)?));
        }
        if let Some(bits) = ty.strip_prefix("int") {
            return Ok(TypeDescriptor::Int(parse_bits(ty, bits)?));
        }
        if let Some(size) = ty.strip_prefix("bytes") {
            let size: usize = size
                .parse()
                .map_err(|_| Error::UnsupportedType(ty.to_string()))?;
            return match size {
                32 => Ok(TypeDescriptor::Hash),
                1..=31 => Ok(TypeDescriptor::FixedBytes(size)),
                _ => Err(Error::UnsupportedType(ty.to_string())),
            };
        }

        Err(Error::UnsupportedType(ty.to_string()))
    }

    /// Builds an array descriptor
    pub fn array(element: TypeDescriptor, length: Option<usize>) -> Self {
        TypeDescriptor::Array {
            element: Box::new(element),
            length,
        }
    }

    /// Returns true if the type is encoded in the tail section
    pub fn is_dynamic(&self) -> bool {
        match self {
            TypeDescriptor::String | TypeDescriptor::Bytes => true,
            TypeDescriptor::Array { length: None, .. } => true,
            TypeDescriptor::Array {
                element,
                length: Some(_),
            } => element.is_dynamic(),
            TypeDescriptor::Tuple(members) => members.iter().any(|(_, ty)| ty.is_dynamic()),
            TypeDescriptor::Int(_)
            | TypeDescriptor::Uint(_)
            | TypeDescriptor::Bool
            | TypeDescriptor::Address
            | TypeDescriptor::FixedBytes(_)
            | TypeDescriptor::Hash => false,
        }
    }

    /// Converts into the alloy dynamic type used for encoding and decoding
    pub fn to_dyn_type(&self) -> DynSolType {
        match self {
            TypeDescriptor::Int(bits) => DynSolType::Int(*bits),
            TypeDescriptor::Uint(bits) => DynSolType::Uint(*bits),
            TypeDescriptor::Bool => DynSolType::Bool,
            TypeDescriptor::String => DynSolType::String,
            TypeDescriptor::Address => DynSolType::Address,
            TypeDescriptor::FixedBytes(size) => DynSolType::FixedBytes(*size),
            TypeDescriptor::Bytes => DynSolType::Bytes,
            TypeDescriptor::Hash => DynSolType::FixedBytes(32),
            TypeDescriptor::Array {
                element,
                length: None,
            } => DynSolType::Array(Box::new(element.to_dyn_type())),
            TypeDescriptor::Array {
                element,
                length: Some(len),
            } => DynSolType::FixedArray(Box::new(element.to_dyn_type()), *len),
            TypeDescriptor::Tuple(members) => {
                DynSolType::Tuple(members.iter().map(|(_, ty)| ty.to_dyn_type()).collect())
            }
        }
    }
}

impl fmt::Display for TypeDescriptor {
    /// Canonical form used in method signatures
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Int(bits) => write!(f, "int{bits}"),
            TypeDescriptor::Uint(bits) => write!(f, "uint{bits}"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::Address => f.write_str("address"),
            TypeDescriptor::FixedBytes(size) => write!(f, "bytes{size}"),
            TypeDescriptor::Bytes => f.write_str("bytes"),
            TypeDescriptor::Hash => f.write_str("bytes32"),
            TypeDescriptor::Array { element, length } => match length {
                Some(len) => write!(f, "{element}[{len}]"),
                None => write!(f, "{element}[]"),
            },
            TypeDescriptor::Tuple(members) => {
                f.write_str("(")?;
                for (i, (_, ty)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn parse_bits(ty: &str, bits: &str) -> Result<usize> {
    let bits: usize = bits
        .parse()
        .map_err(|_| Error::UnsupportedType(ty.to_string()))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(Error::UnsupportedType(ty.to_string()));
    }
    Ok(bits)
}

fn parse_array_length(ty: &str, len: &str) -> Result<Option<usize>> {
    if len.is_empty() {
        return Ok(None);
    }
    match len.parse::<usize>() {
        Ok(0) | Err(_) => Err(Error::UnsupportedType(ty.to_string())),
        Ok(n) => Ok(Some(n)),
    }
}

/// Splits on commas that are not nested inside brackets or parentheses
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let last = s[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last);
    }
    parts
}

/// A parsed argument or return value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    Int(I256, usize),
    Uint(U256, usize),
    Bool(bool),
    String(String),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    Hash(B256),
    Array(Vec<TypedValue>),
    Tuple(Vec<(String, TypedValue)>),
}

impl TypedValue {
    /// Verifies that this value has the shape of `ty` at every nesting level
    pub fn check(&self, ty: &TypeDescriptor) -> Result<()> {
        let mismatch = |reason: String| Error::Encoding(format!("{ty}: {reason}"));

        match (self, ty) {
            (TypedValue::Int(value, bits), TypeDescriptor::Int(expected)) => {
                if bits != expected {
                    return Err(mismatch(format!("value is int{bits}")));
                }
                if !int_fits(*value, *expected) {
                    return Err(mismatch(format!("{value} out of range")));
                }
                Ok(())
            }
            (TypedValue::Uint(value, bits), TypeDescriptor::Uint(expected)) => {
                if bits != expected {
                    return Err(mismatch(format!("value is uint{bits}")));
                }
                if value.bit_len() > *expected {
                    return Err(mismatch(format!("{value} out of range")));
                }
                Ok(())
            }
            (TypedValue::Bool(_), TypeDescriptor::Bool)
            | (TypedValue::String(_), TypeDescriptor::String)
            | (TypedValue::Address(_), TypeDescriptor::Address)
            | (TypedValue::Bytes(_), TypeDescriptor::Bytes)
            | (TypedValue::Hash(_), TypeDescriptor::Hash) => Ok(()),
            (TypedValue::FixedBytes(bytes), TypeDescriptor::FixedBytes(size)) => {
                if bytes.len() != *size {
                    return Err(mismatch(format!("got {} bytes", bytes.len())));
                }
                Ok(())
            }
            (TypedValue::Array(items), TypeDescriptor::Array { element, length }) => {
                if let Some(len) = length {
                    if items.len() != *len {
                        return Err(mismatch(format!("got {} elements", items.len())));
                    }
                }
                items.iter().try_for_each(|item| item.check(element))
            }
            (TypedValue::Tuple(values), TypeDescriptor::Tuple(members)) => {
                if values.len() != members.len() {
                    return Err(mismatch(format!("got {} members", values.len())));
                }
                values
                    .iter()
                    .zip(members)
                    .try_for_each(|((_, value), (_, member))| value.check(member))
            }
            (value, _) => Err(mismatch(format!("got {}", value.kind()))),
        }
    }

    /// Short name of the value's variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Int(..) => "int",
            TypedValue::Uint(..) => "uint",
            TypedValue::Bool(_) => "bool",
            TypedValue::String(_) => "string",
            TypedValue::Address(_) => "address",
            TypedValue::FixedBytes(_) => "fixed bytes",
            TypedValue::Bytes(_) => "bytes",
            TypedValue::Hash(_) => "hash",
            TypedValue::Array(_) => "array",
            TypedValue::Tuple(_) => "tuple",
        }
    }

    /// Lowers into an alloy dynamic value; the value must already `check` against `ty`
    pub(crate) fn to_dyn_value(&self, ty: &TypeDescriptor) -> DynSolValue {
        match (self, ty) {
            (TypedValue::Int(value, bits), _) => DynSolValue::Int(*value, *bits),
            (TypedValue::Uint(value, bits), _) => DynSolValue::Uint(*value, *bits),
            (TypedValue::Bool(b), _) => DynSolValue::Bool(*b),
            (TypedValue::String(s), _) => DynSolValue::String(s.clone()),
            (TypedValue::Address(addr), _) => DynSolValue::Address(*addr),
            (TypedValue::FixedBytes(bytes), _) => {
                let mut word = [0u8; 32];
                word[..bytes.len()].copy_from_slice(bytes);
                DynSolValue::FixedBytes(B256::from(word), bytes.len())
            }
            (TypedValue::Bytes(bytes), _) => DynSolValue::Bytes(bytes.clone()),
            (TypedValue::Hash(hash), _) => DynSolValue::FixedBytes(*hash, 32),
            (TypedValue::Array(items), TypeDescriptor::Array { element, length }) => {
                let items = items.iter().map(|item| item.to_dyn_value(element)).collect();
                match length {
                    Some(_) => DynSolValue::FixedArray(items),
                    None => DynSolValue::Array(items),
                }
            }
            (TypedValue::Array(items), _) => {
                DynSolValue::Array(items.iter().map(|item| item.to_dyn_value(ty)).collect())
            }
            (TypedValue::Tuple(values), TypeDescriptor::Tuple(members)) => DynSolValue::Tuple(
                values
                    .iter()
                    .zip(members)
                    .map(|((_, value), (_, member))| value.to_dyn_value(member))
                    .collect(),
            ),
            (TypedValue::Tuple(values), _) => DynSolValue::Tuple(
                values
                    .iter()
                    .map(|(_, value)| value.to_dyn_value(ty))
                    .collect(),
            ),
        }
    }

    /// Lifts a decoded alloy value back into a typed value shaped like `ty`
    pub(crate) fn from_dyn_value(value: DynSolValue, ty: &TypeDescriptor) -> Result<Self> {
        let unexpected =
            |value: &DynSolValue| Error::Decoding(format!("expected {ty}, decoded {value:?}"));

        match (value, ty) {
            (DynSolValue::Int(v, bits), TypeDescriptor::Int(_)) => Ok(TypedValue::Int(v, bits)),
            (DynSolValue::Uint(v, bits), TypeDescriptor::Uint(_)) => Ok(TypedValue::Uint(v, bits)),
            (DynSolValue::Bool(b), TypeDescriptor::Bool) => Ok(TypedValue::Bool(b)),
            (DynSolValue::String(s), TypeDescriptor::String) => Ok(TypedValue::String(s)),
            (DynSolValue::Address(addr), TypeDescriptor::Address) => Ok(TypedValue::Address(addr)),
            (DynSolValue::FixedBytes(word, size), TypeDescriptor::FixedBytes(_)) => {
                Ok(TypedValue::FixedBytes(word[..size].to_vec()))
            }
            (DynSolValue::FixedBytes(word, _), TypeDescriptor::Hash) => Ok(TypedValue::Hash(word)),
            (DynSolValue::Bytes(bytes), TypeDescriptor::Bytes) => Ok(TypedValue::Bytes(bytes)),
            (
                DynSolValue::Array(items) | DynSolValue::FixedArray(items),
                TypeDescriptor::Array { element, .. },
            ) => items
                .into_iter()
                .map(|item| Self::from_dyn_value(item, element))
                .collect::<Result<Vec<_>>>()
                .map(TypedValue::Array),
            (DynSolValue::Tuple(values), TypeDescriptor::Tuple(members))
                if values.len() == members.len() =>
            {
                values
                    .into_iter()
                    .zip(members)
                    .map(|(value, (name, member))| {
                        Ok((name.clone(), Self::from_dyn_value(value, member)?))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(TypedValue::Tuple)
            }
            (other, _) => Err(unexpected(&other)),
        }
    }
}

fn int_fits(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let limit = U256::from(1u8) << (bits - 1);
    let abs = value.unsigned_abs();
    if value.is_negative() {
        abs <= limit
    } else {
        abs < limit
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(value, _) => write!(f, "{value}"),
            TypedValue::Uint(value, _) => write!(f, "{value}"),
            TypedValue::Bool(b) => write!(f, "{b}"),
            TypedValue::String(s) => write!(f, "{s:?}"),
            TypedValue::Address(addr) => write!(f, "{addr}"),
            TypedValue::FixedBytes(bytes) | TypedValue::Bytes(bytes) => {
                write!(f, "0x{}", hex::encode(bytes))
            }
            TypedValue::Hash(hash) => write!(f, "{hash}"),
            TypedValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            TypedValue::Tuple(values) => {
                f.write_str("(")?;
                for (i, (name, value)) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if name.is_empty() {
                        write!(f, "{value}")?;
                    } else {
                        write!(f, "{name}: {value}")?;
                    }
                }
                f.write_str(")")
            }
        }
    }
}
