//! Interface registry: named contract interfaces and their method descriptors

use std::fmt;

use alloy::json_abi::{Function, JsonAbi, Param, StateMutability};
use alloy::primitives::keccak256;
use serde::Serialize;
use tracing::debug;

use super::types::TypeDescriptor;
use crate::error::{Error, Result};

/// Lists and loads raw interface descriptions (JSON ABI)
pub trait InterfaceSource {
    /// Names of all interfaces this source can load
    fn list_available(&self) -> Result<Vec<String>>;

    /// Raw bytes of the named interface
    fn load(&self, name: &str) -> Result<Vec<u8>>;
}

/// Whether a method only reads state or must be sent as a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Read,
    Write,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodKind::Read => write!(f, "read"),
            MethodKind::Write => write!(f, "write"),
        }
    }
}

/// A named, typed method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Prompt label, e.g. `to (address)`
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.ty.to_string()
        } else {
            format!("{} ({})", self.name, self.ty)
        }
    }
}

/// One callable method of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
    pub state_mutability: StateMutability,
}

impl MethodDescriptor {
    /// Builds a descriptor, deriving the signature and selector from name and inputs
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
        state_mutability: StateMutability,
    ) -> Self {
        let name = name.into();
        let types: Vec<String> = inputs.iter().map(|p| p.ty.to_string()).collect();
        let signature = format!("{}({})", name, types.join(","));
        let selector = compute_selector(&signature);

        Self {
            name,
            signature,
            selector,
            inputs,
            outputs,
            state_mutability,
        }
    }

    pub fn kind(&self) -> MethodKind {
        classify(self)
    }

    pub fn is_payable(&self) -> bool {
        self.state_mutability == StateMutability::Payable
    }

    fn from_function(function: &Function) -> Result<Self> {
        let inputs = function
            .inputs
            .iter()
            .map(param_from_abi)
            .collect::<Result<Vec<_>>>()?;
        let outputs = function
            .outputs
            .iter()
            .map(param_from_abi)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::new(
            function.name.clone(),
            inputs,
            outputs,
            function.state_mutability,
        ))
    }
}

/// Read if the method is `pure` or `view`, Write otherwise
pub fn classify(method: &MethodDescriptor) -> MethodKind {
    match method.state_mutability {
        StateMutability::Pure | StateMutability::View => MethodKind::Read,
        StateMutability::NonPayable | StateMutability::Payable => MethodKind::Write,
    }
}

/// First 4 bytes of keccak256 of the canonical signature
pub fn compute_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash[..4]);
    selector
}

/// A named contract interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub methods: Vec<MethodDescriptor>,
}

impl Interface {
    /// Parses a JSON ABI
    pub fn from_json(name: &str, raw: &[u8]) -> Result<Self> {
        let load_err = |reason: String| Error::InterfaceLoad {
            name: name.to_string(),
            reason,
        };

        let abi: JsonAbi = serde_json::from_slice(raw).map_err(|e| load_err(e.to_string()))?;
        let methods = abi
            .functions()
            .map(MethodDescriptor::from_function)
            .collect::<Result<Vec<_>>>()
            .map_err(|e| load_err(e.to_string()))?;

        Ok(Self {
            name: name.to_string(),
            methods,
        })
    }

    /// Methods of the given kind, sorted by name, overloads by signature
    pub fn methods_of(&self, kind: MethodKind) -> Vec<&MethodDescriptor> {
        let mut methods: Vec<_> = self.methods.iter().filter(|m| m.kind() == kind).collect();
        methods.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.signature.cmp(&b.signature)));
        methods
    }

    /// Looks a method up by its canonical signature
    pub fn method(&self, signature: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.signature == signature)
    }
}

/// All interfaces available to a session
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    interfaces: Vec<Interface>,
}

impl InterfaceRegistry {
    /// Loads every interface the source lists; any failure fails the whole load
    pub fn load<S: InterfaceSource + ?Sized>(source: &S) -> Result<Self> {
        let mut interfaces = Vec::new();
        for name in source.list_available()? {
            let raw = source.load(&name).map_err(|e| Error::InterfaceLoad {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            let interface = Interface::from_json(&name, &raw)?;
            debug!(
                interface = %name,
                methods = interface.methods.len(),
                "Loaded interface"
            );
            interfaces.push(interface);
        }
        Ok(Self { interfaces })
    }

    pub fn from_interfaces(interfaces: Vec<Interface>) -> Self {
        Self { interfaces }
    }

    pub fn names(&self) -> Vec<&str> {
        self.interfaces.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

/// Converts a JSON ABI parameter, building tuples from `components`
fn param_from_abi(param: &Param) -> Result<Parameter> {
    let ty = match param.ty.strip_prefix("tuple") {
        Some(suffix) => {
            let members = param
                .components
                .iter()
                .map(|c| param_from_abi(c).map(|p| (p.name, p.ty)))
                .collect::<Result<Vec<_>>>()?;
            apply_array_suffix(TypeDescriptor::Tuple(members), suffix)?
        }
        None => TypeDescriptor::parse(&param.ty)?,
    };
    Ok(Parameter::new(param.name.clone(), ty))
}

/// Wraps `base` in each `[]`/`[N]` group of `suffix`, innermost first
fn apply_array_suffix(base: TypeDescriptor, suffix: &str) -> Result<TypeDescriptor> {
    let mut ty = base;
    let mut rest = suffix;
    while !rest.is_empty() {
        let unsupported = || Error::UnsupportedType(format!("tuple{suffix}"));
        let inner = rest.strip_prefix('[').ok_or_else(unsupported)?;
        let close = inner.find(']').ok_or_else(unsupported)?;
        let length = match &inner[..close] {
            "" => None,
            n => match n.parse::<usize>() {
                Ok(len) if len > 0 => Some(len),
                _ => return Err(unsupported()),
            },
        };
        ty = TypeDescriptor::array(ty, length);
        rest = &inner[close + 1..];
    }
    Ok(ty)
}
