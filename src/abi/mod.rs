//! Contract interfaces, typed argument parsing and call-data encoding

pub mod encoder;
pub mod parser;
pub mod registry;
pub mod types;

pub use encoder::{decode_input, decode_output, encode};
pub use parser::parse;
pub use registry::{
    classify, compute_selector, Interface, InterfaceRegistry, InterfaceSource, MethodDescriptor,
    MethodKind, Parameter,
};
pub use types::{TypeDescriptor, TypedValue};
