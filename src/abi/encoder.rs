//! Call-data encoding and return-data decoding
//!
//! Call-data is the 4-byte selector followed by the standard ABI encoding of the
//! argument tuple.

use alloy::primitives::Bytes;
use alloy_dyn_abi::{DynSolType, DynSolValue};

use super::registry::{MethodDescriptor, Parameter};
use super::types::TypedValue;
use crate::error::{Error, Result};

/// Encodes a call to `method` with `values`, one per input
pub fn encode(method: &MethodDescriptor, values: &[TypedValue]) -> Result<Bytes> {
    if values.len() != method.inputs.len() {
        return Err(Error::Encoding(format!(
            "{} expects {} arguments, got {}",
            method.signature,
            method.inputs.len(),
            values.len()
        )));
    }

    let mut args = Vec::with_capacity(values.len());
    for (param, value) in method.inputs.iter().zip(values) {
        value.check(&param.ty)?;
        args.push(value.to_dyn_value(&param.ty));
    }

    let mut calldata = method.selector.to_vec();
    calldata.extend(DynSolValue::Tuple(args).abi_encode_params());

    Ok(Bytes::from(calldata))
}

/// Decodes data returned by a call against the method's outputs
pub fn decode_output(method: &MethodDescriptor, data: &[u8]) -> Result<Vec<(String, TypedValue)>> {
    decode_params(&method.outputs, data)
}

/// Decodes call-data produced by [`encode`] back into the argument values
pub fn decode_input(method: &MethodDescriptor, calldata: &[u8]) -> Result<Vec<TypedValue>> {
    if calldata.len() < 4 || calldata[..4] != method.selector {
        return Err(Error::Decoding(format!(
            "call-data does not start with the selector of {}",
            method.signature
        )));
    }

    decode_params(&method.inputs, &calldata[4..])
        .map(|values| values.into_iter().map(|(_, value)| value).collect())
}

fn decode_params(params: &[Parameter], data: &[u8]) -> Result<Vec<(String, TypedValue)>> {
    if params.is_empty() {
        return Ok(Vec::new());
    }

    let ty = DynSolType::Tuple(params.iter().map(|p| p.ty.to_dyn_type()).collect());
    let DynSolValue::Tuple(decoded) = ty.abi_decode_params(data)? else {
        return Err(Error::Decoding("expected a tuple of values".to_string()));
    };
    if decoded.len() != params.len() {
        return Err(Error::Decoding(format!(
            "expected {} values, decoded {}",
            params.len(),
            decoded.len()
        )));
    }

    params
        .iter()
        .zip(decoded)
        .map(|(param, value)| Ok((param.name.clone(), TypedValue::from_dyn_value(value, &param.ty)?)))
        .collect()
}
