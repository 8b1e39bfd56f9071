//! Typed call data encoding.

use alloy::dyn_abi::{DynSolType, DynSolValue, JsonAbiExt, Specifier};
use alloy::json_abi::Function;
use alloy::primitives::Bytes;

use crate::abi::artifacts::Artifact;
use crate::blockchain::types::{KettleError, KettleResult};

/// Something that turns typed values into call data.
pub trait CallEncoder {
    fn encode(&self, values: &[DynSolValue]) -> KettleResult<Bytes>;
}

impl CallEncoder for Function {
    /// Selector followed by the ABI-encoded arguments.
    fn encode(&self, values: &[DynSolValue]) -> KettleResult<Bytes> {
        Ok(self.abi_encode_input(values)?.into())
    }
}

/// Parse a human-readable signature such as `transfer(address,uint256)`.
pub fn parse_signature(signature: &str) -> KettleResult<Function> {
    Function::parse(signature)
        .map_err(|e| KettleError::Abi(format!("invalid signature '{}': {}", signature, e)))
}

/// Find a function in loaded artifacts by full signature, or by bare name.
///
/// Artifacts are searched in order; the first match wins.
pub fn find_function<'a>(artifacts: &'a [Artifact], name_or_signature: &str) -> Option<&'a Function> {
    artifacts
        .iter()
        .flat_map(|artifact| artifact.abi.functions())
        .find(|f| f.signature() == name_or_signature || f.name == name_or_signature)
}

/// Resolve a function from artifacts first, then as a literal signature.
pub fn resolve_function(artifacts: &[Artifact], name_or_signature: &str) -> KettleResult<Function> {
    match find_function(artifacts, name_or_signature) {
        Some(function) => Ok(function.clone()),
        None => parse_signature(name_or_signature),
    }
}

/// Coerce string arguments into the function's declared input types.
pub fn coerce_args(function: &Function, args: &[String]) -> KettleResult<Vec<DynSolValue>> {
    if args.len() != function.inputs.len() {
        return Err(KettleError::Abi(format!(
            "{} expects {} arguments, got {}",
            function.signature(),
            function.inputs.len(),
            args.len()
        )));
    }

    function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| -> KettleResult<DynSolValue> {
            let ty: DynSolType = param.resolve()?;
            Ok(ty.coerce_str(arg)?)
        })
        .collect()
}
