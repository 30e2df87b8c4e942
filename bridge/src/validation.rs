//! Guest module validation: import and export checks.
//!
//! Validates that a compiled WASM module can be bound to the host bridge
//! before it is instantiated. Checks:
//!
//! 1. Memory export present
//! 2. Requested entry points exported as functions
//! 3. All imports are functions from `evmc_host` with a known name and signature
//! 4. No WASI imports

use wasmtime::{ExternType, FuncType, Module, ValType};

use crate::error::BridgeError;
use crate::linker::{Param, HOST_FUNCTIONS, HOST_MODULE};

/// Validate a guest module against the host callback surface.
pub fn validate_module(module: &Module, entry_points: &[&str]) -> Result<(), BridgeError> {
    validate_exports(module, entry_points)?;
    validate_imports(module)?;
    Ok(())
}

fn validate_exports(module: &Module, entry_points: &[&str]) -> Result<(), BridgeError> {
    let has_memory = module
        .exports()
        .any(|e| e.name() == "memory" && matches!(e.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(BridgeError::ValidationError(
            "module must export 'memory'".into(),
        ));
    }

    for &name in entry_points {
        let export = module
            .exports()
            .find(|e| e.name() == name)
            .ok_or_else(|| {
                BridgeError::ValidationError(format!("missing entry point: {}", name))
            })?;
        if !matches!(export.ty(), ExternType::Func(_)) {
            return Err(BridgeError::ValidationError(format!(
                "export '{}' must be a function",
                name
            )));
        }
    }

    Ok(())
}

fn param_matches(expected: Param, actual: &ValType) -> bool {
    match expected {
        Param::I32 => matches!(actual, ValType::I32),
        Param::I64 => matches!(actual, ValType::I64),
    }
}

fn signature_matches(params: &[Param], ty: &FuncType) -> bool {
    let actual: Vec<ValType> = ty.params().collect();
    let results: Vec<ValType> = ty.results().collect();
    actual.len() == params.len()
        && params.iter().zip(&actual).all(|(p, a)| param_matches(*p, a))
        && results.len() == 1
        && matches!(results[0], ValType::I32)
}

/// Check that every import is a known `evmc_host` function.
fn validate_imports(module: &Module) -> Result<(), BridgeError> {
    for import in module.imports() {
        let module_name = import.module();

        if module_name.starts_with("wasi") {
            return Err(BridgeError::ValidationError(format!(
                "WASI import not allowed: {}::{}",
                module_name,
                import.name()
            )));
        }

        if module_name != HOST_MODULE {
            return Err(BridgeError::ValidationError(format!(
                "import from unknown module '{}' (only '{}' allowed): {}",
                module_name,
                HOST_MODULE,
                import.name()
            )));
        }

        let func_ty = match import.ty() {
            ExternType::Func(ft) => ft,
            _ => {
                return Err(BridgeError::ValidationError(format!(
                    "non-function import not allowed: {}::{}",
                    module_name,
                    import.name()
                )));
            }
        };

        let expected = HOST_FUNCTIONS
            .iter()
            .find(|f| f.name == import.name())
            .ok_or_else(|| {
                BridgeError::ValidationError(format!(
                    "unknown host function: {}::{}",
                    module_name,
                    import.name()
                ))
            })?;

        if !signature_matches(expected.params, &func_ty) {
            return Err(BridgeError::ValidationError(format!(
                "host function '{}' imported with wrong signature",
                import.name()
            )));
        }
    }

    Ok(())
}
