use std::path::Path;

use log::{info, warn};

use crate::codegen::CodeGen;
use crate::error::CompileError;

/// Dumps the module's textual LLVM IR to `path`.
pub fn write_ir(codegen: &CodeGen, path: impl AsRef<Path>) -> Result<(), CompileError> {
    let path = path.as_ref();

    if let Err(err) = codegen.module.verify() {
        warn!("module failed verification: {}", err);
    }

    codegen
        .module
        .print_to_file(path)
        .map_err(|err| CompileError::Emit(err.to_string()))?;

    info!("wrote IR to {}", path.display());
    Ok(())
}
