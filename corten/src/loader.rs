//! The loader: files or byte buffers in, validated modules out.

use corten_error::Result;
use corten_format::Module;
use log::error;

/// Parses Wasm binaries and pre-compiled containers into modules.
///
/// Every returned error has already been logged; callers only decide
/// what to do with it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader;

impl Loader {
    /// Create a loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Read a whole file into memory.
    #[cfg(feature = "std")]
    pub fn load_file(&self, path: &std::path::Path) -> Result<alloc::vec::Vec<u8>> {
        corten_decoder::read_file(path)
            .inspect_err(|err| error!("failed to read {}: {err}", path.display()))
    }

    /// Parse a module from a file path.
    ///
    /// Paths ending in `.so` are treated as pre-compiled containers:
    /// the embedded version string must match [`crate::VERSION`]
    /// exactly, then the embedded Wasm payload is decoded as usual.
    #[cfg(feature = "std")]
    pub fn parse_file(&self, path: &std::path::Path) -> Result<Module> {
        let bytes = self.load_file(path)?;
        let result = if path.extension().is_some_and(|ext| ext == "so") {
            corten_decoder::decode_compiled(&bytes, crate::VERSION)
                .and_then(corten_decoder::decode_module)
        } else {
            corten_decoder::decode_module(&bytes)
        };
        result.inspect_err(|err| error!("failed to parse {}: {err}", path.display()))
    }

    /// Parse a module from a byte buffer.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Module> {
        corten_decoder::decode_module(bytes)
            .inspect_err(|err| error!("failed to parse module bytes: {err}"))
    }

    /// Validate a parsed module.
    pub fn validate(&self, module: &Module) -> Result<()> {
        corten_decoder::validate_module(module)
            .inspect_err(|err| error!("module validation failed: {err}"))
    }
}
