//! Pre-compiled module containers.
//!
//! A `.so` artifact produced by an ahead-of-time build carries a header
//! with the producing runtime's version string and the original Wasm
//! payload. Only the container is handled here: the version gate and the
//! extraction of the embedded Wasm bytes, which then go through the
//! normal decode path. Native code sections are not consumed by the
//! interpreter and are skipped.

use crate::prelude::{binary, codes, ByteReader, Error, Result, Vec};

/// Magic bytes of a compiled-module container.
pub const COMPILED_MAGIC: [u8; 4] = [0x00, 0x63, 0x77, 0x6D]; // \0cwm

/// Extract the embedded Wasm payload from a compiled-module container.
///
/// The version string in the header must match `expected_version`
/// exactly; a container produced by any other runtime version fails
/// with `INVALID_VERSION`.
pub fn decode_compiled<'a>(bytes: &'a [u8], expected_version: &str) -> Result<&'a [u8]> {
    let mut reader = ByteReader::new(bytes);
    if reader.read_bytes(4)? != COMPILED_MAGIC {
        return Err(Error::parse(
            codes::INVALID_MAGIC,
            "not a compiled module container",
        ));
    }
    let version = reader.read_name()?;
    if version != expected_version {
        return Err(Error::parse(
            codes::INVALID_VERSION,
            "compiled module was produced by a different runtime version",
        ));
    }
    let payload_len = reader.read_u32_leb()? as usize;
    reader.read_bytes(payload_len)
}

/// Build a compiled-module container around a Wasm payload.
///
/// The interpreter side only ever reads containers, but the writer keeps
/// the format round-trippable and testable in one place.
#[must_use]
pub fn encode_compiled(wasm: &[u8], version: &str) -> Vec<u8> {
    let mut out = Vec::from(COMPILED_MAGIC.as_slice());
    out.extend(binary::write_string(version));
    out.extend(binary::write_leb128_u32(wasm.len() as u32));
    out.extend_from_slice(wasm);
    out
}
