//! Global instances.

use corten_error::{codes, Error, Result};
use corten_format::{GlobalType, Value};

/// A global variable instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalInstance {
    ty: GlobalType,
    value: Value,
}

impl GlobalInstance {
    /// Create a global holding `value`, which must match the declared type.
    pub fn new(ty: GlobalType, value: Value) -> Result<Self> {
        if !value.matches_type(ty.value_type) {
            return Err(Error::validation(
                codes::TYPE_MISMATCH,
                "global value does not match its declared type",
            ));
        }
        Ok(Self { ty, value })
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> Value {
        self.value
    }

    /// Write a new value. Fails on immutable globals and type mismatch.
    pub fn set(&mut self, value: Value) -> Result<()> {
        if !self.ty.mutable {
            return Err(Error::validation(
                codes::INVALID_MUTATION,
                "cannot write an immutable global",
            ));
        }
        if !value.matches_type(self.ty.value_type) {
            return Err(Error::validation(
                codes::TYPE_MISMATCH,
                "global value does not match its declared type",
            ));
        }
        self.value = value;
        Ok(())
    }

    /// The declared type.
    #[must_use]
    pub fn ty(&self) -> GlobalType {
        self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corten_format::ValueType;

    #[test]
    fn test_immutable_global_rejects_writes() {
        let ty = GlobalType { value_type: ValueType::I32, mutable: false };
        let mut global = GlobalInstance::new(ty, Value::I32(1)).unwrap();
        assert_eq!(global.set(Value::I32(2)).unwrap_err().code(), codes::INVALID_MUTATION);
        assert_eq!(global.get(), Value::I32(1));
    }

    #[test]
    fn test_type_checked_on_create_and_set() {
        let ty = GlobalType { value_type: ValueType::I64, mutable: true };
        assert!(GlobalInstance::new(ty, Value::I32(0)).is_err());
        let mut global = GlobalInstance::new(ty, Value::I64(0)).unwrap();
        assert!(global.set(Value::I32(1)).is_err());
        global.set(Value::I64(5)).unwrap();
        assert_eq!(global.get(), Value::I64(5));
    }
}
