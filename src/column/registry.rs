//! Wire type name resolution
//!
//! Maps server type names to fresh columns. Simple names go through a
//! factory table open to registration; the parameterized `FixedString(N)`
//! form is parsed here.

use std::collections::HashMap;

use crate::codec::MAX_STRING_LEN;
use crate::column::{Column, FixedStringColumn, NumericColumn, StringColumn};
use crate::error::{ColwireError, Result};

type Factory = Box<dyn Fn() -> Column + Send + Sync>;

/// Registry of wire type names.
pub struct TypeRegistry {
    factories: HashMap<String, Factory>,
}

impl TypeRegistry {
    /// Registry with every built-in type registered.
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("UInt8", || Column::Numeric(NumericColumn::with_width(1)));
        registry.register("UInt16", || Column::Numeric(NumericColumn::with_width(2)));
        registry.register("UInt32", || Column::Numeric(NumericColumn::with_width(4)));
        registry.register("UInt64", || Column::Numeric(NumericColumn::with_width(8)));
        registry.register("Int8", || Column::Numeric(NumericColumn::with_width(1)));
        registry.register("Int16", || Column::Numeric(NumericColumn::with_width(2)));
        registry.register("Int32", || Column::Numeric(NumericColumn::with_width(4)));
        registry.register("Int64", || Column::Numeric(NumericColumn::with_width(8)));
        registry.register("Float32", || Column::Numeric(NumericColumn::with_width(4)));
        registry.register("Float64", || Column::Numeric(NumericColumn::with_width(8)));
        registry.register("String", || Column::String(StringColumn::new()));
        registry
    }

    /// Register (or replace) a factory for a simple type name.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Column + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Produce a fresh, empty column for a wire type name.
    pub fn resolve(&self, name: &str) -> Result<Column> {
        if let Some(factory) = self.factories.get(name) {
            return Ok(factory());
        }
        if let Some(size) = parse_fixed_string(name) {
            return Ok(Column::FixedString(FixedStringColumn::with_size(size)));
        }
        Err(ColwireError::UnimplementedType(name.to_string()))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `FixedString(N)` with `1 <= N <= MAX_STRING_LEN`.
fn parse_fixed_string(name: &str) -> Option<usize> {
    let inner = name.strip_prefix("FixedString(")?.strip_suffix(')')?;
    let size: usize = inner.parse().ok()?;
    if size == 0 || size > MAX_STRING_LEN {
        return None;
    }
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_string_names() {
        assert_eq!(parse_fixed_string("FixedString(16)"), Some(16));
        assert_eq!(parse_fixed_string("FixedString(0)"), None);
        assert_eq!(parse_fixed_string("FixedString()"), None);
        assert_eq!(parse_fixed_string("FixedString(abc)"), None);
        assert_eq!(parse_fixed_string("FixedString(1"), None);
        assert_eq!(parse_fixed_string("String"), None);
    }

    #[test]
    fn unknown_names_are_hard_errors() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.resolve("Array(UInt8)"),
            Err(ColwireError::UnimplementedType(_))
        ));
    }
}
