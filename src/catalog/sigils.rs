//! Type sigils and their explicit QB64 types.
//!
//! A sigil is the single trailing character that gives a BASIC identifier its
//! type. When an identifier is turned into a declaration with an explicit
//! `As` clause, the sigil is dropped and replaced by the type from this
//! table:
//!
//! | Sigil | Legacy type | QB64 type |
//! |-------|-------------|-----------|
//! | `%`   | INTEGER     | `Integer` |
//! | `&`   | LONG        | `Long`    |
//! | `!`   | SINGLE      | `Single`  |
//! | `#`   | DOUBLE      | `Double`  |
//! | `@`   | CURRENCY    | `_Float`  |
//! | `$`   | STRING      | `String`  |
//!
//! QB64 has no fixed-point currency type, so `@` maps to `_Float`, the only
//! type that keeps both the integer range and the four decimal places.

use std::fmt;

/// One of the six recognized type sigils.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSigil {
    /// `%`
    Integer,
    /// `&`
    Long,
    /// `!`
    Single,
    /// `#`
    Double,
    /// `@`
    Currency,
    /// `$`
    String,
}

/// Every sigil, in table order.
pub const SIGILS: [TypeSigil; 6] = [
    TypeSigil::Integer,
    TypeSigil::Long,
    TypeSigil::Single,
    TypeSigil::Double,
    TypeSigil::Currency,
    TypeSigil::String,
];

impl TypeSigil {
    /// Parses a sigil character.
    pub fn from_char(c: char) -> Option<Self> {
        SIGILS.iter().copied().find(|sigil| sigil.as_char() == c)
    }

    /// The sigil character.
    pub fn as_char(&self) -> char {
        match self {
            TypeSigil::Integer => '%',
            TypeSigil::Long => '&',
            TypeSigil::Single => '!',
            TypeSigil::Double => '#',
            TypeSigil::Currency => '@',
            TypeSigil::String => '$',
        }
    }

    /// The explicit QB64 type this sigil stands for.
    pub fn explicit_type(&self) -> &'static str {
        match self {
            TypeSigil::Integer => "Integer",
            TypeSigil::Long => "Long",
            TypeSigil::Single => "Single",
            TypeSigil::Double => "Double",
            TypeSigil::Currency => "_Float",
            TypeSigil::String => "String",
        }
    }
}

impl fmt::Display for TypeSigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Splits a trailing sigil off an identifier.
///
/// ```
/// use qb64port::catalog::{split_sigil, TypeSigil};
///
/// assert_eq!(split_sigil("total&"), ("total", Some(TypeSigil::Long)));
/// assert_eq!(split_sigil("count"), ("count", None));
/// ```
pub fn split_sigil(name: &str) -> (&str, Option<TypeSigil>) {
    match name.chars().last().and_then(TypeSigil::from_char) {
        Some(sigil) => (&name[..name.len() - 1], Some(sigil)),
        None => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_sigil_maps_to_one_distinct_type() {
        let types: HashSet<_> = SIGILS.iter().map(|s| s.explicit_type()).collect();
        assert_eq!(types.len(), SIGILS.len());
        for sigil in SIGILS {
            assert_eq!(TypeSigil::from_char(sigil.as_char()), Some(sigil));
        }
    }

    #[test]
    fn test_split_sigil() {
        assert_eq!(split_sigil("x#"), ("x", Some(TypeSigil::Double)));
        assert_eq!(split_sigil("name$"), ("name", Some(TypeSigil::String)));
        assert_eq!(split_sigil(""), ("", None));
    }
}
