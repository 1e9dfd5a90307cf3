// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static shape of call arguments, as seen when a rule is bound.

use crate::errors::FunctionError;

/// An argument expression as known before evaluation. Only literals carry
/// their value; everything else is resolved per row.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgExpr {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Time(String),
    FieldRef(String),
    Call(String),
}

impl ArgExpr {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ArgExpr::Integer(_) | ArgExpr::Float(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ArgExpr::Float(_))
    }

    pub fn is_time(&self) -> bool {
        matches!(self, ArgExpr::Time(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, ArgExpr::String(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, ArgExpr::Boolean(_))
    }

    pub fn is_field_ref(&self) -> bool {
        matches!(self, ArgExpr::FieldRef(_))
    }

    /// True for literals that can never evaluate to a bool.
    pub(crate) fn is_non_bool_literal(&self) -> bool {
        self.is_numeric() || self.is_time() || self.is_string()
    }
}

pub fn validate_len(expected: usize, got: usize) -> Result<(), FunctionError> {
    if expected != got {
        return Err(FunctionError::Arity {
            expected: expected.to_string(),
            got,
        });
    }
    Ok(())
}

/// Error for a literal argument at `index` (0-based) of the wrong type.
pub fn produce_err_info(index: usize, expected: &'static str) -> FunctionError {
    FunctionError::ArgType { index, expected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_classify_literals() {
        assert!(ArgExpr::Integer(1).is_numeric());
        assert!(ArgExpr::Float(1.5).is_numeric());
        assert!(ArgExpr::Float(1.5).is_float());
        assert!(!ArgExpr::Integer(1).is_float());
        assert!(ArgExpr::Boolean(true).is_boolean());
        assert!(ArgExpr::FieldRef("a".into()).is_field_ref());
        assert!(!ArgExpr::FieldRef("a".into()).is_non_bool_literal());
        assert!(!ArgExpr::Call("now".into()).is_non_bool_literal());
        assert!(ArgExpr::Time("10:00".into()).is_non_bool_literal());
    }

    #[test]
    fn arity_and_type_messages() {
        assert!(validate_len(2, 2).is_ok());
        assert_eq!(validate_len(2, 3).unwrap_err().to_string(), "expect 2 args but got 3");
        assert_eq!(
            produce_err_info(0, "boolean").to_string(),
            "Expect boolean type for parameter 1"
        );
    }
}
