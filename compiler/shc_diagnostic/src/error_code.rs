use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Semantic errors
/// - E3xxx: Generation errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unrecognized character in source
    E0001,
    /// Malformed numeric literal
    E0002,
    /// Unterminated string or character literal
    E0003,
    /// Unterminated block comment
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Expected identifier
    E1003,
    /// Expected type
    E1004,
    /// Invalid declaration
    E1005,
    /// Malformed preprocessor directive
    E1006,

    // Semantic Errors (E2xxx)
    /// Undeclared identifier
    E2001,
    /// Namespace conflict (redeclaration)
    E2002,
    /// Type mismatch
    E2003,
    /// Invalid operand types for operator
    E2004,
    /// Assignment to a non-lvalue or read-only value
    E2005,
    /// Wrong argument count
    E2006,
    /// Slot conflict or slot out of range
    E2007,
    /// Duplicate stage entry
    E2008,
    /// Invalid or misplaced system-value semantic
    E2009,
    /// Invalid stage entry signature
    E2010,
    /// Misplaced `break`, `continue`, `case` or `default`
    E2011,
    /// Duplicate case value
    E2012,
    /// Recursive call
    E2013,
    /// Expression is not a compile-time constant
    E2014,
    /// Invalid texture use
    E2015,
    /// Unknown member or swizzle
    E2016,
    /// Fragment-only operation reachable from another stage
    E2017,
    /// Function declared but never defined
    E2018,
    /// Invalid `packed_as` format
    E2019,

    // Generation Errors (E3xxx)
    /// Construct not expressible on the target
    E3001,
    /// Texture operation not supported on the target
    E3002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E2014 => "E2014",
            ErrorCode::E2015 => "E2015",
            ErrorCode::E2016 => "E2016",
            ErrorCode::E2017 => "E2017",
            ErrorCode::E2018 => "E2018",
            ErrorCode::E2019 => "E2019",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }

    /// Short description for `--explain` style output.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unrecognized character",
            ErrorCode::E0002 => "malformed numeric literal",
            ErrorCode::E0003 => "unterminated literal",
            ErrorCode::E0004 => "unterminated block comment",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "expected identifier",
            ErrorCode::E1004 => "expected type",
            ErrorCode::E1005 => "invalid declaration",
            ErrorCode::E1006 => "malformed preprocessor directive",
            ErrorCode::E2001 => "undeclared identifier",
            ErrorCode::E2002 => "namespace conflict",
            ErrorCode::E2003 => "type mismatch",
            ErrorCode::E2004 => "invalid operand types",
            ErrorCode::E2005 => "invalid assignment target",
            ErrorCode::E2006 => "wrong argument count",
            ErrorCode::E2007 => "slot conflict",
            ErrorCode::E2008 => "duplicate stage entry",
            ErrorCode::E2009 => "invalid semantic",
            ErrorCode::E2010 => "invalid entry signature",
            ErrorCode::E2011 => "misplaced statement",
            ErrorCode::E2012 => "duplicate case value",
            ErrorCode::E2013 => "recursive call",
            ErrorCode::E2014 => "not a constant expression",
            ErrorCode::E2015 => "invalid texture use",
            ErrorCode::E2016 => "unknown member",
            ErrorCode::E2017 => "fragment-only operation outside the fragment stage",
            ErrorCode::E2018 => "undefined function",
            ErrorCode::E2019 => "invalid packing format",
            ErrorCode::E3001 => "unsupported construct",
            ErrorCode::E3002 => "unsupported texture operation",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E2001.to_string(), "E2001");
        assert_eq!(ErrorCode::E3002.description(), "unsupported texture operation");
    }
}
