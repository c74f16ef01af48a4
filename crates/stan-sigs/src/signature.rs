//! Signature comment micro-format.
//!
//! A signature comment is a single line of the form
//!
//! ```text
//! <!-- RETURN; NAME; ARGUMENTS; -->    standard signature
//! <!-- RETURN; NAME ~; -->             sampling statement
//! <!-- RETURN; NAME; ~; -->            sampling statement, `~` as the arguments
//! ```
//!
//! Segments are separated by `;` and trimmed of whitespace and `~`.

use std::fmt;

/// Token every candidate line must start with.
pub const COMMENT_OPEN: &str = "<!-- ";

/// Literal written in place of an argument list for statement forms.
pub const STATEMENT_SENTINEL: &str = "~";

/// Argument list of a signature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arguments {
    /// Sampling statement (`y ~ dist(...)`), written as `NAME ~`.
    Statement,
    /// Sampling statement with `~` written in the argument slot.
    ///
    /// Kept apart from [`Arguments::Statement`] because the two spellings
    /// get different anchors on the rendered page.
    SlotStatement,
    /// Raw argument list, e.g. `(real x, real y)`.
    List(String),
}

impl Arguments {
    pub fn as_str(&self) -> &str {
        match self {
            Arguments::Statement | Arguments::SlotStatement => STATEMENT_SENTINEL,
            Arguments::List(args) => args,
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(self, Arguments::Statement | Arguments::SlotStatement)
    }
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed signature. Records compare by `(name, arguments, return_type)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignatureRecord {
    pub name: String,
    pub arguments: Arguments,
    pub return_type: String,
}

impl SignatureRecord {
    pub fn new(name: impl Into<String>, arguments: Arguments, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
            return_type: return_type.into(),
        }
    }

    /// Rebuild the comment exactly as the renderer's anchor filter sees it.
    ///
    /// `<!-- real; foo; (real x); -->`, `<!-- real; foo ~; -->` or
    /// `<!-- real; foo; ~; -->`
    pub fn canonical_comment(&self) -> String {
        match &self.arguments {
            Arguments::Statement => format!("<!-- {}; {} ~; -->", self.return_type, self.name),
            Arguments::SlotStatement => format!(
                "<!-- {}; {}; {}; -->",
                self.return_type, self.name, STATEMENT_SENTINEL
            ),
            Arguments::List(args) => {
                format!("<!-- {}; {}; {}; -->", self.return_type, self.name, args)
            }
        }
    }
}

/// Outcome of looking at one line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineParse {
    /// Line does not start with [`COMMENT_OPEN`].
    NotCandidate,
    Signature(SignatureRecord),
    /// Candidate that is not a well-formed signature.
    Rejected(Reject),
}

/// Why a candidate line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Neither 3 nor 4 `;` pieces.
    SegmentCount(usize),
    EmptyName,
    /// 4 pieces with a blank argument slot and no `~`.
    EmptyArguments,
}

impl fmt::Display for Reject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reject::SegmentCount(n) => write!(f, "{} segments", n),
            Reject::EmptyName => f.write_str("empty name"),
            Reject::EmptyArguments => f.write_str("empty argument list"),
        }
    }
}

fn trim_segment(segment: &str) -> &str {
    segment.trim_matches(|c: char| c.is_whitespace() || c == '~')
}

/// Parse a single line.
pub fn parse_line(line: &str) -> LineParse {
    let Some(body) = line.strip_prefix(COMMENT_OPEN) else {
        return LineParse::NotCandidate;
    };

    let raw: Vec<&str> = body.split(';').collect();
    let parts: Vec<&str> = raw.iter().copied().map(trim_segment).collect();
    let (return_type, name, arguments) = match parts.as_slice() {
        [ret, name, _close] => (*ret, *name, Arguments::Statement),
        // `<!-- real; foo; ~; -->` trims to an empty argument slot
        [ret, name, "", _close] => {
            if !raw[2].contains(STATEMENT_SENTINEL) {
                return LineParse::Rejected(Reject::EmptyArguments);
            }
            (*ret, *name, Arguments::SlotStatement)
        }
        [ret, name, args, _close] => (*ret, *name, Arguments::List(args.to_string())),
        _ => return LineParse::Rejected(Reject::SegmentCount(parts.len())),
    };

    if name.is_empty() {
        return LineParse::Rejected(Reject::EmptyName);
    }

    LineParse::Signature(SignatureRecord::new(name, arguments, return_type))
}
