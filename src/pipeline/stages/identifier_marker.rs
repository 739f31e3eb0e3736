//! Wraps identifiers in well-known message shapes in backticks.
//!
//! Users write exclude patterns against what they see, so this runs before
//! any text-based exclusion.

use crate::core::Diagnostic;
use crate::errors::LintError;
use crate::pipeline::Stage;
use once_cell::sync::Lazy;
use regex::Regex;

struct ReplacePattern {
    re: Regex,
    repl: &'static str,
}

const RULES: &[(&str, &str)] = &[
    // unparam
    (r"^(\S+) - (\S+) is unused$", "`${1}` - `${2}` is unused"),
    (r"^(\S+) - (\S+) always receives (\S+)$", "`${1}` - `${2}` always receives `${3}`"),
    (r"^(\S+) - result (\S+) is always nil$", "`${1}` - result `${2}` is always nil"),
    (r"^(\S+) - result (\S+) is never used$", "`${1}` - result `${2}` is never used"),
    // interfacer
    (r"^(\S+) can be (\S+)$", "`${1}` can be `${2}`"),
    // govet
    (
        r"^printf: (\S+) arg list ends with redundant newline$",
        "printf: `${1}` arg list ends with redundant newline",
    ),
    (
        r"^composites: (\S+) composite literal uses unkeyed fields$",
        "composites: `${1}` composite literal uses unkeyed fields",
    ),
    // gosec
    (r"^TLS InsecureSkipVerify set true.$", "TLS `InsecureSkipVerify` set true."),
    // gosimple
    (r"should replace loop with (.*)$", "should replace loop with `${1}`"),
    (
        r"should omit comparison to bool constant, can be simplified to (.+)$",
        "should omit comparison to bool constant, can be simplified to `${1}`",
    ),
    (r"should write (.+) instead of (.+)$", "should write `${1}` instead of `${2}`"),
    (r"redundant return statement$", "redundant `return` statement"),
    // staticcheck
    (r"this value of (\S+) is never used$", "this value of `${1}` is never used"),
    (
        r"should use time.Since instead of time.Now\(\).Sub$",
        "should use `time.Since` instead of `time.Now().Sub`",
    ),
    // unused
    (r"(func|const|field|type|var) (\S+) is unused$", "${1} `${2}` is unused"),
    // typecheck
    (r"^unknown field (\S+) in struct literal$", "unknown field `${1}` in struct literal"),
    (r"^undeclared name: (\S+)$", "undeclared name: `${1}`"),
    (r"^(\S+) declared but not used$", "`${1}` declared but not used"),
    (r"^(\S+) is not a type$", "`${1}` is not a type"),
    (r"^(\S+) redeclared in this block$", "`${1}` redeclared in this block"),
    // golint
    (
        r"^exported (type|method|function|var|const) (\S+) should have comment or be unexported$",
        "exported ${1} `${2}` should have comment or be unexported",
    ),
    (r"^should replace (.+) with (.+)$", "should replace `${1}` with `${2}`"),
    (
        r"^(struct field|var|range var|const|type|(?:func|method|interface method) (?:parameter|result)) (\S+) should be (\S+)$",
        "${1} `${2}` should be `${3}`",
    ),
    (r"^(?:method|func) (\S+) should be (\S+)$", "func `${1}` should be `${2}`"),
];

static PATTERNS: Lazy<Vec<ReplacePattern>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|&(pattern, repl)| ReplacePattern {
            re: Regex::new(pattern).expect("identifier marker patterns are valid"),
            repl,
        })
        .collect()
});

#[derive(Debug, Default)]
pub struct IdentifierMarker;

impl IdentifierMarker {
    pub fn new() -> Self {
        Self
    }

    /// Apply the first matching rule, if any.
    pub fn mark(message: &str) -> String {
        PATTERNS
            .iter()
            .find(|p| p.re.is_match(message))
            .map(|p| p.re.replace(message, p.repl).into_owned())
            .unwrap_or_else(|| message.to_string())
    }
}

impl Stage for IdentifierMarker {
    fn name(&self) -> &'static str {
        "identifier_marker"
    }

    fn process(&mut self, input: &[Diagnostic]) -> Result<Vec<Diagnostic>, LintError> {
        Ok(input
            .iter()
            .map(|diagnostic| {
                let mut diagnostic = diagnostic.clone();
                diagnostic.message = Self::mark(&diagnostic.message);
                diagnostic
            })
            .collect())
    }
}
