use std::sync::LazyLock;

use regex::Regex;

static SYMBOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Letters and digits, plus the class/exchange separators used by
    // listings such as `BRK.B` or `RDS-A`.
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-]{0,9}$").expect("valid symbol regex")
});

/// Outcome of a ticker lookup.
///
/// A failed lookup is a degraded success, not an error: the pipeline keeps
/// going and the degraded value still renders as a string for logging and
/// prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerResolution {
    Resolved(String),
    Degraded { company: String, reason: String },
}

impl TickerResolution {
    /// Build a resolution from a provider symbol, degrading anything that is
    /// blank or does not look like a ticker.
    #[must_use]
    pub fn from_symbol(company: &str, symbol: &str) -> Self {
        let symbol = symbol.trim();
        if is_valid_symbol(symbol) {
            Self::Resolved(symbol.to_string())
        } else {
            Self::degraded(company, format!("unexpected symbol value '{symbol}'"))
        }
    }

    #[must_use]
    pub fn degraded(company: &str, reason: impl Into<String>) -> Self {
        Self::Degraded {
            company: company.to_string(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Self::Resolved(symbol) => Some(symbol),
            Self::Degraded { .. } => None,
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Renders the symbol, or the `ERROR: Could not fetch ticker ...` placeholder
/// that fills the stock code slot when resolution failed.
impl std::fmt::Display for TickerResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(symbol) => f.write_str(symbol),
            Self::Degraded { company, reason } => write!(
                f,
                "ERROR: Could not fetch ticker for '{company}'. Details: {reason}"
            ),
        }
    }
}

#[must_use]
pub fn is_valid_symbol(symbol: &str) -> bool {
    SYMBOL_RE.is_match(symbol)
}
