use serde::Serialize;

use crate::CoreError;

/// A company name as given by the caller, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CompanyQuery(String);

impl CompanyQuery {
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyCompanyName`] if `raw` is blank.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyCompanyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompanyQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CompanyQuery {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let q = CompanyQuery::parse("  Microsoft \n").unwrap();
        assert_eq!(q.as_str(), "Microsoft");
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(matches!(
            CompanyQuery::parse("   "),
            Err(CoreError::EmptyCompanyName)
        ));
        assert!(matches!(
            CompanyQuery::parse(""),
            Err(CoreError::EmptyCompanyName)
        ));
    }

    #[test]
    fn inner_whitespace_is_preserved() {
        let q: CompanyQuery = "Xyzzy Nonexistent Corp".parse().unwrap();
        assert_eq!(q.to_string(), "Xyzzy Nonexistent Corp");
    }
}
