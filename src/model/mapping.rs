use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MappingError(String);

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for MappingError {}

/// The header row of a tab.
///
/// The known columns must appear first and in their canonical order, which is what allows rows to
/// be written positionally (`A:D`). Any columns after them are tolerated and ignored.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    headers: Vec<Header>,
}

impl Mapping {
    /// Creates a `Mapping` from a header row, checking it against the `expected` leading headers.
    /// Surrounding whitespace in the sheet's headers is ignored.
    pub fn new<S, I>(headers: I, expected: &[&str]) -> Result<Self, MappingError>
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        let headers: Vec<Header> = headers
            .into_iter()
            .map(|s| Header(s.into().trim().to_string()))
            .collect();

        for (ix, want) in expected.iter().enumerate() {
            match headers.get(ix) {
                Some(found) if found.as_ref() == *want => {}
                Some(found) => {
                    return Err(MappingError(format!(
                        "Expected header '{want}' in column {} but found '{}'",
                        ix + 1,
                        found.as_ref()
                    )))
                }
                None => {
                    return Err(MappingError(format!(
                        "Missing header '{want}' in column {}",
                        ix + 1
                    )))
                }
            }
        }

        let unique: HashSet<&Header> = headers.iter().filter(|h| !h.0.is_empty()).collect();
        if unique.len() != headers.iter().filter(|h| !h.0.is_empty()).count() {
            return Err(MappingError(String::from("Encountered a duplicate header")));
        }

        Ok(Self { headers })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    #[cfg(test)]
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }
}

/// Represents a header in the Google sheet, for example, `week_number`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(String);

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
