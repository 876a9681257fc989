//! Small validated value types shared across the AYUNEX crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Builds a `NonEmptyText` from an optional input, treating `None` like blank text.
    pub fn from_optional(input: Option<impl AsRef<str>>) -> Result<Self, TextError> {
        match input {
            Some(text) => Self::new(text),
            None => Err(TextError::Empty),
        }
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let text = NonEmptyText::new("  Asha Verma \n").unwrap();
        assert_eq!(text.as_str(), "Asha Verma");
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(" \t "), Err(TextError::Empty));
    }

    #[test]
    fn missing_optional_input_is_empty() {
        assert_eq!(
            NonEmptyText::from_optional(None::<&str>),
            Err(TextError::Empty)
        );
        assert_eq!(
            NonEmptyText::from_optional(Some("fever")).unwrap().as_str(),
            "fever"
        );
    }

    #[test]
    fn deserialize_rejects_blank_string() {
        let err = serde_json::from_str::<NonEmptyText>("\"   \"").unwrap_err();
        assert!(err.to_string().contains("Text cannot be empty"));
    }
}
