use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    /// Any other ASCII token, as accepted by `hash-object -t`
    Other(String),
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Other(name) => name,
        }
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other
                if !other.is_empty()
                    && other.bytes().all(|b| b.is_ascii() && b != b' ' && b != b'\0') =>
            {
                Ok(ObjectType::Other(other.to_string()))
            }
            other => Err(Error::InvalidObjectType {
                value: other.to_string(),
            }),
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ObjectType::try_from(s)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("blob", ObjectType::Blob)]
    #[case("tree", ObjectType::Tree)]
    #[case("commit", ObjectType::Commit)]
    #[case("tag", ObjectType::Other("tag".to_string()))]
    fn parses_known_and_arbitrary_tokens(#[case] input: &str, #[case] expected: ObjectType) {
        pretty_assertions::assert_eq!(ObjectType::try_from(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("two words")]
    #[case("nul\0byte")]
    #[case("blöb")]
    fn rejects_tokens_that_break_the_header(#[case] input: &str) {
        assert!(matches!(
            ObjectType::try_from(input),
            Err(Error::InvalidObjectType { .. })
        ));
    }
}
