use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
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
            other => Err(Error::UnsupportedType(other.to_string())),
        }
    }
}

impl std::str::FromStr for ObjectType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        ObjectType::try_from(value)
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
    fn known_tokens_parse(#[case] token: &str, #[case] expected: ObjectType) {
        pretty_assertions::assert_eq!(ObjectType::try_from(token).unwrap(), expected);
        pretty_assertions::assert_eq!(expected.as_str(), token);
    }

    #[rstest]
    #[case("tag")]
    #[case("")]
    #[case("Blob")]
    fn unknown_tokens_are_unsupported(#[case] token: &str) {
        assert!(matches!(
            ObjectType::try_from(token),
            Err(Error::UnsupportedType(t)) if t == token
        ));
    }
}
