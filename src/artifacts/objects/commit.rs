//! Commit object
//!
//! Commits tie a tree snapshot to its history and authorship:
//! - A tree object ID (directory snapshot)
//! - An optional parent commit ID (absent for a root commit)
//! - Author and committer information
//! - Commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SubsecRound};
use std::io::BufRead;

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    /// Create a new author stamped with the current local time
    ///
    /// Headers carry whole seconds, so the sub-second part is dropped here.
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset().trunc_subsecs(0),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> timestamp timezone", as written in commit headers
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Load identity from `<PREFIX>_NAME`, `<PREFIX>_EMAIL` and optionally `<PREFIX>_DATE`
    ///
    /// `prefix` is `GIT_AUTHOR` or `GIT_COMMITTER`. Dates are accepted as
    /// RFC 2822 or `%Y-%m-%d %H:%M:%S %z`; without one the current time is
    /// used. A date in neither form is an error.
    pub fn load_from_env(prefix: &str) -> anyhow::Result<Self> {
        let name = std::env::var(format!("{prefix}_NAME")).context(format!("{prefix}_NAME not set"))?;
        let email =
            std::env::var(format!("{prefix}_EMAIL")).context(format!("{prefix}_EMAIL not set"))?;

        match std::env::var(format!("{prefix}_DATE")) {
            Ok(date_str) => {
                let timestamp = DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                    .with_context(|| format!("{prefix}_DATE has an unrecognised format: {date_str:?}"))?;
                Ok(Author::new_with_timestamp(name, email, timestamp))
            }
            Err(_) => Ok(Author::new(name, email)),
        }
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        // Format: "name <email> timestamp timezone"
        // Split from right to get timezone and timestamp first
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(Error::malformed(format!("invalid identity {value:?}")));
        }

        let offset = parse_offset(parts[0])?;
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| Error::malformed(format!("invalid timestamp {:?}", parts[1])))?;
        let name_email = parts[2]
            .strip_suffix('>')
            .ok_or_else(|| Error::malformed("identity is missing '>'"))?;

        let email_start = name_email
            .rfind('<')
            .ok_or_else(|| Error::malformed("identity is missing '<'"))?;
        let name = name_email[..email_start]
            .strip_suffix(' ')
            .ok_or_else(|| Error::malformed("identity is missing a space before '<'"))?;
        let email = &name_email[email_start + 1..];

        let timestamp = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| Error::malformed(format!("timestamp out of range: {timestamp}")))?
            .with_timezone(&offset);

        Ok(Author::new_with_timestamp(
            name.to_string(),
            email.to_string(),
            timestamp,
        ))
    }
}

/// Parse a `+hhmm` / `-hhmm` timezone
fn parse_offset(value: &str) -> Result<FixedOffset> {
    let invalid = || Error::malformed(format!("invalid timezone {value:?}"));

    let (sign, digits) = match value.split_at_checked(1) {
        Some(("+", digits)) => (1, digits),
        Some(("-", digits)) => (-1, digits),
        _ => return Err(invalid()),
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours = digits[..2].parse::<i32>().map_err(|_| invalid())?;
    let minutes = digits[2..].parse::<i32>().map_err(|_| invalid())?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Commit object
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit ID (absent for the root commit)
    parent: Option<ObjectId>,
    /// Tree object ID representing the directory snapshot
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        parent: Option<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Commit {
            parent,
            tree_oid,
            author,
            committer,
            message,
        }
    }

    /// First line of the message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        Ok(Bytes::from(self.display()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|_| Error::malformed("commit payload is not valid UTF-8"))?;

        let (headers, message) = content
            .split_once("\n\n")
            .ok_or_else(|| Error::malformed("commit is missing the blank line before its message"))?;
        let mut lines = headers.split('\n').peekable();

        let tree_oid = lines
            .next()
            .and_then(|line| line.strip_prefix("tree "))
            .ok_or_else(|| Error::malformed("commit is missing its tree line"))?;
        let tree_oid = ObjectId::try_parse(tree_oid.to_string())?;

        let parent = match lines.next_if(|line| line.starts_with("parent ")) {
            Some(line) => Some(ObjectId::try_parse(line["parent ".len()..].to_string())?),
            None => None,
        };
        if lines.peek().is_some_and(|line| line.starts_with("parent ")) {
            return Err(Error::malformed("commit has more than one parent"));
        }

        let author = lines
            .next()
            .and_then(|line| line.strip_prefix("author "))
            .ok_or_else(|| Error::malformed("commit is missing its author line"))?;
        let author = Author::try_from(author)?;

        let committer = lines
            .next()
            .and_then(|line| line.strip_prefix("committer "))
            .ok_or_else(|| Error::malformed("commit is missing its committer line"))?;
        let committer = Author::try_from(committer)?;

        // any further headers (encoding, signatures) are not modelled

        Ok(Self::new(
            parent,
            tree_oid,
            author,
            committer,
            message.to_string(),
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        let mut lines = vec![];

        lines.push(format!("tree {}", self.tree_oid.as_ref()));
        if let Some(parent) = &self.parent {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    const TREE_OID: &str = "2b297e643c551e76cfa1f93810c50811382f9117";
    const PARENT_OID: &str = "9daeafb9864cf43055ae93beb0afd6c7d144bfa4";

    #[fixture]
    fn author() -> Author {
        let timestamp = DateTime::parse_from_str("2024-01-02 03:04:05 +0200", "%Y-%m-%d %H:%M:%S %z")
            .unwrap();
        Author::new_with_timestamp("Jane Doe".to_string(), "jane@example.com".to_string(), timestamp)
    }

    fn oid(hex: &str) -> ObjectId {
        ObjectId::try_parse(hex.to_string()).unwrap()
    }

    #[rstest]
    fn serializes_headers_in_fixed_order(author: Author) {
        let commit = Commit::new(
            Some(oid(PARENT_OID)),
            oid(TREE_OID),
            author.clone(),
            author,
            "Initial commit\n".to_string(),
        );

        let expected = format!(
            "tree {TREE_OID}\nparent {PARENT_OID}\nauthor Jane Doe <jane@example.com> 1704157445 +0200\ncommitter Jane Doe <jane@example.com> 1704157445 +0200\n\nInitial commit\n"
        );
        assert_eq!(commit.serialize().unwrap().as_ref(), expected.as_bytes());
    }

    #[rstest]
    fn root_commit_omits_parent_line(author: Author) {
        let commit = Commit::new(None, oid(TREE_OID), author.clone(), author, "root".to_string());
        let payload = commit.serialize().unwrap();

        assert!(!String::from_utf8_lossy(&payload).contains("parent "));
        let parsed = Commit::deserialize(std::io::Cursor::new(payload)).unwrap();
        assert_eq!(parsed.parent(), None);
        assert_eq!(parsed, commit);
    }

    #[rstest]
    fn parse_keeps_timezone_and_message_verbatim(author: Author) {
        let commit = Commit::new(
            Some(oid(PARENT_OID)),
            oid(TREE_OID),
            author.clone(),
            author,
            "subject\n\nbody line\n\n".to_string(),
        );

        let parsed = Commit::deserialize(std::io::Cursor::new(commit.serialize().unwrap())).unwrap();
        assert_eq!(parsed.message(), "subject\n\nbody line\n\n");
        assert_eq!(parsed.author().display(), commit.author().display());
        assert_eq!(parsed.short_message(), "subject");
    }

    #[rstest]
    #[case::no_blank_line(format!("tree {TREE_OID}\nauthor a <b> 1 +0000\ncommitter a <b> 1 +0000"))]
    #[case::no_tree(format!("parent {PARENT_OID}\nauthor a <b> 1 +0000\ncommitter a <b> 1 +0000\n\nmsg"))]
    #[case::no_author(format!("tree {TREE_OID}\ncommitter a <b> 1 +0000\n\nmsg"))]
    #[case::no_committer(format!("tree {TREE_OID}\nauthor a <b> 1 +0000\n\nmsg"))]
    #[case::bad_identity(format!("tree {TREE_OID}\nauthor a b 1 +0000\ncommitter a <b> 1 +0000\n\nmsg"))]
    #[case::bad_timezone(format!("tree {TREE_OID}\nauthor a <b> 1 UTC\ncommitter a <b> 1 +0000\n\nmsg"))]
    #[case::two_parents(format!("tree {TREE_OID}\nparent {PARENT_OID}\nparent {PARENT_OID}\nauthor a <b> 1 +0000\ncommitter a <b> 1 +0000\n\nmsg"))]
    fn non_conforming_commits_are_malformed(#[case] payload: String) {
        assert!(matches!(
            Commit::deserialize(std::io::Cursor::new(payload)),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn freshly_stamped_commit_round_trips() {
        let author = Author::new("Jane Doe".to_string(), "jane@example.com".to_string());
        let commit = Commit::new(None, oid(TREE_OID), author.clone(), author, "now\n".to_string());

        assert_eq!(commit.author().timestamp().timestamp_subsec_nanos(), 0);
        let parsed = Commit::deserialize(std::io::Cursor::new(commit.serialize().unwrap())).unwrap();
        assert_eq!(parsed, commit);
    }

    fn author_strategy() -> impl Strategy<Value = Author> {
        (
            "[A-Za-z][A-Za-z ]{0,12}[A-Za-z]",
            "[a-z]{1,8}@[a-z]{1,8}\\.com",
            0i64..4_000_000_000,
            -12i32..=14,
        )
            .prop_map(|(name, email, seconds, hours)| {
                let offset = FixedOffset::east_opt(hours * 3600).unwrap();
                let timestamp = DateTime::from_timestamp(seconds, 0)
                    .unwrap()
                    .with_timezone(&offset);
                Author::new_with_timestamp(name, email, timestamp)
            })
    }

    proptest! {
        #[test]
        fn payload_round_trips(
            parent in proptest::option::of(proptest::array::uniform20(any::<u8>())),
            tree in proptest::array::uniform20(any::<u8>()),
            author in author_strategy(),
            committer in author_strategy(),
            message in "[ -~\n]{0,64}",
        ) {
            let commit = Commit::new(
                parent.map(|raw| ObjectId::from_raw(&raw)),
                ObjectId::from_raw(&tree),
                author,
                committer,
                message,
            );

            let parsed = Commit::deserialize(std::io::Cursor::new(commit.serialize().unwrap())).unwrap();
            prop_assert_eq!(parsed.author().display(), commit.author().display());
            prop_assert_eq!(parsed.committer().display(), commit.committer().display());
            prop_assert_eq!(parsed, commit);
        }
    }
}
