use crate::artifacts::objects::codec;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Minimum number of hex characters accepted by prefix lookups
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Object database rooted at `.git/objects`
///
/// Objects are written once under `<2 hex>/<38 hex>` and never rewritten.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

// TODO: implement packfiles for better performance and storage efficiency
impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Frame, hash, compress and persist an object, returning its id
    ///
    /// Storing content that is already present is a no-op.
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let framed = object.framed()?;
        let object_id = codec::digest(&framed);
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::malformed(format!("invalid object path {}", object_path.display())))?;
        std::fs::create_dir_all(object_dir).map_err(|e| Error::io(object_dir, e))?;

        self.write_object(&object_path, &framed)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "object stored");

        Ok(object_id)
    }

    /// Read and decompress the framed bytes of an object
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        let object_content = std::fs::read(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(object_id.to_string()),
            _ => Error::io(&object_path, e),
        })?;

        codec::decompress(&object_content)
    }

    /// Read an object and dispatch it to the parser for its declared type
    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, payload) = self.parse_object_as_bytes(object_id)?;
        tracing::trace!(oid = %object_id, kind = %object_type, "object read");

        ObjectBox::parse(object_type, payload)
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> Result<Option<Tree>> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Option<Commit>> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, Bytes)> {
        codec::parse_frame(self.load(object_id)?)
    }

    /// Resolve a hex prefix to the first stored object of the expected type
    ///
    /// Candidates are visited in directory enumeration order, which is not
    /// stable across platforms; callers wanting a unique answer must pass a
    /// prefix long enough to be unambiguous.
    pub fn find_object(
        &self,
        prefix: &str,
        expected_type: ObjectType,
    ) -> Result<(ObjectId, ObjectBox)> {
        for object_id in self.find_objects_by_prefix(prefix)? {
            let (object_type, payload) = self.parse_object_as_bytes(&object_id)?;

            if object_type == expected_type {
                let object = ObjectBox::parse(object_type, payload)?;
                return Ok((object_id, object));
            }
        }

        Err(Error::NotFound(format!("{expected_type} {prefix}")))
    }

    /// Find all objects whose id starts with the given prefix
    ///
    /// Only the `<first 2 chars>` fan-out directory is listed. An empty result
    /// is not an error here; `find_object` turns it into `NotFound`.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        if prefix.len() < MIN_PREFIX_LENGTH || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::AmbiguousOrInvalidPrefix(prefix.to_string()));
        }

        let prefix = prefix.to_ascii_lowercase();
        let (dir_name, file_prefix) = prefix.split_at(MIN_PREFIX_LENGTH);
        let dir_path = self.path.join(dir_name);

        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path).map_err(|e| Error::io(&dir_path, e))? {
            let entry = entry.map_err(|e| Error::io(&dir_path, e))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                // temporary files left by an interrupted write never parse as ids
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    matches.push(oid);
                }
            }
        }

        tracing::debug!(prefix = %prefix, candidates = matches.len(), "prefix lookup");
        Ok(matches)
    }

    fn write_object(&self, object_path: &Path, framed: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::malformed(format!("invalid object path {}", object_path.display())))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = codec::compress(framed)?;

        let result = Self::write_file(&temp_object_path, &object_content).and_then(|_| {
            // rename the temp file to the object file to make it atomic
            std::fs::rename(&temp_object_path, object_path).map_err(|e| Error::io(object_path, e))
        });

        if result.is_err() {
            let _ = std::fs::remove_file(&temp_object_path);
        }

        result
    }

    fn write_file(path: &PathBuf, content: &[u8]) -> Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;

        file.write_all(content).map_err(|e| Error::io(path, e))?;
        file.sync_all().map_err(|e| Error::io(path, e))
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::index::entry_mode::EntryMode;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::commit::Author;
    use crate::artifacts::objects::object::Packable;
    use crate::artifacts::objects::tree::TreeEntry;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    #[rstest]
    fn stores_under_fan_out_path(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let oid = database.store(&Blob::new(&b"test\n"[..])).unwrap();

        assert_eq!(oid.as_ref(), "9daeafb9864cf43055ae93beb0afd6c7d144bfa4");
        let stored = objects_dir
            .path()
            .join("objects/9d/aeafb9864cf43055ae93beb0afd6c7d144bfa4");
        assert!(stored.is_file());
        assert_eq!(
            codec::decompress(&std::fs::read(stored).unwrap()).unwrap().as_ref(),
            b"blob 5\x00test\n"
        );
    }

    #[rstest]
    fn storing_twice_is_a_no_op(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob = Blob::new(&b"same"[..]);

        let first = database.store(&blob).unwrap();
        let path = database.objects_path().join(first.to_path());
        let written = std::fs::metadata(&path).unwrap().modified().unwrap();

        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), written);
        let files = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[rstest]
    fn write_then_read_returns_same_serialization(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob_id = database.store(&Blob::new(&b"content"[..])).unwrap();
        let tree = Tree::new(vec![TreeEntry::new(EntryMode::default(), "file", blob_id)]);
        let tree_id = database.store(&tree).unwrap();
        let author = Author::new("A U Thor".to_string(), "author@example.com".to_string());
        let commit = Commit::new(None, tree_id.clone(), author.clone(), author, "msg\n".to_string());
        let commit_id = database.store(&commit).unwrap();

        let read_tree = database.parse_object(&tree_id).unwrap();
        assert_eq!(read_tree.serialize().unwrap(), tree.serialize().unwrap());
        assert_eq!(read_tree, ObjectBox::from(tree));

        let read_commit = database.parse_object_as_commit(&commit_id).unwrap().unwrap();
        assert_eq!(read_commit.serialize().unwrap(), commit.serialize().unwrap());
        assert_eq!(database.object_type(&commit_id).unwrap(), ObjectType::Commit);
        assert!(database.parse_object_as_tree(&commit_id).unwrap().is_none());
    }

    #[rstest]
    fn missing_object_is_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::from_raw(&[0xab; 20]);

        assert!(!database.exists(&oid));
        assert!(matches!(database.parse_object(&oid), Err(Error::NotFound(_))));
    }

    #[rstest]
    fn corrupt_file_is_a_corrupt_stream(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(&Blob::new(&b"x"[..])).unwrap();
        std::fs::write(database.objects_path().join(oid.to_path()), b"garbage").unwrap();

        assert!(matches!(database.parse_object(&oid), Err(Error::CorruptStream(_))));
    }

    #[rstest]
    fn wrong_declared_length_is_malformed(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::from_raw(&[0x11; 20]);
        let path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, codec::compress(b"blob 10\x00short").unwrap()).unwrap();

        assert!(matches!(database.parse_object(&oid), Err(Error::Malformed(_))));
    }

    #[rstest]
    fn unknown_type_token_is_unsupported(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = ObjectId::from_raw(&[0x22; 20]);
        let path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, codec::compress(b"tag 3\x00abc").unwrap()).unwrap();

        assert!(matches!(
            database.parse_object(&oid),
            Err(Error::UnsupportedType(t)) if t == "tag"
        ));
    }

    #[rstest]
    fn two_character_prefix_finds_the_object(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(&Blob::new(&b"test\n"[..])).unwrap();

        let (found, object) = database.find_object(&oid.as_ref()[..2], ObjectType::Blob).unwrap();

        assert_eq!(found, oid);
        assert_eq!(object, ObjectBox::from(Blob::new(&b"test\n"[..])));
    }

    #[rstest]
    fn prefix_lookup_filters_by_type(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(&Blob::new(&b"test\n"[..])).unwrap();

        assert!(matches!(
            database.find_object(oid.as_ref(), ObjectType::Tree),
            Err(Error::NotFound(_))
        ));
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("9")]
    #[case("zz")]
    fn short_or_non_hex_prefix_is_rejected(objects_dir: TempDir, #[case] prefix: &str) {
        let database = database(&objects_dir);

        assert!(matches!(
            database.find_object(prefix, ObjectType::Blob),
            Err(Error::AmbiguousOrInvalidPrefix(_))
        ));
    }

    #[rstest]
    fn unmatched_prefix_is_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        database.store(&Blob::new(&b"test\n"[..])).unwrap();

        assert!(matches!(
            database.find_object("9dff", ObjectType::Blob),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            database.find_object("00", ObjectType::Blob),
            Err(Error::NotFound(_))
        ));
    }

    #[rstest]
    fn prefix_lookup_returns_every_candidate(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let stored = (0..64)
            .map(|i| database.store(&Blob::new(format!("blob {i}").into_bytes())).unwrap())
            .collect::<Vec<_>>();
        let dir = stored[0].as_ref()[..2].to_string();

        let mut found = database.find_objects_by_prefix(&dir).unwrap();
        let mut expected = stored
            .into_iter()
            .filter(|oid| oid.as_ref().starts_with(&dir))
            .collect::<Vec<_>>();
        found.sort();
        expected.sort();

        assert_eq!(found, expected);
    }
}
