use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::codec;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::errors::Result;
use bytes::Bytes;
use std::io::BufRead;
use std::path::PathBuf;

/// Produces the payload of an object (everything after the frame header)
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Parses an object back from its payload
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// `<type> <size>\0<payload>`
    fn framed(&self) -> Result<Bytes> {
        let payload = self.serialize()?;
        Ok(codec::frame(self.object_type(), &payload))
    }

    fn object_id(&self) -> Result<ObjectId> {
        Ok(codec::digest(&self.framed()?))
    }

    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// An object read back from the store, tagged by its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    /// Dispatch a payload to the parser matching its type token
    pub fn parse(object_type: ObjectType, payload: Bytes) -> Result<Self> {
        let reader = std::io::Cursor::new(payload);

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(reader)?))),
        }
    }

    pub fn as_object(&self) -> &dyn Object {
        match self {
            ObjectBox::Blob(blob) => &**blob,
            ObjectBox::Tree(tree) => &**tree,
            ObjectBox::Commit(commit) => &**commit,
        }
    }
}

impl Packable for ObjectBox {
    fn serialize(&self) -> Result<Bytes> {
        self.as_object().serialize()
    }
}

impl Object for ObjectBox {
    fn object_type(&self) -> ObjectType {
        self.as_object().object_type()
    }

    fn display(&self) -> String {
        self.as_object().display()
    }
}

impl From<Blob> for ObjectBox {
    fn from(blob: Blob) -> Self {
        ObjectBox::Blob(Box::new(blob))
    }
}

impl From<Tree> for ObjectBox {
    fn from(tree: Tree) -> Self {
        ObjectBox::Tree(Box::new(tree))
    }
}

impl From<Commit> for ObjectBox {
    fn from(commit: Commit) -> Self {
        ObjectBox::Commit(Box::new(commit))
    }
}
