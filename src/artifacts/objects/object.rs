use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Result;
use bytes::Bytes;
use std::io::BufRead;

/// Produce the bytes written to the object file
pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    /// Bytes the object identity is computed from
    fn hashed_content(&self) -> Result<Bytes>;

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::hash_of(&self.hashed_content()?))
    }

    fn object_file_name(&self) -> Result<String> {
        Ok(self.object_type().file_name(&self.object_id()?))
    }
}
