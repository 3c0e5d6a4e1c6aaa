//! Deterministic version tags.
//!
//! The tag is a hex SHA-256 digest over the scope id, the table name and
//! every column of the entity in entry order. Each field is length-framed
//! and each value carries a presence flag, so a null value, an empty value
//! and differently split names never collide by concatenation.

use sha2::{Digest, Sha256};

use crate::entity::{Entity, VersionTag};

const NULL_MARKER: u8 = 0;
const VALUE_MARKER: u8 = 1;

/// Computes version tags for one adapter scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityVersioner {
    scope_id: String,
}

impl EntityVersioner {
    pub fn new(scope_id: impl Into<String>) -> Self {
        Self {
            scope_id: scope_id.into(),
        }
    }

    pub fn scope_id(&self) -> &str {
        &self.scope_id
    }

    /// Tag of `entity` as a row of `table`.
    pub fn compute(&self, table: &str, entity: &Entity) -> VersionTag {
        compute_tag(&self.scope_id, table, entity)
    }
}

/// Stateless form of [`EntityVersioner::compute`].
pub fn compute_tag(scope_id: &str, table: &str, entity: &Entity) -> VersionTag {
    let mut hasher = Sha256::new();
    write_field(&mut hasher, scope_id.as_bytes());
    write_field(&mut hasher, table.as_bytes());
    for (column, value) in entity.iter() {
        write_field(&mut hasher, column.as_bytes());
        match value {
            Some(value) => {
                hasher.update([VALUE_MARKER]);
                write_field(&mut hasher, value.as_bytes());
            }
            None => hasher.update([NULL_MARKER]),
        }
    }
    VersionTag::new(hex::encode(hasher.finalize()))
}

fn write_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}
