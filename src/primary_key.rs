use std::sync::OnceLock;

use uuid::Uuid;

use crate::field::Field;
use crate::types::Id;

/// Name of the primary key column of every mapped table.
pub const PK_FIELD: &str = "id";

/// Which UUID generator a UUID primary key uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UuidVersion {
    /// Time and node based.
    V1,
    /// Random.
    V4,
}

/// Id-generation policy of a storable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryKey {
    /// No declaration; the caller sets the id, or an `INTEGER PRIMARY KEY` column assigns it.
    Assigned,
    /// `INTEGER PRIMARY KEY`; the engine assigns the rowid.
    Autoincrement,
    /// `VARCHAR PRIMARY KEY`; a UUID is generated before insert.
    Uuid(UuidVersion),
}

impl PrimaryKey {
    #[must_use]
    pub fn sql_declaration(self) -> Option<&'static str> {
        match self {
            PrimaryKey::Assigned => None,
            PrimaryKey::Autoincrement => Some("INTEGER PRIMARY KEY"),
            PrimaryKey::Uuid(_) => Some("VARCHAR PRIMARY KEY"),
        }
    }

    /// The `id` field this strategy declares.
    #[must_use]
    pub fn field(self) -> Field {
        match self.sql_declaration() {
            Some(declaration) => Field::declared(PK_FIELD, declaration),
            None => Field::new(PK_FIELD),
        }
    }

    /// Before insert: give an unset id a fresh value, if this strategy generates ids.
    pub fn generate_id(self, id: &mut Option<Id>) {
        if id.is_some() {
            return;
        }
        if let PrimaryKey::Uuid(version) = self {
            *id = Some(Id::from(new_uuid(version)));
        }
    }

    /// After insert: adopt the engine-assigned rowid if the id is still unset.
    ///
    /// Only an autoincrement key is the rowid. An `Assigned` key may live in any column, so
    /// the mapper reads its stored value back instead.
    pub fn save_generated_id(self, id: &mut Option<Id>, last_insert_rowid: i64) {
        if id.is_none() && self == PrimaryKey::Autoincrement {
            *id = Some(Id::Int(last_insert_rowid));
        }
    }
}

fn new_uuid(version: UuidVersion) -> Uuid {
    match version {
        UuidVersion::V1 => Uuid::now_v1(node_id()),
        UuidVersion::V4 => Uuid::new_v4(),
    }
}

// Random node id with the multicast bit set.
fn node_id() -> &'static [u8; 6] {
    static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();
    NODE_ID.get_or_init(|| {
        let random = Uuid::new_v4();
        let bytes = random.as_bytes();
        [bytes[0] | 0x01, bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_strategy_fills_only_unset_ids() {
        let mut id = None;
        PrimaryKey::Uuid(UuidVersion::V4).generate_id(&mut id);
        let generated = id.clone().unwrap();
        assert!(matches!(&generated, Id::Text(s) if Uuid::parse_str(s).is_ok()));

        PrimaryKey::Uuid(UuidVersion::V4).generate_id(&mut id);
        assert_eq!(id, Some(generated));
    }

    #[test]
    fn v1_uuids_are_distinct_and_versioned() {
        let a = new_uuid(UuidVersion::V1);
        let b = new_uuid(UuidVersion::V1);
        assert_ne!(a, b);
        assert_eq!(a.get_version_num(), 1);
    }

    #[test]
    fn autoincrement_adopts_rowid_once() {
        let mut id = None;
        PrimaryKey::Autoincrement.generate_id(&mut id);
        assert_eq!(id, None);
        PrimaryKey::Autoincrement.save_generated_id(&mut id, 41);
        assert_eq!(id, Some(Id::Int(41)));
        PrimaryKey::Autoincrement.save_generated_id(&mut id, 99);
        assert_eq!(id, Some(Id::Int(41)));
    }

    #[test]
    fn assigned_key_never_adopts_rowid() {
        let mut id = None;
        PrimaryKey::Assigned.save_generated_id(&mut id, 5);
        assert_eq!(id, None);
    }

    #[test]
    fn uuid_strategy_never_adopts_rowid() {
        let mut id = None;
        PrimaryKey::Uuid(UuidVersion::V1).save_generated_id(&mut id, 3);
        assert_eq!(id, None);
    }

    #[test]
    fn id_field_carries_strategy_declaration() {
        assert_eq!(
            PrimaryKey::Autoincrement.field().column_definition(),
            "id INTEGER PRIMARY KEY"
        );
        assert_eq!(PrimaryKey::Assigned.field().column_definition(), "id");
    }
}
