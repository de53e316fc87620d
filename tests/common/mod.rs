#![allow(dead_code)]

use sqlite_mapper::prelude::*;

pub const TEST_UUID: &str = "00000000-0000-0000-0000-000000000000";

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct A: Autoincrement {
        pub a: String,
    }
}

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct B: Autoincrement {
        pub b: String,
    }
}

/// Record composed of the fields of `A` and `B` plus its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AB {
    pub id: Option<Id>,
    pub a: Option<String>,
    pub b: Option<String>,
    pub x: Option<String>,
}

impl Storable for AB {
    const PRIMARY_KEY: PrimaryKey = PrimaryKey::Autoincrement;

    fn declare_fields(fields: &mut FieldSet) {
        fields.extend_from::<A>().extend_from::<B>().field("x");
    }

    fn id(&self) -> Option<&Id> {
        self.id.as_ref()
    }

    fn id_mut(&mut self) -> &mut Option<Id> {
        &mut self.id
    }

    fn field_value(&self, field: &str) -> Option<RowValues> {
        let value = match field {
            "a" => self.a.clone(),
            "b" => self.b.clone(),
            "x" => self.x.clone(),
            _ => return None,
        };
        Some(RowValues::from(value))
    }

    fn set_field_value(&mut self, field: &str, value: RowValues) -> Result<(), SqlMapperError> {
        let slot = match field {
            "a" => &mut self.a,
            "b" => &mut self.b,
            "x" => &mut self.x,
            _ => {
                return Err(SqlMapperError::UnknownField {
                    type_name: Self::type_name(),
                    field: field.to_string(),
                });
            }
        };
        *slot = FromRowValues::from_row_values(value)?;
        Ok(())
    }
}

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct F: Uuid1 {
        pub future: String,
    }
}

pub const SEED: &str = "
CREATE TABLE aa(id INTEGER PRIMARY KEY, a);
INSERT INTO aa(id, a) VALUES (0, 'A() in db at 0');
INSERT INTO aa(id, a) VALUES (1, 'A() in db at 1');

CREATE TABLE b(id INTEGER PRIMARY KEY, b);
INSERT INTO b(id, b) VALUES (2, 'B() in db at 2');

CREATE TABLE x(id INTEGER PRIMARY KEY, a, b, x);
INSERT INTO x(id, a, b, x) VALUES (2, 'A() in db at 2', 'X() in db at 2', 'X');

CREATE TABLE f(id VARCHAR PRIMARY KEY, future);
INSERT INTO f(id, future) VALUES ('00000000-0000-0000-0000-000000000000', '?');
";

/// A registry over a seeded in-memory database with `A`, `B`, `AB` and `F` registered.
pub fn given_a_database() -> Result<Registry, SqlMapperError> {
    let mut registry = Registry::new()?;
    registry.register::<A>()?.table_name("aa");
    registry.register::<B>()?.table_name("b");
    registry.register::<AB>()?.table_name("x");
    registry.register::<F>()?.table_name("f");
    registry.default_database().execute_batch(SEED)?;
    Ok(registry)
}

pub fn new_a(text: &str) -> A {
    A::make(|a| a.a = Some(text.to_string()))
}

pub fn new_b(text: &str) -> B {
    B::make(|b| b.b = Some(text.to_string()))
}

pub fn count<T: Storable>(registry: &Registry) -> Result<usize, SqlMapperError> {
    Ok(mapper::get_all::<T>(registry)?.all()?.len())
}
