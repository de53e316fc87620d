use crate::storable::Storable;

/// A mapped column: its name plus an optional SQL column declaration.
///
/// The declaration is only used by [`create_table`](crate::mapper::create_table); without one
/// the column is created bare and takes `SQLite`'s dynamic typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    sql_declaration: Option<String>,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_declaration: None,
        }
    }

    /// A field with a column declaration such as `"TEXT NOT NULL"`.
    #[must_use]
    pub fn declared(name: impl Into<String>, sql_declaration: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_declaration: Some(sql_declaration.into()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn sql_declaration(&self) -> Option<&str> {
        self.sql_declaration.as_deref()
    }

    /// Column definition as it appears in `CREATE TABLE`.
    #[must_use]
    pub fn column_definition(&self) -> String {
        match self.sql_declaration() {
            Some(declaration) if !declaration.trim().is_empty() => {
                format!("{} {declaration}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

/// Ordered field collection used while declaring a storable type.
///
/// Adding a field whose name is already present is ignored, so when several base types are
/// composed the first occurrence of a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `field` unless a field with the same name is already present.
    pub fn add(&mut self, field: Field) -> &mut Self {
        if !self.contains(field.name()) {
            self.fields.push(field);
        }
        self
    }

    /// Add an undeclared column.
    pub fn field(&mut self, name: &str) -> &mut Self {
        self.add(Field::new(name))
    }

    /// Add a column with a SQL declaration.
    pub fn declared(&mut self, name: &str, sql_declaration: &str) -> &mut Self {
        self.add(Field::declared(name, sql_declaration))
    }

    /// Compose in every field of a base storable type, its `id` included.
    pub fn extend_from<T: Storable>(&mut self) -> &mut Self {
        for field in T::fields() {
            self.add(field);
        }
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }
}

impl IntoIterator for FieldSet {
    type Item = Field;
    type IntoIter = std::vec::IntoIter<Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
