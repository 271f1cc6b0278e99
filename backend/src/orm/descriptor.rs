//! Entity descriptors and dotted property-path resolution
//!
//! Every entity declares a static field table: the names callers use in
//! filter and sort descriptors, the backing column, and the field's kind.
//! Paths such as `director.name` walk `Reference` fields into the target
//! entity's table. Resolution is case-insensitive and never fails loudly:
//! an unknown path is simply `None`.

use thiserror::Error;

/// Declared type of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    Boolean,
    /// ISO-8601 calendar date stored as TEXT (`YYYY-MM-DD`)
    Date,
    /// Closed set of text values, matched case-insensitively
    Enum(&'static [&'static str]),
    /// Foreign key holding another entity's primary key
    Reference(fn() -> &'static EntityDescriptor),
}

impl FieldKind {
    /// Text fields are filtered by substring, everything else by equality.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// SQLite column type (TEXT, INTEGER, REAL)
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldKind::Text | FieldKind::Date | FieldKind::Enum(_) => "TEXT",
            FieldKind::Integer | FieldKind::Boolean | FieldKind::Reference(_) => "INTEGER",
            FieldKind::Real => "REAL",
        }
    }
}

/// One row of an entity's field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Name used in filter/sort paths (matches the transfer shape's JSON name)
    pub name: &'static str,
    /// Column name in the database
    pub column: &'static str,
    pub kind: FieldKind,
    /// Whether the column can be NULL
    pub nullable: bool,
    /// Whether this is the primary key
    pub primary_key: bool,
}

impl FieldDef {
    pub const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            column,
            kind,
            nullable: false,
            primary_key: false,
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    /// Generate the column definition SQL
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.column, self.kind.sql_type());

        if self.primary_key {
            sql.push_str(" PRIMARY KEY AUTOINCREMENT");
        }

        if !self.nullable && !self.primary_key {
            sql.push_str(" NOT NULL");
        }

        if let FieldKind::Reference(target) = self.kind {
            let target = target();
            sql.push_str(&format!(
                " REFERENCES {}({}) ON DELETE {}",
                target.table,
                target.primary_key,
                if self.nullable { "SET NULL" } else { "CASCADE" }
            ));
        }

        sql
    }
}

/// Static metadata about one entity type (table).
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Lower-case type name used in response metadata (e.g. "actor")
    pub name: &'static str,
    /// The SQL table name (e.g. "actors")
    pub table: &'static str,
    /// The primary key column name
    pub primary_key: &'static str,
    pub fields: &'static [FieldDef],
}

impl EntityDescriptor {
    /// Look up a field by its path name, ignoring ASCII case.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// All column names, in declaration order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.column).collect()
    }

    /// Fields written by INSERT/UPDATE (everything but the primary key)
    pub fn writable_fields(&self) -> impl Iterator<Item = &'static FieldDef> {
        self.fields.iter().filter(|f| !f.primary_key)
    }

    /// Build a SELECT for all columns
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            self.column_names().join(", "),
            self.table
        )
    }

    /// Generate CREATE TABLE IF NOT EXISTS SQL
    pub fn create_table_sql(&self) -> String {
        let column_defs: Vec<String> = self.fields.iter().map(FieldDef::to_sql).collect();

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
            self.table,
            column_defs.join(",\n  ")
        )
    }
}

/// A reference walked while resolving a dotted path.
#[derive(Debug, Clone, Copy)]
pub struct Hop {
    /// Foreign-key column on the entity the hop starts from
    pub column: &'static str,
    /// Entity the foreign key points into
    pub target: &'static EntityDescriptor,
}

/// Result of resolving a dotted path against a descriptor.
#[derive(Debug, Clone)]
pub struct FieldPath {
    /// Reference hops, outermost first
    pub hops: Vec<Hop>,
    /// Terminal field
    pub field: &'static FieldDef,
}

impl FieldPath {
    /// Path to a field of the root entity itself
    pub fn direct(field: &'static FieldDef) -> Self {
        Self {
            hops: Vec::new(),
            field,
        }
    }

    /// Declared type of the terminal field
    pub fn kind(&self) -> FieldKind {
        self.field.kind
    }
}

/// Resolve `path` (one or more `.`-separated segments) against `root`.
///
/// Each non-terminal segment must name a `Reference` field; the terminal
/// segment may be any field. Returns `None` when a segment does not exist,
/// is empty, or tries to walk through a scalar.
pub fn resolve_path(root: &'static EntityDescriptor, path: &str) -> Option<FieldPath> {
    let mut current = root;
    let mut hops = Vec::new();
    let mut segments = path.split('.').peekable();

    loop {
        let segment = segments.next()?.trim();
        if segment.is_empty() {
            return None;
        }

        let field = current.field(segment)?;
        if segments.peek().is_none() {
            return Some(FieldPath { hops, field });
        }

        match field.kind {
            FieldKind::Reference(target) => {
                let target = target();
                hops.push(Hop {
                    column: field.column,
                    target,
                });
                current = target;
            }
            _ => return None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("entity '{0}' is already registered")]
    Duplicate(&'static str),
    #[error("entity '{entity}' field '{field}' references unregistered entity '{target}'")]
    UnknownReference {
        entity: &'static str,
        field: &'static str,
        target: &'static str,
    },
    #[error("entity '{0}' has no primary key field")]
    MissingPrimaryKey(&'static str),
}

/// Process-wide, read-only set of entity descriptors.
///
/// Registration order matters: an entity may only reference entities
/// registered before it, which is also the order tables get created in.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: Vec<&'static EntityDescriptor>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: &'static EntityDescriptor) -> Result<(), RegistryError> {
        if self.get(descriptor.name).is_some() {
            return Err(RegistryError::Duplicate(descriptor.name));
        }

        if !descriptor
            .fields
            .iter()
            .any(|f| f.primary_key && f.column == descriptor.primary_key)
        {
            return Err(RegistryError::MissingPrimaryKey(descriptor.name));
        }

        for field in descriptor.fields {
            if let FieldKind::Reference(target) = field.kind {
                let target = target();
                // self-references are allowed
                if target.name != descriptor.name && self.get(target.name).is_none() {
                    return Err(RegistryError::UnknownReference {
                        entity: descriptor.name,
                        field: field.name,
                        target: target.name,
                    });
                }
            }
        }

        self.entities.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&'static EntityDescriptor> {
        self.entities
            .iter()
            .copied()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &'static EntityDescriptor> {
        self.entities.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    static PERSON: EntityDescriptor = EntityDescriptor {
        name: "person",
        table: "people",
        primary_key: "id",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
            FieldDef::new("name", "name", FieldKind::Text),
            FieldDef::new("age", "age", FieldKind::Integer).nullable(),
        ],
    };

    static FILM: EntityDescriptor = EntityDescriptor {
        name: "film",
        table: "films",
        primary_key: "id",
        fields: &[
            FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
            FieldDef::new("title", "title", FieldKind::Text),
            FieldDef::new("director", "director_id", FieldKind::Reference(person)).nullable(),
        ],
    };

    fn person() -> &'static EntityDescriptor {
        &PERSON
    }

    fn film() -> &'static EntityDescriptor {
        &FILM
    }

    #[test]
    fn test_resolve_single_segment() {
        let path = resolve_path(film(), "title").expect("title resolves");
        assert!(path.hops.is_empty());
        assert_eq!(path.field.column, "title");
        assert!(path.kind().is_textual());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let path = resolve_path(film(), "DIRECTOR.Name").expect("nested path resolves");
        assert_eq!(path.hops.len(), 1);
        assert_eq!(path.hops[0].column, "director_id");
        assert_eq!(path.hops[0].target.table, "people");
        assert_eq!(path.field.column, "name");
    }

    #[test]
    fn test_resolve_missing_segments() {
        assert!(resolve_path(film(), "budget").is_none());
        assert!(resolve_path(film(), "director.budget").is_none());
        assert!(resolve_path(film(), "").is_none());
        assert!(resolve_path(film(), "director.").is_none());
        // cannot walk through a scalar
        assert!(resolve_path(film(), "title.length").is_none());
    }

    #[test]
    fn test_terminal_reference_resolves_to_reference_kind() {
        let path = resolve_path(film(), "director").expect("reference field resolves");
        assert_matches!(path.kind(), FieldKind::Reference(_));
    }

    #[test]
    fn test_create_table_sql() {
        let sql = FILM.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS films"));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("title TEXT NOT NULL"));
        assert!(sql.contains("director_id INTEGER REFERENCES people(id) ON DELETE SET NULL"));
    }

    #[test]
    fn test_registry_enforces_reference_order() {
        let mut registry = EntityRegistry::new();
        assert_eq!(
            registry.register(film()),
            Err(RegistryError::UnknownReference {
                entity: "film",
                field: "director",
                target: "person",
            })
        );

        registry.register(person()).expect("person registers");
        registry.register(film()).expect("film registers after person");
        assert_eq!(registry.register(person()), Err(RegistryError::Duplicate("person")));

        let tables: Vec<_> = registry.iter().map(|d| d.table).collect();
        assert_eq!(tables, vec!["people", "films"]);
        assert!(registry.get("FILM").is_some());
    }
}
