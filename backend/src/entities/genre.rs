//! Movie genres

use serde::{Deserialize, Serialize};

use crate::orm::{
    DatabaseEntity, EntityDescriptor, EntityShapes, FieldDef, FieldKind, Mapper, SqlValue,
    Validate, ValidationErrors,
};

pub static GENRE: EntityDescriptor = EntityDescriptor {
    name: "genre",
    table: "genres",
    primary_key: "id",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
        FieldDef::new("name", "name", FieldKind::Text),
    ],
};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreCreate {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRead {
    pub id: i64,
    pub name: String,
}

impl Validate for GenreCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, 1, 40);
        errors.into_result()
    }
}

impl DatabaseEntity for Genre {
    fn descriptor() -> &'static EntityDescriptor {
        &GENRE
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![self.name.clone().into()]
    }
}

impl EntityShapes for Genre {
    type Create = GenreCreate;
    type Read = GenreRead;

    fn from_create(input: GenreCreate, _mapper: &Mapper) -> Self {
        Self {
            id: 0,
            name: input.name,
        }
    }

    fn to_read(&self, _mapper: &Mapper) -> GenreRead {
        GenreRead {
            id: self.id,
            name: self.name.clone(),
        }
    }
}
