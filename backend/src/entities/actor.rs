//! Actors (also referenced as movie directors)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::orm::{
    DatabaseEntity, EntityDescriptor, EntityShapes, FieldDef, FieldKind, Mapper, Patchable,
    SqlValue, Validate, ValidationErrors,
};

pub static ACTOR: EntityDescriptor = EntityDescriptor {
    name: "actor",
    table: "actors",
    primary_key: "id",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("biography", "biography", FieldKind::Text).nullable(),
        FieldDef::new("birthDate", "birth_date", FieldKind::Date),
        FieldDef::new("photo", "photo", FieldKind::Text).nullable(),
    ],
};

const NAME_MAX: usize = 120;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
    /// Photo URL
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorCreate {
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRead {
    pub id: i64,
    pub name: String,
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
    pub photo: Option<String>,
}

/// Fields a JSON Patch may touch. The photo is only replaced through PUT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActorPatch {
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    pub birth_date: NaiveDate,
}

impl Validate for ActorCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, 1, NAME_MAX);
        errors.into_result()
    }
}

impl Validate for ActorPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, 1, NAME_MAX);
        errors.into_result()
    }
}

impl DatabaseEntity for Actor {
    fn descriptor() -> &'static EntityDescriptor {
        &ACTOR
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            self.name.clone().into(),
            self.biography.clone().into(),
            self.birth_date.into(),
            self.photo.clone().into(),
        ]
    }
}

impl EntityShapes for Actor {
    type Create = ActorCreate;
    type Read = ActorRead;

    fn from_create(input: ActorCreate, _mapper: &Mapper) -> Self {
        Self {
            id: 0,
            name: input.name,
            biography: input.biography,
            birth_date: input.birth_date,
            photo: input.photo,
        }
    }

    fn to_read(&self, _mapper: &Mapper) -> ActorRead {
        ActorRead {
            id: self.id,
            name: self.name.clone(),
            biography: self.biography.clone(),
            birth_date: self.birth_date,
            photo: self.photo.clone(),
        }
    }
}

impl Patchable for Actor {
    type Patch = ActorPatch;

    fn to_patch(&self, _mapper: &Mapper) -> ActorPatch {
        ActorPatch {
            name: self.name.clone(),
            biography: self.biography.clone(),
            birth_date: self.birth_date,
        }
    }

    fn merge_patch(&mut self, patch: ActorPatch, _mapper: &Mapper) {
        self.name = patch.name;
        self.biography = patch.biography;
        self.birth_date = patch.birth_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Actor {
        Actor {
            id: 3,
            name: "Ricardo Darín".into(),
            biography: None,
            birth_date: NaiveDate::from_ymd_opt(1957, 1, 16).unwrap(),
            photo: Some("https://img.example/darin.jpg".into()),
        }
    }

    #[test]
    fn test_read_shape_is_camel_case() {
        let read = sample().to_read(&Mapper::default());
        let json = serde_json::to_value(&read).unwrap();
        assert_eq!(json["birthDate"], "1957-01-16");
        assert_eq!(json["photo"], "https://img.example/darin.jpg");
    }

    #[test]
    fn test_merge_patch_keeps_photo() {
        let mapper = Mapper::default();
        let mut actor = sample();
        let mut patch = actor.to_patch(&mapper);
        patch.name = "R. Darín".into();
        actor.merge_patch(patch, &mapper);
        assert_eq!(actor.name, "R. Darín");
        assert_eq!(actor.photo.as_deref(), Some("https://img.example/darin.jpg"));
        assert_eq!(actor.id, 3);
    }

    #[test]
    fn test_column_values_follow_descriptor() {
        let values = sample().column_values();
        assert_eq!(values.len(), ACTOR.writable_fields().count());
        assert_eq!(values[2], SqlValue::Text("1957-01-16".into()));
        assert_eq!(values[1], SqlValue::Null);
    }
}
