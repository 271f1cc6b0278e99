//! Cinema venues

use serde::{Deserialize, Serialize};

use crate::geo::{GeometryFactory, Point};
use crate::orm::{
    DatabaseEntity, EntityDescriptor, EntityShapes, FieldDef, FieldKind, Mapper, SqlValue,
    Validate, ValidationErrors,
};

pub static VENUE: EntityDescriptor = EntityDescriptor {
    name: "venue",
    table: "venues",
    primary_key: "id",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
        FieldDef::new("name", "name", FieldKind::Text),
        FieldDef::new("longitude", "longitude", FieldKind::Real),
        FieldDef::new("latitude", "latitude", FieldKind::Real),
    ],
};

/// Storage row; the location is kept as two WGS 84 columns.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl Venue {
    pub fn point(&self, geometry: &GeometryFactory) -> Point {
        geometry.create_point(self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueCreate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueRead {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Validate for VenueCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("name", &self.name, 1, 120);
        errors.check_range("latitude", self.latitude, -90.0, 90.0);
        errors.check_range("longitude", self.longitude, -180.0, 180.0);
        errors.into_result()
    }
}

impl DatabaseEntity for Venue {
    fn descriptor() -> &'static EntityDescriptor {
        &VENUE
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
            self.longitude.into(),
            self.latitude.into(),
        ]
    }
}

impl EntityShapes for Venue {
    type Create = VenueCreate;
    type Read = VenueRead;

    fn from_create(input: VenueCreate, mapper: &Mapper) -> Self {
        let location = mapper.geometry().create_point(input.longitude, input.latitude);
        Self {
            id: 0,
            name: input.name,
            longitude: location.longitude(),
            latitude: location.latitude(),
        }
    }

    fn to_read(&self, mapper: &Mapper) -> VenueRead {
        let location = self.point(mapper.geometry());
        VenueRead {
            id: self.id,
            name: self.name.clone(),
            latitude: location.latitude(),
            longitude: location.longitude(),
        }
    }
}
