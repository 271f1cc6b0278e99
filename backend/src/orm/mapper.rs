//! Mapping between storage rows and transfer shapes
//!
//! Each entity declares its creation, read and (optionally) patch shapes by
//! implementing [`EntityShapes`] / [`Patchable`]. Conversions receive the
//! [`Mapper`] so they can reach shared services such as the geometry factory.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::traits::DatabaseEntity;
use super::validation::Validate;
use crate::geo::GeometryFactory;

/// Shared, immutable context for shape conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper {
    geometry: GeometryFactory,
}

impl Mapper {
    pub fn new(geometry: GeometryFactory) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &GeometryFactory {
        &self.geometry
    }
}

/// Transfer shapes of an entity.
pub trait EntityShapes: DatabaseEntity {
    /// Body of create and replace requests
    type Create: DeserializeOwned + Validate + Send;
    /// Response body
    type Read: Serialize + Send;

    /// Build a storage row (id 0) from a creation shape.
    fn from_create(input: Self::Create, mapper: &Mapper) -> Self;

    fn to_read(&self, mapper: &Mapper) -> Self::Read;
}

/// Entities that accept JSON Patch documents.
pub trait Patchable: EntityShapes {
    type Patch: Serialize + DeserializeOwned + Validate + Send;

    fn to_patch(&self, mapper: &Mapper) -> Self::Patch;

    /// Copy every patch field onto the storage row; the id is left alone.
    fn merge_patch(&mut self, patch: Self::Patch, mapper: &Mapper);
}
