//! Catalog entities
//!
//! One module per entity: the static descriptor, the storage row and the
//! transfer shapes with their mapping and validation.

pub mod actor;
pub mod genre;
pub mod movie;
pub mod review;
pub mod venue;

pub use actor::{Actor, ActorCreate, ActorPatch, ActorRead};
pub use genre::{Genre, GenreCreate, GenreRead};
pub use movie::{Movie, MovieCreate, MoviePatch, MovieRating, MovieRead};
pub use review::{Review, ReviewCreate, ReviewRead};
pub use venue::{Venue, VenueCreate, VenueRead};

use crate::orm::{DatabaseEntity, EntityRegistry, RegistryError};

/// Every catalog entity, referenced entities first.
pub fn registry() -> Result<EntityRegistry, RegistryError> {
    let mut registry = EntityRegistry::new();
    registry.register(Genre::descriptor())?;
    registry.register(Actor::descriptor())?;
    registry.register(Movie::descriptor())?;
    registry.register(Venue::descriptor())?;
    registry.register(Review::descriptor())?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order() {
        let registry = registry().expect("catalog registry is consistent");
        let tables: Vec<_> = registry.iter().map(|d| d.table).collect();
        assert_eq!(tables, vec!["genres", "actors", "movies", "venues", "reviews"]);
    }
}
