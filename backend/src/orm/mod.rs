//! Generic entity access layer
//!
//! Entities describe themselves with a static [`EntityDescriptor`] and
//! implement [`DatabaseEntity`] for their storage row plus [`EntityShapes`]
//! (and optionally [`Patchable`]) for their transfer shapes. Everything else
//! is generic:
//! - dotted property paths resolved against descriptors (`director.name`)
//! - filter descriptors compiled into typed [`Predicate`]s
//! - sort / range / page slicing in [`EntityQuery`]
//! - `Content-Range` and `totalPages` metadata through a [`MetadataSink`]
//! - list / get / create / replace / patch / delete in [`Crud`]
//!
//! ```rust,ignore
//! use crate::orm::{Crud, ListParams, Predicate};
//!
//! let actors = Crud::<Actor>::new(&state.pool, &state.mapper);
//! let list = actors
//!     .list_filtered(
//!         Predicate::All,
//!         &params.filter(),
//!         params.sort().as_ref(),
//!         params.range().as_ref(),
//!         &mut headers,
//!     )
//!     .await?;
//! ```

mod builder;
pub mod descriptor;
mod mapper;
pub mod pagination;
pub mod params;
pub mod patch;
pub mod predicate;
mod repository;
mod traits;
mod validation;

pub use builder::*;
pub use descriptor::{EntityDescriptor, EntityRegistry, FieldDef, FieldKind, FieldPath, RegistryError, resolve_path};
pub use mapper::{EntityShapes, Mapper, Patchable};
pub use pagination::{MetadataSink, ResponseMetadata};
pub use params::{FilterDescriptor, ListParams, PageDescriptor, PageParams, RangeDescriptor, SortDescriptor};
pub use patch::{PatchDocument, PatchError, PatchOperation};
pub use predicate::{Predicate, SqlFragment, build_predicate};
pub use repository::*;
pub use traits::{DatabaseEntity, OrderDirection, SqlValue};
pub use validation::{Validate, ValidationErrors};
