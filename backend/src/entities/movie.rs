//! Movies

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::actor::ACTOR;
use crate::orm::{
    DatabaseEntity, EntityDescriptor, EntityShapes, FieldDef, FieldKind, Mapper, Patchable,
    SqlValue, Validate, ValidationErrors,
};

pub const RATINGS: &[&str] = &["G", "PG", "PG13", "R", "NC17"];

fn actor() -> &'static EntityDescriptor {
    &ACTOR
}

pub static MOVIE: EntityDescriptor = EntityDescriptor {
    name: "movie",
    table: "movies",
    primary_key: "id",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
        FieldDef::new("title", "title", FieldKind::Text),
        FieldDef::new("inTheaters", "in_theaters", FieldKind::Boolean),
        FieldDef::new("releaseDate", "release_date", FieldKind::Date),
        FieldDef::new("poster", "poster", FieldKind::Text).nullable(),
        FieldDef::new("rating", "rating", FieldKind::Enum(RATINGS)),
        FieldDef::new("price", "price", FieldKind::Real),
        FieldDef::new("director", "director_id", FieldKind::Reference(actor)).nullable(),
    ],
};

const TITLE_MAX: usize = 300;

/// Audience rating, stored as its upper-case code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum MovieRating {
    #[default]
    G,
    Pg,
    Pg13,
    R,
    Nc17,
}

impl MovieRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovieRating::G => "G",
            MovieRating::Pg => "PG",
            MovieRating::Pg13 => "PG13",
            MovieRating::R => "R",
            MovieRating::Nc17 => "NC17",
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    /// Poster URL
    pub poster: Option<String>,
    pub rating: MovieRating,
    pub price: f64,
    pub director_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCreate {
    pub title: String,
    #[serde(default)]
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rating: MovieRating,
    pub price: f64,
    #[serde(default)]
    pub director_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRead {
    pub id: i64,
    pub title: String,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub poster: Option<String>,
    pub rating: MovieRating,
    pub price: f64,
    pub director_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoviePatch {
    pub title: String,
    pub in_theaters: bool,
    pub release_date: NaiveDate,
    pub price: f64,
    pub rating: MovieRating,
}

fn check_price(errors: &mut ValidationErrors, price: f64) {
    if !(price.is_finite() && price >= 0.0) {
        errors.add("price", "The field price must be a non-negative number");
    }
}

impl Validate for MovieCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("title", &self.title, 1, TITLE_MAX);
        check_price(&mut errors, self.price);
        errors.into_result()
    }
}

impl Validate for MoviePatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_length("title", &self.title, 1, TITLE_MAX);
        check_price(&mut errors, self.price);
        errors.into_result()
    }
}

impl DatabaseEntity for Movie {
    fn descriptor() -> &'static EntityDescriptor {
        &MOVIE
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            self.title.clone().into(),
            self.in_theaters.into(),
            self.release_date.into(),
            self.poster.clone().into(),
            self.rating.as_str().into(),
            self.price.into(),
            self.director_id.into(),
        ]
    }
}

impl EntityShapes for Movie {
    type Create = MovieCreate;
    type Read = MovieRead;

    fn from_create(input: MovieCreate, _mapper: &Mapper) -> Self {
        Self {
            id: 0,
            title: input.title,
            in_theaters: input.in_theaters,
            release_date: input.release_date,
            poster: input.poster,
            rating: input.rating,
            price: input.price,
            director_id: input.director_id,
        }
    }

    fn to_read(&self, _mapper: &Mapper) -> MovieRead {
        MovieRead {
            id: self.id,
            title: self.title.clone(),
            in_theaters: self.in_theaters,
            release_date: self.release_date,
            poster: self.poster.clone(),
            rating: self.rating,
            price: self.price,
            director_id: self.director_id,
        }
    }
}

impl Patchable for Movie {
    type Patch = MoviePatch;

    fn to_patch(&self, _mapper: &Mapper) -> MoviePatch {
        MoviePatch {
            title: self.title.clone(),
            in_theaters: self.in_theaters,
            release_date: self.release_date,
            price: self.price,
            rating: self.rating,
        }
    }

    fn merge_patch(&mut self, patch: MoviePatch, _mapper: &Mapper) {
        self.title = patch.title;
        self.in_theaters = patch.in_theaters;
        self.release_date = patch.release_date;
        self.price = patch.price;
        self.rating = patch.rating;
    }
}
