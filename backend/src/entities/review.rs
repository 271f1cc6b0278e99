//! Movie reviews
//!
//! A review belongs to one movie and one author. The author id comes from
//! the caller identity, never from the request body.

use serde::{Deserialize, Serialize};

use super::movie::MOVIE;
use crate::orm::{
    DatabaseEntity, EntityDescriptor, EntityShapes, FieldDef, FieldKind, FieldPath, Mapper,
    Predicate, SqlValue, Validate, ValidationErrors,
};

fn movie() -> &'static EntityDescriptor {
    &MOVIE
}

const MOVIE_FIELD: FieldDef = FieldDef::new("movie", "movie_id", FieldKind::Reference(movie));
const USER_FIELD: FieldDef = FieldDef::new("userId", "user_id", FieldKind::Text);

pub static REVIEW: EntityDescriptor = EntityDescriptor {
    name: "review",
    table: "reviews",
    primary_key: "id",
    fields: &[
        FieldDef::new("id", "id", FieldKind::Integer).primary_key(),
        FieldDef::new("comment", "comment", FieldKind::Text),
        FieldDef::new("score", "score", FieldKind::Integer),
        MOVIE_FIELD,
        USER_FIELD,
    ],
};

/// Reviews of one movie
pub fn of_movie(movie_id: i64) -> Predicate {
    Predicate::Eq(FieldPath::direct(&MOVIE_FIELD), SqlValue::Int(movie_id))
}

/// Reviews written by one user (exact match)
pub fn by_author(user_id: &str) -> Predicate {
    Predicate::Eq(FieldPath::direct(&USER_FIELD), SqlValue::Text(user_id.to_string()))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub comment: String,
    pub score: i64,
    pub movie_id: i64,
    pub user_id: String,
}

impl Review {
    /// Attach the owning movie and author to a freshly mapped row.
    pub fn owned_by(mut self, movie_id: i64, user_id: impl Into<String>) -> Self {
        self.movie_id = movie_id;
        self.user_id = user_id.into();
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewCreate {
    #[serde(default)]
    pub comment: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRead {
    pub id: i64,
    pub comment: String,
    pub score: i64,
    pub movie_id: i64,
    pub user_id: String,
}

impl Validate for ReviewCreate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_range("score", self.score, 1, 5);
        errors.check_max_length("comment", Some(&self.comment), 2000);
        errors.into_result()
    }
}

impl DatabaseEntity for Review {
    fn descriptor() -> &'static EntityDescriptor {
        &REVIEW
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn column_values(&self) -> Vec<SqlValue> {
        vec![
            self.comment.clone().into(),
            self.score.into(),
            self.movie_id.into(),
            self.user_id.clone().into(),
        ]
    }
}

impl EntityShapes for Review {
    type Create = ReviewCreate;
    type Read = ReviewRead;

    fn from_create(input: ReviewCreate, _mapper: &Mapper) -> Self {
        Self {
            id: 0,
            comment: input.comment,
            score: input.score,
            movie_id: 0,
            user_id: String::new(),
        }
    }

    fn to_read(&self, _mapper: &Mapper) -> ReviewRead {
        ReviewRead {
            id: self.id,
            comment: self.comment.clone(),
            score: self.score,
            movie_id: self.movie_id,
            user_id: self.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::resolve_path;

    #[test]
    fn test_score_bounds() {
        let ok = ReviewCreate {
            comment: "Great".into(),
            score: 5,
        };
        assert!(ok.validate().is_ok());

        let bad = ReviewCreate {
            comment: String::new(),
            score: 0,
        };
        assert!(bad.validate().unwrap_err().get("score").is_some());
    }

    #[test]
    fn test_scoping_predicates() {
        let fragment = of_movie(4).and(by_author("u-1")).to_sql().unwrap();
        assert_eq!(fragment.sql, "(movie_id = ?) AND (user_id = ?)");
        assert_eq!(
            fragment.values,
            vec![SqlValue::Int(4), SqlValue::Text("u-1".into())]
        );
    }

    #[test]
    fn test_movie_title_path() {
        let path = resolve_path(&REVIEW, "movie.title").unwrap();
        assert_eq!(path.hops[0].column, "movie_id");
        assert!(path.kind().is_textual());
    }
}
