//! Request and response contracts for every operation.
//!
//! | Operation | Request | Response |
//! |---|---|---|
//! | `getBooks` | empty | `books[]{author?, title?}` |
//! | `getBookById` | empty | `author`, `avatar?`, `reviews[]`, `title` |
//! | `getAllPets` | `page`, `q?` | `age?`, `name?` |
//! | `createPet` | `age?`, `name?` | `age?`, `name?` |
//! | `getPetById` | `pet_id` | [`schemas::pet`] |

use menagerie_core::{Kind, Schema, SchemaError};

use crate::schemas;

/// The request and response schemas of one operation.
#[derive(Debug, Clone)]
pub struct Contract {
    /// Schema the merged request parameters must satisfy.
    pub request: Schema,
    /// Schema the service value must satisfy.
    pub response: Schema,
}

impl Contract {
    /// `GET /books`
    pub fn get_books() -> Result<Self, SchemaError> {
        let book = Schema::builder("Book")
            .optional("author", Kind::String)
            .optional("title", Kind::String)
            .build()?;

        Ok(Self {
            request: Schema::empty("GetBooksRequest"),
            response: Schema::builder("GetBooksResponse")
                .optional("books", Kind::array(Kind::object(book)))
                .build()?,
        })
    }

    /// `GET /books/:bookId`
    pub fn get_book_by_id() -> Result<Self, SchemaError> {
        let avatar = Schema::builder("Avatar")
            .optional("id", Kind::Integer)
            .optional("profile_image_url", Kind::String)
            .build()?;
        let user = Schema::builder("ReviewUser")
            .optional("id", Kind::String)
            .optional("name", Kind::String)
            .build()?;
        let review = Schema::builder("Review")
            .optional("rating", Kind::Integer)
            .required("text", Kind::String)
            .required("user", Kind::object(user))
            .build()?;

        Ok(Self {
            request: Schema::empty("GetBookByIdRequest"),
            response: Schema::builder("GetBookByIdResponse")
                .required("author", Kind::String)
                .optional("avatar", Kind::object(avatar))
                .required("reviews", Kind::array(Kind::object(review)))
                .required("title", Kind::String)
                .build()?,
        })
    }

    /// `GET /pets`
    pub fn get_all_pets() -> Result<Self, SchemaError> {
        Ok(Self {
            request: Schema::builder("GetAllPetsRequest")
                .required("page", Kind::Integer)
                .optional("q", Kind::String)
                .build()?,
            response: pet_summary("GetAllPetsResponse")?,
        })
    }

    /// `POST /pets`
    pub fn create_pet() -> Result<Self, SchemaError> {
        Ok(Self {
            request: pet_summary("CreatePetRequest")?,
            response: pet_summary("CreatePetResponse")?,
        })
    }

    /// `GET /pets/:petId`
    pub fn get_pet_by_id() -> Result<Self, SchemaError> {
        Ok(Self {
            request: Schema::builder("GetPetByIdRequest")
                .required("pet_id", Kind::Integer)
                .build()?,
            response: schemas::pet()?,
        })
    }
}

fn pet_summary(name: &str) -> Result<Schema, SchemaError> {
    Schema::builder(name)
        .optional("age", Kind::Integer)
        .optional("name", Kind::String)
        .build()
}
