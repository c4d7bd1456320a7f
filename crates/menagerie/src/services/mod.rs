//! Business-logic services bound to each operation.
//!
//! Every service currently answers with an empty mapping. Operations whose
//! response contract has required fields therefore fail response
//! validation until a real implementation is bound.

mod books;
mod pets;

pub use books::{GetBookById, GetBooks};
pub use pets::{CreatePet, GetAllPets, GetPetById};
