//! Schemas shared between contracts.

use menagerie_core::{Kind, Schema, SchemaError};

/// A pet owner.
pub fn owner() -> Result<Schema, SchemaError> {
    Schema::builder("Owner")
        .optional("age", Kind::Integer)
        .optional("id", Kind::String)
        .optional("name", Kind::String)
        .build()
}

/// A pet, as returned by `getPetById`.
pub fn pet() -> Result<Schema, SchemaError> {
    Schema::builder("Pet")
        .optional("id", Kind::Integer)
        .required("name", Kind::String)
        .optional("nicknames", Kind::array(Kind::String))
        .optional("owners", Kind::array(Kind::object(owner()?)))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pet_shape() {
        let pet = pet().unwrap();
        assert_eq!(pet.required_fields().collect::<Vec<_>>(), vec!["name"]);
        let owners = pet.field("owners").unwrap();
        assert_eq!(owners.kind().name(), "array");
    }
}
