//! Reference data shared by every recipe: tags and ingredients.

use serde::Deserialize;

use super::{IngredientId, TagId};

/// Maximum length for tag and ingredient names.
pub const CATALOGUE_NAME_MAX: usize = 150;

/// Validation failures for catalogue entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogueValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("slug may only contain letters, digits, hyphens or underscores")]
    InvalidSlug,
}

fn bounded(field: &'static str, raw: &str) -> Result<String, CatalogueValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CatalogueValidationError::Empty { field });
    }
    if trimmed.chars().count() > CATALOGUE_NAME_MAX {
        return Err(CatalogueValidationError::TooLong {
            field,
            max: CATALOGUE_NAME_MAX,
        });
    }
    Ok(trimmed.to_owned())
}

/// Recipe tag such as "Breakfast".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub slug: String,
}

/// Ingredient with its unit of measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient awaiting insertion by the catalogue loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawIngredient")]
pub struct NewIngredient {
    name: String,
    measurement_unit: String,
}

#[derive(Deserialize)]
struct RawIngredient {
    name: String,
    measurement_unit: String,
}

impl TryFrom<RawIngredient> for NewIngredient {
    type Error = CatalogueValidationError;

    fn try_from(raw: RawIngredient) -> Result<Self, Self::Error> {
        Self::new(&raw.name, &raw.measurement_unit)
    }
}

impl NewIngredient {
    /// Validate an ingredient name and unit.
    pub fn new(name: &str, measurement_unit: &str) -> Result<Self, CatalogueValidationError> {
        Ok(Self {
            name: bounded("name", name)?,
            measurement_unit: bounded("measurement_unit", measurement_unit)?,
        })
    }

    /// Ingredient name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit of measure.
    #[must_use]
    pub fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Tag awaiting insertion by the catalogue loader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTag")]
pub struct NewTag {
    name: String,
    slug: String,
}

#[derive(Deserialize)]
struct RawTag {
    name: String,
    slug: String,
}

impl TryFrom<RawTag> for NewTag {
    type Error = CatalogueValidationError;

    fn try_from(raw: RawTag) -> Result<Self, Self::Error> {
        Self::new(&raw.name, &raw.slug)
    }
}

impl NewTag {
    /// Validate a tag name and slug.
    pub fn new(name: &str, slug: &str) -> Result<Self, CatalogueValidationError> {
        let slug = bounded("slug", slug)?;
        if !slug
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CatalogueValidationError::InvalidSlug);
        }
        Ok(Self {
            name: bounded("name", name)?,
            slug,
        })
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL-safe slug used by recipe filters.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn ingredient_fields_are_trimmed() {
        let ingredient = NewIngredient::new("  flour ", "g").expect("valid ingredient");
        assert_eq!(ingredient.name(), "flour");
    }

    #[rstest]
    #[case("", "g", CatalogueValidationError::Empty { field: "name" })]
    #[case("flour", " ", CatalogueValidationError::Empty { field: "measurement_unit" })]
    fn ingredient_requires_both_fields(
        #[case] name: &str,
        #[case] unit: &str,
        #[case] expected: CatalogueValidationError,
    ) {
        assert_eq!(NewIngredient::new(name, unit), Err(expected));
    }

    #[test]
    fn deserialising_validates_ingredients() {
        let parsed: Result<Vec<NewIngredient>, _> =
            serde_json::from_str(r#"[{"name": "", "measurement_unit": "g"}]"#);
        assert!(parsed.is_err());
    }

    #[rstest]
    #[case("breakfast", true)]
    #[case("late-night_snack", true)]
    #[case("two words", false)]
    fn validates_tag_slugs(#[case] slug: &str, #[case] valid: bool) {
        assert_eq!(NewTag::new("Tag", slug).is_ok(), valid);
    }
}
