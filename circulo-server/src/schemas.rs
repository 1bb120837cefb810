use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::serialized::FormError;

/// Book suggestion form fields, capped to the column widths
#[derive(Debug, Default, Validate, Deserialize)]
pub struct SuggestionSchema {
    #[validate(length(max = 200, message = "Máximo 200 caracteres"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(max = 200, message = "Máximo 200 caracteres"))]
    #[serde(default)]
    pub author: String,
    #[validate(length(max = 100, message = "Máximo 100 caracteres"))]
    #[serde(default)]
    pub suggested_by_name: String,
    #[validate(length(max = 254, message = "Máximo 254 caracteres"))]
    #[serde(default)]
    pub suggested_by_email: String,
    #[serde(default)]
    pub reason: String,
}

/// Membership form fields. Selected genres arrive as a comma separated id
/// list, the lowest common denominator for multi-selects over urlencoded
/// bodies.
#[derive(Debug, Default, Validate, Deserialize)]
pub struct JoinSchema {
    #[validate(length(max = 100, message = "Máximo 100 caracteres"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 254, message = "Máximo 254 caracteres"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(max = 20, message = "Máximo 20 caracteres"))]
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub favorite_genres: String,
}

impl JoinSchema {
    /// Ids that do not parse are dropped rather than failing the submission
    pub fn favorite_genre_ids(&self) -> Vec<i64> {
        self.favorite_genres
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect()
    }
}

#[derive(Debug, Default, Validate, Deserialize)]
pub struct ContactSchema {
    #[validate(length(max = 100, message = "Máximo 100 caracteres"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 254, message = "Máximo 254 caracteres"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(max = 200, message = "Máximo 200 caracteres"))]
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// The newsletter endpoint is deliberately lax: a missing email is reported
/// as a structured failure, never a rejected request
#[derive(Debug, Default, Deserialize)]
pub struct NewsletterSchema {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LibraryQuery {
    pub genre: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
}

/// Flattens [ValidationErrors] into the field messages templates expect
pub fn schema_errors(errors: &ValidationErrors) -> Vec<FormError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, messages)| {
            messages.iter().map(move |e| FormError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_genre_id_parsing_is_lenient() {
        let schema = JoinSchema {
            favorite_genres: "1, 2,x,, 7".to_string(),
            ..Default::default()
        };

        assert_eq!(schema.favorite_genre_ids(), vec![1, 2, 7]);
    }

    #[test]
    fn test_length_caps_are_reported_per_field() {
        let schema = SuggestionSchema {
            title: "x".repeat(300),
            ..Default::default()
        };

        let errors = schema.validate().unwrap_err();
        let flattened = schema_errors(&errors);

        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].field, "title");
    }
}
