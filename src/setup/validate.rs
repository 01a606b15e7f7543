//! Field validation - one atomic pass, every problem surfaced at once
//!
//! The three checks are independent and never short-circuit, so the user
//! sees all outstanding problems in a single render.

use std::collections::BTreeMap;

use thiserror::Error;

use super::SetupFields;
use crate::models::ModelCatalog;

/// The fields the setup form collects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    ApiKey,
    Model,
    TermsAccepted,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::ApiKey => "API Key",
            Field::Model => "Model",
            Field::TermsAccepted => "Terms",
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or not a valid choice
    #[error("{message}")]
    RequiredField { message: &'static str },

    /// A mandatory acknowledgement was not given
    #[error("{message}")]
    RequiredAcknowledgement { message: &'static str },
}

pub type ValidationErrors = BTreeMap<Field, ValidationError>;

/// Check every field against its rule. Returns an empty map when the form
/// is submittable.
pub fn validate(fields: &SetupFields, catalog: &ModelCatalog) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if fields.api_key.trim().is_empty() {
        errors.insert(
            Field::ApiKey,
            ValidationError::RequiredField {
                message: "API Key is required",
            },
        );
    }

    if !catalog.is_known(&fields.model) {
        errors.insert(
            Field::Model,
            ValidationError::RequiredField {
                message: "Please select a model",
            },
        );
    }

    if !fields.terms_accepted {
        errors.insert(
            Field::TermsAccepted,
            ValidationError::RequiredAcknowledgement {
                message: "You must accept the terms and conditions",
            },
        );
    }

    errors
}
