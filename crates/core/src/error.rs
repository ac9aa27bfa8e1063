//! Domain error model.

use std::collections::BTreeMap;

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Expected constraint violations are values, never panics. A rejected edit
/// leaves the configuration exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An edit would violate a rule invariant and was not applied.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Submission-time validation failed on one or more fields.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// An external collaborator (network, storage) failed.
    #[error("collaborator failure: {0}")]
    Collaborator(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not exist in the configuration.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected(reason.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Reason string suitable for a transient UI warning, if this is a rejection.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            DomainError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Field-keyed validation messages.
///
/// Keys are stable field names (`"price"`, `"bundle_items"`, ...). A field may
/// carry more than one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    /// `Ok(value)` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<FieldErrors> for DomainError {
    fn from(value: FieldErrors) -> Self {
        DomainError::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_collect_every_message() {
        let mut errors = FieldErrors::new();
        errors.add("price", "price must be greater than zero");
        errors.add("name_en", "name is required");
        errors.add("price", "price is required");

        assert_eq!(errors.len(), 3);
        assert!(errors.contains("price"));
        assert_eq!(errors.messages("price").len(), 2);
        assert!(errors.messages("sku").is_empty());
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name_en", "price"]);
    }

    #[test]
    fn display_is_field_ordered() {
        let mut errors = FieldErrors::new();
        errors.add("price", "must be positive");
        errors.add("bundle_items", "add at least one item");

        assert_eq!(
            errors.to_string(),
            "bundle_items: add at least one item; price: must be positive"
        );
    }

    #[test]
    fn into_result_is_ok_when_empty() {
        assert_eq!(FieldErrors::new().into_result(5), Ok(5));

        let mut errors = FieldErrors::new();
        errors.add("price", "x");
        assert!(errors.into_result(5).is_err());
    }

    #[test]
    fn rejection_reason_only_for_rejections() {
        assert_eq!(
            DomainError::rejected("last channel").rejection_reason(),
            Some("last channel")
        );
        assert_eq!(DomainError::not_found().rejection_reason(), None);
    }
}
