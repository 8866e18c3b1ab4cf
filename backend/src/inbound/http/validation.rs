//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, MessageBody, UserAddress};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidAddress,
    InvalidMessageBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidAddress => "invalid_address",
            ErrorCode::InvalidMessageBody => "invalid_message_body",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(&raw, field)).transpose()
}

pub(crate) fn parse_address(value: Option<String>, field: FieldName) -> Result<UserAddress, Error> {
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    UserAddress::new(&raw).map_err(|err| {
        ValidationError::new(field.as_str(), format!("{}: {err}", field.as_str()))
            .with_value(ErrorCode::InvalidAddress, raw.as_str())
    })
}

pub(crate) fn parse_body(value: String, field: FieldName) -> Result<MessageBody, Error> {
    MessageBody::new(value).map_err(|err| {
        ValidationError::new(field.as_str(), format!("{}: {err}", field.as_str()))
            .with_code(ErrorCode::InvalidMessageBody)
    })
}

pub(crate) fn parse_optional_body(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<MessageBody>, Error> {
    value.map(|raw| parse_body(raw, field)).transpose()
}
