//! Employee records
//!
//! [`EmployeeRecord`] is the unit the pipeline moves around. The client builds it from
//! CSV rows (text dictionaries) and the server rebuilds it from the JSON payload; both
//! paths check field presence first and then apply the same validation rules.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RecordError, Result};

// ============================================================================
// Field Constants
// ============================================================================

pub const FIELD_EMPLOYEE_ID: &str = "employee_id";
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_DEPARTMENT: &str = "department";
pub const FIELD_DESIGNATION: &str = "designation";
pub const FIELD_SALARY: &str = "salary";
pub const FIELD_DATE_OF_JOINING: &str = "date_of_joining";

/// Every field a record must carry, in wire order
pub const FIELDS: [&str; 7] = [
    FIELD_EMPLOYEE_ID,
    FIELD_NAME,
    FIELD_EMAIL,
    FIELD_DEPARTMENT,
    FIELD_DESIGNATION,
    FIELD_SALARY,
    FIELD_DATE_OF_JOINING,
];

/// Maximum length of the name column.
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length of the department and designation columns.
pub const MAX_LABEL_LENGTH: usize = 100;

/// Maximum email length (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Salaries are stored as DECIMAL(10,2), so they must stay below 10^8.
pub const MAX_SALARY: f64 = 100_000_000.0;

/// ISO calendar date format used on the wire and in files.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[allow(clippy::expect_used)]
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // literal pattern, cannot fail to compile
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is valid")
});

/// A single employee as transferred and stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique employee number
    pub employee_id: i64,
    pub name: String,
    /// Unique email address
    pub email: String,
    pub department: String,
    pub designation: String,
    pub salary: f64,
    /// Serialized as `YYYY-MM-DD`
    pub date_of_joining: NaiveDate,
}

impl EmployeeRecord {
    /// Build a record from a text dictionary such as a CSV row keyed by header
    ///
    /// Values are trimmed. An absent key is [`RecordError::MissingField`]; a value that
    /// does not parse or validate is [`RecordError::InvalidField`].
    pub fn from_raw(raw: &HashMap<String, String>) -> Result<Self> {
        Self::parse(|field| {
            raw.get(field)
                .map(|value| Cow::Borrowed(value.as_str()))
                .ok_or(RecordError::MissingField(field))
        })
    }

    /// Build a record from one element of a JSON request body
    ///
    /// Numeric fields accept either JSON numbers or numeric strings, so payloads
    /// produced by loosely typed clients are still accepted.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json_kind(value)))?;

        Self::parse(|field| match object.get(field) {
            None => Err(RecordError::MissingField(field)),
            Some(Value::Null) => Err(RecordError::invalid(field, "must not be null")),
            Some(Value::String(s)) => Ok(Cow::Borrowed(s.as_str())),
            Some(Value::Number(n)) => Ok(Cow::Owned(n.to_string())),
            Some(other) => Err(RecordError::invalid(
                field,
                format!("expected a string or number, got {}", json_kind(other)),
            )),
        })
    }

    fn parse<'a, F>(get: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Result<Cow<'a, str>>,
    {
        let employee_id = get(FIELD_EMPLOYEE_ID)?;
        let employee_id = employee_id
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::invalid(FIELD_EMPLOYEE_ID, "must be an integer"))?;

        let salary = get(FIELD_SALARY)?;
        let salary = salary
            .trim()
            .parse::<f64>()
            .map_err(|_| RecordError::invalid(FIELD_SALARY, "must be a number"))?;

        let date_of_joining = get(FIELD_DATE_OF_JOINING)?;
        let date_of_joining = NaiveDate::parse_from_str(date_of_joining.trim(), DATE_FORMAT)
            .map_err(|_| {
                RecordError::invalid(FIELD_DATE_OF_JOINING, "must be a valid YYYY-MM-DD date")
            })?;

        let record = Self {
            employee_id,
            name: get(FIELD_NAME)?.trim().to_string(),
            email: get(FIELD_EMAIL)?.trim().to_string(),
            department: get(FIELD_DEPARTMENT)?.trim().to_string(),
            designation: get(FIELD_DESIGNATION)?.trim().to_string(),
            salary,
            date_of_joining,
        };

        record.validate()?;
        Ok(record)
    }

    /// Check the record invariants
    ///
    /// # Rules
    /// - `employee_id` is positive
    /// - text fields are non-blank and within their column lengths
    /// - `email` looks like `local@domain.tld`
    /// - `salary` is finite, non-negative and fits DECIMAL(10,2)
    pub fn validate(&self) -> Result<()> {
        if self.employee_id <= 0 {
            return Err(RecordError::invalid(FIELD_EMPLOYEE_ID, "must be positive"));
        }

        validate_text(FIELD_NAME, &self.name, MAX_NAME_LENGTH)?;
        validate_text(FIELD_DEPARTMENT, &self.department, MAX_LABEL_LENGTH)?;
        validate_text(FIELD_DESIGNATION, &self.designation, MAX_LABEL_LENGTH)?;
        validate_email(&self.email)?;

        if !self.salary.is_finite() {
            return Err(RecordError::invalid(FIELD_SALARY, "must be a finite number"));
        }
        if self.salary < 0.0 {
            return Err(RecordError::invalid(FIELD_SALARY, "must not be negative"));
        }
        if self.salary >= MAX_SALARY {
            return Err(RecordError::invalid(
                FIELD_SALARY,
                format!("must be below {}", MAX_SALARY),
            ));
        }

        Ok(())
    }
}

/// Validate an email address shape and length
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(RecordError::invalid(FIELD_EMAIL, "must not be empty"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(RecordError::invalid(
            FIELD_EMAIL,
            format!("must not exceed {} characters", MAX_EMAIL_LENGTH),
        ));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(RecordError::invalid(FIELD_EMAIL, "is not a valid email address"));
    }
    Ok(())
}

fn validate_text(field: &'static str, value: &str, max_length: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecordError::invalid(field, "must not be empty"));
    }
    if value.chars().count() > max_length {
        return Err(RecordError::invalid(
            field,
            format!("must not exceed {} characters", max_length),
        ));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
