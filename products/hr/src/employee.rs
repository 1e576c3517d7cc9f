use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Canonical date layout shared by both employee date fields.
pub const FORM_DATE_FORMAT: &str = "%d/%m/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single employee as captured by the intake form.
///
/// Every attribute is kept as the raw string the form produced. Nothing is
/// trimmed or validated; empty strings are legal everywhere.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub start_date: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub department: String,
}

impl Employee {
    pub fn get(&self, field: EmployeeField) -> &str {
        match field {
            EmployeeField::FirstName => &self.first_name,
            EmployeeField::LastName => &self.last_name,
            EmployeeField::DateOfBirth => &self.date_of_birth,
            EmployeeField::StartDate => &self.start_date,
            EmployeeField::Street => &self.street,
            EmployeeField::City => &self.city,
            EmployeeField::State => &self.state,
            EmployeeField::ZipCode => &self.zip_code,
            EmployeeField::Department => &self.department,
        }
    }

    pub(crate) fn slot_mut(&mut self, field: EmployeeField) -> &mut String {
        match field {
            EmployeeField::FirstName => &mut self.first_name,
            EmployeeField::LastName => &mut self.last_name,
            EmployeeField::DateOfBirth => &mut self.date_of_birth,
            EmployeeField::StartDate => &mut self.start_date,
            EmployeeField::Street => &mut self.street,
            EmployeeField::City => &mut self.city,
            EmployeeField::State => &mut self.state,
            EmployeeField::ZipCode => &mut self.zip_code,
            EmployeeField::Department => &mut self.department,
        }
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, _) => self.last_name.clone(),
        }
    }

    pub fn date_of_birth_parsed(&self) -> Option<NaiveDate> {
        parse_form_date(&self.date_of_birth)
    }

    pub fn start_date_parsed(&self) -> Option<NaiveDate> {
        parse_form_date(&self.start_date)
    }
}

/// Interpret a stored date string. Accepts `dd/mm/yyyy` first, then ISO 8601.
pub fn parse_form_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, FORM_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT))
        .ok()
}

/// Render a typed date in the canonical `dd/mm/yyyy` form.
pub fn format_form_date(date: NaiveDate) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}

/// The nine named employee attributes, in form order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeField {
    FirstName,
    LastName,
    DateOfBirth,
    StartDate,
    Street,
    City,
    State,
    ZipCode,
    Department,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 9] = [
        EmployeeField::FirstName,
        EmployeeField::LastName,
        EmployeeField::DateOfBirth,
        EmployeeField::StartDate,
        EmployeeField::Street,
        EmployeeField::City,
        EmployeeField::State,
        EmployeeField::ZipCode,
        EmployeeField::Department,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmployeeField::FirstName => "firstName",
            EmployeeField::LastName => "lastName",
            EmployeeField::DateOfBirth => "dateOfBirth",
            EmployeeField::StartDate => "startDate",
            EmployeeField::Street => "street",
            EmployeeField::City => "city",
            EmployeeField::State => "state",
            EmployeeField::ZipCode => "zipCode",
            EmployeeField::Department => "department",
        }
    }
}

impl fmt::Display for EmployeeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown employee field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for EmployeeField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmployeeField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
