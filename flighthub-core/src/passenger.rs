use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{violations, FieldViolation};

/// Everything the passenger form collects beyond name, e-mail and phone.
///
/// Validated once when it crosses the HTTP boundary and stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub passport: Option<Passport>,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone number is required"))]
    pub phone: String,
    #[validate(nested)]
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub frequent_flyer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Passport {
    #[validate(length(min = 5, max = 20, message = "Passport number must be 5-20 characters"))]
    pub number: String,
    pub expiry: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    #[validate(length(min = 1, message = "Emergency contact name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Emergency contact phone is required"))]
    pub phone: String,
}

impl PassengerDetails {
    /// Only the required fields; everything optional left unset.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            title: None,
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            date_of_birth: None,
            nationality: None,
            passport: None,
            email: email.into(),
            phone: phone.into(),
            emergency_contact: None,
            special_requests: None,
            frequent_flyer: None,
        }
    }

    /// "First Last", the form the booking records carry.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Field rules plus the checks that span more than one field.
    pub fn check(&self) -> Result<(), Vec<FieldViolation>> {
        let mut found = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations(&errors),
        };

        if let (Some(born), Some(passport)) = (self.date_of_birth, self.passport.as_ref()) {
            if passport.expiry <= born {
                found.push(FieldViolation::new(
                    "passport.expiry",
                    "Passport expiry must be after the date of birth",
                ));
            }
        }

        if found.is_empty() {
            Ok(())
        } else {
            Err(found)
        }
    }
}
