use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use uuid::Uuid;

use super::account::{MAX_STUDENT_AGE, MIN_STUDENT_AGE, NewAccount, RoleDetails};
use super::email::EmailAddress;
use super::password::Password;
use super::phone::PhoneNumber;
use super::username::Username;

/// A single field-level validation failure. Validation collects every
/// failure instead of stopping at the first one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Raw, unvalidated role-specific registration fields.
#[derive(Debug, Clone)]
pub enum RoleFields {
    Parent {
        residence: String,
    },
    Student {
        age: String,
        school: String,
        coding_experience: String,
        program: String,
        program_schedule: String,
        cohort: String,
        parent_id: Option<Uuid>,
    },
    Teacher {
        course: String,
        residence: String,
    },
    Admin {
        residence: String,
        department: String,
    },
}

/// Raw registration input, as submitted by a form. [`validate`] turns it
/// into a [`NewAccount`] or the full list of field errors.
///
/// [`validate`]: RegistrationRequest::validate
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: Secret<String>,
    pub confirm_password: Secret<String>,
    pub role_fields: RoleFields,
}

impl RegistrationRequest {
    pub fn validate(self) -> Result<NewAccount, Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("first_name", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("last_name", "Last name is required"));
        }

        let username = Username::try_from(self.username)
            .map_err(|e| errors.push(FieldError::new("username", e.to_string())))
            .ok();
        let email = EmailAddress::try_from(self.email)
            .map_err(|e| errors.push(FieldError::new("email", e.to_string())))
            .ok();
        let phone_number = PhoneNumber::try_from(self.phone_number)
            .map_err(|e| errors.push(FieldError::new("phone_number", e.to_string())))
            .ok();

        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            errors.push(FieldError::new(
                "confirm_password",
                "Passwords do not match",
            ));
        }
        let password = Password::try_from(self.password)
            .map_err(|e| errors.push(FieldError::new("password", e.to_string())))
            .ok();

        let details = validate_role_fields(self.role_fields, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        // All unwraps guarded by the emptiness check above: each None pushed
        // an error.
        Ok(NewAccount {
            first_name: self.first_name.trim().to_owned(),
            last_name: self.last_name.trim().to_owned(),
            username: username.expect("validated"),
            email: email.expect("validated"),
            phone_number: phone_number.expect("validated"),
            verification_phone: None,
            password: password.expect("validated"),
            details: details.expect("validated"),
        })
    }
}

fn validate_role_fields(
    fields: RoleFields,
    errors: &mut Vec<FieldError>,
) -> Option<RoleDetails> {
    match fields {
        RoleFields::Parent { residence } => {
            let residence = require(residence, "residence", errors)?;
            Some(RoleDetails::Parent { residence })
        }
        RoleFields::Student {
            age,
            school,
            coding_experience,
            program,
            program_schedule,
            cohort,
            parent_id,
        } => {
            let age = match age.trim().parse::<u8>() {
                Ok(age) if (MIN_STUDENT_AGE..=MAX_STUDENT_AGE).contains(&age) => Some(age),
                _ => {
                    errors.push(FieldError::new(
                        "age",
                        format!("Age must be between {MIN_STUDENT_AGE} and {MAX_STUDENT_AGE}"),
                    ));
                    None
                }
            };
            let cohort = match cohort.trim().parse::<i32>() {
                Ok(cohort) if cohort > 0 => Some(cohort),
                _ => {
                    errors.push(FieldError::new("cohort", "Cohort must be a positive number"));
                    None
                }
            };
            let school = require(school, "school", errors);
            let coding_experience = require(coding_experience, "coding_experience", errors);
            let program = require(program, "program", errors);
            let program_schedule = require(program_schedule, "program_schedule", errors);

            Some(RoleDetails::Student {
                age: age?,
                school: school?,
                coding_experience: coding_experience?,
                program: program?,
                program_schedule: program_schedule?,
                cohort: cohort?,
                parent_id,
            })
        }
        RoleFields::Teacher { course, residence } => {
            let course = require(course, "course", errors);
            let residence = require(residence, "residence", errors);
            Some(RoleDetails::Teacher {
                course: course?,
                residence: residence?,
            })
        }
        RoleFields::Admin {
            residence,
            department,
        } => {
            let residence = require(residence, "residence", errors);
            let department = require(department, "department", errors);
            Some(RoleDetails::Admin {
                residence: residence?,
                department: department?,
            })
        }
    }
}

fn require(
    value: String,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, format!("{field} is required")));
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Role;

    fn parent_request() -> RegistrationRequest {
        RegistrationRequest {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            username: "jdoe".to_owned(),
            email: "jdoe@example.com".to_owned(),
            phone_number: "+254700111222".to_owned(),
            password: Secret::from("somaSOMA123".to_owned()),
            confirm_password: Secret::from("somaSOMA123".to_owned()),
            role_fields: RoleFields::Parent {
                residence: "Roselyn, Nairobi".to_owned(),
            },
        }
    }

    #[test]
    fn valid_parent_registration_produces_a_new_account() {
        let account = parent_request().validate().unwrap();
        assert_eq!(account.role(), Role::Parent);
        assert_eq!(account.username.as_str(), "jdoe");
        assert!(account.verification_phone.is_none());
    }

    #[test]
    fn errors_are_aggregated_across_fields() {
        let mut request = parent_request();
        request.email = "not-an-email".to_owned();
        request.password = Secret::from("short".to_owned());
        request.confirm_password = Secret::from("short".to_owned());

        let errors = request.validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
    }

    #[test]
    fn mismatched_passwords_are_reported() {
        let mut request = parent_request();
        request.confirm_password = Secret::from("somaSOMA124".to_owned());

        let errors = request.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "confirm_password"));
    }

    #[test]
    fn student_age_must_be_within_range() {
        let mut request = parent_request();
        request.role_fields = RoleFields::Student {
            age: "18".to_owned(),
            school: "Lean Sigma".to_owned(),
            coding_experience: "No experience".to_owned(),
            program: "Python".to_owned(),
            program_schedule: "Once A Week".to_owned(),
            cohort: "1".to_owned(),
            parent_id: None,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field == "age"));
    }

    #[test]
    fn student_in_range_is_accepted() {
        let mut request = parent_request();
        request.role_fields = RoleFields::Student {
            age: "10".to_owned(),
            school: "Lean Sigma".to_owned(),
            coding_experience: "Basic experience".to_owned(),
            program: "Javascript".to_owned(),
            program_schedule: "All Week Days".to_owned(),
            cohort: "2".to_owned(),
            parent_id: None,
        };

        let account = request.validate().unwrap();
        assert_eq!(account.role(), Role::Student);
    }
}
