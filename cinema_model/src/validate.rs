/// Cinema Model — Field Validation
///
/// Pure checks on scalar attributes. Each returns the first problem found.
/// Money is i64 cents throughout.

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use crate::domain::{ContractTerms, Person};
use crate::error::ValidationError;

type Checked = Result<(), ValidationError>;

pub const MIN_SALARY_CENTS: i64 = 50_000;
pub const MAX_SALARY_CENTS: i64 = 350_000;
pub const MIN_HOURLY_RATE_CENTS: i64 = 500;
pub const MAX_HOURLY_RATE_CENTS: i64 = 5_000;
pub const MAX_WEEK_HOURS: u8 = 30;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_POS_LOGIN_LEN: usize = 3;
pub const MIN_DEGREE_LEN: usize = 2;
/// Value of one bonus point.
pub const CENTS_PER_POINT: i64 = 100;

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

pub fn require_text(field: &'static str, value: &str) -> Checked {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub fn validate_person(person: &Person, today: NaiveDate, max_age: u32) -> Checked {
    require_text("first_name", &person.first_name)?;
    require_text("last_name", &person.last_name)?;
    not_in_future_date("date_of_birth", person.date_of_birth, today)?;
    if person.age_on(today) > max_age {
        return Err(ValidationError::new(
            "date_of_birth",
            format!("age must not exceed {max_age} years"),
        ));
    }
    Ok(())
}

/// One `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Checked {
    let reject = || Err(ValidationError::new("email", format!("{email:?} is not an email address")));
    if email.chars().any(char::is_whitespace) {
        return reject();
    }
    let Some((local, domain)) = email.split_once('@') else {
        return reject();
    };
    if local.is_empty() || domain.contains('@') {
        return reject();
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return reject();
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Checked {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("phone_number", "expected 6+ digits with optional leading +"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Checked {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_pos_login(login: &str) -> Checked {
    if login.len() < MIN_POS_LOGIN_LEN || !login.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            "pos_login",
            format!("must be at least {MIN_POS_LOGIN_LEN} letters or digits"),
        ));
    }
    Ok(())
}

/// Password plus one uppercase letter and one digit.
pub fn validate_pos_password(password: &str) -> Checked {
    validate_password(password).map_err(|e| ValidationError::new("pos_password", e.reason))?;
    if !password.chars().any(|c| c.is_uppercase()) || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "pos_password",
            "must contain an uppercase letter and a digit",
        ));
    }
    Ok(())
}

pub fn validate_degree(degree: &str) -> Checked {
    let trimmed = degree.trim();
    if trimmed.chars().count() < MIN_DEGREE_LEN
        || !trimmed.chars().all(|c| c.is_alphabetic() || c == ' ' || c == '-')
    {
        return Err(ValidationError::new(
            "degree",
            "must be 2+ characters of letters, spaces or hyphens",
        ));
    }
    Ok(())
}

/// Lowercase hex SHA-256 of a secret. Plain text is never stored.
pub fn hash_secret(secret: &str) -> String {
    let digest = Sha256::digest(secret.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

pub fn not_in_future_date(field: &'static str, date: NaiveDate, today: NaiveDate) -> Checked {
    if date > today {
        return Err(ValidationError::new(field, "must not be in the future"));
    }
    Ok(())
}

pub fn not_in_future(field: &'static str, at: NaiveDateTime, now: NaiveDateTime) -> Checked {
    if at > now {
        return Err(ValidationError::new(field, "must not be in the future"));
    }
    Ok(())
}

pub fn validate_period(from: NaiveDate, to: NaiveDate) -> Checked {
    if to < from {
        return Err(ValidationError::new("valid_to", "must not precede valid_from"));
    }
    Ok(())
}

pub fn validate_shift(start: NaiveDateTime, end: NaiveDateTime, max_minutes: i64) -> Checked {
    if end <= start {
        return Err(ValidationError::new("end_time", "must be after start_time"));
    }
    if (end - start).num_minutes() > max_minutes {
        return Err(ValidationError::new(
            "end_time",
            format!("a shift lasts at most {max_minutes} minutes"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

pub fn non_negative(field: &'static str, cents: i64) -> Checked {
    if cents < 0 {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

pub fn positive(field: &'static str, value: i64) -> Checked {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be positive"));
    }
    Ok(())
}

pub fn validate_contract(terms: &ContractTerms) -> Checked {
    match *terms {
        ContractTerms::FullTime { salary_cents, .. } => {
            if !(MIN_SALARY_CENTS..=MAX_SALARY_CENTS).contains(&salary_cents) {
                return Err(ValidationError::new(
                    "salary",
                    format!("must be between {MIN_SALARY_CENTS} and {MAX_SALARY_CENTS} cents"),
                ));
            }
        }
        ContractTerms::PartTime {
            hourly_rate_cents,
            max_week_hours,
        } => {
            if !(MIN_HOURLY_RATE_CENTS..=MAX_HOURLY_RATE_CENTS).contains(&hourly_rate_cents) {
                return Err(ValidationError::new(
                    "hourly_rate",
                    format!("must be between {MIN_HOURLY_RATE_CENTS} and {MAX_HOURLY_RATE_CENTS} cents"),
                ));
            }
            if !(1..=MAX_WEEK_HOURS).contains(&max_week_hours) {
                return Err(ValidationError::new(
                    "max_week_hours",
                    format!("must be between 1 and {MAX_WEEK_HOURS}"),
                ));
            }
        }
    }
    Ok(())
}

pub fn validate_capacity(capacity: u32, max: u32) -> Checked {
    if capacity == 0 || capacity > max {
        return Err(ValidationError::new(
            "capacity",
            format!("must be between 1 and {max}"),
        ));
    }
    Ok(())
}

pub fn validate_rating(field: &'static str, rating: u8) -> Checked {
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::new(field, "must be between 1 and 5"));
    }
    Ok(())
}

/// Age restriction is optional; when present it must be a sane age.
pub fn validate_age_restriction(restriction: Option<u8>) -> Checked {
    match restriction {
        Some(age) if age > 21 => Err(ValidationError::new("age_restriction", "must be at most 21")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("ann@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.example.org").is_ok());
        assert!(validate_email("ann@example").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ann@@example.com").is_err());
        assert!(validate_email("ann @example.com").is_err());
        assert!(validate_email("ann@example..com").is_err());
    }

    #[test]
    fn test_pos_credentials() {
        assert!(validate_pos_login("pos01").is_ok());
        assert!(validate_pos_login("p1").is_err());
        assert!(validate_pos_login("pos-1").is_err());
        assert!(validate_pos_password("Secret1").is_ok());
        assert_eq!(validate_pos_password("secret1").unwrap_err().field, "pos_password");
        assert!(validate_pos_password("Sec1").is_err());
    }

    #[test]
    fn test_degree() {
        assert!(validate_degree("BSc Film-Engineering").is_ok());
        assert!(validate_degree("B").is_err());
        assert!(validate_degree("BSc 2").is_err());
    }

    #[test]
    fn test_contract_bounds() {
        let full = |salary_cents| ContractTerms::FullTime {
            salary_cents,
            has_benefits_plan: false,
        };
        assert!(validate_contract(&full(MIN_SALARY_CENTS)).is_ok());
        assert!(validate_contract(&full(MAX_SALARY_CENTS + 1)).is_err());
        let part = ContractTerms::PartTime {
            hourly_rate_cents: 2_000,
            max_week_hours: 31,
        };
        assert_eq!(validate_contract(&part).unwrap_err().field, "max_week_hours");
    }

    #[test]
    fn test_person_age() {
        let today = date(2024, 6, 1);
        let mut person = Person {
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            date_of_birth: date(1990, 6, 2),
        };
        assert!(validate_person(&person, today, 120).is_ok());
        person.date_of_birth = date(1900, 1, 1);
        assert!(validate_person(&person, today, 120).is_err());
        person.date_of_birth = date(2025, 1, 1);
        assert!(validate_person(&person, today, 120).is_err());
        person.date_of_birth = date(1990, 1, 1);
        person.last_name = "  ".into();
        assert_eq!(validate_person(&person, today, 120).unwrap_err().field, "last_name");
    }

    #[test]
    fn test_shift_length() {
        let start = date(2024, 1, 1).and_hms_opt(8, 0, 0).unwrap();
        assert!(validate_shift(start, start + chrono::Duration::minutes(240), 240).is_ok());
        assert!(validate_shift(start, start + chrono::Duration::minutes(241), 240).is_err());
        assert!(validate_shift(start, start, 240).is_err());
    }

    #[test]
    fn test_hash_secret_is_stable_hex() {
        let h = hash_secret("Secret1");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_secret("Secret1"));
        assert_ne!(h, hash_secret("Secret2"));
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
