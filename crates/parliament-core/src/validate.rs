//! Field checks applied on the write path before anything is persisted.
//!
//! Backends call these from every operation that accepts caller-supplied
//! text, so a rejected write never reaches storage.

use std::ops::RangeInclusive;

use chrono::Datelike;

use crate::{
  Error, Result,
  note::NewNote,
  session::NewSession,
  subject::NewSubject,
  user::NewUser,
};

/// The case-insensitive lookup key stored as `usernameLower`.
pub fn normalize_username(username: &str) -> String { username.to_lowercase() }

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
  Error::InvalidField { field, reason: reason.into() }
}

pub fn non_blank(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(invalid(field, "must not be blank"));
  }
  Ok(())
}

pub fn username(value: &str) -> Result<()> {
  non_blank("username", value)?;
  if value.chars().any(char::is_whitespace) {
    return Err(invalid("username", "must not contain whitespace"));
  }
  Ok(())
}

/// Accept only PHC strings (`$<algorithm>$...`). A bare password is rejected.
pub fn password_hash(value: &str) -> Result<()> {
  if !is_phc_string(value) {
    return Err(invalid("passwordHash", "expected a PHC-formatted hash"));
  }
  Ok(())
}

pub(crate) fn is_phc_string(value: &str) -> bool {
  let mut parts = value.split('$');
  // A PHC string starts with `$`, so the first segment is empty.
  matches!(parts.next(), Some(""))
    && parts.next().is_some_and(|alg| !alg.is_empty())
    && parts.next().is_some()
}

/// Years representable as four-digit `YYYY` text. Dates outside this range
/// serialize with a sign and extra digits, which neither sorts nor parses back.
pub const YEAR_RANGE: RangeInclusive<i32> = 0..=9999;

pub fn year_in_range(field: &'static str, date: &impl Datelike) -> Result<()> {
  if !YEAR_RANGE.contains(&date.year()) {
    return Err(invalid(field, "year must be between 0000 and 9999"));
  }
  Ok(())
}

pub fn new_session(input: &NewSession) -> Result<()> {
  non_blank("title", &input.title)?;
  year_in_range("date", &input.date)
}

pub fn new_subject(input: &NewSubject) -> Result<()> {
  non_blank("title", &input.title)
}

pub fn new_note(input: &NewNote) -> Result<()> {
  non_blank("text", &input.text)
}

pub fn new_user(input: &NewUser) -> Result<()> {
  username(&input.username)?;
  non_blank("firstName", &input.first_name)?;
  non_blank("lastName", &input.last_name)?;
  if let Some(birthday) = &input.birthday {
    year_in_range("birthday", birthday)?;
  }
  password_hash(&input.password_hash)
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};

  use super::*;
  use crate::{CreatedBy, user::Role};

  const HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

  #[test]
  fn normalizes_mixed_case() {
    assert_eq!(normalize_username("JaneDoe"), "janedoe");
    assert_eq!(normalize_username("ÄRGER"), "ärger");
  }

  #[test]
  fn plaintext_password_is_rejected() {
    assert!(password_hash(HASH).is_ok());
    assert!(password_hash("hunter2").is_err());
    assert!(password_hash("$").is_err());
    assert!(password_hash("$$x").is_err());
  }

  #[test]
  fn usernames_must_be_single_words() {
    assert!(username("jane").is_ok());
    assert!(username("  ").is_err());
    assert!(username("jane doe").is_err());
  }

  #[test]
  fn new_user_checks_every_field() {
    let ok = NewUser::new("jane", "Jane", "Doe", Role::Teacher, HASH);
    assert!(new_user(&ok).is_ok());

    let mut blank_name = ok.clone();
    blank_name.last_name = " ".into();
    assert!(matches!(
      new_user(&blank_name),
      Err(Error::InvalidField { field: "lastName", .. })
    ));

    let mut plaintext = ok;
    plaintext.password_hash = "secret".into();
    assert!(matches!(
      new_user(&plaintext),
      Err(Error::InvalidField { field: "passwordHash", .. })
    ));
  }

  #[test]
  fn session_dates_beyond_four_digit_years_are_rejected() {
    let by = CreatedBy::new("uid-1", "Ms. Rivera");
    let far = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
    let last = Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap();

    assert!(new_session(&NewSession::new("Last", last, by.clone())).is_ok());
    assert!(matches!(
      new_session(&NewSession::new("Far", far, by)),
      Err(Error::InvalidField { field: "date", .. })
    ));
  }

  #[test]
  fn birthday_outside_four_digit_years_is_rejected() {
    let mut user = NewUser::new("jane", "Jane", "Doe", Role::Student, HASH);
    user.birthday = NaiveDate::from_ymd_opt(2010, 5, 17);
    assert!(new_user(&user).is_ok());

    user.birthday = NaiveDate::from_ymd_opt(-1, 5, 17);
    assert!(matches!(
      new_user(&user),
      Err(Error::InvalidField { field: "birthday", .. })
    ));
  }
}
