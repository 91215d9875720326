//! Field validation rules applied on create and on every update.
//!
//! Each check returns [`Error::InvalidInput`] with a field-specific message.

use chrono::{Datelike as _, NaiveDate};

use crate::{Error, Result, account::ProfileChanges};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Gender codes accepted by the service.
pub const GENDER_CODES: std::ops::RangeInclusive<i32> = 0..=2;

/// Birth years that render as a plain four-digit `YYYY-MM-DD` date.
pub const BIRTH_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Logins are non-empty and ASCII alphanumeric.
pub fn check_login(login: &str) -> Result<()> {
  if is_ascii_alnum(login) {
    Ok(())
  } else {
    Err(Error::InvalidInput(
      "login must contain only latin letters and digits".into(),
    ))
  }
}

/// Passwords are ASCII alphanumeric and at least [`MIN_PASSWORD_LEN`] long.
pub fn check_password(password: &str) -> Result<()> {
  if is_ascii_alnum(password) && password.len() >= MIN_PASSWORD_LEN {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "password must contain only latin letters and digits, at least \
       {MIN_PASSWORD_LEN} characters"
    )))
  }
}

/// Display names are latin or cyrillic letters and whitespace.
pub fn check_name(name: &str) -> Result<()> {
  if !name.is_empty() && name.chars().all(is_name_char) {
    Ok(())
  } else {
    Err(Error::InvalidInput(
      "name must contain only latin or cyrillic letters and spaces".into(),
    ))
  }
}

pub fn check_gender(gender: i32) -> Result<()> {
  if GENDER_CODES.contains(&gender) {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "gender must be between {} and {}",
      GENDER_CODES.start(),
      GENDER_CODES.end()
    )))
  }
}

pub fn check_birthday(birthday: NaiveDate) -> Result<()> {
  if BIRTH_YEARS.contains(&birthday.year()) {
    Ok(())
  } else {
    Err(Error::InvalidInput(format!(
      "birthday year must be between {} and {}",
      BIRTH_YEARS.start(),
      BIRTH_YEARS.end()
    )))
  }
}

pub fn check_age_threshold(years: i64) -> Result<u32> {
  u32::try_from(years)
    .ok()
    .filter(|y| *y > 0)
    .ok_or_else(|| Error::InvalidInput("age must be a positive number".into()))
}

/// Validate every field a profile update supplies. An empty name counts as
/// absent and is not checked.
pub fn check_profile_changes(changes: &ProfileChanges) -> Result<()> {
  if let Some(name) = changes.name.as_deref()
    && !name.is_empty()
  {
    check_name(name)?;
  }
  if let Some(gender) = changes.gender {
    check_gender(gender)?;
  }
  if let Some(birthday) = changes.birthday {
    check_birthday(birthday)?;
  }
  Ok(())
}

fn is_ascii_alnum(s: &str) -> bool {
  !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphabetic()
    || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё')
    || c.is_whitespace()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn login_rules() {
    assert!(check_login("ab1").is_ok());
    assert!(check_login("Admin1").is_ok());
    assert!(matches!(check_login("ab#1"), Err(Error::InvalidInput(_))));
    assert!(check_login("").is_err());
    assert!(check_login("иван").is_err());
    assert!(check_login("a b").is_err());
  }

  #[test]
  fn password_rules() {
    assert!(check_password("abcdef12").is_ok());
    assert!(check_password("short").is_err());
    assert!(check_password("abcdefg").is_err());
    assert!(check_password("abcdef1!").is_err());
  }

  #[test]
  fn name_rules() {
    assert!(check_name("Иван").is_ok());
    assert!(check_name("Анна Пётр").is_ok());
    assert!(check_name("John Smith").is_ok());
    assert!(check_name("R2D2").is_err());
    assert!(check_name("").is_err());
    assert!(check_name("Zoë").is_err());
  }

  #[test]
  fn gender_rules() {
    for g in 0..=2 {
      assert!(check_gender(g).is_ok());
    }
    assert!(check_gender(-1).is_err());
    assert!(check_gender(3).is_err());
  }

  #[test]
  fn profile_changes_are_checked_field_by_field() {
    assert!(check_profile_changes(&ProfileChanges::default()).is_ok());

    let empty_name = ProfileChanges { name: Some(String::new()), ..Default::default() };
    assert!(check_profile_changes(&empty_name).is_ok());

    let bad_gender = ProfileChanges { gender: Some(7), ..Default::default() };
    assert!(matches!(
      check_profile_changes(&bad_gender),
      Err(Error::InvalidInput(m)) if m.contains("gender")
    ));

    let bad_name = ProfileChanges { name: Some("x_y".into()), ..Default::default() };
    assert!(check_profile_changes(&bad_name).is_err());
  }

  #[test]
  fn birthday_year_must_fit_four_digits() {
    let date = |y| NaiveDate::from_ymd_opt(y, 6, 1).unwrap();
    assert!(check_birthday(date(1)).is_ok());
    assert!(check_birthday(date(1990)).is_ok());
    assert!(check_birthday(date(9999)).is_ok());
    assert!(matches!(
      check_birthday(date(10000)),
      Err(Error::InvalidInput(m)) if m.contains("birthday")
    ));
    assert!(check_birthday(date(0)).is_err());
    assert!(check_birthday(date(-1)).is_err());

    let far = ProfileChanges { birthday: Some(date(12000)), ..Default::default() };
    assert!(check_profile_changes(&far).is_err());
  }

  #[test]
  fn age_threshold_must_be_positive() {
    assert_eq!(check_age_threshold(30).unwrap(), 30);
    assert!(check_age_threshold(0).is_err());
    assert!(check_age_threshold(-5).is_err());
  }
}
