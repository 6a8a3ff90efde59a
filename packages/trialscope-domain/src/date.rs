//! Registry dates come either as `YYYY-MM` or `YYYY-MM-DD`. A missing day is read as the
//! first of the month so both forms order consistently.

use std::{fmt, str::FromStr};

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, Result};

const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrialDate(Date);
impl TrialDate {
	pub fn parse(raw: &str) -> Result<Self> {
		let trimmed = raw.trim();
		let date = Date::parse(trimmed, DAY_FORMAT)
			.or_else(|_| Date::parse(&format!("{trimmed}-01"), DAY_FORMAT))
			.map_err(|_| Error::InvalidDate { value: raw.to_string() })?;

		Ok(Self(date))
	}

	/// Whole calendar months from `self` to `later`, ignoring the day of month.
	pub fn months_until(self, later: Self) -> i32 {
		let years = later.0.year() - self.0.year();
		let months = i32::from(u8::from(later.0.month())) - i32::from(u8::from(self.0.month()));

		years * 12 + months
	}

	pub fn days_until(self, later: Self) -> i64 {
		(later.0 - self.0).whole_days()
	}
}
impl FromStr for TrialDate {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::parse(raw)
	}
}
impl fmt::Display for TrialDate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:04}-{:02}-{:02}", self.0.year(), u8::from(self.0.month()), self.0.day())
	}
}
