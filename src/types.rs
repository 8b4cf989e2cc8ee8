use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Uid = i64;
pub type Aid = i64;
pub type Bid = i64;
pub type Oid = i64;

/// Account role, stored as its integer code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(into = "i32", try_from = "i64")]
pub enum Role {
	#[default]
	Visitor = 0,
	Admin = 1,
}

impl Role {
	pub const ALL: [Role; 2] = [Role::Visitor, Role::Admin];

	pub fn code(self) -> i32 {
		self as i32
	}

	pub fn name(self) -> &'static str {
		match self {
			Role::Visitor => "visitor",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown role code {0}")]
pub struct UnknownRole(pub i64);

impl TryFrom<i64> for Role {
	type Error = UnknownRole;

	fn try_from(code: i64) -> Result<Self, Self::Error> {
		Role::ALL
			.into_iter()
			.find(|role| i64::from(role.code()) == code)
			.ok_or(UnknownRole(code))
	}
}

impl From<Role> for i32 {
	fn from(role: Role) -> Self {
		role.code()
	}
}

// timestamps cross the dict boundary as whole epoch seconds
pub(crate) fn epoch(at: &DateTime<Utc>) -> i64 {
	at.timestamp()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(0, Role::Visitor, "visitor")]
	#[case(1, Role::Admin, "admin")]
	fn role_codes_resolve_to_names(#[case] code: i64, #[case] role: Role, #[case] name: &str) {
		let resolved = Role::try_from(code).unwrap();
		assert_eq!(resolved, role);
		assert_eq!(resolved.name(), name);
		assert_eq!(i64::from(resolved.code()), code);
	}

	#[rstest]
	#[case(-1)]
	#[case(2)]
	#[case(42)]
	fn unknown_role_codes_are_rejected(#[case] code: i64) {
		assert_eq!(Role::try_from(code), Err(UnknownRole(code)));
	}

	#[test]
	fn default_role_is_visitor() {
		assert_eq!(Role::default(), Role::Visitor);
	}

	#[test]
	fn role_serializes_as_its_code() {
		assert_eq!(serde_json::to_value(Role::Admin).unwrap(), serde_json::json!(1));
		let back: Role = serde_json::from_value(serde_json::json!(0)).unwrap();
		assert_eq!(back, Role::Visitor);
	}
}
