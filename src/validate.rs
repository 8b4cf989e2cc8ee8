use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CreateError;

/// Column caps count characters, as the store's `length()` does.
pub(crate) fn fits(value: &str, max: usize) -> bool {
	value.chars().count() <= max
}

/// Runs the derived rules and reports the first failure, by field name.
pub(crate) fn check<T: Validate>(value: &T) -> Result<(), CreateError> {
	value.validate().map_err(first_failure)
}

fn first_failure(errors: ValidationErrors) -> CreateError {
	let mut failures: Vec<(String, ValidationError)> = errors
		.field_errors()
		.into_iter()
		.flat_map(|(field, errs)| errs.iter().map(move |err| (field.to_string(), err.clone())))
		.collect();
	failures.sort_by(|a, b| a.0.cmp(&b.0));

	let Some((field, err)) = failures.into_iter().next() else {
		return CreateError::Validation {
			field: String::new(),
			reason: "invalid value",
		};
	};
	let max = err.params.get("max").and_then(|max| max.as_u64());
	match (err.code.as_ref(), max) {
		("length", Some(max)) => CreateError::Data {
			field,
			max: max as usize,
		},
		(code, _) => CreateError::Validation {
			field,
			reason: reason(code),
		},
	}
}

fn reason(code: &str) -> &'static str {
	match code {
		"required" => "must not be empty",
		"email" => "not a valid email address",
		_ => "invalid value",
	}
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		Err(ValidationError::new("required"))
	} else {
		Ok(())
	}
}

/// The local part must be a dot-atom: no leading, trailing or doubled dots.
pub(crate) fn dot_atom_local(value: &str) -> Result<(), ValidationError> {
	let local = value.rsplit_once('@').map_or(value, |(local, _)| local);
	if local.split('.').any(str::is_empty) {
		let mut err = ValidationError::new("email");
		err.message = Some(Cow::Borrowed("local part is not a dot-atom"));
		Err(err)
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Validate)]
	struct Address {
		#[validate(email, custom(function = "dot_atom_local"), length(max = 100))]
		email: String,
	}

	fn address(value: &str) -> Result<(), CreateError> {
		check(&Address {
			email: value.to_string(),
		})
	}

	#[rstest]
	#[case("a@b.com")]
	#[case("first.last+tag@mail.example.org")]
	#[case("x@sub-domain.io")]
	fn accepts_plain_addresses(#[case] value: &str) {
		assert!(address(value).is_ok());
	}

	#[rstest]
	#[case("")]
	#[case("no-at-sign")]
	#[case("@b.com")]
	#[case("a@b..com")]
	#[case("a@@b.com")]
	#[case("a b@c.com")]
	#[case("a@-b.com")]
	#[case("<x>@b.com")]
	#[case(".a@b.com")]
	#[case("a.@b.com")]
	#[case("a..b@b.com")]
	#[case("a\"b(c)@b.com")]
	fn rejects_malformed_addresses(#[case] value: &str) {
		match address(value) {
			Err(CreateError::Validation { field, .. }) => assert_eq!(field, "email"),
			other => panic!("{value:?} gave {other:?}"),
		}
	}

	#[test]
	fn over_length_maps_to_a_data_failure() {
		let long = format!("a@{}.{}.com", "b".repeat(50), "c".repeat(50));
		match address(&long) {
			Err(CreateError::Data { field, max }) => {
				assert_eq!(field, "email");
				assert_eq!(max, 100);
			}
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn length_is_counted_in_characters() {
		let twenty = "ж".repeat(20);
		assert!(fits(&twenty, 20));
		assert!(!fits(&format!("{twenty}ж"), 20));
	}

	#[rstest]
	#[case("")]
	#[case("   ")]
	fn blank_values_are_required_failures(#[case] value: &str) {
		assert_eq!(not_blank(value).unwrap_err().code, "required");
	}
}
