// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::fmt;

/// The static datatype of a column or a scalar value.
///
/// `Array` is the only composite member: its nested `Type` is the element
/// type, and it is the only type ARRAY_JOIN may consume.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
	Boolean,
	Float4,
	Float8,
	Int1,
	Int2,
	Int4,
	Int8,
	Int16,
	Uint1,
	Uint2,
	Uint4,
	Uint8,
	Uint16,
	Utf8,
	Array(Box<Type>),
	/// Value is not defined (NULL in common query languages).
	Undefined,
}

impl Type {
	pub fn is_array(&self) -> bool {
		matches!(self, Type::Array(_))
	}

	/// The element type of an `Array(_)`, or `None` for every other kind.
	pub fn array_element(&self) -> Option<&Type> {
		match self {
			Type::Array(element) => Some(element),
			_ => None,
		}
	}

	pub fn is_numeric(&self) -> bool {
		matches!(
			self,
			Type::Float4
				| Type::Float8 | Type::Int1
				| Type::Int2 | Type::Int4
				| Type::Int8 | Type::Int16
				| Type::Uint1 | Type::Uint2
				| Type::Uint4 | Type::Uint8
				| Type::Uint16
		)
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Type::Boolean => f.write_str("BOOLEAN"),
			Type::Float4 => f.write_str("FLOAT4"),
			Type::Float8 => f.write_str("FLOAT8"),
			Type::Int1 => f.write_str("INT1"),
			Type::Int2 => f.write_str("INT2"),
			Type::Int4 => f.write_str("INT4"),
			Type::Int8 => f.write_str("INT8"),
			Type::Int16 => f.write_str("INT16"),
			Type::Uint1 => f.write_str("UINT1"),
			Type::Uint2 => f.write_str("UINT2"),
			Type::Uint4 => f.write_str("UINT4"),
			Type::Uint8 => f.write_str("UINT8"),
			Type::Uint16 => f.write_str("UINT16"),
			Type::Utf8 => f.write_str("UTF8"),
			Type::Array(element) => write!(f, "ARRAY({element})"),
			Type::Undefined => f.write_str("UNDEFINED"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_array_element() {
		let t = Type::Array(Box::new(Type::Int4));
		assert_eq!(t.array_element(), Some(&Type::Int4));
		assert!(t.is_array());
	}

	#[test]
	fn test_display() {
		assert_eq!(Type::Array(Box::new(Type::Utf8)).to_string(), "ARRAY(UTF8)");
	}
}
