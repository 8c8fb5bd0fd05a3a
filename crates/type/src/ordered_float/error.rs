// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use std::fmt;

/// A float value could not be made orderable, because it was NaN.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub struct OrderedFloatError;

impl fmt::Display for OrderedFloatError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("NaN is not an orderable float value")
	}
}
