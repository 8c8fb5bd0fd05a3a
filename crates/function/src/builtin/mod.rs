// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

//! A handful of scalar functions used to exercise `ActionsDAG`'s constant
//! folding and ARRAY_JOIN paths. The real scalar function catalog is out of
//! scope (spec.md §1).

mod arithmetic;
mod logical;
mod misc;

pub use arithmetic::{Add, AddBase, AddResolver, Multiply, MultiplyBase, MultiplyResolver};
pub use logical::{Not, NotBase, NotResolver};
pub use misc::{Ignore, IgnoreBase, IgnoreResolver};
