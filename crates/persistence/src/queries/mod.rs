// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `users`: User lookups for authentication
//! - `lookups`: Identification types and cashiers
//! - `patients`: Patient reads and filtered, paginated listing
//! - `transactions`: Payment transaction reads and listing
//!
//! ## Backend-Specific Functions
//!
//! Query functions are generated in monomorphic versions suffixed `_sqlite`
//! and `_mysql`. The `Persistence` adapter in `lib.rs` dispatches to the
//! right one for the active connection.

pub mod lookups;
pub mod patients;
pub mod transactions;
pub mod users;

pub use users::verify_password;
