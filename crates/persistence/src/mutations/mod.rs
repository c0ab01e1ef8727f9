// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! ## Module Organization
//!
//! - `users`: User account creation
//! - `cashiers`: Cashier registration
//! - `patients`: Patient inserts and the persist step of patient units
//! - `transactions`: Transaction inserts and the versioned persist step
//!
//! Inserts that need the new row ID use `get_last_insert_rowid()` from the
//! `backend` module. Everything else is Diesel DSL.

pub mod cashiers;
pub mod patients;
pub mod transactions;
pub mod users;
