//! Translation of affected version ranges into pip constraints.
//!
//! [`safe_version_constraints`] inverts the boundary of a vulnerability's
//! affected range, and [`are_constraints_pip_friendly`] decides whether pip
//! can order the result correctly.

mod compat;
mod invert;

pub use compat::are_constraints_pip_friendly;
pub use invert::safe_version_constraints;
