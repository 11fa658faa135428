//! # viewkit-auth
//!
//! Access control for viewkit views. Authentication itself happens upstream:
//! an authentication layer records the current user in request META, and
//! this crate reads it back as a [`User`], checks it against an
//! [`AccessPolicy`], and gates views through the [`AccessGuard`] mixin.

pub mod mixins;
pub mod policy;
pub mod user;

pub use mixins::AccessGuard;
pub use policy::AccessPolicy;
pub use user::User;
