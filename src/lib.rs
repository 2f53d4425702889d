//! chatlayout
//!
//! Incremental layout engine for chat message lists.
//!
//! The crate positions variable-height items grouped in sections, caches
//! measured sizes, applies identity-based diffs between snapshots of the
//! list, and reports the scroll adjustment that keeps the visible content
//! still while the list changes.
//!
//! Pure core: [`model`], [`diff`], [`layout`]. Impure shell: [`source`],
//! [`session`], [`config`], [`logging`] and the `chatlayout` binary.

pub mod config;
pub mod diff;
pub mod layout;
pub mod logging;
pub mod model;
pub mod session;
pub mod source;

#[cfg(test)]
mod test_harness;
