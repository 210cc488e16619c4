//! secp256k1 elliptic-curve arithmetic (spec §3/§9).
//!
//! Laid out bottom-up: [`uint`] is raw fixed-width big-integer math,
//! [`field`] and [`scalar`] are the two prime fields the curve uses
//! (coordinates and exponents respectively), and [`point`] is curve-point
//! arithmetic and encoding built on top of both. Higher-level modules
//! ([`crate::ecdsa`], [`crate::keys`]) only reach into `point` and
//! `scalar`; `uint`/`field` are curve-internal plumbing.

pub mod field;
pub mod point;
pub mod scalar;
pub mod uint;

pub use field::FieldElement;
pub use point::{mul_generator, Point};
pub use scalar::Scalar;
