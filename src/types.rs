//! Unsigned integer type alias for bucket capacities and volumes.
//!
//! The actual type is determined at compile time via feature flags.
//!
//! # Features
//! - `volume_u64` (default): uses [`u64`] as `Uint`
//! - `volume_u128`: uses [`u128`] as `Uint`
//!   (Both features cannot be enabled at the same time.)
//! - If neither feature is enabled, `u64` is used.

#[cfg(all(feature = "volume_u64", feature = "volume_u128"))]
compile_error!("You cannot enable both `volume_u64` and `volume_u128` features at the same time");

/// Alias for the unsigned integer type used for capacity and volume.
#[cfg(all(feature = "volume_u128", not(feature = "volume_u64")))]
pub type Uint = u128;

/// Alias for the unsigned integer type used for capacity and volume.
#[cfg(not(all(feature = "volume_u128", not(feature = "volume_u64"))))]
pub type Uint = u64;
