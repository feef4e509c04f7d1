//! Configuration for the equalis kernel.
//!
//! - [`KernelConfig`]: `[equalizer]` and `[spectrogram]` tables loaded from TOML
//! - [`Mode`]: named, labelled band layouts with gain sliders
//! - [`factory_modes`]: the built-in `generic`, `musical`, `animal` and `human` modes
//!
//! ```rust
//! use equalis_config::{KernelConfig, get_factory_mode};
//!
//! let config = KernelConfig::from_toml("[equalizer]\ncache_capacity = 2\n").unwrap();
//! let eq = config.build_equalizer().unwrap();
//!
//! let mode = get_factory_mode("animal").unwrap();
//! let bands = mode.with_gains(&[1.0, 1.0, 0.0, 1.0]).unwrap();
//! let signal = vec![0.0; 256];
//! let out = eq.process(&signal, 44100.0, &bands).unwrap();
//! assert_eq!(out.len(), 256);
//! ```

pub mod error;
pub mod factory_modes;
pub mod kernel;
pub mod mode;

pub use error::ConfigError;
pub use factory_modes::{FACTORY_MODE_NAMES, factory_modes, get_factory_mode, is_factory_mode};
pub use kernel::KernelConfig;
pub use mode::{Mode, ModeBand};
