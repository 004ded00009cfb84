//! A model of an ALSA use case manager (UCM) configuration, suitable for building the ports and
//! profiles a PulseAudio-style sound server presents for a card.
//!
//! The [`ucm`] module ingests verbs, devices and modifiers from a [`ucm::UseCaseManager`],
//! synthesizes port combinations and endpoint mappings, probes them against the hardware, and
//! tracks modifier activation at runtime. The [`types`] module holds the shared PulseAudio data
//! types used along the way.

#![warn(
    anonymous_parameters,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_qualifications,
    variant_size_differences
)]

pub mod types;
pub mod ucm;
