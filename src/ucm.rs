//! The UCM capability model: ingestion, port and mapping synthesis, hardware probing, and
//! runtime routing.
//!
//! A [`UcmConfig`] is loaded once per card from a [`UseCaseManager`]. From it, the caller builds
//! the card's [`ProfileSet`] (one profile per verb, probed against the hardware through a
//! [`Hardware`] implementation) and the [`PortSet`]s presented to users. At runtime, the config
//! switches verbs and devices in response to profile and port changes, and enables modifiers
//! while streams with matching media roles are running.
//!
//! ```ignore
//! let mut ucm = UcmConfig::load(manager)?;
//! ucm.add_profile_set(&mut hardware, &ProbeConfig::default());
//! let ports = ucm.card_ports();
//!
//! ucm.set_profile(Some("HiFi"), None)?;
//! ucm.roled_stream_begin("music", "Mapping HiFi: hw:0,0: sink", PortDirection::Output)?;
//! ```

mod combination;
mod error;
mod ingest;
mod manager;
mod mapping;
mod model;
mod modifier;
mod port;
mod probe;
mod relations;
mod roles;
mod routing;

#[cfg(test)]
pub(crate) mod test_util;

pub use combination::*;
pub use error::*;
pub use ingest::device_priority;
pub use manager::{identifier, UseCaseCommand, UseCaseEntry, UseCaseManager, VERB_INACTIVE};
pub use mapping::*;
pub use model::*;
pub use port::*;
pub use probe::*;
pub use roles::*;

/// A result type for UCM operations.
pub type Result<T> = std::result::Result<T, UcmError>;

/// The use case configuration of one card.
///
/// All verbs, devices, modifiers and jacks are owned here; profiles and mappings live in the
/// [`ProfileSet`], and refer back to verbs and devices by ID.
///
/// Methods that change state take `&mut self`. Callers that deliver stream events from several
/// threads should share the config behind a [`std::sync::Mutex`], so that each modifier counter
/// update happens together with its enable or disable command.
#[derive(Debug)]
pub struct UcmConfig<M> {
    manager: M,
    verbs: Vec<Verb>,
    jacks: Vec<Jack>,
    active_verb: Option<VerbId>,
    profile_set: ProfileSet,
}

impl<M: UseCaseManager> UcmConfig<M> {
    /// The underlying use case manager.
    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// The underlying use case manager, mutably. Commands sent directly aren't tracked by the
    /// config.
    pub fn manager_mut(&mut self) -> &mut M {
        &mut self.manager
    }

    /// Consumes the config, returning the use case manager.
    pub fn into_manager(self) -> M {
        self.manager
    }

    /// All verbs that were loaded, in the order the use case manager lists them.
    pub fn verbs(&self) -> impl Iterator<Item = (VerbId, &Verb)> + '_ {
        self.verbs
            .iter()
            .enumerate()
            .map(|(idx, v)| (VerbId(idx), v))
    }

    /// Looks up a verb by ID.
    ///
    /// Panics if the ID is from another config.
    pub fn verb(&self, id: VerbId) -> &Verb {
        &self.verbs[id.0]
    }

    /// Looks up a verb by name.
    pub fn verb_by_name(&self, name: &str) -> Option<(VerbId, &Verb)> {
        self.verbs().find(|(_, v)| v.name == name)
    }

    /// The jacks referenced by any device, shared across verbs.
    pub fn jacks(&self) -> &[Jack] {
        &self.jacks
    }

    /// Looks up a jack by ID.
    ///
    /// Panics if the ID is from another config.
    pub fn jack(&self, id: JackId) -> &Jack {
        &self.jacks[id.0]
    }

    /// The currently selected verb, if any.
    pub fn active_verb(&self) -> Option<(VerbId, &Verb)> {
        self.active_verb.map(|id| (id, &self.verbs[id.0]))
    }

    /// The profiles and mappings built by [`UcmConfig::add_profile_set`].
    pub fn profile_set(&self) -> &ProfileSet {
        &self.profile_set
    }

    fn mapping_checked(&self, id: MappingId) -> Result<&Mapping> {
        self.profile_set
            .mappings
            .get(id.0)
            .ok_or_else(|| UcmError::NotFound {
                kind: "mapping",
                name: format!("#{}", id.0),
            })
    }
}
