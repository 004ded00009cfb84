//! The interface to the use case database, usually backed by alsa-lib's `snd_use_case_*` API.

use std::fmt;

use super::error::{BoxError, UcmError};

/// The name of the verb that disables every use case.
pub const VERB_INACTIVE: &str = "Inactive";

/// An entry returned by [`UseCaseManager::get_list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCaseEntry {
    /// The name of the verb, device or modifier.
    pub name: String,
    /// A human readable description, if the list carries one.
    pub description: Option<String>,
}

impl UseCaseEntry {
    /// Creates an entry with a description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }

    /// Creates an entry without a description, as in device relationship lists.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }
}

/// A state change sent to the use case manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseCaseCommand<'a> {
    /// Switches the active verb.
    SetVerb(&'a str),
    /// Enables a device in the active verb.
    EnableDevice(&'a str),
    /// Disables a device in the active verb.
    DisableDevice(&'a str),
    /// Enables a modifier in the active verb.
    EnableModifier(&'a str),
    /// Disables a modifier in the active verb.
    DisableModifier(&'a str),
}

impl UseCaseCommand<'_> {
    /// The alsa-lib identifier for the command.
    pub fn identifier(&self) -> &'static str {
        match self {
            UseCaseCommand::SetVerb(_) => "_verb",
            UseCaseCommand::EnableDevice(_) => "_enadev",
            UseCaseCommand::DisableDevice(_) => "_disdev",
            UseCaseCommand::EnableModifier(_) => "_enamod",
            UseCaseCommand::DisableModifier(_) => "_dismod",
        }
    }

    /// The argument of the command.
    pub fn value(&self) -> &str {
        match *self {
            UseCaseCommand::SetVerb(v)
            | UseCaseCommand::EnableDevice(v)
            | UseCaseCommand::DisableDevice(v)
            | UseCaseCommand::EnableModifier(v)
            | UseCaseCommand::DisableModifier(v) => v,
        }
    }
}

impl fmt::Display for UseCaseCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.identifier(), self.value())
    }
}

/// A use case database for one sound card.
///
/// Values and lists for devices and modifiers are scoped to the currently selected verb, so
/// callers select a verb with [`UseCaseCommand::SetVerb`] before reading its contents. The
/// identifiers follow alsa-lib's conventions; see [`identifier`] for helpers that build them.
pub trait UseCaseManager {
    /// Looks up a single value, returning `None` if it is not set.
    fn get_value(&self, identifier: &str) -> Option<String>;

    /// Looks up a list, returning `None` if it doesn't exist.
    fn get_list(&self, identifier: &str) -> Option<Vec<UseCaseEntry>>;

    /// Applies a state change.
    fn execute(&mut self, command: UseCaseCommand<'_>) -> Result<(), BoxError>;
}

impl<M: UseCaseManager + ?Sized> UseCaseManager for Box<M> {
    fn get_value(&self, identifier: &str) -> Option<String> {
        (**self).get_value(identifier)
    }

    fn get_list(&self, identifier: &str) -> Option<Vec<UseCaseEntry>> {
        (**self).get_list(identifier)
    }

    fn execute(&mut self, command: UseCaseCommand<'_>) -> Result<(), BoxError> {
        (**self).execute(command)
    }
}

/// Runs a command, logging and wrapping any failure.
pub(crate) fn execute<M: UseCaseManager + ?Sized>(
    manager: &mut M,
    command: UseCaseCommand<'_>,
) -> Result<(), UcmError> {
    manager.execute(command).map_err(|source| {
        log::error!("failed to execute {}: {}", command, source);
        UcmError::from_command(&command, source)
    })
}

/// Selects the inactive verb when dropped.
///
/// Holds the manager for as long as verbs are being switched for inspection, so that every exit
/// path leaves the card in the inactive state.
pub(crate) struct VerbRestore<'a, M: UseCaseManager + ?Sized> {
    manager: &'a mut M,
}

impl<'a, M: UseCaseManager + ?Sized> VerbRestore<'a, M> {
    pub(crate) fn new(manager: &'a mut M) -> Self {
        Self { manager }
    }

    pub(crate) fn manager(&mut self) -> &mut M {
        &mut *self.manager
    }
}

impl<M: UseCaseManager + ?Sized> Drop for VerbRestore<'_, M> {
    fn drop(&mut self) {
        log::debug!("restoring verb {}", VERB_INACTIVE);
        let _ = execute(&mut *self.manager, UseCaseCommand::SetVerb(VERB_INACTIVE));
    }
}

impl<M: UseCaseManager + ?Sized> fmt::Debug for VerbRestore<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerbRestore").finish_non_exhaustive()
    }
}

/// Builders for use case identifiers.
pub mod identifier {
    /// The list of verbs.
    pub const VERBS: &str = "_verbs";
    /// The list of devices in the current verb.
    pub const DEVICES: &str = "_devices";
    /// The list of modifiers in the current verb.
    pub const MODIFIERS: &str = "_modifiers";

    /// A value scoped to a verb, e.g. `=PlaybackPCM//HiFi`.
    pub fn verb_value(key: &str, verb: &str) -> String {
        format!("={}//{}", key, verb)
    }

    /// A value scoped to a device or modifier of the current verb, e.g. `=PlaybackPCM/Speaker`.
    pub fn value(key: &str, name: &str) -> String {
        format!("={}/{}", key, name)
    }

    /// The devices conflicting with a device or modifier.
    pub fn conflicting_devices(name: &str) -> String {
        format!("_conflictingdevs/{}", name)
    }

    /// The devices supported alongside a device or modifier.
    pub fn supported_devices(name: &str) -> String {
        format!("_supporteddevs/{}", name)
    }
}
