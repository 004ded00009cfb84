//! Defines error types.

use thiserror::Error;

use super::UseCaseCommand;

/// The error type reported by a [`super::UseCaseManager`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error produced while building or driving a UCM configuration.
#[derive(Error, Debug)]
pub enum UcmError {
    /// The use case manager lists no verbs at all.
    #[error("no UCM verbs found")]
    NoVerbs,
    /// Switching the active verb failed.
    #[error("failed to set verb {verb}")]
    SetVerb {
        /// The verb that was requested.
        verb: String,
        /// The error reported by the use case manager.
        #[source]
        source: BoxError,
    },
    /// A command other than a verb switch was rejected by the use case manager.
    #[error("use case manager rejected {command}")]
    Command {
        /// The rejected command, formatted as `identifier=value`.
        command: String,
        /// The error reported by the use case manager.
        #[source]
        source: BoxError,
    },
    /// Two verbs share the same name.
    #[error("verb {0} already exists")]
    DuplicateVerb(String),
    /// A device declares neither a playback nor a capture endpoint string.
    #[error("no sink and source at {verb}: {device}")]
    NoEndpoint {
        /// The verb containing the device.
        verb: String,
        /// The device name.
        device: String,
    },
    /// A name did not match any known object.
    #[error("unknown {kind} {name}")]
    NotFound {
        /// The kind of object, such as "verb" or "mapping".
        kind: &'static str,
        /// The requested name.
        name: String,
    },
    /// An endpoint could not be opened during probing.
    #[error("failed to open {device_string}")]
    Open {
        /// The endpoint string that failed to open.
        device_string: String,
        /// The underlying hardware error.
        #[source]
        source: BoxError,
    },
}

impl UcmError {
    pub(crate) fn from_command(command: &UseCaseCommand<'_>, source: BoxError) -> Self {
        match command {
            UseCaseCommand::SetVerb(verb) => UcmError::SetVerb {
                verb: verb.to_string(),
                source,
            },
            _ => UcmError::Command {
                command: command.to_string(),
                source,
            },
        }
    }
}
