//! Port directions and availability.

use bitflags::bitflags;

/// Specifies the direction of a port, endpoint or modifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Capture, ie. part of a source.
    Input,
    /// Playback, ie. part of a sink.
    Output,
}

impl PortDirection {
    /// Returns "sink" for outputs and "source" for inputs, as used in mapping names.
    pub fn endpoint_kind(&self) -> &'static str {
        match self {
            PortDirection::Output => "sink",
            PortDirection::Input => "source",
        }
    }
}

impl std::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortDirection::Output => write!(f, "output"),
            PortDirection::Input => write!(f, "input"),
        }
    }
}

bitflags! {
    /// A set of directions, for objects that can be used for playback, capture or both.
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        /// Usable for playback.
        const OUTPUT = 0b01;
        /// Usable for capture.
        const INPUT = 0b10;
    }
}

impl From<PortDirection> for Directions {
    fn from(dir: PortDirection) -> Self {
        match dir {
            PortDirection::Output => Directions::OUTPUT,
            PortDirection::Input => Directions::INPUT,
        }
    }
}

/// Port availability status.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PortAvailable {
    /// This port does not support jack detection.
    #[default]
    Unknown = 0,
    /// This port is not available, likely because the jack is not plugged in.
    No = 1,
    /// This port is available, likely because the jack is plugged in.
    Yes = 2,
}
