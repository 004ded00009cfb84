//! Defines the [`Props`] type, a key-value map that is used to associate arbitrary properties with
//! verbs, devices, modifiers and endpoints.

use std::collections::BTreeMap;

/// A list of key-value pairs that associate arbitrary properties with an object. Both keys and
/// values are strings, as in a PulseAudio proplist holding text values.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Props(BTreeMap<String, String>);

impl Props {
    /// Creates a new, empty property list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a well-known property in the map.
    ///
    /// If the property already has a value, it will be overwritten with the new one.
    pub fn set(&mut self, prop: Prop, value: impl Into<String>) {
        self.set_str(prop.to_str(), value);
    }

    /// Sets a property in the map.
    ///
    /// If the property already has a value, it will be overwritten with the new one.
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Gets the value of a well-known property.
    ///
    /// If `prop` is not in the map, returns `None`.
    pub fn get(&self, prop: Prop) -> Option<&str> {
        self.get_str(prop.to_str())
    }

    /// Gets a property from the map.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Removes a well-known property from the map, returning its value.
    pub fn remove(&mut self, prop: Prop) -> Option<String> {
        self.0.remove(prop.to_str())
    }

    /// Returns true if the well-known property is set.
    pub fn contains(&self, prop: Prop) -> bool {
        self.0.contains_key(prop.to_str())
    }

    /// Create an Iterator over the properties.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl std::fmt::Debug for Props {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Well-known property list keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum Prop {
    /// For devices: device string in the underlying audio layer's format. E.g. "hw:0,0"
    DeviceString,

    /// For devices: localized human readable device one-line description.
    DeviceDescription,

    /// For devices: intended use. A space separated list of roles (see `media.role`) this device
    /// is particularly well suited for, due to latency, quality or form factor.
    DeviceIntendedRoles,

    /// For streams: logic role of this media. One of the strings "video", "music", "game",
    /// "event", "phone", "animation", "production", "a11y", "test"
    MediaRole,

    /// The UCM name of a verb, device or modifier.
    UcmName,

    /// The UCM description of a verb, device or modifier.
    UcmDescription,

    /// The PCM used for playback. E.g. "hw:0,0"
    UcmSink,

    /// The PCM used for capture. E.g. "hw:0,1"
    UcmSource,

    /// Space separated media roles served by a device's playback side.
    UcmPlaybackRoles,

    /// Mixer control for playback volume.
    UcmPlaybackVolume,

    /// Mixer control for playback mute.
    UcmPlaybackSwitch,

    /// Playback priority, an unsigned integer.
    UcmPlaybackPriority,

    /// Playback channel count, an unsigned integer.
    UcmPlaybackChannels,

    /// Space separated media roles served by a device's capture side.
    UcmCaptureRoles,

    /// Mixer control for capture volume.
    UcmCaptureVolume,

    /// Mixer control for capture mute.
    UcmCaptureSwitch,

    /// Capture priority, an unsigned integer.
    UcmCapturePriority,

    /// Capture channel count, an unsigned integer.
    UcmCaptureChannels,

    /// Quality of service hint ("TQ").
    UcmQos,

    /// Name of the mixer control reporting the device's jack state.
    UcmJackControl,
}

impl Prop {
    /// Returns the property name to use in a property list.
    pub fn to_str(&self) -> &'static str {
        use self::Prop::*;

        match *self {
            DeviceString => "device.string",
            DeviceDescription => "device.description",
            DeviceIntendedRoles => "device.intended_roles",
            MediaRole => "media.role",
            UcmName => "alsa.ucm.name",
            UcmDescription => "alsa.ucm.description",
            UcmSink => "alsa.ucm.sink",
            UcmSource => "alsa.ucm.source",
            UcmPlaybackRoles => "alsa.ucm.playback.roles",
            UcmPlaybackVolume => "alsa.ucm.playback.volume",
            UcmPlaybackSwitch => "alsa.ucm.playback.switch",
            UcmPlaybackPriority => "alsa.ucm.playback.priority",
            UcmPlaybackChannels => "alsa.ucm.playback.channels",
            UcmCaptureRoles => "alsa.ucm.capture.roles",
            UcmCaptureVolume => "alsa.ucm.capture.volume",
            UcmCaptureSwitch => "alsa.ucm.capture.switch",
            UcmCapturePriority => "alsa.ucm.capture.priority",
            UcmCaptureChannels => "alsa.ucm.capture.channels",
            UcmQos => "alsa.ucm.qos",
            UcmJackControl => "alsa.ucm.jack_control",
        }
    }
}
