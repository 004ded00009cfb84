//! Verbs, devices, modifiers and jacks.

use crate::types::{Directions, PortAvailable, PortDirection, Prop, Props};

use super::mapping::MappingId;

/// Identifies a verb within a [`super::UcmConfig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerbId(pub(crate) usize);

/// Identifies a device within its [`Verb`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub(crate) usize);

/// Identifies a jack within a [`super::UcmConfig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JackId(pub(crate) usize);

impl VerbId {
    /// The position of the verb in load order.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl DeviceId {
    /// The position of the device in its verb's device list.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A physical jack, shared by every device with the same name across verbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jack {
    /// The name of the jack, which is the name of the device that uses it.
    pub name: String,
    /// The mixer control reporting the jack state, e.g. "Headphones Jack".
    pub control_name: String,
    /// Whether the control was found on the hardware during probing.
    pub has_control: bool,
    /// The availability to report while the jack is plugged in.
    pub state_plugged: PortAvailable,
    /// The availability to report while the jack is unplugged.
    pub state_unplugged: PortAvailable,
}

impl Jack {
    pub(crate) fn new(name: &str, control_name: Option<&str>) -> Self {
        Self {
            name: name.to_owned(),
            control_name: control_name
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{} Jack", name)),
            has_control: false,
            state_plugged: PortAvailable::Yes,
            state_unplugged: PortAvailable::No,
        }
    }
}

/// Returns the jack named `name`, creating it the first time it is referenced.
pub(crate) fn get_or_insert_jack(
    jacks: &mut Vec<Jack>,
    name: &str,
    control_name: Option<&str>,
) -> JackId {
    if let Some(idx) = jacks.iter().position(|j| j.name == name) {
        return JackId(idx);
    }

    jacks.push(Jack::new(name, control_name));
    JackId(jacks.len() - 1)
}

/// The playback or capture side of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoint {
    /// Channel count, always non-zero.
    pub channels: u8,
    /// Priority used to rank ports and mappings.
    pub priority: u32,
    /// The PCM string, e.g. "hw:0,0". Inherited from the verb if the device doesn't set one.
    pub pcm: Option<String>,
    /// The mixer control for volume, if any.
    pub volume: Option<String>,
    pub(crate) mapping: Option<MappingId>,
}

impl DeviceEndpoint {
    /// The mapping this side of the device was grouped into, if it survived probing.
    pub fn mapping(&self) -> Option<MappingId> {
        self.mapping
    }
}

/// A UCM device: a physical or logical endpoint usable within a verb.
#[derive(Debug, Clone)]
pub struct Device {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) props: Props,
    pub(crate) playback: Option<DeviceEndpoint>,
    pub(crate) capture: Option<DeviceEndpoint>,
    pub(crate) conflicting: Vec<String>,
    pub(crate) supported: Vec<String>,
    pub(crate) conflicting_ids: Vec<DeviceId>,
    pub(crate) supported_ids: Vec<DeviceId>,
    pub(crate) jack: Option<JackId>,
}

impl Device {
    /// The UCM name of the device.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human readable description. Falls back to the name.
    pub fn description(&self) -> &str {
        if self.description.is_empty() {
            &self.name
        } else {
            &self.description
        }
    }

    /// All properties read for the device.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The playback or capture side of the device.
    pub fn endpoint(&self, dir: PortDirection) -> Option<&DeviceEndpoint> {
        match dir {
            PortDirection::Output => self.playback.as_ref(),
            PortDirection::Input => self.capture.as_ref(),
        }
    }

    pub(crate) fn endpoint_mut(&mut self, dir: PortDirection) -> Option<&mut DeviceEndpoint> {
        match dir {
            PortDirection::Output => self.playback.as_mut(),
            PortDirection::Input => self.capture.as_mut(),
        }
    }

    /// The directions the device can be used in.
    pub fn directions(&self) -> Directions {
        let mut dirs = Directions::empty();
        if self.playback.is_some() {
            dirs |= Directions::OUTPUT;
        }
        if self.capture.is_some() {
            dirs |= Directions::INPUT;
        }
        dirs
    }

    /// The priority in the given direction, or 0 if the device isn't usable in it.
    pub fn priority(&self, dir: PortDirection) -> u32 {
        self.endpoint(dir).map_or(0, |ep| ep.priority)
    }

    /// Names of devices that can't be active at the same time as this one.
    pub fn conflicting_devices(&self) -> &[String] {
        &self.conflicting
    }

    /// Names of devices that can be active at the same time as this one.
    pub fn supported_devices(&self) -> &[String] {
        &self.supported
    }

    /// Whether `other` is in the conflicting device list.
    pub fn conflicts_with(&self, other: DeviceId) -> bool {
        self.conflicting_ids.contains(&other)
    }

    /// Whether `other` is in the supported device list.
    pub fn supports(&self, other: DeviceId) -> bool {
        self.supported_ids.contains(&other)
    }

    /// The jack used by the device, assigned when profiles are built.
    pub fn jack(&self) -> Option<JackId> {
        self.jack
    }

    /// The media roles served in the given direction, space separated.
    pub fn roles(&self, dir: PortDirection) -> Option<&str> {
        self.props.get(roles_prop(dir))
    }

    /// The mapping the device was grouped into for the given direction.
    pub fn mapping(&self, dir: PortDirection) -> Option<MappingId> {
        self.endpoint(dir).and_then(|ep| ep.mapping)
    }
}

pub(crate) fn roles_prop(dir: PortDirection) -> Prop {
    match dir {
        PortDirection::Output => Prop::UcmPlaybackRoles,
        PortDirection::Input => Prop::UcmCaptureRoles,
    }
}

pub(crate) fn pcm_prop(dir: PortDirection) -> Prop {
    match dir {
        PortDirection::Output => Prop::UcmSink,
        PortDirection::Input => Prop::UcmSource,
    }
}

/// A UCM modifier: an auxiliary behavior tied to a media role and a direction.
#[derive(Debug, Clone)]
pub struct Modifier {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) props: Props,
    pub(crate) direction: Option<PortDirection>,
    pub(crate) media_role: Option<String>,
    pub(crate) conflicting: Vec<String>,
    pub(crate) supported: Vec<String>,
    pub(crate) supported_ids: Vec<DeviceId>,
    pub(crate) enabled_counter: u32,
}

impl Modifier {
    /// The UCM name of the modifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// All properties read for the modifier.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The stream direction the modifier applies to. `None` if it couldn't be derived from the
    /// modifier's name.
    pub fn direction(&self) -> Option<PortDirection> {
        self.direction
    }

    /// The media role the modifier is meant for, e.g. "music" for "PlayMusic".
    pub fn media_role(&self) -> Option<&str> {
        self.media_role.as_deref()
    }

    /// Names of devices the modifier conflicts with.
    pub fn conflicting_devices(&self) -> &[String] {
        &self.conflicting
    }

    /// Names of devices the modifier applies to.
    pub fn supported_devices(&self) -> &[String] {
        &self.supported
    }

    /// The number of running streams that hold the modifier enabled.
    pub fn enabled_count(&self) -> u32 {
        self.enabled_counter
    }

    /// Whether at least one stream holds the modifier enabled.
    pub fn is_active(&self) -> bool {
        self.enabled_counter > 0
    }
}

/// A UCM verb: one operating mode of the card.
#[derive(Debug, Clone)]
pub struct Verb {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) props: Props,
    pub(crate) devices: Vec<Device>,
    pub(crate) modifiers: Vec<Modifier>,
}

impl Verb {
    pub(crate) fn new(name: &str, description: Option<&str>) -> Self {
        let mut props = Props::new();
        props.set(Prop::UcmName, name);
        if let Some(desc) = description {
            props.set(Prop::UcmDescription, desc);
        }

        Self {
            name: name.to_owned(),
            description: description.unwrap_or_default().to_owned(),
            props,
            devices: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// The UCM name of the verb.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Verb-level properties, such as the default PCMs.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The devices of the verb, in the order the use case manager lists them.
    pub fn devices(&self) -> impl Iterator<Item = (DeviceId, &Device)> + '_ {
        self.devices
            .iter()
            .enumerate()
            .map(|(idx, dev)| (DeviceId(idx), dev))
    }

    /// The modifiers of the verb, in the order the use case manager lists them.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Looks up a device by ID.
    ///
    /// Panics if the ID belongs to a different verb with more devices.
    pub fn device(&self, id: DeviceId) -> &Device {
        &self.devices[id.0]
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> &mut Device {
        &mut self.devices[id.0]
    }

    /// Finds a device by its exact name.
    pub fn device_id(&self, name: &str) -> Option<DeviceId> {
        self.devices
            .iter()
            .position(|dev| dev.name == name)
            .map(DeviceId)
    }

    /// Finds a modifier by its exact name.
    pub fn modifier(&self, name: &str) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }
}
