//! Profiles and the endpoint mappings that group devices sharing a PCM.

use crate::types::{ChannelMap, PortDirection, Prop};

use super::error::UcmError;
use super::model::{get_or_insert_jack, DeviceId, Jack, Verb, VerbId};

/// Identifies a mapping within a [`ProfileSet`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingId(pub(crate) usize);

/// An audio endpoint: one or more devices of a verb that share a PCM and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    /// The unique name, e.g. "Mapping HiFi: hw:0,0: sink".
    pub name: String,

    /// The verb the mapping belongs to.
    pub verb: VerbId,

    /// The PCM string shared by the devices.
    pub device_string: String,

    /// Whether the mapping is a sink or a source.
    pub direction: PortDirection,

    /// The channel map, sized for the device with the fewest channels.
    pub channel_map: ChannelMap,

    /// The highest priority among the devices.
    pub priority: u32,

    /// The device descriptions joined by " + ".
    pub description: String,

    /// The devices grouped into the mapping.
    pub devices: Vec<DeviceId>,

    /// The number of supported profiles the mapping was successfully opened in.
    pub supported: u32,
}

impl Mapping {
    fn new(name: String, verb: VerbId, device_string: &str, direction: PortDirection) -> Self {
        Self {
            name,
            verb,
            device_string: device_string.to_owned(),
            direction,
            channel_map: ChannelMap::empty(),
            priority: 0,
            description: String::new(),
            devices: Vec::new(),
            supported: 0,
        }
    }

    /// Adds a device, reconciling priority (highest wins) and channels (lowest wins).
    fn add_device(&mut self, id: DeviceId, description: &str, channels: u8, priority: u32) {
        if self.devices.is_empty() {
            self.channel_map = ChannelMap::alsa(channels);
        }

        if priority > self.priority {
            self.priority = priority;
        }

        if channels < self.channel_map.num_channels() {
            self.channel_map = ChannelMap::alsa(channels);
        }

        if self.description.is_empty() {
            self.description = description.to_owned();
        } else {
            self.description = format!("{} + {}", self.description, description);
        }

        self.devices.push(id);
    }
}

/// The profile built for one verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// The verb name.
    pub name: String,

    /// The verb description.
    pub description: String,

    /// The profile priority, derived from the verb name.
    pub priority: u32,

    /// The verb the profile selects.
    pub verb: VerbId,

    /// The sinks the profile creates.
    pub output_mappings: Vec<MappingId>,

    /// The sources the profile creates.
    pub input_mappings: Vec<MappingId>,

    /// Whether probing found the profile usable.
    pub supported: bool,
}

impl Profile {
    /// All mappings of the profile, outputs first.
    pub fn mappings(&self) -> impl Iterator<Item = MappingId> + '_ {
        self.output_mappings
            .iter()
            .chain(self.input_mappings.iter())
            .copied()
    }
}

/// All profiles of a card, along with the mappings they own.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    pub(crate) profiles: Vec<Profile>,
    pub(crate) mappings: Vec<Mapping>,
    pub(crate) probed: bool,
}

impl ProfileSet {
    /// The profiles, in verb order.
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Looks up a profile by name.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Iterates over all mappings.
    pub fn mappings(&self) -> impl Iterator<Item = (MappingId, &Mapping)> + '_ {
        self.mappings
            .iter()
            .enumerate()
            .map(|(idx, m)| (MappingId(idx), m))
    }

    /// Looks up a mapping by ID.
    ///
    /// Panics if the ID is from another profile set.
    pub fn mapping(&self, id: MappingId) -> &Mapping {
        &self.mappings[id.0]
    }

    /// Looks up a mapping by name.
    pub fn mapping_by_name(&self, name: &str) -> Option<(MappingId, &Mapping)> {
        self.mappings().find(|(_, m)| m.name == name)
    }

    /// Whether the hardware has been probed.
    pub fn is_probed(&self) -> bool {
        self.probed
    }

    fn get_or_create_mapping(
        &mut self,
        verb: VerbId,
        verb_name: &str,
        device_string: &str,
        dir: PortDirection,
    ) -> (MappingId, bool) {
        let name = format!(
            "Mapping {}: {}: {}",
            verb_name,
            device_string,
            dir.endpoint_kind()
        );

        if let Some(idx) = self.mappings.iter().position(|m| m.name == name) {
            return (MappingId(idx), false);
        }

        self.mappings
            .push(Mapping::new(name, verb, device_string, dir));
        (MappingId(self.mappings.len() - 1), true)
    }

    /// Builds the profile for a verb, grouping its devices into mappings and assigning jacks.
    pub(crate) fn create_profile(
        &mut self,
        verb_id: VerbId,
        verb: &mut Verb,
        jacks: &mut Vec<Jack>,
    ) -> Result<(), UcmError> {
        if self.profile(&verb.name).is_some() {
            log::error!("verb {} already exists", verb.name);
            return Err(UcmError::DuplicateVerb(verb.name.clone()));
        }

        let mut profile = Profile {
            name: verb.name.clone(),
            description: verb.description.clone(),
            priority: profile_priority(&verb.name),
            verb: verb_id,
            output_mappings: Vec::new(),
            input_mappings: Vec::new(),
            supported: true,
        };

        for idx in 0..verb.devices.len() {
            let id = DeviceId(idx);
            if let Err(err) = self.map_device(&mut profile, verb_id, verb, id) {
                log::error!("{}", err);
            }

            let dev = verb.device_mut(id);
            let control = dev.props.get(Prop::UcmJackControl);
            dev.jack = Some(get_or_insert_jack(jacks, &dev.name, control));
        }

        log::debug!(
            "profile {} (priority {}): {} outputs, {} inputs",
            profile.name,
            profile.priority,
            profile.output_mappings.len(),
            profile.input_mappings.len()
        );

        self.profiles.push(profile);
        Ok(())
    }

    fn map_device(
        &mut self,
        profile: &mut Profile,
        verb_id: VerbId,
        verb: &mut Verb,
        id: DeviceId,
    ) -> Result<(), UcmError> {
        let dev = verb.device(id);
        let sides: Vec<_> = [PortDirection::Output, PortDirection::Input]
            .into_iter()
            .filter_map(|dir| {
                let ep = dev.endpoint(dir)?;
                let pcm = ep.pcm.clone()?;
                Some((dir, pcm, ep.channels, ep.priority))
            })
            .collect();

        if sides.is_empty() {
            return Err(UcmError::NoEndpoint {
                verb: verb.name.clone(),
                device: dev.name.clone(),
            });
        }

        let description = dev.description().to_owned();
        for (dir, pcm, channels, priority) in sides {
            let (mapping_id, created) = self.get_or_create_mapping(verb_id, &verb.name, &pcm, dir);
            let mapping = &mut self.mappings[mapping_id.0];
            log::info!("ucm mapping: {} dev {}", mapping.name, verb.device(id).name);

            if created {
                match dir {
                    PortDirection::Output => profile.output_mappings.push(mapping_id),
                    PortDirection::Input => profile.input_mappings.push(mapping_id),
                }
            }

            mapping.add_device(id, &description, channels, priority);
            if let Some(ep) = verb.device_mut(id).endpoint_mut(dir) {
                ep.mapping = Some(mapping_id);
            }
        }

        Ok(())
    }

    /// Removes unsupported profiles, and mappings that weren't opened in any supported profile.
    /// Device references to removed mappings are cleared.
    pub(crate) fn drop_unsupported(&mut self, verbs: &mut [Verb]) {
        self.profiles.retain(|p| {
            if !p.supported {
                log::debug!("removing unsupported profile {}", p.name);
            }
            p.supported
        });

        let mut remap = vec![None; self.mappings.len()];
        let mut kept = Vec::with_capacity(self.mappings.len());
        for (idx, m) in std::mem::take(&mut self.mappings).into_iter().enumerate() {
            if m.supported > 0 {
                remap[idx] = Some(MappingId(kept.len()));
                kept.push(m);
            } else {
                log::debug!("removing unsupported mapping {}", m.name);
            }
        }
        self.mappings = kept;

        let lookup = |id: &MappingId| remap[id.0];
        for p in &mut self.profiles {
            p.output_mappings = p.output_mappings.iter().filter_map(lookup).collect();
            p.input_mappings = p.input_mappings.iter().filter_map(lookup).collect();
        }

        for dev in verbs.iter_mut().flat_map(|v| v.devices.iter_mut()) {
            for ep in [dev.playback.as_mut(), dev.capture.as_mut()].into_iter().flatten() {
                ep.mapping = ep.mapping.and_then(|id| remap[id.0]);
            }
        }
    }
}

/// Profile priorities for well-known verbs. Other verbs get 1000.
const VERB_PRIORITIES: &[(&str, u32)] = &[
    ("Inactive", 0),
    ("HiFi", 8000),
    ("HiFi Low Power", 7000),
    ("Voice", 6000),
    ("Voice Low Power", 5000),
    ("Voice Call", 4000),
    ("Voice Call IP", 4000),
    ("FM Analog Radio", 3000),
    ("FM Digital Radio", 3000),
];

/// Returns the profile priority for a verb. Underscores in the verb name match spaces.
pub fn profile_priority(verb_name: &str) -> u32 {
    let name = verb_name.replace('_', " ");
    VERB_PRIORITIES
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(&name))
        .map_or(1000, |(_, prio)| *prio)
}
