//! Fixtures shared by the unit tests: an in-memory use case manager, fake hardware, and
//! builders for hand-made verbs.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::types::{ChannelMap, PortDirection, Prop, Props};

use super::error::BoxError;
use super::manager::{identifier, UseCaseCommand, UseCaseEntry, UseCaseManager};
use super::mapping::Mapping;
use super::model::{pcm_prop, Device, DeviceEndpoint, Verb, VerbId};
use super::probe::{Hardware, PcmRequest};

/// A device or modifier in a [`MemoryUseCaseManager`].
#[derive(Debug, Default)]
pub(crate) struct MemObject {
    name: String,
    description: String,
    values: BTreeMap<String, String>,
    conflicting: Vec<String>,
    supported: Vec<String>,
}

impl MemObject {
    pub(crate) fn value(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    pub(crate) fn conflicting(&mut self, names: &[&str]) -> &mut Self {
        self.conflicting.extend(names.iter().map(|s| s.to_string()));
        self
    }

    pub(crate) fn supported(&mut self, names: &[&str]) -> &mut Self {
        self.supported.extend(names.iter().map(|s| s.to_string()));
        self
    }
}

/// A verb in a [`MemoryUseCaseManager`].
#[derive(Debug, Default)]
pub(crate) struct MemVerb {
    name: String,
    description: String,
    values: BTreeMap<String, String>,
    devices: Vec<MemObject>,
    modifiers: Vec<MemObject>,
}

impl MemVerb {
    pub(crate) fn value(&mut self, key: &str, value: &str) -> &mut Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    pub(crate) fn device(
        &mut self,
        name: &str,
        description: &str,
        f: impl FnOnce(&mut MemObject),
    ) -> &mut Self {
        self.devices.push(new_object(name, description, f));
        self
    }

    pub(crate) fn modifier(
        &mut self,
        name: &str,
        description: &str,
        f: impl FnOnce(&mut MemObject),
    ) -> &mut Self {
        self.modifiers.push(new_object(name, description, f));
        self
    }

    fn object(&self, name: &str) -> Option<&MemObject> {
        self.devices
            .iter()
            .chain(self.modifiers.iter())
            .find(|o| o.name == name)
    }
}

fn new_object(name: &str, description: &str, f: impl FnOnce(&mut MemObject)) -> MemObject {
    let mut obj = MemObject {
        name: name.to_owned(),
        description: description.to_owned(),
        ..Default::default()
    };

    f(&mut obj);
    obj
}

fn entry(name: &str, description: &str) -> UseCaseEntry {
    if description.is_empty() {
        UseCaseEntry::bare(name)
    } else {
        UseCaseEntry::new(name, description)
    }
}

/// A use case manager backed by in-memory verbs.
///
/// Every command is appended to `log`, whether it succeeds or not. Commands whose formatted
/// form is in `failing` are rejected.
#[derive(Debug, Default)]
pub(crate) struct MemoryUseCaseManager {
    verbs: Vec<MemVerb>,
    current: Option<usize>,
    pub(crate) log: Vec<String>,
    pub(crate) failing: BTreeSet<String>,
}

impl MemoryUseCaseManager {
    pub(crate) fn verb(&mut self, name: &str, description: &str) -> &mut MemVerb {
        self.verbs.push(MemVerb {
            name: name.to_owned(),
            description: description.to_owned(),
            ..Default::default()
        });

        self.verbs.last_mut().unwrap()
    }

    /// Makes a command fail, e.g. `_verb=HiFi`.
    pub(crate) fn fail(&mut self, command: &str) {
        self.failing.insert(command.to_owned());
    }

    fn current(&self) -> Option<&MemVerb> {
        self.current.map(|idx| &self.verbs[idx])
    }
}

impl UseCaseManager for MemoryUseCaseManager {
    fn get_value(&self, id: &str) -> Option<String> {
        let id = id.strip_prefix('=')?;
        if let Some((key, verb)) = id.split_once("//") {
            let verb = self.verbs.iter().find(|v| v.name == verb)?;
            return verb.values.get(key).cloned();
        }

        let (key, name) = id.split_once('/')?;
        self.current()?.object(name)?.values.get(key).cloned()
    }

    fn get_list(&self, id: &str) -> Option<Vec<UseCaseEntry>> {
        let names = |list: &[String]| -> Vec<UseCaseEntry> {
            list.iter().map(UseCaseEntry::bare).collect()
        };
        let objects = |list: &[MemObject]| -> Vec<UseCaseEntry> {
            list.iter()
                .map(|o| entry(&o.name, &o.description))
                .collect()
        };

        match id {
            identifier::VERBS => Some(
                self.verbs
                    .iter()
                    .map(|v| entry(&v.name, &v.description))
                    .collect(),
            ),
            identifier::DEVICES => Some(objects(&self.current()?.devices)),
            identifier::MODIFIERS => Some(objects(&self.current()?.modifiers)),
            _ => {
                if let Some(name) = id.strip_prefix("_conflictingdevs/") {
                    Some(names(&self.current()?.object(name)?.conflicting))
                } else if let Some(name) = id.strip_prefix("_supporteddevs/") {
                    Some(names(&self.current()?.object(name)?.supported))
                } else {
                    None
                }
            }
        }
    }

    fn execute(&mut self, command: UseCaseCommand<'_>) -> Result<(), BoxError> {
        let formatted = command.to_string();
        self.log.push(formatted.clone());
        if self.failing.contains(&formatted) {
            return Err(format!("{} rejected", formatted).into());
        }

        if let UseCaseCommand::SetVerb(name) = command {
            self.current = self.verbs.iter().position(|v| v.name == name);
        }

        Ok(())
    }
}

/// Hardware that opens any endpoint not listed in `failing`, and reports the jack controls in
/// `jack_controls`.
#[derive(Debug, Default)]
pub(crate) struct FakeHardware {
    pub(crate) failing: BTreeSet<String>,
    pub(crate) jack_controls: BTreeSet<String>,
    pub(crate) mixer_failing: bool,
    events: Rc<RefCell<Vec<String>>>,
}

impl FakeHardware {
    /// Opens, failed opens, jack lookups and closes, in order.
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }
}

#[derive(Debug)]
pub(crate) struct FakePcm {
    device_string: String,
    events: Rc<RefCell<Vec<String>>>,
}

impl Drop for FakePcm {
    fn drop(&mut self) {
        self.events
            .borrow_mut()
            .push(format!("close {}", self.device_string));
    }
}

impl Hardware for FakeHardware {
    type Pcm = FakePcm;

    fn open_pcm(&mut self, request: &PcmRequest<'_>) -> Result<FakePcm, BoxError> {
        let kind = request.direction.endpoint_kind();
        if self.failing.contains(request.device_string) {
            self.events
                .borrow_mut()
                .push(format!("fail {} {}", kind, request.device_string));
            return Err(format!("no such device: {}", request.device_string).into());
        }

        self.events.borrow_mut().push(format!(
            "open {} {} {}ch",
            kind,
            request.device_string,
            request.channel_map.num_channels()
        ));

        Ok(FakePcm {
            device_string: request.device_string.to_owned(),
            events: self.events.clone(),
        })
    }

    fn find_jack_control(&mut self, pcm: &FakePcm, control_name: &str) -> Result<bool, BoxError> {
        if self.mixer_failing {
            return Err("no mixer".into());
        }

        self.events
            .borrow_mut()
            .push(format!("jack {} {}", pcm.device_string, control_name));
        Ok(self.jack_controls.contains(control_name))
    }
}

/// A verb named "HiFi" with the given devices. Relationships aren't normalized.
pub(crate) fn test_verb(devices: Vec<Device>) -> Verb {
    let mut verb = Verb::new("HiFi", Some("Play HiFi quality music"));
    verb.devices = devices;
    verb
}

fn test_device(name: &str) -> Device {
    let mut props = Props::new();
    props.set(Prop::UcmName, name);
    props.set(Prop::UcmDescription, format!("{} device", name));

    Device {
        name: name.to_owned(),
        description: format!("{} device", name),
        props,
        playback: None,
        capture: None,
        conflicting: Vec::new(),
        supported: Vec::new(),
        conflicting_ids: Vec::new(),
        supported_ids: Vec::new(),
        jack: None,
    }
}

fn endpoint(pcm: &str, priority: u32) -> DeviceEndpoint {
    DeviceEndpoint {
        channels: 2,
        priority,
        pcm: Some(pcm.to_owned()),
        volume: None,
        mapping: None,
    }
}

/// A stereo playback device on hw:0,0.
pub(crate) fn playback_device(name: &str, priority: u32) -> Device {
    let mut dev = test_device(name);
    dev.props.set(Prop::UcmSink, "hw:0,0");
    dev.playback = Some(endpoint("hw:0,0", priority));
    dev
}

/// A stereo capture device on hw:0,0.
pub(crate) fn capture_device(name: &str, priority: u32) -> Device {
    let mut dev = test_device(name);
    dev.props.set(Prop::UcmSource, "hw:0,0");
    dev.capture = Some(endpoint("hw:0,0", priority));
    dev
}

/// A stereo device with both directions on hw:0,0.
pub(crate) fn duplex_device(name: &str, play_priority: u32, capture_priority: u32) -> Device {
    let mut dev = playback_device(name, play_priority);
    dev.props.set(Prop::UcmSource, "hw:0,0");
    dev.capture = Some(endpoint("hw:0,0", capture_priority));
    dev
}

/// An empty mapping in the first verb.
pub(crate) fn test_mapping(device_string: &str, direction: PortDirection) -> Mapping {
    Mapping {
        name: format!(
            "Mapping HiFi: {}: {}",
            device_string,
            direction.endpoint_kind()
        ),
        verb: VerbId(0),
        device_string: device_string.to_owned(),
        direction,
        channel_map: ChannelMap::empty(),
        priority: 0,
        description: String::new(),
        devices: Vec::new(),
        supported: 0,
    }
}

impl Device {
    pub(crate) fn with_conflicting(mut self, names: &[&str]) -> Self {
        self.conflicting = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn with_supported(mut self, names: &[&str]) -> Self {
        self.supported = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub(crate) fn with_channels(mut self, channels: u8) -> Self {
        for ep in [self.playback.as_mut(), self.capture.as_mut()]
            .into_iter()
            .flatten()
        {
            ep.channels = channels;
        }
        self
    }

    pub(crate) fn with_pcm(mut self, pcm: &str) -> Self {
        for dir in [PortDirection::Output, PortDirection::Input] {
            if let Some(ep) = self.endpoint_mut(dir) {
                ep.pcm = Some(pcm.to_owned());
                self.props.set(pcm_prop(dir), pcm);
            }
        }
        self
    }

    pub(crate) fn without_pcm(mut self) -> Self {
        for dir in [PortDirection::Output, PortDirection::Input] {
            if let Some(ep) = self.endpoint_mut(dir) {
                ep.pcm = None;
                self.props.remove(pcm_prop(dir));
            }
        }
        self
    }
}
