//! Reads verbs, devices and modifiers from the use case manager.

use crate::types::{PortDirection, Prop, Props, CHANNELS_MAX};

use super::error::UcmError;
use super::manager::{execute, identifier, UseCaseCommand, UseCaseEntry, UseCaseManager, VerbRestore};
use super::mapping::ProfileSet;
use super::model::{pcm_prop, roles_prop, Device, DeviceEndpoint, Modifier, Verb};
use super::roles::merge_roles;
use super::UcmConfig;

/// The attributes read for every verb, device and modifier, and the properties they are stored
/// under.
const ITEMS: &[(&str, Prop)] = &[
    ("PlaybackPCM", Prop::UcmSink),
    ("CapturePCM", Prop::UcmSource),
    ("PlaybackVolume", Prop::UcmPlaybackVolume),
    ("PlaybackSwitch", Prop::UcmPlaybackSwitch),
    ("PlaybackPriority", Prop::UcmPlaybackPriority),
    ("PlaybackChannels", Prop::UcmPlaybackChannels),
    ("CaptureVolume", Prop::UcmCaptureVolume),
    ("CaptureSwitch", Prop::UcmCaptureSwitch),
    ("CapturePriority", Prop::UcmCapturePriority),
    ("CaptureChannels", Prop::UcmCaptureChannels),
    ("TQ", Prop::UcmQos),
    ("JackControl", Prop::UcmJackControl),
];

/// Fallback priorities for well-known device names.
const DEVICE_PRIORITIES: &[(&str, u32)] = &[
    ("None", 100),
    ("Speaker", 100),
    ("Line", 100),
    ("Headphones", 100),
    ("Headset", 300),
    ("Handset", 200),
    ("Bluetooth", 400),
    ("Earpiece", 100),
    ("SPDIF", 100),
    ("HDMI", 100),
];

const DEFAULT_DEVICE_PRIORITY: u32 = 100;

/// Returns the fallback priority for a device that doesn't declare one.
pub fn device_priority(device_name: &str) -> u32 {
    DEVICE_PRIORITIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(device_name))
        .map_or(DEFAULT_DEVICE_PRIORITY, |(_, prio)| *prio)
}

fn channels_prop(dir: PortDirection) -> Prop {
    match dir {
        PortDirection::Output => Prop::UcmPlaybackChannels,
        PortDirection::Input => Prop::UcmCaptureChannels,
    }
}

fn priority_prop(dir: PortDirection) -> Prop {
    match dir {
        PortDirection::Output => Prop::UcmPlaybackPriority,
        PortDirection::Input => Prop::UcmCapturePriority,
    }
}

fn volume_prop(dir: PortDirection) -> Prop {
    match dir {
        PortDirection::Output => Prop::UcmPlaybackVolume,
        PortDirection::Input => Prop::UcmCaptureVolume,
    }
}

fn pcm_key(dir: PortDirection) -> &'static str {
    match dir {
        PortDirection::Output => "PlaybackPCM",
        PortDirection::Input => "CapturePCM",
    }
}

impl<M: UseCaseManager> UcmConfig<M> {
    /// Loads every verb listed by the use case manager.
    ///
    /// Each verb is selected in turn to read its devices and modifiers, and the inactive verb is
    /// selected afterwards. Verbs that can't be selected are skipped. Fails if no verb could be
    /// read at all.
    pub fn load(mut manager: M) -> Result<Self, UcmError> {
        let entries = manager.get_list(identifier::VERBS).unwrap_or_default();
        if entries.is_empty() {
            log::error!("UCM file does not specify any verbs");
            return Err(UcmError::NoVerbs);
        }

        let mut verbs = Vec::with_capacity(entries.len());
        {
            let mut restore = VerbRestore::new(&mut manager);
            for entry in &entries {
                match read_verb(restore.manager(), entry) {
                    Ok(verb) => verbs.push(verb),
                    Err(err) => log::error!("failed to read verb {}: {}", entry.name, err),
                }
            }
        }

        if verbs.is_empty() {
            return Err(UcmError::NoVerbs);
        }

        Ok(Self {
            manager,
            verbs,
            jacks: Vec::new(),
            active_verb: None,
            profile_set: ProfileSet::default(),
        })
    }
}

fn read_verb<M: UseCaseManager + ?Sized>(
    manager: &mut M,
    entry: &UseCaseEntry,
) -> Result<Verb, UcmError> {
    execute(manager, UseCaseCommand::SetVerb(&entry.name))?;

    let mut verb = Verb::new(&entry.name, entry.description.as_deref());
    for (key, prop) in ITEMS {
        if let Some(value) = manager.get_value(&identifier::verb_value(key, &entry.name)) {
            log::info!("got {} for verb {}: {}", key, entry.name, value);
            verb.props.set(*prop, value);
        }
    }

    for dev_entry in manager.get_list(identifier::DEVICES).unwrap_or_default() {
        if let Some(dev) = read_device(manager, &verb, &dev_entry) {
            verb.devices.push(dev);
        }
    }

    verb.normalize_relationships();

    for mod_entry in manager.get_list(identifier::MODIFIERS).unwrap_or_default() {
        let modifier = read_modifier(manager, &mod_entry);
        assign_media_role(&mut verb, &modifier);
        verb.modifiers.push(modifier);
    }

    verb.resolve_relationships();
    log::debug!(
        "verb {}: {} devices, {} modifiers",
        verb.name,
        verb.devices.len(),
        verb.modifiers.len()
    );

    Ok(verb)
}

fn read_props<M: UseCaseManager + ?Sized>(manager: &M, entry: &UseCaseEntry) -> Props {
    let mut props = Props::new();
    props.set(Prop::UcmName, entry.name.as_str());
    if let Some(desc) = &entry.description {
        props.set(Prop::UcmDescription, desc.as_str());
    }

    for (key, prop) in ITEMS {
        if let Some(value) = manager.get_value(&identifier::value(key, &entry.name)) {
            log::info!("got {} for {}: {}", key, entry.name, value);
            props.set(*prop, value);
        }
    }

    props
}

fn read_names<M: UseCaseManager + ?Sized>(manager: &M, identifier: &str) -> Vec<String> {
    match manager.get_list(identifier) {
        Some(list) => list.into_iter().map(|e| e.name).collect(),
        None => {
            log::debug!("no list for {}", identifier);
            Vec::new()
        }
    }
}

/// Parses a channel count. Anything that isn't a number below [`CHANNELS_MAX`] counts as no
/// channels.
fn parse_channels(value: Option<&str>, dir: PortDirection, device: &str) -> u8 {
    let Some(value) = value else {
        return 0;
    };

    match value.trim().parse::<u8>() {
        Ok(n) if n < CHANNELS_MAX => n,
        _ => {
            log::error!(
                "invalid number of {} channels for device {}: {}",
                dir,
                device,
                value
            );
            0
        }
    }
}

fn parse_priority(value: Option<&str>, dir: PortDirection, device: &str) -> Option<u32> {
    let value = value?;
    match value.trim().parse::<u32>() {
        Ok(0) => None,
        Ok(n) => Some(n),
        Err(_) => {
            log::error!("invalid {} priority for device {}: {}", dir, device, value);
            None
        }
    }
}

fn read_device<M: UseCaseManager + ?Sized>(
    manager: &M,
    verb: &Verb,
    entry: &UseCaseEntry,
) -> Option<Device> {
    let name = &entry.name;
    let mut props = read_props(manager, entry);

    let mut endpoints = [None, None];
    for (slot, dir) in endpoints
        .iter_mut()
        .zip([PortDirection::Output, PortDirection::Input])
    {
        let channels = parse_channels(props.get(channels_prop(dir)), dir, name);
        if channels == 0 {
            continue;
        }

        let pcm = match props.get(pcm_prop(dir)) {
            Some(pcm) => Some(pcm.to_owned()),
            None => match verb.props.get(pcm_prop(dir)) {
                Some(pcm) => {
                    log::info!("device {} inherits {} {} from verb", name, pcm_key(dir), pcm);
                    props.set(pcm_prop(dir), pcm);
                    Some(pcm.to_owned())
                }
                None => {
                    log::error!(
                        "UCM file does not specify {} for device {} in verb {}",
                        pcm_key(dir),
                        name,
                        verb.name
                    );
                    None
                }
            },
        };

        let priority = parse_priority(props.get(priority_prop(dir)), dir, name)
            .unwrap_or_else(|| device_priority(name));

        *slot = Some(DeviceEndpoint {
            channels,
            priority,
            pcm,
            volume: props.get(volume_prop(dir)).map(str::to_owned),
            mapping: None,
        });
    }

    let [playback, capture] = endpoints;
    if playback.is_none() && capture.is_none() {
        log::warn!(
            "device {} in verb {} has neither playback nor capture channels, ignoring",
            name,
            verb.name
        );
        return None;
    }

    let conflicting = read_names(manager, &identifier::conflicting_devices(name));
    let supported = read_names(manager, &identifier::supported_devices(name));
    if conflicting.is_empty() && supported.is_empty() {
        log::info!(
            "device {} declares no conflicting or supported devices, it can only be used alone",
            name
        );
    }

    Some(Device {
        name: name.clone(),
        description: entry.description.clone().unwrap_or_default(),
        props,
        playback,
        capture,
        conflicting,
        supported,
        conflicting_ids: Vec::new(),
        supported_ids: Vec::new(),
        jack: None,
    })
}

/// Derives the direction and media role from a modifier name like "PlayMusic" or
/// "CaptureVoice".
fn modifier_role(name: &str) -> Option<(PortDirection, String)> {
    let (dir, role) = if let Some(role) = name.strip_prefix("Play") {
        (PortDirection::Output, role)
    } else if let Some(role) = name.strip_prefix("Capture") {
        (PortDirection::Input, role)
    } else {
        return None;
    };

    if role.is_empty() {
        return None;
    }

    Some((dir, role.to_ascii_lowercase()))
}

fn read_modifier<M: UseCaseManager + ?Sized>(manager: &M, entry: &UseCaseEntry) -> Modifier {
    let name = &entry.name;
    let mut props = read_props(manager, entry);

    let (direction, media_role) = match modifier_role(name) {
        Some((dir, role)) => {
            props.set(Prop::MediaRole, role.as_str());
            (Some(dir), Some(role))
        }
        None => {
            log::warn!("unknown modifier {}, it won't be enabled for any stream", name);
            (None, None)
        }
    };

    Modifier {
        name: name.clone(),
        description: entry.description.clone().unwrap_or_default(),
        props,
        direction,
        media_role,
        conflicting: read_names(manager, &identifier::conflicting_devices(name)),
        supported: read_names(manager, &identifier::supported_devices(name)),
        supported_ids: Vec::new(),
        enabled_counter: 0,
    }
}

/// Appends the modifier's role to the roles of each supported device that has a PCM in the
/// modifier's direction.
fn assign_media_role(verb: &mut Verb, modifier: &Modifier) {
    let (Some(dir), Some(role)) = (modifier.direction, modifier.media_role.as_deref()) else {
        return;
    };

    for dev_name in &modifier.supported {
        let Some(id) = verb.device_id(dev_name) else {
            continue;
        };

        let dev = verb.device_mut(id);
        if !dev.props.contains(pcm_prop(dir)) {
            continue;
        }

        if let Some(roles) = merge_roles(dev.props.get(roles_prop(dir)), Some(role)) {
            log::debug!("device {} {} roles: {}", dev.name, dir, roles);
            dev.props.set(roles_prop(dir), roles);
        }
    }
}
