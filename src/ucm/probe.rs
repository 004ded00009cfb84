//! Checks each profile against the hardware, and discovers which jacks can be detected.

use std::time;

use crate::types::{ChannelMap, PortDirection, SampleSpec};

use super::error::{BoxError, UcmError};
use super::manager::{execute, UseCaseCommand, UseCaseManager, VerbRestore};
use super::mapping::{Mapping, MappingId, ProfileSet};
use super::model::{Jack, Verb, VerbId};
use super::UcmConfig;

/// Server defaults used to open endpoints while probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// The sample spec to open endpoints with. The channel count is replaced by each mapping's.
    pub sample_spec: SampleSpec,

    /// The length of one fragment (period).
    pub fragment_size: time::Duration,

    /// The number of fragments in the buffer.
    pub n_fragments: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sample_spec: SampleSpec::default(),
            fragment_size: time::Duration::from_millis(25),
            n_fragments: 4,
        }
    }
}

/// Parameters for opening an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmRequest<'a> {
    /// The PCM string, e.g. "hw:0,0".
    pub device_string: &'a str,

    /// Playback for sinks, capture for sources.
    pub direction: PortDirection,

    /// The sample spec, with the mapping's channel count.
    pub sample_spec: SampleSpec,

    /// The mapping's channel map.
    pub channel_map: &'a ChannelMap,

    /// The period size, in frames.
    pub period_frames: u64,

    /// The buffer size, in frames.
    pub buffer_frames: u64,
}

impl<'a> PcmRequest<'a> {
    fn new(mapping: &'a Mapping, config: &ProbeConfig) -> Self {
        let sample_spec = config
            .sample_spec
            .with_channels(mapping.channel_map.num_channels());
        let period_frames = sample_spec.duration_to_frames(config.fragment_size);

        Self {
            device_string: &mapping.device_string,
            direction: mapping.direction,
            sample_spec,
            channel_map: &mapping.channel_map,
            period_frames,
            buffer_frames: period_frames * config.n_fragments as u64,
        }
    }
}

/// Access to the sound card hardware, used to check that endpoints can actually be opened.
pub trait Hardware {
    /// An open endpoint. Dropping it closes the endpoint.
    type Pcm;

    /// Opens an endpoint for playback or capture.
    fn open_pcm(&mut self, request: &PcmRequest<'_>) -> Result<Self::Pcm, BoxError>;

    /// Looks for a jack detection control on the mixer belonging to an open endpoint.
    fn find_jack_control(&mut self, pcm: &Self::Pcm, control_name: &str)
        -> Result<bool, BoxError>;
}

impl<M: UseCaseManager> UcmConfig<M> {
    /// Builds one profile per verb, then probes each against the hardware.
    ///
    /// Profiles whose verb can't be selected, or whose endpoints can't be opened, are removed,
    /// along with mappings that aren't part of any remaining profile. Jacks of the devices in
    /// usable profiles learn whether the hardware has a detection control for them. The
    /// inactive verb is selected afterwards.
    pub fn add_profile_set<H: Hardware>(&mut self, hw: &mut H, config: &ProbeConfig) -> &ProfileSet {
        let Self {
            manager,
            verbs,
            jacks,
            profile_set,
            ..
        } = self;

        *profile_set = ProfileSet::default();
        for dev in verbs.iter_mut().flat_map(|v| v.devices.iter_mut()) {
            for ep in [dev.playback.as_mut(), dev.capture.as_mut()]
                .into_iter()
                .flatten()
            {
                ep.mapping = None;
            }
        }
        for jack in jacks.iter_mut() {
            jack.has_control = false;
        }

        for (idx, verb) in verbs.iter_mut().enumerate() {
            // Duplicates are logged when rejected.
            let _ = profile_set.create_profile(VerbId(idx), verb, jacks);
        }

        {
            let mut restore = VerbRestore::new(manager);
            for idx in 0..profile_set.profiles.len() {
                let supported =
                    probe_profile(restore.manager(), hw, config, profile_set, idx, verbs, jacks);

                let profile = &mut profile_set.profiles[idx];
                log::debug!(
                    "profile {} is {}",
                    profile.name,
                    if supported { "supported" } else { "unsupported" }
                );
                profile.supported = supported;
            }
        }

        profile_set.drop_unsupported(verbs);
        profile_set.probed = true;
        profile_set
    }
}

fn probe_profile<M: UseCaseManager + ?Sized, H: Hardware>(
    manager: &mut M,
    hw: &mut H,
    config: &ProbeConfig,
    profile_set: &mut ProfileSet,
    idx: usize,
    verbs: &[Verb],
    jacks: &mut [Jack],
) -> bool {
    let profile = &profile_set.profiles[idx];
    if execute(manager, UseCaseCommand::SetVerb(&profile.name)).is_err() {
        return false;
    }

    let mut opened: Vec<(MappingId, H::Pcm)> = Vec::new();
    for id in profile.mappings() {
        match open_mapping(hw, config, profile_set.mapping(id)) {
            Ok(pcm) => opened.push((id, pcm)),
            Err(err) => {
                log::info!("profile {}: {}", profile.name, err);
                return false;
            }
        }
    }

    for (id, pcm) in &opened {
        probe_jacks(hw, pcm, profile_set.mapping(*id), verbs, jacks);
    }

    for (id, _) in &opened {
        profile_set.mappings[id.0].supported += 1;
    }

    true
}

fn open_mapping<H: Hardware>(
    hw: &mut H,
    config: &ProbeConfig,
    mapping: &Mapping,
) -> Result<H::Pcm, UcmError> {
    let request = PcmRequest::new(mapping, config);
    log::debug!(
        "opening {} for {} with {} channels",
        mapping.device_string,
        mapping.direction,
        request.sample_spec.channels
    );

    hw.open_pcm(&request).map_err(|source| UcmError::Open {
        device_string: mapping.device_string.clone(),
        source,
    })
}

fn probe_jacks<H: Hardware>(
    hw: &mut H,
    pcm: &H::Pcm,
    mapping: &Mapping,
    verbs: &[Verb],
    jacks: &mut [Jack],
) {
    let verb = &verbs[mapping.verb.0];
    for dev_id in &mapping.devices {
        let Some(jack_id) = verb.device(*dev_id).jack else {
            continue;
        };

        let jack = &mut jacks[jack_id.0];
        match hw.find_jack_control(pcm, &jack.control_name) {
            Ok(found) => {
                log::info!(
                    "jack control {} {}",
                    jack.control_name,
                    if found { "found" } else { "not found" }
                );
                // Any mapping that sees the control within one pass is enough.
                jack.has_control |= found;
            }
            Err(err) => log::error!("failed to probe mixer for {}: {}", mapping.name, err),
        }
    }
}
