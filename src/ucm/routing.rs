//! Switches verbs and devices in response to profile and port changes, and builds the ports
//! presented for a card or endpoint.

use crate::types::{Prop, Props};

use super::manager::{execute, UseCaseCommand, UseCaseManager, VERB_INACTIVE};
use super::mapping::MappingId;
use super::model::VerbId;
use super::port::{port_contains, PortSet};
use super::roles::merge_roles;
use super::UcmConfig;

impl<M: UseCaseManager> UcmConfig<M> {
    /// Switches from the profile `old` to `new`. `None` stands for the inactive verb.
    ///
    /// Does nothing if the two are the same. The active verb is updated even if the switch
    /// fails, so that it always reflects the last requested profile.
    pub fn set_profile(&mut self, new: Option<&str>, old: Option<&str>) -> super::Result<()> {
        if new == old {
            return Ok(());
        }

        let verb = new.unwrap_or(VERB_INACTIVE);
        log::info!("set ucm verb to {}", verb);
        let res = execute(&mut self.manager, UseCaseCommand::SetVerb(verb));

        self.active_verb = self
            .verbs
            .iter()
            .position(|v| v.name == verb)
            .map(VerbId);

        res
    }

    /// Selects a port on a mapping.
    ///
    /// Every device of the mapping that isn't part of the port is disabled, then the devices that
    /// are part of it are enabled. Each phase stops at its first failure, and the first error is
    /// returned.
    pub fn set_port(&mut self, mapping: MappingId, port_name: &str) -> super::Result<()> {
        let m = self.mapping_checked(mapping)?;
        let verb = &self.verbs[m.verb.0];

        let (enable, disable): (Vec<_>, Vec<_>) = m
            .devices
            .iter()
            .map(|id| verb.device(*id).name.as_str())
            .partition(|name| port_contains(port_name, name));

        let mut res = Ok(());
        for name in disable {
            log::debug!("disable ucm device {}", name);
            if let Err(err) = execute(&mut self.manager, UseCaseCommand::DisableDevice(name)) {
                res = Err(err);
                break;
            }
        }

        for name in enable {
            log::debug!("enable ucm device {}", name);
            if let Err(err) = execute(&mut self.manager, UseCaseCommand::EnableDevice(name)) {
                if res.is_ok() {
                    res = Err(err);
                }
                break;
            }
        }

        res
    }

    /// Builds the ports for a single sink or source.
    ///
    /// Sets `device.string` and `device.description` in `props` from the mapping, and merges the
    /// media roles of its devices into `device.intended_roles`.
    pub fn mapping_ports(&self, mapping: MappingId, props: &mut Props) -> super::Result<PortSet> {
        let m = self.mapping_checked(mapping)?;
        let verb = &self.verbs[m.verb.0];

        let mut ports = PortSet::new();
        ports.add_combinations(verb, &m.devices, m.direction, None);

        props.set(Prop::DeviceString, m.device_string.as_str());
        props.set(Prop::DeviceDescription, m.description.as_str());

        for id in &m.devices {
            let roles = verb.device(*id).roles(m.direction);
            if let Some(merged) = merge_roles(props.get(Prop::DeviceIntendedRoles), roles) {
                props.set(Prop::DeviceIntendedRoles, merged);
            }
        }

        log::debug!(
            "ports for {}: device.string {}, roles {}",
            m.name,
            m.device_string,
            props.get(Prop::DeviceIntendedRoles).unwrap_or("(none)")
        );

        Ok(ports)
    }

    /// Builds the ports for the whole card, recording which profiles each port is valid under.
    pub fn card_ports(&self) -> PortSet {
        let mut ports = PortSet::new();
        for profile in &self.profile_set.profiles {
            for id in profile.mappings() {
                let m = self.profile_set.mapping(id);
                ports.add_combinations(
                    &self.verbs[m.verb.0],
                    &m.devices,
                    m.direction,
                    Some(&profile.name),
                );
            }
        }

        ports
    }
}
