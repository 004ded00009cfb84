//! User-selectable ports, one per valid device combination.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::types::{Directions, PortDirection};

use super::combination::combinations;
use super::model::{DeviceId, Verb};

/// A combination of devices that can be selected together, in one or both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// The device names joined by `+`.
    pub name: String,

    /// The device description for single-device ports, or a summary for combinations.
    pub description: String,

    /// The directions the port was built for.
    pub directions: Directions,

    /// The sum of the priorities of the devices, in the direction the port was last built for.
    pub priority: u32,

    /// The names of the profiles the port is valid under.
    pub profiles: BTreeSet<String>,
}

impl Port {
    /// The names of the devices that make up the port.
    pub fn devices(&self) -> impl Iterator<Item = &str> {
        self.name.split('+')
    }

    /// Whether the device is part of the port.
    pub fn contains_device(&self, device: &str) -> bool {
        port_contains(&self.name, device)
    }
}

/// Returns true if `device` is one of the `+`-separated names in `port_name`.
pub fn port_contains(port_name: &str, device: &str) -> bool {
    port_name.split('+').any(|d| d == device)
}

/// A set of ports, keyed by name.
///
/// Identical combinations built for different profiles or directions share one entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PortSet(BTreeMap<String, Port>);

impl PortSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a port by name.
    pub fn get(&self, name: &str) -> Option<&Port> {
        self.0.get(name)
    }

    /// The number of ports in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the ports in name order.
    pub fn iter(&self) -> btree_map::Values<'_, String, Port> {
        self.0.values()
    }

    /// The names of the ports, in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Adds one port for each valid combination of `candidates`.
    pub(crate) fn add_combinations(
        &mut self,
        verb: &Verb,
        candidates: &[DeviceId],
        dir: PortDirection,
        profile: Option<&str>,
    ) {
        for combo in combinations(verb, candidates) {
            self.add_combination(verb, &combo, dir, profile);
        }
    }

    /// Adds the port for a single combination, or updates it if it already exists.
    pub(crate) fn add_combination(
        &mut self,
        verb: &Verb,
        combo: &[DeviceId],
        dir: PortDirection,
        profile: Option<&str>,
    ) -> &Port {
        let devices: Vec<_> = combo.iter().map(|id| verb.device(*id)).collect();

        let names: Vec<_> = devices.iter().map(|d| d.name()).collect();
        let name = names.join("+");
        let priority = devices
            .iter()
            .fold(0u32, |sum, d| sum.saturating_add(d.priority(dir)));

        let port = self.0.entry(name.clone()).or_insert_with(|| {
            let description = match devices.as_slice() {
                [single] => single.description().to_owned(),
                _ => format!("Combination port for {}", names.join(",")),
            };

            log::debug!("add port {}: {}", name, description);
            Port {
                name,
                description,
                directions: Directions::empty(),
                priority: 0,
                profiles: BTreeSet::new(),
            }
        });

        port.priority = priority;
        port.directions |= dir.into();
        log::debug!(
            "port {} direction {}, priority {}",
            port.name,
            dir,
            priority
        );

        if let Some(profile) = profile {
            log::debug!("adding port {} to profile {}", port.name, profile);
            port.profiles.insert(profile.to_owned());
        }

        port
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a Port;
    type IntoIter = btree_map::Values<'a, String, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.values()
    }
}
