//! Makes conflicting and supported device relationships symmetric, and resolves them to
//! [`DeviceId`]s.

use super::model::{Device, DeviceId, Verb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Conflicting,
    Supported,
}

impl Relation {
    fn as_str(&self) -> &'static str {
        match self {
            Relation::Conflicting => "conflicting",
            Relation::Supported => "supported",
        }
    }
}

impl Verb {
    /// Completes the device relationship graph: if A names B as conflicting (or supported), B
    /// names A as well. Must run after every device of the verb has been read.
    ///
    /// Running it again is a no-op.
    pub(crate) fn normalize_relationships(&mut self) {
        for idx in 0..self.devices.len() {
            for relation in [Relation::Conflicting, Relation::Supported] {
                let me = self.devices[idx].name.clone();
                let others = match relation {
                    Relation::Conflicting => self.devices[idx].conflicting.clone(),
                    Relation::Supported => self.devices[idx].supported.clone(),
                };

                for other in &others {
                    self.append_relation(other, &me, relation);
                }
            }
        }

        self.resolve_relationships();
    }

    fn append_relation(&mut self, target: &str, name: &str, relation: Relation) {
        let Some(dev) = self.devices.iter_mut().find(|d| d.name == target) else {
            return;
        };

        let list = match relation {
            Relation::Conflicting => &mut dev.conflicting,
            Relation::Supported => &mut dev.supported,
        };

        if !list.iter().any(|n| n == name) {
            list.push(name.to_owned());
            log::info!(
                "device {} complemented to {}'s {} list",
                name,
                target,
                relation.as_str()
            );
        }
    }

    /// Resolves relationship names to IDs. Names that don't match a device are dropped.
    pub(crate) fn resolve_relationships(&mut self) {
        let resolve = |names: &[String], devices: &[Device]| -> Vec<DeviceId> {
            names
                .iter()
                .filter_map(|n| devices.iter().position(|d| &d.name == n).map(DeviceId))
                .collect()
        };

        let resolved: Vec<_> = self
            .devices
            .iter()
            .map(|d| {
                (
                    resolve(&d.conflicting, &self.devices),
                    resolve(&d.supported, &self.devices),
                )
            })
            .collect();

        for (dev, (conflicting, supported)) in self.devices.iter_mut().zip(resolved) {
            dev.conflicting_ids = conflicting;
            dev.supported_ids = supported;
        }

        let modifier_ids: Vec<_> = self
            .modifiers
            .iter()
            .map(|m| resolve(&m.supported, &self.devices))
            .collect();

        for (m, ids) in self.modifiers.iter_mut().zip(modifier_ids) {
            m.supported_ids = ids;
        }
    }
}
