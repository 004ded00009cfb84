//! Enumerates the combinations of devices that can be active at the same time.

use super::model::{DeviceId, Verb};

/// Returns true if `candidate` may join `combination`.
///
/// The first device of a combination is always accepted. After that, a device that declares
/// conflicting devices is accepted if none of them is in the combination; a device that declares
/// (at least as many) supported devices is accepted if all of the combination is among them. A
/// device that declares neither can only stand alone.
pub fn is_conformant(verb: &Verb, combination: &[DeviceId], candidate: DeviceId) -> bool {
    let dev = verb.device(candidate);

    log::debug!(
        "check device {} conformance with {} other devices",
        dev.name(),
        combination.len()
    );

    if combination.is_empty() {
        return true;
    }

    if !dev.conflicting.is_empty() {
        if combination.iter().any(|id| dev.conflicts_with(*id)) {
            log::debug!("conflicting device found");
            return false;
        }
    } else if dev.supported.len() >= combination.len() {
        if !combination.iter().all(|id| dev.supports(*id)) {
            log::debug!("supported device not found");
            return false;
        }
    } else {
        log::debug!("{} does not support any other devices", dev.name());
        return false;
    }

    true
}

/// Returns every valid combination of `candidates`, in a fixed order.
///
/// Candidates are tried in the order given. Each combination lists its devices in that order, and
/// a combination is emitted before any of its extensions.
pub fn combinations(verb: &Verb, candidates: &[DeviceId]) -> Vec<Vec<DeviceId>> {
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(candidates.len());
    extend(verb, candidates, &mut current, &mut out);
    out
}

fn extend(
    verb: &Verb,
    candidates: &[DeviceId],
    current: &mut Vec<DeviceId>,
    out: &mut Vec<Vec<DeviceId>>,
) {
    let Some((&first, rest)) = candidates.split_first() else {
        return;
    };

    if is_conformant(verb, current, first) {
        current.push(first);
        out.push(current.clone());
        extend(verb, rest, current, out);
        current.pop();
    }

    extend(verb, rest, current, out);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ucm::{test_util::*, Device};

    fn names(verb: &Verb, combos: &[Vec<DeviceId>]) -> Vec<String> {
        combos
            .iter()
            .map(|c| {
                c.iter()
                    .map(|id| verb.device(*id).name())
                    .collect::<Vec<_>>()
                    .join("+")
            })
            .collect()
    }

    fn all_ids(verb: &Verb) -> Vec<DeviceId> {
        verb.devices().map(|(id, _)| id).collect()
    }

    fn normalized(devices: Vec<Device>) -> Verb {
        let mut verb = test_verb(devices);
        verb.normalize_relationships();
        verb
    }

    #[test]
    fn conflicting_devices_stay_apart() {
        let verb = normalized(vec![
            playback_device("Speaker", 100),
            playback_device("Headphones", 100).with_conflicting(&["Speaker"]),
        ]);

        let combos = combinations(&verb, &all_ids(&verb));
        assert_eq!(names(&verb, &combos), vec!["Speaker", "Headphones"]);
    }

    #[test]
    fn supported_devices_combine() {
        let verb = normalized(vec![
            capture_device("Mic1", 50).with_supported(&["Mic2"]),
            capture_device("Mic2", 50).with_supported(&["Mic1"]),
        ]);

        let combos = combinations(&verb, &all_ids(&verb));
        assert_eq!(names(&verb, &combos), vec!["Mic1", "Mic1+Mic2", "Mic2"]);
    }

    #[test]
    fn isolated_devices_stand_alone() {
        let verb = normalized(vec![
            playback_device("Speaker", 100),
            playback_device("Line", 100),
            playback_device("HDMI", 100),
        ]);

        let combos = combinations(&verb, &all_ids(&verb));
        assert_eq!(names(&verb, &combos), vec!["Speaker", "Line", "HDMI"]);
    }

    #[test]
    fn supported_list_too_short() {
        // Line supports only Speaker, so it can't join Speaker+Headphones.
        let verb = normalized(vec![
            playback_device("Speaker", 100).with_supported(&["Headphones", "Line"]),
            playback_device("Headphones", 100).with_supported(&["Speaker"]),
            playback_device("Line", 100).with_supported(&["Speaker"]),
        ]);

        let combos = combinations(&verb, &all_ids(&verb));
        assert_eq!(
            names(&verb, &combos),
            vec![
                "Speaker",
                "Speaker+Headphones",
                "Speaker+Line",
                "Headphones",
                "Line"
            ]
        );
    }

    #[test]
    fn subset_of_candidates() {
        let verb = normalized(vec![
            playback_device("Speaker", 100).with_supported(&["Headphones"]),
            playback_device("Headphones", 100).with_supported(&["Speaker"]),
        ]);

        let combos = combinations(&verb, &[DeviceId(1)]);
        assert_eq!(names(&verb, &combos), vec!["Headphones"]);
        assert!(combinations(&verb, &[]).is_empty());
    }

    #[test]
    fn valid_and_complete() {
        // A chain of conflicts: A-B, B-C, C-D. D also names a device that doesn't exist.
        let verb = normalized(vec![
            playback_device("A", 1).with_conflicting(&["B"]),
            playback_device("B", 1).with_conflicting(&["C"]),
            playback_device("C", 1).with_conflicting(&["D"]),
            playback_device("D", 1).with_conflicting(&["A-nothing"]),
        ]);
        let ids = all_ids(&verb);
        let combos = combinations(&verb, &ids);

        // Every emitted combination is conflict free.
        for combo in &combos {
            for a in combo {
                for b in combo {
                    assert!(!verb.device(*a).conflicts_with(*b));
                }
            }
        }

        // Every conflict-free subset is emitted.
        let mut expected = 0;
        for mask in 1u32..(1 << ids.len()) {
            let subset: Vec<_> = ids
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| *id)
                .collect();
            let valid = subset
                .iter()
                .all(|a| subset.iter().all(|b| !verb.device(*a).conflicts_with(*b)));
            if valid {
                expected += 1;
                assert!(combos.contains(&subset), "missing {:?}", subset);
            }
        }

        assert_eq!(combos.len(), expected);
    }

    #[test]
    fn deterministic() {
        let devices = vec![
            playback_device("Speaker", 100).with_supported(&["Headphones"]),
            playback_device("Headphones", 100).with_supported(&["Speaker"]),
            playback_device("HDMI", 100).with_conflicting(&["Speaker"]),
        ];

        let a = normalized(devices.clone());
        let b = normalized(devices);
        assert_eq!(
            names(&a, &combinations(&a, &all_ids(&a))),
            names(&b, &combinations(&b, &all_ids(&b)))
        );
    }
}
