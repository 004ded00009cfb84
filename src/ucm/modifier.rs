//! Enables modifiers while streams with matching media roles are running.

use crate::types::PortDirection;

use super::manager::{execute, UseCaseCommand, UseCaseManager};
use super::model::Verb;
use super::UcmConfig;

enum Transition {
    Begin,
    End,
}

impl<M: UseCaseManager> UcmConfig<M> {
    /// Notifies the config that a stream with `role` started on the mapping named `mapping`.
    ///
    /// The first modifier of the active verb with a matching direction and role is considered. If
    /// one of its supported devices belongs to the mapping, its counter is incremented, and the
    /// modifier is enabled when the counter leaves zero. The counter is incremented even if
    /// enabling fails, so that the matching [`UcmConfig::roled_stream_end`] stays balanced.
    pub fn roled_stream_begin(
        &mut self,
        role: &str,
        mapping: &str,
        dir: PortDirection,
    ) -> super::Result<()> {
        self.roled_stream(role, mapping, dir, Transition::Begin)
    }

    /// Notifies the config that a stream started with [`UcmConfig::roled_stream_begin`] ended.
    ///
    /// The modifier is disabled when its counter returns to zero. An end without a matching
    /// begin is ignored.
    pub fn roled_stream_end(
        &mut self,
        role: &str,
        mapping: &str,
        dir: PortDirection,
    ) -> super::Result<()> {
        self.roled_stream(role, mapping, dir, Transition::End)
    }

    fn roled_stream(
        &mut self,
        role: &str,
        mapping: &str,
        dir: PortDirection,
        transition: Transition,
    ) -> super::Result<()> {
        let Some(verb_id) = self.active_verb else {
            return Ok(());
        };

        let verb = &self.verbs[verb_id.0];
        let Some(idx) = verb.modifiers.iter().position(|m| {
            m.direction == Some(dir)
                && m.media_role
                    .as_deref()
                    .map_or(false, |r| r.eq_ignore_ascii_case(role))
        }) else {
            return Ok(());
        };

        if !self.modifier_uses_mapping(verb, idx, mapping, dir) {
            return Ok(());
        }

        let modifier = &mut self.verbs[verb_id.0].modifiers[idx];
        match transition {
            Transition::Begin => {
                let res = if modifier.enabled_counter == 0 {
                    log::info!("enable ucm modifier {}", modifier.name);
                    execute(
                        &mut self.manager,
                        UseCaseCommand::EnableModifier(&modifier.name),
                    )
                } else {
                    Ok(())
                };

                modifier.enabled_counter += 1;
                res
            }
            Transition::End => {
                if modifier.enabled_counter == 0 {
                    log::warn!(
                        "modifier {} ended more streams than it began, ignoring",
                        modifier.name
                    );
                    return Ok(());
                }

                modifier.enabled_counter -= 1;
                if modifier.enabled_counter == 0 {
                    log::info!("disable ucm modifier {}", modifier.name);
                    execute(
                        &mut self.manager,
                        UseCaseCommand::DisableModifier(&modifier.name),
                    )
                } else {
                    Ok(())
                }
            }
        }
    }

    fn modifier_uses_mapping(
        &self,
        verb: &Verb,
        idx: usize,
        mapping: &str,
        dir: PortDirection,
    ) -> bool {
        verb.modifiers[idx].supported_ids.iter().any(|id| {
            verb.device(*id)
                .mapping(dir)
                .and_then(|m| self.profile_set.mappings.get(m.0))
                .map_or(false, |m| m.name == mapping)
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ucm::{test_util::*, ProbeConfig};

    const SINK: &str = "Mapping HiFi: hw:0,0: sink";
    const SOURCE: &str = "Mapping HiFi: hw:0,1: source";

    fn config() -> anyhow::Result<UcmConfig<MemoryUseCaseManager>> {
        let mut mgr = MemoryUseCaseManager::default();
        mgr.verb("HiFi", "")
            .value("PlaybackPCM", "hw:0,0")
            .value("CapturePCM", "hw:0,1")
            .device("Speaker", "", |d| {
                d.value("PlaybackChannels", "2");
            })
            .device("Mic", "", |d| {
                d.value("CaptureChannels", "2");
            })
            .modifier("PlayMusic", "", |m| {
                m.supported(&["Speaker"]);
            })
            .modifier("Playmusic", "", |m| {
                m.supported(&["Speaker"]);
            })
            .modifier("CaptureVoice", "", |m| {
                m.supported(&["Mic"]);
            });

        let mut ucm = UcmConfig::load(mgr)?;
        ucm.add_profile_set(&mut FakeHardware::default(), &ProbeConfig::default());
        ucm.set_profile(Some("HiFi"), None)?;
        ucm.manager_mut().log.clear();
        Ok(ucm)
    }

    fn counter<M: UseCaseManager>(ucm: &UcmConfig<M>, name: &str) -> u32 {
        let (_, verb) = ucm.active_verb().unwrap();
        verb.modifier(name).unwrap().enabled_count()
    }

    #[test_log::test]
    fn balanced_streams() -> anyhow::Result<()> {
        let mut ucm = config()?;

        for _ in 0..3 {
            ucm.roled_stream_begin("Music", SINK, PortDirection::Output)?;
        }
        assert_eq!(counter(&ucm, "PlayMusic"), 3);

        for _ in 0..3 {
            ucm.roled_stream_end("music", SINK, PortDirection::Output)?;
        }
        assert_eq!(counter(&ucm, "PlayMusic"), 0);

        assert_eq!(
            ucm.manager().log,
            vec!["_enamod=PlayMusic", "_dismod=PlayMusic"]
        );

        Ok(())
    }

    #[test]
    fn interleaved_streams_stay_enabled() -> anyhow::Result<()> {
        let mut ucm = config()?;

        ucm.roled_stream_begin("music", SINK, PortDirection::Output)?;
        ucm.roled_stream_begin("music", SINK, PortDirection::Output)?;
        ucm.roled_stream_end("music", SINK, PortDirection::Output)?;
        ucm.roled_stream_begin("music", SINK, PortDirection::Output)?;
        ucm.roled_stream_end("music", SINK, PortDirection::Output)?;

        assert_eq!(counter(&ucm, "PlayMusic"), 1);
        assert!(ucm.active_verb().unwrap().1.modifier("PlayMusic").unwrap().is_active());
        assert_eq!(ucm.manager().log, vec!["_enamod=PlayMusic"]);

        Ok(())
    }

    #[test]
    fn only_matching_streams_count() -> anyhow::Result<()> {
        let mut ucm = config()?;

        // Wrong direction, wrong mapping, unknown role.
        ucm.roled_stream_begin("music", SINK, PortDirection::Input)?;
        ucm.roled_stream_begin("music", SOURCE, PortDirection::Output)?;
        ucm.roled_stream_begin("game", SINK, PortDirection::Output)?;
        assert!(ucm.manager().log.is_empty());

        ucm.roled_stream_begin("voice", SOURCE, PortDirection::Input)?;
        assert_eq!(counter(&ucm, "CaptureVoice"), 1);
        assert_eq!(ucm.manager().log, vec!["_enamod=CaptureVoice"]);

        Ok(())
    }

    #[test]
    fn first_match_wins() -> anyhow::Result<()> {
        let mut ucm = config()?;

        // PlayMusic and Playmusic share a role; only the first one listed is used.
        ucm.roled_stream_begin("music", SINK, PortDirection::Output)?;
        assert_eq!(counter(&ucm, "PlayMusic"), 1);
        assert_eq!(counter(&ucm, "Playmusic"), 0);

        Ok(())
    }

    #[test]
    fn unbalanced_end_is_ignored() -> anyhow::Result<()> {
        let mut ucm = config()?;

        ucm.roled_stream_end("music", SINK, PortDirection::Output)?;
        assert_eq!(counter(&ucm, "PlayMusic"), 0);
        assert!(ucm.manager().log.is_empty());

        Ok(())
    }

    #[test]
    fn no_active_verb() -> anyhow::Result<()> {
        let mut ucm = config()?;
        ucm.set_profile(None, Some("HiFi"))?;
        ucm.manager_mut().log.clear();

        ucm.roled_stream_begin("music", SINK, PortDirection::Output)?;
        ucm.roled_stream_end("music", SINK, PortDirection::Output)?;
        assert!(ucm.manager().log.is_empty());

        Ok(())
    }

    #[test]
    fn failed_enable_still_counts() -> anyhow::Result<()> {
        let mut ucm = config()?;
        ucm.manager_mut().fail("_enamod=PlayMusic");

        assert!(ucm
            .roled_stream_begin("music", SINK, PortDirection::Output)
            .is_err());
        assert_eq!(counter(&ucm, "PlayMusic"), 1);

        ucm.roled_stream_end("music", SINK, PortDirection::Output)?;
        assert_eq!(counter(&ucm, "PlayMusic"), 0);
        assert_eq!(
            ucm.manager().log,
            vec!["_enamod=PlayMusic", "_dismod=PlayMusic"]
        );

        Ok(())
    }

    #[test]
    fn shared_behind_mutex() -> anyhow::Result<()> {
        use std::sync::{Arc, Mutex};

        let ucm = Arc::new(Mutex::new(config()?));
        let threads: Vec<_> = (0..4)
            .map(|_| {
                let ucm = ucm.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let mut ucm = ucm.lock().unwrap();
                        ucm.roled_stream_begin("music", SINK, PortDirection::Output)
                            .unwrap();
                        ucm.roled_stream_end("music", SINK, PortDirection::Output)
                            .unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }

        let ucm = ucm.lock().unwrap();
        assert_eq!(counter(&*ucm, "PlayMusic"), 0);
        assert_eq!(ucm.manager().log.len(), 200);

        Ok(())
    }
}
