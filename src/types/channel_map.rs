//! Defines mappings from stream channels to speaker positions.

use std::fmt;

use enum_primitive_derive::Primitive;
use num_traits::FromPrimitive;

use super::CHANNELS_MAX;

/// Channel position labels.
#[allow(missing_docs)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Primitive)]
pub enum ChannelPosition {
    /// No position.
    #[default]
    Mono = 0,
    FrontLeft = 1,
    FrontRight = 2,
    FrontCenter = 3,
    RearCenter = 4,
    RearLeft = 5,
    RearRight = 6,
    Lfe = 7,
    FrontLeftOfCenter = 8,
    FrontRightOfCenter = 9,
    SideLeft = 10,
    SideRight = 11,
    Aux0 = 12,
    Aux1 = 13,
    Aux2 = 14,
    Aux3 = 15,
    Aux4 = 16,
    Aux5 = 17,
    Aux6 = 18,
    Aux7 = 19,
    Aux8 = 20,
    Aux9 = 21,
    Aux10 = 22,
    Aux11 = 23,
    Aux12 = 24,
    Aux13 = 25,
    Aux14 = 26,
    Aux15 = 27,
    Aux16 = 28,
    Aux17 = 29,
    Aux18 = 30,
    Aux19 = 31,
    Aux20 = 32,
    Aux21 = 33,
    Aux22 = 34,
    Aux23 = 35,
    Aux24 = 36,
    Aux25 = 37,
    Aux26 = 38,
    Aux27 = 39,
    Aux28 = 40,
    Aux29 = 41,
    Aux30 = 42,
    Aux31 = 43,
    TopCenter = 44,
    TopFrontLeft = 45,
    TopFrontRight = 46,
    TopFrontCenter = 47,
    TopRearLeft = 48,
    TopRearRight = 49,
    TopRearCenter = 50,
}

impl ChannelPosition {
    /// Returns the `n`th auxiliary position, if there is one.
    pub fn aux(n: u8) -> Option<Self> {
        ChannelPosition::from_u8((ChannelPosition::Aux0 as u8).checked_add(n)?)
            .filter(|pos| (*pos as u8) <= ChannelPosition::Aux31 as u8)
    }
}

/// The ALSA default layout for 8 channels. Smaller layouts are prefixes of this one.
const ALSA_LAYOUT: [ChannelPosition; 8] = [
    ChannelPosition::FrontLeft,
    ChannelPosition::FrontRight,
    ChannelPosition::RearLeft,
    ChannelPosition::RearRight,
    ChannelPosition::FrontCenter,
    ChannelPosition::Lfe,
    ChannelPosition::SideLeft,
    ChannelPosition::SideRight,
];

/// A map from stream channels to speaker positions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChannelMap {
    /// Number of channels in the map.
    channels: u8,
    /// Channel position map.
    map: [ChannelPosition; CHANNELS_MAX as usize],
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::mono()
    }
}

impl ChannelMap {
    /// Creates an empty channel map.
    pub fn empty() -> Self {
        ChannelMap {
            channels: 0,
            map: [Default::default(); CHANNELS_MAX as usize],
        }
    }

    /// Creates a channel map with a single channel.
    pub fn mono() -> Self {
        Self {
            channels: 1,
            map: [Default::default(); CHANNELS_MAX as usize],
        }
    }

    /// Creates a channel map with the ALSA default layout for `channels` channels.
    ///
    /// ALSA only defines layouts for 1, 2, 4, 6 and 8 channels. Any other count uses the largest
    /// smaller layout, with the remaining channels mapped to auxiliary positions. Counts above
    /// [`CHANNELS_MAX`] are clamped.
    pub fn alsa(channels: u8) -> Self {
        let channels = channels.min(CHANNELS_MAX);
        let mut map = Self::empty();

        let base = match channels {
            0 => return map,
            1 => {
                map.push(ChannelPosition::Mono);
                1
            }
            2..=3 => 2,
            4..=5 => 4,
            6..=7 => 6,
            _ => 8,
        };

        if base > 1 {
            for pos in &ALSA_LAYOUT[..base] {
                map.push(*pos);
            }
        }

        for n in 0..(channels - map.channels) {
            // There are 32 aux positions, so this never runs out for <= CHANNELS_MAX.
            map.push(ChannelPosition::aux(n).unwrap_or_default());
        }

        map
    }

    /// Tries to append another `ChannelPosition` to the end of this map.
    ///
    /// Panics if the map already has CHANNEL_MAX channels.
    pub fn push(&mut self, position: ChannelPosition) {
        if self.channels < CHANNELS_MAX {
            self.map[self.channels as usize] = position;
            self.channels += 1;
        } else {
            panic!("channel map full");
        }
    }

    /// Returns the number of channel mappings stored in this `ChannelMap`.
    pub fn num_channels(&self) -> u8 {
        self.channels
    }
}

impl fmt::Debug for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only print the occupied part of the backing storage
        self.map[..self.channels.into()].fmt(f)
    }
}

impl<'a> IntoIterator for &'a ChannelMap {
    type Item = ChannelPosition;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> <Self as IntoIterator>::IntoIter {
        Iter { map: self, next: 0 }
    }
}

/// An iterator over `ChannelPosition`s stored in a `ChannelMap`.
#[derive(Debug)]
pub struct Iter<'a> {
    map: &'a ChannelMap,
    next: u8,
}

impl Iterator for Iter<'_> {
    type Item = ChannelPosition;

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        if self.next < self.map.num_channels() {
            self.next += 1;
            Some(self.map.map[self.next as usize - 1])
        } else {
            None
        }
    }
}
