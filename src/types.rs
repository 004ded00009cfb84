//! PulseAudio data types shared by the UCM model.

mod channel_map;
mod port_info;
mod props;
mod sample_spec;

pub use channel_map::*;
pub use port_info::*;
pub use props::*;
pub use sample_spec::*;
