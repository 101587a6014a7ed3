//! Erasure coding engine for distributed storage fragments.
//!
//! Given K data fragments, [`ReedSolomon::encode`] produces M parity fragments such
//! that any K of the K+M fragments are enough for [`ReedSolomon::recover`] to rebuild
//! the missing ones byte for byte.
//!
//! ```
//! use rsfrag::{FragmentMap, FragmentMapMut, ReedSolomon, SlotSet};
//!
//! let rs = ReedSolomon::new(4, 2).unwrap();
//! let data: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 64]).collect();
//! let mut parity = vec![vec![0u8; 64]; 2];
//! rs.encode_buffers(&data, &mut parity).unwrap();
//!
//! // Lose data fragment 0 and parity fragment 0 (slot 4)
//! let mut inputs = FragmentMap::new();
//! for slot in 1..4 {
//!     inputs.insert(slot, &data[slot]);
//! }
//! inputs.insert(5, &parity[1]);
//!
//! let erased: SlotSet = [0, 4].into_iter().collect();
//! let (mut data0, mut parity0) = (vec![0u8; 64], vec![0u8; 64]);
//! let mut outputs = FragmentMapMut::new();
//! outputs.insert(0, &mut data0);
//! outputs.insert(4, &mut parity0);
//!
//! rs.recover(&inputs, &erased, &SlotSet::new(), &mut outputs, 64).unwrap();
//! drop(outputs);
//! assert_eq!(data0, data[0]);
//! assert_eq!(parity0, parity[0]);
//! ```

pub mod config;
pub mod error;
pub mod fragment;
pub mod reed_solomon;

pub use config::CodecConfig;
pub use error::{CodecError, CodecResult};
pub use fragment::{
    FragmentMap, FragmentMapMut, SlotSet, MAX_DATA_FRAGMENTS, MAX_FRAGMENTS,
    MAX_PARITY_FRAGMENTS,
};
pub use reed_solomon::{RecoveryPlan, ReedSolomon};
