//! Message and error ID space
//!
//! Message IDs are partitioned into contiguous ascending ranges, one per
//! subsystem. A range starts at its `M_ID_OFFSET_*` value and ends where the
//! next one starts; `M_ID_OFFSET_MAX` is the first invalid ID.

use core::ops::Range;

// Range boundaries, ascending
pub const M_ID_OFFSET_MIN: u16 = 0x00;
pub const M_ID_OFFSET_CORE: u16 = 0x01;
pub const M_ID_OFFSET_EMBEDDED: u16 = 0x10;
pub const M_ID_OFFSET_SAFETY: u16 = 0x20;
pub const M_ID_OFFSET_BATTERY: u16 = 0x30;
pub const M_ID_OFFSET_POWER: u16 = 0x40;
pub const M_ID_OFFSET_THRUSTER: u16 = 0x50;
pub const M_ID_OFFSET_PNEUMATICS: u16 = 0x60;
pub const M_ID_OFFSET_DEPTH: u16 = 0x70;
pub const M_ID_OFFSET_DEBUG: u16 = 0x80;
pub const M_ID_OFFSET_MAX: u16 = 0x90;

/// ID used by control messages that carry no transaction
pub const M_ID_NULL: u16 = M_ID_OFFSET_MIN;

// Embedded
pub const M_ID_EMBEDDED_STATUS: u16 = M_ID_OFFSET_EMBEDDED;

// Thruster
pub const M_ID_THRUSTER_STATUS: u16 = M_ID_OFFSET_THRUSTER;
pub const M_ID_THRUSTER_SET: u16 = M_ID_OFFSET_THRUSTER + 1;

// Error IDs, carried in the ID field of error frames
pub const E_ID_CHECKSUM: u16 = 0x01;
pub const E_ID_PROTOCOL: u16 = 0x02;
pub const E_ID_TIMEOUT: u16 = 0x03;
pub const E_ID_BAD_REQUEST: u16 = 0x04;

/// Subsystem owning a range of message IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subsystem {
    /// Below the core range; only the null ID lives here
    Reserved,
    Core,
    Embedded,
    Safety,
    Battery,
    Power,
    Thruster,
    Pneumatics,
    Depth,
    Debug,
}

/// Range starts in ascending order
const RANGES: [(u16, Subsystem); 10] = [
    (M_ID_OFFSET_MIN, Subsystem::Reserved),
    (M_ID_OFFSET_CORE, Subsystem::Core),
    (M_ID_OFFSET_EMBEDDED, Subsystem::Embedded),
    (M_ID_OFFSET_SAFETY, Subsystem::Safety),
    (M_ID_OFFSET_BATTERY, Subsystem::Battery),
    (M_ID_OFFSET_POWER, Subsystem::Power),
    (M_ID_OFFSET_THRUSTER, Subsystem::Thruster),
    (M_ID_OFFSET_PNEUMATICS, Subsystem::Pneumatics),
    (M_ID_OFFSET_DEPTH, Subsystem::Depth),
    (M_ID_OFFSET_DEBUG, Subsystem::Debug),
];

impl Subsystem {
    /// All subsystems, lowest range first
    pub const ALL: [Subsystem; 10] = [
        Subsystem::Reserved,
        Subsystem::Core,
        Subsystem::Embedded,
        Subsystem::Safety,
        Subsystem::Battery,
        Subsystem::Power,
        Subsystem::Thruster,
        Subsystem::Pneumatics,
        Subsystem::Depth,
        Subsystem::Debug,
    ];

    /// Find the subsystem that owns a message ID
    ///
    /// Boundaries are "greater or equal" tests against ascending starts, so
    /// they are checked from the highest range down and the first hit wins.
    /// Returns `None` at or above `M_ID_OFFSET_MAX`.
    pub fn from_id(id: u16) -> Option<Self> {
        if id >= M_ID_OFFSET_MAX {
            return None;
        }

        RANGES
            .iter()
            .rev()
            .find(|(start, _)| id >= *start)
            .map(|&(_, subsystem)| subsystem)
    }

    /// IDs owned by this subsystem
    pub fn id_range(self) -> Range<u16> {
        let index = self as usize;
        let start = RANGES[index].0;
        let end = RANGES
            .get(index + 1)
            .map(|&(next, _)| next)
            .unwrap_or(M_ID_OFFSET_MAX);
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ranges_are_ascending() {
        for pair in RANGES.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
        assert!(RANGES[RANGES.len() - 1].0 < M_ID_OFFSET_MAX);
    }

    #[test]
    fn test_range_table_matches_all() {
        for (index, subsystem) in Subsystem::ALL.iter().enumerate() {
            assert_eq!(RANGES[index].1, *subsystem);
            assert_eq!(*subsystem as usize, index);
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(Subsystem::from_id(0x00), Some(Subsystem::Reserved));
        assert_eq!(Subsystem::from_id(0x01), Some(Subsystem::Core));
        assert_eq!(Subsystem::from_id(0x0F), Some(Subsystem::Core));
        assert_eq!(Subsystem::from_id(0x10), Some(Subsystem::Embedded));
        assert_eq!(Subsystem::from_id(0x4F), Some(Subsystem::Power));
        assert_eq!(Subsystem::from_id(0x50), Some(Subsystem::Thruster));
        assert_eq!(Subsystem::from_id(0x8F), Some(Subsystem::Debug));
        assert_eq!(Subsystem::from_id(0x90), None);
        assert_eq!(Subsystem::from_id(u16::MAX), None);
    }

    #[test]
    fn test_defined_ids_land_in_their_subsystem() {
        assert_eq!(Subsystem::from_id(M_ID_EMBEDDED_STATUS), Some(Subsystem::Embedded));
        assert_eq!(Subsystem::from_id(M_ID_THRUSTER_STATUS), Some(Subsystem::Thruster));
        assert_eq!(Subsystem::from_id(M_ID_THRUSTER_SET), Some(Subsystem::Thruster));
    }

    #[test]
    fn test_id_range() {
        assert_eq!(Subsystem::Reserved.id_range(), 0x00..0x01);
        assert_eq!(Subsystem::Thruster.id_range(), 0x50..0x60);
        assert_eq!(Subsystem::Debug.id_range(), 0x80..0x90);
    }

    proptest! {
        #[test]
        fn prop_valid_id_has_exactly_one_owner(id in 0..M_ID_OFFSET_MAX) {
            let owner = Subsystem::from_id(id).unwrap();
            let containing: usize = Subsystem::ALL
                .iter()
                .filter(|s| s.id_range().contains(&id))
                .count();

            prop_assert_eq!(containing, 1);
            prop_assert!(owner.id_range().contains(&id));
        }

        #[test]
        fn prop_id_past_sentinel_is_invalid(id in M_ID_OFFSET_MAX..=u16::MAX) {
            prop_assert_eq!(Subsystem::from_id(id), None);
        }
    }
}
