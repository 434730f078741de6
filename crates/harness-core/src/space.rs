//! Fixed 11-bit address-space map and classification helpers.
//!
//! The transfer word carries an 11-bit address. Classification is used for
//! validation and labeling only: reserved addresses are legal wire values
//! whose device-side meaning is undefined, so they are flagged rather than
//! rejected by the protocol layer.

/// Number of address bits carried by a transfer word.
pub const ADDRESS_BITS: u8 = 11;
/// Mask selecting the valid 11-bit address domain.
pub const ADDRESS_MASK: u16 = 0x07FF;

/// Inclusive start address of the CPU code space.
pub const CODE_START: u16 = 0x000;
/// Inclusive end address of the CPU code space.
pub const CODE_END: u16 = 0x0FF;
/// Inclusive start address of the low reserved region.
pub const RESERVED_LOW_START: u16 = 0x100;
/// Inclusive end address of the low reserved region.
pub const RESERVED_LOW_END: u16 = 0x3FF;
/// Inclusive start address of the CPU data space.
pub const DATA_START: u16 = 0x400;
/// Inclusive end address of the CPU data space.
pub const DATA_END: u16 = 0x4FF;
/// Inclusive start address of the high reserved region.
pub const RESERVED_HIGH_START: u16 = 0x500;
/// Inclusive end address of the high reserved region.
pub const RESERVED_HIGH_END: u16 = 0x7FF;

/// Region classification for 11-bit transfer addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AddressRegion {
    /// CPU code space (`0x000..=0x0FF`).
    Code,
    /// Low reserved region (`0x100..=0x3FF`).
    ReservedLow,
    /// CPU data space (`0x400..=0x4FF`).
    Data,
    /// High reserved region (`0x500..=0x7FF`).
    ReservedHigh,
}

/// Canonical fixed-region descriptor for the transfer address map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionDescriptor {
    /// Region classification.
    pub region: AddressRegion,
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

impl AddressRegion {
    /// Returns the inclusive bounds for this region.
    #[must_use]
    pub const fn bounds(self) -> (u16, u16) {
        match self {
            Self::Code => (CODE_START, CODE_END),
            Self::ReservedLow => (RESERVED_LOW_START, RESERVED_LOW_END),
            Self::Data => (DATA_START, DATA_END),
            Self::ReservedHigh => (RESERVED_HIGH_START, RESERVED_HIGH_END),
        }
    }

    /// Returns `true` when `addr` belongs to this region.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        let (start, end) = self.bounds();
        addr >= start && addr <= end
    }

    /// Returns the canonical descriptor for this region.
    #[must_use]
    pub const fn descriptor(self) -> RegionDescriptor {
        let (start, end) = self.bounds();
        RegionDescriptor {
            region: self,
            start,
            end,
        }
    }

    /// Returns `true` for regions with undefined device-side meaning.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::ReservedLow | Self::ReservedHigh)
    }
}

/// Canonical fixed region layout in ascending address order.
pub const FIXED_ADDRESS_REGIONS: [RegionDescriptor; 4] = [
    AddressRegion::Code.descriptor(),
    AddressRegion::ReservedLow.descriptor(),
    AddressRegion::Data.descriptor(),
    AddressRegion::ReservedHigh.descriptor(),
];

const _: () = assert_fixed_region_layout();

const fn assert_fixed_region_layout() {
    let mut index = 0;
    while index < FIXED_ADDRESS_REGIONS.len() {
        let descriptor = FIXED_ADDRESS_REGIONS[index];
        assert!(
            descriptor.start <= descriptor.end,
            "region start cannot be greater than end"
        );

        if index > 0 {
            let previous = FIXED_ADDRESS_REGIONS[index - 1];
            assert!(
                previous.end + 1 == descriptor.start,
                "fixed regions must be contiguous"
            );
        }

        index += 1;
    }

    assert!(
        FIXED_ADDRESS_REGIONS[0].start == 0x000 && FIXED_ADDRESS_REGIONS[3].end == ADDRESS_MASK,
        "fixed regions must cover the full 11-bit address space"
    );
}

/// Classifies an 11-bit transfer address into its fixed region.
///
/// Addresses above the 11-bit domain cannot occur once a transfer word is
/// well formed; the input is masked so the function stays total.
#[must_use]
pub const fn classify_address(addr: u16) -> AddressRegion {
    match addr & ADDRESS_MASK {
        CODE_START..=CODE_END => AddressRegion::Code,
        RESERVED_LOW_START..=RESERVED_LOW_END => AddressRegion::ReservedLow,
        DATA_START..=DATA_END => AddressRegion::Data,
        _ => AddressRegion::ReservedHigh,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        classify_address, AddressRegion, RegionDescriptor, ADDRESS_MASK, CODE_END, CODE_START,
        DATA_END, DATA_START, FIXED_ADDRESS_REGIONS, RESERVED_HIGH_END, RESERVED_HIGH_START,
        RESERVED_LOW_END, RESERVED_LOW_START,
    };

    #[test]
    fn region_decode_is_correct_at_boundaries() {
        assert_eq!(classify_address(CODE_START), AddressRegion::Code);
        assert_eq!(classify_address(CODE_END), AddressRegion::Code);

        assert_eq!(
            classify_address(RESERVED_LOW_START),
            AddressRegion::ReservedLow
        );
        assert_eq!(
            classify_address(RESERVED_LOW_END),
            AddressRegion::ReservedLow
        );

        assert_eq!(classify_address(DATA_START), AddressRegion::Data);
        assert_eq!(classify_address(DATA_END), AddressRegion::Data);

        assert_eq!(
            classify_address(RESERVED_HIGH_START),
            AddressRegion::ReservedHigh
        );
        assert_eq!(
            classify_address(RESERVED_HIGH_END),
            AddressRegion::ReservedHigh
        );
    }

    #[test]
    fn region_bounds_are_contiguous_and_cover_the_address_domain() {
        assert_eq!(CODE_END + 1, RESERVED_LOW_START);
        assert_eq!(RESERVED_LOW_END + 1, DATA_START);
        assert_eq!(DATA_END + 1, RESERVED_HIGH_START);
        assert_eq!(RESERVED_HIGH_END, ADDRESS_MASK);
    }

    #[test]
    fn contains_matches_classifier_for_all_addresses() {
        for addr in 0..=ADDRESS_MASK {
            let region = classify_address(addr);
            assert!(region.contains(addr));
            for descriptor in FIXED_ADDRESS_REGIONS {
                assert_eq!(
                    descriptor.region.contains(addr),
                    region == descriptor.region
                );
            }
        }
    }

    #[test]
    fn only_reserved_regions_are_flagged_reserved() {
        assert!(!AddressRegion::Code.is_reserved());
        assert!(!AddressRegion::Data.is_reserved());
        assert!(AddressRegion::ReservedLow.is_reserved());
        assert!(AddressRegion::ReservedHigh.is_reserved());
    }

    #[test]
    fn classification_masks_out_of_domain_addresses() {
        assert_eq!(classify_address(0x0800), classify_address(0x000));
        assert_eq!(classify_address(0xFFFF), classify_address(0x07FF));
    }

    #[test]
    fn canonical_region_descriptors_match_fixed_bounds() {
        assert_eq!(
            FIXED_ADDRESS_REGIONS,
            [
                RegionDescriptor {
                    region: AddressRegion::Code,
                    start: CODE_START,
                    end: CODE_END
                },
                RegionDescriptor {
                    region: AddressRegion::ReservedLow,
                    start: RESERVED_LOW_START,
                    end: RESERVED_LOW_END
                },
                RegionDescriptor {
                    region: AddressRegion::Data,
                    start: DATA_START,
                    end: DATA_END
                },
                RegionDescriptor {
                    region: AddressRegion::ReservedHigh,
                    start: RESERVED_HIGH_START,
                    end: RESERVED_HIGH_END
                },
            ]
        );
    }
}
