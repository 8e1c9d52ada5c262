//! CPU-feature record carried on every module (§3: "a CPU-feature record,
//! bitmask of SSE/AVX/BMI tiers, preferred vector width, cache-line size,
//! red-zone size, alignment preference").

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// A plain bitmask, not a `bitflags!`-generated type: the set is small and
/// fixed, and the rest of the workspace does not otherwise need a bitflags
/// dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureBits(pub u32);

impl FeatureBits {
    pub const NONE: FeatureBits = FeatureBits(0);
    pub const SSE2: FeatureBits = FeatureBits(1 << 0);
    pub const SSE3: FeatureBits = FeatureBits(1 << 1);
    pub const SSE41: FeatureBits = FeatureBits(1 << 2);
    pub const SSE42: FeatureBits = FeatureBits(1 << 3);
    pub const AVX: FeatureBits = FeatureBits(1 << 4);
    pub const AVX2: FeatureBits = FeatureBits(1 << 5);
    pub const AVX512F: FeatureBits = FeatureBits(1 << 6);
    pub const BMI1: FeatureBits = FeatureBits(1 << 7);
    pub const BMI2: FeatureBits = FeatureBits(1 << 8);

    pub fn contains(self, other: FeatureBits) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FeatureBits {
    type Output = FeatureBits;
    fn bitor(self, rhs: FeatureBits) -> FeatureBits {
        FeatureBits(self.0 | rhs.0)
    }
}

impl BitOrAssign for FeatureBits {
    fn bitor_assign(&mut self, rhs: FeatureBits) {
        self.0 |= rhs.0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuFeatures {
    pub bits: FeatureBits,
    pub preferred_vector_width: u32,
    pub cache_line_size: u32,
    pub red_zone_size: u32,
    pub alignment_preference: u32,
}

impl Default for CpuFeatures {
    /// A conservative SysV-AMD64 baseline: SSE2 guaranteed by the ABI, a
    /// 128-byte red zone, 64-byte cache lines, 16-byte alignment.
    fn default() -> Self {
        CpuFeatures {
            bits: FeatureBits::SSE2,
            preferred_vector_width: 128,
            cache_line_size: 64,
            red_zone_size: 128,
            alignment_preference: 16,
        }
    }
}
