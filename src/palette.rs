//! Indexed-color palette used by the java on-disk map dialect.
//!
//! The 62 base colors are multiplied by four brightness factors in declared
//! order, producing a 248-entry palette; index byte values from the source
//! data are position-dependent on that ordering, so the base/multiplier
//! iteration order below must never change.

use once_cell::sync::Lazy;

const MULTIPLIERS: [u32; 4] = [180, 220, 255, 135];

const BASE_COLORS: [[u8; 3]; 62] = [
    [0, 0, 0],
    [127, 178, 56],
    [247, 233, 163],
    [199, 199, 199],
    [255, 0, 0],
    [160, 160, 255],
    [167, 167, 167],
    [0, 124, 0],
    [255, 255, 255],
    [164, 168, 184],
    [151, 109, 77],
    [112, 112, 112],
    [64, 64, 255],
    [143, 119, 72],
    [255, 252, 245],
    [216, 127, 51],
    [178, 76, 216],
    [102, 153, 216],
    [229, 229, 51],
    [127, 204, 25],
    [242, 127, 165],
    [76, 76, 76],
    [153, 153, 153],
    [76, 127, 153],
    [127, 63, 178],
    [51, 76, 178],
    [102, 76, 51],
    [102, 127, 51],
    [153, 51, 51],
    [25, 25, 25],
    [250, 238, 77],
    [92, 219, 213],
    [74, 128, 255],
    [0, 217, 58],
    [129, 86, 49],
    [112, 2, 0],
    [209, 177, 161],
    [159, 82, 36],
    [149, 87, 108],
    [112, 108, 138],
    [186, 133, 36],
    [103, 117, 53],
    [160, 77, 78],
    [57, 41, 35],
    [135, 107, 98],
    [87, 92, 92],
    [122, 73, 88],
    [76, 62, 92],
    [76, 50, 35],
    [76, 82, 42],
    [142, 60, 46],
    [37, 22, 16],
    [189, 48, 49],
    [148, 63, 97],
    [92, 25, 29],
    [22, 126, 134],
    [58, 142, 140],
    [86, 44, 62],
    [20, 180, 133],
    [100, 100, 100],
    [216, 175, 147],
    [127, 167, 150],
];

pub const PALETTE_LEN: usize = BASE_COLORS.len() * MULTIPLIERS.len();

pub static PALETTE: Lazy<[[u8; 4]; PALETTE_LEN]> = Lazy::new(|| {
    let mut palette = [[0u8; 4]; PALETTE_LEN];

    for (base_index, rgb) in BASE_COLORS.iter().enumerate() {
        for (multiplier_index, &multiplier) in MULTIPLIERS.iter().enumerate() {
            let entry = base_index * MULTIPLIERS.len() + multiplier_index;
            let alpha = if base_index == 0 { 0 } else { 255 };

            for channel in 0..3 {
                palette[entry][channel] = ((u32::from(rgb[channel]) * multiplier) / 255) as u8;
            }
            palette[entry][3] = alpha;
        }
    }

    palette
});

/// Looks up the RGBA value for one indexed pixel byte.
pub fn rgba_for_index(index: u8) -> [u8; 4] {
    PALETTE[index as usize]
}
