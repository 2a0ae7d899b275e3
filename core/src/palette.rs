//! Fixed NTSC-style colour palette.
//!
//! Palette indices are 8 bits wide but the video chip only decodes bits 7..1:
//! the high nibble selects one of 16 hues and bits 3..1 one of 8 luminance
//! steps. Odd indices therefore alias the even entry just below them.

/// 256-entry RGB palette, packed as `0x00RRGGBB`.
pub const NTSC_PALETTE: [u32; 256] = [
    0x000000, 0x000000, 0x4a4a4a, 0x4a4a4a, 0x6f6f6f, 0x6f6f6f, 0x8e8e8e, 0x8e8e8e,
    0xaaaaaa, 0xaaaaaa, 0xc0c0c0, 0xc0c0c0, 0xd6d6d6, 0xd6d6d6, 0xececec, 0xececec,
    0x003f1f, 0x003f1f, 0x00734a, 0x00734a, 0x1e986f, 0x1e986f, 0x3db78e, 0x3db78e,
    0x59d3aa, 0x59d3aa, 0x6fe9c0, 0x6fe9c0, 0x85ffd6, 0x85ffd6, 0x9bffec, 0x9bffec,
    0x004600, 0x004600, 0x017c0b, 0x017c0b, 0x26a130, 0x26a130, 0x45c04f, 0x45c04f,
    0x61dc6b, 0x61dc6b, 0x77f281, 0x77f281, 0x8dff97, 0x8dff97, 0xa3ffad, 0xa3ffad,
    0x004400, 0x004400, 0x177a00, 0x177a00, 0x3c9f00, 0x3c9f00, 0x5bbe1d, 0x5bbe1d,
    0x77da39, 0x77da39, 0x8df04f, 0x8df04f, 0xa3ff65, 0xa3ff65, 0xb9ff7b, 0xb9ff7b,
    0x103b00, 0x103b00, 0x386f00, 0x386f00, 0x5d9400, 0x5d9400, 0x7cb301, 0x7cb301,
    0x98cf1d, 0x98cf1d, 0xaee533, 0xaee533, 0xc4fb49, 0xc4fb49, 0xdaff5f, 0xdaff5f,
    0x2d2d00, 0x2d2d00, 0x5c5c00, 0x5c5c00, 0x818100, 0x818100, 0xa0a001, 0xa0a001,
    0xbcbc1d, 0xbcbc1d, 0xd2d233, 0xd2d233, 0xe8e849, 0xe8e849, 0xfefe5f, 0xfefe5f,
    0x461c00, 0x461c00, 0x7d4600, 0x7d4600, 0xa26b00, 0xa26b00, 0xc18a1d, 0xc18a1d,
    0xdda639, 0xdda639, 0xf3bc4f, 0xf3bc4f, 0xffd265, 0xffd265, 0xffe87b, 0xffe87b,
    0x580b00, 0x580b00, 0x93310b, 0x93310b, 0xb85630, 0xb85630, 0xd7754f, 0xd7754f,
    0xf3916b, 0xf3916b, 0xffa781, 0xffa781, 0xffbd97, 0xffbd97, 0xffd3ad, 0xffd3ad,
    0x5f001e, 0x5f001e, 0x9b214a, 0x9b214a, 0xc0466f, 0xc0466f, 0xdf658e, 0xdf658e,
    0xfb81aa, 0xfb81aa, 0xff97c0, 0xff97c0, 0xffadd6, 0xffadd6, 0xffc3ec, 0xffc3ec,
    0x580050, 0x580050, 0x931889, 0x931889, 0xb83dae, 0xb83dae, 0xd75ccd, 0xd75ccd,
    0xf378e9, 0xf378e9, 0xff8eff, 0xff8eff, 0xffa4ff, 0xffa4ff, 0xffbaff, 0xffbaff,
    0x470078, 0x470078, 0x7d1abb, 0x7d1abb, 0xa23fe0, 0xa23fe0, 0xc15eff, 0xc15eff,
    0xdd7aff, 0xdd7aff, 0xf390ff, 0xf390ff, 0xffa6ff, 0xffa6ff, 0xffbcff, 0xffbcff,
    0x2d028e, 0x2d028e, 0x5c25d7, 0x5c25d7, 0x814afc, 0x814afc, 0xa069ff, 0xa069ff,
    0xbc85ff, 0xbc85ff, 0xd29bff, 0xd29bff, 0xe8b1ff, 0xe8b1ff, 0xfec7ff, 0xfec7ff,
    0x11108e, 0x11108e, 0x3838d7, 0x3838d7, 0x5d5dfc, 0x5d5dfc, 0x7c7cff, 0x7c7cff,
    0x9898ff, 0x9898ff, 0xaeaeff, 0xaeaeff, 0xc4c4ff, 0xc4c4ff, 0xdadaff, 0xdadaff,
    0x002178, 0x002178, 0x174ebc, 0x174ebc, 0x3c73e1, 0x3c73e1, 0x5b92ff, 0x5b92ff,
    0x77aeff, 0x77aeff, 0x8dc4ff, 0x8dc4ff, 0xa3daff, 0xa3daff, 0xb9f0ff, 0xb9f0ff,
    0x003250, 0x003250, 0x016389, 0x016389, 0x2688ae, 0x2688ae, 0x45a7cd, 0x45a7cd,
    0x61c3e9, 0x61c3e9, 0x77d9ff, 0x77d9ff, 0x8defff, 0x8defff, 0xa3ffff, 0xa3ffff,
    0x003f1f, 0x003f1f, 0x00734b, 0x00734b, 0x1e9870, 0x1e9870, 0x3db78f, 0x3db78f,
    0x59d3ab, 0x59d3ab, 0x6fe9c1, 0x6fe9c1, 0x85ffd7, 0x85ffd7, 0x9bffed, 0x9bffed,
];

/// Grayscale luminance for every palette entry (ITU-R BT.601 weights).
pub const GRAYSCALE_PALETTE: [u8; 256] = build_grayscale();

const fn build_grayscale() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let rgb = NTSC_PALETTE[i];
        let r = (rgb >> 16) & 0xFF;
        let g = (rgb >> 8) & 0xFF;
        let b = rgb & 0xFF;
        table[i] = ((r * 299 + g * 587 + b * 114 + 500) / 1000) as u8;
        i += 1;
    }
    table
}

/// Look up the RGB triple for a palette index.
#[inline]
pub fn rgb(index: u8) -> [u8; 3] {
    let packed = NTSC_PALETTE[index as usize];
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}

/// Look up the grayscale luminance for a palette index.
#[inline]
pub fn luminance(index: u8) -> u8 {
    GRAYSCALE_PALETTE[index as usize]
}
