//! Navigation-message assembly: subframe field packing, GPS parity, and the
//! 30-second frame generator that feeds each channel's word ring.

use constants::{N_DWRD_SBF, N_SBF};
use geometry::GpsTime;

use crate::{channel::Channel, ephemeris::Ephemeris, ionoutc::IonoUtc};

/// The six 24-bit parity check masks from IS-GPS-200, applied against the
/// 30-bit word (data in bits 29:6) to derive parity bits D25..D30.
const PARITY_MASK: [u32; 6] = [
    0x3B1F_3480,
    0x1D8F_9A40,
    0x2EC7_CD00,
    0x1763_E680,
    0x2BB1_F340,
    0x0B7A_89C0,
];

/// Computes the six trailing parity bits for a 30-bit GPS navigation word.
///
/// `source`'s bits 31:30 carry the previous word's D29*/D30*; bits 29:6 carry
/// the 24 data bits; bits 5:0 are ignored on input. When `nib` is set (words
/// 2 and 10 of every subframe), the two non-information bearing data bits
/// are adjusted first so the final two parity bits come out zero.
#[must_use]
pub fn compute_checksum(source: u32, nib: bool) -> u32 {
    let d29 = (source >> 31) & 1;
    let d30 = (source >> 30) & 1;
    let mut d = source & 0x3FFF_FFC0;

    if nib {
        let c1 = (PARITY_MASK[4] & d).count_ones() & 1;
        if (c1 ^ d30) == 1 {
            d ^= 1 << 6;
        }
        let c2 = (PARITY_MASK[5] & d).count_ones() & 1;
        if (c2 ^ d29) == 1 {
            d ^= 1 << 7;
        }
    }

    if d30 == 1 {
        d ^= 0x3FFF_FFC0;
    }

    let prevs = [d29, d30, d29, d30, d30, d29];
    let mut parity = 0u32;
    for (i, mask) in PARITY_MASK.iter().enumerate() {
        let bit = ((mask & d).count_ones() & 1) ^ prevs[i];
        parity |= bit << (5 - i);
    }

    (d & 0x3FFF_FFC0) | parity
}

/// Writes `value`'s low `width` bits into `word`'s data field, ending at bit
/// `lsb_pos` (0 = word's own parity boundary, 6 = lowest data bit).
fn set_bits(word: &mut u32, value: i64, width: u32, lsb_pos: u32) {
    let mask = if width == 32 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    let bits = (value as u64) & mask;
    *word |= (bits as u32) << lsb_pos;
}

/// Scales a floating-point ICD field to its fixed-point two's-complement
/// representation with `width` bits and scale factor `scale` (the field's
/// LSB value).
fn scale_signed(value: f64, scale: f64, width: u32) -> i64 {
    let raw = (value / scale).round() as i64;
    let mask = (1i64 << width) - 1;
    raw & mask
}

/// Builds the 5 subframes (10 words each) for `eph`/`iono` at transmission
/// week `tow_week`, per §4.4's field layout. Each word's data occupies bits
/// 29:6; parity is computed by the caller ([`generate_nav_msg`]) since it
/// depends on the chained D29*/D30* from the previous word.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn eph2sbf(eph: &Ephemeris, iono: &IonoUtc) -> [[u32; N_DWRD_SBF]; N_SBF] {
    let mut sbf = [[0u32; N_DWRD_SBF]; N_SBF];

    let wn = (eph.week % 1024) as i64;
    let toc = (eph.toc.sec / 16.0).round() as i64;
    let iodc = eph.iodc as i64;
    let iode = eph.iode as i64;

    // Subframe 1.
    set_bits(&mut sbf[0][2], wn, 10, 20);
    set_bits(&mut sbf[0][2], 0, 2, 18); // code on L2
    set_bits(&mut sbf[0][2], 0, 4, 14); // URA
    set_bits(&mut sbf[0][2], i64::from(eph.svhealth), 6, 8);
    set_bits(&mut sbf[0][2], iodc >> 8, 2, 6);
    set_bits(&mut sbf[0][6], scale_signed(eph.tgd, 2f64.powi(-31), 8), 8, 6);
    set_bits(&mut sbf[0][7], iodc & 0xFF, 8, 22);
    set_bits(&mut sbf[0][7], toc, 16, 6);
    set_bits(
        &mut sbf[0][8],
        scale_signed(eph.af2, 2f64.powi(-55), 8),
        8,
        22,
    );
    set_bits(
        &mut sbf[0][8],
        scale_signed(eph.af1, 2f64.powi(-43), 16),
        16,
        6,
    );
    set_bits(
        &mut sbf[0][9],
        scale_signed(eph.af0, 2f64.powi(-31), 22),
        22,
        8,
    );

    // Subframe 2.
    set_bits(&mut sbf[1][2], iode, 8, 22);
    set_bits(&mut sbf[1][2], scale_signed(eph.crs, 2f64.powi(-5), 16), 16, 6);
    set_bits(
        &mut sbf[1][3],
        scale_signed(eph.delta_n, 2f64.powi(-43), 16),
        16,
        14,
    );
    set_bits(
        &mut sbf[1][3],
        scale_signed(eph.m0, 2f64.powi(-31), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[1][4],
        scale_signed(eph.m0, 2f64.powi(-31), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(&mut sbf[1][5], scale_signed(eph.cuc, 2f64.powi(-29), 16), 16, 14);
    set_bits(
        &mut sbf[1][5],
        scale_signed(eph.ecc, 2f64.powi(-33), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[1][6],
        scale_signed(eph.ecc, 2f64.powi(-33), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(&mut sbf[1][7], scale_signed(eph.cus, 2f64.powi(-29), 16), 16, 14);
    set_bits(
        &mut sbf[1][7],
        scale_signed(eph.sqrta, 2f64.powi(-19), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[1][8],
        scale_signed(eph.sqrta, 2f64.powi(-19), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(&mut sbf[1][9], (eph.toe.sec / 4.0).round() as i64, 16, 14);

    // Subframe 3.
    set_bits(&mut sbf[2][2], scale_signed(eph.cic, 2f64.powi(-29), 16), 16, 14);
    set_bits(
        &mut sbf[2][2],
        scale_signed(eph.omg0, 2f64.powi(-31), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[2][3],
        scale_signed(eph.omg0, 2f64.powi(-31), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(&mut sbf[2][4], scale_signed(eph.cis, 2f64.powi(-29), 16), 16, 14);
    set_bits(
        &mut sbf[2][4],
        scale_signed(eph.inc0, 2f64.powi(-31), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[2][5],
        scale_signed(eph.inc0, 2f64.powi(-31), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(&mut sbf[2][6], scale_signed(eph.crc, 2f64.powi(-5), 16), 16, 14);
    set_bits(
        &mut sbf[2][6],
        scale_signed(eph.aop, 2f64.powi(-31), 32) >> 24,
        8,
        6,
    );
    set_bits(
        &mut sbf[2][7],
        scale_signed(eph.aop, 2f64.powi(-31), 32) & 0x00FF_FFFF,
        24,
        6,
    );
    set_bits(
        &mut sbf[2][8],
        scale_signed(eph.omgdot, 2f64.powi(-43), 24),
        24,
        6,
    );
    set_bits(&mut sbf[2][9], iode, 8, 22);
    set_bits(&mut sbf[2][9], scale_signed(eph.idot, 2f64.powi(-43), 14), 14, 8);

    // Subframe 4, page 18 (iono/UTC) or bare page-25 almanac placeholder.
    if iono.vflg {
        set_bits(
            &mut sbf[3][2],
            scale_signed(iono.alpha[0], 2f64.powi(-30), 8),
            8,
            22,
        );
        set_bits(
            &mut sbf[3][2],
            scale_signed(iono.alpha[1], 2f64.powi(-27), 8),
            8,
            14,
        );
        set_bits(
            &mut sbf[3][2],
            scale_signed(iono.alpha[2], 2f64.powi(-24), 8),
            8,
            6,
        );
        set_bits(
            &mut sbf[3][3],
            scale_signed(iono.alpha[3], 2f64.powi(-24), 8),
            8,
            22,
        );
        set_bits(&mut sbf[3][3], scale_signed(iono.beta[0], 2048.0, 8), 8, 14);
        set_bits(&mut sbf[3][3], scale_signed(iono.beta[1], 16_384.0, 8), 8, 6);
        set_bits(&mut sbf[3][4], scale_signed(iono.beta[2], 65_536.0, 8), 8, 22);
        set_bits(&mut sbf[3][4], scale_signed(iono.beta[3], 65_536.0, 8), 8, 14);
        set_bits(&mut sbf[3][4], scale_signed(iono.a1, 2f64.powi(-50), 24), 24, 6);
        let a0 = scale_signed(iono.a0, 2f64.powi(-30), 32);
        set_bits(&mut sbf[3][5], a0 >> 8, 24, 6);
        set_bits(&mut sbf[3][6], a0 & 0xFF, 8, 22);
        set_bits(&mut sbf[3][6], (iono.tot / 4096).into(), 8, 14);
        set_bits(&mut sbf[3][6], iono.wnt.into(), 8, 6);
        set_bits(&mut sbf[3][7], iono.dtls.into(), 8, 22);
        set_bits(&mut sbf[3][7], 1929 % 256, 8, 14);
        set_bits(&mut sbf[3][8], 7, 8, 22);
        set_bits(&mut sbf[3][8], iono.dtlsf.into(), 8, 14);
    }

    // Subframe 5, page 25: data-id/sv-id placeholder, toa/WNa zeroed (no
    // almanac data is modeled — see DESIGN.md).
    set_bits(&mut sbf[4][2], 1, 2, 28); // data id
    set_bits(&mut sbf[4][2], 51, 6, 22); // sv id (page 25)

    sbf
}

/// Snaps `t_rx` to the most recent 30-second frame boundary.
#[must_use]
fn frame_boundary(t_rx: &GpsTime) -> GpsTime {
    let sec = (t_rx.sec.round() / 30.0).floor() * 30.0;
    GpsTime {
        week: t_rx.week,
        sec,
    }
}

/// Builds and appends one 30-second frame's worth of subframes (5 subframes
/// of 10 words) into `channel`'s word ring, chaining parity across words and
/// across the previous tail subframe when `initial` is `false`.
pub fn generate_nav_msg(
    t_rx: &GpsTime, channel: &mut Channel, eph: &Ephemeris, iono: &IonoUtc,
    initial: bool,
) {
    let g0 = frame_boundary(t_rx);
    channel.anchor = g0;
    let wn = (eph.week % 1024) as u32;
    let mut tow_count = (g0.sec / 6.0).round() as u32;

    let mut prev_d29 = 0u32;
    let mut prev_d30 = 0u32;

    if initial {
        let mut word = [0u32; N_DWRD_SBF];
        set_bits(&mut word[0], 0x8B, 8, 22);
        word[0] = compute_checksum(word[0] | (prev_d29 << 31) | (prev_d30 << 30), false);
        prev_d29 = word[0] & 1;
        prev_d30 = (word[0] >> 1) & 1;

        set_bits(&mut word[1], i64::from(tow_count), 17, 13);
        set_bits(&mut word[1], 5, 3, 8); // subframe id 5
        let raw = word[1] | (prev_d29 << 31) | (prev_d30 << 30);
        word[1] = compute_checksum(raw, true);
        prev_d29 = word[1] & 1;
        prev_d30 = (word[1] >> 1) & 1;

        for w in word.iter_mut().skip(2) {
            let nib = false;
            let raw = *w | (prev_d29 << 31) | (prev_d30 << 30);
            *w = compute_checksum(raw, nib);
            prev_d29 = *w & 1;
            prev_d30 = (*w >> 1) & 1;
        }
        channel.push_subframe(word);
        tow_count += 1;
    }

    let sbf_template = eph2sbf(eph, iono);
    for (i, subframe) in sbf_template.iter().enumerate() {
        let mut word = *subframe;
        set_bits(&mut word[0], 0x8B, 8, 22);
        let raw0 = word[0] | (prev_d29 << 31) | (prev_d30 << 30);
        word[0] = compute_checksum(raw0, false);
        prev_d29 = word[0] & 1;
        prev_d30 = (word[0] >> 1) & 1;

        set_bits(&mut word[1], i64::from(tow_count), 17, 13);
        #[allow(clippy::cast_possible_truncation)]
        set_bits(&mut word[1], (i + 1) as i64, 3, 8);
        let raw1 = word[1] | (prev_d29 << 31) | (prev_d30 << 30);
        word[1] = compute_checksum(raw1, true);
        prev_d29 = word[1] & 1;
        prev_d30 = (word[1] >> 1) & 1;

        if i == 0 {
            set_bits(&mut word[2], wn.into(), 10, 20);
        }

        for w in word.iter_mut().skip(2) {
            let raw = *w | (prev_d29 << 31) | (prev_d30 << 30);
            *w = compute_checksum(raw, false);
            prev_d29 = *w & 1;
            prev_d30 = (*w >> 1) & 1;
        }
        channel.push_subframe(word);
        tow_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use geometry::GpsTime;

    use super::{compute_checksum, generate_nav_msg};
    use crate::{channel::Channel, ephemeris::Ephemeris, ionoutc::IonoUtc};

    #[test]
    fn fixed_parity_vector() {
        let result = compute_checksum(0x22C0_00C0, false);
        assert_eq!(result, 0x22C0_00FC);
    }

    #[test]
    fn nib_forces_trailing_parity_zero() {
        // Bit 9 sits in PARITY_MASK[4] only, so popcount(mask[4] & d) is odd
        // and the D29 parity bit requires the non-information bit 6 flip to
        // land on zero; a payload that needs no flip would pass vacuously.
        let result = compute_checksum(0x0000_0200, true);
        assert_eq!(result & 0b11, 0);
    }

    #[test]
    fn subframe_week_field_and_monotonic_tow() {
        let eph = Ephemeris {
            vflg: true,
            week: 2200,
            toc: GpsTime {
                week: 2200,
                sec: 0.0,
            },
            toe: GpsTime {
                week: 2200,
                sec: 0.0,
            },
            ..Ephemeris::default()
        };
        let iono = IonoUtc::default();
        let t_rx = GpsTime {
            week: 2200,
            sec: 0.0,
        };
        let mut channel = Channel::default();
        generate_nav_msg(&t_rx, &mut channel, &eph, &iono, true);

        let extract = |word: u32, width: u32, lsb: u32| (word >> lsb) & ((1u32 << width) - 1);

        // words[0] is the synthetic initial subframe; words[1..=5] are the
        // eph2sbf-derived subframes 1..5.
        let sbf1_word3 = channel.words[1][2];
        assert_eq!(extract(sbf1_word3, 10, 20), (eph.week as u32) % 1024);

        let tows: Vec<u32> = (1..=5).map(|i| extract(channel.words[i][1], 17, 13)).collect();
        for pair in tows.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
    }
}
