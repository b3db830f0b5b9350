//! Channel allocation: which of the [`MAX_CHAN`] channel slots track which
//! visible satellite, refreshed once per synthesis iteration.

use constants::{LAMBDA_L1, MAX_CHAN, MAX_SAT};
use geometry::{Ecef, GpsTime};

use crate::{
    channel::{CarrierPhase, Channel},
    ephemeris::Ephemeris,
    ionoutc::IonoUtc,
    navmsg::generate_nav_msg,
    orbit::{check_sat_visibility, compute_range},
};

/// Which channel slot (if any) currently tracks each PRN, `table[prn - 1]`.
#[derive(Debug, Clone, Copy)]
pub struct AllocTable([Option<usize>; MAX_SAT]);

impl Default for AllocTable {
    fn default() -> Self {
        Self([None; MAX_SAT])
    }
}

impl AllocTable {
    /// The channel slot tracking `prn`, if any.
    #[must_use]
    pub fn slot_for(&self, prn: usize) -> Option<usize> {
        self.0[prn - 1]
    }
}

/// Drops channels whose satellite has set or lost visibility, then fills
/// free slots with newly visible satellites, per §4.5. Returns the updated
/// allocation table.
#[allow(clippy::too_many_arguments)]
pub fn allocate_channels(
    channels: &mut [Channel; MAX_CHAN], table: &mut AllocTable, eph: &[Ephemeris; MAX_SAT],
    iono: &IonoUtc, t: &GpsTime, rx_xyz: &Ecef, rx_lat: f64, rx_lon: f64,
    elevation_mask: f64,
) {
    // Drop channels for satellites no longer visible.
    for (slot, channel) in channels.iter_mut().enumerate() {
        let Some(prn) = channel.prn else { continue };
        let e = &eph[prn - 1];
        let visible = if e.vflg {
            let range = compute_range(e, iono, t, rx_xyz, rx_lat, rx_lon);
            check_sat_visibility(e, range.azel, elevation_mask)
        } else {
            false
        };
        if !visible {
            channel.prn = None;
            table.0[prn - 1] = None;
            let _ = slot;
        }
    }

    // Allocate free slots to newly visible satellites.
    for prn in 1..=MAX_SAT {
        if table.0[prn - 1].is_some() {
            continue;
        }
        let e = &eph[prn - 1];
        if !e.vflg {
            continue;
        }
        let range = compute_range(e, iono, t, rx_xyz, rx_lat, rx_lon);
        if !check_sat_visibility(e, range.azel, elevation_mask) {
            continue;
        }
        let Some(free_slot) = channels.iter().position(|c| c.prn.is_none()) else {
            break;
        };

        // Initial carrier phase: the pseudorange expressed in wavelengths
        // at both the reference (zero-Doppler) range and the true range
        // agree up to an integer cycle count; the fractional part anchors
        // the carrier so two satellites allocated at the same instant
        // start in phase relative to their common receiver clock.
        let r_ref = range.range;
        let r_xyz = range.d;
        let phase0 = ((2.0 * r_ref - r_xyz) / LAMBDA_L1).fract();

        channels[free_slot].reset(prn, CarrierPhase::Float(phase0));
        channels[free_slot].azel = range.azel;
        channels[free_slot].range = range.range;
        generate_nav_msg(t, &mut channels[free_slot], e, iono, true);
        table.0[prn - 1] = Some(free_slot);
    }
}

#[cfg(test)]
mod tests {
    use constants::MAX_CHAN;
    use geometry::{Ecef, GpsTime, Location};

    use super::{AllocTable, allocate_channels};
    use crate::{channel::Channel, ephemeris::Ephemeris, ionoutc::IonoUtc};

    fn overhead_ephemeris(prn_slot: usize, week: i32) -> Ephemeris {
        let a = 26_560_000.0_f64;
        let mut eph = Ephemeris {
            vflg: true,
            sqrta: a.sqrt(),
            ecc: 0.0,
            m0: f64::from(prn_slot as i32) * 0.01,
            omg0: 0.0,
            inc0: 0.0,
            aop: 0.0,
            omgdot: 0.0,
            idot: 0.0,
            toe: GpsTime { week, sec: 0.0 },
            toc: GpsTime { week, sec: 0.0 },
            week,
            ..Ephemeris::default()
        };
        eph.finalize();
        eph
    }

    #[test]
    fn allocation_is_idempotent() {
        let mut eph: [Ephemeris; constants::MAX_SAT] =
            [Ephemeris::default(); constants::MAX_SAT];
        eph[0] = overhead_ephemeris(0, 2200);
        let t = eph[0].toe;
        let state = crate::orbit::satpos(&eph[0], &t);
        let llh = Location::from(&state.pos);
        let rx = Ecef::from(&Location {
            lat: llh.lat,
            lon: llh.lon,
            h: 0.0,
        });

        let iono = IonoUtc {
            enable: false,
            ..IonoUtc::default()
        };
        let mut channels: [Channel; MAX_CHAN] =
            std::array::from_fn(|_| Channel::default());
        let mut table = AllocTable::default();

        allocate_channels(
            &mut channels, &mut table, &eph, &iono, &t, &rx, llh.lat, llh.lon,
            0.0,
        );
        let slot_after_first = table.slot_for(1);
        assert!(slot_after_first.is_some());

        allocate_channels(
            &mut channels, &mut table, &eph, &iono, &t, &rx, llh.lat, llh.lon,
            0.0,
        );
        assert_eq!(table.slot_for(1), slot_after_first);
    }
}
