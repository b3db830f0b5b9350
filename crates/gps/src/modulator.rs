//! Baseband modulation: per-sample carrier/code mixing for every allocated
//! channel, summed and DAC-quantized into interleaved 16-bit I/Q samples.

use constants::{
    CARR_FREQ, CA_SEQ_LEN, CODE_FREQ, DacProfile, MAX_CHAN, SINCOS_TABLE,
    SINCOS_TABLE_SIZE, SPEED_OF_LIGHT, antenna_gain,
};

use crate::{channel::CarrierPhase, channel::Channel, range::Range};

/// Looks up `(sin, cos)` of `phase_cycles` (phase in full cycles, any real
/// value) via the shared table, linearly indexing by its fractional part.
fn sincos(phase_cycles: f64) -> (f64, f64) {
    let frac = phase_cycles.rem_euclid(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = (frac * SINCOS_TABLE_SIZE as f64) as usize % SINCOS_TABLE_SIZE;
    SINCOS_TABLE[idx]
}

/// Per-channel Doppler and amplitude terms refreshed once per synthesis
/// iteration (every [`constants::SIMULATION_STEP_SECONDS`]) from the
/// channel's latest [`Range`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDrive {
    pub f_carr: f64,
    pub f_code: f64,
    pub gain: f64,
}

/// Recomputes `channel`'s Doppler-scaled carrier/code rates and the linear
/// gain (antenna pattern times free-space path loss, or `fixed_gain` when
/// the caller overrides it) from a freshly computed `range`, per §4.6.
#[must_use]
pub fn update_drive(channel: &mut Channel, range: &Range, fixed_gain: Option<f64>) -> ChannelDrive {
    let rate_frac = range.rate / SPEED_OF_LIGHT;
    let f_carr = -CARR_FREQ * rate_frac;
    let f_code = CODE_FREQ * (1.0 + rate_frac);
    channel.f_carr = f_carr;
    channel.f_code = f_code;
    channel.azel = range.azel;
    channel.range = range.range;

    let path_loss = fixed_gain.unwrap_or(20_200_000.0 / range.d);
    let gain = path_loss * antenna_gain(range.azel.el);
    ChannelDrive {
        f_carr,
        f_code,
        gain,
    }
}

/// Modulates one iteration's worth of samples for all allocated `channels`
/// at `sample_rate` (Hz) into interleaved I/Q pairs, advancing each
/// channel's code/carrier phase and word-ring cursors in place.
///
/// `out` must hold `2 * num_samples` `i16`s (`I0, Q0, I1, Q1, ...`).
pub fn modulate(
    channels: &mut [Channel; MAX_CHAN], drives: &[ChannelDrive; MAX_CHAN],
    sample_rate: f64, num_samples: usize, profile: DacProfile, out: &mut [i16],
) {
    debug_assert!(out.len() >= num_samples * 2);

    for sample in out.iter_mut().take(num_samples * 2) {
        *sample = 0;
    }

    let dt = 1.0 / sample_rate;

    for (channel, drive) in channels.iter_mut().zip(drives.iter()) {
        if channel.prn.is_none() {
            continue;
        }
        let carrier_step = (CARR_FREQ + drive.f_carr) * dt;
        let code_step = drive.f_code * dt;

        for n in 0..num_samples {
            let (sin_c, cos_c) = match &mut channel.carrier_phase {
                CarrierPhase::Float(phase) => {
                    *phase += carrier_step;
                    *phase -= phase.floor();
                    sincos(*phase)
                }
                CarrierPhase::Fixed(acc) => {
                    #[allow(
                        clippy::cast_possible_truncation,
                        clippy::cast_sign_loss
                    )]
                    let delta = (carrier_step * f64::from(u32::MAX)) as u32;
                    *acc = acc.wrapping_add(delta);
                    sincos(f64::from(*acc) / f64::from(u32::MAX))
                }
            };

            let chip = f64::from(channel.current_chip());
            let i_sample = chip * cos_c * drive.gain;
            let q_sample = chip * sin_c * drive.gain;

            #[allow(clippy::cast_possible_truncation)]
            {
                let i_acc = (i_sample * profile.gain) as i64 + profile.offset;
                let q_acc = (q_sample * profile.gain) as i64 + profile.offset;
                let i_q = (i_acc >> profile.shift).clamp(-profile.clamp - 1, profile.clamp);
                let q_q = (q_acc >> profile.shift).clamp(-profile.clamp - 1, profile.clamp);
                out[2 * n] = out[2 * n].saturating_add(i_q as i16);
                out[2 * n + 1] = out[2 * n + 1].saturating_add(q_q as i16);
            }

            channel.code_phase += code_step;
            if channel.code_phase >= CA_SEQ_LEN as f64 {
                channel.code_phase -= CA_SEQ_LEN as f64;
                channel.advance_code_period();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use constants::MAX_CHAN;

    use constants::DataFormat;

    use super::{ChannelDrive, modulate};
    use crate::channel::{CarrierPhase, Channel};

    #[test]
    fn silent_without_allocated_channels() {
        let mut channels: [Channel; MAX_CHAN] = std::array::from_fn(|_| Channel::default());
        let drives = [ChannelDrive::default(); MAX_CHAN];
        let mut out = vec![0i16; 20];
        modulate(
            &mut channels, &drives, 2_600_000.0, 10, DataFormat::Bits16.profile(),
            &mut out,
        );
        assert!(out.iter().all(|&s| s == 0));
    }

    #[test]
    fn single_channel_produces_bounded_nonzero_samples() {
        let mut channels: [Channel; MAX_CHAN] = std::array::from_fn(|_| Channel::default());
        channels[0].reset(1, CarrierPhase::Float(0.0));
        let mut drives = [ChannelDrive::default(); MAX_CHAN];
        drives[0] = ChannelDrive {
            f_carr: 0.0,
            f_code: constants::CODE_FREQ,
            gain: 1.0,
        };
        let mut out = vec![0i16; 2000];
        modulate(
            &mut channels, &drives, 2_600_000.0, 1000, DataFormat::Bits16.profile(),
            &mut out,
        );
        assert!(out.iter().any(|&s| s != 0));
        assert!(out.iter().all(|&s| s.unsigned_abs() < 5000));
    }

    #[test]
    fn modulate_is_deterministic() {
        let build = || {
            let mut channels: [Channel; MAX_CHAN] = std::array::from_fn(|_| Channel::default());
            channels[0].reset(1, CarrierPhase::Float(0.0));
            channels[3].reset(7, CarrierPhase::Float(0.25));
            let mut drives = [ChannelDrive::default(); MAX_CHAN];
            drives[0] = ChannelDrive {
                f_carr: 137.0,
                f_code: constants::CODE_FREQ * 1.000_001,
                gain: 0.8,
            };
            drives[3] = ChannelDrive {
                f_carr: -52.0,
                f_code: constants::CODE_FREQ * 0.999_999,
                gain: 1.3,
            };
            (channels, drives)
        };

        let (mut channels_a, drives) = build();
        let (mut channels_b, _) = build();
        let mut out_a = vec![0i16; 4000];
        let mut out_b = vec![0i16; 4000];
        modulate(
            &mut channels_a, &drives, 2_600_000.0, 2000, DataFormat::Bits16.profile(),
            &mut out_a,
        );
        modulate(
            &mut channels_b, &drives, 2_600_000.0, 2000, DataFormat::Bits16.profile(),
            &mut out_b,
        );
        assert_eq!(out_a, out_b);
    }

    /// With one allocated channel and no Doppler on the code rate, a full
    /// 1023-chip code period maps one chip to one sample. Since
    /// `cos^2 + sin^2 == 1` regardless of carrier phase and every chip is
    /// exactly +-1, the combined I/Q RMS works out to `gain / sqrt(2)`
    /// independent of how the carrier phase happens to walk.
    #[test]
    fn energy_matches_gain_over_sqrt_two() {
        let mut channels: [Channel; MAX_CHAN] = std::array::from_fn(|_| Channel::default());
        channels[0].reset(1, CarrierPhase::Float(0.0));
        let gain = 25_000.0;
        let mut drives = [ChannelDrive::default(); MAX_CHAN];
        drives[0] = ChannelDrive {
            f_carr: 0.0,
            f_code: constants::CODE_FREQ,
            gain,
        };
        let profile = DataFormat::Bits16.profile();
        let num_samples = constants::CA_SEQ_LEN;
        let mut out = vec![0i16; num_samples * 2];
        modulate(
            &mut channels, &drives, constants::CODE_FREQ, num_samples, profile,
            &mut out,
        );

        let scale = profile.gain / f64::from(1u32 << profile.shift);
        let mean_sq: f64 =
            out.iter().map(|&s| f64::from(s) * f64::from(s)).sum::<f64>() / out.len() as f64;
        let rms = mean_sq.sqrt();
        let expected = gain / std::f64::consts::SQRT_2 * scale;
        assert!((rms - expected).abs() / expected < 0.03);
    }
}
