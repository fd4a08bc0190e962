//! Per-channel trend random walk.
//!
//! Each channel drifts around a slow trend that reverses stochastically, so
//! consecutive readings are correlated rather than independent noise. The
//! transform is value-in/value-out: the caller owns the state and the RNG.

use crate::config::ChannelProfile;
use rand::Rng;
use rand_distr::StandardNormal;

/// Trend state of one channel for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelState {
    /// +1 or -1
    pub direction: i8,
    pub trend: f64,
    /// Ticks left before the direction may flip.
    pub remaining: u32,
}

impl ChannelState {
    /// Fresh state centered on the profile midpoint. The countdown starts
    /// expired so the first tick draws a real duration.
    pub fn centered(profile: &ChannelProfile) -> Self {
        Self {
            direction: 1,
            trend: profile.midpoint(),
            remaining: 0,
        }
    }

    /// State after a fault clears: back to nominal with a fresh countdown.
    pub fn recovered<R: Rng + ?Sized>(profile: &ChannelProfile, rng: &mut R) -> Self {
        Self {
            direction: 1,
            trend: profile.midpoint(),
            remaining: draw_duration(profile, rng),
        }
    }

    /// Produce one reading and the state for the next tick.
    pub fn advance<R: Rng + ?Sized>(self, profile: &ChannelProfile, rng: &mut R) -> (f64, Self) {
        let mut next = self;

        next.remaining = next.remaining.saturating_sub(1);
        if next.remaining == 0 {
            if rng.random_bool(profile.flip_probability) {
                next.direction = -next.direction;
            }
            next.remaining = draw_duration(profile, rng);
        }

        next.trend += profile.trend_step * f64::from(next.direction);
        if next.trend < profile.base_min {
            next.trend = profile.base_min;
            next.direction = 1;
        }
        if next.trend > profile.base_max {
            next.trend = profile.base_max;
            next.direction = -1;
        }

        let mut value = next.trend + (rng.random::<f64>() - 0.5) * 2.0 * profile.noise_half_width;

        if rng.random_bool(profile.spike_probability) {
            let spike = rng.random::<f64>() * profile.spike_max;
            if rng.random_bool(0.5) {
                value += spike;
            } else {
                value -= spike;
            }
        }

        let jitter: f64 = rng.sample(StandardNormal);
        value += jitter * profile.gaussian_sigma;

        // Out-of-band readings land somewhere near the edge instead of on it,
        // otherwise long excursions show up as a flat rail.
        let (floor, ceiling) = profile.soft_band();
        if value < floor {
            value = floor + rng.random::<f64>() * profile.rebound_width;
        }
        if value > ceiling {
            value = ceiling - rng.random::<f64>() * profile.rebound_width;
        }

        (round_milli(value), next)
    }
}

fn draw_duration<R: Rng + ?Sized>(profile: &ChannelProfile, rng: &mut R) -> u32 {
    rng.random_range(profile.trend_min_ticks..profile.trend_max_ticks)
}

/// Round to three decimal places.
pub fn round_milli(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
