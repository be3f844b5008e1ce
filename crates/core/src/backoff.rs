// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restart backoff policy: exponential with a hard cap and jitter, so a
//! crash-looping pattern doesn't hammer the spawner.

use rand::Rng;
use std::time::Duration;

const BASE: Duration = Duration::from_secs(1);
const MULTIPLIER: f64 = 2.0;
const CAP: Duration = Duration::from_secs(60);
const JITTER_FRACTION: f64 = 0.2;

/// `min(base * multiplier^(attempts-1), cap)`, jittered by ±20%.
///
/// `attempts` is the 1-indexed count of consecutive failed starts; an
/// `attempts` of 0 is treated the same as 1 (no negative delay).
pub fn backoff_delay(attempts: u32) -> Duration {
    backoff_delay_with_rng(attempts, &mut rand::thread_rng())
}

fn backoff_delay_with_rng(attempts: u32, rng: &mut impl Rng) -> Duration {
    let exponent = attempts.saturating_sub(1).min(32);
    let scaled = BASE.as_secs_f64() * MULTIPLIER.powi(exponent as i32);
    let capped = scaled.min(CAP.as_secs_f64());
    let jitter = rng.gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
    let jittered = (capped * (1.0 + jitter)).max(0.0);
    Duration::from_secs_f64(jittered)
}
