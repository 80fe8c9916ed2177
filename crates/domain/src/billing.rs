// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session billing.
//!
//! Play is billed in half-hour units, always rounded up:
//! `amount = rate_per_hour * ceil(duration / 30min) / 2`.
//! Amounts are integer minor units; an odd product rounds half up.

use crate::error::DomainError;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// Length of one billing unit.
pub const BILLING_UNIT: Duration = Duration::minutes(30);

/// A computed charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Billing {
    /// Number of half-hour units billed.
    pub billed_units: i64,
    /// The rate used, in minor units per hour.
    pub rate_per_hour: i64,
    /// The amount, in minor units.
    pub amount: i64,
}

impl Billing {
    /// Billed time in fractional hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn billed_hours(&self) -> f64 {
        self.billed_units.to_f64().unwrap_or(0.0) / 2.0
    }
}

/// Computes the charge for a session.
///
/// # Errors
///
/// Returns `DomainError::InvalidDuration` if `duration` is zero or negative,
/// and `DomainError::AmountOverflow` if the amount does not fit.
pub fn compute_amount(rate_per_hour: i64, duration: Duration) -> Result<Billing, DomainError> {
    if duration <= Duration::ZERO {
        return Err(DomainError::InvalidDuration {
            seconds: duration.whole_seconds(),
        });
    }
    if rate_per_hour < 0 {
        return Err(DomainError::InvalidRate(rate_per_hour));
    }

    let unit_seconds: i64 = BILLING_UNIT.whole_seconds();
    let seconds: i64 = duration.whole_seconds();
    let has_remainder: bool = seconds % unit_seconds != 0 || duration.subsec_nanoseconds() > 0;
    let billed_units: i64 = seconds / unit_seconds + i64::from(has_remainder);

    let amount: i64 = rate_per_hour
        .checked_mul(billed_units)
        .and_then(|half_hours_cost| half_hours_cost.checked_add(1))
        .ok_or(DomainError::AmountOverflow)?
        / 2;

    Ok(Billing {
        billed_units,
        rate_per_hour,
        amount,
    })
}

/// Determines how long a session is billed for.
///
/// Open-ended sessions are billed for the elapsed wall-clock time. Sessions
/// with a scheduled range are billed for the greater of the scheduled length
/// and the elapsed time.
#[must_use]
pub fn billable_duration(
    scheduled_minutes: Option<i64>,
    check_in_at: OffsetDateTime,
    check_out_at: OffsetDateTime,
) -> Duration {
    let elapsed: Duration = check_out_at - check_in_at;
    match scheduled_minutes {
        Some(minutes) => elapsed.max(Duration::minutes(minutes)),
        None => elapsed,
    }
}
