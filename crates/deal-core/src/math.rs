//! Pure numeric utilities shared by the scoring, synergy and pipeline
//! engines. Stateless functions with no I/O.

/// Clamp a component score into the [0,100] band.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Net present value of a total amount delivered in equal monthly
/// installments over `timeline_months`, discounted at `annual_rate / 12`
/// per month.
///
/// NPV = Σ_{m=1..timeline} (total_value / timeline) / (1 + annual_rate/12)^m
///
/// Spreading a fixed total over a longer horizon pushes cash later, so the
/// NPV falls as either the discount rate or the timeline grows. A zero
/// timeline produces an NPV of 0.
pub fn npv_monthly(total_value: f64, timeline_months: u32, annual_rate: f64) -> f64 {
    if timeline_months == 0 {
        return 0.0;
    }
    let monthly_rate = annual_rate / 12.0;
    let installment = total_value / timeline_months as f64;
    (1..=timeline_months)
        .map(|m| installment / (1.0 + monthly_rate).powi(m as i32))
        .sum()
}

/// Division with an explicit zero-denominator guard.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() < 1e-12 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// OLS slope of a series against its index: y = alpha + slope * i.
/// Returns (slope, r_squared). Fewer than 3 points yields (0.0, 0.0).
pub fn ols_slope(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n < 3 {
        return (0.0, 0.0);
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean: f64 = values.iter().sum::<f64>() / nf;

    let mut ss_xy = 0.0;
    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = y - y_mean;
        ss_xy += dx * dy;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
    }

    if ss_xx < 1e-15 {
        return (0.0, 0.0);
    }

    let slope = ss_xy / ss_xx;
    let r_squared = if ss_yy > 1e-15 {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    } else {
        0.0
    };

    (slope, r_squared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamp_score() {
        assert_relative_eq!(clamp_score(-5.0), 0.0);
        assert_relative_eq!(clamp_score(42.5), 42.5);
        assert_relative_eq!(clamp_score(180.0), 100.0);
    }

    #[test]
    fn test_npv_zero_timeline() {
        assert_relative_eq!(npv_monthly(1_000_000.0, 0, 0.10), 0.0);
    }

    #[test]
    fn test_npv_below_undiscounted_total() {
        // 12 monthly installments of ~83,333 discounted at 10%/yr must come in
        // under the undiscounted 1M total.
        let npv = npv_monthly(1_000_000.0, 12, 0.10);
        assert!(npv > 0.0);
        assert!(npv < 1_000_000.0);
    }

    #[test]
    fn test_npv_monotonic_in_discount_rate() {
        let low = npv_monthly(1_000_000.0, 24, 0.05);
        let high = npv_monthly(1_000_000.0, 24, 0.15);
        assert!(high < low);
    }

    #[test]
    fn test_npv_monotonic_in_timeline() {
        // Same total received over a longer horizon is worth less today.
        let short = npv_monthly(1_000_000.0, 12, 0.10);
        let long = npv_monthly(1_000_000.0, 36, 0.10);
        assert!(long < short);
    }

    #[test]
    fn test_npv_zero_rate_equals_total() {
        // At a 0% rate, discounting is a no-op and NPV is the full total.
        let npv = npv_monthly(120_000.0, 6, 0.0);
        assert_relative_eq!(npv, 120_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_safe_ratio() {
        assert_eq!(safe_ratio(10.0, 0.0), None);
        assert_relative_eq!(safe_ratio(10.0, 4.0).unwrap(), 2.5);
    }

    #[test]
    fn test_ols_slope_linear_series() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let (slope, r2) = ols_slope(&values);
        assert_relative_eq!(slope, 10.0, epsilon = 1e-10);
        assert_relative_eq!(r2, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_ols_slope_flat_series() {
        let values = vec![5.0, 5.0, 5.0, 5.0];
        let (slope, r2) = ols_slope(&values);
        assert_relative_eq!(slope, 0.0, epsilon = 1e-10);
        assert_relative_eq!(r2, 0.0, epsilon = 1e-10);
    }
}
