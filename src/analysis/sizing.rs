/// Largest fraction of bankroll ever suggested for one opportunity
pub const MAX_STAKE_FRACTION: f64 = 0.10;

/// Smallest multiplier a high risk score can shrink the Kelly stake to
const MIN_RISK_MULTIPLIER: f64 = 0.1;

/// Kelly fraction for a binary bet paying `profit_margin` percent,
/// treating `confidence` percent as the win probability and shrinking
/// the stake by `risk_score` percent
pub fn kelly_fraction(profit_margin: f64, confidence: f64, risk_score: f64) -> f64 {
    let b = profit_margin / 100.0;
    let p = confidence / 100.0;
    let q = 1.0 - p;

    if b <= 0.0 || p <= 0.0 {
        return 0.0;
    }

    let kelly = (b * p - q) / b;
    let risk_multiplier = (1.0 - risk_score / 100.0).max(MIN_RISK_MULTIPLIER);

    (kelly * risk_multiplier).clamp(0.0, MAX_STAKE_FRACTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelly_caps_at_ten_percent() {
        assert_eq!(kelly_fraction(50.0, 95.0, 0.0), MAX_STAKE_FRACTION);
    }

    #[test]
    fn test_kelly_never_negative() {
        // 3% payoff at 60% confidence has negative edge
        assert_eq!(kelly_fraction(3.0, 60.0, 0.0), 0.0);
        assert_eq!(kelly_fraction(-1.0, 90.0, 0.0), 0.0);
        assert_eq!(kelly_fraction(5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_kelly_interior_value() {
        // b = 0.5, p = 0.7: (0.35 - 0.3) / 0.5 = 0.1
        assert!((kelly_fraction(50.0, 70.0, 0.0) - 0.1).abs() < 1e-12);
        // b = 1.0, p = 0.52: 0.52 - 0.48 = 0.04
        assert!((kelly_fraction(100.0, 52.0, 0.0) - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_risk_shrinks_stake() {
        assert!((kelly_fraction(100.0, 52.0, 50.0) - 0.02).abs() < 1e-12);
        assert!((kelly_fraction(100.0, 52.0, 25.0) - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_risk_multiplier_floor() {
        // 1 - 0.95 = 0.05 is raised to the 0.1 floor
        assert!((kelly_fraction(100.0, 52.0, 95.0) - 0.004).abs() < 1e-12);
        assert!((kelly_fraction(100.0, 52.0, 300.0) - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_negative_risk_enlarges_stake() {
        // 1 - (-0.1) = 1.1
        assert!((kelly_fraction(100.0, 52.0, -10.0) - 0.044).abs() < 1e-12);
    }
}
