//! Implied-volatility rank estimate
//!
//! Historical option IVs are rarely available, so IV rank is proxied by where the
//! current 30-day realized volatility sits within its range over the supplied
//! price history (normally one year of daily closes).

const WINDOW: usize = 30;
const TRADING_DAYS: f64 = 252.0;
const MIN_RETURNS: usize = 30;
const MIN_ROLLING: usize = 10;

/// Annualized rolling realized volatility of daily log returns
///
/// One value per full `window` of returns, using the sample standard deviation.
pub fn rolling_realized_vol(closes: &[f64], window: usize) -> Vec<f64> {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect();

    if window < 2 || returns.len() < window {
        return Vec::new();
    }

    returns
        .windows(window)
        .map(|w| {
            let n = w.len() as f64;
            let mean = w.iter().sum::<f64>() / n;
            let var = w.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt() * TRADING_DAYS.sqrt()
        })
        .collect()
}

/// IV rank (0–100, one decimal) from daily closes, oldest first
///
/// `None` when the history is too short to say anything.
pub fn estimate_iv_rank(closes: &[f64]) -> Option<f64> {
    if closes.len() <= MIN_RETURNS {
        return None;
    }

    let rolling = rolling_realized_vol(closes, WINDOW);
    if rolling.len() < MIN_ROLLING {
        return None;
    }

    let current = *rolling.last()?;
    let min = rolling.iter().copied().fold(f64::INFINITY, f64::min);
    let max = rolling.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return Some(50.0);
    }

    let rank = ((current - min) / (max - min) * 100.0).clamp(0.0, 100.0);
    Some((rank * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closes with a constant daily log step, then a noisy tail
    fn closes_with_tail(calm_days: usize, tail: &[f64]) -> Vec<f64> {
        let mut closes = vec![100.0];
        for i in 0..calm_days {
            let step = if i % 2 == 0 { 1.001 } else { 0.999 };
            let last = *closes.last().unwrap();
            closes.push(last * step);
        }
        for &r in tail {
            let last = *closes.last().unwrap();
            closes.push(last * r);
        }
        closes
    }

    #[test]
    fn test_short_history_is_unknown() {
        assert!(estimate_iv_rank(&[]).is_none());
        assert!(estimate_iv_rank(&vec![100.0; 30]).is_none());
        // 33 closes -> 32 returns -> only 3 rolling windows
        assert!(estimate_iv_rank(&closes_with_tail(32, &[])).is_none());
    }

    #[test]
    fn test_flat_history_is_midpoint() {
        let closes = vec![100.0; 60];
        assert_eq!(estimate_iv_rank(&closes), Some(50.0));
    }

    #[test]
    fn test_vol_spike_ranks_high() {
        let tail: Vec<f64> = (0..10).map(|i| if i % 2 == 0 { 1.05 } else { 0.95 }).collect();
        let closes = closes_with_tail(80, &tail);

        let rank = estimate_iv_rank(&closes).unwrap();
        assert!(rank > 90.0, "rank = {}", rank);
    }

    #[test]
    fn test_calm_after_storm_ranks_low() {
        let mut closes = vec![100.0];
        for i in 0..40 {
            let last = *closes.last().unwrap();
            closes.push(last * if i % 2 == 0 { 1.05 } else { 0.95 });
        }
        for i in 0..60 {
            let last = *closes.last().unwrap();
            closes.push(last * if i % 2 == 0 { 1.001 } else { 0.999 });
        }

        let rank = estimate_iv_rank(&closes).unwrap();
        assert!(rank < 10.0, "rank = {}", rank);
    }

    #[test]
    fn test_rolling_vol_length() {
        let closes = vec![100.0; 51];
        // 50 returns, window 30 -> 21 values
        assert_eq!(rolling_realized_vol(&closes, 30).len(), 21);
    }
}
