//! Financial metrics and performance calculations.

/// Calculate Sharpe Ratio
///
/// # Arguments
/// * `returns` - Vector of periodic returns
/// * `risk_free_rate` - Annual risk-free rate (default 0)
/// * `periods_per_year` - Number of periods per year (252 for daily, 365*24 for hourly)
pub fn calculate_sharpe(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let excess: Vec<f64> = returns
        .iter()
        .map(|r| r - risk_free_rate / periods_per_year)
        .collect();
    let mean_excess = excess.iter().sum::<f64>() / n;
    let variance: f64 = excess.iter().map(|r| (r - mean_excess).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return 0.0;
    }

    mean_excess / std_dev * periods_per_year.sqrt()
}

/// Calculate Maximum Drawdown as a positive fraction of the running peak
///
/// # Arguments
/// * `nav_series` - Vector of portfolio values over time
pub fn calculate_max_drawdown(nav_series: &[f64]) -> f64 {
    let Some(&first) = nav_series.first() else {
        return 0.0;
    };

    let mut max_drawdown = 0.0;
    let mut peak = first;

    for &nav in nav_series {
        peak = peak.max(nav);
        let drawdown = (peak - nav) / peak;
        max_drawdown = f64::max(max_drawdown, drawdown);
    }

    max_drawdown
}

/// Period-over-period simple returns (`len - 1` values)
pub fn simple_returns(nav_series: &[f64]) -> Vec<f64> {
    nav_series.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

/// Calculate cumulative return
pub fn calculate_cumulative_return(nav_series: &[f64]) -> f64 {
    match (nav_series.first(), nav_series.last()) {
        (Some(&first), Some(&last)) if nav_series.len() >= 2 && first != 0.0 => {
            (last - first) / first
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sharpe_ratio() {
        let returns = vec![0.01, -0.02, 0.015, 0.005, -0.01, 0.02];
        let sharpe = calculate_sharpe(&returns, 0.0, 252.0);
        assert!(sharpe.is_finite());
        assert!(sharpe > 0.0);
    }

    #[test]
    fn test_sharpe_flat_returns() {
        assert_eq!(calculate_sharpe(&[0.0; 5], 0.0, 252.0), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let nav = vec![100.0, 110.0, 105.0, 95.0, 100.0, 90.0, 95.0];
        let max_dd = calculate_max_drawdown(&nav);
        // (110 - 90) / 110
        assert_abs_diff_eq!(max_dd, 20.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn test_simple_returns() {
        let returns = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_abs_diff_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(returns[1], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_cumulative_return() {
        let nav = vec![100.0, 110.0, 105.0, 120.0];
        assert_abs_diff_eq!(calculate_cumulative_return(&nav), 0.2, epsilon = 1e-12);
        assert_eq!(calculate_cumulative_return(&[100.0]), 0.0);
    }
}
