use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Angle the first slice starts at: twelve o'clock.
pub const CHART_START_ANGLE: f64 = -std::f64::consts::FRAC_PI_2;

pub const PALETTE_SIZE: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSlice {
    pub label: String,
    /// Share of the total in `0.0..=1.0`; the sweep is `proportion * TAU`.
    pub proportion: f64,
    pub color_index: usize,
}

pub fn chart_slices(category_sums: &[(String, Decimal)]) -> Vec<ChartSlice> {
    let total = category_sums
        .iter()
        .fold(Decimal::ZERO, |acc, (_, v)| acc.saturating_add(*v));
    if total <= Decimal::ZERO {
        return Vec::new();
    }

    category_sums
        .iter()
        .enumerate()
        .map(|(idx, (label, sum))| ChartSlice {
            label: label.clone(),
            proportion: sum
                .checked_div(total)
                .and_then(|ratio| ratio.to_f64())
                .unwrap_or(0.0),
            color_index: idx % PALETTE_SIZE,
        })
        .collect()
}

/// Start and end angle of every slice, laid out consecutively.
pub fn slice_angles(slices: &[ChartSlice]) -> Vec<(f64, f64)> {
    let mut start = CHART_START_ANGLE;
    slices
        .iter()
        .map(|slice| {
            let sweep = slice.proportion * std::f64::consts::TAU;
            let range = (start, start + sweep);
            start += sweep;
            range
        })
        .collect()
}
