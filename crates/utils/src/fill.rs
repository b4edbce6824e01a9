//! Gap filling within a cross-section.

use factorlab_math::median;
use factorlab_traits::FillMethod;
use ndarray::Array1;

/// Fill missing values of one cross-section.
///
/// `Median` uses the median of the observed values; a cross-section with nothing
/// observed is returned unchanged.
#[must_use]
pub fn fill_cross_section(row: &Array1<f64>, method: FillMethod) -> Array1<f64> {
    let fill = match method {
        FillMethod::None => return row.clone(),
        FillMethod::Zero => 0.0,
        FillMethod::Median => median(&row.to_vec()),
    };
    if fill.is_nan() {
        return row.clone();
    }
    row.mapv(|x| if x.is_nan() { fill } else { x })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(FillMethod::Median, 2.0)]
    #[case(FillMethod::Zero, 0.0)]
    fn fills_gaps(#[case] method: FillMethod, #[case] expected: f64) {
        let filled = fill_cross_section(&array![1.0, f64::NAN, 2.0, 10.0], method);
        assert_relative_eq!(filled[1], expected);
        assert_relative_eq!(filled[3], 10.0);
    }

    #[test]
    fn none_keeps_gaps() {
        let filled = fill_cross_section(&array![1.0, f64::NAN], FillMethod::None);
        assert!(filled[1].is_nan());
    }

    #[test]
    fn median_of_empty_cross_section() {
        let filled = fill_cross_section(&array![f64::NAN, f64::NAN], FillMethod::Median);
        assert!(filled.iter().all(|x| x.is_nan()));
    }
}
