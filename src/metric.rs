//! Classification metrics
//!
//! Scoring routines for the binary spam classifier. Predictions are
//! positive-class probabilities; hard labels use a 0.5 cutoff.

fn trapezoid_area(x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    (x0 - x1).abs() * (y0 + y1) * 0.5
}

/// Area under the ROC curve.
///
/// Rank-based sweep over the predicted probability, accumulating trapezoids
/// between distinct prediction values so ties are handled the textbook way.
/// Returns NaN when the labels contain a single class.
pub fn roc_auc_score(y: &[f64], yhat: &[f64]) -> f64 {
    let mut indices = (0..y.len()).collect::<Vec<_>>();
    indices.sort_unstable_by(|&a, &b| yhat[b].total_cmp(&yhat[a]));

    let mut auc: f64 = 0.0;
    let mut fp = 1.0 - y[indices[0]];
    let mut tp = y[indices[0]];
    let mut fp_prev: f64 = 0.0;
    let mut tp_prev: f64 = 0.0;

    for pair in indices.windows(2) {
        if yhat[pair[1]] != yhat[pair[0]] {
            auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
            fp_prev = fp;
            tp_prev = tp;
        }
        fp += 1.0 - y[pair[1]];
        tp += y[pair[1]];
    }

    auc += trapezoid_area(fp_prev, fp, tp_prev, tp);
    if fp <= 0.0 || tp <= 0.0 {
        // Single-class input, the curve is degenerate.
        return f64::NAN;
    }
    auc / (tp * fp)
}

/// Fraction of predictions matching the labels.
pub fn accuracy(y: &[f64], pred: &[f64]) -> f64 {
    let correct = y.iter().zip(pred).filter(|(y_, p_)| y_ == p_).count();
    correct as f64 / y.len() as f64
}

/// Confusion matrix over labels {0, 1}, laid out `[[tn, fp], [fn, tp]]`.
pub fn confusion_matrix(y: &[f64], pred: &[f64]) -> [[usize; 2]; 2] {
    let mut matrix = [[0usize; 2]; 2];
    for (y_, p_) in y.iter().zip(pred) {
        let row = usize::from(*y_ == 1.0);
        let col = usize::from(*p_ == 1.0);
        matrix[row][col] += 1;
    }
    matrix
}

/// Precision for the positive class; 0 when nothing was predicted positive.
pub fn precision(y: &[f64], pred: &[f64]) -> f64 {
    let m = confusion_matrix(y, pred);
    let tp = m[1][1] as f64;
    let fp = m[0][1] as f64;
    if tp + fp == 0.0 {
        0.0
    } else {
        tp / (tp + fp)
    }
}

/// Recall for the positive class; 0 when there are no positive labels.
pub fn recall(y: &[f64], pred: &[f64]) -> f64 {
    let m = confusion_matrix(y, pred);
    let tp = m[1][1] as f64;
    let fn_ = m[1][0] as f64;
    if tp + fn_ == 0.0 {
        0.0
    } else {
        tp / (tp + fn_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn precision_round(value: f64, digits: i32) -> f64 {
        let scale = 10.0_f64.powi(digits);
        (value * scale).round() / scale
    }

    #[test]
    fn test_auc_perfect_and_inverted_ranking() {
        let y = vec![0.0, 1.0];
        assert_eq!(roc_auc_score(&y, &[0.0, 1.0]), 1.0);
        assert_eq!(roc_auc_score(&y, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_auc_ties_give_half() {
        let y = vec![1.0, 0.0];
        let yhat = vec![0.5, 0.5];
        assert_eq!(roc_auc_score(&y, &yhat), 0.5);
    }

    #[test]
    fn test_auc_single_class_is_nan() {
        assert!(roc_auc_score(&[0.0, 0.0], &[0.25, 0.75]).is_nan());
        assert!(roc_auc_score(&[1.0, 1.0], &[0.25, 0.75]).is_nan());
    }

    #[test]
    fn test_auc_mixed_ranking() {
        let y = vec![1.0, 0.0, 1.0, 0.0, 0.0];
        let yhat = vec![0.9, 0.8, 0.7, 0.3, 0.1];
        // Positive at rank 1 beats all 3 negatives, positive at rank 3
        // beats 2 of 3: (3 + 2) / 6.
        assert_eq!(precision_round(roc_auc_score(&y, &yhat), 6), 0.833333);
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let y = vec![0.0, 0.0, 1.0, 1.0, 1.0];
        let pred = vec![0.0, 1.0, 1.0, 0.0, 1.0];
        assert_eq!(confusion_matrix(&y, &pred), [[1, 1], [1, 2]]);
    }

    #[test]
    fn test_precision_recall_zero_division() {
        let y = vec![0.0, 0.0];
        let pred = vec![0.0, 0.0];
        assert_eq!(precision(&y, &pred), 0.0);
        assert_eq!(recall(&y, &pred), 0.0);
    }

    #[test]
    fn test_precision_recall_accuracy() {
        let y = vec![0.0, 0.0, 1.0, 1.0, 1.0];
        let pred = vec![0.0, 1.0, 1.0, 0.0, 1.0];
        assert_eq!(precision(&y, &pred), 2.0 / 3.0);
        assert_eq!(recall(&y, &pred), 2.0 / 3.0);
        assert_eq!(accuracy(&y, &pred), 0.6);
    }
}
