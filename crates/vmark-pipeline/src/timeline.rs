//! Timestamp rebasing and range validation.

use tracing::warn;

use vmark_models::Moment;

/// Rebase segment-local moments into the source timeline by adding the
/// segment's absolute start offset. Order is preserved; unparsed
/// timestamp fields pass through untouched.
pub fn rebase_moments(moments: Vec<Moment>, segment_start: f64) -> Vec<Moment> {
    moments
        .into_iter()
        .map(|m| m.rebased(segment_start))
        .collect()
}

/// Keep only moments whose range lies inside `[0, total_duration]` with
/// `start <= end`. Rejections are a data-quality filter, not an error;
/// each is logged with its reason.
pub fn validate_moments(moments: Vec<Moment>, total_duration: f64) -> Vec<Moment> {
    moments
        .into_iter()
        .filter(|moment| match (moment.start.seconds(), moment.end.seconds()) {
            (Some(start), Some(end)) => {
                if start < 0.0 || start > total_duration || end < 0.0 || end > total_duration {
                    warn!(
                        reason = %moment.reason,
                        start,
                        end,
                        total_duration,
                        "Rejecting moment: outside video range"
                    );
                    false
                } else if start > end {
                    warn!(
                        reason = %moment.reason,
                        start,
                        end,
                        "Rejecting moment: inverted range"
                    );
                    false
                } else {
                    true
                }
            }
            _ => {
                warn!(
                    reason = %moment.reason,
                    start = ?moment.start,
                    end = ?moment.end,
                    "Rejecting moment: unparsed timestamp"
                );
                false
            }
        })
        .collect()
}
