//! Lookback-window resolution.
//!
//! Turns "the last n observation dates as of `cutoff`" into a concrete
//! inclusive [start, end] range over a table's DateSet. The no-lookahead
//! rule is enforced here and only here: no date beyond the cutoff can ever
//! enter a resolved window.

use chrono::NaiveDate;

/// A resolved lookback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedWindow {
    /// `len` observation dates with `start <= end <= cutoff`; `len` may be
    /// smaller than the requested n when history runs short.
    Span {
        start: NaiveDate,
        end: NaiveDate,
        len: usize,
    },
    /// No observation date at or before the cutoff.
    Empty,
}

/// Resolve the last `n` dates of `dates` at or before `cutoff`.
///
/// `dates` must be ascending and duplicate-free (the calendar invariant);
/// `n` must already be validated as positive.
pub fn resolve_window(dates: &[NaiveDate], n: usize, cutoff: NaiveDate) -> ResolvedWindow {
    debug_assert!(n > 0, "lookback must be validated before resolution");

    let upto = dates.partition_point(|d| *d <= cutoff);
    if upto == 0 {
        return ResolvedWindow::Empty;
    }
    let lo = upto.saturating_sub(n);
    ResolvedWindow::Span {
        start: dates[lo],
        end: dates[upto - 1],
        len: upto - lo,
    }
}
