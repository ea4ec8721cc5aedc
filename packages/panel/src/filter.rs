//! Completeness filter.

use crime_panel_panel_models::PanelRow;

/// Keeps rows whose every lag is defined, preserving order.
///
/// The window statistics are not part of the predicate; they are derived
/// from a subset of the lags and so are defined on every retained row.
#[must_use]
pub fn retain_complete(rows: Vec<PanelRow>) -> Vec<PanelRow> {
    let before = rows.len();
    let retained: Vec<PanelRow> = rows.into_iter().filter(PanelRow::is_complete).collect();
    log::debug!(
        "Completeness filter kept {}/{before} panel row(s)",
        retained.len()
    );
    retained
}
