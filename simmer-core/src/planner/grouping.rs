//! Temperature grouping
//!
//! Greedy single pass over items sorted by temperature. An item joins the
//! current cluster while it is within the threshold of the cluster's running
//! average; otherwise the cluster is closed and a new one starts.

use heapless::Vec;

use super::phase::MAX_PHASES;
use super::PlanError;
use crate::session::{SessionItem, MAX_ITEMS};

/// A temperature-compatible group of items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureCluster<'a> {
    /// Rounded average of the members' temperatures (°C)
    pub target_temp_c: i16,
    /// Members, ascending by temperature
    pub items: Vec<&'a SessionItem, MAX_ITEMS>,
}

/// Cluster being built, tracking its temperature sum for the running average
struct OpenCluster<'a> {
    sum_c: i32,
    items: Vec<&'a SessionItem, MAX_ITEMS>,
}

impl<'a> OpenCluster<'a> {
    fn start(item: &'a SessionItem) -> Self {
        let mut items = Vec::new();
        let _ = items.push(item);
        Self {
            sum_c: item.temperature_c() as i32,
            items,
        }
    }

    /// `|t - sum/n| <= threshold`, compared as `|t*n - sum| <= threshold*n`
    fn accepts(&self, temperature_c: i16, threshold_c: i16) -> bool {
        let n = self.items.len() as i32;
        (temperature_c as i32 * n - self.sum_c).abs() <= threshold_c as i32 * n
    }

    fn push(&mut self, item: &'a SessionItem) {
        if self.items.push(item).is_ok() {
            self.sum_c += item.temperature_c() as i32;
        }
    }

    fn close(self) -> TemperatureCluster<'a> {
        TemperatureCluster {
            target_temp_c: rounded_average(self.sum_c, self.items.len() as i32),
            items: self.items,
        }
    }
}

/// Average of positive temperatures, rounded half-up
pub(crate) fn rounded_average(sum_c: i32, count: i32) -> i16 {
    if count <= 0 {
        return 0;
    }
    ((2 * sum_c + count) / (2 * count)) as i16
}

/// Partition items into temperature clusters, ascending by temperature
///
/// Items with equal temperatures keep their input order. More than
/// [`MAX_ITEMS`] items is rejected.
pub fn group_by_temperature(
    items: &[SessionItem],
    threshold_c: i16,
) -> Result<Vec<TemperatureCluster<'_>, MAX_PHASES>, PlanError> {
    if items.len() > MAX_ITEMS {
        return Err(PlanError::TooManyItems(items.len()));
    }
    let mut sorted: Vec<(usize, &SessionItem), MAX_ITEMS> = items.iter().enumerate().collect();
    sorted.sort_unstable_by_key(|(index, item)| (item.temperature_c(), *index));

    let mut clusters = Vec::new();
    let mut current: Option<OpenCluster<'_>> = None;

    for (_, item) in sorted {
        if let Some(cluster) = current.as_mut() {
            if cluster.accepts(item.temperature_c(), threshold_c) {
                cluster.push(item);
                continue;
            }
        }
        if let Some(closed) = current.replace(OpenCluster::start(item)) {
            let _ = clusters.push(closed.close());
        }
    }

    if let Some(closed) = current {
        let _ = clusters.push(closed.close());
    }

    Ok(clusters)
}
