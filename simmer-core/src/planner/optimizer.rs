//! Plan assembly
//!
//! Chooses the grouping (automatic temperature clusters or the user's
//! batches), staggers each group into a phase with its timeline, inserts
//! rest gaps and sums up the plan.

use heapless::Vec;

use super::grouping::{group_by_temperature, rounded_average};
use super::phase::{CookingPhase, MAX_PHASES};
use super::stagger::stagger_items;
use super::timeline::generate_timeline;
use super::PlanError;
use crate::config::CookingConfig;
use crate::session::{CookingBatch, PhaseId, SessionItem, MAX_BATCHES, MAX_ITEMS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How items are grouped into phases
#[derive(Debug, Clone, Copy)]
pub enum GroupingMode<'a> {
    /// Cluster by temperature
    Auto,
    /// Use the given batches in their sequence order; only timing within a
    /// batch is computed
    Manual(&'a [CookingBatch]),
}

/// Headline numbers of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanSummary {
    /// Phase durations plus rest gaps (minutes)
    pub total_minutes: u16,
    /// Number of phases
    pub temperature_groups: u8,
    /// Items sharing their phase with at least one other item
    pub parallel_items: u8,
    /// Minutes saved versus cooking every item on its own
    pub efficiency_gain_min: u16,
}

/// Planner output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptimizationResult {
    /// Phases in cooking order
    pub phases: Vec<CookingPhase, MAX_PHASES>,
    pub total_minutes: u16,
    pub temperature_groups: u8,
    pub parallel_items: u8,
    pub efficiency_gain_min: u16,
}

impl OptimizationResult {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            total_minutes: self.total_minutes,
            temperature_groups: self.temperature_groups,
            parallel_items: self.parallel_items,
            efficiency_gain_min: self.efficiency_gain_min,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

/// Build the cooking plan for `items`
///
/// Empty input (or only empty batches) yields a zero-valued result. More
/// than [`MAX_ITEMS`] items or [`MAX_BATCHES`] batches is rejected rather
/// than truncated. The computation is pure; calling it again on the same
/// input gives an identical result.
pub fn optimize_cooking_session(
    items: &[SessionItem],
    mode: GroupingMode<'_>,
    config: &CookingConfig,
) -> Result<OptimizationResult, PlanError> {
    if items.len() > MAX_ITEMS {
        return Err(PlanError::TooManyItems(items.len()));
    }
    let mut phases: Vec<CookingPhase, MAX_PHASES> = Vec::new();

    match mode {
        GroupingMode::Auto => {
            for cluster in group_by_temperature(items, config.group_threshold_c)? {
                let phase = build_phase(phases.len() as u8, cluster.target_temp_c, &cluster.items);
                if phases.push(phase).is_err() {
                    break;
                }
            }
        }
        GroupingMode::Manual(batches) => {
            if batches.len() > MAX_BATCHES {
                return Err(PlanError::TooManyBatches(batches.len()));
            }
            let mut ordered: Vec<&CookingBatch, MAX_BATCHES> = batches.iter().collect();
            ordered.sort_unstable_by_key(|b| (b.order(), b.id()));

            for batch in ordered {
                let members: Vec<&SessionItem, MAX_ITEMS> = batch
                    .item_ids()
                    .iter()
                    .filter_map(|id| items.iter().find(|item| item.id() == *id))
                    .collect();
                if members.is_empty() {
                    continue;
                }

                let sum_c: i32 = members.iter().map(|m| m.temperature_c() as i32).sum();
                let target_c = rounded_average(sum_c, members.len() as i32);
                let phase = build_phase(phases.len() as u8, target_c, &members);
                if phases.push(phase).is_err() {
                    break;
                }
            }
        }
    }

    Ok(finish_plan(phases, config))
}

/// Quick total-time estimate using automatic grouping, without timelines
pub fn estimate_total_time(items: &[SessionItem], config: &CookingConfig) -> Result<u16, PlanError> {
    let clusters = group_by_temperature(items, config.group_threshold_c)?;
    let cooking: u16 = clusters
        .iter()
        .map(|c| c.items.iter().map(|i| i.time_min()).max().unwrap_or(0))
        .fold(0u16, u16::saturating_add);
    let gaps = clusters.len().saturating_sub(1) as u16;
    Ok(cooking.saturating_add(gaps.saturating_mul(config.rest_gap_min)))
}

fn build_phase(order: u8, target_temp_c: i16, members: &[&SessionItem]) -> CookingPhase {
    let stagger = stagger_items(members);
    let timeline = generate_timeline(&stagger.items);

    CookingPhase {
        id: PhaseId(order),
        order,
        target_temp_c,
        total_duration_min: stagger.duration_min,
        rest_after_min: 0,
        time_saved_min: stagger.time_saved_min,
        items: stagger.items,
        actions: timeline.actions,
        events: timeline.events,
    }
}

fn finish_plan(mut phases: Vec<CookingPhase, MAX_PHASES>, config: &CookingConfig) -> OptimizationResult {
    let last = phases.len().saturating_sub(1);
    for phase in phases.iter_mut().take(last) {
        phase.rest_after_min = config.rest_gap_min;
    }

    let mut result = OptimizationResult::default();
    for phase in &phases {
        result.total_minutes = result
            .total_minutes
            .saturating_add(phase.total_duration_min)
            .saturating_add(phase.rest_after_min);
        result.efficiency_gain_min = result.efficiency_gain_min.saturating_add(phase.time_saved_min);
        if phase.items.len() >= 2 {
            result.parallel_items += phase.items.len() as u8;
        }
    }
    result.temperature_groups = phases.len() as u8;
    result.phases = phases;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{BatchId, ItemId};
    use core::fmt::Write;
    use proptest::prelude::*;

    fn item(id: u16, name: &str, temperature_c: f32, time_min: f32, shake: bool) -> SessionItem {
        SessionItem::new(ItemId(id), name, temperature_c, time_min, shake)
    }

    fn instruction(phase: &CookingPhase, index: usize) -> heapless::String<128> {
        let mut text = heapless::String::new();
        write!(text, "{}", phase.instruction(index).unwrap()).unwrap();
        text
    }

    #[test]
    fn test_chicken_and_potatoes() {
        let items = [
            item(1, "chicken", 200.0, 25.0, true),
            item(2, "potatoes", 200.0, 20.0, false),
        ];
        let result =
            optimize_cooking_session(&items, GroupingMode::Auto, &CookingConfig::default()).unwrap();

        assert_eq!(result.phases.len(), 1);
        let phase = &result.phases[0];
        assert_eq!(phase.total_duration_min(), 25);
        assert_eq!(phase.target_temp_c(), 200);
        assert_eq!(phase.rest_after_min(), 0);

        let chicken = phase.item(ItemId(1)).unwrap();
        assert_eq!((chicken.start_offset_min, chicken.end_offset_min), (0, 25));
        let potatoes = phase.item(ItemId(2)).unwrap();
        assert_eq!((potatoes.start_offset_min, potatoes.end_offset_min), (5, 25));

        let minutes: std::vec::Vec<u16> = phase.events().iter().map(|e| e.minute).collect();
        assert_eq!(minutes, [0, 5, 12, 25]);
        assert_eq!(instruction(phase, 0).as_str(), "Add chicken");
        assert_eq!(instruction(phase, 1).as_str(), "Add potatoes");
        assert_eq!(instruction(phase, 2).as_str(), "Shake chicken");
        assert_eq!(instruction(phase, 3).as_str(), "Remove chicken, Remove potatoes");

        assert_eq!(result.efficiency_gain_min, 20);
        assert_eq!(result.total_minutes, 25);
        assert_eq!(result.temperature_groups, 1);
        assert_eq!(result.parallel_items, 2);
    }

    #[test]
    fn test_empty_items() {
        let result =
            optimize_cooking_session(&[], GroupingMode::Auto, &CookingConfig::default()).unwrap();

        assert!(result.phases.is_empty());
        assert_eq!(result.summary(), PlanSummary::default());
        assert_eq!(estimate_total_time(&[], &CookingConfig::default()), Ok(0));
    }

    #[test]
    fn test_rest_gap_between_phases() {
        let items = [
            item(1, "salmon", 180.0, 12.0, false),
            item(2, "wings", 220.0, 20.0, true),
        ];
        let result =
            optimize_cooking_session(&items, GroupingMode::Auto, &CookingConfig::default()).unwrap();

        assert_eq!(result.phases.len(), 2);
        assert_eq!(result.phases[0].target_temp_c(), 180);
        assert_eq!(result.phases[0].rest_after_min(), 2);
        assert_eq!(result.phases[1].target_temp_c(), 220);
        assert_eq!(result.phases[1].rest_after_min(), 0);
        assert_eq!(result.total_minutes, 12 + 2 + 20);
        assert_eq!(result.parallel_items, 0);
        assert_eq!(result.efficiency_gain_min, 0);
    }

    #[test]
    fn test_manual_mode_skips_empty_batch() {
        let items = [
            item(1, "chicken", 200.0, 25.0, true),
            item(2, "potatoes", 190.0, 20.0, false),
        ];
        let batches = [
            CookingBatch::with_items(BatchId(1), 0, &[ItemId(1), ItemId(2)]),
            CookingBatch::new(BatchId(2), 1),
        ];
        let result = optimize_cooking_session(
            &items,
            GroupingMode::Manual(&batches),
            &CookingConfig::default(),
        )
        .unwrap();

        assert_eq!(result.phases.len(), 1);
        assert_eq!(result.phases[0].target_temp_c(), 195);
        assert_eq!(result.phases[0].rest_after_min(), 0);
        assert_eq!(result.total_minutes, 25);
    }

    #[test]
    fn test_manual_mode_follows_batch_order() {
        let items = [
            item(1, "bread", 160.0, 8.0, false),
            item(2, "steak", 240.0, 10.0, true),
            item(3, "peppers", 235.0, 6.0, false),
        ];
        // Declared out of order; sequence order decides
        let batches = [
            CookingBatch::with_items(BatchId(7), 1, &[ItemId(1)]),
            CookingBatch::with_items(BatchId(3), 0, &[ItemId(3), ItemId(2)]),
        ];
        let result = optimize_cooking_session(
            &items,
            GroupingMode::Manual(&batches),
            &CookingConfig::default(),
        )
        .unwrap();

        assert_eq!(result.phases.len(), 2);
        let first: std::vec::Vec<ItemId> = result.phases[0].item_ids().collect();
        assert_eq!(first, [ItemId(3), ItemId(2)]);
        assert_eq!(result.phases[0].target_temp_c(), 238);
        assert_eq!(result.phases[1].target_temp_c(), 160);
        assert_eq!(result.total_minutes, 10 + 2 + 8);
        assert_eq!(result.efficiency_gain_min, 6);
    }

    #[test]
    fn test_manual_mode_ignores_unknown_members() {
        let items = [item(1, "fries", 200.0, 15.0, false)];
        let batches = [
            CookingBatch::with_items(BatchId(1), 0, &[ItemId(42)]),
            CookingBatch::with_items(BatchId(2), 1, &[ItemId(1)]),
        ];
        let result = optimize_cooking_session(
            &items,
            GroupingMode::Manual(&batches),
            &CookingConfig::default(),
        )
        .unwrap();

        assert_eq!(result.phases.len(), 1);
        assert_eq!(result.phases[0].order(), 0);
    }

    #[test]
    fn test_estimate_matches_plan() {
        let items = [
            item(1, "salmon", 180.0, 12.0, false),
            item(2, "asparagus", 185.0, 7.0, false),
            item(3, "wings", 220.0, 20.0, true),
        ];
        let config = CookingConfig::default();
        let result = optimize_cooking_session(&items, GroupingMode::Auto, &config).unwrap();

        assert_eq!(estimate_total_time(&items, &config), Ok(result.total_minutes));
    }

    #[test]
    fn test_configured_rest_gap() {
        let items = [item(1, "a", 100.0, 5.0, false), item(2, "b", 200.0, 5.0, false)];
        let config = CookingConfig {
            rest_gap_min: 4,
            ..Default::default()
        };
        let result = optimize_cooking_session(&items, GroupingMode::Auto, &config).unwrap();
        assert_eq!(result.total_minutes, 14);
    }

    #[test]
    fn test_oversize_input_is_rejected() {
        let items: std::vec::Vec<SessionItem> = (0..20)
            .map(|i| item(i, "nugget", 200.0, 10.0, false))
            .collect();
        let config = CookingConfig::default();

        assert_eq!(
            optimize_cooking_session(&items, GroupingMode::Auto, &config),
            Err(PlanError::TooManyItems(20))
        );
        assert_eq!(estimate_total_time(&items, &config), Err(PlanError::TooManyItems(20)));

        let batches = [CookingBatch::with_items(BatchId(1), 0, &[ItemId(0)])];
        assert_eq!(
            optimize_cooking_session(&items, GroupingMode::Manual(&batches), &config),
            Err(PlanError::TooManyItems(20))
        );

        let batches: std::vec::Vec<CookingBatch> = (0..=MAX_BATCHES as u16)
            .map(|i| CookingBatch::new(BatchId(i), i as u8))
            .collect();
        assert_eq!(
            optimize_cooking_session(&items[..1], GroupingMode::Manual(&batches), &config),
            Err(PlanError::TooManyBatches(MAX_BATCHES + 1))
        );

        // Exactly at capacity every item is planned
        let result =
            optimize_cooking_session(&items[..MAX_ITEMS], GroupingMode::Auto, &config).unwrap();
        let planned: usize = result.phases.iter().map(|p| p.items().len()).sum();
        assert_eq!(planned, MAX_ITEMS);
        assert_eq!(result.parallel_items as usize, MAX_ITEMS);
    }

    fn arb_items() -> impl Strategy<Value = std::vec::Vec<SessionItem>> {
        prop::collection::vec((80u16..=260, 1u16..=120, any::<bool>()), 0..=16).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (t, m, s))| item(i as u16, "item", t as f32, m as f32, s))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_plan_invariants(items in arb_items()) {
            let config = CookingConfig::default();
            let result = optimize_cooking_session(&items, GroupingMode::Auto, &config).unwrap();

            for phase in &result.phases {
                for member in phase.items() {
                    prop_assert_eq!(member.start_offset_min + member.time_min, phase.total_duration_min());
                }
            }

            if result.phases.iter().all(|p| p.items().len() == 1) {
                prop_assert_eq!(result.efficiency_gain_min, 0);
            }

            let again = optimize_cooking_session(&items, GroupingMode::Auto, &config).unwrap();
            prop_assert_eq!(&result, &again);

            let planned: usize = result.phases.iter().map(|p| p.items().len()).sum();
            prop_assert_eq!(planned, items.len());
        }
    }
}
