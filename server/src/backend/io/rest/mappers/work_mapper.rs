use crate::backend::domain::dates::format_date;
use crate::backend::domain::models::work_pattern::{WorkOverride, WorkPattern as DomainWorkPattern};
use crate::backend::domain::work_schedule::WorkGrid;
use shared::{
    UpsertWorkOverrideResponse, WorkDay, WorkGridResponse, WorkPattern as SharedWorkPattern, WorkPatternListResponse,
    WorkShiftEntry,
};

/// Mapper between work schedule domain models and the shared DTOs
pub struct WorkMapper;

impl WorkMapper {
    pub fn pattern_to_dto(domain: DomainWorkPattern) -> SharedWorkPattern {
        SharedWorkPattern {
            id: domain.id,
            family_id: domain.family_id,
            owner_id: domain.owner_id,
            cycle_length: domain.cycle_length,
            start_date: format_date(domain.start_date),
            pattern: domain.pattern,
        }
    }

    pub fn to_pattern_list_dto(patterns: Vec<DomainWorkPattern>) -> WorkPatternListResponse {
        WorkPatternListResponse {
            patterns: patterns.into_iter().map(Self::pattern_to_dto).collect(),
        }
    }

    pub fn to_grid_dto(grid: WorkGrid) -> WorkGridResponse {
        WorkGridResponse {
            family_id: grid.family_id,
            start: format_date(grid.window.start),
            end: format_date(grid.window.end),
            days: grid
                .days
                .into_iter()
                .map(|day| WorkDay {
                    date: format_date(day.date),
                    shifts: day
                        .shifts
                        .into_iter()
                        .map(|shift| WorkShiftEntry {
                            pattern_id: shift.pattern_id,
                            owner_id: shift.owner_id,
                            value: shift.value.value(),
                            label: shift.value.label().to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_override_dto(work_override: WorkOverride) -> UpsertWorkOverrideResponse {
        UpsertWorkOverrideResponse {
            pattern_id: work_override.pattern_id,
            date: format_date(work_override.date),
            value: work_override.value.value(),
            success_message: format!(
                "Shift set to {} on {}",
                work_override.value.label(),
                format_date(work_override.date)
            ),
        }
    }
}
