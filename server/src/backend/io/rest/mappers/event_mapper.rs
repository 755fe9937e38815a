//! Mappers for converting between calendar domain models and shared DTOs.

use crate::backend::domain::calendar::{CalendarMonth, YearOverview};
use crate::backend::domain::dates::{format_date, format_date_time};
use crate::backend::domain::models::event::{Event as DomainEvent, EventOrigin, Recurrence as DomainRecurrence};
use shared::{
    CalendarDayCell, CalendarMonthResponse, CalendarWeek, Event as SharedEvent, Recurrence as SharedRecurrence,
    YearOverviewMonth, YearOverviewResponse,
};

/// Mapper between calendar domain models and the shared DTOs
pub struct EventMapper;

impl EventMapper {
    pub fn to_dto(domain: DomainEvent) -> SharedEvent {
        SharedEvent {
            id: domain.id,
            family_id: domain.family_id,
            created_by: domain.created_by,
            title: domain.title,
            description: domain.description,
            start_at: format_date_time(domain.start_at),
            end_at: domain.end_at.map(format_date_time),
            recurrence: Self::recurrence_to_dto(domain.recurrence),
            is_birthday: domain.origin == EventOrigin::Birthday,
        }
    }

    pub fn recurrence_to_dto(domain: DomainRecurrence) -> SharedRecurrence {
        match domain {
            DomainRecurrence::None => SharedRecurrence::None,
            DomainRecurrence::Yearly => SharedRecurrence::Yearly,
            DomainRecurrence::Monthly => SharedRecurrence::Monthly,
            DomainRecurrence::Weekly => SharedRecurrence::Weekly,
        }
    }

    pub fn recurrence_to_domain(dto: SharedRecurrence) -> DomainRecurrence {
        match dto {
            SharedRecurrence::None => DomainRecurrence::None,
            SharedRecurrence::Yearly => DomainRecurrence::Yearly,
            SharedRecurrence::Monthly => DomainRecurrence::Monthly,
            SharedRecurrence::Weekly => DomainRecurrence::Weekly,
        }
    }

    pub fn to_month_dto(domain: CalendarMonth) -> CalendarMonthResponse {
        CalendarMonthResponse {
            family_id: domain.family_id,
            year: domain.month.year,
            month: domain.month.month,
            weeks: domain
                .weeks
                .into_iter()
                .map(|week| CalendarWeek {
                    days: week
                        .days
                        .into_iter()
                        .map(|day| CalendarDayCell {
                            date: format_date(day.date),
                            in_month: day.in_month,
                            events: day.occurrences.into_iter().map(|o| Self::to_dto(o.event)).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    pub fn to_year_dto(domain: YearOverview) -> YearOverviewResponse {
        YearOverviewResponse {
            family_id: domain.family_id,
            year: domain.year,
            months: domain
                .months
                .into_iter()
                .map(|(month, events)| YearOverviewMonth {
                    month,
                    events: events.into_iter().map(Self::to_dto).collect(),
                })
                .collect(),
        }
    }
}
