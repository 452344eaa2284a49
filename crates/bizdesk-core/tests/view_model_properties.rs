#![allow(clippy::cast_precision_loss)]

use bizdesk_core::aggregate::{average, count, count_by, support_summary, sum};
use bizdesk_core::model::{
    OwnerId, Record, RecordId, RecordMeta, Ticket, TicketPriority, TicketStatus,
};
use bizdesk_core::view_model::{StatusFilter, filter_records, group_by_status, search_records};
use chrono::{DateTime, NaiveDate, Utc};
use proptest::prelude::*;

fn arb_ticket() -> impl Strategy<Value = Record<Ticket>> {
    (
        "[a-z0-9]{1,8}",
        "[A-Za-z ]{0,12}",
        prop::sample::select(TicketStatus::ALL),
        0i64..2_000_000,
        proptest::option::of(0i64..2_000_000),
    )
        .prop_map(|(id, title, status, created, updated)| Record {
            meta: RecordMeta {
                id: RecordId::new(id),
                owner: OwnerId::new("u1"),
                created_at: DateTime::<Utc>::from_timestamp(created, 0).unwrap_or_default(),
                updated_at: updated.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
            },
            fields: Ticket {
                title,
                description: String::new(),
                status,
                priority: TicketPriority::Low,
                customer_name: String::new(),
                customer_email: String::new(),
                assigned_to: String::new(),
                category: String::new(),
                satisfaction_rating: None,
            },
        })
}

fn arb_tickets() -> impl Strategy<Value = Vec<Record<Ticket>>> {
    prop::collection::vec(arb_ticket(), 0..40)
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn average_lies_between_min_and_max(values in prop::collection::vec(-1e6f64..1e6, 1..50)) {
        let avg = average(&values, |v| *v);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(avg >= min - 1e-6 && avg <= max + 1e-6);
        prop_assert!((avg * values.len() as f64 - sum(&values, |v| *v)).abs() < 1e-3);
    }

    #[test]
    fn count_by_partitions_the_input(tickets in arb_tickets()) {
        let counts = count_by(&tickets, |t| t.fields.status);
        prop_assert_eq!(counts.values().sum::<usize>(), tickets.len());
        for (status, n) in &counts {
            prop_assert_eq!(*n, count(&tickets, |t| t.fields.status == *status));
        }
    }

    #[test]
    fn unfiltered_view_is_the_collection(tickets in arb_tickets()) {
        prop_assert_eq!(filter_records(&tickets, "", StatusFilter::All), tickets.clone());
        prop_assert_eq!(search_records(&tickets, ""), tickets);
    }

    #[test]
    fn search_is_a_plain_substring_match(tickets in arb_tickets(), term in "[a-zA-Z ]{1,3}") {
        let needle = term.to_lowercase();
        let expected: Vec<_> = tickets
            .iter()
            .filter(|t| t.fields.title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        prop_assert_eq!(search_records(&tickets, &term), expected.clone());
        prop_assert_eq!(filter_records(&tickets, &term, StatusFilter::All), expected);
    }

    #[test]
    fn filtered_view_is_an_ordered_subset(
        tickets in arb_tickets(),
        term in "[a-zA-Z]{0,2}",
        status in prop::sample::select(TicketStatus::ALL),
    ) {
        let view = filter_records(&tickets, &term, StatusFilter::Only(status));
        let needle = term.to_lowercase();
        let mut cursor = tickets.iter();
        for record in &view {
            prop_assert_eq!(record.fields.status, status);
            prop_assert!(record.fields.title.to_lowercase().contains(&needle));
            prop_assert!(cursor.any(|candidate| candidate == record));
        }
        let expected = tickets
            .iter()
            .filter(|t| t.fields.status == status && t.fields.title.to_lowercase().contains(&needle))
            .count();
        prop_assert_eq!(view.len(), expected);
    }

    #[test]
    fn search_ignores_case(tickets in arb_tickets(), term in "[a-z]{1,2}") {
        let lower = search_records(&tickets, &term);
        let upper = search_records(&tickets, &term.to_uppercase());
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn groups_cover_every_record_once(tickets in arb_tickets()) {
        let groups = group_by_status(&tickets);
        prop_assert_eq!(groups.values().map(Vec::len).sum::<usize>(), tickets.len());
        for (status, members) in &groups {
            prop_assert!(members.iter().all(|t| t.fields.status == *status));
        }
    }

    #[test]
    fn support_counts_never_exceed_total(tickets in arb_tickets(), day in 0i64..30) {
        let today = NaiveDate::from_num_days_from_ce_opt(719_163 + i32::try_from(day).unwrap_or(0))
            .unwrap_or_default();
        let summary = support_summary(&tickets, today);
        prop_assert!(summary.open + summary.in_progress + summary.resolved_today <= tickets.len());
        prop_assert_eq!(summary.open, count(&tickets, |t| t.fields.status == TicketStatus::Open));
    }
}

fn titled(id: &str, title: &str) -> Record<Ticket> {
    Record {
        meta: RecordMeta {
            id: RecordId::new(id),
            owner: OwnerId::new("u1"),
            created_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_default(),
            updated_at: None,
        },
        fields: Ticket {
            title: title.into(),
            description: String::new(),
            status: TicketStatus::Open,
            priority: TicketPriority::Low,
            customer_name: String::new(),
            customer_email: String::new(),
            assigned_to: String::new(),
            category: String::new(),
            satisfaction_rating: None,
        },
    }
}

#[test]
fn surrounding_whitespace_is_part_of_the_term() {
    let tickets = vec![titled("a", "Printer jam"), titled("b", "Jammed")];

    let leading = filter_records(&tickets, " jam", StatusFilter::All);
    assert_eq!(leading.len(), 1);
    assert_eq!(leading[0].id().as_str(), "a");

    let blank = search_records(&tickets, " ");
    assert_eq!(blank.len(), 1);
    assert_eq!(blank[0].id().as_str(), "a");

    assert!(search_records(&tickets, "jam ").is_empty());
}
