use std::time::Duration;

use chrono::NaiveDate;
use proptest::prelude::*;

use stockroom_core::{DomainError, Money};
use stockroom_dispatch::{DispatchHeader, DispatchLine, HeaderPatch};
use stockroom_inventory::{BomLine, PartCategory, PartDetails, PartPatch, StockStatus};
use stockroom_receiving::{ArticlePatch, ArticleStatus, CostBreakdown};
use stockroom_vendors::{ContactInfo, VendorPatch};

use super::*;
use crate::reports::{DateRange, UNKNOWN_VENDOR};
use crate::seed::*;

fn seeded() -> InventoryStore {
    let store = InventoryStore::new();
    store.load_seed().unwrap();
    store
}

fn domain(err: StoreError) -> DomainError {
    match err {
        StoreError::Domain(err) => err,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

fn costs(unit: u64) -> CostBreakdown {
    CostBreakdown {
        unit_price: Money::from_major_minor(unit, 0),
        customs_duty: Money::from_major_minor(10, 0),
        sws: Money::from_major_minor(1, 0),
        gst: Money::from_major_minor(18, 0),
        carrier_charges: Money::from_major_minor(5, 0),
    }
}

fn new_article(part_number: &str, quantity: u64) -> NewArticle {
    NewArticle {
        part_number: part_number.to_string(),
        vendor_id: ELECTRONICS_HUB,
        quantity,
        costs: costs(100),
    }
}

fn header(order: &str) -> DispatchHeader {
    DispatchHeader {
        order_number: order.to_string(),
        client_name: "AgriTech Solutions".to_string(),
        ..DispatchHeader::default()
    }
}

fn line(part_number: &str, quantity: u64) -> DispatchLine {
    DispatchLine {
        part_id: None,
        part_number: part_number.to_string(),
        quantity,
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn stock(store: &InventoryStore, part_id: PartId) -> u64 {
    store.part(part_id).unwrap().current_stock()
}

#[test]
fn seed_loads_the_demo_data() {
    let store = seeded();
    assert_eq!(store.list_vendors().unwrap().len(), 3);
    assert_eq!(store.list_parts().unwrap().len(), 6);
    assert_eq!(store.list_articles().unwrap().len(), 4);
    assert_eq!(store.list_dispatches().unwrap().len(), 3);
    assert_eq!(store.list_boms().unwrap().len(), 3);

    let statuses: Vec<ArticleStatus> = store.list_articles().unwrap().iter().map(|a| a.status()).collect();
    assert_eq!(
        statuses,
        vec![
            ArticleStatus::Approved,
            ArticleStatus::QcComplete,
            ArticleStatus::Counted,
            ArticleStatus::Pending,
        ]
    );

    // Seeding replays history without moving stock.
    assert_eq!(stock(&store, FLIGHT_CONTROLLER), 65);
    assert_eq!(store.part_by_number("722201016").unwrap().id_typed(), BATTERY_2200);
}

#[test]
fn seeded_landed_costs_exclude_gst() {
    let store = seeded();
    let motors = store.article(MOTOR_DELIVERY).unwrap();
    assert_eq!(motors.landed_unit_cost(), Money::from_major_minor(1500, 0));
    assert_eq!(motors.costs().gst, Money::from_major_minor(254, 70));
    assert_eq!(motors.final_accepted_quantity(), Some(28));
}

#[test]
fn buildable_units_follow_the_scarcest_component() {
    let store = seeded();
    // min(120/4, 85/4, 65/1, 55/1)
    assert_eq!(store.buildable_units(PRODUCTION_BOM).unwrap(), 21);
    assert_eq!(store.buildable_units(SPARE_BOM).unwrap(), 45);
    assert_eq!(store.buildable_units(ADDON_BOM).unwrap(), 30);

    store.adjust_stock(CW_MOTOR, -82, None).unwrap();
    assert_eq!(store.buildable_units(PRODUCTION_BOM).unwrap(), 0);
}

#[test]
fn approval_adds_the_counted_quantity_to_the_matching_part() {
    let store = seeded();
    let article = store.register_article(new_article("3", 25)).unwrap();
    assert_eq!(article.part_number(), "VD-000003");

    store.record_count(article.id_typed(), 24).unwrap();
    store.complete_qc(article.id_typed(), Some("one unit bent".to_string()), None).unwrap();
    let outcome = store.approve_article(article.id_typed()).unwrap();

    assert_eq!(outcome.article.status(), ArticleStatus::Approved);
    assert_eq!(outcome.part.as_ref().map(|p| p.current_stock()), Some(89));
    assert_eq!(stock(&store, FLIGHT_CONTROLLER), 89);

    let err = store.approve_article(article.id_typed()).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));
    assert_eq!(stock(&store, FLIGHT_CONTROLLER), 89);
}

#[test]
fn verification_without_a_count_falls_back_to_ordered_quantity() {
    let store = seeded();
    let article = store.register_article(new_article("VD-000006", 10)).unwrap();
    store
        .verify_article(
            article.id_typed(),
            Verification {
                counted: true,
                qc_complete: true,
                remarks: Some("fine".to_string()),
                ..Verification::default()
            },
        )
        .unwrap();

    store.approve_article(article.id_typed()).unwrap();
    assert_eq!(stock(&store, GPS_MODULE), 55);
}

#[test]
fn approving_a_zero_count_leaves_stock_alone() {
    let store = seeded();
    let article = store.register_article(new_article("VD-000006", 10)).unwrap();
    store.record_count(article.id_typed(), 0).unwrap();
    store.complete_qc(article.id_typed(), Some("all rejected".to_string()), None).unwrap();

    let outcome = store.approve_article(article.id_typed()).unwrap();
    assert_eq!(outcome.part, None);
    assert_eq!(stock(&store, GPS_MODULE), 45);
}

#[test]
fn approval_without_a_matching_part_still_approves() {
    let store = seeded();
    // The seeded motor delivery references VD-000002, which no part carries.
    let before = store.list_parts().unwrap();
    let outcome = store.approve_article(MOTOR_DELIVERY).unwrap();

    assert_eq!(outcome.article.status(), ArticleStatus::Approved);
    assert_eq!(outcome.part, None);
    assert_eq!(store.list_parts().unwrap(), before);
}

#[test]
fn approval_requires_qc_complete() {
    let store = seeded();
    let err = store.approve_article(CONTROLLER_DELIVERY).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));
    assert_eq!(store.article(CONTROLLER_DELIVERY).unwrap().status(), ArticleStatus::Counted);
}

#[test]
fn verification_can_send_an_article_back_to_pending() {
    let store = seeded();
    let article = store
        .verify_article(MOTOR_DELIVERY, Verification::default())
        .unwrap();
    assert_eq!(article.status(), ArticleStatus::Pending);
    assert_eq!(article.final_accepted_quantity(), None);
    assert_eq!(article.qc_remarks(), None);
}

#[test]
fn approved_articles_cannot_be_deleted_but_pending_ones_can() {
    let store = seeded();
    let err = store.delete_article(PROPELLER_DELIVERY).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));

    store.delete_article(BATTERY_DELIVERY).unwrap();
    assert!(matches!(domain(store.article(BATTERY_DELIVERY).unwrap_err()), DomainError::NotFound));
}

#[test]
fn article_updates_recompute_landed_cost_while_pending() {
    let store = seeded();
    let updated = store
        .update_article(
            BATTERY_DELIVERY,
            ArticlePatch {
                costs: Some(costs(4000)),
                ..ArticlePatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.landed_unit_cost(), Money::from_major_minor(4016, 0));

    let err = store
        .update_article(CONTROLLER_DELIVERY, ArticlePatch::default())
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));
}

#[test]
fn dispatch_subtracts_each_line_and_skips_unknown_parts() {
    let store = seeded();
    let dispatch = store
        .record_dispatch(
            header("ORD-2025-004"),
            vec![line("3", 5), line("VD-000006", 2), line("VD-999999", 1)],
        )
        .unwrap();

    assert_eq!(stock(&store, FLIGHT_CONTROLLER), 60);
    assert_eq!(stock(&store, GPS_MODULE), 43);
    assert_eq!(dispatch.lines().len(), 3);
    assert_eq!(dispatch.lines()[0].part_id, Some(FLIGHT_CONTROLLER));
    assert_eq!(dispatch.lines()[2].part_id, None);
}

#[test]
fn dispatch_that_would_go_negative_changes_nothing() {
    let store = seeded();
    let journal_before = store.journal(0, usize::MAX).unwrap().len();

    let err = store
        .record_dispatch(header("ORD-2025-005"), vec![line("VD-000003", 1), line("VD-000005", 31)])
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::InvariantViolation(_)));

    assert_eq!(stock(&store, FLIGHT_CONTROLLER), 65);
    assert_eq!(stock(&store, CAMERA_HD), 30);
    assert_eq!(store.list_dispatches().unwrap().len(), 3);
    assert_eq!(store.journal(0, usize::MAX).unwrap().len(), journal_before);
}

#[test]
fn repeated_lines_are_checked_against_the_combined_quantity() {
    let store = seeded();
    let err = store
        .record_dispatch(header("ORD-2025-006"), vec![line("VD-000005", 20), line("VD-000005", 11)])
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::InvariantViolation(_)));
    assert_eq!(stock(&store, CAMERA_HD), 30);

    store
        .record_dispatch(header("ORD-2025-006"), vec![line("VD-000005", 20), line("VD-000005", 10)])
        .unwrap();
    assert_eq!(stock(&store, CAMERA_HD), 0);
}

#[test]
fn dispatch_edits_and_deletes_leave_stock_alone() {
    let store = seeded();
    let updated = store
        .update_dispatch(
            ORDER_003,
            HeaderPatch {
                client_name: Some("City Surveillance".to_string()),
                ..HeaderPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.client_name(), "City Surveillance");

    store.delete_dispatch(ORDER_003).unwrap();
    assert_eq!(stock(&store, GPS_MODULE), 45);
    assert_eq!(store.list_dispatches().unwrap().len(), 2);
}

#[test]
fn bom_lines_scale_to_the_requested_units() {
    let store = seeded();
    let lines = store.lines_from_bom(PRODUCTION_BOM, 2).unwrap();
    let summary: Vec<(&str, u64)> = lines.iter().map(|l| (l.part_number.as_str(), l.quantity)).collect();
    assert_eq!(
        summary,
        vec![("VD-722201016", 8), ("VD-722201006", 8), ("VD-000003", 2), ("VD-000004", 2)]
    );

    let err = store.lines_from_bom(PRODUCTION_BOM, 0).unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));
}

#[test]
fn dispatching_bom_lines_consumes_components() {
    let store = seeded();
    let lines = store.lines_from_bom(PRODUCTION_BOM, 5).unwrap();
    store.record_dispatch(header("ORD-2025-007"), lines).unwrap();

    assert_eq!(stock(&store, BATTERY_2200), 100);
    assert_eq!(stock(&store, CW_MOTOR), 65);
    assert_eq!(store.buildable_units(PRODUCTION_BOM).unwrap(), 16);
}

#[test]
fn boms_validate_their_components() {
    let store = seeded();
    let err = store
        .create_bom(
            "Ghost kit".to_string(),
            PartCategory::Addon,
            vec![BomLine::from((PartId::generate(), 1))],
        )
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    let bom = store
        .update_bom(ADDON_BOM, None, Some(vec![BomLine::from((CAMERA_HD, 2)), BomLine::from((GPS_MODULE, 1))]))
        .unwrap();
    assert_eq!(bom.lines().len(), 2);
    assert_eq!(store.buildable_units(ADDON_BOM).unwrap(), 15);
}

#[test]
fn overflowing_bom_quantities_are_rejected_without_poisoning() {
    let store = seeded();
    let err = store
        .create_bom(
            "Huge".to_string(),
            PartCategory::Addon,
            vec![BomLine::from((CAMERA_HD, u64::MAX)), BomLine::from((CAMERA_HD, 1))],
        )
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    assert_eq!(store.list_parts().unwrap().len(), 6);
    assert_eq!(store.list_boms().unwrap().len(), 3);
}

#[test]
fn huge_bom_scales_are_refused_at_dispatch() {
    let store = seeded();
    let lines = store.lines_from_bom(PRODUCTION_BOM, u64::MAX).unwrap();
    assert!(lines.iter().all(|l| l.quantity == u64::MAX));

    let err = store.record_dispatch(header("ORD-2025-900"), lines).unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));
    assert_eq!(stock(&store, BATTERY_2200), 120);
    assert_eq!(store.buildable_units(PRODUCTION_BOM).unwrap(), 21);
}

#[test]
fn parts_used_by_a_bom_cannot_be_deleted() {
    let store = seeded();
    let err = store.delete_part(CAMERA_HD).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));

    // The BOM stays consistent and editable.
    let bom = store
        .update_bom(ADDON_BOM, Some("Renamed addon kit".to_string()), None)
        .unwrap();
    assert_eq!(bom.name(), "Renamed addon kit");
    assert_eq!(store.buildable_units(ADDON_BOM).unwrap(), 30);

    store.delete_bom(ADDON_BOM).unwrap();
    store.delete_part(CAMERA_HD).unwrap();
    assert_eq!(store.list_parts().unwrap().len(), 5);
}

#[test]
fn vendors_with_parts_cannot_be_deleted() {
    let store = seeded();
    let err = store.delete_vendor(ELECTRONICS_HUB).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));

    let vendor = store
        .register_vendor("Frame Works".to_string(), ContactInfo::default())
        .unwrap();
    store.delete_vendor(vendor.id_typed()).unwrap();
    assert_eq!(store.list_vendors().unwrap().len(), 3);
}

#[test]
fn vendor_updates_merge_fields() {
    let store = seeded();
    let vendor = store
        .update_vendor(
            DRONE_MOTORS,
            VendorPatch {
                phone: Some("+91-9000000000".to_string()),
                ..VendorPatch::default()
            },
        )
        .unwrap();
    assert_eq!(vendor.name(), "Drone Motors India");
    assert_eq!(vendor.contact().phone.as_deref(), Some("+91-9000000000"));
    assert_eq!(vendor.contact().email.as_deref(), Some("priya@dronemotors.in"));
}

#[test]
fn part_numbers_stay_unique() {
    let store = seeded();
    let details = PartDetails {
        part_number: "3".to_string(),
        name: "Another controller".to_string(),
        description: String::new(),
        category: PartCategory::Spare,
        min_stock: 5,
        vendor_id: ELECTRONICS_HUB,
        unit_price: Money::from_major_minor(100, 0),
    };
    let err = store.create_part(details.clone(), 0).unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));

    let created = store
        .create_part(PartDetails { part_number: "7".to_string(), ..details }, 3)
        .unwrap();
    assert_eq!(created.part_number(), "VD-000007");

    let err = store
        .update_part(
            created.id_typed(),
            PartPatch {
                part_number: Some("VD-000006".to_string()),
                ..PartPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Conflict(_)));
}

#[test]
fn parts_need_a_known_vendor() {
    let store = seeded();
    let err = store
        .update_part(
            GPS_MODULE,
            PartPatch {
                vendor_id: Some(stockroom_vendors::VendorId::generate()),
                ..PartPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));
}

#[test]
fn manual_adjustments_cannot_drive_stock_negative() {
    let store = seeded();
    let err = store.adjust_stock(CAMERA_HD, -31, None).unwrap_err();
    assert!(matches!(domain(err), DomainError::InvariantViolation(_)));

    let err = store.adjust_stock(CAMERA_HD, 0, None).unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    let part = store
        .adjust_stock(CAMERA_HD, -23, Some("water damage".to_string()))
        .unwrap();
    assert_eq!(part.current_stock(), 7);
    assert_eq!(part.stock_status(), StockStatus::Critical);
}

#[test]
fn dashboard_reports_capacity_and_low_stock() {
    let store = seeded();
    let dashboard = store.dashboard().unwrap();
    assert_eq!(dashboard.production_buildable, 21);
    assert!(dashboard.low_stock.is_empty());
    assert_eq!(dashboard.totals.parts, 6);
    assert_eq!(dashboard.totals.awaiting_approval, 3);

    let production = &dashboard.sections[0];
    assert_eq!(production.category, PartCategory::Production);
    assert_eq!(production.parts.len(), 5);
    assert_eq!(production.parts[0].bom_quantity, Some(4));

    store.adjust_stock(CAMERA_HD, -20, None).unwrap();
    store.adjust_stock(GPS_MODULE, -40, None).unwrap();
    let dashboard = store.dashboard().unwrap();
    let low: Vec<(PartId, StockStatus)> = dashboard.low_stock.iter().map(|p| (p.part_id, p.status)).collect();
    assert_eq!(
        low,
        vec![(GPS_MODULE, StockStatus::Critical), (CAMERA_HD, StockStatus::Low)]
    );
}

#[test]
fn outbound_report_filters_by_dispatch_date() {
    let store = seeded();
    let report = store
        .outbound_report(DateRange::new(day(2025, 6, 15), day(2025, 6, 20)).unwrap())
        .unwrap();
    let orders: Vec<&str> = report.dispatches.iter().map(|d| d.order_number()).collect();
    assert_eq!(orders, vec!["ORD-2025-001", "ORD-2025-002"]);
    assert_eq!(report.total_units, 21);
}

#[test]
fn oversized_unmatched_dispatch_lines_are_rejected() {
    let store = seeded();
    let err = store
        .record_dispatch(header("ORD-Y"), vec![line("NOPE-1", 1 << 63), line("NOPE-2", 1 << 63)])
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    // Lines up to the cap are kept; the report total saturates instead of wrapping.
    let cap = stockroom_dispatch::MAX_DISPATCH_UNITS;
    let half = cap / 2;
    let dispatch = store
        .record_dispatch(header("ORD-Z"), vec![line("NOPE-1", half), line("NOPE-2", half)])
        .unwrap();
    assert_eq!(dispatch.total_units(), half * 2);
    store.record_dispatch(header("ORD-Z2"), vec![line("NOPE-3", cap)]).unwrap();
    store.record_dispatch(header("ORD-Z3"), vec![line("NOPE-4", cap)]).unwrap();

    let today = chrono::Utc::now().date_naive();
    let report = store.outbound_report(DateRange::last_week(today)).unwrap();
    assert_eq!(report.dispatches.len(), 3);
    assert_eq!(report.total_units, u64::MAX);
    assert_eq!(store.list_dispatches().unwrap().len(), 6);
}

#[test]
fn inbound_report_groups_by_vendor() {
    let store = seeded();
    let report = store
        .inbound_report(DateRange::new(day(2025, 7, 1), day(2025, 7, 10)).unwrap())
        .unwrap();

    let groups: Vec<(&str, usize, Money)> = report
        .groups
        .iter()
        .map(|g| (g.vendor_name.as_str(), g.articles.len(), g.total_value))
        .collect();
    assert_eq!(
        groups,
        vec![
            ("Tech Propellers Ltd.", 1, Money::from_major_minor(40_000, 0)),
            ("Drone Motors India", 1, Money::from_major_minor(34_500, 0)),
            ("Electronics Hub", 1, Money::from_major_minor(85_000, 0)),
        ]
    );
    assert_eq!(report.total_value, Money::from_major_minor(159_500, 0));
}

#[test]
fn inbound_report_names_missing_vendors() {
    let store = seeded();
    let vendor = store
        .register_vendor("Short Lived".to_string(), ContactInfo::default())
        .unwrap();
    store
        .register_article(NewArticle {
            vendor_id: vendor.id_typed(),
            ..new_article("VD-000006", 3)
        })
        .unwrap();
    store.delete_vendor(vendor.id_typed()).unwrap();

    let today = chrono::Utc::now().date_naive();
    let report = store.inbound_report(DateRange::new(today, today).unwrap()).unwrap();
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].vendor_name, UNKNOWN_VENDOR);
}

#[test]
fn production_completions_are_recorded() {
    let store = seeded();
    let err = store.record_completion(0, None).unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    let err = store.record_completion(3, Some(BomId::generate())).unwrap_err();
    assert!(matches!(domain(err), DomainError::Validation(_)));

    let completion = store.record_completion(3, Some(PRODUCTION_BOM)).unwrap();
    assert_eq!(store.completions().unwrap(), vec![completion]);
    assert_eq!(stock(&store, BATTERY_2200), 120);
}

#[test]
fn committed_changes_are_journaled_and_published() {
    let store = seeded();
    let subscription = store.subscribe();
    let seeded_entries = store.journal(0, usize::MAX).unwrap().len() as u64;

    let vendor = store
        .register_vendor("Frame Works".to_string(), ContactInfo::default())
        .unwrap();

    let entry = subscription.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(entry.event_type(), "vendors.vendor.registered");
    assert_eq!(entry.sequence_number(), seeded_entries + 1);
    assert_eq!(entry.aggregate_id(), vendor.id_typed().0);

    let tail = store.journal(seeded_entries, 10).unwrap();
    assert_eq!(tail, vec![entry]);
    assert_eq!(store.history(vendor.id_typed().0).unwrap().len(), 1);
}

#[test]
fn approval_publishes_article_and_stock_events_together() {
    let store = seeded();
    let article = store.register_article(new_article("VD-000006", 4)).unwrap();
    store.record_count(article.id_typed(), 4).unwrap();
    store.complete_qc(article.id_typed(), None, None).unwrap();

    let subscription = store.subscribe();
    store.approve_article(article.id_typed()).unwrap();

    let types: Vec<String> = (0..2)
        .map(|_| subscription.recv_timeout(Duration::from_secs(1)).unwrap().event_type().to_string())
        .collect();
    assert_eq!(types, vec!["receiving.article.approved", "inventory.part.stock_adjusted"]);
}

proptest! {
    #[test]
    fn dispatches_never_drive_stock_negative(quantities in prop::collection::vec(1u64..30, 1..12)) {
        let store = seeded();
        let mut expected = 45u64;

        for (n, quantity) in quantities.into_iter().enumerate() {
            let result = store.record_dispatch(header(&format!("ORD-P-{n}")), vec![line("VD-000006", quantity)]);
            if quantity <= expected {
                prop_assert!(result.is_ok());
                expected -= quantity;
            } else {
                prop_assert!(result.is_err());
            }
            prop_assert_eq!(stock(&store, GPS_MODULE), expected);
        }
    }

    #[test]
    fn any_dispatch_quantity_leaves_the_store_usable(quantities in prop::collection::vec(1u64..=u64::MAX, 1..4)) {
        let store = seeded();
        let lines: Vec<DispatchLine> = quantities
            .iter()
            .enumerate()
            .map(|(n, q)| line(if n == 0 { "VD-000006" } else { "NOPE" }, *q))
            .collect();

        let result = store.record_dispatch(header("ORD-P-WIDE"), lines);
        let gps = stock(&store, GPS_MODULE);
        match result {
            Ok(_) => prop_assert_eq!(gps, 45 - quantities[0]),
            Err(_) => prop_assert_eq!(gps, 45),
        }
        prop_assert!(store.outbound_report(DateRange::last_week(chrono::Utc::now().date_naive())).is_ok());
    }
}
