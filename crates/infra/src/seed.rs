//! Demo data the service starts with.
//!
//! The records are imported as history: each aggregate is driven through its
//! own commands (so the journal tells the same story as the tables) but no
//! cross-aggregate stock rule runs. Stock levels are taken as given.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use stockroom_core::{Aggregate, AggregateId, DomainError, Money};
use stockroom_dispatch::{
    DispatchCommand, DispatchHeader, DispatchId, DispatchLine, OutboundDispatch, RecordDispatch,
};
use stockroom_events::Event;
use stockroom_inventory::{
    Bom, BomCommand, BomId, BomLine, CreateBom, CreatePart, Part, PartCategory, PartCommand,
    PartDetails, PartId,
};
use stockroom_receiving::{
    Approve, ArticleCommand, ArticleId, CompleteQc, CostBreakdown, IncomingArticle, RecordCount,
    RegisterArticle,
};
use stockroom_vendors::{ContactInfo, RegisterVendor, Vendor, VendorCommand, VendorId};

use crate::error::StoreResult;
use crate::journal::Batch;
use crate::store::{ARTICLE, BOM, DISPATCH, PART, State, VENDOR};

pub const TECH_PROPELLERS: VendorId = VendorId(AggregateId::from_u128(0x0001_0001));
pub const DRONE_MOTORS: VendorId = VendorId(AggregateId::from_u128(0x0001_0002));
pub const ELECTRONICS_HUB: VendorId = VendorId(AggregateId::from_u128(0x0001_0003));

pub const BATTERY_2200: PartId = PartId(AggregateId::from_u128(0x0002_0001));
pub const CW_MOTOR: PartId = PartId(AggregateId::from_u128(0x0002_0002));
pub const FLIGHT_CONTROLLER: PartId = PartId(AggregateId::from_u128(0x0002_0003));
pub const LIPO_4S: PartId = PartId(AggregateId::from_u128(0x0002_0004));
pub const CAMERA_HD: PartId = PartId(AggregateId::from_u128(0x0002_0005));
pub const GPS_MODULE: PartId = PartId(AggregateId::from_u128(0x0002_0006));

pub const PROPELLER_DELIVERY: ArticleId = ArticleId(AggregateId::from_u128(0x0003_0001));
pub const MOTOR_DELIVERY: ArticleId = ArticleId(AggregateId::from_u128(0x0003_0002));
pub const CONTROLLER_DELIVERY: ArticleId = ArticleId(AggregateId::from_u128(0x0003_0003));
pub const BATTERY_DELIVERY: ArticleId = ArticleId(AggregateId::from_u128(0x0003_0004));

pub const ORDER_001: DispatchId = DispatchId(AggregateId::from_u128(0x0004_0001));
pub const ORDER_002: DispatchId = DispatchId(AggregateId::from_u128(0x0004_0002));
pub const ORDER_003: DispatchId = DispatchId(AggregateId::from_u128(0x0004_0003));

pub const PRODUCTION_BOM: BomId = BomId(AggregateId::from_u128(0x0005_0001));
pub const SPARE_BOM: BomId = BomId(AggregateId::from_u128(0x0005_0002));
pub const ADDON_BOM: BomId = BomId(AggregateId::from_u128(0x0005_0003));

/// Load the demo data set into an empty state.
pub(crate) fn load(state: &mut State) -> StoreResult<()> {
    let mut batch = state.journal.batch();
    let opened = at(2025, 6, 1, 9, 0);

    for vendor in vendors(opened) {
        let id = vendor_id_of(&vendor);
        let vendor = import(&mut batch, Vendor::empty(id), id.0, VENDOR, &[vendor])?;
        state.vendors.upsert(id, vendor);
    }

    for (part_id, details, stock) in parts() {
        let command = PartCommand::CreatePart(CreatePart {
            part_id,
            details,
            initial_stock: stock,
            occurred_at: opened,
        });
        let part = import(&mut batch, Part::empty(part_id), part_id.0, PART, &[command])?;
        state.parts.upsert(part_id, part);
    }

    for (article_id, commands) in articles() {
        let article = import(&mut batch, IncomingArticle::empty(article_id), article_id.0, ARTICLE, &commands)?;
        state.articles.upsert(article_id, article);
    }

    for command in dispatches() {
        let DispatchCommand::RecordDispatch(record) = &command else {
            continue;
        };
        let id = record.dispatch_id;
        let dispatch = import(&mut batch, OutboundDispatch::empty(id), id.0, DISPATCH, &[command])?;
        state.dispatches.upsert(id, dispatch);
    }

    for command in boms(opened) {
        let BomCommand::CreateBom(create) = &command else {
            continue;
        };
        let id = create.bom_id;
        let bom = import(&mut batch, Bom::empty(id), id.0, BOM, &[command])?;
        state.boms.upsert(id, bom);
    }

    state.journal.commit(batch);
    Ok(())
}

/// Drive a fresh aggregate through `commands`, staging every event.
fn import<A>(
    batch: &mut Batch,
    mut aggregate: A,
    aggregate_id: AggregateId,
    aggregate_type: &str,
    commands: &[A::Command],
) -> StoreResult<A>
where
    A: Aggregate<Error = DomainError>,
    A::Event: Event + Serialize,
{
    for command in commands {
        let events = aggregate.execute(command)?;
        batch.push(aggregate_id, aggregate_type, &events)?;
    }
    Ok(aggregate)
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

fn rupees(amount: u64) -> Money {
    Money::from_major_minor(amount, 0)
}

fn vendor_id_of(command: &VendorCommand) -> VendorId {
    match command {
        VendorCommand::RegisterVendor(c) => c.vendor_id,
        VendorCommand::UpdateVendor(c) => c.vendor_id,
        VendorCommand::RemoveVendor(c) => c.vendor_id,
    }
}

fn vendors(occurred_at: DateTime<Utc>) -> Vec<VendorCommand> {
    let vendor = |vendor_id, name: &str, person: &str, email: &str, phone: &str, address: &str| {
        VendorCommand::RegisterVendor(RegisterVendor {
            vendor_id,
            name: name.to_string(),
            contact: ContactInfo {
                contact_person: Some(person.to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                address: Some(address.to_string()),
            },
            occurred_at,
        })
    };

    vec![
        vendor(
            TECH_PROPELLERS,
            "Tech Propellers Ltd.",
            "Rahul Sharma",
            "rahul@techpropellers.com",
            "+91-9876543210",
            "123 Industrial Area, Bengaluru",
        ),
        vendor(
            DRONE_MOTORS,
            "Drone Motors India",
            "Priya Patel",
            "priya@dronemotors.in",
            "+91-9876543211",
            "456 Tech Park, Chennai",
        ),
        vendor(
            ELECTRONICS_HUB,
            "Electronics Hub",
            "Amit Kumar",
            "amit@electronichub.in",
            "+91-9876543212",
            "789 Electronics Zone, Delhi",
        ),
    ]
}

fn parts() -> Vec<(PartId, PartDetails, u64)> {
    let part = |id, number: &str, name: &str, description: &str, category, stock, min, vendor, price| {
        let details = PartDetails {
            part_number: number.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            min_stock: min,
            vendor_id: vendor,
            unit_price: rupees(price),
        };
        (id, details, stock)
    };

    use PartCategory::{Production, Spare};
    vec![
        part(BATTERY_2200, "722201016", "Battery 2200 mAh", "Batteries for basic vikas kit", Production, 120, 50, TECH_PROPELLERS, 1300),
        part(CW_MOTOR, "722201006", "CW_Motor", "2212 920KV brushless motor", Production, 85, 40, DRONE_MOTORS, 1200),
        part(FLIGHT_CONTROLLER, "VD-000003", "Flight Controller F7", "F7 flight controller with gyro", Production, 65, 25, ELECTRONICS_HUB, 3500),
        part(LIPO_4S, "VD-000004", "LiPo Battery 4S 5000mAh", "4S 5000mAh 50C LiPo battery", Production, 55, 20, ELECTRONICS_HUB, 4800),
        part(CAMERA_HD, "VD-000005", "Camera Module HD", "HD camera module with gimbal", Production, 30, 15, ELECTRONICS_HUB, 5500),
        part(GPS_MODULE, "VD-000006", "GPS Module", "GPS module with compass", Spare, 45, 20, ELECTRONICS_HUB, 2200),
    ]
}

/// Each delivery with the workflow steps it has been through.
fn articles() -> Vec<(ArticleId, Vec<ArticleCommand>)> {
    let register = |article_id, part_number: &str, vendor_id, quantity, costs, occurred_at| {
        ArticleCommand::RegisterArticle(RegisterArticle {
            article_id,
            part_number: part_number.to_string(),
            vendor_id,
            quantity,
            costs,
            occurred_at,
        })
    };
    let count = |article_id, final_accepted_quantity, occurred_at| {
        ArticleCommand::RecordCount(RecordCount {
            article_id,
            final_accepted_quantity,
            occurred_at,
        })
    };
    let qc = |article_id, remarks: &str, checklist_url: Option<&str>, occurred_at| {
        ArticleCommand::CompleteQc(CompleteQc {
            article_id,
            remarks: Some(remarks.to_string()),
            checklist_url: checklist_url.map(str::to_string),
            occurred_at,
        })
    };
    let costs = |unit, duty, sws, gst: Money, carrier| CostBreakdown {
        unit_price: rupees(unit),
        customs_duty: rupees(duty),
        sws: rupees(sws),
        gst,
        carrier_charges: rupees(carrier),
    };

    let propellers = at(2025, 7, 1, 10, 30);
    let motors = at(2025, 7, 5, 14, 45);
    let controllers = at(2025, 7, 10, 9, 15);
    let batteries = at(2025, 7, 15, 16, 20);

    vec![
        (
            PROPELLER_DELIVERY,
            vec![
                register(PROPELLER_DELIVERY, "VD-000001", TECH_PROPELLERS, 50, costs(800, 120, 20, rupees(168), 50), propellers),
                count(PROPELLER_DELIVERY, 50, propellers),
                qc(PROPELLER_DELIVERY, "All propellers in good condition", None, propellers),
                ArticleCommand::Approve(Approve {
                    article_id: PROPELLER_DELIVERY,
                    occurred_at: propellers,
                }),
            ],
        ),
        (
            MOTOR_DELIVERY,
            vec![
                register(MOTOR_DELIVERY, "VD-000002", DRONE_MOTORS, 30, costs(1150, 230, 35, Money::from_major_minor(254, 70), 85), motors),
                count(MOTOR_DELIVERY, 28, motors),
                qc(MOTOR_DELIVERY, "Two motors have wiring issues", Some("https://example.com/checklist/motor-i2"), motors),
            ],
        ),
        (
            CONTROLLER_DELIVERY,
            vec![
                register(CONTROLLER_DELIVERY, "VD-000003", ELECTRONICS_HUB, 25, costs(3400, 510, 75, Money::from_major_minor(714, 50), 120), controllers),
                count(CONTROLLER_DELIVERY, 25, controllers),
            ],
        ),
        (
            BATTERY_DELIVERY,
            vec![register(BATTERY_DELIVERY, "VD-000004", ELECTRONICS_HUB, 20, costs(4700, 705, 94, Money::from_major_minor(988, 78), 150), batteries)],
        ),
    ]
}

fn dispatches() -> Vec<DispatchCommand> {
    let line = |part_id, part_number: &str, quantity| DispatchLine {
        part_id: Some(part_id),
        part_number: part_number.to_string(),
        quantity,
    };
    let drone_kit = || {
        vec![
            line(BATTERY_2200, "VD-000001", 4),
            line(CW_MOTOR, "VD-000002", 4),
            line(FLIGHT_CONTROLLER, "VD-000003", 1),
            line(LIPO_4S, "VD-000004", 1),
        ]
    };
    let record = |dispatch_id, order: &str, client: &str, serials: Option<(&str, &str)>, lines, occurred_at| {
        DispatchCommand::RecordDispatch(RecordDispatch {
            dispatch_id,
            header: DispatchHeader {
                order_number: order.to_string(),
                client_name: client.to_string(),
                drone_serial_no: serials.map(|(drone, _)| drone.to_string()),
                battery_serial_no: serials.map(|(_, battery)| battery.to_string()),
            },
            lines,
            occurred_at,
        })
    };

    let mut surveillance_kit = drone_kit();
    surveillance_kit.push(line(CAMERA_HD, "VD-000005", 1));

    vec![
        record(ORDER_001, "ORD-2025-001", "AgriTech Solutions", Some(("VD-DRONE-001", "VD-BAT-001")), drone_kit(), at(2025, 6, 15, 10, 0)),
        record(ORDER_002, "ORD-2025-002", "City Surveillance", Some(("VD-DRONE-002", "VD-BAT-002")), surveillance_kit, at(2025, 6, 20, 14, 30)),
        record(ORDER_003, "ORD-2025-003", "AgriTech Solutions", None, vec![line(GPS_MODULE, "VD-000006", 2)], at(2025, 6, 25, 11, 45)),
    ]
}

fn boms(occurred_at: DateTime<Utc>) -> Vec<BomCommand> {
    let bom = |bom_id, name: &str, category, lines: &[(PartId, u64)]| {
        BomCommand::CreateBom(CreateBom {
            bom_id,
            name: name.to_string(),
            category,
            lines: lines.iter().copied().map(BomLine::from).collect(),
            occurred_at,
        })
    };

    vec![
        bom(
            PRODUCTION_BOM,
            "Production drone",
            PartCategory::Production,
            &[(BATTERY_2200, 4), (CW_MOTOR, 4), (FLIGHT_CONTROLLER, 1), (LIPO_4S, 1)],
        ),
        bom(
            SPARE_BOM,
            "Spare kit",
            PartCategory::Spare,
            &[(BATTERY_2200, 2), (CW_MOTOR, 1), (GPS_MODULE, 1)],
        ),
        bom(ADDON_BOM, "Add-on pack", PartCategory::Addon, &[(CAMERA_HD, 1)]),
    ]
}
