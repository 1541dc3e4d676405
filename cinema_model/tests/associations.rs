/// Relationship behaviour across the whole model: symmetry, ownership,
/// multiplicities, cascades, the order discriminator and keyed seats.

mod common;

use cinema_model::associations::RoleOwnership;
use cinema_model::domain::{
    ContractTerms, EquipmentKind, OrderStatus, OrderType, RoleType, SeatType,
};
use cinema_model::hashing::canonical_hash;
use cinema_model::link::{self, Change};
use cinema_model::{
    check_invariants, Cinema, Document, Id, ModelError, NewCustomer, NewReview, NewRole, NewSeat,
    NewShift, NewTicket,
};

use common::{at, date, person, Fixture};

fn seat(cinema: &mut Cinema) -> Id<cinema_model::domain::Seat> {
    cinema
        .add_seat(NewSeat {
            seat_type: SeatType::Normal,
            normal_price_cents: 1_800,
            accessible: true,
            vip_multiplier_pct: None,
        })
        .unwrap()
}

// ---------------------------------------------------------------------------
// Symmetry
// ---------------------------------------------------------------------------

#[test]
fn contract_link_is_symmetric_and_idempotent() {
    let mut f = Fixture::new();
    let contract = f.cinema.entity(f.manager).unwrap().contract.unwrap();
    assert_eq!(f.cinema.entity(contract).unwrap().employee, Some(f.manager));

    assert_eq!(f.cinema.change_contract(f.manager, Some(contract)).unwrap(), Change::Unchanged);
    assert_eq!(f.cinema.change_contract(f.manager, None).unwrap(), Change::Unlinked);
    assert_eq!(f.cinema.entity(contract).unwrap().employee, None);

    assert_eq!(f.cinema.change_contract(f.clerk, Some(contract)).unwrap(), Change::Linked);
    assert_eq!(f.cinema.entity(contract).unwrap().employee, Some(f.clerk));
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn occupied_one_to_one_target_is_rejected() {
    let mut f = Fixture::new();
    let contract = f.cinema.entity(f.manager).unwrap().contract.unwrap();
    let err = f.cinema.change_contract(f.clerk, Some(contract)).unwrap_err();
    assert!(matches!(err, ModelError::SlotOccupied { .. }));
    assert_eq!(f.cinema.entity(f.clerk).unwrap().contract, None);
}

#[test]
fn equipment_moves_between_halls() {
    let mut f = Fixture::new();
    let side = f.cinema.add_hall("Side", 10).unwrap();
    let projector = f
        .cinema
        .add_equipment(EquipmentKind::Projection, date(2023, 9, 1), Some(f.hall))
        .unwrap();
    assert_eq!(f.cinema.entity(f.hall).unwrap().equipment, vec![projector]);

    assert_eq!(f.cinema.move_equipment(projector, Some(side)).unwrap(), Change::Relinked);
    assert!(f.cinema.entity(f.hall).unwrap().equipment.is_empty());
    assert_eq!(f.cinema.entity(side).unwrap().equipment, vec![projector]);

    assert_eq!(f.cinema.move_equipment(projector, None).unwrap(), Change::Unlinked);
    assert!(f.cinema.entity(side).unwrap().equipment.is_empty());
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn many_to_many_link_and_unlink_are_mirrored() {
    let mut f = Fixture::new();
    let promo = f
        .cinema
        .add_promotion(cinema_model::NewPromotion {
            valid_from: date(2024, 1, 1),
            valid_to: date(2024, 3, 31),
            description: "Winter evenings".into(),
            discount_cents: 300,
        })
        .unwrap();
    assert_eq!(f.cinema.attach_promotion(f.session, promo).unwrap(), Change::Linked);
    assert_eq!(f.cinema.attach_promotion(f.session, promo).unwrap(), Change::Unchanged);
    assert_eq!(f.cinema.entity(promo).unwrap().sessions, vec![f.session]);
    assert_eq!(f.cinema.active_promotions(date(2024, 2, 10)), vec![promo]);
    assert!(f.cinema.active_promotions(date(2024, 4, 1)).is_empty());

    assert_eq!(f.cinema.detach_promotion(f.session, promo).unwrap(), Change::Unlinked);
    assert_eq!(f.cinema.detach_promotion(f.session, promo).unwrap(), Change::Unchanged);
    assert!(f.cinema.entity(promo).unwrap().sessions.is_empty());
}

// ---------------------------------------------------------------------------
// Composition and multiplicity
// ---------------------------------------------------------------------------

#[test]
fn role_cannot_change_owner() {
    let mut f = Fixture::new();
    let err = link::set::<RoleOwnership, _>(&mut f.cinema, f.technician, Some(f.clerk)).unwrap_err();
    assert!(matches!(err, ModelError::AlreadyOwned { .. }));
    let err = link::set::<RoleOwnership, _>(&mut f.cinema, f.technician, None).unwrap_err();
    assert!(matches!(err, ModelError::Multiplicity { min: 1, .. }));
    assert_eq!(f.cinema.entity(f.technician).unwrap().employee, Some(f.manager));
}

#[test]
fn duplicate_role_type_is_rejected() {
    let mut f = Fixture::new();
    let err = f
        .cinema
        .assign_role(
            f.manager,
            NewRole::Technician {
                degree: "Optics".into(),
                on_call: true,
            },
        )
        .unwrap_err();
    assert!(matches!(err, ModelError::DuplicateRole { .. }));
}

#[test]
fn ticket_in_one_order_cannot_join_another() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let t2 = f.ticket(1);
    let first = f.cinema.place_order(f.box_office_order(vec![t1, t2])).unwrap();
    let t3 = f.ticket(2);
    let second = f.cinema.place_order(f.box_office_order(vec![t3])).unwrap();

    let err = f.cinema.add_ticket_to_order(second, t1).unwrap_err();
    assert!(matches!(err, ModelError::AlreadyOwned { .. }));
    let err = f.cinema.place_order(f.box_office_order(vec![t2])).unwrap_err();
    assert!(matches!(err, ModelError::AlreadyOwned { .. }));

    assert_eq!(f.cinema.remove_ticket_from_order(first, t1).unwrap(), Change::Unlinked);
    assert_eq!(f.cinema.add_ticket_to_order(second, t1).unwrap(), Change::Linked);
    assert_eq!(f.cinema.entity(second).unwrap().tickets, vec![t3, t1]);
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn last_ticket_cannot_leave_order() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.box_office_order(vec![t1])).unwrap();
    let err = f.cinema.remove_ticket_from_order(order, t1).unwrap_err();
    assert!(matches!(err, ModelError::Multiplicity { min: 1, .. }));
    assert_eq!(f.cinema.entity(t1).unwrap().order, Some(order));
}

#[test]
fn empty_order_is_rejected() {
    let mut f = Fixture::new();
    let err = f.cinema.place_order(f.box_office_order(Vec::new())).unwrap_err();
    assert!(matches!(err, ModelError::MissingReference { .. }));
}

#[test]
fn last_technician_cannot_be_removed() {
    let mut f = Fixture::new();
    let err = f.cinema.remove_technician(f.session, f.technician).unwrap_err();
    assert!(matches!(err, ModelError::Multiplicity { .. }));

    let second = f
        .cinema
        .assign_role(
            f.clerk,
            NewRole::Technician {
                degree: "Media Arts".into(),
                on_call: true,
            },
        )
        .unwrap();
    assert_eq!(f.cinema.add_technician(f.session, second).unwrap(), Change::Linked);
    assert_eq!(f.cinema.remove_technician(f.session, f.technician).unwrap(), Change::Unlinked);
    assert_eq!(f.cinema.entity(f.session).unwrap().technicians, vec![second]);
    assert!(f.cinema.entity(f.technician).unwrap().sessions.is_empty());
}

#[test]
fn session_technicians_must_be_technicians() {
    let mut f = Fixture::new();
    let err = f.cinema.add_technician(f.session, f.cleaner).unwrap_err();
    assert!(matches!(err, ModelError::WrongRoleKind { .. }));
}

// ---------------------------------------------------------------------------
// Supervision
// ---------------------------------------------------------------------------

#[test]
fn supervision_rejects_self_and_cycles() {
    let mut f = Fixture::new();
    let err = f.cinema.assign_supervisor(f.manager, f.manager).unwrap_err();
    assert!(matches!(err, ModelError::SelfReference { .. }));

    f.cinema.assign_supervisor(f.clerk, f.manager).unwrap();
    let err = f.cinema.assign_supervisor(f.manager, f.clerk).unwrap_err();
    assert!(matches!(err, ModelError::Cycle { .. }));

    assert_eq!(f.cinema.chain_of_command(f.clerk), vec![f.manager]);
    assert_eq!(f.cinema.subordinates(f.manager), vec![f.clerk]);

    f.cinema.remove_supervisor(f.clerk).unwrap();
    assert!(f.cinema.subordinates(f.manager).is_empty());
    let err = f.cinema.remove_supervisor(f.clerk).unwrap_err();
    assert!(matches!(err, ModelError::NotLinked { .. }));
}

// ---------------------------------------------------------------------------
// Cascade
// ---------------------------------------------------------------------------

#[test]
fn deleting_a_hall_cascades_to_its_parts() {
    let mut f = Fixture::new();
    let projector = f
        .cinema
        .add_equipment(EquipmentKind::Audio, date(2023, 5, 5), Some(f.hall))
        .unwrap();
    f.cinema
        .add_shift(NewShift {
            cleaner: f.cleaner,
            hall: f.hall,
            start_time: at(2024, 2, 10, 8),
            end_time: at(2024, 2, 10, 11),
        })
        .unwrap();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.box_office_order(vec![t1])).unwrap();

    // 5 seats, 1 session, 1 ticket, 1 shift, the hall.
    assert_eq!(f.cinema.delete(f.hall).unwrap(), 9);

    assert!(!f.cinema.contains(f.hall));
    assert!(!f.cinema.contains(f.session));
    assert!(!f.cinema.contains(t1));
    assert!(f.seats.iter().all(|s| !f.cinema.contains(*s)));
    assert_eq!(f.cinema.entity(projector).unwrap().hall, None);
    assert!(f.cinema.entity(order).unwrap().tickets.is_empty());
    assert!(f.cinema.entity(f.cleaner).unwrap().shifts.is_empty());
    assert!(f.cinema.entity(f.technician).unwrap().sessions.is_empty());
    assert!(f.cinema.sessions_of_movie(f.movie).is_empty());
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn deleting_an_employee_removes_roles_and_shifts() {
    let mut f = Fixture::new();
    let contract = f.cinema.entity(f.manager).unwrap().contract.unwrap();
    f.cinema.assign_supervisor(f.clerk, f.manager).unwrap();
    f.cinema
        .add_shift(NewShift {
            cleaner: f.cleaner,
            hall: f.hall,
            start_time: at(2024, 2, 11, 7),
            end_time: at(2024, 2, 11, 9),
        })
        .unwrap();

    // technician, cleaner, shift, employee
    assert_eq!(f.cinema.delete(f.manager).unwrap(), 4);

    assert!(!f.cinema.contains(f.technician));
    assert!(!f.cinema.contains(f.cleaner));
    assert_eq!(f.cinema.entity(contract).unwrap().employee, None);
    assert_eq!(f.cinema.entity(f.clerk).unwrap().supervisor, None);
    assert!(f.cinema.entity(f.session).unwrap().technicians.is_empty());
    assert!(f.cinema.entity(f.hall).unwrap().shifts.is_empty());
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn deleting_a_cashier_role_clears_served_orders() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.box_office_order(vec![t1])).unwrap();
    let cashier = f.cinema.role_of(f.clerk, RoleType::Cashier).unwrap();

    assert_eq!(f.cinema.delete(cashier).unwrap(), 1);

    assert!(!f.cinema.has_role(f.clerk, RoleType::Cashier));
    assert_eq!(f.cinema.entity(order).unwrap().cashier, None);
    assert!(f.cinema.entity(f.clerk).unwrap().served_orders.is_empty());
    check_invariants(&f.cinema).unwrap();
    let err = f.cinema.finalize_order(order).unwrap_err();
    assert!(matches!(err, ModelError::MissingReference { role: "cashier", .. }));
}

#[test]
fn deleting_a_customer_removes_reviews_and_keeps_orders() {
    let mut f = Fixture::new();
    let review = f
        .cinema
        .write_review(NewReview {
            author: f.customer,
            session: f.session,
            rating_of_movie: 5,
            rating_of_hall: 4,
            comment: "Great sound".into(),
        })
        .unwrap();
    let t1 = f.ticket(0);
    let mut new = f.online_order(vec![t1], None);
    new.customer = Some(f.customer);
    let order = f.cinema.place_order(new).unwrap();

    assert_eq!(f.cinema.delete(f.customer).unwrap(), 2);
    assert!(!f.cinema.contains(review));
    assert!(f.cinema.entity(f.session).unwrap().reviews.is_empty());
    assert_eq!(f.cinema.entity(order).unwrap().customer, None);
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn deleting_a_seat_frees_its_number() {
    let mut f = Fixture::new();
    let t1 = f.ticket(2);
    assert_eq!(f.cinema.delete(f.seats[2]).unwrap(), 1);
    assert_eq!(f.cinema.seat_at(f.hall, 3), None);
    assert_eq!(f.cinema.entity(t1).unwrap().seat, None);

    let replacement = seat(&mut f.cinema);
    f.cinema.place_seat(f.hall, 3, replacement).unwrap();
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn deleting_twice_is_not_live() {
    let mut f = Fixture::new();
    f.cinema.delete(f.movie).unwrap();
    let err = f.cinema.delete(f.movie).unwrap_err();
    assert!(matches!(err, ModelError::NotLive { .. }));
}

// ---------------------------------------------------------------------------
// Order discriminator
// ---------------------------------------------------------------------------

#[test]
fn order_pair_rules_are_enforced_at_construction() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);

    let mut online = f.online_order(vec![t1], None);
    online.customer = Some(f.customer);
    online.cashier = Some(f.clerk);
    assert!(matches!(
        f.cinema.place_order(online).unwrap_err(),
        ModelError::Discriminator { .. }
    ));

    let anonymous = f.online_order(vec![t1], None);
    assert!(matches!(
        f.cinema.place_order(anonymous).unwrap_err(),
        ModelError::MissingReference { .. }
    ));

    let mut no_cashier = f.box_office_order(vec![t1]);
    no_cashier.cashier = None;
    assert!(matches!(
        f.cinema.place_order(no_cashier).unwrap_err(),
        ModelError::MissingReference { .. }
    ));

    let mut not_a_cashier = f.box_office_order(vec![t1]);
    not_a_cashier.cashier = Some(f.manager);
    assert!(matches!(
        f.cinema.place_order(not_a_cashier).unwrap_err(),
        ModelError::MissingRole { .. }
    ));

    assert_eq!(f.cinema.extent::<cinema_model::domain::Order>().len(), 0);
    assert_eq!(f.cinema.entity(t1).unwrap().order, None);
}

#[test]
fn order_pair_rules_are_enforced_on_edit() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.online_order(vec![t1], Some("x@y.io"))).unwrap();

    let err = f.cinema.set_order_cashier(order, Some(f.clerk)).unwrap_err();
    assert!(matches!(err, ModelError::Discriminator { .. }));

    f.cinema
        .retype_order(order, OrderType::BoxOffice, None, Some(f.clerk))
        .unwrap();
    let o = f.cinema.entity(order).unwrap();
    assert_eq!(o.order_type, OrderType::BoxOffice);
    assert_eq!(o.cashier, Some(f.clerk));
    assert_eq!(f.cinema.entity(f.clerk).unwrap().served_orders, vec![order]);

    let err = f.cinema.set_order_cashier(order, None).unwrap_err();
    assert!(matches!(err, ModelError::MissingReference { .. }));
    check_invariants(&f.cinema).unwrap();
}

// ---------------------------------------------------------------------------
// Finalize, bonus points and refunds
// ---------------------------------------------------------------------------

#[test]
fn finalize_links_customer_by_bonus_email() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let t2 = f.ticket(4);
    let order = f
        .cinema
        .place_order(f.online_order(vec![t1, t2], Some("EWA@Example.org")))
        .unwrap();
    f.cinema.finalize_order(order).unwrap();

    let o = f.cinema.entity(order).unwrap();
    assert_eq!(o.status, OrderStatus::Paid);
    assert_eq!(o.customer, Some(f.customer));
    assert_eq!(f.cinema.entity(f.customer).unwrap().orders, vec![order]);
    assert_eq!(f.cinema.customer_bonus_points(f.customer).unwrap(), 20);
    // 25.00 normal + 50.00 VIP
    assert_eq!(f.cinema.order_total_cents(order).unwrap(), 7_500);
}

#[test]
fn auto_link_prefers_first_registered_customer() {
    let mut f = Fixture::new();
    f.cinema
        .register_customer(NewCustomer {
            person: person("Ewa", "Twin"),
            email: "Ewa@Example.org".into(),
            password: "another1".into(),
        })
        .unwrap();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.online_order(vec![t1], Some("ewa@example.org"))).unwrap();
    f.cinema.finalize_order(order).unwrap();
    assert_eq!(f.cinema.entity(order).unwrap().customer, Some(f.customer));
}

#[test]
fn online_order_without_match_cannot_finalize() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.online_order(vec![t1], Some("nobody@example.org"))).unwrap();
    let err = f.cinema.finalize_order(order).unwrap_err();
    assert!(matches!(err, ModelError::Discriminator { .. }));
    assert_eq!(f.cinema.entity(order).unwrap().status, OrderStatus::Pending);
}

#[test]
fn box_office_order_without_match_still_finalizes() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let mut new = f.box_office_order(vec![t1]);
    new.email_for_bonus_points = Some("nobody@example.org".into());
    let order = f.cinema.place_order(new).unwrap();
    f.cinema.finalize_order(order).unwrap();
    let o = f.cinema.entity(order).unwrap();
    assert_eq!(o.status, OrderStatus::Paid);
    assert_eq!(o.customer, None);
}

#[test]
fn refund_removes_points_and_freezes_order() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    let mut new = f.online_order(vec![t1], None);
    new.customer = Some(f.customer);
    let order = f.cinema.place_order(new).unwrap();

    assert_eq!(f.cinema.customer_bonus_points(f.customer).unwrap(), 0);
    f.cinema.finalize_order(order).unwrap();
    assert_eq!(f.cinema.customer_bonus_points(f.customer).unwrap(), 10);

    let err = f.cinema.finalize_order(order).unwrap_err();
    assert!(matches!(err, ModelError::InvalidTransition { .. }));
    let t2 = f.ticket(1);
    let err = f.cinema.add_ticket_to_order(order, t2).unwrap_err();
    assert!(matches!(err, ModelError::InvalidTransition { .. }));

    f.cinema.refund_order(order).unwrap();
    assert_eq!(f.cinema.customer_bonus_points(f.customer).unwrap(), 0);
    let err = f.cinema.refund_order(order).unwrap_err();
    assert!(matches!(err, ModelError::InvalidTransition { .. }));
}

#[test]
fn ticket_price_subtracts_discount_and_points() {
    let mut f = Fixture::new();
    let ticket = f
        .cinema
        .issue_ticket(NewTicket {
            session: f.session,
            seat: Some(f.seats[4]),
            discount_cents: 500,
            bonus_points_used: 3,
        })
        .unwrap();
    assert_eq!(f.cinema.ticket_price_cents(ticket).unwrap(), 5_000 - 500 - 300);

    let free = f
        .cinema
        .issue_ticket(NewTicket {
            session: f.session,
            seat: Some(f.seats[0]),
            discount_cents: 9_000,
            bonus_points_used: 0,
        })
        .unwrap();
    assert_eq!(f.cinema.ticket_price_cents(free).unwrap(), 0);
}

#[test]
fn vip_price_saturates_on_huge_base_price() {
    let mut cinema = Cinema::new();
    let vip = cinema
        .add_seat(NewSeat {
            seat_type: SeatType::Vip,
            normal_price_cents: i64::MAX / 10,
            accessible: false,
            vip_multiplier_pct: Some(200),
        })
        .unwrap();
    assert_eq!(cinema.entity(vip).unwrap().final_price_cents(), i64::MAX / 100);
}

// ---------------------------------------------------------------------------
// Keyed seats
// ---------------------------------------------------------------------------

#[test]
fn seat_numbers_are_unique_per_hall() {
    let mut f = Fixture::new();
    let spare = seat(&mut f.cinema);
    f.cinema.resize_hall(f.hall, 6).unwrap();
    let err = f.cinema.place_seat(f.hall, 1, spare).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateKey { .. }));
    f.cinema.place_seat(f.hall, 6, spare).unwrap();
    assert_eq!(f.cinema.seat_at(f.hall, 6), Some(spare));
    assert_eq!(f.cinema.seats_of(f.hall).len(), 6);
}

#[test]
fn hall_capacity_bounds_placed_seats() {
    let mut f = Fixture::new();
    let spare = seat(&mut f.cinema);
    let err = f.cinema.place_seat(f.hall, 6, spare).unwrap_err();
    assert!(matches!(err, ModelError::CapacityExceeded { capacity: 5, .. }));

    let err = f.cinema.resize_hall(f.hall, 4).unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}

#[test]
fn placed_seat_cannot_move_without_unplacing() {
    let mut f = Fixture::new();
    let side = f.cinema.add_hall("Side", 3).unwrap();
    let err = f.cinema.place_seat(side, 1, f.seats[0]).unwrap_err();
    assert!(matches!(err, ModelError::AlreadyOwned { .. }));

    assert_eq!(f.cinema.unplace_seat(f.hall, 1), Some(f.seats[0]));
    assert_eq!(f.cinema.unplace_seat(f.hall, 1), None);
    f.cinema.place_seat(side, 1, f.seats[0]).unwrap();
    assert_eq!(f.cinema.seat_at(side, 1), Some(f.seats[0]));
    check_invariants(&f.cinema).unwrap();
}

#[test]
fn a_seat_is_sold_once_per_session() {
    let mut f = Fixture::new();
    f.ticket(0);
    let err = f
        .cinema
        .issue_ticket(NewTicket {
            session: f.session,
            seat: Some(f.seats[0]),
            discount_cents: 0,
            bonus_points_used: 0,
        })
        .unwrap_err();
    assert!(matches!(err, ModelError::SeatTaken { .. }));

    let loose = seat(&mut f.cinema);
    let err = f
        .cinema
        .issue_ticket(NewTicket {
            session: f.session,
            seat: Some(loose),
            discount_cents: 0,
            bonus_points_used: 0,
        })
        .unwrap_err();
    assert!(matches!(err, ModelError::SeatNotInHall { .. }));
}

#[test]
fn change_seat_checks_availability() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    f.ticket(1);
    let err = f.cinema.change_seat(t1, Some(f.seats[1])).unwrap_err();
    assert!(matches!(err, ModelError::SeatTaken { .. }));
    assert_eq!(f.cinema.change_seat(t1, Some(f.seats[2])).unwrap(), Change::Relinked);
    assert!(f.cinema.entity(f.seats[0]).unwrap().tickets.is_empty());
    assert_eq!(f.cinema.entity(f.seats[2]).unwrap().tickets, vec![t1]);
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn document_round_trip_keeps_identity() {
    let mut f = Fixture::new();
    f.cinema.assign_supervisor(f.clerk, f.manager).unwrap();
    let t1 = f.ticket(0);
    let order = f.cinema.place_order(f.online_order(vec![t1], Some("ewa@example.org"))).unwrap();
    f.cinema.finalize_order(order).unwrap();
    let before = canonical_hash(&f.cinema).unwrap();

    let json = serde_json::to_string(&Document::capture(&f.cinema)).unwrap();
    let restored = serde_json::from_str::<Document>(&json).unwrap().restore().unwrap();

    assert_eq!(canonical_hash(&restored).unwrap(), before);
    assert_eq!(restored.seat_at(f.hall, 1), Some(f.seats[0]));
    assert_eq!(restored.entity(f.customer).unwrap().orders, vec![order]);
    assert_eq!(restored.subordinates(f.manager), vec![f.clerk]);
    assert_eq!(restored.entity(f.seats[0]).unwrap().tickets, vec![t1]);
    assert_eq!(restored.customer_bonus_points(f.customer).unwrap(), 10);
}

#[test]
fn dangling_reference_is_corrupt() {
    let mut f = Fixture::new();
    f.ticket(0);
    let mut doc = Document::capture(&f.cinema);
    doc.tickets[0].entity.session = Some(Id::from_raw(999));
    assert!(matches!(doc.restore().unwrap_err(), ModelError::Corrupt(_)));
}

#[test]
fn duplicate_record_id_is_corrupt() {
    let f = Fixture::new();
    let mut doc = Document::capture(&f.cinema);
    let copy = doc.movies[0].clone();
    doc.movies.push(copy);
    assert!(matches!(doc.restore().unwrap_err(), ModelError::Corrupt(_)));
}

#[test]
fn failed_load_keeps_current_graph() {
    let mut f = Fixture::new();
    let before = canonical_hash(&f.cinema).unwrap();
    let mut doc = Document::capture(&f.cinema);
    doc.sessions[0].entity.hall = Some(Id::from_raw(77));
    assert!(f.cinema.load_document(doc).is_err());
    assert_eq!(canonical_hash(&f.cinema).unwrap(), before);
}

#[test]
fn cashier_without_cashier_role_is_rejected_on_load() {
    let mut f = Fixture::new();
    let t1 = f.ticket(0);
    f.cinema.place_order(f.box_office_order(vec![t1])).unwrap();
    let mut doc = Document::capture(&f.cinema);
    doc.orders[0].entity.cashier = Some(f.manager);
    let err = doc.restore().unwrap_err();
    assert!(matches!(err, ModelError::Invariant(ref v) if v.invariant == "order_cashier_role"));
}

#[test]
fn contract_terms_are_validated() {
    let mut cinema = Cinema::new();
    let err = cinema
        .add_contract(ContractTerms::PartTime {
            hourly_rate_cents: 2_000,
            max_week_hours: 31,
        })
        .unwrap_err();
    assert!(matches!(err, ModelError::Validation(_)));
}
