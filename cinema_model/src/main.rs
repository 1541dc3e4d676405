/// Cinema Model — Demo Harness
///
/// Builds a small cinema, round-trips it through the document form twice
/// and checks the canonical hash survives unchanged.

use std::error::Error;
use std::process;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cinema_model::domain::{ContractTerms, EquipmentKind, OrderType, Person, SeatType};
use cinema_model::hashing::canonical_hash;
use cinema_model::{
    check_invariants, Cinema, Document, NewCustomer, NewEmployee, NewMovie, NewOrder, NewRole,
    NewSeat, NewSession, NewTicket,
};

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| format!("bad date {y}-{m}-{d}").into())
}

fn at(y: i32, m: u32, d: u32, h: u32) -> Result<NaiveDateTime, Box<dyn Error>> {
    date(y, m, d)?
        .and_hms_opt(h, 0, 0)
        .ok_or_else(|| format!("bad hour {h}").into())
}

fn person(first: &str, last: &str, born: NaiveDate) -> Person {
    Person {
        first_name: first.into(),
        last_name: last.into(),
        date_of_birth: born,
    }
}

fn build_sample() -> Result<Cinema, Box<dyn Error>> {
    let mut cinema = Cinema::new();

    let contract = cinema.add_contract(ContractTerms::FullTime {
        salary_cents: 210_000,
        has_benefits_plan: true,
    })?;
    let manager = cinema.hire_employee(NewEmployee {
        person: person("Maria", "Nowak", date(1980, 3, 14)?),
        hiring_date: date(2015, 9, 1)?,
        phone_number: "+48600100200".into(),
        contract: Some(contract),
    })?;
    let clerk = cinema.hire_employee(NewEmployee {
        person: person("Piotr", "Zielinski", date(1995, 7, 2)?),
        hiring_date: date(2021, 2, 1)?,
        phone_number: "+48600100300".into(),
        contract: None,
    })?;
    cinema.assign_supervisor(clerk, manager)?;
    cinema.assign_role(
        clerk,
        NewRole::Cashier {
            pos_login: "pos01".into(),
            pos_password: "Ticket42".into(),
        },
    )?;
    let tech = cinema.assign_role(
        manager,
        NewRole::Technician {
            degree: "BSc Electronics".into(),
            on_call: true,
        },
    )?;

    let hall = cinema.add_hall("Blue", 40)?;
    for number in 1..=4 {
        let seat = cinema.add_seat(NewSeat {
            seat_type: if number == 4 { SeatType::Vip } else { SeatType::Normal },
            normal_price_cents: 2_500,
            accessible: number == 1,
            vip_multiplier_pct: None,
        })?;
        cinema.place_seat(hall, number, seat)?;
    }
    cinema.add_equipment(EquipmentKind::Projection, date(2024, 1, 10)?, Some(hall))?;

    let movie = cinema.add_movie(NewMovie {
        title: "The Long Take".into(),
        duration_minutes: 128,
        genres: vec!["drama".into()],
        age_restriction: Some(12),
    })?;
    let session = cinema.schedule_session(NewSession {
        hall,
        movie,
        start_at: at(2024, 5, 20, 18)?,
        language: "PL".into(),
        technicians: vec![tech],
    })?;

    let customer = cinema.register_customer(NewCustomer {
        person: person("Ola", "Kowalska", date(1999, 11, 30)?),
        email: "ola@example.com".into(),
        password: "popcorn".into(),
    })?;
    let mut tickets = Vec::new();
    for number in [2, 4] {
        tickets.push(cinema.issue_ticket(NewTicket {
            session,
            seat: cinema.seat_at(hall, number),
            discount_cents: 0,
            bonus_points_used: 0,
        })?);
    }
    let order = cinema.place_order(NewOrder {
        created_at: at(2024, 5, 1, 12)?,
        order_type: OrderType::Online,
        tickets,
        customer: None,
        cashier: None,
        email_for_bonus_points: Some("OLA@example.com".into()),
    })?;
    cinema.finalize_order(order)?;
    info!(
        customer = %customer,
        points = cinema.customer_bonus_points(customer)?,
        "sample built"
    );
    Ok(cinema)
}

fn run() -> Result<bool, Box<dyn Error>> {
    let cinema = build_sample()?;
    check_invariants(&cinema)?;
    let h1 = canonical_hash(&cinema)?;

    let json = serde_json::to_string(&Document::capture(&cinema))?;
    let mut reloaded = Cinema::new();
    reloaded.load_document(serde_json::from_str(&json)?)?;
    let h2 = canonical_hash(&reloaded)?;

    let again = Document::capture(&reloaded).restore()?;
    let h3 = canonical_hash(&again)?;

    println!("entities: {}", cinema.total_entities());
    for (kind, count) in cinema.extent_sizes() {
        println!("  {kind:<10} {count}");
    }
    let ok = h1 == h2 && h2 == h3;
    if ok {
        println!("[PASS] round-trip hash={h1}");
    } else {
        println!("[FAIL] hash drift: built={h1} reloaded={h2} restored={h3}");
    }
    Ok(ok)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("[FAIL] {e}");
            process::exit(2);
        }
    }
}
