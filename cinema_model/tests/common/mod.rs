//! Shared fixture for the model integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use cinema_model::domain::{
    ContractTerms, Customer, Employee, Hall, Movie, OrderType, Person, Role, Seat, SeatType,
    Session, Ticket,
};
use cinema_model::{
    Cinema, Id, NewCustomer, NewEmployee, NewMovie, NewOrder, NewRole, NewSeat, NewSession,
    NewTicket,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

pub fn person(first: &str, last: &str) -> Person {
    Person {
        first_name: first.into(),
        last_name: last.into(),
        date_of_birth: date(1990, 4, 12),
    }
}

pub struct Fixture {
    pub cinema: Cinema,
    pub manager: Id<Employee>,
    pub clerk: Id<Employee>,
    pub technician: Id<Role>,
    pub cleaner: Id<Role>,
    pub hall: Id<Hall>,
    pub seats: Vec<Id<Seat>>,
    pub movie: Id<Movie>,
    pub session: Id<Session>,
    pub customer: Id<Customer>,
}

impl Fixture {
    /// One hall with five placed seats (seat 5 is VIP at 25.00), one
    /// session, a manager who is a technician and cleaner, a clerk who is a
    /// cashier, and one customer.
    pub fn new() -> Self {
        let mut cinema = Cinema::new();
        let contract = cinema
            .add_contract(ContractTerms::FullTime {
                salary_cents: 200_000,
                has_benefits_plan: false,
            })
            .unwrap();
        let manager = cinema
            .hire_employee(NewEmployee {
                person: person("Anna", "Lis"),
                hiring_date: date(2018, 1, 8),
                phone_number: "+48500600700".into(),
                contract: Some(contract),
            })
            .unwrap();
        let clerk = cinema
            .hire_employee(NewEmployee {
                person: person("Jan", "Mak"),
                hiring_date: date(2022, 6, 1),
                phone_number: "500600701".into(),
                contract: None,
            })
            .unwrap();
        cinema
            .assign_role(
                clerk,
                NewRole::Cashier {
                    pos_login: "till7".into(),
                    pos_password: "Cash2024".into(),
                },
            )
            .unwrap();
        let technician = cinema
            .assign_role(
                manager,
                NewRole::Technician {
                    degree: "Sound Engineering".into(),
                    on_call: false,
                },
            )
            .unwrap();
        let cleaner = cinema
            .assign_role(
                manager,
                NewRole::Cleaner {
                    has_safety_training: true,
                    last_safety_training: date(2023, 3, 1),
                },
            )
            .unwrap();

        let hall = cinema.add_hall("Main", 5).unwrap();
        let mut seats = Vec::new();
        for number in 1..=5 {
            let seat = cinema
                .add_seat(NewSeat {
                    seat_type: if number == 5 { SeatType::Vip } else { SeatType::Normal },
                    normal_price_cents: 2_500,
                    accessible: false,
                    vip_multiplier_pct: Some(200),
                })
                .unwrap();
            cinema.place_seat(hall, number, seat).unwrap();
            seats.push(seat);
        }

        let movie = cinema
            .add_movie(NewMovie {
                title: "Night Train".into(),
                duration_minutes: 95,
                genres: vec!["thriller".into()],
                age_restriction: None,
            })
            .unwrap();
        let session = cinema
            .schedule_session(NewSession {
                hall,
                movie,
                start_at: at(2024, 2, 10, 20),
                language: "EN".into(),
                technicians: vec![technician],
            })
            .unwrap();
        let customer = cinema
            .register_customer(NewCustomer {
                person: person("Ewa", "Bor"),
                email: "ewa@example.org".into(),
                password: "secret1".into(),
            })
            .unwrap();

        Self {
            cinema,
            manager,
            clerk,
            technician,
            cleaner,
            hall,
            seats,
            movie,
            session,
            customer,
        }
    }

    pub fn ticket(&mut self, seat_index: usize) -> Id<Ticket> {
        self.cinema
            .issue_ticket(NewTicket {
                session: self.session,
                seat: Some(self.seats[seat_index]),
                discount_cents: 0,
                bonus_points_used: 0,
            })
            .unwrap()
    }

    pub fn online_order(&self, tickets: Vec<Id<Ticket>>, email: Option<&str>) -> NewOrder {
        NewOrder {
            created_at: at(2024, 2, 1, 9),
            order_type: OrderType::Online,
            tickets,
            customer: None,
            cashier: None,
            email_for_bonus_points: email.map(str::to_string),
        }
    }

    pub fn box_office_order(&self, tickets: Vec<Id<Ticket>>) -> NewOrder {
        NewOrder {
            created_at: at(2024, 2, 1, 9),
            order_type: OrderType::BoxOffice,
            tickets,
            customer: None,
            cashier: Some(self.clerk),
            email_for_bonus_points: None,
        }
    }
}
