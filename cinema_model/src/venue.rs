/// Cinema Model — Venue
///
/// Halls and their keyed seats, equipment, movies, sessions and cleaning
/// shifts.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::associations::{
    HallEquipment, HallSeats, SessionHall, SessionMovie, SessionPromotions, SessionTechnicians,
    ShiftCleaner, ShiftHall,
};
use crate::domain::{
    Equipment, EquipmentKind, Hall, Movie, Promotion, Role, RoleType, Seat, SeatType, Session,
    Shift,
};
use crate::error::{ModelError, Result, ValidationError};
use crate::extent::Id;
use crate::link::{self, Change};
use crate::qualified::{self, Qualified, QualifiedSlot};
use crate::state::Cinema;
use crate::validate;

#[derive(Debug, Clone)]
pub struct NewSeat {
    pub seat_type: SeatType,
    pub normal_price_cents: i64,
    pub accessible: bool,
    /// Percent; falls back to the model default when `None`.
    pub vip_multiplier_pct: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub duration_minutes: u32,
    pub genres: Vec<String>,
    pub age_restriction: Option<u8>,
}

/// Input for [`Cinema::schedule_session`]. Technicians may be added later.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub hall: Id<Hall>,
    pub movie: Id<Movie>,
    pub start_at: NaiveDateTime,
    pub language: String,
    pub technicians: Vec<Id<Role>>,
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub cleaner: Id<Role>,
    pub hall: Id<Hall>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

impl Cinema {
    // ── Halls and seats ────────────────────────────────────────────

    pub fn add_hall(&mut self, name: &str, capacity: u32) -> Result<Id<Hall>> {
        validate::require_text("name", name)?;
        validate::validate_capacity(capacity, self.limits.max_hall_capacity)?;
        Ok(self.insert(Hall {
            name: name.trim().to_string(),
            capacity,
            seats: QualifiedSlot::default(),
            equipment: Vec::new(),
            sessions: Vec::new(),
            shifts: Vec::new(),
        }))
    }

    /// Change capacity; never below the number of seats already placed.
    pub fn resize_hall(&mut self, hall: Id<Hall>, capacity: u32) -> Result<()> {
        let placed = self.entity(hall)?.seats.len();
        validate::validate_capacity(capacity, self.limits.max_hall_capacity)?;
        if (capacity as usize) < placed {
            return Err(ValidationError::new(
                "capacity",
                format!("{placed} seats are already placed"),
            )
            .into());
        }
        if let Some(h) = self.entity_mut(hall) {
            h.capacity = capacity;
        }
        Ok(())
    }

    /// A seat not yet placed in any hall.
    pub fn add_seat(&mut self, new: NewSeat) -> Result<Id<Seat>> {
        validate::positive("normal_price", new.normal_price_cents)?;
        let vip_multiplier_pct = new
            .vip_multiplier_pct
            .unwrap_or(self.limits.default_vip_multiplier_pct);
        if vip_multiplier_pct < 100 {
            return Err(ValidationError::new("vip_multiplier", "must be at least 100 percent").into());
        }
        Ok(self.insert(Seat {
            seat_type: new.seat_type,
            normal_price_cents: new.normal_price_cents,
            accessible: new.accessible,
            vip_multiplier_pct,
            placement: None,
            tickets: Vec::new(),
        }))
    }

    /// Bind `seat` under `number` in `hall`.
    pub fn place_seat(&mut self, hall: Id<Hall>, number: u32, seat: Id<Seat>) -> Result<()> {
        if number == 0 {
            return Err(ValidationError::new("seat_number", "must be positive").into());
        }
        qualified::put::<HallSeats>(self, hall, number, seat)
    }

    pub fn seat_at(&self, hall: Id<Hall>, number: u32) -> Option<Id<Seat>> {
        qualified::get::<HallSeats>(self, hall, number)
    }

    /// Unbind `number`; the seat stays registered. No-op when free.
    pub fn unplace_seat(&mut self, hall: Id<Hall>, number: u32) -> Option<Id<Seat>> {
        qualified::remove::<HallSeats>(self, hall, number)
    }

    pub fn seats_of(&self, hall: Id<Hall>) -> Vec<(u32, Id<Seat>)> {
        self.find(hall)
            .map(|h| HallSeats::slot(h).iter().collect())
            .unwrap_or_default()
    }

    // ── Equipment ──────────────────────────────────────────────────

    pub fn add_equipment(
        &mut self,
        kind: EquipmentKind,
        last_check_up: NaiveDate,
        hall: Option<Id<Hall>>,
    ) -> Result<Id<Equipment>> {
        validate::not_in_future_date("last_check_up", last_check_up, self.today())?;
        if let Some(hall) = hall {
            link::admit::<HallEquipment>(self, hall)?;
        }
        let id = self.insert(Equipment {
            kind,
            last_check_up,
            hall,
        });
        link::connect::<HallEquipment>(self, id);
        Ok(id)
    }

    /// Move equipment to another hall, or detach it with `None`.
    pub fn move_equipment(&mut self, equipment: Id<Equipment>, hall: Option<Id<Hall>>) -> Result<Change> {
        link::set::<HallEquipment, _>(self, equipment, hall)
    }

    pub fn record_check_up(&mut self, equipment: Id<Equipment>, on: NaiveDate) -> Result<()> {
        self.entity(equipment)?;
        validate::not_in_future_date("last_check_up", on, self.today())?;
        if let Some(e) = self.entity_mut(equipment) {
            e.last_check_up = on;
        }
        Ok(())
    }

    // ── Movies ─────────────────────────────────────────────────────

    pub fn add_movie(&mut self, new: NewMovie) -> Result<Id<Movie>> {
        validate::require_text("title", &new.title)?;
        validate::positive("duration", i64::from(new.duration_minutes))?;
        if new.genres.is_empty() {
            return Err(ValidationError::new("genres", "at least one genre is required").into());
        }
        for genre in &new.genres {
            validate::require_text("genres", genre)?;
        }
        validate::validate_age_restriction(new.age_restriction)?;
        Ok(self.insert(Movie {
            title: new.title.trim().to_string(),
            duration_minutes: new.duration_minutes,
            genres: new.genres.iter().map(|g| g.trim().to_string()).collect(),
            age_restriction: new.age_restriction,
            sessions: Vec::new(),
        }))
    }

    /// First movie whose title matches, ignoring case.
    pub fn find_movie_by_title(&self, title: &str) -> Option<Id<Movie>> {
        let wanted = title.trim().to_lowercase();
        self.movies
            .all()
            .find(|(_, movie)| movie.title.to_lowercase() == wanted)
            .map(|(id, _)| id)
    }

    // ── Sessions ───────────────────────────────────────────────────

    pub fn schedule_session(&mut self, new: NewSession) -> Result<Id<Session>> {
        validate::require_text("language", &new.language)?;
        link::admit::<SessionHall>(self, new.hall)?;
        link::admit::<SessionMovie>(self, new.movie)?;
        let mut technicians: Vec<Id<Role>> = Vec::new();
        for role in new.technicians {
            self.role_of_kind(role, RoleType::Technician)?;
            if !technicians.contains(&role) {
                technicians.push(role);
            }
        }

        let id = self.insert(Session {
            start_at: new.start_at,
            language: new.language.trim().to_string(),
            hall: Some(new.hall),
            movie: Some(new.movie),
            technicians,
            promotions: Vec::new(),
            tickets: Vec::new(),
            reviews: Vec::new(),
        });
        link::connect::<SessionHall>(self, id);
        link::connect::<SessionMovie>(self, id);
        link::connect::<SessionTechnicians>(self, id);
        Ok(id)
    }

    pub fn reschedule_session(&mut self, session: Id<Session>, start_at: NaiveDateTime, language: &str) -> Result<()> {
        self.entity(session)?;
        validate::require_text("language", language)?;
        if let Some(s) = self.entity_mut(session) {
            s.start_at = start_at;
            s.language = language.trim().to_string();
        }
        Ok(())
    }

    /// Start plus the movie's running time.
    pub fn session_end(&self, session: Id<Session>) -> Result<NaiveDateTime> {
        let s = self.entity(session)?;
        let minutes = s
            .movie
            .and_then(|movie| self.find(movie))
            .map_or(0, |movie| movie.duration_minutes);
        Ok(s.start_at + Duration::minutes(i64::from(minutes)))
    }

    pub fn add_technician(&mut self, session: Id<Session>, technician: Id<Role>) -> Result<Change> {
        self.entity(session)?;
        self.role_of_kind(technician, RoleType::Technician)?;
        link::link::<SessionTechnicians>(self, session, technician)
    }

    /// Fails when `technician` is the session's last one.
    pub fn remove_technician(&mut self, session: Id<Session>, technician: Id<Role>) -> Result<Change> {
        link::unlink::<SessionTechnicians>(self, session, technician)
    }

    pub fn attach_promotion(&mut self, session: Id<Session>, promotion: Id<Promotion>) -> Result<Change> {
        link::link::<SessionPromotions>(self, session, promotion)
    }

    pub fn detach_promotion(&mut self, session: Id<Session>, promotion: Id<Promotion>) -> Result<Change> {
        link::unlink::<SessionPromotions>(self, session, promotion)
    }

    /// Sessions of a movie, in scheduling order.
    pub fn sessions_of_movie(&self, movie: Id<Movie>) -> Vec<Id<Session>> {
        link::holders::<SessionMovie>(self, movie)
    }

    // ── Shifts ─────────────────────────────────────────────────────

    pub fn add_shift(&mut self, new: NewShift) -> Result<Id<Shift>> {
        validate::validate_shift(new.start_time, new.end_time, self.limits.max_shift_minutes)?;
        self.role_of_kind(new.cleaner, RoleType::Cleaner)?;
        link::admit::<ShiftCleaner>(self, new.cleaner)?;
        link::admit::<ShiftHall>(self, new.hall)?;

        let id = self.insert(Shift {
            start_time: new.start_time,
            end_time: new.end_time,
            cleaner: Some(new.cleaner),
            hall: Some(new.hall),
        });
        link::connect::<ShiftCleaner>(self, id);
        link::connect::<ShiftHall>(self, id);
        Ok(id)
    }

    pub fn move_shift(&mut self, shift: Id<Shift>, hall: Id<Hall>) -> Result<Change> {
        link::set::<ShiftHall, _>(self, shift, Some(hall))
    }

    pub fn edit_shift(&mut self, shift: Id<Shift>, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Result<()> {
        self.entity(shift)?;
        validate::validate_shift(start_time, end_time, self.limits.max_shift_minutes)?;
        if let Some(s) = self.entity_mut(shift) {
            s.start_time = start_time;
            s.end_time = end_time;
        }
        Ok(())
    }

    pub(crate) fn hall_of_session(&self, session: Id<Session>) -> Result<Id<Hall>> {
        self.entity(session)?.hall.ok_or(ModelError::MissingReference {
            association: "session-hall",
            role: "hall",
        })
    }
}
