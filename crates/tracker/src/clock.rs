use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Source of "now" in the user's local calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// ISO weekday, 1 = Monday … 7 = Sunday.
    fn weekday(&self) -> u8 {
        self.today().weekday().number_from_monday() as u8
    }

    /// `[today 00:00, tomorrow 00:00)`.
    fn today_bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.today().and_time(NaiveTime::MIN);
        (start, start + chrono::Duration::days(1))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub fn weekday_name(weekday: u8) -> &'static str {
    match weekday {
        1 => "Lunes",
        2 => "Martes",
        3 => "Miércoles",
        4 => "Jueves",
        5 => "Viernes",
        6 => "Sábado",
        7 => "Domingo",
        _ => "Desconocido",
    }
}
