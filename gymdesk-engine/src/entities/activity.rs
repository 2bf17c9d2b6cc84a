//! Scheduled activities
//!
//! An activity sits on a weekly grid of six working days (Monday to
//! Saturday, numbered 2 to 7) and fourteen working hours (8h to 21h). Its
//! slot is stored as minutes since Monday 8:00 counted on that grid, so
//! each day is 14 hours long:
//!
//! ```text
//! mins_from_start = ((day - 2) * 14 + (hour - 8)) * 60 + mins
//! ```
//!
//! Record layout:
//!
//! ```text
//! name:str  mins_from_start:i32  duration:i32  cost:f32
//! seats_taken:u32  max_seats:u32
//! ```

use std::cmp::Ordering;
use std::io::{self, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::check_text;
use crate::collection::Record;
use crate::error::{DeskError, DeskResult};
use crate::storage::codec::{field, get_str, put_str, str_len};
use crate::storage::{Codec, Fifo};

/// First working day (Monday)
pub const FIRST_DAY: i32 = 2;
/// First working hour
pub const FIRST_HOUR: i32 = 8;
/// Working days per week
pub const DAYS: i32 = 6;
/// Working hours per day
pub const HOURS: i32 = 14;
/// Minutes on the weekly grid
pub const WEEK_MINUTES: i32 = DAYS * HOURS * 60;

/// Convert a day/hour/minute slot to minutes from the start of the week
pub fn week_minutes(day: i32, hour: i32, mins: i32) -> DeskResult<i32> {
    if !(FIRST_DAY..FIRST_DAY + DAYS).contains(&day) {
        return Err(DeskError::InvalidValue(format!(
            "day {} outside {}..={}",
            day,
            FIRST_DAY,
            FIRST_DAY + DAYS - 1
        )));
    }
    if !(FIRST_HOUR..FIRST_HOUR + HOURS).contains(&hour) {
        return Err(DeskError::InvalidValue(format!(
            "hour {} outside {}..={}",
            hour,
            FIRST_HOUR,
            FIRST_HOUR + HOURS - 1
        )));
    }
    if !(0..60).contains(&mins) {
        return Err(DeskError::InvalidValue(format!("minute {} outside 0..=59", mins)));
    }
    Ok(((day - FIRST_DAY) * HOURS + (hour - FIRST_HOUR)) * 60 + mins)
}

fn day_name(day: i32) -> &'static str {
    match day {
        2 => "Mon",
        3 => "Tue",
        4 => "Wed",
        5 => "Thu",
        6 => "Fri",
        7 => "Sat",
        _ => "???",
    }
}

/// A class or session with a fixed weekly slot and a seat limit.
/// Keyed by its slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    pub mins_from_start: i32,
    /// Minutes
    pub duration: i32,
    pub cost: f32,
    pub seats_taken: u32,
    pub max_seats: u32,
}

impl Activity {
    pub fn new(name: &str, day: i32, hour: i32, mins: i32) -> DeskResult<Self> {
        check_text("name", name)?;
        Ok(Activity {
            name: name.to_string(),
            mins_from_start: week_minutes(day, hour, mins)?,
            ..Activity::construct()
        })
    }

    /// Search probe for a slot
    pub fn probe_at(day: i32, hour: i32, mins: i32) -> DeskResult<Self> {
        Ok(Activity {
            mins_from_start: week_minutes(day, hour, mins)?,
            ..Activity::construct()
        })
    }

    /// Search probe for a name
    pub fn probe_name(name: &str) -> Self {
        Activity {
            name: name.to_string(),
            ..Activity::construct()
        }
    }

    /// Move to another slot. Changes the key.
    pub fn schedule(&mut self, day: i32, hour: i32, mins: i32) -> DeskResult<()> {
        self.mins_from_start = week_minutes(day, hour, mins)?;
        Ok(())
    }

    pub fn day(&self) -> i32 {
        FIRST_DAY + (self.mins_from_start / 60) / HOURS
    }

    pub fn hour(&self) -> i32 {
        FIRST_HOUR + (self.mins_from_start / 60) % HOURS
    }

    pub fn minute(&self) -> i32 {
        self.mins_from_start % 60
    }

    pub fn is_full(&self) -> bool {
        self.seats_taken >= self.max_seats
    }

    /// Take a seat. Fails when the activity is full.
    pub fn reserve_seat(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.seats_taken += 1;
        true
    }

    /// Give a seat back. Fails when no seat is taken.
    pub fn release_seat(&mut self) -> bool {
        if self.seats_taken == 0 {
            return false;
        }
        self.seats_taken -= 1;
        true
    }

    /// Order by name only
    pub fn by_name(a: &Activity, b: &Activity) -> Ordering {
        a.name.cmp(&b.name)
    }

    /// Order by slot
    pub fn by_time(a: &Activity, b: &Activity) -> Ordering {
        a.mins_from_start.cmp(&b.mins_from_start)
    }

    fn slot(&self) -> String {
        format!("{}; {:02}:{:02}", day_name(self.day()), self.hour(), self.minute())
    }
}

impl Record for Activity {
    fn construct() -> Self {
        Activity {
            name: String::new(),
            mins_from_start: 0,
            duration: 15,
            cost: 5.0,
            seats_taken: 0,
            max_seats: 10,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        Activity::by_time(self, other)
    }

    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "--------------ACTIVITY INFO--------------")?;
        writeln!(out, "Name: {}", self.name)?;
        writeln!(out, "Slot [DD; HH:MM]: [{}]", self.slot())?;
        writeln!(out, "Mins from start [mins]: {:04}", self.mins_from_start)?;
        writeln!(out, "Duration [mins]: {:02}", self.duration)?;
        writeln!(out, "Cost [EUR]: {:.2}", self.cost)?;
        writeln!(out, "Seats: [{}/{}]", self.seats_taken, self.max_seats)?;
        writeln!(out, "-----------------------------------------\n")
    }

    fn print_line(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "[{}], {}, {:02}, [{}/{}]",
            self.slot(),
            self.name,
            self.duration,
            self.seats_taken,
            self.max_seats
        )
    }
}

impl Codec for Activity {
    fn encoded_len(&self) -> usize {
        str_len(&self.name) + 4 + 4 + 4 + 4 + 4
    }

    fn encode(&self, fifo: &mut Fifo) -> DeskResult<()> {
        put_str(fifo, &self.name)?;
        fifo.write_i32::<LittleEndian>(self.mins_from_start)?;
        fifo.write_i32::<LittleEndian>(self.duration)?;
        fifo.write_f32::<LittleEndian>(self.cost)?;
        fifo.write_u32::<LittleEndian>(self.seats_taken)?;
        fifo.write_u32::<LittleEndian>(self.max_seats)?;
        Ok(())
    }

    fn decode(fifo: &mut Fifo) -> DeskResult<Self> {
        let name = get_str(fifo)?;
        let mins_from_start = field(fifo.read_i32::<LittleEndian>(), "mins_from_start")?;
        if !(0..WEEK_MINUTES).contains(&mins_from_start) {
            return Err(DeskError::InvalidFormat(format!(
                "slot {} outside the week",
                mins_from_start
            )));
        }

        Ok(Activity {
            name,
            mins_from_start,
            duration: field(fifo.read_i32::<LittleEndian>(), "duration")?,
            cost: field(fifo.read_f32::<LittleEndian>(), "cost")?,
            seats_taken: field(fifo.read_u32::<LittleEndian>(), "seats_taken")?,
            max_seats: field(fifo.read_u32::<LittleEndian>(), "max_seats")?,
        })
    }
}
