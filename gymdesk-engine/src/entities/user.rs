//! Desk users: managers, employees and clients
//!
//! Record layout:
//!
//! ```text
//! username:str  pass:str  name:str  age:i32  sex:u8
//! height:f32  weight:f32  balance:f32  kind:i32
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::check_text;
use crate::collection::Record;
use crate::error::{DeskError, DeskResult};
use crate::storage::codec::{field, get_str, put_str, str_len};
use crate::storage::{Codec, Fifo};

/// Role of a user, stored as its raw value. Ordered by raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i32)]
pub enum UserKind {
    Manager = 0,
    Employee = 1,
    #[default]
    Client = 2,
}

impl UserKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(UserKind::Manager),
            1 => Some(UserKind::Employee),
            2 => Some(UserKind::Client),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> i32 {
        *self as i32
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserKind::Manager => "Manager",
            UserKind::Employee => "Employee",
            UserKind::Client => "Client",
        }
    }
}

impl fmt::Display for UserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UserKind {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "manager" => Ok(UserKind::Manager),
            "1" | "employee" => Ok(UserKind::Employee),
            "2" | "client" => Ok(UserKind::Client),
            other => Err(DeskError::InvalidValue(format!("unknown user kind `{}`", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    /// Any nonzero byte reads as female
    pub fn from_raw(raw: u8) -> Self {
        if raw == 0 {
            Sex::Male
        } else {
            Sex::Female
        }
    }

    pub fn as_raw(&self) -> u8 {
        match self {
            Sex::Male => 0,
            Sex::Female => 1,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Sex::Male => 'M',
            Sex::Female => 'F',
        }
    }
}

impl FromStr for Sex {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" | "M" => Ok(Sex::Male),
            "f" | "F" => Ok(Sex::Female),
            other => Err(DeskError::InvalidValue(format!("unknown sex `{}`", other))),
        }
    }
}

/// A person known to the desk. Keyed by username, case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub username: String,
    pub pass: String,
    pub name: String,
    pub age: i32,
    pub sex: Sex,
    /// Metres
    pub height: f32,
    /// Kilograms
    pub weight: f32,
    pub balance: f32,
    pub kind: UserKind,
}

impl User {
    pub fn new(username: &str, pass: &str, name: &str, kind: UserKind) -> DeskResult<Self> {
        check_text("username", username)?;
        check_text("password", pass)?;
        check_text("name", name)?;

        Ok(User {
            username: username.to_string(),
            pass: pass.to_string(),
            name: name.to_string(),
            kind,
            ..User::construct()
        })
    }

    /// Search probe carrying only a username
    pub fn probe(username: &str) -> Self {
        User {
            username: username.to_string(),
            ..User::construct()
        }
    }

    /// Search probe carrying only a kind
    pub fn probe_kind(kind: UserKind) -> Self {
        User {
            kind,
            ..User::construct()
        }
    }

    /// Body mass index
    pub fn bmi(&self) -> f32 {
        self.weight / (self.height * self.height)
    }

    /// Credit the balance
    pub fn pay(&mut self, amount: f32) {
        self.balance += amount;
    }

    /// Order by kind only
    pub fn by_kind(a: &User, b: &User) -> Ordering {
        a.kind.cmp(&b.kind)
    }

    /// Order by username, case-insensitive
    pub fn by_username(a: &User, b: &User) -> Ordering {
        a.username
            .bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.username.bytes().map(|c| c.to_ascii_lowercase()))
    }
}

impl Record for User {
    fn construct() -> Self {
        User {
            username: String::new(),
            pass: String::new(),
            name: String::new(),
            age: 18,
            sex: Sex::Male,
            height: 1.5,
            weight: 50.0,
            balance: 0.0,
            kind: UserKind::Client,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        User::by_username(self, other)
    }

    fn print(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "--------------USER INFO--------------")?;
        writeln!(out, "Kind: {}\n", self.kind)?;
        writeln!(out, "Name: {}", self.name)?;
        writeln!(out, "Age: {}", self.age)?;
        writeln!(out, "Sex: {}", self.sex.as_char())?;
        writeln!(out, "Height: {:.2}", self.height)?;
        writeln!(out, "Weight: {:.2}", self.weight)?;
        writeln!(out, "BMI: {:.2}", self.bmi())?;
        writeln!(out, "Balance: {:.2}", self.balance)?;
        writeln!(out, "Username: {}", self.username)?;
        writeln!(out, "-------------------------------------\n")
    }

    fn print_line(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "{}, {}, {}, {:02}, {}, {:.2}, {:.2}, {:.2}, {:.2}",
            self.kind,
            self.username,
            self.name,
            self.age,
            self.sex.as_char(),
            self.height,
            self.weight,
            self.bmi(),
            self.balance
        )
    }
}

impl Codec for User {
    fn encoded_len(&self) -> usize {
        str_len(&self.username) + str_len(&self.pass) + str_len(&self.name)
            + 4 // age
            + 1 // sex
            + 4 * 3 // height, weight, balance
            + 4 // kind
    }

    fn encode(&self, fifo: &mut Fifo) -> DeskResult<()> {
        put_str(fifo, &self.username)?;
        put_str(fifo, &self.pass)?;
        put_str(fifo, &self.name)?;
        fifo.write_i32::<LittleEndian>(self.age)?;
        fifo.write_u8(self.sex.as_raw())?;
        fifo.write_f32::<LittleEndian>(self.height)?;
        fifo.write_f32::<LittleEndian>(self.weight)?;
        fifo.write_f32::<LittleEndian>(self.balance)?;
        fifo.write_i32::<LittleEndian>(self.kind.as_raw())?;
        Ok(())
    }

    fn decode(fifo: &mut Fifo) -> DeskResult<Self> {
        let username = get_str(fifo)?;
        let pass = get_str(fifo)?;
        let name = get_str(fifo)?;
        let age = field(fifo.read_i32::<LittleEndian>(), "age")?;
        let sex = Sex::from_raw(field(fifo.read_u8(), "sex")?);
        let height = field(fifo.read_f32::<LittleEndian>(), "height")?;
        let weight = field(fifo.read_f32::<LittleEndian>(), "weight")?;
        let balance = field(fifo.read_f32::<LittleEndian>(), "balance")?;
        let raw_kind = field(fifo.read_i32::<LittleEndian>(), "kind")?;
        let kind = UserKind::from_raw(raw_kind)
            .ok_or_else(|| DeskError::InvalidFormat(format!("unknown user kind {}", raw_kind)))?;

        Ok(User {
            username,
            pass,
            name,
            age,
            sex,
            height,
            weight,
            balance,
            kind,
        })
    }
}
