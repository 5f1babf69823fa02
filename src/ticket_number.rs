//! Human-readable ticket identifiers: `TKT-YYYYMMDD-XXXX`

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 4;

/// Ticket number for today's local date
pub fn generate_ticket_number() -> String {
    generate_ticket_number_at(&Local::now(), &mut rand::thread_rng())
}

pub fn generate_ticket_number_at<Tz, R>(now: &DateTime<Tz>, rng: &mut R) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    R: Rng + ?Sized,
{
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect();

    format!("TKT-{}-{}", now.format("%Y%m%d"), suffix)
}
