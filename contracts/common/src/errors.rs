//! Error taxonomy shared by every contract error enum.
//!
//! Each contract owns one block of 100 codes:
//!
//! | Block | Contract            |
//! |-------|---------------------|
//! | 1xx   | reward tracker      |
//! | 2xx   | reward distributor  |
//! | 3xx   | bonus distributor   |
//! | 4xx   | vester              |
//! | 5xx   | reward router       |
//!
//! Inside a block the last two digits select the class:
//!
//! | Range   | Class                 |
//! |---------|-----------------------|
//! | 01 – 19 | State gate            |
//! | 20 – 39 | Authorization         |
//! | 40 – 59 | Insufficient balance  |
//! | 60 – 79 | Invalid argument      |
//! | 80 – 99 | Capacity exceeded     |
//!
//! Codes never change once released; operators match on them verbatim.

pub const TRACKER_BLOCK: u32 = 100;
pub const DISTRIBUTOR_BLOCK: u32 = 200;
pub const BONUS_DISTRIBUTOR_BLOCK: u32 = 300;
pub const VESTER_BLOCK: u32 = 400;
pub const ROUTER_BLOCK: u32 = 500;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Lifecycle or sequencing gate: not initialised, already initialised,
    /// mode disabled, transfer not signalled.
    StateGate,
    /// Caller is neither governance nor holds the required capability.
    Authorization,
    /// Stake, deposit balance, share balance or allowance exceeded.
    InsufficientBalance,
    /// Zero or negative amount, unknown token, malformed configuration.
    InvalidArgument,
    /// Vesting ceiling exceeded.
    CapacityExceeded,
}

/// Maps a contract error code to its class. Returns `None` for codes outside
/// the suite's blocks.
pub fn classify(code: u32) -> Option<ErrorClass> {
    if !(TRACKER_BLOCK..ROUTER_BLOCK + 100).contains(&code) {
        return None;
    }
    match code % 100 {
        1..=19 => Some(ErrorClass::StateGate),
        20..=39 => Some(ErrorClass::Authorization),
        40..=59 => Some(ErrorClass::InsufficientBalance),
        60..=79 => Some(ErrorClass::InvalidArgument),
        80..=99 => Some(ErrorClass::CapacityExceeded),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_the_last_two_digits() {
        assert_eq!(classify(101), Some(ErrorClass::StateGate));
        assert_eq!(classify(220), Some(ErrorClass::Authorization));
        assert_eq!(classify(440), Some(ErrorClass::InsufficientBalance));
        assert_eq!(classify(560), Some(ErrorClass::InvalidArgument));
        assert_eq!(classify(480), Some(ErrorClass::CapacityExceeded));
    }

    #[test]
    fn codes_outside_blocks_are_unclassified() {
        assert_eq!(classify(0), None);
        assert_eq!(classify(42), None);
        assert_eq!(classify(300), None);
        assert_eq!(classify(600), None);
    }
}
