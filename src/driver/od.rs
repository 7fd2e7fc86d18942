#[cfg(test)]
mod tests;

use super::parse::{parse_hex_u16, parse_hex_u8, parse_separator, ParseError};
use nom::{
    combinator::{cut, opt},
    sequence::preceded,
    Finish, Parser,
};
use std::{fmt::Display, str::FromStr};

/// Address of an object in the object dictionary of a controller
///
/// Written the same way as in the Nanotec manuals, `6040:00` being the
/// controlword. See [`FromStr`] for the accepted spellings.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct OdIndex {
    pub index: u16,
    pub subindex: u8,
}

impl OdIndex {
    pub const fn new(index: u16, subindex: u8) -> Self {
        OdIndex { index, subindex }
    }
}

impl Display for OdIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}:{:02X}", self.index, self.subindex)
    }
}

/// Parses `6040:00`, `0x6040:0x00`, `6040h.00h` or just `6040`, in which case
/// the subindex is 0. All numbers are hexadecimal.
///
/// # Examples
/// ```
/// # use nanotec_c5e_driver::OdIndex;
/// let od: OdIndex = "607D:02".parse().unwrap();
/// assert_eq!(od, OdIndex::new(0x607D, 0x02));
/// assert_eq!("0x6041".parse::<OdIndex>().unwrap(), OdIndex::new(0x6041, 0));
/// ```
impl FromStr for OdIndex {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rem, (index, subindex)) = parse_hex_u16
            .and(opt(preceded(parse_separator, cut(parse_hex_u8))))
            .parse(s)
            .finish()?;
        if !rem.is_empty() {
            return Err(ParseError::NonEmptyRemainder(rem.to_string()));
        }
        Ok(OdIndex::new(index, subindex.unwrap_or(0)))
    }
}
