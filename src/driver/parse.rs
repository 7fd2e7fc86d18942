use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{hex_digit1, space0},
    combinator::{map_res, opt},
    sequence::{delimited, preceded},
    IResult,
};
use thiserror::Error;

/// Gets thrown when text that should describe a value (for example an
/// [`OdIndex`][super::od::OdIndex]) couldn't be parsed
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ParseError {
    /// The number was syntactically fine but doesn't fit the target type
    #[error("Invalid Value while Parsing, probably too big")]
    InvalidValue,
    /// Everything up to some point was parsed but there was input left over
    #[error("unexpected trailing input: {0:?}")]
    NonEmptyRemainder(String),
    /// Wrapper around the kind of a [`nom::error::Error`]
    #[error("nom error: {0:?}")]
    NomError(nom::error::ErrorKind),
}

impl<I> From<nom::error::Error<I>> for ParseError {
    fn from(e: nom::error::Error<I>) -> Self {
        match e.code {
            nom::error::ErrorKind::MapRes => Self::InvalidValue,
            code => Self::NomError(code),
        }
    }
}

// hex number, optionally prefixed with 0x or suffixed with h as it is written
// in the manuals
fn parse_hex<'a, T, F>(s: &'a str, from_str_radix: F) -> IResult<&'a str, T>
where
    F: Fn(&'a str, u32) -> Result<T, std::num::ParseIntError>,
{
    delimited(
        preceded(space0, opt(tag_no_case("0x"))),
        map_res(hex_digit1, |d| from_str_radix(d, 16)),
        preceded(opt(tag_no_case("h")), space0),
    )(s)
}

pub(super) fn parse_hex_u16(s: &str) -> IResult<&str, u16> {
    parse_hex(s, u16::from_str_radix)
}

pub(super) fn parse_hex_u8(s: &str) -> IResult<&str, u8> {
    parse_hex(s, u8::from_str_radix)
}

pub(super) fn parse_separator(s: &str) -> IResult<&str, &str> {
    alt((tag(":"), tag(".")))(s)
}
