use super::super::parse::ParseError;
use super::OdIndex;

#[test]
fn parse_manual_notation() {
    let od: OdIndex = "6040:00".parse().unwrap();
    assert_eq!(od, OdIndex::new(0x6040, 0));
}

#[test]
fn parse_prefixed() {
    let od: OdIndex = "0x607d:0x02".parse().unwrap();
    assert_eq!(od, OdIndex::new(0x607D, 2));
}

#[test]
fn parse_suffixed_with_dot() {
    let od: OdIndex = "6081h.00h".parse().unwrap();
    assert_eq!(od, OdIndex::new(0x6081, 0));
}

#[test]
fn parse_without_subindex() {
    let od: OdIndex = "1008".parse().unwrap();
    assert_eq!(od, OdIndex::new(0x1008, 0));
}

#[test]
fn parse_too_big() {
    assert_eq!("16040:00".parse::<OdIndex>(), Err(ParseError::InvalidValue));
    assert_eq!("6040:100".parse::<OdIndex>(), Err(ParseError::InvalidValue));
}

#[test]
fn parse_remainder() {
    assert!(matches!(
        "6040:00 garbage".parse::<OdIndex>(),
        Err(ParseError::NonEmptyRemainder(_))
    ));
}

#[test]
fn parse_empty() {
    assert!(matches!(
        "".parse::<OdIndex>(),
        Err(ParseError::NomError(_))
    ));
}

#[test]
fn fmt() {
    assert_eq!(format!("{}", OdIndex::new(0x6040, 0)), "6040:00");
    assert_eq!(format!("{}", OdIndex::new(0x607D, 2)), "607D:02");
}
