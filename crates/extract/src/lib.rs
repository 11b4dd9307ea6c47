//! Metadata extraction for the two kinds of launchable assets found on a
//! MiSTer SD card.
//!
//! - **Logic images** (`.rbf`) only carry metadata in their filename, using the
//!   dated-codename convention `<codename>_<YYYYMMDD><suffix>.rbf`.
//! - **Arcade definitions** (`.mra`) are small XML documents naming the game,
//!   the logic image it runs on and the ROM archives it needs.
//!
//! Nothing in here touches the filesystem; callers hand over filenames and
//! bytes.

mod consts;
pub mod error;
pub mod models;

use exn::ResultExt;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::instrument;

pub use crate::consts::{ARCADE_DEFINITION_EXTENSION, LOGIC_IMAGE_EXTENSION};
use crate::error::{ErrorKind, Result};
use crate::models::{ArcadeDefinition, ArchiveReference, LogicImageName};

const UTF8_BOM: char = '\u{feff}';

/// Parses the codename and date out of a logic image filename.
///
/// Returns `None` for filenames that don't follow the convention; that is
/// expected for plenty of cores and is not an error.
///
/// # Examples
///
/// ```rust
/// use webmenu_extract::parse_logic_image_name;
///
/// let name = parse_logic_image_name("NeoGeo_20210615_v2.rbf").unwrap();
/// assert_eq!(name.code_name, "NeoGeo");
/// assert_eq!(name.code_date, "20210615");
///
/// assert!(parse_logic_image_name("menu.rbf").is_none());
/// ```
pub fn parse_logic_image_name(filename: &str) -> Option<LogicImageName> {
    let captures = consts::LOGIC_IMAGE_NAME_REGEX.captures(filename)?;
    Some(LogicImageName {
        code_name: captures.get(1)?.as_str().to_string(),
        code_date: captures.get(2)?.as_str().to_string(),
    })
}

/// Parses the embedded XML of an arcade definition.
///
/// Accepts raw bytes; the document must be UTF-8 (a leading byte order mark
/// is tolerated). Only the root's direct children are read. `<name>` and
/// `<rbf>` keep their own text and drop any nested markup, and when either
/// appears more than once the last one wins. Anything after the root element
/// is ignored.
///
/// # Errors
///
/// Returns [`ErrorKind::MalformedDocument`] if the bytes are not UTF-8 or
/// not well-formed XML.
#[instrument(skip(xml), fields(xml_size = xml.as_ref().len()))]
pub fn parse_arcade_definition(xml: impl AsRef<[u8]>) -> Result<ArcadeDefinition> {
    let xml = std::str::from_utf8(xml.as_ref()).or_raise(|| ErrorKind::MalformedDocument("not UTF-8".to_string()))?;
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    let mut reader = Reader::from_str(xml);
    let mut definition = ArcadeDefinition::default();
    let mut field: Option<Field> = None;
    let mut text = String::new();
    let mut depth = 0usize;
    let mut has_root = false;
    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                depth += 1;
                has_root = true;
                if depth == 2 {
                    field = Field::from_name(e.name().as_ref());
                    text.clear();
                    if e.name().as_ref() == b"rom" {
                        definition.archives.push(archive_reference(&e)?);
                    }
                }
            },
            Event::Empty(e) => {
                has_root = true;
                if depth == 1 {
                    match Field::from_name(e.name().as_ref()) {
                        Some(Field::Name) => definition.name.clear(),
                        Some(Field::LogicImage) => definition.logic_image = Some(String::new()),
                        None if e.name().as_ref() == b"rom" => definition.archives.push(archive_reference(&e)?),
                        None => {},
                    }
                }
            },
            Event::Text(t) if depth == 2 && field.is_some() => text.push_str(&t.unescape().map_err(malformed)?),
            Event::CData(c) if depth == 2 && field.is_some() => text.push_str(std::str::from_utf8(&c).map_err(malformed)?),
            Event::End(_) => {
                if depth == 2 {
                    match field.take() {
                        Some(Field::Name) => definition.name = std::mem::take(&mut text),
                        Some(Field::LogicImage) => definition.logic_image = Some(std::mem::take(&mut text)),
                        None => {},
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            },
            Event::Eof => {
                if depth != 0 || !has_root {
                    return Err(ErrorKind::MalformedDocument("unexpected end of document".to_string()).into());
                }
                break;
            },
            _ => {},
        }
    }
    tracing::trace!(name = %definition.name, archives = definition.archives.len(), "Parsed arcade definition");
    Ok(definition)
}

/// Root children whose text is kept.
#[derive(Debug, Clone, Copy)]
enum Field {
    Name,
    LogicImage,
}
impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"name" => Some(Self::Name),
            b"rbf" => Some(Self::LogicImage),
            _ => None,
        }
    }
}

/// A `<rom>` without a `zip` attribute still counts, as an empty reference.
fn archive_reference(rom: &BytesStart<'_>) -> Result<ArchiveReference> {
    let zip = match rom.try_get_attribute("zip").map_err(malformed)? {
        Some(attr) => attr.unescape_value().map_err(malformed)?.into_owned(),
        None => String::new(),
    };
    Ok(ArchiveReference::new(zip))
}

fn malformed(e: impl std::fmt::Display) -> ErrorKind {
    ErrorKind::MalformedDocument(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("NeoGeo_20210615_v2.rbf", "NeoGeo", "20210615")]
    #[case("SNES_20210101.rbf", "SNES", "20210101")]
    #[case("Arcade-Pacman_20200412.rbf", "Arcade-Pacman", "20200412")]
    #[case("Minimig_20201231-beta.rbf", "Minimig", "20201231")]
    #[case("Genesis_202106150.rbf", "Genesis", "20210615")]
    fn test_logic_image_name_matches(#[case] filename: &str, #[case] code_name: &str, #[case] code_date: &str) {
        let parsed = parse_logic_image_name(filename).unwrap();
        assert_eq!(parsed.code_name, code_name);
        assert_eq!(parsed.code_date, code_date);
    }

    #[rstest]
    #[case("menu.rbf")]
    #[case("NeoGeo_2021061.rbf")]
    #[case("NeoGeo_v2_20210615.rbf")]
    #[case("_20210615.rbf")]
    #[case("NeoGeo_20210615.v2.rbf")]
    #[case("NeoGeo_20210615.mra")]
    #[case("Minimig_20201231-beta.RBF")]
    fn test_logic_image_name_no_match(#[case] filename: &str) {
        assert!(parse_logic_image_name(filename).is_none());
    }

    #[test]
    fn test_arcade_definition() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <misterromdescription>
                <name>Pac-Man (Midway)</name>
                <setname>pacman</setname>
                <rbf>pacman</rbf>
                <rom index="0" zip="pacman.zip|puckman.zip" md5="none">
                    <part name="pacman.6e"/>
                </rom>
                <switches default="FF"></switches>
                <rom index="1" zip="">
                    <part>00 01</part>
                </rom>
                <rom index="2" zip="namco.zip"/>
            </misterromdescription>
        "#;
        let definition = parse_arcade_definition(xml).unwrap();
        assert_eq!(definition.name, "Pac-Man (Midway)");
        assert_eq!(definition.logic_image.as_deref(), Some("pacman"));
        assert_eq!(
            definition.archives,
            vec![
                ArchiveReference::new("pacman.zip|puckman.zip"),
                ArchiveReference::new(""),
                ArchiveReference::new("namco.zip"),
            ]
        );
    }

    #[test]
    fn test_arcade_definition_minimal() {
        let definition = parse_arcade_definition("<misterromdescription></misterromdescription>").unwrap();
        assert_eq!(definition.name, "");
        assert_eq!(definition.logic_image, None);
        assert!(definition.archives.is_empty());
    }

    #[test]
    fn test_arcade_definition_rom_without_zip() {
        let xml = "<mra><name>Test</name><rom index=\"0\"><part>00</part></rom></mra>";
        let definition = parse_arcade_definition(xml).unwrap();
        assert_eq!(definition.archives, vec![ArchiveReference::new("")]);
    }

    #[test]
    fn test_arcade_definition_byte_order_mark() {
        let xml = "\u{feff}<mra><name>Galaga</name></mra>";
        assert_eq!(parse_arcade_definition(xml).unwrap().name, "Galaga");
    }

    #[test]
    fn test_arcade_definition_repeated_fields() {
        let xml = "<mra><name>First</name><rbf>one</rbf><name>Second</name><rbf>two</rbf></mra>";
        let definition = parse_arcade_definition(xml).unwrap();
        assert_eq!(definition.name, "Second");
        assert_eq!(definition.logic_image.as_deref(), Some("two"));
    }

    #[rstest]
    #[case("<mra><name>Pac<b>x</b>Man</name></mra>", "PacMan")]
    #[case("<mra><name>Tom &amp; Jerry</name></mra>", "Tom & Jerry")]
    #[case("<mra><name><![CDATA[<Raw>]]></name></mra>", "<Raw>")]
    #[case("<mra><name>Old</name><name/></mra>", "")]
    #[case("<mra><group><name>Nested</name></group><name>Top</name></mra>", "Top")]
    fn test_arcade_definition_name_text(#[case] xml: &str, #[case] name: &str) {
        assert_eq!(parse_arcade_definition(xml).unwrap().name, name);
    }

    #[test]
    fn test_arcade_definition_nested_rom_is_ignored() {
        let xml = r#"<mra><rom zip="a.zip"/><group><rom zip="b.zip"/></group><rom zip="c&amp;d.zip"></rom></mra>"#;
        let definition = parse_arcade_definition(xml).unwrap();
        assert_eq!(definition.archives, vec![ArchiveReference::new("a.zip"), ArchiveReference::new("c&d.zip")]);
    }

    #[test]
    fn test_arcade_definition_trailing_content_is_ignored() {
        let definition = parse_arcade_definition("<mra><name>One</name></mra><mra><name>Two</name></mra>").unwrap();
        assert_eq!(definition.name, "One");
    }

    #[rstest]
    #[case(b"<mra><name>Broken</mra>".as_slice())]
    #[case(b"<mra><name>Truncated".as_slice())]
    #[case(b"".as_slice())]
    #[case(b"<mra><name>\xff\xfe</name></mra>".as_slice())]
    fn test_arcade_definition_malformed(#[case] xml: &[u8]) {
        let err = parse_arcade_definition(xml).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedDocument(_)));
    }
}
