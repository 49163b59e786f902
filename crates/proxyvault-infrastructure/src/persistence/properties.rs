//! Flat `key=value` property files.
//!
//! Reads and writes the subset of the Java `.properties` syntax needed for
//! the proxy store: comments, `=`/`:`/whitespace separators, backslash
//! escapes, `\uXXXX` escapes and line continuations. Output is pure ASCII.
//!
//! The XML form (`<properties><entry key="..">..</entry></properties>`) is
//! read as well, since older stores were written that way. It is never
//! written.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PropertiesError {
    #[error("Malformed \\uXXXX escape on line {0}")]
    MalformedUnicodeEscape(usize),

    #[error("Malformed XML properties at byte {position}: {message}")]
    Xml { position: u64, message: String },
}

/// Ordered key/value records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: Vec<(String, String)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace; a replaced key keeps its original position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse property-file text. Later duplicates override earlier ones.
    pub fn parse(input: &str) -> Result<Self, PropertiesError> {
        let mut properties = Self::new();
        let mut lines = input.lines().enumerate();

        while let Some((index, line)) = lines.next() {
            let line_number = index + 1;
            let trimmed = line.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while ends_with_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            properties.set(
                unescape(key, line_number)?,
                unescape(value, line_number)?,
            );
        }

        Ok(properties)
    }

    /// Whether `input` uses the XML form rather than `key=value` lines
    pub fn is_xml(input: &str) -> bool {
        let head = input.trim_start_matches('\u{feff}').trim_start();
        head.starts_with("<?xml")
            || head.starts_with("<!DOCTYPE properties")
            || head.starts_with("<properties")
    }

    /// Parse the XML form. Later duplicates override earlier ones.
    pub fn parse_xml(input: &str) -> Result<Self, PropertiesError> {
        let mut reader = Reader::from_str(input);
        let mut properties = Self::new();
        let mut current: Option<(String, String)> = None;

        loop {
            let position = reader.buffer_position() as u64;

            match reader.read_event().map_err(|e| xml_error(position, e))? {
                Event::Start(e) if e.name().as_ref() == b"entry" => {
                    current = Some((entry_key(&e, position)?, String::new()));
                }
                Event::Empty(e) if e.name().as_ref() == b"entry" => {
                    properties.set(entry_key(&e, position)?, String::new());
                }
                Event::Text(text) => {
                    if let Some((_, value)) = current.as_mut() {
                        value.push_str(&text.unescape().map_err(|e| xml_error(position, e))?);
                    }
                }
                Event::CData(data) => {
                    if let Some((_, value)) = current.as_mut() {
                        value.push_str(
                            std::str::from_utf8(&data).map_err(|e| xml_error(position, e))?,
                        );
                    }
                }
                Event::End(e) if e.name().as_ref() == b"entry" => {
                    if let Some((key, value)) = current.take() {
                        properties.set(key, value);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if current.is_some() {
            return Err(xml_error(
                reader.buffer_position() as u64,
                "Unterminated <entry>",
            ));
        }

        Ok(properties)
    }

    /// Render as property-file text, with an optional `#` header line
    pub fn render(&self, header: Option<&str>) -> String {
        let mut out = String::new();
        if let Some(header) = header {
            out.push('#');
            out.push_str(&escape(header, EscapeMode::Comment));
            out.push('\n');
        }
        for (key, value) in &self.entries {
            out.push_str(&escape(key, EscapeMode::Key));
            out.push('=');
            out.push_str(&escape(value, EscapeMode::Value));
            out.push('\n');
        }
        out
    }
}

fn xml_error(position: u64, message: impl std::fmt::Display) -> PropertiesError {
    PropertiesError::Xml {
        position,
        message: message.to_string(),
    }
}

fn entry_key(element: &BytesStart<'_>, position: u64) -> Result<String, PropertiesError> {
    let attribute = element
        .try_get_attribute("key")
        .map_err(|e| xml_error(position, e))?
        .ok_or_else(|| xml_error(position, "<entry> without a key attribute"))?;
    attribute
        .unescape_value()
        .map(|key| key.into_owned())
        .map_err(|e| xml_error(position, e))
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let rest = line[key_end..].trim_start_matches(is_blank);
    let rest = rest.strip_prefix(|c| c == '=' || c == ':').unwrap_or(rest);
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str, line: usize) -> Result<String, PropertiesError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut pending_high: Option<u16> = None;

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let unit = match chars.next() {
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.chars().count() != 4 {
                    return Err(PropertiesError::MalformedUnicodeEscape(line));
                }
                u16::from_str_radix(&hex, 16)
                    .map_err(|_| PropertiesError::MalformedUnicodeEscape(line))?
            }
            Some('t') => {
                out.push('\t');
                continue;
            }
            Some('n') => {
                out.push('\n');
                continue;
            }
            Some('r') => {
                out.push('\r');
                continue;
            }
            Some('f') => {
                out.push('\u{c}');
                continue;
            }
            Some(other) => {
                out.push(other);
                continue;
            }
            None => break,
        };

        match (pending_high.take(), unit) {
            (None, 0xD800..=0xDBFF) => pending_high = Some(unit),
            (Some(high), 0xDC00..=0xDFFF) => {
                let decoded = char::decode_utf16([high, unit])
                    .next()
                    .and_then(Result::ok)
                    .ok_or(PropertiesError::MalformedUnicodeEscape(line))?;
                out.push(decoded);
            }
            (None, _) => {
                let decoded = char::from_u32(u32::from(unit))
                    .ok_or(PropertiesError::MalformedUnicodeEscape(line))?;
                out.push(decoded);
            }
            (Some(_), _) => return Err(PropertiesError::MalformedUnicodeEscape(line)),
        }
    }

    if pending_high.is_some() {
        return Err(PropertiesError::MalformedUnicodeEscape(line));
    }

    Ok(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EscapeMode {
    Key,
    Value,
    Comment,
}

fn escape(raw: &str, mode: EscapeMode) -> String {
    let mut out = String::with_capacity(raw.len());

    for (i, c) in raw.chars().enumerate() {
        match c {
            '\n' if mode == EscapeMode::Comment => out.push_str("\n#"),
            '\r' if mode == EscapeMode::Comment => {}
            _ if mode == EscapeMode::Comment && c.is_ascii() => out.push(c),
            ' ' if mode == EscapeMode::Key || i == 0 => out.push_str("\\ "),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{c}' => out.push_str("\\f"),
            '=' | ':' | '#' | '!' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_entries() {
        let input = "# comment\n! other comment\n\nhost=proxy.local\nport : 8080\nenabled true\n";
        let properties = Properties::parse(input).unwrap();

        assert_eq!(properties.get("host"), Some("proxy.local"));
        assert_eq!(properties.get("port"), Some("8080"));
        assert_eq!(properties.get("enabled"), Some("true"));
        assert_eq!(properties.iter().count(), 3);
    }

    #[test]
    fn test_parse_keeps_value_separators_after_the_first() {
        let properties = Properties::parse("password=gcm:abc==\n").unwrap();
        assert_eq!(properties.get("password"), Some("gcm:abc=="));
    }

    #[test]
    fn test_parse_empty_value() {
        let properties = Properties::parse("host=\nusername\n").unwrap();
        assert_eq!(properties.get("host"), Some(""));
        assert_eq!(properties.get("username"), Some(""));
    }

    #[test]
    fn test_parse_continuation_lines() {
        let input = "host=proxy.\\\n    example.org\nport=1\n";
        let properties = Properties::parse(input).unwrap();
        assert_eq!(properties.get("host"), Some("proxy.example.org"));
        assert_eq!(properties.get("port"), Some("1"));
    }

    #[test]
    fn test_parse_escapes() {
        let input = "my\\ key=a\\=b\\:c\\\\d\\te\nname=caf\\u00E9 \\uD83D\\uDE00\n";
        let properties = Properties::parse(input).unwrap();
        assert_eq!(properties.get("my key"), Some("a=b:c\\d\te"));
        assert_eq!(properties.get("name"), Some("café 😀"));
    }

    #[test]
    fn test_parse_rejects_bad_unicode_escape() {
        assert_eq!(
            Properties::parse("a=1\nb=\\u12\n"),
            Err(PropertiesError::MalformedUnicodeEscape(2))
        );
        assert!(Properties::parse("c=\\uZZZZ\n").is_err());
    }

    #[test]
    fn test_later_duplicates_win() {
        let properties = Properties::parse("port=1\nport=2\n").unwrap();
        assert_eq!(properties.get("port"), Some("2"));
        assert_eq!(properties.iter().count(), 1);
    }

    #[test]
    fn test_render_escapes_and_reparses() {
        let mut properties = Properties::new();
        properties.set("enabled", "true");
        properties.set("username", " dom\\user=admin#1 ");
        properties.set("host", "høst\nname");

        let rendered = properties.render(Some("Proxy settings"));
        assert!(rendered.starts_with("#Proxy settings\n"));
        assert!(rendered.contains("username=\\ dom\\\\user\\=admin\\#1 \n"));
        assert!(rendered.contains("host=h\\u00F8st\\nname\n"));
        assert!(rendered.is_ascii());

        assert_eq!(Properties::parse(&rendered).unwrap(), properties);
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut properties = Properties::new();
        properties.set("a", "1");
        properties.set("b", "2");
        properties.set("a", "3");

        let keys: Vec<&str> = properties.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(properties.get("a"), Some("3"));
    }

    const JAVA_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!DOCTYPE properties SYSTEM "http://java.sun.com/dtd/properties.dtd">
<properties>
<comment>written by an older release</comment>
<entry key="enabled">true</entry>
<entry key="host">proxy.corp</entry>
<entry key="port">3128</entry>
<entry key="username">dom\alice &amp; co</entry>
<entry key="password"/>
</properties>
"#;

    #[test]
    fn test_detects_xml_form() {
        assert!(Properties::is_xml(JAVA_XML));
        assert!(Properties::is_xml("\n  <properties></properties>"));
        assert!(!Properties::is_xml("#<?xml\nhost=proxy.corp\n"));
        assert!(!Properties::is_xml("host=<properties>\n"));
    }

    #[test]
    fn test_parse_xml_entries() {
        let properties = Properties::parse_xml(JAVA_XML).unwrap();

        assert_eq!(properties.get("enabled"), Some("true"));
        assert_eq!(properties.get("host"), Some("proxy.corp"));
        assert_eq!(properties.get("port"), Some("3128"));
        assert_eq!(properties.get("username"), Some("dom\\alice & co"));
        assert_eq!(properties.get("password"), Some(""));
        assert_eq!(properties.get("comment"), None);
        assert_eq!(properties.iter().count(), 5);
    }

    #[test]
    fn test_parse_xml_rejects_broken_documents() {
        assert!(matches!(
            Properties::parse_xml("<properties><entry>x</entry></properties>"),
            Err(PropertiesError::Xml { .. })
        ));
        assert!(matches!(
            Properties::parse_xml("<properties><entry key=\"host\">proxy"),
            Err(PropertiesError::Xml { .. })
        ));
    }
}
