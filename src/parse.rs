//! Recognizing the pattern file is deliberately line-oriented: every
//! non-blank line is either the group separator or one complete INSTPAT
//! invocation. There is no recovery; the first bad line stops the run.
use super::driver::Driver;
use super::pattern::{CompiledPattern, PatternSpec, WordWidth};
use super::*;

use regex::Regex;

/// One decode stage worth of compiled patterns, in source order.
pub type Group = Vec<CompiledPattern>;

/// line that closes the current group and opens the next decode stage
const GROUP_SEPARATOR: &str = "---";

pub struct Parser {
    driver: Driver,
    re_entry: Regex, // matches a complete INSTPAT invocation at this driver's arity
}

impl Parser {
    pub fn new(driver: Driver) -> Parser {
        let re_entry = if driver.takes_shape() {
            Regex::new(r#"^INSTPAT\s*\(\s*"([^"]+)"\s*,\s*([^,\s)]+)\s*,\s*([^,\s)]+)\s*(?:,\s*(\d+)\s*)?\)\s*;"#)
                .unwrap()
        } else {
            Regex::new(r#"^INSTPAT\s*\(\s*"([^"]+)"\s*,\s*([^,\s)]+)\s*(?:,\s*(\d+)\s*)?\)\s*;"#).unwrap()
        };
        Parser { driver, re_entry }
    }

    /// Split the input into groups of compiled patterns. Blank lines are
    /// skipped; the trailing group is always present, even when empty.
    pub fn parse(&self, text: &str) -> Result<Vec<Group>, Error> {
        let mut groups: Vec<Group> = Vec::new();
        let mut group: Group = Vec::new();
        for (num, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line == GROUP_SEPARATOR {
                groups.push(group);
                group = Vec::new();
                continue;
            }
            let spec = self.parse_entry(num + 1, line)?;
            group.push(CompiledPattern::compile(spec)?);
        }
        groups.push(group);
        Ok(groups)
    }

    fn parse_entry(&self, num: usize, line: &str) -> Result<PatternSpec, Error> {
        let c = self
            .re_entry
            .captures(line)
            .ok_or_else(|| syntax_err_line!(num, line, format!("unrecognized statement \"{}\"", line)))?;
        let literal = c[1].to_string();
        // dotted mnemonics become identifiers
        let name = c[2].replace('.', "_");
        let (shape, width_match) = if self.driver.takes_shape() {
            (Some(c[3].to_string()), c.get(4))
        } else {
            (None, c.get(3))
        };
        let width = match width_match.map(|m| m.as_str()) {
            None => WordWidth::Both,
            Some("32") => WordWidth::Only32,
            Some("64") => WordWidth::Only64,
            Some(w) => {
                return Err(width_err_line!(
                    num,
                    line,
                    format!("invalid width literal \"{}\" (expected 32 or 64)", w)
                ))
            }
        };
        Ok(PatternSpec {
            literal,
            name,
            shape,
            width,
        })
    }
}
