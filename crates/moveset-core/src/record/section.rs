use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::entry::{CounterEntry, UsageRow};

/// Named table sections of a moveset report.
///
/// Declaration order is the order sections appear in a report and the
/// iteration order of [`Sections`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    IntoStaticStr,
    Display,
    EnumIter,
)]
pub enum SectionName {
    #[strum(serialize = "Abilities")]
    Abilities,
    #[strum(serialize = "Items")]
    Items,
    #[strum(serialize = "Spreads")]
    Spreads,
    #[strum(serialize = "Moves")]
    Moves,
    #[strum(serialize = "Tera Types")]
    TeraTypes,
    #[strum(serialize = "Teammates")]
    Teammates,
    #[strum(serialize = "Checks and Counters")]
    ChecksAndCounters,
}

impl SectionName {
    /// Sections holding percentage-ranked rows
    pub const USAGE: [SectionName; 6] = [
        SectionName::Abilities,
        SectionName::Items,
        SectionName::Spreads,
        SectionName::Moves,
        SectionName::TeraTypes,
        SectionName::Teammates,
    ];

    pub fn is_counters(&self) -> bool {
        matches!(self, Self::ChecksAndCounters)
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Match a cleaned table cell against the known section titles
    pub fn from_cell(cell: &str) -> Option<Self> {
        Self::from_str(cell).ok()
    }
}

/// Contents of one section. The variant is fixed by the section name.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Usage(Vec<UsageRow>),
    Counters(Vec<CounterEntry>),
}

impl Section {
    pub fn empty_for(name: SectionName) -> Self {
        if name.is_counters() {
            Section::Counters(Vec::new())
        } else {
            Section::Usage(Vec::new())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Section::Usage(rows) => rows.len(),
            Section::Counters(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Section map of a record. Only non-empty sections are ever stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections(BTreeMap<SectionName, Section>);

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section, dropping it if it has no rows
    pub fn insert(&mut self, name: SectionName, section: Section) {
        if section.is_empty() {
            self.0.remove(&name);
        } else {
            self.0.insert(name, section);
        }
    }

    pub fn get(&self, name: SectionName) -> Option<&Section> {
        self.0.get(&name)
    }

    pub fn contains(&self, name: SectionName) -> bool {
        self.0.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectionName, &Section)> {
        self.0.iter().map(|(name, section)| (*name, section))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, section) in &self.0 {
            match section {
                Section::Usage(rows) => map.serialize_entry(name.as_str(), rows)?,
                Section::Counters(rows) => map.serialize_entry(name.as_str(), rows)?,
            }
        }
        map.end()
    }
}

struct SectionsVisitor;

impl<'de> Visitor<'de> for SectionsVisitor {
    type Value = Sections;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of section name to rows")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Sections, A::Error> {
        let mut sections = Sections::new();
        while let Some(key) = access.next_key::<String>()? {
            // Unknown titles from newer report layouts are skipped
            let Some(name) = SectionName::from_cell(&key) else {
                access.next_value::<IgnoredAny>()?;
                continue;
            };
            let section = if name.is_counters() {
                Section::Counters(access.next_value::<Option<Vec<CounterEntry>>>()?.unwrap_or_default())
            } else {
                Section::Usage(access.next_value::<Option<Vec<UsageRow>>>()?.unwrap_or_default())
            };
            sections.insert(name, section);
        }
        Ok(sections)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Sections, E> {
        Ok(Sections::new())
    }
}

impl<'de> Deserialize<'de> for Sections {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SectionsVisitor)
    }
}
