// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;

/// One inventory item parsed from the feed. Immutable for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub manufacturer: String,
    pub model: String,
    pub caliber: String,
    pub serial_number: String,
    pub image_url: Option<String>,
    pub archived: bool,
    pub disposition: Option<String>,
}

impl Record {
    /// Derived identity: manufacturer, model, and serial joined with `-`,
    /// whitespace runs collapsed to `-`. Identical triples collide; the
    /// dataset is small and externally curated, so that is accepted.
    pub fn key(&self) -> String {
        let joined = format!(
            "{}-{}-{}",
            self.manufacturer, self.model, self.serial_number
        );
        let mut key = String::with_capacity(joined.len());
        let mut in_whitespace = false;
        for ch in joined.chars() {
            if ch.is_whitespace() {
                if !in_whitespace {
                    key.push('-');
                }
                in_whitespace = true;
            } else {
                key.push(ch);
                in_whitespace = false;
            }
        }
        key
    }

    /// Case-insensitive substring match over manufacturer, model, and
    /// caliber. Serial numbers and disposition notes are never searched.
    /// An empty query matches every record.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.manufacturer.to_lowercase().contains(&needle)
            || self.model.to_lowercase().contains(&needle)
            || self.caliber.to_lowercase().contains(&needle)
    }

    pub const fn partition(&self) -> Partition {
        if self.archived {
            Partition::Archived
        } else {
            Partition::Active
        }
    }
}

/// Disjoint grouping of records by the archived flag, exposed as two
/// independently searchable views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Active,
    Archived,
}

impl Partition {
    pub const ALL: [Self; 2] = [Self::Active, Self::Archived];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Active => 0,
            Self::Archived => 1,
        }
    }
}

/// Session-owned load result: built once before the event loop, immutable
/// afterward, discarded on exit. A failed load carries its reason here as
/// data so the view can tell "no data" from "load failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    records: Vec<Record>,
    skipped: usize,
    fetched_at: OffsetDateTime,
    load_error: Option<String>,
}

impl Inventory {
    pub fn loaded(records: Vec<Record>, skipped: usize, fetched_at: OffsetDateTime) -> Self {
        Self {
            records,
            skipped,
            fetched_at,
            load_error: None,
        }
    }

    pub fn failed(reason: impl Into<String>, fetched_at: OffsetDateTime) -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            fetched_at,
            load_error: Some(reason.into()),
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub const fn fetched_at(&self) -> OffsetDateTime {
        self.fetched_at
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn partition(&self, partition: Partition) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.partition() == partition)
            .collect()
    }

    pub fn count(&self, partition: Partition) -> usize {
        self.records
            .iter()
            .filter(|record| record.partition() == partition)
            .count()
    }

    /// Pure filter over one partition; recomputed from scratch per query
    /// change, which is fine at tens to low hundreds of records.
    pub fn filtered(&self, partition: Partition, query: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| record.partition() == partition && record.matches(query))
            .collect()
    }

    pub fn find(&self, key: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Inventory, Partition, Record};
    use time::OffsetDateTime;

    fn record(manufacturer: &str, model: &str, caliber: &str, archived: bool) -> Record {
        Record {
            manufacturer: manufacturer.to_owned(),
            model: model.to_owned(),
            caliber: caliber.to_owned(),
            serial_number: "SN-1".to_owned(),
            image_url: None,
            archived,
            disposition: None,
        }
    }

    #[test]
    fn key_joins_identity_fields_and_collapses_whitespace() {
        let item = Record {
            manufacturer: "Smith & Wesson".to_owned(),
            model: "M&P  9".to_owned(),
            caliber: "9mm".to_owned(),
            serial_number: "HNX 1234".to_owned(),
            image_url: None,
            archived: false,
            disposition: None,
        };
        assert_eq!(item.key(), "Smith-&-Wesson-M&P-9-HNX-1234");
    }

    #[test]
    fn key_collides_for_identical_identity_triples() {
        let first = record("Glock", "19", "9mm", false);
        let second = record("Glock", "19", ".40", true);
        assert_eq!(first.key(), second.key());
    }

    #[test]
    fn matches_is_case_insensitive_over_three_fields() {
        let item = record("Glock", "19 Gen5", "9mm Luger", false);
        assert!(item.matches("glo"));
        assert!(item.matches("GEN5"));
        assert!(item.matches("luger"));
        assert!(item.matches(""));
        assert!(!item.matches("colt"));
    }

    #[test]
    fn matches_never_searches_serial_or_disposition() {
        let item = Record {
            manufacturer: "Colt".to_owned(),
            model: "1911".to_owned(),
            caliber: ".45 ACP".to_owned(),
            serial_number: "XYZ789".to_owned(),
            image_url: None,
            archived: true,
            disposition: Some("Traded at the Tulsa show".to_owned()),
        };
        assert!(!item.matches("XYZ789"));
        assert!(!item.matches("tulsa"));
    }

    #[test]
    fn partitions_are_disjoint_and_exhaustive() {
        let inventory = Inventory::loaded(
            vec![
                record("Glock", "19", "9mm", false),
                record("Colt", "1911", ".45", true),
                record("Ruger", "10/22", ".22 LR", false),
            ],
            0,
            OffsetDateTime::UNIX_EPOCH,
        );

        let active = inventory.partition(Partition::Active);
        let archived = inventory.partition(Partition::Archived);
        assert_eq!(active.len() + archived.len(), inventory.records().len());
        for item in inventory.records() {
            let in_active = active.iter().any(|entry| *entry == item);
            let in_archived = archived.iter().any(|entry| *entry == item);
            assert!(in_active != in_archived);
        }
    }

    #[test]
    fn filtered_applies_query_within_one_partition() {
        let inventory = Inventory::loaded(
            vec![
                record("Glock", "19", "9mm", false),
                record("Colt", "1911", ".45", false),
                record("Glock", "17", "9mm", true),
            ],
            0,
            OffsetDateTime::UNIX_EPOCH,
        );

        let hits = inventory.filtered(Partition::Active, "glo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].model, "19");

        let all_active = inventory.filtered(Partition::Active, "");
        assert_eq!(all_active.len(), 2);
    }

    #[test]
    fn failed_inventory_is_empty_but_carries_the_reason() {
        let inventory = Inventory::failed("feed URL is not configured", OffsetDateTime::UNIX_EPOCH);
        assert!(inventory.records().is_empty());
        assert_eq!(inventory.count(Partition::Active), 0);
        assert_eq!(
            inventory.load_error(),
            Some("feed URL is not configured")
        );
    }

    #[test]
    fn find_locates_records_by_derived_key() {
        let inventory = Inventory::loaded(
            vec![record("Glock", "19", "9mm", false)],
            0,
            OffsetDateTime::UNIX_EPOCH,
        );
        assert!(inventory.find("Glock-19-SN-1").is_some());
        assert!(inventory.find("Colt-1911-SN-1").is_none());
    }
}
