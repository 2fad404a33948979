//! Table catalog for the reference data store.
//!
//! Every resource is backed by one relational table. The catalog describes
//! each table once (columns, key kind, foreign keys, child relations) so the
//! storage backends and the resource services can stay generic.
//!
//! ```text
//! region ─┬─ sub_region ─┬─ country ─┬─ country_contact
//!         │              │           ├─ country_document
//!         │              │           └─ country_sector ──┐
//! sector_industry ─ sector_division ─ sector_group ─ sector
//! ```
//!
//! All foreign keys cascade on delete and on update.

use serde_json::{Map, Value};

use crate::key::RecordKey;

/// How the primary key of a table is typed and assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Free text, supplied by the caller.
    Text,
    /// Two-character code (`VARCHAR(2)`), supplied by the caller.
    Code2,
    /// UUID, supplied by the caller or generated before insert.
    Uuid,
    /// Auto-increment integer assigned by the store.
    Serial,
}

impl KeyKind {
    /// Returns `true` when the store assigns the key.
    pub fn is_generated(self) -> bool {
        matches!(self, Self::Serial)
    }
}

/// A foreign key from a column of this table to the key of `references`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

/// Child rows embedded under `field` when a row of this table is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Name of the embedded array in the response.
    pub field: &'static str,
    /// Child table.
    pub table: &'static str,
    /// Column of the child table that points at this table.
    pub column: &'static str,
}

/// Static description of one table.
#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub key: &'static str,
    pub key_kind: KeyKind,
    /// All columns, key included.
    pub columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub children: &'static [Relation],
}

impl TableSchema {
    /// Returns `true` if `name` is a column of this table.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(&name)
    }

    /// Columns other than the primary key.
    pub fn value_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().copied().filter(move |c| *c != self.key)
    }

    /// Keeps only the table's columns from a JSON object, filling missing
    /// columns with `null`. Non-object input yields an all-null row.
    pub fn project(&self, row: &Value) -> Map<String, Value> {
        self.columns
            .iter()
            .map(|column| {
                let value = row.get(*column).cloned().unwrap_or(Value::Null);
                ((*column).to_string(), value)
            })
            .collect()
    }

    /// Extracts the primary key from a row, if present and well-formed.
    pub fn key_of(&self, row: &Value) -> Option<RecordKey> {
        row.get(self.key)
            .and_then(|value| RecordKey::from_value(self.key_kind, value))
    }

    /// Foreign keys in other tables that point at this one.
    pub fn referenced_by(&self) -> Vec<(&'static TableSchema, &'static ForeignKey)> {
        CATALOG
            .iter()
            .flat_map(|table| {
                table
                    .foreign_keys
                    .iter()
                    .filter(|fk| fk.references == self.name)
                    .map(move |fk| (*table, fk))
            })
            .collect()
    }
}

pub static REGION: TableSchema = TableSchema {
    name: "region",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id"],
    foreign_keys: &[],
    children: &[Relation {
        field: "subregions",
        table: "sub_region",
        column: "subregion_id",
    }],
};

pub static SUB_REGION: TableSchema = TableSchema {
    name: "sub_region",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id", "subregion_id"],
    foreign_keys: &[ForeignKey {
        column: "subregion_id",
        references: "region",
    }],
    children: &[Relation {
        field: "countries",
        table: "country",
        column: "subregion_id",
    }],
};

pub static COUNTRY: TableSchema = TableSchema {
    name: "country",
    key: "id",
    key_kind: KeyKind::Code2,
    columns: &[
        "id",
        "subregion_id",
        "calling_code",
        "name",
        "other_names",
        "motto",
        "date_of_independence",
        "introduction",
        "location",
        "neighbours",
        "capital_city",
        "population",
        "languages",
        "facts_and_figures",
        "classification",
        "life_expectancy",
        "median_age",
        "average_children",
        "income_group",
        "employment_rate",
        "unemployment_rate",
        "contribution_men",
        "contribution_women",
        "gdp_2019",
        "gdp_per_capita",
        "growth_of_gdp",
        "inflation",
        "investment",
        "total_debt",
        "gnp_per_capita",
        "corruption_rank",
        "credit_rank",
        "business_score",
        "key_sectors_growth",
        "key_issues",
    ],
    foreign_keys: &[ForeignKey {
        column: "subregion_id",
        references: "sub_region",
    }],
    children: &[],
};

pub static COUNTRY_CONTACT: TableSchema = TableSchema {
    name: "country_contact",
    key: "id",
    key_kind: KeyKind::Serial,
    columns: &[
        "id",
        "country_id",
        "updated_at",
        "govt_contact",
        "economic_contact",
        "parliament_contact",
        "judiciary_contact",
    ],
    foreign_keys: &[ForeignKey {
        column: "country_id",
        references: "country",
    }],
    children: &[],
};

pub static COUNTRY_DOCUMENT: TableSchema = TableSchema {
    name: "country_document",
    key: "id",
    key_kind: KeyKind::Uuid,
    columns: &[
        "id",
        "country_id",
        "document_type",
        "name",
        "filesize",
        "filetype",
    ],
    foreign_keys: &[ForeignKey {
        column: "country_id",
        references: "country",
    }],
    children: &[],
};

pub static COUNTRY_SECTOR: TableSchema = TableSchema {
    name: "country_sector",
    key: "id",
    key_kind: KeyKind::Serial,
    columns: &[
        "id",
        "country_id",
        "sector_id",
        "contribution_to_gdp",
        "growth_rate",
    ],
    foreign_keys: &[
        ForeignKey {
            column: "country_id",
            references: "country",
        },
        ForeignKey {
            column: "sector_id",
            references: "sector",
        },
    ],
    children: &[],
};

pub static SECTOR_INDUSTRY: TableSchema = TableSchema {
    name: "sector_industry",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id", "name"],
    foreign_keys: &[],
    children: &[Relation {
        field: "divisions",
        table: "sector_division",
        column: "sector_industry_id",
    }],
};

pub static SECTOR_DIVISION: TableSchema = TableSchema {
    name: "sector_division",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id", "sector_industry_id", "name"],
    foreign_keys: &[ForeignKey {
        column: "sector_industry_id",
        references: "sector_industry",
    }],
    children: &[Relation {
        field: "groups",
        table: "sector_group",
        column: "sector_division_id",
    }],
};

pub static SECTOR_GROUP: TableSchema = TableSchema {
    name: "sector_group",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id", "sector_division_id", "name"],
    foreign_keys: &[ForeignKey {
        column: "sector_division_id",
        references: "sector_division",
    }],
    children: &[Relation {
        field: "sectors",
        table: "sector",
        column: "sector_group_id",
    }],
};

pub static SECTOR: TableSchema = TableSchema {
    name: "sector",
    key: "id",
    key_kind: KeyKind::Text,
    columns: &["id", "sector_group_id", "name"],
    foreign_keys: &[ForeignKey {
        column: "sector_group_id",
        references: "sector_group",
    }],
    children: &[],
};

/// Every table, parents before children.
pub static CATALOG: &[&TableSchema] = &[
    &REGION,
    &SUB_REGION,
    &COUNTRY,
    &SECTOR_INDUSTRY,
    &SECTOR_DIVISION,
    &SECTOR_GROUP,
    &SECTOR,
    &COUNTRY_CONTACT,
    &COUNTRY_DOCUMENT,
    &COUNTRY_SECTOR,
];

/// Looks up a table by name.
pub fn table(name: &str) -> Option<&'static TableSchema> {
    CATALOG.iter().copied().find(|t| t.name == name)
}
