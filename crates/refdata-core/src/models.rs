//! Record shapes for every resource.
//!
//! A record doubles as the create/update payload and as the response body.
//! Embedded child arrays (`subregions`, `countries`, `divisions`, `groups`,
//! `sectors`) are filled on read and never persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::schema::{self, TableSchema};

/// A row type bound to one table of the catalog.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const SCHEMA: &'static TableSchema;
    /// Human readable name used in error messages, e.g. `"SubRegion"`.
    const LABEL: &'static str;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregions: Option<Vec<SubRegion>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubRegion {
    #[serde(default)]
    pub id: String,
    /// Parent region.
    #[serde(default)]
    pub subregion_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<Country>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Country {
    pub id: String,
    /// Parent sub-region.
    pub subregion_id: Option<String>,
    pub calling_code: Option<i32>,
    pub name: Option<String>,
    pub other_names: Option<String>,
    pub motto: Option<String>,
    pub date_of_independence: Option<NaiveDate>,
    pub introduction: Option<String>,
    pub location: Option<String>,
    pub neighbours: Option<String>,
    pub capital_city: Option<String>,
    pub population: Option<f64>,
    pub languages: Option<String>,
    pub facts_and_figures: Option<String>,
    pub classification: Option<String>,
    pub life_expectancy: Option<f64>,
    pub median_age: Option<f64>,
    pub average_children: Option<f64>,
    pub income_group: Option<String>,
    pub employment_rate: Option<f64>,
    pub unemployment_rate: Option<f64>,
    pub contribution_men: Option<f64>,
    pub contribution_women: Option<f64>,
    pub gdp_2019: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub growth_of_gdp: Option<f64>,
    pub inflation: Option<f64>,
    pub investment: Option<f64>,
    pub total_debt: Option<f64>,
    pub gnp_per_capita: Option<f64>,
    pub corruption_rank: Option<f64>,
    pub credit_rank: Option<f64>,
    pub business_score: Option<f64>,
    pub key_sectors_growth: Option<String>,
    pub key_issues: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryContact {
    pub id: Option<i64>,
    pub country_id: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
    pub govt_contact: Option<String>,
    pub economic_contact: Option<String>,
    pub parliament_contact: Option<String>,
    pub judiciary_contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryDocument {
    pub id: Option<Uuid>,
    pub country_id: Option<String>,
    pub document_type: Option<String>,
    pub name: Option<String>,
    /// Set by the upload path from the persisted byte count.
    pub filesize: Option<i64>,
    pub filetype: Option<String>,
    /// Base64 encoded file body on upload. Never stored or returned.
    #[serde(skip_serializing)]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountrySector {
    pub id: Option<i64>,
    pub country_id: Option<String>,
    pub sector_id: Option<String>,
    pub contribution_to_gdp: Option<f64>,
    pub growth_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorIndustry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divisions: Option<Vec<SectorDivision>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorDivision {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sector_industry_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<SectorGroup>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorGroup {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sector_division_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<Sector>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub sector_group_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

macro_rules! impl_record {
    ($($ty:ty => $schema:expr, $label:literal;)+) => {
        $(
            impl Record for $ty {
                const SCHEMA: &'static TableSchema = &$schema;
                const LABEL: &'static str = $label;
            }
        )+
    };
}

impl_record! {
    Region => schema::REGION, "Region";
    SubRegion => schema::SUB_REGION, "SubRegion";
    Country => schema::COUNTRY, "Country";
    CountryContact => schema::COUNTRY_CONTACT, "CountryContact";
    CountryDocument => schema::COUNTRY_DOCUMENT, "CountryDocument";
    CountrySector => schema::COUNTRY_SECTOR, "CountrySector";
    SectorIndustry => schema::SECTOR_INDUSTRY, "SectorIndustry";
    SectorDivision => schema::SECTOR_DIVISION, "SectorDivision";
    SectorGroup => schema::SECTOR_GROUP, "SectorGroup";
    Sector => schema::SECTOR, "Sector";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_to_its_columns() {
        let country = Country {
            id: "FR".into(),
            subregion_id: Some("WEU".into()),
            name: Some("France".into()),
            date_of_independence: NaiveDate::from_ymd_opt(1792, 9, 22),
            ..Default::default()
        };
        let value = serde_json::to_value(&country).unwrap();
        for (field, _) in value.as_object().unwrap() {
            assert!(Country::SCHEMA.has_column(field), "unexpected field {field}");
        }
        assert_eq!(value["date_of_independence"], json!("1792-09-22"));
    }

    #[test]
    fn document_upload_payload_is_never_serialized() {
        let doc: CountryDocument = serde_json::from_value(json!({
            "country_id": "FR",
            "filename": "JVBERi0=",
        }))
        .unwrap();
        assert_eq!(doc.filename.as_deref(), Some("JVBERi0="));
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("filename").is_none());
    }

    #[test]
    fn embedded_children_deserialize() {
        let region: Region = serde_json::from_value(json!({
            "id": "EU",
            "subregions": [{"id": "WEU", "subregion_id": "EU", "countries": []}]
        }))
        .unwrap();
        let subs = region.subregions.unwrap();
        assert_eq!(subs[0].id, "WEU");
        assert_eq!(subs[0].countries.as_deref(), Some(&[][..]));
    }

    #[test]
    fn labels_match_tables() {
        assert_eq!(Region::SCHEMA.name, "region");
        assert_eq!(SubRegion::LABEL, "SubRegion");
        assert_eq!(CountryDocument::SCHEMA.name, "country_document");
    }
}
