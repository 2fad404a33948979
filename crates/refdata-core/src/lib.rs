pub mod id;
pub mod key;
pub mod models;
pub mod schema;

pub use id::generate_id;
pub use key::{KeyError, RecordKey};
pub use models::{
    Country, CountryContact, CountryDocument, CountrySector, Record, Region, Sector,
    SectorDivision, SectorGroup, SectorIndustry, SubRegion,
};
pub use schema::{CATALOG, ForeignKey, KeyKind, Relation, TableSchema};
