//! # gsheet-mapping
//!
//! Maps free-text, Turkish-language spreadsheet headers onto canonical field
//! keys.
//!
//! ```
//! use gsheet_mapping::{ColumnMapping, FieldKey};
//!
//! let mapping = ColumnMapping::from_headers(&["Proje Adı", "İşveren"]);
//! let row = ["GUEST HOUSE", "IRAK HÜKUNETİ"];
//!
//! assert_eq!(mapping.get(FieldKey::Isveren), Some(1));
//! assert_eq!(mapping.read(&row, FieldKey::ProjeAdi), Some("GUEST HOUSE"));
//! ```

mod mapper;
mod normalize;

pub use mapper::{classify_header, ColumnMapping, FieldKey};
pub use normalize::normalize_header;
