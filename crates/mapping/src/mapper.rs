//! Canonical field keys and the header-to-column mapping built from them.

use crate::normalize::normalize_header;
use gsheet_core::{Record, StoreError, StoreResult};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Canonical, locale-independent field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    ProjeAdi,
    ProjeKodu,
    ProjeTuru,
    Lokasyon,
    Isveren,
    Yuklenici,
    Musavir,
    BaslangicTarihi,
    BitisTarihi,
    Durum,
    Tarih,
    Aciklama,
    Tutar,
    Tur,
    Kategori,
}

impl FieldKey {
    pub const ALL: [FieldKey; 15] = [
        FieldKey::ProjeAdi,
        FieldKey::ProjeKodu,
        FieldKey::ProjeTuru,
        FieldKey::Lokasyon,
        FieldKey::Isveren,
        FieldKey::Yuklenici,
        FieldKey::Musavir,
        FieldKey::BaslangicTarihi,
        FieldKey::BitisTarihi,
        FieldKey::Durum,
        FieldKey::Tarih,
        FieldKey::Aciklama,
        FieldKey::Tutar,
        FieldKey::Tur,
        FieldKey::Kategori,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::ProjeAdi => "proje_adi",
            FieldKey::ProjeKodu => "proje_kodu",
            FieldKey::ProjeTuru => "proje_turu",
            FieldKey::Lokasyon => "lokasyon",
            FieldKey::Isveren => "isveren",
            FieldKey::Yuklenici => "yuklenici",
            FieldKey::Musavir => "musavir",
            FieldKey::BaslangicTarihi => "baslangic_tarihi",
            FieldKey::BitisTarihi => "bitis_tarihi",
            FieldKey::Durum => "durum",
            FieldKey::Tarih => "tarih",
            FieldKey::Aciklama => "aciklama",
            FieldKey::Tutar => "tutar",
            FieldKey::Tur => "tur",
            FieldKey::Kategori => "kategori",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        FieldKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StoreError::invalid_input(format!("unknown field key: {s}")))
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    Contains(&'static str),
    Exact(&'static str),
}

impl Pattern {
    fn matches(self, normalized: &str) -> bool {
        match self {
            Pattern::Contains(needle) => normalized.contains(needle),
            Pattern::Exact(expected) => normalized == expected,
        }
    }
}

/// Matching rules in priority order; the first hit decides a header's key.
const RULES: &[(Pattern, FieldKey)] = &[
    (Pattern::Contains("proje adi"), FieldKey::ProjeAdi),
    (Pattern::Contains("proje kodu"), FieldKey::ProjeKodu),
    (Pattern::Contains("proje turu"), FieldKey::ProjeTuru),
    (Pattern::Contains("lokasyon"), FieldKey::Lokasyon),
    (Pattern::Contains("konum"), FieldKey::Lokasyon),
    (Pattern::Contains("isveren"), FieldKey::Isveren),
    (Pattern::Contains("yuklenici"), FieldKey::Yuklenici),
    (Pattern::Contains("musavir"), FieldKey::Musavir),
    (Pattern::Contains("baslangic"), FieldKey::BaslangicTarihi),
    (Pattern::Contains("bitis"), FieldKey::BitisTarihi),
    (Pattern::Contains("durum"), FieldKey::Durum),
    (Pattern::Exact("tarih"), FieldKey::Tarih),
    (Pattern::Contains("aciklama"), FieldKey::Aciklama),
    (Pattern::Contains("tutar"), FieldKey::Tutar),
    (Pattern::Exact("tur"), FieldKey::Tur),
    (Pattern::Exact("tip"), FieldKey::Tur),
    (Pattern::Contains("kategori"), FieldKey::Kategori),
];

/// Canonical key for a single raw header, if any rule matches it.
pub fn classify_header(raw: &str) -> Option<FieldKey> {
    let normalized = normalize_header(raw);
    RULES
        .iter()
        .find(|(pattern, _)| pattern.matches(&normalized))
        .map(|(_, key)| *key)
}

/// Canonical key → column index for one header row.
///
/// When two headers resolve to the same key the later column wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<FieldKey, usize>,
}

impl ColumnMapping {
    /// Build the mapping for a header row.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut columns = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            if let Some(key) = classify_header(header.as_ref()) {
                columns.insert(key, index);
            }
        }
        ColumnMapping { columns }
    }

    /// Column index of `key`.
    pub fn get(&self, key: FieldKey) -> Option<usize> {
        self.columns.get(&key).copied()
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.columns.contains_key(&key)
    }

    /// Cell of `row` holding `key`. `None` if unmapped or the row is short.
    pub fn read<'a, S: AsRef<str>>(&self, row: &'a [S], key: FieldKey) -> Option<&'a str> {
        self.get(key)
            .and_then(|index| row.get(index))
            .map(AsRef::as_ref)
    }

    /// Value of `key` in a record keyed by `headers`.
    pub fn read_record<'a>(
        &self,
        headers: &[String],
        record: &'a Record,
        key: FieldKey,
    ) -> Option<&'a str> {
        self.get(key)
            .and_then(|index| headers.get(index))
            .and_then(|header| record.get(header))
    }

    /// Every mapped field of `row`, keyed canonically. Short rows yield
    /// empty strings for their missing cells.
    pub fn project<S: AsRef<str>>(&self, row: &[S]) -> BTreeMap<FieldKey, String> {
        self.columns
            .iter()
            .map(|(key, index)| {
                let value = row.get(*index).map(|v| v.as_ref().to_string());
                (*key, value.unwrap_or_default())
            })
            .collect()
    }

    /// Mapped keys with their column indices, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, usize)> + '_ {
        self.columns.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
