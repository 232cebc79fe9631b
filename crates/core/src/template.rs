//! Header templates for new sheets.

use crate::error::{StoreError, StoreResult};
use std::fmt;
use std::str::FromStr;

/// A named, fixed header layout offered when creating a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    IncomeExpense,
    ProjectTracking,
    Inventory,
    ClientManagement,
    EmployeeRecords,
}

impl Template {
    /// Every template, in display order.
    pub const ALL: [Template; 5] = [
        Template::IncomeExpense,
        Template::ProjectTracking,
        Template::Inventory,
        Template::ClientManagement,
        Template::EmployeeRecords,
    ];

    /// Kebab-case template name.
    pub fn name(self) -> &'static str {
        match self {
            Template::IncomeExpense => "income-expense",
            Template::ProjectTracking => "project-tracking",
            Template::Inventory => "inventory",
            Template::ClientManagement => "client-management",
            Template::EmployeeRecords => "employee-records",
        }
    }

    /// Literal header row written by the template.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            // Same column order as `LedgerEntry::to_row`.
            Template::IncomeExpense => &["Tarih", "Açıklama", "Tutar", "Tür", "Kategori"],
            Template::ProjectTracking => &[
                "Proje Adı",
                "Proje Kodu",
                "Proje Türü",
                "Lokasyon",
                "İşveren",
                "Yüklenici",
                "Müşavir",
                "Başlangıç Tarihi",
                "Bitiş Tarihi",
                "Durum",
            ],
            Template::Inventory => &[
                "Malzeme Adı",
                "Malzeme Kodu",
                "Birim",
                "Miktar",
                "Birim Fiyat",
                "Depo",
            ],
            Template::ClientManagement => &[
                "Firma Adı",
                "Yetkili Kişi",
                "Telefon",
                "E-posta",
                "Adres",
                "Notlar",
            ],
            Template::EmployeeRecords => &[
                "Ad Soyad",
                "Görev",
                "Departman",
                "İşe Giriş Tarihi",
                "Telefon",
                "Maaş",
            ],
        }
    }

    /// Header row as owned strings.
    pub fn header_row(self) -> Vec<String> {
        self.headers().iter().map(|h| (*h).to_string()).collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        Template::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| StoreError::invalid_input(format!("unknown template: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for template in Template::ALL {
            assert_eq!(template.name().parse::<Template>().unwrap(), template);
        }
        assert!("budget".parse::<Template>().is_err());
    }

    #[test]
    fn test_income_expense_matches_ledger_width() {
        assert_eq!(
            Template::IncomeExpense.headers().len(),
            crate::model::LedgerEntry::WIDTH
        );
    }

    #[test]
    fn test_templates_fit_single_letter_columns() {
        for template in Template::ALL {
            assert!(!template.headers().is_empty());
            assert!(template.headers().len() <= crate::a1::MAX_COLUMNS);
        }
    }
}
