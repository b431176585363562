use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::super::domain::LanguageRecord;

/// Ordered collection of language records backing the resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    records: Vec<LanguageRecord>,
}

/// Failure while loading a catalog from CSV.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to open language catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed language catalog: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {field} must not be blank")]
    BlankField { row: usize, field: &'static str },
    #[error("row {row}: localized name '{entry}' must look like locale:name")]
    LocalizedName { row: usize, entry: String },
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    code: String,
    name: String,
    #[serde(default)]
    localized: Option<String>,
}

impl LanguageCatalog {
    pub fn new(records: Vec<LanguageRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[LanguageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads `code,name,localized` rows; `localized` holds `locale:name` pairs separated by `|`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let row = row?;
            // header is row 1
            let row_number = index + 2;

            if row.code.is_empty() {
                return Err(CatalogError::BlankField {
                    row: row_number,
                    field: "code",
                });
            }
            if row.name.is_empty() {
                return Err(CatalogError::BlankField {
                    row: row_number,
                    field: "name",
                });
            }

            let mut record = LanguageRecord::new(row.code, row.name);
            for entry in row
                .localized
                .as_deref()
                .unwrap_or_default()
                .split('|')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
            {
                let (locale, name) = entry
                    .split_once(':')
                    .map(|(locale, name)| (locale.trim(), name.trim()))
                    .filter(|(locale, name)| !locale.is_empty() && !name.is_empty())
                    .ok_or_else(|| CatalogError::LocalizedName {
                        row: row_number,
                        entry: entry.to_string(),
                    })?;
                record = record.with_localized(locale, name);
            }
            records.push(record);
        }

        Ok(Self { records })
    }

    /// Languages commonly requested on the marketplace.
    pub fn builtin() -> Self {
        let records = vec![
            LanguageRecord::new("en", "English")
                .with_localized("es", "Inglés")
                .with_localized("fr", "Anglais")
                .with_localized("de", "Englisch")
                .with_localized("pt", "Inglês"),
            LanguageRecord::new("es", "Spanish")
                .with_localized("es", "Español")
                .with_localized("fr", "Espagnol")
                .with_localized("de", "Spanisch")
                .with_localized("pt", "Espanhol"),
            LanguageRecord::new("fr", "French")
                .with_localized("es", "Francés")
                .with_localized("fr", "Français")
                .with_localized("de", "Französisch")
                .with_localized("pt", "Francês"),
            LanguageRecord::new("de", "German")
                .with_localized("es", "Alemán")
                .with_localized("fr", "Allemand")
                .with_localized("de", "Deutsch")
                .with_localized("pt", "Alemão"),
            LanguageRecord::new("pt", "Portuguese")
                .with_localized("es", "Portugués")
                .with_localized("fr", "Portugais")
                .with_localized("de", "Portugiesisch")
                .with_localized("pt", "Português"),
            LanguageRecord::new("it", "Italian")
                .with_localized("es", "Italiano")
                .with_localized("fr", "Italien")
                .with_localized("de", "Italienisch"),
            LanguageRecord::new("zh", "Chinese")
                .with_localized("es", "Chino")
                .with_localized("fr", "Chinois")
                .with_localized("zh", "中文"),
            LanguageRecord::new("ja", "Japanese")
                .with_localized("es", "Japonés")
                .with_localized("fr", "Japonais")
                .with_localized("ja", "日本語"),
            LanguageRecord::new("ko", "Korean")
                .with_localized("es", "Coreano")
                .with_localized("fr", "Coréen")
                .with_localized("ko", "한국어"),
            LanguageRecord::new("ar", "Arabic")
                .with_localized("es", "Árabe")
                .with_localized("fr", "Arabe")
                .with_localized("ar", "العربية"),
            LanguageRecord::new("hi", "Hindi").with_localized("hi", "हिन्दी"),
            LanguageRecord::new("ru", "Russian")
                .with_localized("es", "Ruso")
                .with_localized("fr", "Russe")
                .with_localized("ru", "Русский"),
            LanguageRecord::new("nl", "Dutch")
                .with_localized("es", "Neerlandés")
                .with_localized("nl", "Nederlands"),
            LanguageRecord::new("sw", "Swahili").with_localized("sw", "Kiswahili"),
        ];

        Self { records }
    }
}
