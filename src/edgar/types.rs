use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// One row of the SEC ticker table: the registrant a ticker maps to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyRecord {
    #[serde(rename = "cik_str")]
    pub cik: u64,
    pub ticker: String,
    pub title: String,
}

/// The ticker table is a JSON object keyed by row index. Re-key it by
/// uppercased ticker for lookup.
pub(crate) fn parse_ticker_table(
    json: &[u8],
) -> Result<HashMap<String, CompanyRecord>, serde_json::Error> {
    let raw: HashMap<String, CompanyRecord> = serde_json::from_slice(json)?;
    Ok(raw
        .into_values()
        .map(|record| (record.ticker.to_ascii_uppercase(), record))
        .collect())
}

/// Company submissions index from `data.sec.gov`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanySubmissions {
    pub cik: String,
    #[serde(default)]
    pub name: Option<String>,
    pub filings: FilingIndex,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingIndex {
    pub recent: FilingColumns,
    /// Older filings spill over into further column pages, newest first.
    #[serde(default)]
    pub files: Vec<FilingPage>,
}

/// Reference to one spill-over page of the filing listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingPage {
    pub name: String,
    #[serde(default)]
    pub filing_count: u64,
}

/// EDGAR's column-oriented filing listing: parallel arrays, one entry per
/// filing, newest first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingColumns {
    #[serde(default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub filing_date: Vec<NaiveDate>,
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(default)]
    pub primary_document: Vec<String>,
}

impl FilingColumns {
    /// Zip the parallel columns into per-filing rows. Trailing entries of a
    /// longer column are dropped rather than guessed at.
    pub fn rows(&self) -> Vec<FilingRef> {
        let len = self
            .accession_number
            .len()
            .min(self.filing_date.len())
            .min(self.form.len());
        (0..len)
            .map(|i| FilingRef {
                accession_number: self.accession_number[i].clone(),
                filing_date: self.filing_date[i],
                form: self.form[i].clone(),
                primary_document: self.primary_document.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

/// One filing, zipped out of the column listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FilingRef {
    pub accession_number: String,
    pub filing_date: NaiveDate,
    pub form: String,
    pub primary_document: String,
}

impl FilingRef {
    /// Accession number without dashes, as archive paths want it.
    pub fn accession_compact(&self) -> String {
        self.accession_number.replace('-', "")
    }
}

/// Which filings to keep out of a company's listing.
#[derive(Debug, Clone, Default)]
pub struct FilingQuery {
    /// Most recent `n` matches; `None` keeps every match.
    pub limit: Option<usize>,
    /// Keep filings dated on or after this day.
    pub after: Option<NaiveDate>,
    /// Keep filings dated on or before this day.
    pub before: Option<NaiveDate>,
    /// Also accept `<form>/A` amendment filings.
    pub include_amends: bool,
}

pub(crate) fn filing_matches(filing: &FilingRef, form: &str, query: &FilingQuery) -> bool {
    let form_ok = filing.form == form
        || (query.include_amends && filing.form == format!("{form}/A"));
    if !form_ok {
        return false;
    }
    if query.after.is_some_and(|after| filing.filing_date < after) {
        return false;
    }
    if query.before.is_some_and(|before| filing.filing_date > before) {
        return false;
    }
    true
}

/// Append matching rows (already newest first) until the query's limit is
/// reached.
pub(crate) fn take_matches(
    rows: Vec<FilingRef>,
    form: &str,
    query: &FilingQuery,
    out: &mut Vec<FilingRef>,
) {
    for row in rows {
        if query.limit.is_some_and(|limit| out.len() >= limit) {
            return;
        }
        if filing_matches(&row, form, query) {
            out.push(row);
        }
    }
}
