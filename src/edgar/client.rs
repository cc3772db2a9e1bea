use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::error::EdgarError;
use super::types::{
    parse_ticker_table, take_matches, CompanyRecord, CompanySubmissions, FilingColumns,
    FilingQuery, FilingRef,
};

const TICKER_TABLE_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const SUBMISSIONS_BASE: &str = "https://data.sec.gov/submissions";
const ARCHIVES_BASE: &str = "https://www.sec.gov/Archives/edgar/data";

/// Pause between consecutive EDGAR requests. SEC fair-access rules allow at
/// most ten requests per second.
const REQUEST_GAP: Duration = Duration::from_millis(150);

/// One GET against EDGAR. `Ok` carries the body of a success-status
/// response; a non-success status surfaces as [`EdgarError::ApiError`] and a
/// connection-level failure as [`EdgarError::Request`]. reqwest in
/// production, a canned double in tests.
#[async_trait]
pub trait EdgarFetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, EdgarError>;
}

/// Blanket impl so `Box<dyn EdgarFetch>` can be passed directly to
/// `EdgarClient::with_fetcher()`.
#[async_trait]
impl EdgarFetch for Box<dyn EdgarFetch> {
    async fn get(&self, url: &str) -> Result<Vec<u8>, EdgarError> {
        (**self).get(url).await
    }
}

/// reqwest-backed fetcher carrying the SEC-required `User-Agent` header.
pub struct HttpFetch {
    client: reqwest::Client,
}

impl HttpFetch {
    pub fn new(company: &str, email: &str) -> Result<Self, EdgarError> {
        if company.trim().is_empty() {
            return Err(EdgarError::InvalidConfig(
                "company name must not be empty".to_string(),
            ));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(EdgarError::InvalidConfig(
                "a contact email address is required".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .user_agent(format!("{company} {email}"))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EdgarError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EdgarFetch for HttpFetch {
    async fn get(&self, url: &str) -> Result<Vec<u8>, EdgarError> {
        debug!(url, "edgar request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EdgarError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdgarError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EdgarError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Client for the SEC EDGAR archive: ticker metadata, submission listings,
/// and filing downloads.
///
/// EDGAR rejects anonymous traffic, so construction requires the company
/// name and contact email that make up the `User-Agent` header.
pub struct EdgarClient {
    fetch: Box<dyn EdgarFetch>,
    tickers: OnceCell<HashMap<String, CompanyRecord>>,
}

impl EdgarClient {
    pub fn new(company: &str, email: &str) -> Result<Self, EdgarError> {
        Ok(Self::with_fetcher(HttpFetch::new(company, email)?))
    }

    /// Swap the HTTP layer out; tests substitute a canned double.
    pub fn with_fetcher(fetch: impl EdgarFetch + 'static) -> Self {
        Self {
            fetch: Box::new(fetch),
            tickers: OnceCell::new(),
        }
    }

    /// Resolve a ticker to its SEC registrant record. The ticker table is
    /// fetched once per client and answered from memory after that. Lookup
    /// is case-insensitive.
    pub async fn company_for_ticker(&self, ticker: &str) -> Result<CompanyRecord, EdgarError> {
        let table = self
            .tickers
            .get_or_try_init(|| async {
                let body = self.fetch.get(TICKER_TABLE_URL).await?;
                parse_ticker_table(&body).map_err(|e| EdgarError::Parse(e.to_string()))
            })
            .await?;
        table
            .get(&ticker.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| EdgarError::UnknownTicker(ticker.to_string()))
    }

    /// Fetch a company's submissions index: the recent filing listing plus
    /// references to older listing pages.
    pub async fn submissions(&self, cik: u64) -> Result<CompanySubmissions, EdgarError> {
        self.get_json(&submissions_url(cik)).await
    }

    /// Download matching filings of `form` for `ticker`, saving each full
    /// submission under
    /// `<dest_root>/sec-edgar-filings/<TICKER>/<form>/<accession>/full-submission.txt`.
    /// Older listing pages are only fetched while the query's limit is
    /// unmet. Returns the saved paths, newest filing first.
    pub async fn download_filings(
        &self,
        ticker: &str,
        form: &str,
        query: &FilingQuery,
        dest_root: &Path,
    ) -> Result<Vec<PathBuf>, EdgarError> {
        let company = self.company_for_ticker(ticker).await?;
        let submissions = self.submissions(company.cik).await?;

        let mut selected = Vec::new();
        let recent = submissions.filings.recent.rows();
        take_matches(recent, form, query, &mut selected);
        for page in &submissions.filings.files {
            if query.limit.is_some_and(|limit| selected.len() >= limit) {
                break;
            }
            tokio::time::sleep(REQUEST_GAP).await;
            let columns: FilingColumns = self.get_json(&submissions_page_url(&page.name)).await?;
            take_matches(columns.rows(), form, query, &mut selected);
        }

        info!(
            ticker,
            form,
            matches = selected.len(),
            "selected filings for download"
        );

        let mut saved = Vec::with_capacity(selected.len());
        for filing in &selected {
            tokio::time::sleep(REQUEST_GAP).await;
            let url = full_submission_url(company.cik, filing);
            let body = self.fetch.get(&url).await?;
            let dir = filing_dir(dest_root, ticker, form, filing);
            tokio::fs::create_dir_all(&dir).await?;
            let path = dir.join("full-submission.txt");
            tokio::fs::write(&path, &body).await?;
            info!(
                ticker,
                accession = %filing.accession_number,
                filed = %filing.filing_date,
                "saved filing"
            );
            saved.push(path);
        }
        Ok(saved)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EdgarError> {
        let body = self.fetch.get(url).await?;
        serde_json::from_slice(&body).map_err(|e| EdgarError::Parse(e.to_string()))
    }
}

fn submissions_url(cik: u64) -> String {
    format!("{SUBMISSIONS_BASE}/CIK{cik:010}.json")
}

fn submissions_page_url(name: &str) -> String {
    format!("{SUBMISSIONS_BASE}/{name}")
}

fn full_submission_url(cik: u64, filing: &FilingRef) -> String {
    format!(
        "{ARCHIVES_BASE}/{cik}/{}/{}.txt",
        filing.accession_compact(),
        filing.accession_number
    )
}

fn filing_dir(dest_root: &Path, ticker: &str, form: &str, filing: &FilingRef) -> PathBuf {
    dest_root
        .join("sec-edgar-filings")
        .join(ticker.to_ascii_uppercase())
        .join(form)
        .join(&filing.accession_number)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use super::*;

    fn filing(accession: &str) -> FilingRef {
        FilingRef {
            accession_number: accession.to_string(),
            filing_date: NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
            form: "10-K".to_string(),
            primary_document: "aapl-20230930.htm".to_string(),
        }
    }

    /// Canned responses per URL, recording every URL fetched.
    struct CannedFetch {
        responses: HashMap<String, Vec<u8>>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl CannedFetch {
        fn new(responses: Vec<(String, String)>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let fetch = Self {
                responses: responses
                    .into_iter()
                    .map(|(url, body)| (url, body.into_bytes()))
                    .collect(),
                seen: seen.clone(),
            };
            (fetch, seen)
        }
    }

    #[async_trait]
    impl EdgarFetch for CannedFetch {
        async fn get(&self, url: &str) -> Result<Vec<u8>, EdgarError> {
            self.seen.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(body) => Ok(body.clone()),
                None => Err(EdgarError::ApiError {
                    status: 404,
                    body: format!("no canned body for {url}"),
                }),
            }
        }
    }

    fn ticker_table_json() -> String {
        r#"{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}}"#.to_string()
    }

    /// One matching 10-K in `recent`, two older listing pages on file.
    fn submissions_json() -> String {
        r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "filings": {
                "recent": {
                    "accessionNumber": ["0000320193-23-000106"],
                    "filingDate": ["2023-11-03"],
                    "form": ["10-K"],
                    "primaryDocument": ["aapl-20230930.htm"]
                },
                "files": [
                    {"name": "CIK0000320193-submissions-001.json", "filingCount": 1},
                    {"name": "CIK0000320193-submissions-002.json", "filingCount": 1}
                ]
            }
        }"#
        .to_string()
    }

    fn older_page_json() -> String {
        r#"{
            "accessionNumber": ["0000320193-19-000119"],
            "filingDate": ["2019-10-31"],
            "form": ["10-K"],
            "primaryDocument": ["a10-k20199282019.htm"]
        }"#
        .to_string()
    }

    #[test]
    fn submissions_url_zero_pads_the_cik() {
        assert_eq!(
            submissions_url(320193),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
    }

    #[test]
    fn full_submission_url_uses_the_compact_accession() {
        assert_eq!(
            full_submission_url(320193, &filing("0000320193-23-000106")),
            "https://www.sec.gov/Archives/edgar/data/320193/000032019323000106/0000320193-23-000106.txt"
        );
    }

    #[test]
    fn filing_dir_matches_the_download_layout() {
        let dir = filing_dir(
            Path::new("data/raw"),
            "aapl",
            "10-K",
            &filing("0000320193-23-000106"),
        );
        assert_eq!(
            dir,
            Path::new("data/raw/sec-edgar-filings/AAPL/10-K/0000320193-23-000106")
        );
    }

    #[test]
    fn construction_requires_a_contact_email() {
        assert!(matches!(
            EdgarClient::new("RAG", "not-an-address"),
            Err(EdgarError::InvalidConfig(_))
        ));
        assert!(matches!(
            EdgarClient::new("", "admin@example.com"),
            Err(EdgarError::InvalidConfig(_))
        ));
        assert!(EdgarClient::new("RAG", "admin@example.com").is_ok());
    }

    #[tokio::test]
    async fn ticker_table_is_fetched_once_per_client() {
        let responses = vec![(TICKER_TABLE_URL.to_string(), ticker_table_json())];
        let (fetch, seen) = CannedFetch::new(responses);
        let client = EdgarClient::with_fetcher(fetch);

        let company = client.company_for_ticker("aapl").await.unwrap();
        assert_eq!(company.cik, 320193);
        let err = client.company_for_ticker("ZZZZ").await.unwrap_err();
        assert!(matches!(err, EdgarError::UnknownTicker(_)));

        let table_hits = seen
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.as_str() == TICKER_TABLE_URL)
            .count();
        assert_eq!(table_hits, 1);
    }

    #[tokio::test]
    async fn limit_met_by_recent_fetches_no_older_pages() {
        let recent = filing("0000320193-23-000106");
        let responses = vec![
            (TICKER_TABLE_URL.to_string(), ticker_table_json()),
            (submissions_url(320193), submissions_json()),
            (full_submission_url(320193, &recent), "10-K BODY 2023".to_string()),
        ];
        let (fetch, seen) = CannedFetch::new(responses);
        let client = EdgarClient::with_fetcher(fetch);
        let dest = tempfile::tempdir().unwrap();
        let query = FilingQuery {
            limit: Some(1),
            ..FilingQuery::default()
        };

        let saved = client
            .download_filings("AAPL", "10-K", &query, dest.path())
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(
            std::fs::read_to_string(&saved[0]).unwrap(),
            "10-K BODY 2023"
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                TICKER_TABLE_URL.to_string(),
                submissions_url(320193),
                full_submission_url(320193, &recent),
            ]
        );
    }

    #[tokio::test]
    async fn pagination_stops_once_the_limit_is_met() {
        let recent = filing("0000320193-23-000106");
        let older = filing("0000320193-19-000119");
        let page_url = submissions_page_url("CIK0000320193-submissions-001.json");
        let responses = vec![
            (TICKER_TABLE_URL.to_string(), ticker_table_json()),
            (submissions_url(320193), submissions_json()),
            (page_url.clone(), older_page_json()),
            (full_submission_url(320193, &recent), "10-K BODY 2023".to_string()),
            (full_submission_url(320193, &older), "10-K BODY 2019".to_string()),
        ];
        let (fetch, seen) = CannedFetch::new(responses);
        let client = EdgarClient::with_fetcher(fetch);
        let dest = tempfile::tempdir().unwrap();
        let query = FilingQuery {
            limit: Some(2),
            ..FilingQuery::default()
        };

        let saved = client
            .download_filings("AAPL", "10-K", &query, dest.path())
            .await
            .unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&saved[1]).unwrap(),
            "10-K BODY 2019"
        );
        let seen = seen.lock().unwrap();
        assert!(seen.contains(&page_url));
        assert!(!seen.iter().any(|url| url.contains("-submissions-002")));
    }
}
