pub mod client;
pub mod error;
pub mod types;

pub use client::{EdgarClient, EdgarFetch, HttpFetch};
pub use error::EdgarError;
pub use types::{
    CompanyRecord, CompanySubmissions, FilingColumns, FilingIndex, FilingPage, FilingQuery,
    FilingRef,
};
