//! Upload infrastructure module

mod http;

pub use http::HttpUploadClient;
