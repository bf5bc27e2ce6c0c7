//! Personal record books served as a small web app: migration candidates,
//! EUR/MYR rate history, a German vocabulary book and a Japanese/English/German
//! phrase book with machine translation and speech playback.

pub mod books;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod storage;
pub mod telemetry;
pub mod web;
