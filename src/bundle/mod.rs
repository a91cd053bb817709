mod classify;
mod parse;

pub use classify::{FALLBACK_GROUP, GroupTable, parse_color};
pub use parse::{BundleKey, BundleRecord, BundleSet, load_bundles, parse_bundles};
