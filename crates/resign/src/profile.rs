//! Provisioning profile metadata.
//!
//! `.mobileprovision` files are CMS-signed wrappers around an XML property
//! list, so none of the plist readers will parse one whole. The helpers here
//! slice the embedded plist out of the wrapper by scanning for its tags, then
//! mine it for the fields the pipeline cares about. Malformed input yields
//! `None` throughout: a profile without a readable expiration is an expected
//! input, not a pipeline failure.

use plist::{Date, Value};
use std::fs;
use std::path::Path;

const PLIST_OPEN: &[u8] = b"<plist";
const PLIST_CLOSE: &[u8] = b"</plist>";

/// Extract the embedded property list from raw profile bytes.
///
/// Slices from the first `<plist` tag to the last `</plist>` tag inclusive
/// and parses the slice. Returns `None` if either tag is missing or the
/// slice is not a parseable plist.
pub fn embedded_plist(data: &[u8]) -> Option<Value> {
    let start = data
        .windows(PLIST_OPEN.len())
        .position(|w| w == PLIST_OPEN)?;
    let end = data
        .windows(PLIST_CLOSE.len())
        .rposition(|w| w == PLIST_CLOSE)?
        + PLIST_CLOSE.len();

    if start >= end {
        return None;
    }

    plist::from_bytes(&data[start..end]).ok()
}

/// The profile's `ExpirationDate`, if present and actually a date.
pub fn expiration_date(data: &[u8]) -> Option<Date> {
    embedded_plist(data)?
        .as_dictionary()?
        .get("ExpirationDate")?
        .as_date()
}

/// Like [`expiration_date`], reading the profile from disk.
///
/// An unreadable file yields `None`.
pub fn expiration_date_from_file(path: impl AsRef<Path>) -> Option<Date> {
    let data = fs::read(path).ok()?;
    expiration_date(&data)
}

/// The profile's `Entitlements` dictionary, re-serialized as an XML plist.
pub fn entitlements(data: &[u8]) -> Option<Vec<u8>> {
    let root = embedded_plist(data)?;
    let entitlements = root.as_dictionary()?.get("Entitlements")?;

    let mut buf = Vec::new();
    plist::to_writer_xml(&mut buf, entitlements).ok()?;
    Some(buf)
}
