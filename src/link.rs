//! Notebook object links pasted by users.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{Config, ElnType};

/// openBIS permanent id: 17-digit timestamp, dash, sequence number.
pub const PERM_ID_PATTERN: &str = r"\d{17}-\d+";

static PERM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PERM_ID_PATTERN).expect("perm id pattern is valid"));

/// Permanent id of the object an openBIS object URL points at.
///
/// Object URLs carry the parent's perm id first and the object's second;
/// collection and other URLs carry only one and are rejected.
pub fn perm_id_from_url(config: &Config, url: &str) -> crate::Result<String> {
    if config.eln_type != ElnType::Openbis {
        return Err(crate::Error::validation(format!(
            "object links are not supported for {:?}",
            config.eln_type
        )));
    }
    if !url.starts_with(&config.eln_uri) {
        return Err(crate::Error::validation(
            "The given url does not belong to the connected ELN",
        ));
    }
    PERM_ID
        .find_iter(url)
        .nth(1)
        .map(|m| m.as_str().to_owned())
        .ok_or_else(|| {
            crate::Error::validation(
                "The openBIS url given is not correct. Only object urls are accepted as input, not collection urls etc.",
            )
        })
}
