//! Internationalized address module.
//!
//! Address headers whose domains are ACE encoded (`xn--`) are exposed
//! to the rule engine in their display form as well, so that rules
//! written with unicode domains match.

use log::{debug, warn};
use mailparse::{MailAddr, MailParseError, SingleInfo};
use std::result;
use thiserror::Error;

/// Represents the prefix of an ACE encoded domain label.
pub const ACE_PREFIX: &str = "xn--";

/// Represents the headers carrying addresses, in lowercase.
pub const ADDRESS_HEADERS: [&str; 6] = ["bcc", "cc", "from", "reply-to", "sender", "to"];

#[derive(Debug, Error)]
pub enum IdnError {
    #[error("cannot parse address {1}")]
    ParseAddressError(#[source] MailParseError, String),
    #[error("cannot find a single address in {0}")]
    FindSingleAddressError(String),
}

pub type IdnResult<T> = result::Result<T, IdnError>;

pub fn is_address_header(name: &str) -> bool {
    ADDRESS_HEADERS
        .iter()
        .any(|header| header.eq_ignore_ascii_case(name))
}

/// Decodes the ACE labels of a domain. Labels that cannot be decoded
/// are kept as they are.
pub fn domain_to_unicode(domain: &str) -> String {
    if !domain.contains(ACE_PREFIX) {
        return domain.to_owned();
    }

    let mut decoded = String::with_capacity(domain.len());
    for label in domain.split('.') {
        if !decoded.is_empty() {
            decoded.push('.');
        }

        if let Some(label) = label
            .strip_prefix(ACE_PREFIX)
            .and_then(idna::punycode::decode_to_string)
            .filter(|label| !label.is_empty())
        {
            decoded.push_str(&label);
        } else {
            decoded.push_str(label);
        }
    }

    decoded
}

/// Decodes the domain part of an address.
pub fn addr_to_unicode(addr: &str) -> String {
    match addr.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain_to_unicode(domain)),
        None => domain_to_unicode(addr),
    }
}

/// Returns the display form of a single address when it differs from
/// the original one, `None` when decoding changes nothing.
fn unicode_address(address: &str) -> IdnResult<Option<String>> {
    let addrs = mailparse::addrparse(address)
        .map_err(|err| IdnError::ParseAddressError(err, address.to_owned()))?;

    let info = match addrs.first() {
        Some(MailAddr::Single(info)) if addrs.len() == 1 => info,
        _ => return Err(IdnError::FindSingleAddressError(address.to_owned())),
    };

    let unicode_addr = addr_to_unicode(&info.addr);
    if unicode_addr.eq_ignore_ascii_case(&info.addr) {
        return Ok(None);
    }

    let info = SingleInfo {
        display_name: info.display_name.clone(),
        addr: unicode_addr,
    };
    Ok(Some(info.to_string()))
}

/// Splits a header value on address delimiters, keeping each
/// delimiter next to the address it follows.
fn split_addresses(val: &str) -> Vec<(&str, &str)> {
    let mut tokens = Vec::new();
    let mut start = 0;

    for (i, c) in val.char_indices() {
        if c == ',' || c == ';' {
            tokens.push((&val[start..i], &val[i..i + 1]));
            start = i + 1;
        }
    }

    if start < val.len() {
        tokens.push((&val[start..], ""));
    }

    tokens
}

/// Expands the values of an address header. For each value holding
/// ACE encoded addresses that decode to something different, the
/// decoded value is listed right before the original one.
pub fn normalize_idn_header(name: &str, vals: &[String]) -> Vec<String> {
    let mut normalized = Vec::with_capacity(vals.len());

    for val in vals {
        if val.contains(ACE_PREFIX) {
            let mut altered = false;
            let mut addrs = String::with_capacity(val.len());

            for (address, delim) in split_addresses(val) {
                if address.trim().is_empty() {
                    addrs.push_str(address);
                } else {
                    match unicode_address(address) {
                        Ok(Some(unicode_addr)) => {
                            altered = true;
                            addrs.push_str(&unicode_addr);
                        }
                        Ok(None) => addrs.push_str(address),
                        Err(err) => {
                            warn!("invalid address {} in header {}: {}", address, name, err);
                            addrs.push_str(address);
                        }
                    }
                }
                addrs.push_str(delim);
            }

            if altered {
                debug!("added value {} for header {}", addrs, name);
                normalized.push(addrs);
            }
        }

        normalized.push(val.to_owned());
    }

    normalized
}
