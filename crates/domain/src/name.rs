//! Domain-name validation and public-suffix-aware decomposition.
//!
//! The public-suffix data set is an external collaborator (the `psl`
//! compiled list); this module only layers label arithmetic on top of it.

/// The split of a fully-qualified name around its public suffix.
///
/// Invariant: when `sub` is non-empty, `sub + "." + domain` reconstructs the
/// cleaned input; when `sub` is empty and the input is not a bare TLD,
/// `domain` equals the cleaned input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainParts<'a> {
    /// Public suffix (e.g. "co.uk"). Non-empty for every decomposable name.
    pub tld: &'a str,
    /// Registrable domain: one label plus the suffix (e.g. "example.co.uk").
    /// Empty only when the input is itself a bare TLD.
    pub domain: &'a str,
    /// Everything left of the registrable domain. May be empty.
    pub sub: &'a str,
}

/// Checks whether `d` is a syntactically valid presentation-form
/// fully-qualified domain name.
///
/// Labels are LDH plus underscore, 1-63 characters, no leading or trailing
/// hyphen. The total length must stay within 254 characters where the 254th
/// may only be the trailing dot. Single-label names, the root domain "." and
/// all-numeric names are rejected.
pub fn is_domain(d: &str) -> bool {
    let b = d.as_bytes();
    let l = b.len();

    // Effective maximum is 253, but 254 passes if the last char is the
    // trailing dot (RFC 1035, RFC 3696).
    if l == 0 || l > 254 || (l == 254 && b[l - 1] != b'.') {
        return false;
    }
    // The root domain is technically valid, but not for this crate.
    if d == "." || b[0] == b'.' {
        return false;
    }

    let mut contains_dot = false;
    let mut last = b'.';
    let mut non_numeric = false;
    let mut part_len = 0usize;

    for &c in b {
        match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                non_numeric = true;
                part_len += 1;
            }
            b'0'..=b'9' => {
                part_len += 1;
            }
            b'-' => {
                // Byte before a dash cannot be a dot.
                if last == b'.' {
                    return false;
                }
                non_numeric = true;
                part_len += 1;
            }
            b'.' => {
                contains_dot = true;
                // Byte before a dot cannot be a dot or a dash.
                if last == b'.' || last == b'-' {
                    return false;
                }
                if part_len == 0 || part_len > 63 {
                    return false;
                }
                part_len = 0;
            }
            _ => return false,
        }
        last = c;
    }

    if last == b'-' || part_len > 63 {
        return false;
    }

    contains_dot && non_numeric
}

/// Checks whether `label` is a valid single domain label: 1-63 alphanumeric
/// or hyphen characters, no leading/trailing hyphen, no consecutive hyphens.
/// Unlike [`is_domain`], single-label hostnames are accepted.
pub fn is_domain_label(label: &str) -> bool {
    let b = label.as_bytes();
    let l = b.len();

    if l == 0 || l > 63 {
        return false;
    }
    if b[0] == b'-' || b[l - 1] == b'-' {
        return false;
    }

    let mut last_hyphen = false;
    for &c in b {
        match c {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => last_hyphen = false,
            b'-' => {
                if last_hyphen {
                    return false;
                }
                last_hyphen = true;
            }
            _ => return false,
        }
    }

    true
}

/// Strips one trailing dot and lower-cases the result. Does not validate.
pub fn clean(d: &str) -> String {
    let d = d.strip_suffix('.').unwrap_or(d);
    d.to_ascii_lowercase()
}

/// Returns the public suffix of `d` (e.g. "sub.example.co.uk" -> "co.uk").
///
/// Non-ICANN suffixes (the private section of the list) are skipped by
/// stripping one leading label and retrying, until an ICANN-managed suffix
/// is found or no dot remains, in which case the remaining string is the
/// suffix. Expects a cleaned name; returns `None` for "", "." or a name
/// starting with a dot.
pub fn public_suffix(d: &str) -> Option<&str> {
    if d.is_empty() || d == "." || d.starts_with('.') {
        return None;
    }

    let d = d.strip_suffix('.').unwrap_or(d);
    let mut tld = d;

    loop {
        let suffix = psl::suffix(tld.as_bytes())?;
        let s = std::str::from_utf8(suffix.as_bytes()).ok()?;

        if suffix.typ() == Some(psl::Type::Icann) {
            return Some(&d[d.len() - s.len()..]);
        }

        match s.find('.') {
            // No dot left: the remainder is the terminal form.
            None => return Some(&d[d.len() - s.len()..]),
            Some(dot) => tld = &s[dot + 1..],
        }
    }
}

/// Splits `d` into {subdomain, registrable domain, public suffix}.
///
/// Returns `None` for "", "." or a name starting with a dot. If the suffix
/// equals the whole name, the name is itself a TLD and both `domain` and
/// `sub` are empty. Expects a cleaned name (see [`clean`]); only one suffix
/// lookup happens per call, the rest is string-index arithmetic.
pub fn decompose(d: &str) -> Option<DomainParts<'_>> {
    if d.is_empty() || d == "." || d.starts_with('.') {
        return None;
    }

    let d = d.strip_suffix('.').unwrap_or(d);
    let tld = public_suffix(d)?;
    let tld_index = d.len() - tld.len();

    if tld_index == 0 {
        return Some(DomainParts {
            tld,
            domain: "",
            sub: "",
        });
    }

    // d[tld_index - 1] is the dot separating the suffix from the rest.
    let head = &d[..tld_index - 1];
    match head.rfind('.') {
        None => Some(DomainParts {
            tld,
            domain: d,
            sub: "",
        }),
        Some(i) => Some(DomainParts {
            tld,
            domain: &d[i + 1..],
            sub: &d[..i],
        }),
    }
}

/// Returns the registrable domain of `d` (e.g. "sub.example.com" ->
/// "example.com"), or `None` when `d` is not decomposable or is a bare TLD.
pub fn registrable_domain(d: &str) -> Option<&str> {
    let parts = decompose(d)?;
    if parts.domain.is_empty() {
        None
    } else {
        Some(parts.domain)
    }
}

/// Returns the subdomain part of `d`, or `None` when there is none.
pub fn subdomain(d: &str) -> Option<&str> {
    let parts = decompose(d)?;
    if parts.sub.is_empty() {
        None
    } else {
        Some(parts.sub)
    }
}

/// Whether `d` has at least one label above its registrable domain.
pub fn has_subdomain(d: &str) -> bool {
    subdomain(d).is_some()
}
