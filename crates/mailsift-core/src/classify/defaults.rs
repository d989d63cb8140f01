//! Built-in classification lists.
//!
//! Used whenever a [`super::ClassifierConfig`] field is not supplied.

/// Domains known to hand out short-lived, throwaway mailboxes.
pub const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "10minutemail.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "sharklasers.com",
    "tempmail.com",
    "temp-mail.org",
    "throwawaymail.com",
    "yopmail.com",
    "getnada.com",
    "trashmail.com",
    "dispostable.com",
    "maildrop.cc",
    "fakeinbox.com",
    "mintemail.com",
    "mailnesia.com",
    "mohmal.com",
    "emailondeck.com",
    "spamgourmet.com",
    "burnermail.io",
    "tempail.com",
    "mailcatch.com",
];

/// Consumer webmail providers. Anything not listed is corporate.
pub const PERSONAL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "ymail.com",
    "hotmail.com",
    "outlook.com",
    "live.com",
    "msn.com",
    "aol.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "protonmail.com",
    "proton.me",
    "gmx.com",
    "gmx.de",
    "mail.com",
    "yandex.com",
    "zoho.com",
];

/// Local parts that denote an organisational function rather than a person.
pub const ROLE_PREFIXES: &[&str] = &[
    "admin",
    "administrator",
    "support",
    "info",
    "sales",
    "contact",
    "help",
    "office",
    "billing",
    "marketing",
    "noreply",
    "no-reply",
    "webmaster",
    "postmaster",
    "hostmaster",
    "abuse",
    "security",
    "hr",
    "jobs",
    "careers",
    "team",
    "hello",
    "accounts",
    "enquiries",
    "service",
    "feedback",
];

pub fn disposable_domains() -> Vec<String> {
    owned(DISPOSABLE_DOMAINS)
}

pub fn personal_domains() -> Vec<String> {
    owned(PERSONAL_DOMAINS)
}

pub fn role_prefixes() -> Vec<String> {
    owned(ROLE_PREFIXES)
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}
