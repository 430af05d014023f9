use std::fmt;

/// Holds a UserID packet.
///
/// The standard imposes no structure on the user ID, but the
/// convention is an [RFC 2822] mailbox: `Name (Comment)
/// <email@example.org>`.  See [Section 5.11 of RFC 4880].
///
///   [RFC 2822]: https://tools.ietf.org/html/rfc2822
///   [Section 5.11 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.11
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UserID {
    /// The user id.
    value: Box<[u8]>,
}

impl From<Vec<u8>> for UserID {
    fn from(u: Vec<u8>) -> Self {
        UserID {
            value: u.into_boxed_slice(),
        }
    }
}

impl From<&[u8]> for UserID {
    fn from(u: &[u8]) -> Self {
        u.to_vec().into()
    }
}

impl<'a> From<&'a str> for UserID {
    fn from(u: &'a str) -> Self {
        u.as_bytes().into()
    }
}

impl From<String> for UserID {
    fn from(u: String) -> Self {
        u.into_bytes().into()
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.value))
    }
}

impl fmt::Debug for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("UserID")
            .field(&self.to_string())
            .finish()
    }
}

impl UserID {
    /// Constructs a UserID from the convention `Name (Comment)
    /// <address>`.
    pub fn from_address(name: Option<&str>, comment: Option<&str>,
                        address: &str)
                        -> Self
    {
        let mut value = String::new();
        if let Some(name) = name {
            value.push_str(name);
        }
        if let Some(comment) = comment {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push('(');
            value.push_str(comment);
            value.push(')');
        }
        if !value.is_empty() {
            value.push(' ');
        }
        value.push('<');
        value.push_str(address);
        value.push('>');
        value.into()
    }

    /// Gets the user ID packet's value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the name portion of the user ID, if the value follows
    /// the mailbox convention.
    pub fn name(&self) -> Option<String> {
        let s = std::str::from_utf8(&self.value).ok()?;
        let before_address = s.split('<').next().unwrap_or("");
        let name = before_address.split('(').next().unwrap_or("").trim();
        if name.is_empty() {
            None
        } else {
            Some(name.into())
        }
    }

    /// Returns the email address, if any.
    pub fn email(&self) -> Option<String> {
        let s = std::str::from_utf8(&self.value).ok()?;
        let start = s.find('<')?;
        let end = s.rfind('>')?;
        if start + 1 <= end {
            Some(s[start + 1..end].into())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_address() {
        let uid = UserID::from_address(
            Some("Abraham Lincoln"),
            Some("ALincoln"),
            "abraham.lincoln@whitehouse.gov");
        assert_eq!(uid.to_string(),
                   "Abraham Lincoln (ALincoln) \
                    <abraham.lincoln@whitehouse.gov>");
        assert_eq!(uid.name().as_deref(), Some("Abraham Lincoln"));
        assert_eq!(uid.email().as_deref(),
                   Some("abraham.lincoln@whitehouse.gov"));
    }

    #[test]
    fn bare_address() {
        let uid: UserID = "alice@example.org".into();
        assert_eq!(uid.name().as_deref(), Some("alice@example.org"));
        assert_eq!(uid.email(), None);
    }
}
