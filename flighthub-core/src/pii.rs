use std::fmt;

/// Log-safe view of a passenger e-mail: `g***@example.com`.
///
/// Use in `tracing` fields instead of the raw address.
#[derive(Clone, Copy)]
pub struct Masked<'a>(pub &'a str);

impl fmt::Display for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) => write!(f, "{first}***@{domain}"),
                None => write!(f, "***@{domain}"),
            },
            None => f.write_str("********"),
        }
    }
}

impl fmt::Debug for Masked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_local_part() {
        assert_eq!(Masked("grace@example.com").to_string(), "g***@example.com");
        assert_eq!(format!("{:?}", Masked("@example.com")), "***@example.com");
        assert_eq!(Masked("07700900000").to_string(), "********");
    }
}
