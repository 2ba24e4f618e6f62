//! Synthetic record generation
//!
//! Every record is derived from a fresh random suffix so repeated runs against
//! the same CRM never collide on unique fields such as email or name.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const SUFFIX_LEN: usize = 6;

/// Random `[a-z0-9]` suffix
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.sample(Alphanumeric) as char)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// US test number in the +1555 range
pub fn random_mobile() -> String {
    let mut rng = rand::thread_rng();
    format!("+1555{}", rng.gen_range(1_000_000..=9_999_999))
}

/// Synthetic field values for one created record
#[derive(Debug, Clone)]
pub struct TestRecord {
    pub suffix: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_no: String,
    pub organization_name: String,
    pub website: String,
    pub industry: String,
}

impl TestRecord {
    pub fn generate(prefix: &str) -> Self {
        Self::with_suffix(prefix, &random_suffix(SUFFIX_LEN))
    }

    pub fn with_suffix(prefix: &str, suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            first_name: format!("{}First{}", prefix, suffix),
            last_name: format!("{}Last{}", prefix, suffix),
            email: format!("test{}@example.com", suffix),
            mobile_no: random_mobile(),
            organization_name: format!("{} Corp {}", prefix, suffix),
            website: format!("https://{}{}.com", prefix.to_lowercase(), suffix),
            industry: "Technology".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_suffix_alphabet() {
        let suffix = random_suffix(SUFFIX_LEN);
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_suffixes_do_not_collide() {
        let suffixes: HashSet<String> = (0..1000).map(|_| random_suffix(SUFFIX_LEN)).collect();
        assert_eq!(suffixes.len(), 1000);

        let emails: HashSet<String> = (0..200)
            .map(|_| TestRecord::generate("Lead").email)
            .collect();
        assert_eq!(emails.len(), 200);
    }

    #[test]
    fn test_record_fields() {
        let record = TestRecord::with_suffix("Org", "ab12cd");
        assert_eq!(record.first_name, "OrgFirstab12cd");
        assert_eq!(record.last_name, "OrgLastab12cd");
        assert_eq!(record.email, "testab12cd@example.com");
        assert_eq!(record.organization_name, "Org Corp ab12cd");
        assert_eq!(record.website, "https://orgab12cd.com");
        assert!(record.mobile_no.starts_with("+1555"));
        assert_eq!(record.mobile_no.len(), 12);
    }
}
