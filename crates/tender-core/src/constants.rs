//! Application-wide constants.

/// Page size used when the caller does not supply a limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 5;

/// Upper bound accepted for a page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Approvals needed to close a tender never exceed this many, whatever the size
/// of the organization.
pub const QUORUM_CAP: i64 = 3;

pub const MAX_NAME_LENGTH: u64 = 100;
pub const MAX_DESCRIPTION_LENGTH: u64 = 500;
pub const MAX_FEEDBACK_LENGTH: u64 = 1000;
pub const MAX_USERNAME_LENGTH: u64 = 50;

/// Number of approvals that closes a tender owned by an organization with
/// `responsible_count` responsible users.
pub fn quorum_for(responsible_count: i64) -> i64 {
    responsible_count.min(QUORUM_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_is_capped() {
        assert_eq!(quorum_for(0), 0);
        assert_eq!(quorum_for(1), 1);
        assert_eq!(quorum_for(2), 2);
        assert_eq!(quorum_for(3), 3);
        assert_eq!(quorum_for(10), 3);
    }
}
